use crate::GridError;
use serde::{Deserialize, Serialize};

/// Configuration for [`crate::OccupancyAccumulator`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccumulateParams {
    /// Weight of the new frame in `map = w * scratch + (1 - w) * map`.
    pub blend_weight: f32,
    /// Intensity the region disks are drawn with in the scratch layer.
    pub region_value: u8,
    /// What the scratch layer holds outside the region disks.
    pub base: ScratchBase,
}

/// Background of the per-frame scratch layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScratchBase {
    /// The frame's 0/255 obstacle mask: tape pulls towards 255, floor towards 0.
    #[default]
    Mask,
    /// [`crate::NEUTRAL`] everywhere; only region disks move the map.
    Neutral,
}

impl Default for AccumulateParams {
    fn default() -> Self {
        Self {
            blend_weight: 0.5,
            region_value: 0,
            base: ScratchBase::Mask,
        }
    }
}

impl AccumulateParams {
    pub fn validate(&self) -> Result<(), GridError> {
        if !self.blend_weight.is_finite() || !(0.0..=1.0).contains(&self.blend_weight) {
            return Err(GridError::params(format!(
                "blend_weight must lie in [0, 1], got {}",
                self.blend_weight
            )));
        }
        Ok(())
    }
}

/// How continuous ray positions snap to cells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundingMode {
    #[default]
    Floor,
    Ceil,
    /// Half away from zero.
    Nearest,
}

impl RoundingMode {
    #[inline]
    pub fn apply(self, v: f32) -> i64 {
        match self {
            RoundingMode::Floor => v.floor() as i64,
            RoundingMode::Ceil => v.ceil() as i64,
            RoundingMode::Nearest => v.round() as i64,
        }
    }
}

/// Which side of the threshold counts as occupied.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OccupancyPolarity {
    /// `value > threshold` is occupied.
    #[default]
    Above,
    /// `value < threshold` is occupied.
    Below,
}

/// Configuration for [`crate::RayMarchScanner`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanParams {
    /// Number of rays per scan.
    pub count: usize,
    pub angle_min: f32,
    pub angle_max: f32,
    /// Occupancy checks start once a ray has travelled this far.
    pub range_min: f32,
    /// Reported when nothing is hit.
    pub range_max: f32,
    pub occupancy_threshold: f32,
    pub occupied_when: OccupancyPolarity,
    pub rounding: RoundingMode,
}

impl Default for ScanParams {
    fn default() -> Self {
        Self {
            count: 6,
            angle_min: 0.0,
            angle_max: std::f32::consts::TAU,
            range_min: 0.0,
            range_max: 1000.0,
            occupancy_threshold: 140.0,
            occupied_when: OccupancyPolarity::Above,
            rounding: RoundingMode::Floor,
        }
    }
}

impl ScanParams {
    /// Angular distance between consecutive rays.
    #[inline]
    pub fn angle_increment(&self) -> f32 {
        (self.angle_max - self.angle_min) / self.count as f32
    }

    #[inline]
    pub fn is_occupied(&self, value: f32) -> bool {
        match self.occupied_when {
            OccupancyPolarity::Above => value > self.occupancy_threshold,
            OccupancyPolarity::Below => value < self.occupancy_threshold,
        }
    }

    pub fn validate(&self) -> Result<(), GridError> {
        if self.count == 0 {
            return Err(GridError::params("scan count must be at least 1"));
        }
        let finite = [
            self.angle_min,
            self.angle_max,
            self.range_min,
            self.range_max,
            self.occupancy_threshold,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !finite {
            return Err(GridError::params("scan parameters must be finite"));
        }
        if self.angle_max <= self.angle_min {
            return Err(GridError::params(format!(
                "angle_max ({}) must exceed angle_min ({})",
                self.angle_max, self.angle_min
            )));
        }
        if self.range_min < 0.0 || self.range_min >= self.range_max {
            return Err(GridError::params(format!(
                "ranges must satisfy 0 <= range_min < range_max, got {}..{}",
                self.range_min, self.range_max
            )));
        }
        Ok(())
    }
}
