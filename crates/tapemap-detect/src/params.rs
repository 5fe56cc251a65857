use crate::DetectError;
use serde::{Deserialize, Serialize};

/// Inclusive HSV band in 8-bit OpenCV convention: hue in `0..=180`,
/// saturation and value in `0..=255`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HsvBand {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl Default for HsvBand {
    /// Blue tape under the overhead camera the thresholds were tuned on.
    fn default() -> Self {
        Self {
            lower: [101, 99, 8],
            upper: [125, 255, 112],
        }
    }
}

impl HsvBand {
    #[inline]
    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|c| hsv[c] >= self.lower[c] && hsv[c] <= self.upper[c])
    }
}

/// Configuration for [`crate::ColorMaskSegmenter`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentParams {
    /// Box blur kernel side in pixels (odd). `1` disables blurring.
    pub blur_kernel: u32,
    pub band: HsvBand,
}

impl Default for SegmentParams {
    fn default() -> Self {
        Self {
            blur_kernel: 3,
            band: HsvBand::default(),
        }
    }
}

impl SegmentParams {
    pub fn validate(&self) -> Result<(), DetectError> {
        if self.blur_kernel == 0 || self.blur_kernel % 2 == 0 {
            return Err(DetectError::params(format!(
                "blur_kernel must be odd and >= 1, got {}",
                self.blur_kernel
            )));
        }
        let HsvBand { lower, upper } = self.band;
        if lower[0] > 180 || upper[0] > 180 {
            return Err(DetectError::params("hue bounds must lie in 0..=180"));
        }
        if (0..3).any(|c| lower[c] > upper[c]) {
            return Err(DetectError::params(format!(
                "hsv band lower {lower:?} exceeds upper {upper:?}"
            )));
        }
        Ok(())
    }
}

/// Configuration for [`crate::ContourShapeFilter`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContourFilterParams {
    /// Canny hysteresis thresholds.
    pub canny_low: f32,
    pub canny_high: f32,
    /// Contours enclosing more than this many px² are background blobs.
    pub max_area: f32,
    /// The fill-ratio rejection only applies above this area.
    pub min_area: f32,
    /// Open interval of fill ratios that reads as a solid rectangle.
    pub fill_ratio_min: f32,
    pub fill_ratio_max: f32,
    /// Douglas-Peucker tolerance for the polygonal approximation.
    pub poly_epsilon: f64,
    /// Enclosing-circle radii below this are raised to it.
    pub min_radius: f32,
    /// Added to every radius after clamping.
    pub radius_margin: f32,
}

impl Default for ContourFilterParams {
    fn default() -> Self {
        Self {
            canny_low: 50.0,
            canny_high: 200.0,
            max_area: 30.0,
            min_area: 10.0,
            fill_ratio_min: 0.8,
            fill_ratio_max: 1.0,
            poly_epsilon: 3.0,
            min_radius: 1.0,
            radius_margin: 1.5,
        }
    }
}

impl ContourFilterParams {
    pub fn validate(&self) -> Result<(), DetectError> {
        let finite = [
            self.canny_low,
            self.canny_high,
            self.max_area,
            self.min_area,
            self.fill_ratio_min,
            self.fill_ratio_max,
            self.min_radius,
            self.radius_margin,
        ]
        .iter()
        .all(|v| v.is_finite())
            && self.poly_epsilon.is_finite();
        if !finite {
            return Err(DetectError::params("contour parameters must be finite"));
        }
        if self.canny_low < 0.0 || self.canny_low > self.canny_high {
            return Err(DetectError::params(format!(
                "canny thresholds must satisfy 0 <= low <= high, got {}/{}",
                self.canny_low, self.canny_high
            )));
        }
        if self.min_area < 0.0 || self.min_area > self.max_area {
            return Err(DetectError::params(format!(
                "area floor {} must lie in [0, {}]",
                self.min_area, self.max_area
            )));
        }
        if self.fill_ratio_min >= self.fill_ratio_max {
            return Err(DetectError::params("fill ratio band is empty"));
        }
        if self.poly_epsilon <= 0.0 {
            return Err(DetectError::params("poly_epsilon must be positive"));
        }
        if self.min_radius < 0.0 || self.radius_margin < 0.0 {
            return Err(DetectError::params(
                "min_radius and radius_margin must be non-negative",
            ));
        }
        Ok(())
    }
}
