//! Synthetic range scans by discrete ray marching.
//!
//! Each ray starts at the origin and adds the same `(cos θ, sin θ)` step
//! vector once per iteration; the accumulated position is snapped to a cell
//! with the configured [`crate::RoundingMode`]. The step vector is never
//! renormalized, so the rounding mode decides which cells a shallow ray
//! visits.

use crate::{GridError, OccupancyMap, ScanParams};
use log::trace;
use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// One synthetic scan. `ranges[i]` belongs to `angle_min + i * angle_increment`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub angle_min: f32,
    pub angle_max: f32,
    pub angle_increment: f32,
    pub range_min: f32,
    pub range_max: f32,
    pub ranges: Vec<f32>,
}

impl ScanResult {
    /// Angle of ray `i`.
    #[inline]
    pub fn angle(&self, i: usize) -> f32 {
        self.angle_min + i as f32 * self.angle_increment
    }

    /// Number of rays that hit something before `range_max`.
    pub fn hits(&self) -> usize {
        self.ranges.iter().filter(|&&r| r < self.range_max).count()
    }
}

#[derive(Clone, Debug)]
pub struct RayMarchScanner {
    params: ScanParams,
}

impl RayMarchScanner {
    pub fn new(params: ScanParams) -> Result<Self, GridError> {
        params.validate()?;
        Ok(Self { params })
    }

    #[inline]
    pub fn params(&self) -> &ScanParams {
        &self.params
    }

    /// Scan `map` from `origin`. `None` is the "target not found" sentinel.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, map), fields(width = map.width(), height = map.height()))
    )]
    pub fn scan(
        &self,
        map: &OccupancyMap,
        origin: Option<Point2<f32>>,
    ) -> Result<ScanResult, GridError> {
        let origin = origin
            .filter(|o| o.x.is_finite() && o.y.is_finite())
            .ok_or(GridError::TargetUnresolved)?;

        let p = &self.params;
        let increment = p.angle_increment();
        let ranges = (0..p.count)
            .map(|i| self.cast_ray(map, origin, p.angle_min + i as f32 * increment))
            .collect();

        Ok(ScanResult {
            angle_min: p.angle_min,
            angle_max: p.angle_max,
            angle_increment: increment,
            range_min: p.range_min,
            range_max: p.range_max,
            ranges,
        })
    }

    /// Range along a single ray at angle `theta` (radians, image axes).
    pub fn cast_ray(&self, map: &OccupancyMap, origin: Point2<f32>, theta: f32) -> f32 {
        let p = &self.params;
        let (sin_t, cos_t) = theta.sin_cos();
        let step = Vector2::new(cos_t, sin_t);

        // unit steps: the walk leaves range_max after at most this many iterations
        let max_steps = p.range_max.ceil() as u64 + 1;
        let mut pos = origin;
        let mut past_min = p.range_min <= 0.0;

        for _ in 0..max_steps {
            pos += step;
            let travelled = (pos - origin).norm();
            if travelled > p.range_max {
                break;
            }

            let cx = p.rounding.apply(pos.x);
            let cy = p.rounding.apply(pos.y);
            let Some(value) = map.get(cx, cy) else {
                trace!("ray {theta:.3} left the map at ({cx}, {cy})");
                return p.range_max;
            };

            if !past_min {
                past_min = travelled >= p.range_min;
                if !past_min {
                    continue;
                }
            }

            if p.is_occupied(value) {
                let hit = Point2::new(cx as f32, cy as f32);
                return (hit - origin).norm().min(p.range_max);
            }
        }
        p.range_max
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RoundingMode, NEUTRAL};
    use approx::assert_abs_diff_eq;

    fn scanner(params: ScanParams) -> RayMarchScanner {
        RayMarchScanner::new(params).unwrap()
    }

    #[test]
    fn sentinel_origin_is_unresolved() {
        let map = OccupancyMap::neutral(10, 10);
        let s = scanner(ScanParams::default());
        assert_eq!(s.scan(&map, None).unwrap_err(), GridError::TargetUnresolved);
        assert_eq!(
            s.scan(&map, Some(Point2::new(f32::NAN, 1.0))).unwrap_err(),
            GridError::TargetUnresolved
        );
    }

    #[test]
    fn scan_metadata_and_ray_order() {
        let map = OccupancyMap::neutral(10, 10);
        let res = scanner(ScanParams::default())
            .scan(&map, Some(Point2::new(5.0, 5.0)))
            .unwrap();
        assert_eq!(res.ranges.len(), 6);
        assert_abs_diff_eq!(res.angle_increment, std::f32::consts::TAU / 6.0);
        assert_abs_diff_eq!(res.angle(3), std::f32::consts::PI, epsilon = 1e-6);
        assert_eq!(res.range_max, 1000.0);
        assert_eq!(res.hits(), 0);
    }

    #[test]
    fn edge_origin_aimed_outward_reports_max_range() {
        let map = OccupancyMap::neutral(100, 100);
        let s = scanner(ScanParams::default());
        assert_eq!(s.cast_ray(&map, Point2::new(99.0, 50.0), 0.0), 1000.0);
        assert_eq!(
            s.cast_ray(&map, Point2::new(0.0, 50.0), std::f32::consts::PI),
            1000.0
        );
    }

    #[test]
    fn single_occupied_cell_is_hit_at_its_distance() {
        let mut map = OccupancyMap::neutral(100, 100);
        map.set(60, 50, 200.0);
        let res = scanner(ScanParams::default())
            .scan(&map, Some(Point2::new(50.0, 50.0)))
            .unwrap();
        assert_abs_diff_eq!(res.ranges[0], 10.0, epsilon = 1.0);
        assert_eq!(res.hits(), 1);
    }

    #[test]
    fn range_min_gate_skips_own_footprint() {
        let map = OccupancyMap::filled(40, 40, 200.0).unwrap();
        let origin = Point2::new(20.0, 20.0);

        let ungated = scanner(ScanParams::default());
        assert_abs_diff_eq!(ungated.cast_ray(&map, origin, 0.0), 1.0);

        let gated = scanner(ScanParams {
            range_min: 5.0,
            ..ScanParams::default()
        });
        assert_abs_diff_eq!(gated.cast_ray(&map, origin, 0.0), 5.0);
        assert_abs_diff_eq!(
            gated.cast_ray(&map, origin, std::f32::consts::FRAC_PI_2),
            5.0,
            epsilon = 1e-4
        );
    }

    #[test]
    fn fractional_range_min_still_advances() {
        let map = OccupancyMap::filled(20, 20, 200.0).unwrap();
        let s = scanner(ScanParams {
            range_min: 2.5,
            ..ScanParams::default()
        });
        assert_abs_diff_eq!(s.cast_ray(&map, Point2::new(5.0, 5.0), 0.0), 3.0);
    }

    #[test]
    fn rounding_mode_changes_visited_cells() {
        let mut map = OccupancyMap::neutral(20, 20);
        map.set(13, 11, 255.0);
        let origin = Point2::new(10.0, 10.5);

        let with = |rounding| {
            scanner(ScanParams {
                rounding,
                range_max: 50.0,
                ..ScanParams::default()
            })
            .cast_ray(&map, origin, 0.0)
        };

        assert_eq!(with(RoundingMode::Floor), 50.0);
        let expected = (9.0f32 + 0.25).sqrt();
        assert_abs_diff_eq!(with(RoundingMode::Ceil), expected, epsilon = 1e-5);
        assert_abs_diff_eq!(with(RoundingMode::Nearest), expected, epsilon = 1e-5);
    }

    #[test]
    fn range_max_caps_long_rays_inside_the_map() {
        let map = OccupancyMap::neutral(200, 200);
        let s = scanner(ScanParams {
            range_max: 20.0,
            ..ScanParams::default()
        });
        let res = s.scan(&map, Some(Point2::new(100.0, 100.0))).unwrap();
        assert!(res.ranges.iter().all(|&r| r == 20.0));
    }

    #[test]
    fn below_polarity_reads_dark_obstacles() {
        let mut map = OccupancyMap::neutral(30, 30);
        map.set(15, 22, 0.0);
        let s = scanner(ScanParams {
            count: 4,
            occupancy_threshold: 64.0,
            occupied_when: crate::OccupancyPolarity::Below,
            ..ScanParams::default()
        });
        let res = s.scan(&map, Some(Point2::new(15.0, 15.0))).unwrap();
        // ray 1 points along +y in image coordinates
        assert_abs_diff_eq!(res.ranges[1], 7.0, epsilon = 1e-4);
        assert_eq!(res.hits(), 1);
        assert!(map.get(15, 15) == Some(NEUTRAL));
    }
}
