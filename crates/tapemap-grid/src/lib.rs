//! Persistent occupancy map and synthetic range scans.
//!
//! - [`OccupancyMap`]: grid of `f32` intensities in `[0, 255]`, 127 = unknown.
//! - [`OccupancyAccumulator`]: lazily allocates the map on the first frame and
//!   blends every frame's obstacle mask and regions into it as an exponential
//!   moving average.
//! - [`RayMarchScanner`]: marches unit steps from an origin along `count`
//!   evenly spaced angles and reports the first occupied cell per ray.
//!
//! ```
//! use nalgebra::Point2;
//! use tapemap_grid::{OccupancyMap, RayMarchScanner, ScanParams};
//!
//! let map = OccupancyMap::neutral(64, 64);
//! let scanner = RayMarchScanner::new(ScanParams::default()).unwrap();
//! let scan = scanner.scan(&map, Some(Point2::new(32.0, 32.0))).unwrap();
//! assert_eq!(scan.ranges.len(), 6);
//! assert!(scan.ranges.iter().all(|&r| r == scan.range_max));
//! ```

mod accumulate;
mod error;
mod map;
mod params;
mod raymarch;

pub use accumulate::OccupancyAccumulator;
pub use error::GridError;
pub use map::{OccupancyMap, NEUTRAL};
pub use params::{AccumulateParams, OccupancyPolarity, RoundingMode, ScanParams, ScratchBase};
pub use raymarch::{RayMarchScanner, ScanResult};
