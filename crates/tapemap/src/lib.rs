//! High-level facade for the `tapemap-*` workspace.
//!
//! This crate provides:
//! - re-exports of the detection and grid crates,
//! - [`TapeMapConfig`], the single run-time configuration document,
//! - [`TapeMapSession`], which owns the occupancy map and serializes frame
//!   merges against scan requests,
//! - the `tapemap` CLI (feature `cli`) for replaying recorded frames.
//!
//! ## Quickstart
//!
//! ```
//! use image::{Rgb, RgbImage};
//! use nalgebra::Point2;
//! use tapemap::{TapeMapConfig, TapeMapError, TapeMapSession};
//!
//! # fn main() -> Result<(), TapeMapError> {
//! let session = TapeMapSession::new(TapeMapConfig::default())?;
//! assert!(matches!(
//!     session.request_scan("robot"),
//!     Err(TapeMapError::MapNotInitialized)
//! ));
//!
//! session.on_frame(&RgbImage::from_pixel(64, 48, Rgb([220, 220, 220])))?;
//! session.on_tag_update(vec![("robot".to_string(), Point2::new(32.0, 24.0))]);
//!
//! let scan = session.request_scan("robot")?;
//! assert_eq!(scan.ranges.len(), 6);
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `tapemap::core`: geometry primitives and [`DetectedRegion`].
//! - `tapemap::detect`: color segmentation and contour shape filtering.
//! - `tapemap::grid`: occupancy map, accumulator and ray-march scanner.

mod config;
mod error;
mod locator;
mod session;
mod sink;

pub use tapemap_core as core;
pub use tapemap_detect as detect;
pub use tapemap_grid as grid;

pub use config::{ConfigError, SessionParams, TapeMapConfig};
pub use error::TapeMapError;
pub use locator::{TagTable, TargetLocator};
pub use session::{FrameReport, TapeMapSession};
pub use sink::{MapSink, MemorySink, NullSink, PngSink, SinkError};

pub use tapemap_core::DetectedRegion;
pub use tapemap_grid::{OccupancyMap, ScanResult};
