//! Core types shared by the tape mapping crates.
//!
//! This crate is purely geometric: it knows about pixel rectangles, enclosing
//! circles and the per-frame [`DetectedRegion`] record, but nothing about
//! images, color spaces or occupancy maps.

mod geometry;
mod logger;
mod region;

pub use geometry::{bounding_rect, min_enclosing_circle, signed_area, Circle, PixelRect};
pub use region::DetectedRegion;

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_with_level, level_from_verbosity};
