//! Tape detection from overhead color frames.
//!
//! Two stages, both stateless:
//! 1. [`ColorMaskSegmenter`]: box blur, RGB -> HSV, inclusive band threshold.
//!    Produces a 0/255 mask the size of the frame.
//! 2. [`ContourShapeFilter`]: Canny edges on the mask, external contours,
//!    winding normalization, then a size filter and a fill-ratio shape filter.
//!    Every survivor is reduced to a [`DetectedRegion`] (enclosing circle
//!    center plus an inflated radius).
//!
//! ```
//! use image::{Rgb, RgbImage};
//! use tapemap_detect::{ColorMaskSegmenter, ContourShapeFilter};
//!
//! let frame = RgbImage::from_pixel(32, 32, Rgb([255, 255, 255]));
//! let segmenter = ColorMaskSegmenter::new(Default::default()).unwrap();
//! let filter = ContourShapeFilter::new(Default::default()).unwrap();
//!
//! let mask = segmenter.segment(&frame).unwrap();
//! assert!(filter.extract(&mask).is_empty());
//! ```

mod contours;
mod error;
mod hsv;
mod params;
mod segment;

pub use contours::{Contour, ContourShapeFilter, ExtractStats};
pub use error::DetectError;
pub use hsv::{rgb_to_hsv, Hsv};
pub use params::{ContourFilterParams, HsvBand, SegmentParams};
pub use segment::{ColorMaskSegmenter, MASK_OFF, MASK_ON};

pub use tapemap_core::DetectedRegion;
