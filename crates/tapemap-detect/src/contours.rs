//! Contour extraction and shape-based filtering.
//!
//! The pipeline is a single filter-and-compact pass: each external contour
//! is normalized, tested against the size ceiling, then against the
//! fill-ratio band, and only survivors are turned into [`DetectedRegion`]s.

use crate::{ContourFilterParams, DetectError};
use image::GrayImage;
use imageproc::contours::{find_contours, BorderType};
use imageproc::geometry::approximate_polygon_dp;
use imageproc::point::Point;
use log::debug;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use tapemap_core::{bounding_rect, min_enclosing_circle, signed_area, DetectedRegion};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Closed pixel contour as produced by border following.
pub type Contour = Vec<Point<i32>>;

/// Per-call bookkeeping of what the filter dropped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractStats {
    /// External contours found on the edge map.
    pub found: usize,
    /// Dropped by the area ceiling.
    pub too_large: usize,
    /// Dropped as solid rectangles.
    pub rectangular: usize,
    pub kept: usize,
}

/// Mask -> filtered obstacle regions.
#[derive(Clone, Debug)]
pub struct ContourShapeFilter {
    params: ContourFilterParams,
}

impl ContourShapeFilter {
    pub fn new(params: ContourFilterParams) -> Result<Self, DetectError> {
        params.validate()?;
        Ok(Self { params })
    }

    #[inline]
    pub fn params(&self) -> &ContourFilterParams {
        &self.params
    }

    /// Extract obstacle regions from a binary mask.
    ///
    /// Output follows contour discovery order on the edge map. Compare results
    /// as sets when testing.
    pub fn extract(&self, mask: &GrayImage) -> Vec<DetectedRegion> {
        self.extract_with_stats(mask).0
    }

    /// Same as [`Self::extract`], also reporting how many contours each rule dropped.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, mask), fields(width = mask.width(), height = mask.height()))
    )]
    pub fn extract_with_stats(&self, mask: &GrayImage) -> (Vec<DetectedRegion>, ExtractStats) {
        if mask.width() == 0 || mask.height() == 0 {
            return (Vec::new(), ExtractStats::default());
        }
        let edges = imageproc::edges::canny(mask, self.params.canny_low, self.params.canny_high);
        self.filter_contours(external_contours(&edges))
    }

    /// Run the size and shape filters over already-traced contours.
    pub fn filter_contours(&self, contours: Vec<Contour>) -> (Vec<DetectedRegion>, ExtractStats) {
        let p = &self.params;
        let mut stats = ExtractStats {
            found: contours.len(),
            ..ExtractStats::default()
        };

        let mut regions = Vec::with_capacity(contours.len());
        for mut contour in contours {
            if contour.is_empty() {
                continue;
            }

            let signed = signed_area(&to_points(&contour));
            if signed < 0.0 {
                contour.reverse();
            }
            let area = signed.abs();
            if area > p.max_area {
                stats.too_large += 1;
                continue;
            }

            let poly = if contour.len() >= 3 {
                to_points(&approximate_polygon_dp(&contour, p.poly_epsilon, true))
            } else {
                to_points(&contour)
            };
            let (Some(rect), Some(circle)) = (bounding_rect(&poly), min_enclosing_circle(&poly))
            else {
                continue;
            };

            let fill_ratio = area / rect.area() as f32;
            if fill_ratio > p.fill_ratio_min && fill_ratio < p.fill_ratio_max && area > p.min_area {
                stats.rectangular += 1;
                continue;
            }

            regions.push(DetectedRegion {
                center: circle.center,
                inflation_radius: circle.radius.max(p.min_radius) + p.radius_margin,
                bounding_box: rect,
                area,
            });
        }
        stats.kept = regions.len();

        debug!(
            "contours: found={} too_large={} rectangular={} kept={}",
            stats.found, stats.too_large, stats.rectangular, stats.kept
        );
        (regions, stats)
    }
}

/// Outermost contours only (outer borders without a parent).
fn external_contours(edges: &GrayImage) -> Vec<Contour> {
    find_contours::<i32>(edges)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .map(|c| c.points)
        .collect()
}

fn to_points(contour: &[Point<i32>]) -> Vec<Point2<f32>> {
    contour
        .iter()
        .map(|p| Point2::new(p.x as f32, p.y as f32))
        .collect()
}
