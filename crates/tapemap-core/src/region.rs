use crate::PixelRect;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// One obstacle region that survived shape filtering in a single frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectedRegion {
    /// Center of the minimum enclosing circle, in pixels.
    pub center: Point2<f32>,
    /// Enclosing-circle radius after clamping and safety margin.
    pub inflation_radius: f32,
    /// Bounding box of the polygonal approximation.
    pub bounding_box: PixelRect,
    /// Unsigned contour area in px².
    pub area: f32,
}

impl DetectedRegion {
    /// Region without contour metadata; used when rendering externally supplied obstacles.
    pub fn disk(center: Point2<f32>, inflation_radius: f32) -> Self {
        let r = inflation_radius.max(0.0);
        let x0 = (center.x - r).floor() as i32;
        let y0 = (center.y - r).floor() as i32;
        let x1 = (center.x + r).floor() as i32;
        let y1 = (center.y + r).floor() as i32;
        Self {
            center,
            inflation_radius,
            bounding_box: PixelRect {
                x: x0,
                y: y0,
                width: x1 - x0 + 1,
                height: y1 - y0 + 1,
            },
            area: std::f32::consts::PI * r * r,
        }
    }
}
