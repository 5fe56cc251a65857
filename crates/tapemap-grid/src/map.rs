use crate::GridError;
use image::{GrayImage, Luma};

/// Intensity of a cell nothing has been learned about.
pub const NEUTRAL: f32 = 127.0;

/// Row-major grid of occupancy intensities in `[0, 255]`.
///
/// Dimensions are fixed at construction.
#[derive(Clone, Debug, PartialEq)]
pub struct OccupancyMap {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl OccupancyMap {
    /// Map filled with `value`. Zero-sized maps are rejected.
    pub fn filled(width: u32, height: u32, value: f32) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::EmptyMap { width, height });
        }
        Ok(Self {
            width,
            height,
            data: vec![value.clamp(0.0, 255.0); width as usize * height as usize],
        })
    }

    /// Map with every cell at [`NEUTRAL`].
    ///
    /// # Panics
    /// If either dimension is zero.
    pub fn neutral(width: u32, height: u32) -> Self {
        assert!(width > 0 && height > 0, "occupancy map must be non-empty");
        Self {
            width,
            height,
            data: vec![NEUTRAL; width as usize * height as usize],
        }
    }

    /// Lift an 8-bit image (e.g. a previously published map).
    pub fn from_gray_image(img: &GrayImage) -> Result<Self, GridError> {
        let (width, height) = img.dimensions();
        if width == 0 || height == 0 {
            return Err(GridError::EmptyMap { width, height });
        }
        Ok(Self {
            width,
            height,
            data: img.as_raw().iter().map(|&v| v as f32).collect(),
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < self.width as i64 && y < self.height as i64
    }

    /// Cell value, `None` outside the map.
    #[inline]
    pub fn get(&self, x: i64, y: i64) -> Option<f32> {
        if !self.contains(x, y) {
            return None;
        }
        Some(self.data[y as usize * self.width as usize + x as usize])
    }

    /// Set a cell, clamped to `[0, 255]`. Out-of-range writes are ignored.
    pub fn set(&mut self, x: i64, y: i64, value: f32) {
        if self.contains(x, y) {
            let idx = y as usize * self.width as usize + x as usize;
            self.data[idx] = value.clamp(0.0, 255.0);
        }
    }

    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    pub(crate) fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Render as mono8 (rounded, saturated) for publishing.
    pub fn to_gray_image(&self) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| {
            let v = self.data[y as usize * self.width as usize + x as usize];
            Luma([v.round().clamp(0.0, 255.0) as u8])
        })
    }
}
