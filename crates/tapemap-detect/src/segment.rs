use crate::{rgb_to_hsv, DetectError, SegmentParams};
use image::{GrayImage, Luma, RgbImage};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Mask value for pixels inside the HSV band.
pub const MASK_ON: u8 = 255;
/// Mask value for pixels outside the HSV band.
pub const MASK_OFF: u8 = 0;

/// Frame -> binary obstacle mask.
#[derive(Clone, Debug)]
pub struct ColorMaskSegmenter {
    params: SegmentParams,
}

impl ColorMaskSegmenter {
    pub fn new(params: SegmentParams) -> Result<Self, DetectError> {
        params.validate()?;
        Ok(Self { params })
    }

    #[inline]
    pub fn params(&self) -> &SegmentParams {
        &self.params
    }

    /// Blur, convert to HSV and threshold against the configured band.
    ///
    /// The output has the frame's dimensions and holds only [`MASK_ON`] /
    /// [`MASK_OFF`].
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, frame), fields(width = frame.width(), height = frame.height()))
    )]
    pub fn segment(&self, frame: &RgbImage) -> Result<GrayImage, DetectError> {
        let (width, height) = frame.dimensions();
        if width == 0 || height == 0 {
            return Err(DetectError::EmptyFrame { width, height });
        }

        let blurred = box_blur_rgb(frame, self.params.blur_kernel / 2);
        let band = self.params.band;

        let mut mask = GrayImage::new(width, height);
        for (dst, src) in mask.pixels_mut().zip(blurred.pixels()) {
            let on = band.contains(rgb_to_hsv(src.0));
            *dst = Luma([if on { MASK_ON } else { MASK_OFF }]);
        }
        Ok(mask)
    }
}

/// Normalized box blur applied channel by channel.
///
/// Borders are reflected without repeating the edge pixel (`gfedcb|abcdefgh`),
/// so edge pixels average the same neighbourhood as interior ones.
fn box_blur_rgb(frame: &RgbImage, radius: u32) -> RgbImage {
    if radius == 0 {
        return frame.clone();
    }
    let (width, height) = frame.dimensions();
    let r = radius as i64;
    let channels: Vec<GrayImage> = (0..3)
        .map(|c| {
            let padded = GrayImage::from_fn(width + 2 * radius, height + 2 * radius, |x, y| {
                let sx = reflect_101(x as i64 - r, width);
                let sy = reflect_101(y as i64 - r, height);
                Luma([frame.get_pixel(sx, sy)[c]])
            });
            imageproc::filter::box_filter(&padded, radius, radius)
        })
        .collect();

    RgbImage::from_fn(width, height, |x, y| {
        let (px, py) = (x + radius, y + radius);
        image::Rgb([
            channels[0].get_pixel(px, py)[0],
            channels[1].get_pixel(px, py)[0],
            channels[2].get_pixel(px, py)[0],
        ])
    })
}

/// Map `i` into `0..len` by mirroring about the first and last index.
fn reflect_101(i: i64, len: u32) -> u32 {
    let n = len as i64;
    if n <= 1 {
        return 0;
    }
    let period = 2 * (n - 1);
    let m = i.rem_euclid(period);
    (if m >= n { period - m } else { m }) as u32
}
