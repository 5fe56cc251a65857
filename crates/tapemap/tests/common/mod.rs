#![allow(dead_code)]

use image::{Rgb, RgbImage};
use tapemap::TapeMapConfig;

/// Dark floor; stays out of the tape band even after blurring into tape.
pub const FLOOR: Rgb<u8> = Rgb([60, 60, 60]);
/// Dark blue tape, inside the default HSV band.
pub const TAPE: Rgb<u8> = Rgb([10, 20, 60]);

pub const PATCHES: [(u32, u32); 3] = [(8, 8), (40, 10), (10, 42)];
pub const PATCH_SIDE: u32 = 4;

pub fn floor_frame(w: u32, h: u32) -> RgbImage {
    RgbImage::from_pixel(w, h, FLOOR)
}

/// 64x64 frame with three small tape patches.
pub fn taped_frame() -> RgbImage {
    let mut frame = floor_frame(64, 64);
    for &(x0, y0) in &PATCHES {
        for y in y0..y0 + PATCH_SIDE {
            for x in x0..x0 + PATCH_SIDE {
                frame.put_pixel(x, y, TAPE);
            }
        }
    }
    frame
}

/// 64x64 frame with a 32x16 tape block at `x 16..48, y 24..40`.
pub fn tape_block_frame() -> RgbImage {
    let mut frame = floor_frame(64, 64);
    for y in 24..40 {
        for x in 16..48 {
            frame.put_pixel(x, y, TAPE);
        }
    }
    frame
}

/// Config where tape is drawn bright so the default `above` scan sees it.
pub fn bright_tape_config() -> TapeMapConfig {
    let mut config = TapeMapConfig::default();
    config.contours.max_area = 60.0;
    config.accumulate.region_value = 255;
    config
}
