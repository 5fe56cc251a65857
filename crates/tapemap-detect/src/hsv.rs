//! 8-bit RGB -> HSV in the OpenCV convention (hue halved into `0..180`).

/// HSV triple: `[hue, saturation, value]`.
pub type Hsv = [u8; 3];

/// Convert one 8-bit RGB pixel to HSV.
///
/// Hue is degrees / 2 (so `0..180`), saturation is `255 * (max - min) / max`
/// and value is the max channel. Gray pixels get hue 0.
#[inline]
pub fn rgb_to_hsv(rgb: [u8; 3]) -> Hsv {
    let [r, g, b] = rgb.map(|c| c as f32);
    let v = r.max(g).max(b);
    let min = r.min(g).min(b);
    let diff = v - min;

    let s = if v > 0.0 { 255.0 * diff / v } else { 0.0 };

    let h = if diff <= 0.0 {
        0.0
    } else if v == r {
        60.0 * (g - b) / diff
    } else if v == g {
        120.0 + 60.0 * (b - r) / diff
    } else {
        240.0 + 60.0 * (r - g) / diff
    };
    let h = if h < 0.0 { h + 360.0 } else { h };

    // 359.x degrees rounds up to 180, which wraps to red again
    let hue = (h * 0.5).round() as u32 % 180;
    [hue as u8, s.round().min(255.0) as u8, v as u8]
}
