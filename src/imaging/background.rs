//! Flat background removal.
//!
//! The reference color is the top-left pixel of the buffer being processed,
//! sampled fresh on every call. Pixels whose RGB lies within [`Threshold`]
//! (Euclidean distance) of it get alpha 0; nothing else changes. There is no
//! connectivity analysis, so foreground that happens to match the corner
//! color is cleared too, and gradients that drift past the threshold stay.

use super::params::Threshold;
use image::RgbaImage;

/// Zero the alpha of every pixel close to the color at (0, 0).
///
/// Never touches RGB or dimensions. Applying it twice equals applying it
/// once. A zero-sized buffer is left alone.
pub fn strip_background(buffer: &mut RgbaImage, threshold: Threshold) {
    if buffer.width() == 0 || buffer.height() == 0 {
        return;
    }

    let [bg_r, bg_g, bg_b, _] = buffer.get_pixel(0, 0).0;
    // Compare squared distances; equivalent to d < t for t >= 0
    let limit = threshold.value() * threshold.value();

    for pixel in buffer.pixels_mut() {
        let [r, g, b, _] = pixel.0;
        let dr = r as f64 - bg_r as f64;
        let dg = g as f64 - bg_g as f64;
        let db = b as f64 - bg_b as f64;
        if dr * dr + dg * dg + db * db < limit {
            pixel.0[3] = 0;
        }
    }
}
