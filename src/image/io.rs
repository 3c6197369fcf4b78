//! Convenience helpers for grayscale file I/O via the `image` crate.
//!
//! Available when the `image-io` feature is enabled. Pixel values are mapped
//! to `f32` in `[0, 1]` on load, which is the scale the refinement kernels
//! and preprocessing filters operate on.

use std::path::Path;

use crate::image::{ImageBuf, Tile};
use crate::util::{DispRefineError, DispRefineResult};

/// Converts a grayscale buffer into an owned float image.
pub fn buf_from_gray_image(img: &image::GrayImage) -> DispRefineResult<ImageBuf<f32>> {
    let cols = img.width() as i32;
    let rows = img.height() as i32;
    let data = img.as_raw().iter().map(|&p| p as f32 / 255.0).collect();
    ImageBuf::from_vec(data, cols, rows)
}

/// Loads an image from disk and converts it to a grayscale float image.
pub fn load_gray_image<P: AsRef<Path>>(path: P) -> DispRefineResult<ImageBuf<f32>> {
    let img = image::open(path).map_err(|err| DispRefineError::ImageIo {
        reason: err.to_string(),
    })?;
    buf_from_gray_image(&img.to_luma8())
}

/// Writes a float tile as an 8-bit grayscale image, mapping `[lo, hi]` to the
/// full intensity range.
pub fn save_gray_tile<P: AsRef<Path>>(
    path: P,
    tile: &Tile<f32>,
    lo: f32,
    hi: f32,
) -> DispRefineResult<()> {
    let span = (hi - lo).max(f32::EPSILON);
    let mut img = image::GrayImage::new(tile.width() as u32, tile.height() as u32);
    for v in 0..tile.height() {
        for u in 0..tile.width() {
            let norm = ((tile.rel(u, v) - lo) / span).clamp(0.0, 1.0);
            img.put_pixel(u as u32, v as u32, image::Luma([(norm * 255.0) as u8]));
        }
    }
    img.save(path).map_err(|err| DispRefineError::ImageIo {
        reason: err.to_string(),
    })
}
