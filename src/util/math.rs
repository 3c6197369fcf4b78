//! Numeric helpers for the refinement kernels.

use crate::image::Tile;

/// Bilinear sample at fractional tile-local coordinates.
///
/// Returns `None` when the 2x2 support would leave the tile.
pub(crate) fn bilinear(tile: &Tile<f32>, u: f32, v: f32) -> Option<f32> {
    if !u.is_finite() || !v.is_finite() {
        return None;
    }
    let u0 = u.floor();
    let v0 = v.floor();
    let iu = u0 as i32;
    let iv = v0 as i32;
    if iu < 0 || iv < 0 || iu + 1 >= tile.width() || iv + 1 >= tile.height() {
        return None;
    }

    let fu = u - u0;
    let fv = v - v0;
    let p00 = tile.rel(iu, iv);
    let p10 = tile.rel(iu + 1, iv);
    let p01 = tile.rel(iu, iv + 1);
    let p11 = tile.rel(iu + 1, iv + 1);

    let top = p00 + fu * (p10 - p00);
    let bottom = p01 + fu * (p11 - p01);
    Some(top + fv * (bottom - top))
}
