//! Disparity pixels and the operations the refiner runs on whole tiles.
//!
//! A disparity map stores, per pixel of the left image, the offset to its
//! correspondence in the right image. Pixels the upstream correlator could
//! not match carry a missing marker instead; their offset payload is
//! meaningless and every tile operation here tests the marker before touching
//! the offsets.

use crate::geom::{Region, Vec2i};
use crate::image::Tile;

/// Per-pixel stereo disparity estimate.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Disparity {
    h: f32,
    v: f32,
    missing: bool,
}

impl Disparity {
    /// A valid estimate with the given horizontal and vertical offsets.
    pub fn new(h: f32, v: f32) -> Self {
        Self {
            h,
            v,
            missing: false,
        }
    }

    /// The marker for a pixel without a correspondence.
    pub fn missing() -> Self {
        Self {
            h: 0.0,
            v: 0.0,
            missing: true,
        }
    }

    pub fn is_missing(&self) -> bool {
        self.missing
    }

    /// Horizontal offset. Meaningless on missing pixels.
    pub fn h(&self) -> f32 {
        debug_assert!(!self.missing, "offset read on missing disparity");
        self.h
    }

    /// Vertical offset. Meaningless on missing pixels.
    pub fn v(&self) -> f32 {
        debug_assert!(!self.missing, "offset read on missing disparity");
        self.v
    }
}

impl Default for Disparity {
    fn default() -> Self {
        Self::missing()
    }
}

/// Scans a tile for the bounding range of valid offsets.
///
/// Returns the range as a region in offset space together with the number of
/// valid pixels. The region contains every integer offset cell reachable by a
/// valid estimate (fractional offsets round outward). A tile without valid
/// pixels yields the degenerate 1x1 span at the origin, which downstream
/// window planning treats like any other range.
pub fn disparity_range(tile: &Tile<Disparity>) -> (Region, usize) {
    let mut num_valid = 0usize;
    let mut min_h = f32::INFINITY;
    let mut min_v = f32::INFINITY;
    let mut max_h = f32::NEG_INFINITY;
    let mut max_v = f32::NEG_INFINITY;

    for d in tile.data() {
        if d.is_missing() {
            continue;
        }
        num_valid += 1;
        min_h = min_h.min(d.h());
        min_v = min_v.min(d.v());
        max_h = max_h.max(d.h());
        max_v = max_v.max(d.v());
    }

    if num_valid == 0 {
        return (Region::from_size(Vec2i::ZERO, Vec2i::new(1, 1)), 0);
    }

    let min = Vec2i::new(min_h.floor() as i32, min_v.floor() as i32);
    let max = Vec2i::new(max_h.ceil() as i32 + 1, max_v.ceil() as i32 + 1);
    (Region::new(min, max), num_valid)
}

/// Rewrites valid offsets to be relative to `origin` (the search-range min),
/// the frame the correlation kernels index the right patch in.
pub fn localize(tile: &mut Tile<Disparity>, origin: Vec2i) {
    for d in tile.data_mut() {
        if !d.is_missing() {
            d.h -= origin.x as f32;
            d.v -= origin.y as f32;
        }
    }
}

/// Undoes `localize`, restoring offsets to the full-image frame.
pub fn globalize(tile: &mut Tile<Disparity>, origin: Vec2i) {
    for d in tile.data_mut() {
        if !d.is_missing() {
            d.h += origin.x as f32;
            d.v += origin.y as f32;
        }
    }
}
