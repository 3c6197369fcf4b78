//! Correlation window planning: the minimal left/right crops for a tile.

use crate::disparity::{disparity_range, Disparity};
use crate::geom::{Region, Vec2i};
use crate::image::Tile;

/// The crop windows and search range one refinement tile needs.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct WindowPlan {
    /// Left-image crop, anchored at the output region's origin.
    pub left_crop: Region,
    /// Right-image crop, spanning every pixel reachable by a seeded offset.
    pub right_crop: Region,
    /// Bounding range of valid offsets, in offset space.
    pub search_range: Region,
    /// Number of valid pixels seen in the seeded tile.
    pub valid_count: usize,
}

/// Plans the image crops for refining `seeded` with the given kernel
/// half-extents.
///
/// The right crop shifts and widens the output region by the search range so
/// every reachable right-image pixel is covered; the left crop keeps the
/// output origin but matches the right crop's size, because the correlation
/// kernels require patches of identical dimensions. Both then grow by the
/// kernel half-extent on every side for window support. The two crops always
/// end up the same size.
pub fn plan_windows(seeded: &Tile<Disparity>, half_kernel: Vec2i) -> WindowPlan {
    let requested = seeded.region();
    let (search_range, valid_count) = disparity_range(seeded);

    let right_crop = Region::new(
        requested.min() + search_range.min(),
        requested.max() + search_range.max(),
    );
    let left_crop = Region::from_size(requested.min(), right_crop.size());

    let left_crop = left_crop.grow(half_kernel.x, half_kernel.y);
    let right_crop = right_crop.grow(half_kernel.x, half_kernel.y);
    debug_assert_eq!(left_crop.size(), right_crop.size());

    WindowPlan {
        left_crop,
        right_crop,
        search_range,
        valid_count,
    }
}
