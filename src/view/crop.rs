//! Cropped views with a re-based coordinate frame.

use crate::geom::Region;
use crate::image::Tile;
use crate::util::DispRefineResult;
use crate::view::{Shape, TileSource};

/// Presents a window of a child source as a view whose own frame starts at
/// `(0, 0)`.
///
/// Requested regions are translated back into the child's frame before
/// delegating, so the child decides whether an out-of-window request is
/// legal: a plain leaf raises `OutOfBounds`, an edge-extended child serves
/// fill values. The window itself may lie partially or wholly outside the
/// child's native bounds when the child extends its edges.
pub struct CropView<S> {
    child: S,
    window: Region,
}

impl<S: TileSource> CropView<S> {
    pub fn new(child: S, window: Region) -> Self {
        Self { child, window }
    }

    /// The child-frame window this view exposes.
    pub fn window(&self) -> Region {
        self.window
    }
}

impl<S: TileSource> TileSource for CropView<S> {
    type Pixel = S::Pixel;

    fn shape(&self) -> Shape {
        Shape::new(
            self.window.width(),
            self.window.height(),
            self.child.shape().planes,
        )
    }

    fn produce_tile(&self, region: Region) -> DispRefineResult<Tile<Self::Pixel>> {
        let child_region = region.translate(self.window.min());
        let tile = self.child.produce_tile(child_region)?;
        // Re-base the produced tile into this view's frame.
        let rebased = tile.region().translate(-self.window.min());
        Tile::from_vec(rebased, tile.data().to_vec())
    }

    fn sample(&self, x: i32, y: i32) -> DispRefineResult<Self::Pixel> {
        self.child
            .sample(x + self.window.min().x, y + self.window.min().y)
    }
}

#[cfg(test)]
mod tests {
    use super::CropView;
    use crate::geom::{Region, Vec2i};
    use crate::image::ImageBuf;
    use crate::view::TileSource;

    #[test]
    fn crop_rebases_child_frame() {
        let data: Vec<i32> = (0..25).collect();
        let img = ImageBuf::from_vec(data, 5, 5).unwrap();
        let crop = CropView::new(&img, Region::new(Vec2i::new(1, 2), Vec2i::new(4, 5)));

        let shape = crop.shape();
        assert_eq!((shape.cols, shape.rows), (3, 3));

        let tile = crop
            .produce_tile(Region::new(Vec2i::ZERO, Vec2i::new(2, 2)))
            .unwrap();
        assert_eq!(tile.region().min(), Vec2i::ZERO);
        assert_eq!(tile.at(0, 0), 11);
        assert_eq!(tile.at(1, 1), 17);
        assert_eq!(crop.sample(0, 0).unwrap(), 11);
    }
}
