//! Edge extension: serving tiles beyond a child's native bounds.

use crate::geom::Region;
use crate::image::Tile;
use crate::util::DispRefineResult;
use crate::view::{Shape, TileSource};

/// Extends a child source with fill values beyond its native bounds.
///
/// The fill value is the pixel type's `Default`: zero for scalar imagery and
/// the missing marker for disparity pixels. Any requested region succeeds;
/// in-bounds cells carry the child's values, the rest carry fill.
pub struct ExtendView<S> {
    child: S,
}

impl<S> ExtendView<S> {
    pub fn new(child: S) -> Self {
        Self { child }
    }
}

impl<S: TileSource> TileSource for ExtendView<S>
where
    S::Pixel: Default,
{
    type Pixel = S::Pixel;

    fn shape(&self) -> Shape {
        self.child.shape()
    }

    fn produce_tile(&self, region: Region) -> DispRefineResult<Tile<Self::Pixel>> {
        let mut tile = Tile::filled(region, S::Pixel::default())?;
        let native = self.child.shape().bounds();
        let overlap = region.intersect(native);
        if !overlap.is_empty() {
            let inner = self.child.produce_tile(overlap)?;
            tile.blit(&inner);
        }
        Ok(tile)
    }

    fn sample(&self, x: i32, y: i32) -> DispRefineResult<Self::Pixel> {
        let native = self.child.shape().bounds();
        if native.contains(crate::geom::Vec2i::new(x, y)) {
            self.child.sample(x, y)
        } else {
            Ok(S::Pixel::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ExtendView;
    use crate::geom::{Region, Vec2i};
    use crate::image::ImageBuf;
    use crate::view::TileSource;

    #[test]
    fn extend_fills_outside_with_default() {
        let img = ImageBuf::from_vec(vec![1.0f32; 4], 2, 2).unwrap();
        let ext = ExtendView::new(&img);

        let tile = ext
            .produce_tile(Region::new(Vec2i::new(-1, -1), Vec2i::new(3, 3)))
            .unwrap();
        assert_eq!(tile.at(-1, -1), 0.0);
        assert_eq!(tile.at(0, 0), 1.0);
        assert_eq!(tile.at(1, 1), 1.0);
        assert_eq!(tile.at(2, 2), 0.0);
    }

    #[test]
    fn extend_serves_fully_external_regions() {
        let img = ImageBuf::from_vec(vec![5.0f32; 4], 2, 2).unwrap();
        let ext = ExtendView::new(&img);

        let tile = ext
            .produce_tile(Region::new(Vec2i::new(10, 10), Vec2i::new(12, 12)))
            .unwrap();
        assert!(tile.data().iter().all(|&v| v == 0.0));
        assert_eq!(ext.sample(11, 11).unwrap(), 0.0);
    }
}
