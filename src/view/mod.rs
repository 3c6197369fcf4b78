//! Lazy, pull-based 2D data sources.
//!
//! A `TileSource` can report its shape and materialize a tile for any
//! requested region. Composed sources (crop, edge extension, the subpixel
//! refiner itself) recursively request the tiles they need from their inputs,
//! so a consumer of the final view only ever pays for the pixels it asks for.
//! Production is deterministic: the same region on an unmodified chain yields
//! bit-identical tiles. No caching happens inside the chain; a memoizing
//! layer, if wanted, wraps a source from the outside.

use std::sync::Arc;

use crate::geom::Region;
use crate::image::{ImageBuf, Tile};
use crate::util::{DispRefineError, DispRefineResult};

pub mod crop;
pub mod extend;

pub use crop::CropView;
pub use extend::ExtendView;

/// Dimensions of a 2D source: columns, rows and plane count.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Shape {
    pub cols: i32,
    pub rows: i32,
    pub planes: i32,
}

impl Shape {
    pub fn new(cols: i32, rows: i32, planes: i32) -> Self {
        Self { cols, rows, planes }
    }

    /// The native extent as a region anchored at the origin.
    pub fn bounds(&self) -> Region {
        Region::from_size(
            crate::geom::Vec2i::ZERO,
            crate::geom::Vec2i::new(self.cols, self.rows),
        )
    }
}

/// A shape-queryable source that materializes tiles on demand.
pub trait TileSource {
    type Pixel: Copy;

    /// Constant-time shape query, stable for the source's lifetime.
    fn shape(&self) -> Shape;

    /// Materializes the tile covering `region`.
    ///
    /// Sources that extend their edges accept any region; others fail with
    /// `OutOfBounds` when `region` leaves their native bounds.
    fn produce_tile(&self, region: Region) -> DispRefineResult<Tile<Self::Pixel>>;

    /// Single-pixel access, where the source supports it.
    fn sample(&self, x: i32, y: i32) -> DispRefineResult<Self::Pixel>;
}

/// Shared, type-erased source handle for composing recursive view chains.
pub type SharedSource<P> = Arc<dyn TileSource<Pixel = P> + Send + Sync>;

impl<S: TileSource + ?Sized> TileSource for &S {
    type Pixel = S::Pixel;

    fn shape(&self) -> Shape {
        (**self).shape()
    }

    fn produce_tile(&self, region: Region) -> DispRefineResult<Tile<Self::Pixel>> {
        (**self).produce_tile(region)
    }

    fn sample(&self, x: i32, y: i32) -> DispRefineResult<Self::Pixel> {
        (**self).sample(x, y)
    }
}

impl<S: TileSource + ?Sized> TileSource for Arc<S> {
    type Pixel = S::Pixel;

    fn shape(&self) -> Shape {
        (**self).shape()
    }

    fn produce_tile(&self, region: Region) -> DispRefineResult<Tile<Self::Pixel>> {
        (**self).produce_tile(region)
    }

    fn sample(&self, x: i32, y: i32) -> DispRefineResult<Self::Pixel> {
        (**self).sample(x, y)
    }
}

impl<T: Copy> TileSource for ImageBuf<T> {
    type Pixel = T;

    fn shape(&self) -> Shape {
        Shape::new(self.cols(), self.rows(), 1)
    }

    fn produce_tile(&self, region: Region) -> DispRefineResult<Tile<T>> {
        if region.is_empty() {
            return Err(DispRefineError::EmptyRegion { region });
        }
        if !self.bounds().contains_region(region) {
            return Err(DispRefineError::OutOfBounds {
                requested: region,
                cols: self.cols(),
                rows: self.rows(),
            });
        }
        let mut data = Vec::with_capacity(region.area());
        for y in region.min().y..region.max().y {
            for x in region.min().x..region.max().x {
                data.push(self.get(x, y).expect("region checked against bounds"));
            }
        }
        Tile::from_vec(region, data)
    }

    fn sample(&self, x: i32, y: i32) -> DispRefineResult<T> {
        self.get(x, y).ok_or(DispRefineError::OutOfBounds {
            requested: Region::from_size(crate::geom::Vec2i::new(x, y), crate::geom::Vec2i::new(1, 1)),
            cols: self.cols(),
            rows: self.rows(),
        })
    }
}
