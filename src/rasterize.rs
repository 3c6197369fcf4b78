//! Block-by-block rasterization of a view into one owned tile.
//!
//! This is the driver a pipeline end uses to materialize a region of a lazy
//! chain. It decides which tiles to request and in what order; the views
//! themselves stay pull-based and stateless, so with the `rayon` feature the
//! blocks can be produced by a worker pool without any locking.

use crate::geom::{Region, Vec2i};
use crate::image::Tile;
use crate::util::{DispRefineError, DispRefineResult};
use crate::view::TileSource;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

fn block_regions(region: Region, block_size: Vec2i) -> DispRefineResult<Vec<Region>> {
    if block_size.x < 1 || block_size.y < 1 {
        return Err(DispRefineError::InvalidConfiguration {
            reason: "block size must be positive",
        });
    }
    let mut blocks = Vec::new();
    let mut y = region.min().y;
    while y < region.max().y {
        let y1 = (y + block_size.y).min(region.max().y);
        let mut x = region.min().x;
        while x < region.max().x {
            let x1 = (x + block_size.x).min(region.max().x);
            blocks.push(Region::new(Vec2i::new(x, y), Vec2i::new(x1, y1)));
            x = x1;
        }
        y = y1;
    }
    Ok(blocks)
}

/// Materializes `region` from `source` in blocks of at most `block_size`.
pub fn rasterize<S>(source: &S, region: Region, block_size: Vec2i) -> DispRefineResult<Tile<S::Pixel>>
where
    S: TileSource,
    S::Pixel: Default,
{
    if region.is_empty() {
        return Err(DispRefineError::EmptyRegion { region });
    }
    let mut out = Tile::filled(region, S::Pixel::default())?;
    for block in block_regions(region, block_size)? {
        let tile = source.produce_tile(block)?;
        out.blit(&tile);
    }
    Ok(out)
}

/// Like `rasterize`, but produces blocks on the rayon worker pool.
///
/// Tile production has no shared mutable state, so blocks parallelize
/// freely; assembly stays sequential.
#[cfg(feature = "rayon")]
pub fn rasterize_par<S>(
    source: &S,
    region: Region,
    block_size: Vec2i,
) -> DispRefineResult<Tile<S::Pixel>>
where
    S: TileSource + Sync,
    S::Pixel: Default + Send,
{
    if region.is_empty() {
        return Err(DispRefineError::EmptyRegion { region });
    }
    let blocks = block_regions(region, block_size)?;
    let tiles: Vec<_> = blocks
        .into_par_iter()
        .map(|block| source.produce_tile(block))
        .collect();

    let mut out = Tile::filled(region, S::Pixel::default())?;
    for tile in tiles {
        out.blit(&tile?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::{block_regions, rasterize};
    use crate::geom::{Region, Vec2i};
    use crate::image::ImageBuf;

    #[test]
    fn blocks_cover_the_region_exactly() {
        let region = Region::new(Vec2i::new(0, 0), Vec2i::new(10, 7));
        let blocks = block_regions(region, Vec2i::new(4, 3)).unwrap();
        assert_eq!(blocks.len(), 9);
        let covered: usize = blocks.iter().map(|b| b.area()).sum();
        assert_eq!(covered, region.area());
        assert!(blocks.iter().all(|b| region.contains_region(*b)));
    }

    #[test]
    fn rasterize_matches_a_single_pull() {
        let data: Vec<i32> = (0..64).collect();
        let img = ImageBuf::from_vec(data, 8, 8).unwrap();
        let region = Region::new(Vec2i::new(1, 1), Vec2i::new(7, 6));

        let blocked = rasterize(&img, region, Vec2i::new(3, 2)).unwrap();
        let direct = crate::view::TileSource::produce_tile(&img, region).unwrap();
        assert_eq!(blocked, direct);
    }

    #[test]
    fn rasterize_rejects_bad_block_size() {
        let img = ImageBuf::from_vec(vec![0i32; 4], 2, 2).unwrap();
        let region = Region::new(Vec2i::new(0, 0), Vec2i::new(2, 2));
        assert!(rasterize(&img, region, Vec2i::new(0, 2)).is_err());
    }
}
