//! Patch preprocessing filters for the parabola refinement path.
//!
//! The parabola kernel expects its patches filtered the same way the upstream
//! integer correlator filtered them; the affine kernels preprocess internally
//! and receive raw patches. Filters run in place on a materialized tile.

use crate::image::Tile;

/// In-place preprocessing applied to an image patch before correlation.
pub trait PreprocFilter {
    fn apply(&self, patch: &mut Tile<f32>);
}

/// Leaves the patch untouched.
#[derive(Copy, Clone, Debug, Default)]
pub struct IdentityFilter;

impl PreprocFilter for IdentityFilter {
    fn apply(&self, _patch: &mut Tile<f32>) {}
}

/// Separable box blur with edge clamping.
#[derive(Copy, Clone, Debug)]
pub struct BoxBlurFilter {
    pub radius: i32,
}

impl BoxBlurFilter {
    pub fn new(radius: i32) -> Self {
        Self { radius: radius.max(0) }
    }
}

impl PreprocFilter for BoxBlurFilter {
    fn apply(&self, patch: &mut Tile<f32>) {
        if self.radius == 0 {
            return;
        }
        let w = patch.width();
        let h = patch.height();
        let r = self.radius;
        let norm = 1.0 / (2 * r + 1) as f32;

        // Horizontal pass.
        let mut tmp = vec![0.0f32; w as usize * h as usize];
        for v in 0..h {
            for u in 0..w {
                let mut acc = 0.0;
                for k in -r..=r {
                    let uu = (u + k).clamp(0, w - 1);
                    acc += patch.rel(uu, v);
                }
                tmp[v as usize * w as usize + u as usize] = acc * norm;
            }
        }
        // Vertical pass.
        for v in 0..h {
            for u in 0..w {
                let mut acc = 0.0;
                for k in -r..=r {
                    let vv = (v + k).clamp(0, h - 1);
                    acc += tmp[vv as usize * w as usize + u as usize];
                }
                patch.set_rel(u, v, acc * norm);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BoxBlurFilter, IdentityFilter, PreprocFilter};
    use crate::geom::{Region, Vec2i};
    use crate::image::Tile;

    #[test]
    fn identity_preserves_patch() {
        let region = Region::from_size(Vec2i::ZERO, Vec2i::new(3, 3));
        let data: Vec<f32> = (0..9).map(|i| i as f32).collect();
        let mut patch = Tile::from_vec(region, data.clone()).unwrap();
        IdentityFilter.apply(&mut patch);
        assert_eq!(patch.data(), data.as_slice());
    }

    #[test]
    fn box_blur_preserves_constant_patches() {
        let region = Region::from_size(Vec2i::ZERO, Vec2i::new(5, 4));
        let mut patch = Tile::filled(region, 2.5f32).unwrap();
        BoxBlurFilter::new(1).apply(&mut patch);
        for &v in patch.data() {
            assert!((v - 2.5).abs() < 1e-6);
        }
    }

    #[test]
    fn box_blur_smooths_an_impulse() {
        let region = Region::from_size(Vec2i::ZERO, Vec2i::new(5, 5));
        let mut patch = Tile::filled(region, 0.0f32).unwrap();
        patch.set_rel(2, 2, 9.0);
        BoxBlurFilter::new(1).apply(&mut patch);
        assert!((patch.rel(2, 2) - 1.0).abs() < 1e-6);
        assert!((patch.rel(1, 1) - 1.0).abs() < 1e-6);
        assert!(patch.rel(0, 0).abs() < 1e-6);
    }
}
