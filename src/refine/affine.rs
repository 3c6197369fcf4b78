//! Affine-2D subpixel kernels: Gauss-Newton window fits with three
//! weighting policies (uniform, robust, EM), covering modes 1-3.

use nalgebra::{SMatrix, SVector};

use crate::disparity::Disparity;
use crate::geom::Vec2i;
use crate::image::Tile;
use crate::util::math::bilinear;

type Mat6 = SMatrix<f64, 6, 6>;
type Vec6 = SVector<f64, 6>;

const MAX_ITERS: usize = 10;
const CONVERGENCE_TOL: f64 = 1e-3;
const DAMPING: f64 = 1e-6;
const MIN_SAMPLES: usize = 6;
const EM_OUTLIER_DENSITY: f64 = 0.05;

/// How residuals are weighted inside the Gauss-Newton loop.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum WeightModel {
    Uniform,
    Robust,
    Em,
}

struct WindowSample {
    u: f64,
    v: f64,
    residual: f64,
    gx: f64,
    gy: f64,
}

/// One Gauss-Newton fit of a 6-parameter affine warp of the right window onto
/// the left window at `(ul, vl)`. Returns the translation part `(tx, ty)`.
fn fit_affine_window(
    left: &Tile<f32>,
    right: &Tile<f32>,
    ul: i32,
    vl: i32,
    seed: (f32, f32),
    half: Vec2i,
    model: WeightModel,
) -> Option<(f32, f32)> {
    // theta = [a11, a12, tx, a21, a22, ty]
    let mut theta = [0.0f64; 6];
    let mut inlier_frac = 0.8f64;

    for _ in 0..MAX_ITERS {
        let mut samples = Vec::with_capacity(((2 * half.x + 1) * (2 * half.y + 1)) as usize);
        for wv in -half.y..=half.y {
            for wu in -half.x..=half.x {
                let u = wu as f64;
                let v = wv as f64;
                let ru = (ul + wu) as f64
                    + seed.0 as f64
                    + theta[0] * u
                    + theta[1] * v
                    + theta[2];
                let rv = (vl + wv) as f64
                    + seed.1 as f64
                    + theta[3] * u
                    + theta[4] * v
                    + theta[5];

                let value = match bilinear(right, ru as f32, rv as f32) {
                    Some(value) => value,
                    None => continue,
                };
                let right_p = bilinear(right, (ru + 0.5) as f32, rv as f32);
                let right_m = bilinear(right, (ru - 0.5) as f32, rv as f32);
                let down_p = bilinear(right, ru as f32, (rv + 0.5) as f32);
                let down_m = bilinear(right, ru as f32, (rv - 0.5) as f32);
                let (gx, gy) = match (right_p, right_m, down_p, down_m) {
                    (Some(rp), Some(rm), Some(dp), Some(dm)) => {
                        ((rp - rm) as f64, (dp - dm) as f64)
                    }
                    _ => continue,
                };

                samples.push(WindowSample {
                    u,
                    v,
                    residual: value as f64 - left.rel(ul + wu, vl + wv) as f64,
                    gx,
                    gy,
                });
            }
        }
        if samples.len() < MIN_SAMPLES {
            return None;
        }

        let weights = compute_weights(&samples, model, &mut inlier_frac);

        let mut h = Mat6::zeros();
        let mut g = Vec6::zeros();
        for (s, &w) in samples.iter().zip(weights.iter()) {
            let j = Vec6::from_column_slice(&[
                s.gx * s.u,
                s.gx * s.v,
                s.gx,
                s.gy * s.u,
                s.gy * s.v,
                s.gy,
            ]);
            h += w * j * j.transpose();
            g += w * s.residual * j;
        }
        for k in 0..6 {
            h[(k, k)] += DAMPING;
        }

        let delta = h.lu().solve(&g)?;
        for (t, d) in theta.iter_mut().zip(delta.iter()) {
            *t -= d;
        }
        if delta.amax() < CONVERGENCE_TOL {
            break;
        }
    }

    let tx = theta[2];
    let ty = theta[5];
    if !tx.is_finite() || !ty.is_finite() {
        return None;
    }
    // A translation larger than the window means the fit wandered off.
    if tx.abs() > (half.x + 1) as f64 || ty.abs() > (half.y + 1) as f64 {
        return None;
    }
    Some((tx as f32, ty as f32))
}

fn compute_weights(samples: &[WindowSample], model: WeightModel, inlier_frac: &mut f64) -> Vec<f64> {
    match model {
        WeightModel::Uniform => vec![1.0; samples.len()],
        WeightModel::Robust => {
            let scale = (samples.iter().map(|s| s.residual.abs()).sum::<f64>()
                / samples.len() as f64)
                .max(1e-6);
            samples
                .iter()
                .map(|s| {
                    let t = s.residual / scale;
                    1.0 / (1.0 + t * t)
                })
                .collect()
        }
        WeightModel::Em => {
            let sigma2 = (samples.iter().map(|s| s.residual * s.residual).sum::<f64>()
                / samples.len() as f64)
                .max(1e-8);
            let norm = 1.0 / (2.0 * std::f64::consts::PI * sigma2).sqrt();
            let weights: Vec<f64> = samples
                .iter()
                .map(|s| {
                    let inlier = *inlier_frac * norm * (-s.residual * s.residual / (2.0 * sigma2)).exp();
                    let outlier = (1.0 - *inlier_frac) * EM_OUTLIER_DENSITY;
                    inlier / (inlier + outlier)
                })
                .collect();
            *inlier_frac =
                (weights.iter().sum::<f64>() / weights.len() as f64).clamp(0.05, 0.95);
            weights
        }
    }
}

/// Refines every valid pixel by fitting an affine warp of its right window.
///
/// Pixels whose fit diverges, runs out of window support, or lands outside
/// the window are marked missing, matching the behavior of the integer
/// correlator's rejection path. Disabled axes keep their seeded component.
pub(crate) fn refine(
    disp: &mut Tile<Disparity>,
    left: &Tile<f32>,
    right: &Tile<f32>,
    half: Vec2i,
    do_horizontal: bool,
    do_vertical: bool,
    model: WeightModel,
) {
    for vl in 0..disp.height() {
        for ul in 0..disp.width() {
            let d = disp.rel(ul, vl);
            if d.is_missing() {
                continue;
            }
            if ul - half.x < 0
                || ul + half.x >= left.width()
                || vl - half.y < 0
                || vl + half.y >= left.height()
            {
                continue;
            }

            let seed = (d.h(), d.v());
            match fit_affine_window(left, right, ul, vl, seed, half, model) {
                Some((tx, ty)) => {
                    let refined = Disparity::new(
                        if do_horizontal { seed.0 + tx } else { seed.0 },
                        if do_vertical { seed.1 + ty } else { seed.1 },
                    );
                    disp.set_rel(ul, vl, refined);
                }
                None => disp.set_rel(ul, vl, Disparity::missing()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{fit_affine_window, WeightModel};
    use crate::geom::{Region, Vec2i};
    use crate::image::Tile;

    fn ramp_patch(region: Region, shift: f32) -> Tile<f32> {
        let mut data = Vec::with_capacity(region.area());
        for _ in region.min().y..region.max().y {
            for x in region.min().x..region.max().x {
                data.push(x as f32 - shift);
            }
        }
        Tile::from_vec(region, data).unwrap()
    }

    #[test]
    fn affine_fit_recovers_fractional_translation() {
        let patch = Region::from_size(Vec2i::ZERO, Vec2i::new(15, 15));
        let left = ramp_patch(patch, 0.0);
        // right(x) = left(x - 0.4): the true disparity correction is +0.4 and
        // the ramp has no vertical structure, so ty stays pinned at zero.
        let right = ramp_patch(patch, 0.4);

        for model in [WeightModel::Uniform, WeightModel::Robust, WeightModel::Em] {
            let (tx, ty) =
                fit_affine_window(&left, &right, 7, 7, (0.0, 0.0), Vec2i::new(2, 2), model)
                    .unwrap();
            assert!((tx - 0.4).abs() < 1e-2, "tx={tx} for {model:?}");
            assert!(ty.abs() < 1e-2, "ty={ty} for {model:?}");
        }
    }

    #[test]
    fn affine_fit_rejects_windows_without_support() {
        let patch = Region::from_size(Vec2i::ZERO, Vec2i::new(6, 6));
        let left = ramp_patch(patch, 0.0);
        let right = ramp_patch(patch, 0.0);

        // Window at the patch corner cannot gather gradient samples.
        let fit = fit_affine_window(&left, &right, 0, 0, (0.0, 0.0), Vec2i::new(2, 2),
            WeightModel::Uniform);
        assert!(fit.is_none());
    }
}
