//! Parabola subpixel kernel: SSD probing with 1D quadratic peak fits.

use crate::disparity::Disparity;
use crate::geom::Vec2i;
use crate::image::Tile;

/// Estimates the sub-sample peak offset from samples at `x = -1, 0, +1`.
///
/// Returns the peak offset in `[-1, 1]` when the fitted parabola is concave
/// and stable, `None` otherwise (the caller keeps the integer estimate).
pub(crate) fn quad_peak_offset_1d(fm: f32, f0: f32, fp: f32) -> Option<f32> {
    if !fm.is_finite() || !f0.is_finite() || !fp.is_finite() {
        return None;
    }

    let denom = fm - 2.0 * f0 + fp;
    let eps = 1e-6f32;
    if denom.abs() < eps || denom >= 0.0 {
        return None;
    }

    let dx = 0.5 * (fm - fp) / denom;
    if dx.is_finite() && dx.abs() <= 1.0 {
        Some(dx)
    } else {
        None
    }
}

/// Sum of squared differences between the left window at `(ul, vl)` and the
/// right window displaced by the integer disparity plus a probe offset.
///
/// `None` when the displaced window leaves the right patch.
fn ssd_cost(
    left: &Tile<f32>,
    right: &Tile<f32>,
    ul: i32,
    vl: i32,
    disp: Vec2i,
    half: Vec2i,
) -> Option<f32> {
    let ru = ul + disp.x;
    let rv = vl + disp.y;
    if ru - half.x < 0
        || ru + half.x >= right.width()
        || rv - half.y < 0
        || rv + half.y >= right.height()
    {
        return None;
    }

    let mut cost = 0.0f32;
    for wv in -half.y..=half.y {
        for wu in -half.x..=half.x {
            let diff = left.rel(ul + wu, vl + wv) - right.rel(ru + wu, rv + wv);
            cost += diff * diff;
        }
    }
    Some(cost)
}

/// Refines every valid pixel whose probe windows fit inside the patches.
///
/// Probes the SSD cost at the seeded integer disparity and its +-1 neighbors
/// per enabled axis, then fits a parabola through the three costs. Pixels the
/// fit rejects, or whose windows leave a patch, keep their seeded estimate;
/// this kernel never invalidates a pixel.
pub(crate) fn refine(
    disp: &mut Tile<Disparity>,
    left: &Tile<f32>,
    right: &Tile<f32>,
    half: Vec2i,
    do_horizontal: bool,
    do_vertical: bool,
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

            let center = Vec2i::new(d.h().round() as i32, d.v().round() as i32);
            let mut h = center.x as f32;
            let mut v = center.y as f32;

            if do_horizontal {
                let costs = (
                    ssd_cost(left, right, ul, vl, center + Vec2i::new(-1, 0), half),
                    ssd_cost(left, right, ul, vl, center, half),
                    ssd_cost(left, right, ul, vl, center + Vec2i::new(1, 0), half),
                );
                if let (Some(cm), Some(c0), Some(cp)) = costs {
                    if let Some(dx) = quad_peak_offset_1d(-cm, -c0, -cp) {
                        h += dx;
                    }
                }
            }
            if do_vertical {
                let costs = (
                    ssd_cost(left, right, ul, vl, center + Vec2i::new(0, -1), half),
                    ssd_cost(left, right, ul, vl, center, half),
                    ssd_cost(left, right, ul, vl, center + Vec2i::new(0, 1), half),
                );
                if let (Some(cm), Some(c0), Some(cp)) = costs {
                    if let Some(dy) = quad_peak_offset_1d(-cm, -c0, -cp) {
                        v += dy;
                    }
                }
            }

            let refined = Disparity::new(
                if do_horizontal { h } else { d.h() },
                if do_vertical { v } else { d.v() },
            );
            disp.set_rel(ul, vl, refined);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{quad_peak_offset_1d, refine};
    use crate::disparity::Disparity;
    use crate::geom::{Region, Vec2i};
    use crate::image::Tile;

    #[test]
    fn quad_peak_offset_symmetric() {
        let dx = quad_peak_offset_1d(0.9, 1.0, 0.9).unwrap();
        assert!(dx.abs() < 1e-6);
    }

    #[test]
    fn quad_peak_offset_shifted() {
        let f = |x: f32| 1.0 - (x - 0.25).powi(2);
        let dx = quad_peak_offset_1d(f(-1.0), f(0.0), f(1.0)).unwrap();
        assert!((dx - 0.25).abs() < 1e-5);
    }

    #[test]
    fn quad_peak_offset_non_concave() {
        assert!(quad_peak_offset_1d(1.0, 0.5, 1.0).is_none());
    }

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
    fn ramp_with_half_pixel_shift_refines_exactly() {
        // left(x) = x, right(x) = x - 3.5: true horizontal disparity 3.5.
        // Local frame: search range min is 3, so the localized seed is 0 and
        // the right patch starts 3 columns further left in image space.
        let patch = Region::from_size(Vec2i::ZERO, Vec2i::new(12, 9));
        let left = ramp_patch(patch, 0.0);
        let right = ramp_patch(patch, 0.5);

        let mut disp = Tile::filled(patch, Disparity::new(0.0, 0.0)).unwrap();
        refine(&mut disp, &left, &right, Vec2i::new(2, 2), true, true);

        let center = disp.rel(6, 4);
        assert!((center.h() - 0.5).abs() < 1e-3);
        // A pure horizontal ramp has no vertical structure to fit.
        assert_eq!(center.v(), 0.0);
    }

    #[test]
    fn missing_pixels_stay_missing() {
        let patch = Region::from_size(Vec2i::ZERO, Vec2i::new(7, 7));
        let left = ramp_patch(patch, 0.0);
        let right = ramp_patch(patch, 0.25);

        let mut disp = Tile::filled(patch, Disparity::missing()).unwrap();
        refine(&mut disp, &left, &right, Vec2i::new(2, 2), true, true);
        assert!(disp.data().iter().all(Disparity::is_missing));
    }
}
