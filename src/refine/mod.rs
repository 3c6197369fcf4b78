//! Subpixel refinement kernels and per-tile mode dispatch.
//!
//! The four kernels are free functions over materialized patches, selected by
//! an exhaustive mode enum rather than a trait object: the mode switch sits on
//! the per-tile path and the compiler checks that every mode is handled.
//! Kernels mutate the disparity tile in place and expect offsets already
//! localized to the right patch's frame.

use crate::disparity::Disparity;
use crate::geom::Vec2i;
use crate::image::Tile;
use crate::util::{DispRefineError, DispRefineResult};

pub(crate) mod affine;
pub(crate) mod parabola;

use affine::WeightModel;

/// Which refinement kernel a view runs over its tiles.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SubpixelMode {
    /// SSD cost probing with independent 1D quadratic peak fits.
    Parabola,
    /// Iterative affine window fit, uniform weights.
    Affine,
    /// Affine window fit with robust reweighting.
    BayesianAffine,
    /// Affine window fit with EM inlier/outlier weighting.
    BayesianEmAffine,
}

impl SubpixelMode {
    /// Parses the numeric mode code used by configuration files.
    pub fn from_code(code: i32) -> DispRefineResult<Self> {
        match code {
            0 => Ok(Self::Parabola),
            1 => Ok(Self::Affine),
            2 => Ok(Self::BayesianAffine),
            3 => Ok(Self::BayesianEmAffine),
            _ => Err(DispRefineError::InvalidConfiguration {
                reason: "unknown subpixel mode code",
            }),
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Self::Parabola => 0,
            Self::Affine => 1,
            Self::BayesianAffine => 2,
            Self::BayesianEmAffine => 3,
        }
    }
}

/// Runs the selected kernel over one localized disparity tile.
///
/// `left` shares the disparity tile's region; `right` covers the planned
/// right crop. `half` is the kernel half-extent per axis; the axis flags
/// restrict which offset components the kernel may update.
pub(crate) fn refine_tile(
    mode: SubpixelMode,
    disp: &mut Tile<Disparity>,
    left: &Tile<f32>,
    right: &Tile<f32>,
    half: Vec2i,
    do_horizontal: bool,
    do_vertical: bool,
) {
    match mode {
        SubpixelMode::Parabola => {
            parabola::refine(disp, left, right, half, do_horizontal, do_vertical)
        }
        SubpixelMode::Affine => affine::refine(
            disp,
            left,
            right,
            half,
            do_horizontal,
            do_vertical,
            WeightModel::Uniform,
        ),
        SubpixelMode::BayesianAffine => affine::refine(
            disp,
            left,
            right,
            half,
            do_horizontal,
            do_vertical,
            WeightModel::Robust,
        ),
        SubpixelMode::BayesianEmAffine => affine::refine(
            disp,
            left,
            right,
            half,
            do_horizontal,
            do_vertical,
            WeightModel::Em,
        ),
    }
}
