//! The subpixel refinement view.
//!
//! `SubpixelView` composes a seeded disparity map with the left/right image
//! pair and exposes the refined map through the same `TileSource` contract,
//! so downstream stages can keep composing. Each `produce_tile` call runs one
//! complete pass: plan crop windows, fetch edge-extended patches, localize
//! offsets, run the selected kernel, restore the frame, and cut the result
//! back to the requested region. Nothing persists between calls, so disjoint
//! tiles can be produced concurrently from shared references.

use crate::disparity::{globalize, localize, Disparity};
use crate::filter::PreprocFilter;
use crate::geom::{Region, Vec2i};
use crate::image::Tile;
use crate::refine::{refine_tile, SubpixelMode};
use crate::trace::{trace_event, trace_span};
use crate::util::{DispRefineError, DispRefineResult};
use crate::view::{ExtendView, Shape, SharedSource, TileSource};

pub mod plan;

pub use plan::{plan_windows, WindowPlan};

/// Immutable configuration for a `SubpixelView`.
#[derive(Copy, Clone, Debug)]
pub struct SubpixelConfig {
    /// Full correlation window width in pixels.
    pub kernel_width: i32,
    /// Full correlation window height in pixels.
    pub kernel_height: i32,
    /// Refine horizontal offsets.
    pub do_horizontal: bool,
    /// Refine vertical offsets.
    pub do_vertical: bool,
    /// Which refinement kernel to run.
    pub mode: SubpixelMode,
    /// Emit per-tile diagnostics. No behavioral effect.
    pub verbose: bool,
}

impl Default for SubpixelConfig {
    fn default() -> Self {
        Self {
            kernel_width: 5,
            kernel_height: 5,
            do_horizontal: true,
            do_vertical: true,
            mode: SubpixelMode::Parabola,
            verbose: false,
        }
    }
}

/// Lazily refines a seeded disparity map to subpixel accuracy, tile by tile.
pub struct SubpixelView<F> {
    disparity: SharedSource<Disparity>,
    left: SharedSource<f32>,
    right: SharedSource<f32>,
    config: SubpixelConfig,
    filter: F,
}

impl<F> std::fmt::Debug for SubpixelView<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubpixelView")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<F: PreprocFilter> SubpixelView<F> {
    /// Builds the view, validating shapes and configuration up front.
    ///
    /// The left and right images must agree in shape and be single-plane;
    /// the disparity map must match them. Violations fail here, not at the
    /// first tile request.
    pub fn new(
        disparity: SharedSource<Disparity>,
        left: SharedSource<f32>,
        right: SharedSource<f32>,
        config: SubpixelConfig,
        filter: F,
    ) -> DispRefineResult<Self> {
        if config.kernel_width < 1 || config.kernel_height < 1 {
            return Err(DispRefineError::InvalidConfiguration {
                reason: "kernel dimensions must be positive",
            });
        }

        let left_shape = left.shape();
        let right_shape = right.shape();
        let disp_shape = disparity.shape();
        if left_shape != right_shape {
            return Err(DispRefineError::ShapeMismatch {
                context: "left/right image pair",
                expected: left_shape,
                got: right_shape,
            });
        }
        if left_shape.planes != 1 {
            return Err(DispRefineError::ShapeMismatch {
                context: "image plane count",
                expected: Shape::new(left_shape.cols, left_shape.rows, 1),
                got: left_shape,
            });
        }
        if disp_shape != left_shape {
            return Err(DispRefineError::ShapeMismatch {
                context: "disparity map vs images",
                expected: left_shape,
                got: disp_shape,
            });
        }

        Ok(Self {
            disparity,
            left,
            right,
            config,
            filter,
        })
    }

    pub fn config(&self) -> &SubpixelConfig {
        &self.config
    }

    fn half_kernel(&self) -> Vec2i {
        Vec2i::new(self.config.kernel_width / 2, self.config.kernel_height / 2)
    }
}

impl<F: PreprocFilter> TileSource for SubpixelView<F> {
    type Pixel = Disparity;

    fn shape(&self) -> Shape {
        self.left.shape()
    }

    fn produce_tile(&self, region: Region) -> DispRefineResult<Tile<Disparity>> {
        if region.is_empty() {
            return Err(DispRefineError::EmptyRegion { region });
        }
        let shape = self.shape();
        if !shape.bounds().contains_region(region) {
            return Err(DispRefineError::OutOfBounds {
                requested: region,
                cols: shape.cols,
                rows: shape.rows,
            });
        }

        let _span = trace_span!(
            "subpixel_tile",
            cols = region.width(),
            rows = region.height(),
            mode = self.config.mode.code()
        )
        .entered();

        let half = self.half_kernel();
        let seeded = self.disparity.produce_tile(region)?;
        let plan = plan_windows(&seeded, half);
        if self.config.verbose {
            trace_event!(
                "window_plan",
                valid = plan.valid_count,
                search_cols = plan.search_range.width(),
                search_rows = plan.search_range.height(),
                patch_cols = plan.left_crop.width(),
                patch_rows = plan.left_crop.height(),
            );
        }

        let mut left_patch = ExtendView::new(&self.left).produce_tile(plan.left_crop)?;
        let mut right_patch = ExtendView::new(&self.right).produce_tile(plan.right_crop)?;
        let mut disp_patch = ExtendView::new(&self.disparity).produce_tile(plan.left_crop)?;

        // The parabola kernel expects patches filtered like the upstream
        // correlator's; the affine kernels preprocess internally.
        if self.config.mode == SubpixelMode::Parabola {
            self.filter.apply(&mut left_patch);
            self.filter.apply(&mut right_patch);
        }

        localize(&mut disp_patch, plan.search_range.min());
        refine_tile(
            self.config.mode,
            &mut disp_patch,
            &left_patch,
            &right_patch,
            half,
            self.config.do_horizontal,
            self.config.do_vertical,
        );
        globalize(&mut disp_patch, plan.search_range.min());

        // Drop the halo; the caller only ever sees its requested extent.
        disp_patch.crop(region)
    }

    fn sample(&self, _x: i32, _y: i32) -> DispRefineResult<Disparity> {
        Err(DispRefineError::NotImplemented {
            context: "per-pixel access on a subpixel view; request a tile instead",
        })
    }
}
