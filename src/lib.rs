//! DispRefine is a tiled, lazily-evaluated subpixel refinement stage for
//! stereo disparity maps.
//!
//! Image-like inputs are composed as pull-based views: a consumer requests a
//! rectangular region of the refined map and the chain computes only the
//! upstream pixels that region needs, so imagery far larger than memory can
//! be processed tile by tile. Optional parallelism over tiles is available
//! via the `rayon` feature; `image-io` adds grayscale file loading and
//! `tracing` adds per-tile diagnostics.

pub mod disparity;
pub mod filter;
pub mod geom;
pub mod image;
pub mod rasterize;
mod refine;
pub mod subpixel;
pub(crate) mod trace;
pub mod util;
pub mod view;

pub use disparity::{disparity_range, globalize, localize, Disparity};
pub use filter::{BoxBlurFilter, IdentityFilter, PreprocFilter};
pub use geom::{Region, Vec2i};
pub use image::{ImageBuf, Tile};
pub use rasterize::rasterize;
#[cfg(feature = "rayon")]
pub use rasterize::rasterize_par;
pub use refine::SubpixelMode;
pub use subpixel::{plan_windows, SubpixelConfig, SubpixelView, WindowPlan};
pub use util::{DispRefineError, DispRefineResult};
pub use view::{CropView, ExtendView, Shape, SharedSource, TileSource};
