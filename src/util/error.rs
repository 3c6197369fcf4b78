//! Error types for disprefine.

use crate::geom::Region;
use crate::view::Shape;
use thiserror::Error;

/// Result alias for disprefine operations.
pub type DispRefineResult<T> = std::result::Result<T, DispRefineError>;

/// Errors that can occur while composing views or refining disparity tiles.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispRefineError {
    /// Input sources disagree in dimensions or plane count.
    #[error("shape mismatch in {context}: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        context: &'static str,
        expected: Shape,
        got: Shape,
    },
    /// A configuration value is outside the accepted set.
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration { reason: &'static str },
    /// A tile was requested outside a source that does not extend its edges.
    #[error("region {requested:?} out of bounds for {cols}x{rows} source")]
    OutOfBounds {
        requested: Region,
        cols: i32,
        rows: i32,
    },
    /// An access mode that is intentionally unsupported.
    #[error("not implemented: {context}")]
    NotImplemented { context: &'static str },
    /// A pixel buffer is smaller than its stated dimensions require.
    #[error("buffer too small: needed {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// A zero-area region where a non-empty one is required.
    #[error("empty region {region:?}")]
    EmptyRegion { region: Region },
    /// Image file I/O failure.
    #[cfg(feature = "image-io")]
    #[error("image i/o: {reason}")]
    ImageIo { reason: String },
}
