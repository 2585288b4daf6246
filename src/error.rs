//! Error types for the perception core.
//!
//! Only configuration mistakes are errors here. A target color with zero
//! assigned pixels is a normal outcome and is reported as an absent (`None`)
//! entry in the detector output, never through this module. Degenerate
//! clustering inputs (a uniform-color image) converge trivially and are a
//! normal, if uninformative, result. The drive kinematics are total over
//! their real-valued domain and cannot fail.

use thiserror::Error;

/// Result type alias for perception operations.
pub type VisionResult<T> = Result<T, ConfigurationError>;

/// A request the detector cannot honor. Surfaced synchronously before any
/// clustering work starts; never retried internally.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    /// Fewer clusters were requested than the palette has target colors, so
    /// some targets could never match a distinct cluster.
    #[error("cluster count {requested} is smaller than the {palette_len}-color target palette")]
    ClusterCountTooSmall {
        requested: usize,
        palette_len: usize,
    },

    /// The input image has no pixels.
    #[error("input image is empty")]
    EmptyImage,

    /// The target palette has no entries.
    #[error("target palette is empty")]
    EmptyPalette,

    /// More clusters were requested than the downsampled image has pixels, so
    /// distinct initial centers cannot be drawn.
    #[error("cluster count {requested} exceeds the {pixels} pixels available after downsampling")]
    ClusterCountExceedsPixels { requested: usize, pixels: usize },
}
