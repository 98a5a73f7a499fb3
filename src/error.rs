//! Error types for the validating tracking layer.
//!
//! The numeric core never returns errors; these are produced by callers that check
//! shapes and positions before calling into it.

use crate::core_modules::buffer::Region;
use thiserror::Error;

/// Result type for tracking sessions.
pub type TrackResult<T> = Result<T, TrackError>;

#[derive(Debug, Error)]
pub enum TrackError {
    #[error("row stride {stride} is narrower than a row of {row_bytes} bytes")]
    StrideTooSmall { stride: usize, row_bytes: usize },

    #[error("row stride {stride} is not a multiple of the element width {element_width}")]
    MisalignedStride { stride: usize, element_width: usize },

    #[error("buffer holds {actual} bytes but the layout needs {required}")]
    StorageTooSmall { required: usize, actual: usize },

    #[error("region {region:?} is empty")]
    EmptyRegion { region: Region },

    #[error("region {region:?} does not fit in a {cols}x{rows} frame")]
    RegionOutOfFrame { region: Region, rows: usize, cols: usize },

    #[error("tracking window {window:?} is not inside search region {search:?}")]
    WindowOutsideSearchRegion { window: Region, search: Region },

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}
