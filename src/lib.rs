// THEORY:
// This file is the main entry point for the `chroma_locator` library crate.
//
// The crate locates a colored object in a stream of frames:
// pixels -> color histogram -> (new frame + histogram) -> density map -> window.
//
// `core_modules` holds the numeric core, which works on caller-owned buffers
// described by `BufferLayout` and never reports errors. `pipeline` is the
// high-level session API that validates geometry and drives the core frame by
// frame. `error` holds the error type of that validating layer.

pub mod core_modules;
pub mod error;
pub mod pipeline;

pub use core_modules::back_projection::{project, project_parallel};
pub use core_modules::buffer::{
    Bin, BufferLayout, ColorHistogram, CountDensity, CountHistogram, DensityMap, FloatDensity,
    FloatHistogram, PixelView, Region,
};
pub use core_modules::histogram::accumulate;
pub use core_modules::moment::{Moments, compute_moments};
pub use core_modules::tracker::relocate;
pub use error::{TrackError, TrackResult};
pub use pipeline::{ColorTracker, TrackerConfig};
