//! Strata Core
//!
//! Shared building blocks for the Strata rasterizer: the generational arena,
//! plain value types (colors, rectangles), logging and profiling setup.

pub mod alloc;
pub mod color;
pub mod error;
pub mod geometry;
pub mod logging;
pub mod math;
pub mod profiling;

pub use color::Color;
pub use error::{StrataError, StrataResult};
pub use geometry::Rect;
