//! Strata Geometry - paths, paints and GPU-ready tessellation
//!
//! This crate provides:
//! - Path primitives with quadratic, cubic and conic curves
//! - Paint and stroke styles (caps, joins, gradients, images, dashing)
//! - Contour measuring for path effects
//! - A segment visitor that reduces every path to lines and quadratics
//! - Stroke and stencil fill tessellation into a shared [`Mesh`]
//! - A half-edge mesh for polygon editing
//!
//! # Example
//!
//! ```
//! use strata_geometry::*;
//! use strata_geometry::raster::fill_path;
//! use glam::Vec2;
//!
//! let mut builder = PathBuilder::new();
//! builder
//!     .move_to(Vec2::new(0.0, 0.0))
//!     .line_to(Vec2::new(100.0, 0.0))
//!     .quad_to(Vec2::new(150.0, 50.0), Vec2::new(100.0, 100.0))
//!     .close();
//! let path = builder.build();
//!
//! let mut mesh = Mesh::new();
//! let ranges = fill_path(&mut mesh, &path);
//! assert!(!ranges.is_empty());
//! ```

// Core primitives
mod curve;
mod path;

// Styling
mod effect;
mod measure;
mod paint;
mod stroke;

// GPU data
mod mesh;
mod vertex;

// Tessellation
pub mod raster;
pub mod tess;
pub mod visitor;

// Re-exports
pub use curve::*;
pub use path::*;

pub use effect::*;
pub use measure::*;
pub use paint::*;
pub use stroke::*;

pub use mesh::*;
pub use vertex::*;

pub use visitor::{SegmentHandler, visit_path};
