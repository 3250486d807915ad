//! Test utilities for Strata.
//!
//! This crate provides testing infrastructure for the Strata rasterizer:
//! ready-made paths and glyph sources, and a software pipeline that
//! executes canvas frames on the CPU.
//!
//! # Overview
//!
//! - [`fixtures`] - Shapes used across tests and benches
//! - [`CountingGlyphSource`] - Glyph outlines with a lookup counter
//! - `MockPipeline` - Records every pipeline call and models the stencil and
//!   color buffers (requires `mock` feature)
//!
//! # Example
//!
//! ```rust
//! # #[cfg(feature = "mock")]
//! # {
//! use std::sync::Arc;
//! use strata_core::{Color, Rect};
//! use strata_geometry::Paint;
//! use strata_render::{Canvas, CanvasConfig};
//! use strata_test_utils::MockPipeline;
//!
//! let mock = Arc::new(MockPipeline::with_size(64, 64));
//! let mut canvas = Canvas::new(mock.clone(), CanvasConfig::new(64, 64));
//!
//! canvas.draw_rect(Rect::from_xywh(8.0, 8.0, 16.0, 16.0), &Paint::fill(Color::RED));
//! canvas.flush().unwrap();
//!
//! assert!(mock.color_at(10, 10).is_some());
//! assert!(mock.color_at(30, 30).is_none());
//! assert_eq!(mock.count_binds(), 1);
//! # }
//! ```
//!
//! # Design Philosophy
//!
//! ## 1. Interior Mutability
//!
//! `Pipeline` methods take `&self`. The mock keeps its call log and pixel
//! state behind `parking_lot::Mutex`, so it can be shared with the canvas
//! as `Arc<dyn Pipeline>` while the test keeps its own handle.
//!
//! ## 2. Pixels Over Call Sequences
//!
//! Asserting exact call sequences couples tests to the replay order. The
//! software model lets tests assert what ends up in the stencil and color
//! buffers instead, and keep call-log assertions for protocol guarantees.

pub mod fixtures;
#[cfg(feature = "mock")]
pub mod mock_pipeline;

pub use fixtures::CountingGlyphSource;
#[cfg(feature = "mock")]
pub use mock_pipeline::*;
