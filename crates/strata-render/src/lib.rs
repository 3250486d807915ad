//! Strata Render
//!
//! Records vector drawing into a [`Canvas`] and replays it through a
//! [`Pipeline`] using stencil-then-cover: winding numbers are accumulated
//! in the low stencil bits, then a cover rect is colored wherever the fill
//! rule says the winding is inside. Bit `0x10` of the stencil holds the
//! active clip.
//!
//! The crate does not talk to a GPU API. A backend implements [`Pipeline`];
//! `strata-test-utils` provides a software one for tests.

pub mod cache;
pub mod canvas;
pub mod config;
pub mod draw;
pub mod glyph;
pub mod pipeline;
pub mod state;

pub use cache::{GlyphCache, MAX_TARGET_AGE, RenderTargetCache, TextureCache};
pub use canvas::Canvas;
pub use config::CanvasConfig;
pub use draw::{ClipApply, DrawCall, DrawOp, LayerOp, Shading};
pub use glyph::{Glyph, GlyphId, GlyphSource};
pub use pipeline::{
    ColorMode, Pipeline, RenderTargetHandle, StencilBits, StencilFunc, StencilOp, TextureHandle,
};
pub use state::{CanvasState, ClipOp, ClipStackValue};
