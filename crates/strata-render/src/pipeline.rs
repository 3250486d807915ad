//! The narrow GPU interface the canvas replays frames against.
//!
//! A [`Pipeline`] owns one shader program with a stencil buffer. The canvas
//! never talks to a graphics API itself; during `flush` it drives the
//! pipeline through these calls in recorded order.

use bitflags::bitflags;
use glam::{Mat4, Vec4};
use strata_core::StrataResult;
use strata_geometry::{FillRule, Pixmap, Vertex};

/// How the fragment stage colors a draw.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorMode {
    /// Stencil-only pass, no color.
    Stencil = 0,
    UniformColor = 1,
    ImageTexture = 2,
    LinearGradient = 3,
    RadialGradient = 4,
}

/// Stencil comparison, `(value & mask) <op> (stencil & mask)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StencilFunc {
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    GreaterOrEqual,
    Always,
}

impl StencilFunc {
    /// Evaluate the test the way the GPU does.
    pub fn passes(self, value: u32, stencil: u32, mask: u32) -> bool {
        let (value, stencil) = (value & mask, stencil & mask);
        match self {
            StencilFunc::Equal => value == stencil,
            StencilFunc::NotEqual => value != stencil,
            StencilFunc::Less => value < stencil,
            StencilFunc::LessOrEqual => value <= stencil,
            StencilFunc::GreaterOrEqual => value >= stencil,
            StencilFunc::Always => true,
        }
    }
}

/// Stencil update applied where the stencil test passes. Failing fragments
/// keep their value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StencilOp {
    IncrWrap,
    DecrWrap,
    Keep,
    /// Write the reference value of the current stencil func.
    Replace,
}

impl StencilOp {
    /// New 8-bit stencil value before the write mask is applied.
    pub fn apply(self, stencil: u32, reference: u32) -> u32 {
        match self {
            StencilOp::IncrWrap => stencil.wrapping_add(1) & 0xFF,
            StencilOp::DecrWrap => stencil.wrapping_sub(1) & 0xFF,
            StencilOp::Keep => stencil,
            StencilOp::Replace => reference & 0xFF,
        }
    }
}

bitflags! {
    /// Layout of the 8-bit stencil buffer.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StencilBits: u32 {
        /// Winding counter, wraps at 16.
        const WINDING = 0x0F;
        /// Parity bit tested by the even-odd rule.
        const PARITY = 0x01;
        /// Set inside the active clip.
        const CLIP = 0x10;
    }
}

impl StencilBits {
    /// Winding bits the cover pass tests for `rule`.
    pub fn coverage(rule: FillRule) -> Self {
        match rule {
            FillRule::NonZero => Self::WINDING,
            FillRule::EvenOdd => Self::PARITY,
        }
    }
}

/// Backend texture id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

/// Backend offscreen target with its color attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderTargetHandle {
    pub id: u64,
    pub width: u32,
    pub height: u32,
    /// Color attachment, sampled when the target is composited.
    pub texture: TextureHandle,
}

/// GPU program driven by the canvas.
///
/// Object safe and `&self` throughout, so backends keep their state behind
/// interior mutability and one pipeline can be shared as
/// `Arc<dyn Pipeline>`.
pub trait Pipeline: Send + Sync {
    // Frame

    /// Make the program current, called first in every flush.
    fn bind(&self);

    /// Called last in every flush.
    fn unbind(&self);

    // Uniforms

    fn set_view_projection_matrix(&self, matrix: &Mat4);

    fn set_model_matrix(&self, matrix: &Mat4);

    fn set_color_mode(&self, mode: ColorMode);

    fn set_stroke_width(&self, width: f32);

    fn set_uniform_color(&self, color: Vec4);

    /// `(x0, y0, x1, y1)` for linear gradients and images, `(cx, cy, r, 0)`
    /// for radial gradients.
    fn set_gradient_bounds(&self, bounds: Vec4);

    fn set_gradient_count_info(&self, color_count: u32, position_count: u32);

    fn set_gradient_colors(&self, colors: &[Vec4]);

    fn set_gradient_positions(&self, positions: &[f32]);

    fn set_global_alpha(&self, alpha: f32);

    // Buffers

    /// Replace the vertex buffer contents, growing it when needed.
    fn upload_vertex_buffer(&self, vertices: &[Vertex]) -> StrataResult<()>;

    /// Replace the index buffer contents, growing it when needed.
    fn upload_index_buffer(&self, indices: &[u32]) -> StrataResult<()>;

    // Stencil and color state

    fn enable_stencil_test(&self);

    fn disable_stencil_test(&self);

    fn enable_color_output(&self);

    fn disable_color_output(&self);

    /// Bits of the stencil buffer later ops may write.
    fn update_stencil_mask(&self, write_mask: u32);

    fn update_stencil_op(&self, op: StencilOp);

    fn update_stencil_func(&self, func: StencilFunc, value: u32, compare_mask: u32);

    /// Draw `count` indices starting at `start` as triangles.
    fn draw_index(&self, start: u32, count: u32);

    // Resources

    fn create_texture(&self, pixmap: &Pixmap) -> StrataResult<TextureHandle>;

    fn release_texture(&self, texture: TextureHandle);

    fn bind_texture(&self, texture: TextureHandle, slot: u32);

    /// Offscreen color plus stencil target.
    fn create_render_target(&self, width: u32, height: u32) -> StrataResult<RenderTargetHandle>;

    fn release_render_target(&self, target: RenderTargetHandle);

    /// Redirect draws into `target`, cleared on bind.
    fn bind_render_target(&self, target: RenderTargetHandle);

    fn unbind_render_target(&self, target: RenderTargetHandle);
}
