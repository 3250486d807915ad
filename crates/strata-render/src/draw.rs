//! Recorded draw operations and their replay.
//!
//! Every op is a snapshot taken at record time: matrix, shading, ranges and
//! clip flag are copied, so later canvas calls cannot change what an op
//! draws. [`Replay`] walks an op list during `flush` and turns each op into
//! pipeline calls.

use std::sync::Arc;

use glam::{Mat4, Vec4};
use strata_core::Rect;
use strata_core::profiling::profile_scope;
use strata_geometry::{FillRule, GradientInfo, MeshRange, Pixmap};
use tracing::warn;

use crate::cache::{RenderTargetCache, TextureCache};
use crate::pipeline::{ColorMode, Pipeline, StencilBits, StencilFunc, StencilOp, TextureHandle};
use crate::state::{ClipOp, ClipStackValue};

/// How the cover pass is colored.
#[derive(Debug, Clone, PartialEq)]
pub enum Shading {
    /// Straight (not premultiplied) RGBA.
    Solid(Vec4),
    LinearGradient(GradientInfo),
    RadialGradient(GradientInfo),
    /// Image stretched over `bounds` `(l, t, r, b)` in local coordinates.
    Image { pixmap: Arc<Pixmap>, bounds: Vec4 },
    /// Color attachment of the enclosing layer's render target.
    Layer { bounds: Vec4 },
}

/// A path, stroke or shape draw.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub transform: Mat4,
    pub shading: Shading,
    pub stroke_width: f32,
    pub global_alpha: f32,
    pub front: MeshRange,
    pub back: MeshRange,
    /// Cover rect for stenciled draws, the geometry itself otherwise.
    pub color: MeshRange,
    /// Anti-alias fringe, drawn only outside the winding.
    pub aa_outline: MeshRange,
    pub fill_rule: FillRule,
    /// Restrict to pixels carrying the clip bit.
    pub clipped: bool,
}

/// Writes one clip into the stencil clip bit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipApply {
    pub transform: Mat4,
    pub front: MeshRange,
    pub back: MeshRange,
    /// Full-canvas rect, drawn untransformed.
    pub full: MeshRange,
    pub fill_rule: FillRule,
    pub op: ClipOp,
    /// Combine with a clip already in the stencil.
    pub nested: bool,
}

impl ClipApply {
    pub fn from_stack(value: &ClipStackValue, nested: bool) -> Self {
        Self {
            transform: value.stack_matrix,
            front: value.front_range,
            back: value.back_range,
            full: value.bound_range,
            fill_rule: value.fill_rule,
            op: value.op,
            nested,
        }
    }
}

/// Ops drawn into an offscreen target and composited back.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerOp {
    pub ops: Vec<DrawOp>,
    /// Target size in pixels.
    pub width: u32,
    pub height: u32,
    /// Device-space bounds the layer is composited over.
    pub bounds: Rect,
    /// Draws the target's texture over `bounds`.
    pub composite: DrawCall,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Draw(DrawCall),
    ClipApply(ClipApply),
    /// Zero clip and winding bits over the full rect.
    ClipClear { full: MeshRange },
    Layer(LayerOp),
}

impl DrawOp {
    /// Ops in this op and every nested layer.
    pub fn op_count(&self) -> usize {
        match self {
            DrawOp::Layer(layer) => 1 + layer.ops.iter().map(DrawOp::op_count).sum::<usize>(),
            _ => 1,
        }
    }
}

fn draw_range(pipeline: &dyn Pipeline, range: MeshRange) {
    if !range.is_empty() {
        pipeline.draw_index(range.start, range.count);
    }
}

/// Accumulate winding counts, optionally only inside the clip.
fn stencil_winding(pipeline: &dyn Pipeline, front: MeshRange, back: MeshRange, clipped: bool) {
    pipeline.disable_color_output();
    pipeline.enable_stencil_test();
    pipeline.update_stencil_mask(StencilBits::WINDING.bits());
    pipeline.set_color_mode(ColorMode::Stencil);
    if clipped {
        let clip = StencilBits::CLIP.bits();
        pipeline.update_stencil_func(StencilFunc::Equal, clip, clip);
    } else {
        pipeline.update_stencil_func(StencilFunc::Always, 0, 0xFF);
    }

    if !front.is_empty() {
        pipeline.update_stencil_op(StencilOp::IncrWrap);
        draw_range(pipeline, front);
    }
    if !back.is_empty() {
        pipeline.update_stencil_op(StencilOp::DecrWrap);
        draw_range(pipeline, back);
    }
}

/// Stencil write over `range` with color output off.
fn stencil_write(
    pipeline: &dyn Pipeline,
    range: MeshRange,
    func: StencilFunc,
    value: u32,
    compare_mask: StencilBits,
    write_mask: StencilBits,
) {
    pipeline.update_stencil_func(func, value, compare_mask.bits());
    pipeline.update_stencil_mask(write_mask.bits());
    pipeline.update_stencil_op(StencilOp::Replace);
    draw_range(pipeline, range);
}

impl DrawCall {
    pub fn is_stenciled(&self) -> bool {
        !self.front.is_empty() || !self.back.is_empty()
    }

    /// Front and back ranges of the winding pass. A fringed draw without
    /// stencil ranges winds its own geometry so the fringe can be masked.
    fn winding_ranges(&self) -> Option<(MeshRange, MeshRange)> {
        if self.is_stenciled() {
            Some((self.front, self.back))
        } else if !self.aa_outline.is_empty() {
            Some((self.color, MeshRange::EMPTY))
        } else {
            None
        }
    }

    /// Issue the draw. `texture` is bound for image and layer shading.
    pub fn execute(&self, pipeline: &dyn Pipeline, texture: Option<TextureHandle>) {
        pipeline.set_model_matrix(&self.transform);
        pipeline.set_stroke_width(self.stroke_width);
        pipeline.set_global_alpha(self.global_alpha);

        let winding = self.winding_ranges();
        if let Some((front, back)) = winding {
            stencil_winding(pipeline, front, back, self.clipped);
            pipeline.enable_color_output();
        }

        self.shade(pipeline, texture);
        if winding.is_some() {
            self.fringe(pipeline);
        }
        self.cover(pipeline, winding.is_some());
    }

    /// Fringe where the winding says outside, stencil untouched.
    fn fringe(&self, pipeline: &dyn Pipeline) {
        if self.aa_outline.is_empty() {
            return;
        }
        let clip = StencilBits::CLIP;
        let coverage = StencilBits::coverage(self.fill_rule);
        if self.clipped {
            pipeline.update_stencil_func(StencilFunc::Equal, clip.bits(), (clip | coverage).bits());
        } else {
            pipeline.update_stencil_func(StencilFunc::Equal, 0, coverage.bits());
        }
        pipeline.update_stencil_op(StencilOp::Keep);
        draw_range(pipeline, self.aa_outline);
    }

    fn shade(&self, pipeline: &dyn Pipeline, texture: Option<TextureHandle>) {
        match &self.shading {
            Shading::Solid(color) => {
                pipeline.set_color_mode(ColorMode::UniformColor);
                pipeline.set_uniform_color(*color);
            }
            Shading::LinearGradient(info) => {
                pipeline.set_color_mode(ColorMode::LinearGradient);
                upload_gradient(pipeline, info);
            }
            Shading::RadialGradient(info) => {
                pipeline.set_color_mode(ColorMode::RadialGradient);
                upload_gradient(pipeline, info);
            }
            Shading::Image { bounds, .. } | Shading::Layer { bounds } => {
                pipeline.set_color_mode(ColorMode::ImageTexture);
                if let Some(texture) = texture {
                    pipeline.bind_texture(texture, 0);
                }
                pipeline.set_gradient_bounds(*bounds);
            }
        }
    }

    fn cover(&self, pipeline: &dyn Pipeline, stenciled: bool) {
        let clip = StencilBits::CLIP;
        if stenciled {
            let coverage = StencilBits::coverage(self.fill_rule);
            if self.clipped {
                pipeline.update_stencil_func(StencilFunc::Less, clip.bits(), (clip | coverage).bits());
            } else {
                pipeline.update_stencil_func(StencilFunc::NotEqual, 0, coverage.bits());
            }
            pipeline.update_stencil_op(StencilOp::Replace);
            pipeline.update_stencil_mask(StencilBits::WINDING.bits());
            draw_range(pipeline, self.color);

            if self.fill_rule == FillRule::EvenOdd {
                // even non-zero windings failed the parity test and are
                // still in the stencil
                pipeline.disable_color_output();
                pipeline.update_stencil_func(StencilFunc::NotEqual, 0, StencilBits::WINDING.bits());
                draw_range(pipeline, self.color);
                pipeline.enable_color_output();
            }
        } else if self.clipped {
            pipeline.enable_stencil_test();
            pipeline.update_stencil_func(StencilFunc::Equal, clip.bits(), clip.bits());
            pipeline.update_stencil_op(StencilOp::Keep);
            draw_range(pipeline, self.color);
        } else {
            pipeline.disable_stencil_test();
            draw_range(pipeline, self.color);
        }
    }
}

fn upload_gradient(pipeline: &dyn Pipeline, info: &GradientInfo) {
    pipeline.set_gradient_bounds(info.bounds);
    pipeline.set_gradient_count_info(info.colors.len() as u32, info.positions.len() as u32);
    pipeline.set_gradient_colors(&info.colors);
    pipeline.set_gradient_positions(&info.positions);
}

impl ClipApply {
    pub fn execute(&self, pipeline: &dyn Pipeline) {
        let clip = StencilBits::CLIP;
        let coverage = StencilBits::coverage(self.fill_rule);

        pipeline.set_model_matrix(&self.transform);
        stencil_winding(pipeline, self.front, self.back, self.nested);

        pipeline.set_model_matrix(&Mat4::IDENTITY);
        match (self.op, self.nested) {
            (ClipOp::Intersect, false) => {
                stencil_write(pipeline, self.full, StencilFunc::NotEqual, clip.bits(), coverage, clip);
            }
            (ClipOp::Difference, false) => {
                stencil_write(pipeline, self.full, StencilFunc::Equal, clip.bits(), coverage, clip);
            }
            (ClipOp::Intersect, true) => {
                // winding only grew inside the old clip, so the new clip
                // bit is exactly the intersection
                stencil_write(pipeline, self.full, StencilFunc::Always, 0, StencilBits::all(), clip);
                stencil_write(pipeline, self.full, StencilFunc::NotEqual, clip.bits(), coverage, clip);
            }
            (ClipOp::Difference, true) => {
                stencil_write(pipeline, self.full, StencilFunc::NotEqual, 0, coverage, clip);
            }
        }

        // drop the winding counts
        stencil_write(pipeline, self.full, StencilFunc::Always, 0, StencilBits::all(), StencilBits::WINDING);
        pipeline.enable_color_output();
    }
}

fn clip_clear(pipeline: &dyn Pipeline, full: MeshRange) {
    pipeline.set_model_matrix(&Mat4::IDENTITY);
    pipeline.disable_color_output();
    pipeline.enable_stencil_test();
    pipeline.set_color_mode(ColorMode::Stencil);
    stencil_write(pipeline, full, StencilFunc::Always, 0, StencilBits::all(), StencilBits::all());
    pipeline.enable_color_output();
}

/// Walks op lists during a flush.
pub struct Replay<'a> {
    pub pipeline: &'a dyn Pipeline,
    pub textures: &'a mut TextureCache,
    pub targets: &'a mut RenderTargetCache,
}

impl Replay<'_> {
    pub fn run(&mut self, ops: &[DrawOp]) {
        for op in ops {
            match op {
                DrawOp::Draw(call) => self.draw(call),
                DrawOp::ClipApply(clip) => clip.execute(self.pipeline),
                DrawOp::ClipClear { full } => clip_clear(self.pipeline, *full),
                DrawOp::Layer(layer) => self.layer(layer),
            }
        }
    }

    fn draw(&mut self, call: &DrawCall) {
        let texture = match &call.shading {
            Shading::Image { pixmap, .. } => {
                match self.textures.get_or_create(self.pipeline, pixmap) {
                    Ok(texture) => Some(texture),
                    Err(err) => {
                        warn!("skipping image draw: {}", err);
                        return;
                    }
                }
            }
            _ => None,
        };
        call.execute(self.pipeline, texture);
    }

    fn layer(&mut self, layer: &LayerOp) {
        profile_scope!("layer");

        let target = match self.targets.acquire(self.pipeline, layer.width, layer.height) {
            Ok(target) => target,
            Err(err) => {
                warn!("drawing layer without a render target: {}", err);
                self.run(&layer.ops);
                return;
            }
        };

        self.pipeline.bind_render_target(target);
        self.run(&layer.ops);
        self.pipeline.unbind_render_target(target);

        layer.composite.execute(self.pipeline, Some(target.texture));
    }
}
