//! The recording canvas.
//!
//! Drawing calls rasterize geometry into one [`Mesh`] per frame and append
//! [`DrawOp`]s that reference ranges of it. Nothing reaches the pipeline
//! until [`Canvas::flush`], which uploads the mesh once and replays the ops
//! in recorded order.

use std::sync::Arc;

use glam::{Mat4, Vec2, Vec4};
use strata_core::profiling::{self, profile_function, profile_scope};
use strata_core::{Rect, StrataResult};
use strata_geometry::raster::{
    AA_WIDTH, fill_circle, fill_path, fill_path_aa, fill_rect, raster_line, stencil_path,
    stroke_path, stroke_rect,
};
use strata_geometry::{
    FillRule, Mesh, MeshRange, Paint, Path, PathBuilder, RasterRanges, RoundRect, Shader,
};
use tracing::{debug, trace};

use crate::cache::{GlyphCache, MAX_TARGET_AGE, RenderTargetCache, TextureCache};
use crate::config::CanvasConfig;
use crate::draw::{ClipApply, DrawCall, DrawOp, LayerOp, Replay, Shading};
use crate::glyph::{Glyph, GlyphSource};
use crate::pipeline::Pipeline;
use crate::state::{CanvasState, ClipOp};

/// An open `save_layer`.
#[derive(Debug)]
struct LayerRecord {
    /// Save count right after the layer was pushed.
    save_count: usize,
    /// Clips below this index belong to the parent surface.
    clip_base: usize,
    /// Device-space bounds.
    bounds: Rect,
    alpha: f32,
    ops: Vec<DrawOp>,
}

/// Records vector drawing for a [`Pipeline`].
///
/// # Example
///
/// ```ignore
/// let mut canvas = Canvas::new(pipeline, CanvasConfig::new(800, 600));
/// canvas.save();
/// canvas.translate(100.0, 100.0);
/// canvas.draw_circle(0.0, 0.0, 40.0, &Paint::fill(Color::RED));
/// canvas.restore();
/// canvas.flush()?;
/// ```
pub struct Canvas {
    pipeline: Arc<dyn Pipeline>,
    config: CanvasConfig,
    state: CanvasState,
    mesh: Mesh,
    ops: Vec<DrawOp>,
    layers: Vec<LayerRecord>,
    /// Full-canvas rect of the current frame, rasterized on first use.
    full_rect: Option<MeshRange>,
    global_alpha: Option<f32>,
    textures: TextureCache,
    glyphs: GlyphCache,
    targets: RenderTargetCache,
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("config", &self.config)
            .field("save_count", &self.state.save_count())
            .field("clips", &self.state.clip_count())
            .field("layers", &self.layers.len())
            .field("ops", &self.pending_ops())
            .field("vertices", &self.mesh.vertices().len())
            .finish_non_exhaustive()
    }
}

impl Canvas {
    pub fn new(pipeline: Arc<dyn Pipeline>, config: CanvasConfig) -> Self {
        Self {
            pipeline,
            config,
            state: CanvasState::new(),
            mesh: Mesh::new(),
            ops: Vec::new(),
            layers: Vec::new(),
            full_rect: None,
            global_alpha: None,
            textures: TextureCache::new(),
            glyphs: GlyphCache::new(),
            targets: RenderTargetCache::new(),
        }
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn width(&self) -> u32 {
        self.config.width
    }

    pub fn height(&self) -> u32 {
        self.config.height
    }

    pub fn pipeline(&self) -> &Arc<dyn Pipeline> {
        &self.pipeline
    }

    /// Geometry recorded since the last flush.
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Recorded ops including those inside open and closed layers.
    pub fn pending_ops(&self) -> usize {
        let open: usize = self
            .layers
            .iter()
            .flat_map(|layer| &layer.ops)
            .map(DrawOp::op_count)
            .sum();
        self.ops.iter().map(DrawOp::op_count).sum::<usize>() + open
    }

    /// Textures uploaded so far.
    pub fn cached_textures(&self) -> usize {
        self.textures.len()
    }

    /// Glyph lookups remembered so far.
    pub fn cached_glyphs(&self) -> usize {
        self.glyphs.len()
    }

    /// Render targets alive in the layer pool.
    pub fn cached_render_targets(&self) -> usize {
        self.targets.len()
    }

    // --- state ---

    /// Push a copy of the current state. Returns the save count before the
    /// push, suitable for [`restore_to_count`](Self::restore_to_count).
    pub fn save(&mut self) -> usize {
        let count = self.state.save_count();
        self.state.save();
        count
    }

    /// Like [`save`](Self::save), and redirect drawing into an offscreen
    /// layer until the matching restore. `bounds` are in the current
    /// coordinate space.
    pub fn save_layer(&mut self, bounds: Rect, alpha: f32) -> usize {
        let count = self.save();
        let matrix = self.state.current_matrix();
        let device = Rect::from_points(
            bounds
                .sorted()
                .corners()
                .map(|p| matrix.transform_point3(p.extend(0.0)).truncate()),
        )
        .unwrap_or(Rect::EMPTY);

        self.layers.push(LayerRecord {
            save_count: self.state.save_count(),
            clip_base: self.state.clip_count(),
            bounds: device,
            alpha: alpha.clamp(0.0, 1.0),
            ops: Vec::new(),
        });
        count
    }

    /// Pop one state. Clips made since the matching save stop applying and
    /// a layer opened by it is composited.
    pub fn restore(&mut self) {
        let save_count = self.state.save_count();
        if save_count <= 1 {
            return;
        }
        let closes_layer = self
            .layers
            .last()
            .is_some_and(|layer| layer.save_count == save_count);

        self.state.restore();

        if closes_layer {
            // popped clips lived in the layer's own stencil, the parent
            // stencil was never cleared
            self.state.take_revert();
            if let Some(layer) = self.layers.pop() {
                self.state.take_forward(self.state.clip_count());
                self.finish_layer(layer);
            }
        } else if self.state.take_revert() {
            self.forward_fill_clips();
        }
    }

    /// Restore until [`save_count`](Self::save_count) is `count`.
    pub fn restore_to_count(&mut self, count: usize) {
        let count = count.max(1);
        while self.state.save_count() > count {
            self.restore();
        }
    }

    pub fn save_count(&self) -> usize {
        self.state.save_count()
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.state.translate(dx, dy);
    }

    pub fn scale(&mut self, sx: f32, sy: f32) {
        self.state.scale(sx, sy);
    }

    /// Rotate by `degrees` about the origin.
    pub fn rotate(&mut self, degrees: f32) {
        self.state.rotate(degrees);
    }

    /// Rotate by `degrees` about `(px, py)`.
    pub fn rotate_about(&mut self, degrees: f32, px: f32, py: f32) {
        self.state.rotate_about(degrees, px, py);
    }

    pub fn skew(&mut self, kx: f32, ky: f32) {
        self.state.skew(kx, ky);
    }

    pub fn concat(&mut self, matrix: &Mat4) {
        self.state.concat(matrix);
    }

    pub fn reset_matrix(&mut self) {
        self.state.set_matrix(Mat4::IDENTITY);
    }

    pub fn total_matrix(&self) -> Mat4 {
        self.state.current_matrix()
    }

    /// Opacity applied to every following draw, until the next flush.
    pub fn set_global_alpha(&mut self, alpha: f32) {
        self.global_alpha = Some(alpha.clamp(0.0, 1.0));
    }

    pub fn global_alpha(&self) -> f32 {
        self.global_alpha.unwrap_or(1.0)
    }

    /// Resize the canvas. The default projection follows the new size.
    pub fn update_viewport(&mut self, width: u32, height: u32) {
        self.config.width = width;
        self.config.height = height;
        self.config.view_projection = None;
        self.full_rect = None;
    }

    // --- clipping ---

    pub fn clip_rect(&mut self, rect: Rect, op: ClipOp) {
        let mut builder = PathBuilder::new();
        builder.rect(rect.sorted());
        self.clip_path(&builder.build(), op);
    }

    /// Restrict drawing to `path` (or outside it for
    /// [`ClipOp::Difference`]) until the matching restore.
    pub fn clip_path(&mut self, path: &Path, op: ClipOp) {
        profile_function!();
        let ranges = stencil_path(&mut self.mesh, path);
        let full = self.full_rect();
        let nested = self.is_clipped();
        let value = self
            .state
            .save_clip(ranges.front, ranges.back, full, path.fill_rule(), op);
        self.push_op(DrawOp::ClipApply(ClipApply::from_stack(&value, nested)));
    }

    fn clip_base(&self) -> usize {
        self.layers.last().map_or(0, |layer| layer.clip_base)
    }

    /// A clip applies to the surface currently drawn to.
    fn is_clipped(&self) -> bool {
        self.state.clip_count() > self.clip_base()
    }

    fn full_rect(&mut self) -> MeshRange {
        if let Some(range) = self.full_rect {
            return range;
        }
        let rect = Rect::from_wh(self.config.width as f32, self.config.height as f32);
        let range = fill_rect(&mut self.mesh, &rect).color;
        self.full_rect = Some(range);
        range
    }

    /// Clear the stencil and apply every surviving clip again.
    fn forward_fill_clips(&mut self) {
        let full = self.full_rect();
        self.push_op(DrawOp::ClipClear { full });

        let base = self.clip_base();
        let applies: Vec<ClipApply> = self
            .state
            .take_forward(base)
            .iter()
            .enumerate()
            .map(|(i, value)| ClipApply::from_stack(value, i > 0))
            .collect();
        trace!("forward filling {} clips", applies.len());
        for apply in applies {
            self.push_op(DrawOp::ClipApply(apply));
        }
    }

    fn push_op(&mut self, op: DrawOp) {
        match self.layers.last_mut() {
            Some(layer) => layer.ops.push(op),
            None => self.ops.push(op),
        }
    }

    fn finish_layer(&mut self, layer: LayerRecord) {
        if layer.ops.is_empty() || layer.bounds.is_empty() {
            trace!("dropping empty layer");
            return;
        }
        let (width, height) = self.config.target_size();
        let cover = fill_rect(&mut self.mesh, &layer.bounds).color;
        let composite = DrawCall {
            transform: Mat4::IDENTITY,
            shading: Shading::Layer {
                bounds: Vec4::new(0.0, 0.0, self.config.width as f32, self.config.height as f32),
            },
            stroke_width: 0.0,
            global_alpha: layer.alpha * self.global_alpha(),
            front: MeshRange::EMPTY,
            back: MeshRange::EMPTY,
            color: cover,
            aa_outline: MeshRange::EMPTY,
            fill_rule: FillRule::NonZero,
            clipped: self.is_clipped(),
        };
        self.push_op(DrawOp::Layer(LayerOp {
            ops: layer.ops,
            width,
            height,
            bounds: layer.bounds,
            composite,
        }));
    }

    // --- drawing ---

    fn shading(&self, paint: &Paint, bounds: Rect) -> (Shading, f32) {
        let alpha = self.global_alpha();
        match &paint.shader {
            Shader::Solid(color) => (
                Shading::Solid(color.with_alpha_scaled(paint.alpha).to_vec4()),
                alpha,
            ),
            Shader::LinearGradient(gradient) => {
                (Shading::LinearGradient(gradient.info()), alpha * paint.alpha)
            }
            Shader::RadialGradient(gradient) => {
                (Shading::RadialGradient(gradient.info()), alpha * paint.alpha)
            }
            Shader::Image(pixmap) => (
                Shading::Image {
                    pixmap: Arc::clone(pixmap),
                    bounds: Vec4::new(bounds.left, bounds.top, bounds.right, bounds.bottom),
                },
                alpha * paint.alpha,
            ),
        }
    }

    fn record(
        &mut self,
        ranges: RasterRanges,
        paint: &Paint,
        bounds: Rect,
        fill_rule: FillRule,
        transform: Mat4,
    ) {
        if ranges.is_empty() {
            trace!("nothing rasterized, skipping draw");
            return;
        }
        let (shading, global_alpha) = self.shading(paint, bounds);
        let call = DrawCall {
            transform,
            shading,
            stroke_width: paint.stroke.width,
            global_alpha,
            front: ranges.front,
            back: ranges.back,
            color: ranges.color,
            aa_outline: ranges.aa_outline,
            fill_rule,
            clipped: self.is_clipped(),
        };
        self.push_op(DrawOp::Draw(call));
    }

    /// Fills get a fringe when the paint asks for anti-aliasing and the
    /// target is not multisampled, unless a solid stroke covers the edge.
    fn wants_fringe(&self, paint: &Paint) -> bool {
        paint.anti_alias
            && !self.config.anti_alias
            && (!paint.style.strokes() || paint.path_effect.is_some())
    }

    fn draw_path_with(&mut self, path: &Path, paint: &Paint, bounds: Rect, transform: Mat4) {
        if paint.style.fills() {
            let ranges = if self.wants_fringe(paint) {
                fill_path_aa(&mut self.mesh, path, AA_WIDTH)
            } else {
                fill_path(&mut self.mesh, path)
            };
            self.record(ranges, paint, bounds, path.fill_rule(), transform);
        }
        if paint.style.strokes() {
            let effected = paint
                .path_effect
                .as_ref()
                .and_then(|effect| effect.filter_path(path));
            let stroked = effected.as_ref().unwrap_or(path);
            let ranges = stroke_path(&mut self.mesh, stroked, paint.stroke);
            let bounds = paint.outset_bounds(bounds);
            self.record(ranges, paint, bounds, FillRule::NonZero, transform);
        }
    }

    pub fn draw_path(&mut self, path: &Path, paint: &Paint) {
        profile_function!();
        if paint.nothing_to_draw() {
            return;
        }
        let Some(bounds) = path.bounds() else {
            trace!("skipping empty path");
            return;
        };
        let transform = self.state.current_matrix();
        self.draw_path_with(path, paint, bounds, transform);
    }

    /// Stroke a single segment with the paint's width and cap, whatever its
    /// style.
    pub fn draw_line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, paint: &Paint) {
        if paint.nothing_to_draw() {
            return;
        }
        let (p0, p1) = (Vec2::new(x0, y0), Vec2::new(x1, y1));
        let ranges = raster_line(&mut self.mesh, p0, p1, paint.stroke);
        let r = paint.stroke.radius();
        let bounds = Rect::from_points([p0, p1])
            .unwrap_or(Rect::EMPTY)
            .outset(r, r);
        let transform = self.state.current_matrix();
        self.record(ranges, paint, bounds, FillRule::NonZero, transform);
    }

    pub fn draw_rect(&mut self, rect: Rect, paint: &Paint) {
        if paint.nothing_to_draw() {
            return;
        }
        let rect = rect.sorted();
        let transform = self.state.current_matrix();
        if paint.style.fills() {
            let ranges = fill_rect(&mut self.mesh, &rect);
            self.record(ranges, paint, rect, FillRule::NonZero, transform);
        }
        if paint.style.strokes() {
            let bounds = paint.outset_bounds(rect);
            let ranges = if paint.stroke.miters_right_angles() {
                stroke_rect(&mut self.mesh, &rect, paint.stroke)
            } else {
                let mut builder = PathBuilder::new();
                builder.rect(rect);
                stroke_path(&mut self.mesh, &builder.build(), paint.stroke)
            };
            self.record(ranges, paint, bounds, FillRule::NonZero, transform);
        }
    }

    pub fn draw_circle(&mut self, cx: f32, cy: f32, radius: f32, paint: &Paint) {
        if paint.nothing_to_draw() || !(radius > 0.0) {
            return;
        }
        let center = Vec2::new(cx, cy);
        let bounds = Rect::from_ltrb(cx - radius, cy - radius, cx + radius, cy + radius);
        let transform = self.state.current_matrix();
        if paint.style.fills() {
            let ranges = fill_circle(&mut self.mesh, center, radius);
            self.record(ranges, paint, bounds, FillRule::NonZero, transform);
        }
        if paint.style.strokes() {
            let mut builder = PathBuilder::new();
            builder.circle(center, radius);
            let ranges = stroke_path(&mut self.mesh, &builder.build(), paint.stroke);
            let bounds = paint.outset_bounds(bounds);
            self.record(ranges, paint, bounds, FillRule::NonZero, transform);
        }
    }

    pub fn draw_oval(&mut self, rect: Rect, paint: &Paint) {
        let rect = rect.sorted();
        if rect.is_empty() {
            return;
        }
        let mut builder = PathBuilder::new();
        builder.oval(rect);
        self.draw_path(&builder.build(), paint);
    }

    pub fn draw_rrect(&mut self, rrect: &RoundRect, paint: &Paint) {
        if rrect.rect.sorted().is_empty() {
            return;
        }
        let mut builder = PathBuilder::new();
        builder.round_rect(rrect);
        self.draw_path(&builder.build(), paint);
    }

    pub fn draw_round_rect(&mut self, rect: Rect, rx: f32, ry: f32, paint: &Paint) {
        self.draw_rrect(&RoundRect::new(rect, rx, ry), paint);
    }

    /// Fill every glyph outline at its origin. Outlines are fetched from
    /// `source` once and kept for the lifetime of the canvas.
    pub fn draw_glyphs(&mut self, glyphs: &[Glyph], source: &Arc<dyn GlyphSource>, paint: &Paint) {
        profile_function!();
        if paint.nothing_to_draw() {
            return;
        }
        let current = self.state.current_matrix();
        for glyph in glyphs {
            let Some(path) = self.glyphs.get(source, glyph.id) else {
                continue;
            };
            let Some(bounds) = path.bounds() else {
                continue;
            };
            let transform = current * Mat4::from_translation(glyph.origin.extend(0.0));
            self.draw_path_with(&path, paint, bounds, transform);
        }
    }

    /// Fill the whole canvas, ignoring the transform and paint style.
    pub fn draw_paint(&mut self, paint: &Paint) {
        if paint.nothing_to_draw() {
            return;
        }
        let rect = Rect::from_wh(self.config.width as f32, self.config.height as f32);
        let ranges = fill_rect(&mut self.mesh, &rect);
        self.record(ranges, paint, rect, FillRule::NonZero, Mat4::IDENTITY);
    }

    // --- frame ---

    /// Upload the frame's geometry and replay every recorded op.
    ///
    /// Open layers are closed and clips are dropped; the next frame starts
    /// unclipped with the current transform stack.
    pub fn flush(&mut self) -> StrataResult<()> {
        profile_function!();

        while let Some(layer) = self.layers.pop() {
            self.finish_layer(layer);
        }
        if self.state.has_clip() {
            let full = self.full_rect();
            self.ops.push(DrawOp::ClipClear { full });
            self.state.clear_clips();
        }

        if self.ops.is_empty() {
            self.reset_frame();
            return Ok(());
        }

        let op_count = self.pending_ops();
        let vertex_count = self.mesh.vertices().len();
        let index_count = self.mesh.indices().len();

        self.targets.begin_frame();
        let pipeline = Arc::clone(&self.pipeline);
        pipeline.bind();
        let result = self.replay(pipeline.as_ref());
        pipeline.unbind();

        self.reset_frame();
        self.targets.purge(pipeline.as_ref(), MAX_TARGET_AGE);

        debug!(
            "flushed {} ops, {} vertices, {} indices",
            op_count, vertex_count, index_count
        );
        profiling::new_frame();
        result
    }

    fn replay(&mut self, pipeline: &dyn Pipeline) -> StrataResult<()> {
        pipeline.set_view_projection_matrix(&self.config.view_projection());
        {
            profile_scope!("upload");
            pipeline.upload_vertex_buffer(self.mesh.vertices())?;
            pipeline.upload_index_buffer(self.mesh.indices())?;
        }

        let mut replay = Replay {
            pipeline,
            textures: &mut self.textures,
            targets: &mut self.targets,
        };
        replay.run(&self.ops);
        Ok(())
    }

    fn reset_frame(&mut self) {
        self.mesh.reset();
        self.ops.clear();
        self.global_alpha = None;
        self.full_rect = None;
    }
}

impl Drop for Canvas {
    fn drop(&mut self) {
        self.textures.release_all(self.pipeline.as_ref());
        self.targets.release_all(self.pipeline.as_ref());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use strata_core::{Color, StrataError};
    use strata_geometry::{Pixmap, Vertex};

    use crate::pipeline::{
        ColorMode, RenderTargetHandle, StencilFunc, StencilOp, TextureHandle,
    };

    /// Accepts everything and remembers nothing.
    struct NullPipeline;

    impl Pipeline for NullPipeline {
        fn bind(&self) {}
        fn unbind(&self) {}
        fn set_view_projection_matrix(&self, _matrix: &Mat4) {}
        fn set_model_matrix(&self, _matrix: &Mat4) {}
        fn set_color_mode(&self, _mode: ColorMode) {}
        fn set_stroke_width(&self, _width: f32) {}
        fn set_uniform_color(&self, _color: Vec4) {}
        fn set_gradient_bounds(&self, _bounds: Vec4) {}
        fn set_gradient_count_info(&self, _colors: u32, _positions: u32) {}
        fn set_gradient_colors(&self, _colors: &[Vec4]) {}
        fn set_gradient_positions(&self, _positions: &[f32]) {}
        fn set_global_alpha(&self, _alpha: f32) {}
        fn upload_vertex_buffer(&self, _vertices: &[Vertex]) -> StrataResult<()> {
            Ok(())
        }
        fn upload_index_buffer(&self, indices: &[u32]) -> StrataResult<()> {
            Err(StrataError::BufferUpload {
                buffer: "index",
                size: std::mem::size_of_val(indices),
            })
        }
        fn enable_stencil_test(&self) {}
        fn disable_stencil_test(&self) {}
        fn enable_color_output(&self) {}
        fn disable_color_output(&self) {}
        fn update_stencil_mask(&self, _mask: u32) {}
        fn update_stencil_op(&self, _op: StencilOp) {}
        fn update_stencil_func(&self, _func: StencilFunc, _value: u32, _compare_mask: u32) {}
        fn draw_index(&self, _start: u32, _count: u32) {}
        fn create_texture(&self, _pixmap: &Pixmap) -> StrataResult<TextureHandle> {
            Ok(TextureHandle(1))
        }
        fn release_texture(&self, _texture: TextureHandle) {}
        fn bind_texture(&self, _texture: TextureHandle, _slot: u32) {}
        fn create_render_target(&self, width: u32, height: u32) -> StrataResult<RenderTargetHandle> {
            Ok(RenderTargetHandle {
                id: 1,
                width,
                height,
                texture: TextureHandle(2),
            })
        }
        fn release_render_target(&self, _target: RenderTargetHandle) {}
        fn bind_render_target(&self, _target: RenderTargetHandle) {}
        fn unbind_render_target(&self, _target: RenderTargetHandle) {}
    }

    fn canvas() -> Canvas {
        Canvas::new(Arc::new(NullPipeline), CanvasConfig::new(100, 100))
    }

    fn ops(canvas: &Canvas) -> &[DrawOp] {
        &canvas.ops
    }

    #[test]
    fn test_canvas_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<Canvas>();
    }

    #[test]
    fn test_save_returns_previous_count() {
        let mut canvas = canvas();
        assert_eq!(canvas.save(), 1);
        assert_eq!(canvas.save(), 2);
        assert_eq!(canvas.save_count(), 3);
        canvas.restore_to_count(1);
        assert_eq!(canvas.save_count(), 1);
    }

    #[test]
    fn test_draw_snapshots_transform() {
        let mut canvas = canvas();
        canvas.translate(10.0, 20.0);
        canvas.draw_rect(Rect::from_xywh(0.0, 0.0, 5.0, 5.0), &Paint::fill(Color::RED));
        canvas.translate(100.0, 0.0);

        let DrawOp::Draw(call) = &ops(&canvas)[0] else {
            panic!("expected a draw");
        };
        let origin = call.transform.transform_point3(Vec3::ZERO);
        assert_eq!(origin, Vec3::new(10.0, 20.0, 0.0));
        assert!(!call.is_stenciled());
    }

    #[test]
    fn test_solid_alpha_goes_into_color() {
        let mut canvas = canvas();
        canvas.set_global_alpha(0.5);
        let paint = Paint::fill(Color::WHITE).with_alpha(0.5);
        canvas.draw_rect(Rect::from_xywh(0.0, 0.0, 5.0, 5.0), &paint);

        let DrawOp::Draw(call) = &ops(&canvas)[0] else {
            panic!("expected a draw");
        };
        assert_eq!(call.shading, Shading::Solid(Vec4::new(1.0, 1.0, 1.0, 0.5)));
        assert_eq!(call.global_alpha, 0.5);
    }

    #[test]
    fn test_degenerate_input_records_nothing() {
        let mut canvas = canvas();
        canvas.draw_path(&Path::new(), &Paint::fill(Color::RED));
        canvas.draw_circle(0.0, 0.0, 0.0, &Paint::fill(Color::RED));
        canvas.draw_oval(Rect::EMPTY, &Paint::fill(Color::RED));
        canvas.draw_rect(
            Rect::from_xywh(0.0, 0.0, 5.0, 5.0),
            &Paint::fill(Color::RED).with_alpha(0.0),
        );
        assert_eq!(canvas.pending_ops(), 0);
        assert!(canvas.mesh().is_empty());
    }

    #[test]
    fn test_stroke_and_fill_records_two_draws() {
        let mut canvas = canvas();
        let paint = Paint::stroke(Color::RED, 2.0).with_style(strata_geometry::PaintStyle::StrokeAndFill);
        canvas.draw_circle(50.0, 50.0, 10.0, &paint);
        assert_eq!(canvas.pending_ops(), 2);
    }

    #[test]
    fn test_fringe_follows_paint_and_target() {
        fn fringes(canvas: &Canvas) -> Vec<bool> {
            canvas
                .ops
                .iter()
                .filter_map(|op| match op {
                    DrawOp::Draw(call) => Some(!call.aa_outline.is_empty()),
                    _ => None,
                })
                .collect()
        }
        let path = {
            let mut builder = PathBuilder::new();
            builder.rect(Rect::from_xywh(10.0, 10.0, 20.0, 20.0));
            builder.build()
        };
        let fill = Paint::fill(Color::RED).with_anti_alias(true);
        let both = fill.clone().with_style(strata_geometry::PaintStyle::StrokeAndFill);
        let dashed = both
            .clone()
            .with_path_effect(strata_geometry::PathEffect::dash(&[4.0, 2.0], 0.0).unwrap());

        let config = CanvasConfig::new(100, 100).with_anti_alias(false);
        let mut canvas = Canvas::new(Arc::new(NullPipeline), config);
        canvas.draw_path(&path, &fill);
        canvas.draw_path(&path, &Paint::fill(Color::RED));
        // a solid stroke covers the edge, strokes never fringe
        canvas.draw_path(&path, &both);
        canvas.draw_path(&path, &dashed);
        assert_eq!(fringes(&canvas), [true, false, false, false, true, false]);

        // multisampled targets need no fringe
        let mut canvas = Canvas::new(Arc::new(NullPipeline), CanvasConfig::new(100, 100));
        canvas.draw_path(&path, &fill);
        assert_eq!(fringes(&canvas), [false]);
    }

    #[test]
    fn test_dash_applies_to_strokes_only() {
        let mut canvas = canvas();
        let mut builder = PathBuilder::new();
        builder.move_to(Vec2::ZERO).line_to(Vec2::new(100.0, 0.0));
        let line = builder.build();
        let effect = strata_geometry::PathEffect::dash(&[10.0, 10.0], 0.0).unwrap();

        canvas.draw_path(&line, &Paint::stroke(Color::RED, 2.0));
        let solid = canvas.mesh().vertices().len();
        canvas.draw_path(&line, &Paint::stroke(Color::RED, 2.0).with_path_effect(effect));
        let dashed = canvas.mesh().vertices().len() - solid;

        // five ribbons instead of one
        assert_eq!(dashed, 5 * solid);
    }

    #[test]
    fn test_nested_clip_flags() {
        let mut canvas = canvas();
        canvas.save();
        canvas.clip_rect(Rect::from_xywh(0.0, 0.0, 50.0, 50.0), ClipOp::Intersect);
        canvas.clip_rect(Rect::from_xywh(10.0, 10.0, 50.0, 50.0), ClipOp::Intersect);
        canvas.draw_rect(Rect::from_xywh(0.0, 0.0, 100.0, 100.0), &Paint::fill(Color::RED));

        let nested: Vec<bool> = ops(&canvas)
            .iter()
            .filter_map(|op| match op {
                DrawOp::ClipApply(apply) => Some(apply.nested),
                _ => None,
            })
            .collect();
        assert_eq!(nested, [false, true]);
        assert!(matches!(&ops(&canvas)[2], DrawOp::Draw(call) if call.clipped));

        canvas.restore();
        assert!(matches!(ops(&canvas).last(), Some(DrawOp::ClipClear { .. })));
    }

    #[test]
    fn test_restore_reapplies_outer_clips() {
        let mut canvas = canvas();
        canvas.save();
        canvas.clip_rect(Rect::from_xywh(0.0, 0.0, 50.0, 50.0), ClipOp::Intersect);
        canvas.save();
        canvas.clip_rect(Rect::from_xywh(10.0, 10.0, 50.0, 50.0), ClipOp::Difference);
        canvas.restore();

        let tail = &ops(&canvas)[2..];
        assert!(matches!(tail[0], DrawOp::ClipClear { .. }));
        assert!(matches!(tail[1], DrawOp::ClipApply(apply) if !apply.nested && apply.op == ClipOp::Intersect));
        assert_eq!(tail.len(), 2);
    }

    #[test]
    fn test_layer_collects_ops() {
        let mut canvas = canvas();
        let count = canvas.save_layer(Rect::from_xywh(10.0, 10.0, 20.0, 20.0), 0.5);
        canvas.draw_rect(Rect::from_xywh(0.0, 0.0, 100.0, 100.0), &Paint::fill(Color::RED));
        assert!(ops(&canvas).is_empty());
        assert_eq!(canvas.pending_ops(), 1);

        canvas.restore_to_count(count);
        let [DrawOp::Layer(layer)] = ops(&canvas) else {
            panic!("expected one layer op");
        };
        assert_eq!(layer.ops.len(), 1);
        assert_eq!(layer.bounds, Rect::from_xywh(10.0, 10.0, 20.0, 20.0));
        assert_eq!(layer.composite.global_alpha, 0.5);
        assert_eq!((layer.width, layer.height), (100, 100));
    }

    #[test]
    fn test_clip_inside_layer_is_local() {
        let mut canvas = canvas();
        canvas.clip_rect(Rect::from_xywh(0.0, 0.0, 50.0, 50.0), ClipOp::Intersect);
        canvas.save_layer(Rect::from_xywh(0.0, 0.0, 100.0, 100.0), 1.0);
        canvas.draw_rect(Rect::from_xywh(0.0, 0.0, 10.0, 10.0), &Paint::fill(Color::RED));
        canvas.clip_rect(Rect::from_xywh(0.0, 0.0, 5.0, 5.0), ClipOp::Intersect);
        canvas.restore();

        let DrawOp::Layer(layer) = &ops(&canvas)[1] else {
            panic!("expected a layer op");
        };
        // the parent clip does not reach into the layer target
        assert!(matches!(&layer.ops[0], DrawOp::Draw(call) if !call.clipped));
        assert!(matches!(&layer.ops[1], DrawOp::ClipApply(apply) if !apply.nested));
        assert!(layer.composite.clipped);
        assert_eq!(ops(&canvas).len(), 2);
    }

    #[test]
    fn test_flush_error_still_resets() {
        let mut canvas = canvas();
        canvas.clip_rect(Rect::from_xywh(0.0, 0.0, 50.0, 50.0), ClipOp::Intersect);
        canvas.draw_rect(Rect::from_xywh(0.0, 0.0, 5.0, 5.0), &Paint::fill(Color::RED));
        assert!(matches!(
            canvas.flush(),
            Err(StrataError::BufferUpload { buffer: "index", .. })
        ));
        assert_eq!(canvas.pending_ops(), 0);
        assert!(canvas.mesh().is_empty());
        assert_eq!(canvas.global_alpha(), 1.0);
    }

    #[test]
    fn test_update_viewport_resets_projection() {
        let mut canvas = Canvas::new(
            Arc::new(NullPipeline),
            CanvasConfig::new(100, 100).with_view_projection(Mat4::IDENTITY),
        );
        canvas.update_viewport(200, 50);
        assert_eq!(canvas.width(), 200);
        assert_eq!(canvas.config().view_projection, None);
    }
}
