//! Software implementation of `Pipeline` for testing.
//!
//! Every call is recorded, and draws are executed against a CPU model of
//! the stencil and color attachments so tests can check coverage.

use glam::{Mat4, Vec2, Vec4};
use parking_lot::Mutex;
use strata_core::alloc::HashMap;
use strata_core::{StrataError, StrataResult};
use strata_geometry::{Pixmap, Vertex, VertexType};
use strata_render::{
    ColorMode, Pipeline, RenderTargetHandle, StencilFunc, StencilOp, TextureHandle,
};

/// Records a pipeline call for verification in tests.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineCall {
    Bind,
    Unbind,
    SetViewProjection(Mat4),
    SetModelMatrix(Mat4),
    SetColorMode(ColorMode),
    SetStrokeWidth(f32),
    SetUniformColor(Vec4),
    SetGradientBounds(Vec4),
    SetGradientCountInfo { colors: u32, positions: u32 },
    SetGradientColors(Vec<Vec4>),
    SetGradientPositions(Vec<f32>),
    SetGlobalAlpha(f32),
    UploadVertexBuffer { count: usize },
    UploadIndexBuffer { count: usize },
    EnableStencilTest,
    DisableStencilTest,
    EnableColorOutput,
    DisableColorOutput,
    UpdateStencilMask(u32),
    UpdateStencilOp(StencilOp),
    UpdateStencilFunc {
        func: StencilFunc,
        value: u32,
        compare_mask: u32,
    },
    DrawIndex { start: u32, count: u32 },
    CreateTexture { width: u32, height: u32 },
    ReleaseTexture(TextureHandle),
    BindTexture { texture: TextureHandle, slot: u32 },
    CreateRenderTarget { width: u32, height: u32 },
    ReleaseRenderTarget(RenderTargetHandle),
    BindRenderTarget(RenderTargetHandle),
    UnbindRenderTarget(RenderTargetHandle),
}

/// One attachment set: 8-bit stencil plus the last color written per pixel.
#[derive(Debug, Clone)]
struct Surface {
    width: u32,
    height: u32,
    stencil: Vec<u32>,
    color: Vec<Option<Vec4>>,
}

impl Surface {
    fn new(width: u32, height: u32) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            stencil: vec![0; len],
            color: vec![None; len],
        }
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }
}

/// Fixed-function state the draws run under.
#[derive(Debug, Clone)]
struct RasterState {
    view_projection: Mat4,
    model: Mat4,
    color_mode: ColorMode,
    uniform_color: Vec4,
    global_alpha: f32,
    stencil_test: bool,
    color_output: bool,
    write_mask: u32,
    op: StencilOp,
    func: StencilFunc,
    func_value: u32,
    func_mask: u32,
    texture: Option<TextureHandle>,
}

impl Default for RasterState {
    fn default() -> Self {
        Self {
            view_projection: Mat4::IDENTITY,
            model: Mat4::IDENTITY,
            color_mode: ColorMode::Stencil,
            uniform_color: Vec4::ZERO,
            global_alpha: 1.0,
            stencil_test: false,
            color_output: true,
            write_mask: 0xFF,
            op: StencilOp::Keep,
            func: StencilFunc::Always,
            func_value: 0,
            func_mask: 0xFF,
            texture: None,
        }
    }
}

#[derive(Debug)]
struct Machine {
    state: RasterState,
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    screen: Surface,
    /// Bound render targets, innermost last.
    bound_targets: Vec<(RenderTargetHandle, Surface)>,
    /// Contents of unbound render targets by texture id.
    target_contents: HashMap<u64, Surface>,
}

impl Machine {
    fn surface(&mut self) -> &mut Surface {
        match self.bound_targets.last_mut() {
            Some((_, surface)) => surface,
            None => &mut self.screen,
        }
    }

    fn draw(&mut self, start: u32, count: u32) {
        let transform = self.state.view_projection * self.state.model;
        let (width, height) = {
            let surface = self.surface();
            (surface.width as f32, surface.height as f32)
        };
        let end = (start as usize + count as usize).min(self.indices.len());
        let Some(range) = self.indices.get(start as usize..end) else {
            return;
        };

        // position in pixels and fringe coverage
        let to_pixels = |index: u32| -> Option<(Vec2, f32)> {
            let vertex = self.vertices.get(index as usize)?;
            let ndc = transform.project_point3(vertex.position().extend(0.0));
            let pixel = Vec2::new((ndc.x + 1.0) * 0.5 * width, (1.0 - ndc.y) * 0.5 * height);
            let coverage = match vertex.kind() {
                Some(VertexType::LineAa) => vertex.u,
                _ => 1.0,
            };
            Some((pixel, coverage))
        };

        let triangles: Vec<[(Vec2, f32); 3]> = range
            .chunks_exact(3)
            .filter_map(|tri| Some([to_pixels(tri[0])?, to_pixels(tri[1])?, to_pixels(tri[2])?]))
            .collect();

        for triangle in triangles {
            self.fill_triangle(triangle);
        }
    }

    fn fill_triangle(&mut self, [(a, ca), (b, cb), (c, cc)]: [(Vec2, f32); 3]) {
        let area = edge(a, b, c);
        if area == 0.0 || !area.is_finite() {
            return;
        }
        let sign = area.signum();

        let surface_size = {
            let surface = self.surface();
            (surface.width, surface.height)
        };
        let min = a.min(b).min(c).floor().max(Vec2::ZERO);
        let max = a.max(b).max(c).ceil();
        let x_end = (max.x.max(0.0) as u32).min(surface_size.0);
        let y_end = (max.y.max(0.0) as u32).min(surface_size.1);

        for y in min.y as u32..y_end {
            for x in min.x as u32..x_end {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                if covers(a, b, p, sign) && covers(b, c, p, sign) && covers(c, a, p, sign) {
                    let coverage = (edge(b, c, p) * ca + edge(c, a, p) * cb + edge(a, b, p) * cc) / area;
                    self.fragment(x, y, coverage.clamp(0.0, 1.0));
                }
            }
        }
    }

    fn fragment(&mut self, x: u32, y: u32, coverage: f32) {
        let state = self.state.clone();
        let sampled = self.sample(x, y);
        let surface = self.surface();
        let Some(index) = surface.index(x, y) else {
            return;
        };

        if state.stencil_test {
            let stencil = surface.stencil[index];
            if !state.func.passes(state.func_value, stencil, state.func_mask) {
                return;
            }
            let updated = state.op.apply(stencil, state.func_value);
            surface.stencil[index] =
                (stencil & !state.write_mask) | (updated & state.write_mask);
        }

        if state.color_output && state.color_mode != ColorMode::Stencil {
            if let Some(mut color) = sampled {
                if coverage > 0.0 {
                    color.w *= state.global_alpha * coverage;
                    surface.color[index] = Some(color);
                }
            }
        }
    }

    /// Color the current mode produces at `(x, y)`.
    fn sample(&self, x: u32, y: u32) -> Option<Vec4> {
        match self.state.color_mode {
            ColorMode::Stencil => None,
            ColorMode::UniformColor => Some(self.state.uniform_color),
            ColorMode::LinearGradient | ColorMode::RadialGradient => Some(Vec4::ONE),
            ColorMode::ImageTexture => {
                let texture = self.state.texture?;
                match self.target_contents.get(&texture.0) {
                    // layers composite at identity, pixel for pixel
                    Some(contents) => contents.index(x, y).and_then(|i| contents.color[i]),
                    None => Some(Vec4::ONE),
                }
            }
        }
    }
}

/// Signed doubled area of `(a, b, p)`.
fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b - a).perp_dot(p - a)
}

/// Inside test for one edge with a tie-break, so a pixel center on an edge
/// shared by two triangles is covered by exactly one of them.
fn covers(a: Vec2, b: Vec2, p: Vec2, sign: f32) -> bool {
    // evaluate from a canonical endpoint so both triangles see exactly
    // negated values
    let swapped = (b.x, b.y) < (a.x, a.y);
    let raw = if swapped { -edge(b, a, p) } else { edge(a, b, p) };
    let value = raw * sign;
    if value != 0.0 {
        return value > 0.0;
    }
    let dir = (b - a) * sign;
    dir.y > 0.0 || (dir.y == 0.0 && dir.x < 0.0)
}

/// Software `Pipeline` for tests.
///
/// # Borrow Checking Pattern: Interior Mutability
///
/// The trait takes `&self` everywhere, and the canvas holds the pipeline as
/// `Arc<dyn Pipeline>`. The call log and the pixel model live behind
/// `parking_lot::Mutex`, which is `Send + Sync` as the trait requires.
///
/// # Model
///
/// - Vertices go through `view_projection * model` to pixels of the bound
///   surface; pixel centers inside a triangle produce fragments.
/// - Fragment discards (circle and curve vertex types) are not modeled, so
///   curved geometry covers its whole hull.
/// - Fringe vertices scale alpha by their interpolated coverage; fully
///   uncovered fragments leave the color untouched.
/// - The stencil test, op and write mask follow the GPU: the op runs only
///   where the test passes.
/// - `bind` clears the screen stencil; binding a render target starts it
///   with cleared attachments.
///
/// # Example
///
/// ```rust
/// use strata_render::Pipeline;
/// use strata_test_utils::MockPipeline;
///
/// let mock = MockPipeline::new();
/// mock.bind();
/// mock.unbind();
///
/// assert_eq!(mock.call_count(), 2);
/// assert_eq!(mock.count_binds(), 1);
/// ```
pub struct MockPipeline {
    /// Recorded calls for verification
    calls: Mutex<Vec<PipelineCall>>,

    machine: Mutex<Machine>,

    /// Live textures and render targets by id
    textures: Mutex<HashMap<u64, (u32, u32)>>,
    targets: Mutex<HashMap<u64, RenderTargetHandle>>,

    next_id: Mutex<u64>,
    fail_textures: Mutex<bool>,
    fail_render_targets: Mutex<bool>,
}

impl MockPipeline {
    /// A 100x100 surface.
    pub fn new() -> Self {
        Self::with_size(100, 100)
    }

    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            machine: Mutex::new(Machine {
                state: RasterState::default(),
                vertices: Vec::new(),
                indices: Vec::new(),
                screen: Surface::new(width, height),
                bound_targets: Vec::new(),
                target_contents: HashMap::default(),
            }),
            textures: Mutex::new(HashMap::default()),
            targets: Mutex::new(HashMap::default()),
            next_id: Mutex::new(1),
            fail_textures: Mutex::new(false),
            fail_render_targets: Mutex::new(false),
        }
    }

    /// Make every following `create_texture` fail.
    pub fn fail_textures(&self, fail: bool) {
        *self.fail_textures.lock() = fail;
    }

    /// Make every following `create_render_target` fail.
    pub fn fail_render_targets(&self, fail: bool) {
        *self.fail_render_targets.lock() = fail;
    }

    fn record(&self, call: PipelineCall) {
        self.calls.lock().push(call);
    }

    fn next_id(&self) -> u64 {
        let mut next = self.next_id.lock();
        let id = *next;
        *next += 1;
        id
    }

    /// Get a copy of all recorded calls (for test assertions).
    pub fn calls(&self) -> Vec<PipelineCall> {
        self.calls.lock().clone()
    }

    /// Get the total number of recorded calls.
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Clear all recorded calls.
    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    fn count(&self, pred: impl Fn(&PipelineCall) -> bool) -> usize {
        self.calls.lock().iter().filter(|call| pred(call)).count()
    }

    pub fn count_binds(&self) -> usize {
        self.count(|call| matches!(call, PipelineCall::Bind))
    }

    pub fn count_draws(&self) -> usize {
        self.count(|call| matches!(call, PipelineCall::DrawIndex { .. }))
    }

    pub fn count_uploads(&self) -> usize {
        self.count(|call| {
            matches!(
                call,
                PipelineCall::UploadVertexBuffer { .. } | PipelineCall::UploadIndexBuffer { .. }
            )
        })
    }

    pub fn count_texture_creates(&self) -> usize {
        self.count(|call| matches!(call, PipelineCall::CreateTexture { .. }))
    }

    pub fn count_render_target_creates(&self) -> usize {
        self.count(|call| matches!(call, PipelineCall::CreateRenderTarget { .. }))
    }

    pub fn count_render_target_binds(&self) -> usize {
        self.count(|call| matches!(call, PipelineCall::BindRenderTarget(_)))
    }

    /// Textures created and not yet released.
    pub fn live_textures(&self) -> usize {
        self.textures.lock().len()
    }

    /// Render targets created and not yet released.
    pub fn live_render_targets(&self) -> usize {
        self.targets.lock().len()
    }

    /// Stencil value of a screen pixel.
    pub fn stencil_at(&self, x: u32, y: u32) -> u32 {
        let machine = self.machine.lock();
        machine
            .screen
            .index(x, y)
            .map_or(0, |i| machine.screen.stencil[i])
    }

    /// Every screen stencil value is zero.
    pub fn stencil_is_clear(&self) -> bool {
        self.machine.lock().screen.stencil.iter().all(|&s| s == 0)
    }

    /// Last color written to a screen pixel, alpha scaled by the global
    /// alpha of the draw.
    pub fn color_at(&self, x: u32, y: u32) -> Option<Vec4> {
        let machine = self.machine.lock();
        machine.screen.index(x, y).and_then(|i| machine.screen.color[i])
    }

    /// Screen pixels that received color.
    pub fn colored_pixels(&self) -> usize {
        self.machine
            .lock()
            .screen
            .color
            .iter()
            .filter(|c| c.is_some())
            .count()
    }

    /// Row-major coverage mask of the screen.
    pub fn coverage(&self) -> Vec<bool> {
        self.machine
            .lock()
            .screen
            .color
            .iter()
            .map(Option::is_some)
            .collect()
    }

    /// Zero the screen attachments.
    pub fn clear_surface(&self) {
        let mut machine = self.machine.lock();
        let (width, height) = (machine.screen.width, machine.screen.height);
        machine.screen = Surface::new(width, height);
    }
}

impl Default for MockPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MockPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockPipeline")
            .field("calls", &self.call_count())
            .field("live_textures", &self.live_textures())
            .field("live_render_targets", &self.live_render_targets())
            .finish_non_exhaustive()
    }
}

impl Pipeline for MockPipeline {
    fn bind(&self) {
        self.record(PipelineCall::Bind);
        let mut machine = self.machine.lock();
        machine.state = RasterState::default();
        machine.screen.stencil.fill(0);
    }

    fn unbind(&self) {
        self.record(PipelineCall::Unbind);
    }

    fn set_view_projection_matrix(&self, matrix: &Mat4) {
        self.record(PipelineCall::SetViewProjection(*matrix));
        self.machine.lock().state.view_projection = *matrix;
    }

    fn set_model_matrix(&self, matrix: &Mat4) {
        self.record(PipelineCall::SetModelMatrix(*matrix));
        self.machine.lock().state.model = *matrix;
    }

    fn set_color_mode(&self, mode: ColorMode) {
        self.record(PipelineCall::SetColorMode(mode));
        self.machine.lock().state.color_mode = mode;
    }

    fn set_stroke_width(&self, width: f32) {
        self.record(PipelineCall::SetStrokeWidth(width));
    }

    fn set_uniform_color(&self, color: Vec4) {
        self.record(PipelineCall::SetUniformColor(color));
        self.machine.lock().state.uniform_color = color;
    }

    fn set_gradient_bounds(&self, bounds: Vec4) {
        self.record(PipelineCall::SetGradientBounds(bounds));
    }

    fn set_gradient_count_info(&self, color_count: u32, position_count: u32) {
        self.record(PipelineCall::SetGradientCountInfo {
            colors: color_count,
            positions: position_count,
        });
    }

    fn set_gradient_colors(&self, colors: &[Vec4]) {
        self.record(PipelineCall::SetGradientColors(colors.to_vec()));
    }

    fn set_gradient_positions(&self, positions: &[f32]) {
        self.record(PipelineCall::SetGradientPositions(positions.to_vec()));
    }

    fn set_global_alpha(&self, alpha: f32) {
        self.record(PipelineCall::SetGlobalAlpha(alpha));
        self.machine.lock().state.global_alpha = alpha;
    }

    fn upload_vertex_buffer(&self, vertices: &[Vertex]) -> StrataResult<()> {
        self.record(PipelineCall::UploadVertexBuffer {
            count: vertices.len(),
        });
        self.machine.lock().vertices = vertices.to_vec();
        Ok(())
    }

    fn upload_index_buffer(&self, indices: &[u32]) -> StrataResult<()> {
        self.record(PipelineCall::UploadIndexBuffer {
            count: indices.len(),
        });
        self.machine.lock().indices = indices.to_vec();
        Ok(())
    }

    fn enable_stencil_test(&self) {
        self.record(PipelineCall::EnableStencilTest);
        self.machine.lock().state.stencil_test = true;
    }

    fn disable_stencil_test(&self) {
        self.record(PipelineCall::DisableStencilTest);
        self.machine.lock().state.stencil_test = false;
    }

    fn enable_color_output(&self) {
        self.record(PipelineCall::EnableColorOutput);
        self.machine.lock().state.color_output = true;
    }

    fn disable_color_output(&self) {
        self.record(PipelineCall::DisableColorOutput);
        self.machine.lock().state.color_output = false;
    }

    fn update_stencil_mask(&self, write_mask: u32) {
        self.record(PipelineCall::UpdateStencilMask(write_mask));
        self.machine.lock().state.write_mask = write_mask;
    }

    fn update_stencil_op(&self, op: StencilOp) {
        self.record(PipelineCall::UpdateStencilOp(op));
        self.machine.lock().state.op = op;
    }

    fn update_stencil_func(&self, func: StencilFunc, value: u32, compare_mask: u32) {
        self.record(PipelineCall::UpdateStencilFunc {
            func,
            value,
            compare_mask,
        });
        let mut machine = self.machine.lock();
        machine.state.func = func;
        machine.state.func_value = value;
        machine.state.func_mask = compare_mask;
    }

    fn draw_index(&self, start: u32, count: u32) {
        self.record(PipelineCall::DrawIndex { start, count });
        self.machine.lock().draw(start, count);
    }

    fn create_texture(&self, pixmap: &Pixmap) -> StrataResult<TextureHandle> {
        let (width, height) = (pixmap.width(), pixmap.height());
        self.record(PipelineCall::CreateTexture { width, height });
        if *self.fail_textures.lock() {
            return Err(StrataError::TextureCreation {
                width,
                height,
                reason: "mock failure".to_string(),
            });
        }
        let id = self.next_id();
        self.textures.lock().insert(id, (width, height));
        Ok(TextureHandle(id))
    }

    fn release_texture(&self, texture: TextureHandle) {
        self.record(PipelineCall::ReleaseTexture(texture));
        self.textures.lock().remove(&texture.0);
    }

    fn bind_texture(&self, texture: TextureHandle, slot: u32) {
        self.record(PipelineCall::BindTexture { texture, slot });
        self.machine.lock().state.texture = Some(texture);
    }

    fn create_render_target(&self, width: u32, height: u32) -> StrataResult<RenderTargetHandle> {
        self.record(PipelineCall::CreateRenderTarget { width, height });
        if *self.fail_render_targets.lock() {
            return Err(StrataError::RenderTargetCreation {
                width,
                height,
                reason: "mock failure".to_string(),
            });
        }
        let target = RenderTargetHandle {
            id: self.next_id(),
            width,
            height,
            texture: TextureHandle(self.next_id()),
        };
        self.targets.lock().insert(target.id, target);
        Ok(target)
    }

    fn release_render_target(&self, target: RenderTargetHandle) {
        self.record(PipelineCall::ReleaseRenderTarget(target));
        self.targets.lock().remove(&target.id);
        self.machine.lock().target_contents.remove(&target.texture.0);
    }

    fn bind_render_target(&self, target: RenderTargetHandle) {
        self.record(PipelineCall::BindRenderTarget(target));
        self.machine
            .lock()
            .bound_targets
            .push((target, Surface::new(target.width, target.height)));
    }

    fn unbind_render_target(&self, target: RenderTargetHandle) {
        self.record(PipelineCall::UnbindRenderTarget(target));
        let mut machine = self.machine.lock();
        if let Some(index) = machine
            .bound_targets
            .iter()
            .rposition(|(bound, _)| bound.id == target.id)
        {
            let (_, surface) = machine.bound_targets.remove(index);
            machine.target_contents.insert(target.texture.0, surface);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_geometry::VertexType;

    fn quad(mock: &MockPipeline, l: f32, t: f32, r: f32, b: f32) {
        let v = |x, y| Vertex::new(x, y, VertexType::LineNormal, 0.0, 0.0);
        mock.upload_vertex_buffer(&[v(l, t), v(r, t), v(r, b), v(l, b)])
            .unwrap();
        mock.upload_index_buffer(&[0, 1, 2, 0, 2, 3]).unwrap();
    }

    fn pixel_space() -> Mat4 {
        Mat4::orthographic_rh(0.0, 10.0, 10.0, 0.0, -1.0, 1.0)
    }

    #[test]
    fn test_quad_covers_each_pixel_once() {
        let mock = MockPipeline::with_size(10, 10);
        mock.bind();
        mock.set_view_projection_matrix(&pixel_space());
        quad(&mock, 0.0, 0.0, 10.0, 10.0);
        mock.enable_stencil_test();
        mock.update_stencil_func(StencilFunc::Always, 0, 0xFF);
        mock.update_stencil_op(StencilOp::IncrWrap);
        mock.draw_index(0, 6);

        // the shared diagonal must not be counted twice
        for y in 0..10 {
            for x in 0..10 {
                assert_eq!(mock.stencil_at(x, y), 1, "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_fringe_coverage_is_interpolated() {
        let mock = MockPipeline::with_size(10, 10);
        mock.bind();
        mock.set_view_projection_matrix(&pixel_space());
        let v = |x, coverage| Vertex::new(x, 0.0, VertexType::LineAa, coverage, 0.0);
        let w = |x, coverage| Vertex::new(x, 10.0, VertexType::LineAa, coverage, 0.0);
        mock.upload_vertex_buffer(&[v(0.0, 1.0), v(10.0, 0.0), w(10.0, 0.0), w(0.0, 1.0)])
            .unwrap();
        mock.upload_index_buffer(&[0, 1, 2, 0, 2, 3]).unwrap();
        mock.set_color_mode(ColorMode::UniformColor);
        mock.set_uniform_color(Vec4::ONE);
        mock.draw_index(0, 6);

        let alpha = |x| mock.color_at(x, 5).map(|c| c.w).unwrap_or(0.0);
        assert!((alpha(0) - 0.95).abs() < 1e-4);
        assert!((alpha(5) - 0.45).abs() < 1e-4);
        assert!(alpha(0) > alpha(5) && alpha(5) > alpha(9));
    }

    #[test]
    fn test_failing_fragments_keep_stencil() {
        let mock = MockPipeline::with_size(10, 10);
        mock.bind();
        mock.set_view_projection_matrix(&pixel_space());
        quad(&mock, 0.0, 0.0, 10.0, 10.0);
        mock.enable_stencil_test();
        mock.update_stencil_func(StencilFunc::Equal, 1, 0xFF);
        mock.update_stencil_op(StencilOp::Replace);
        mock.draw_index(0, 6);
        assert!(mock.stencil_is_clear());
    }

    #[test]
    fn test_write_mask_limits_bits() {
        let mock = MockPipeline::with_size(10, 10);
        mock.bind();
        mock.set_view_projection_matrix(&pixel_space());
        quad(&mock, 0.0, 0.0, 5.0, 5.0);
        mock.enable_stencil_test();
        mock.update_stencil_func(StencilFunc::Always, 0xFF, 0xFF);
        mock.update_stencil_op(StencilOp::Replace);
        mock.update_stencil_mask(0x10);
        mock.draw_index(0, 6);
        assert_eq!(mock.stencil_at(2, 2), 0x10);
        assert_eq!(mock.stencil_at(7, 7), 0);
    }

    #[test]
    fn test_color_respects_output_flag() {
        let mock = MockPipeline::with_size(10, 10);
        mock.bind();
        mock.set_view_projection_matrix(&pixel_space());
        quad(&mock, 0.0, 0.0, 10.0, 10.0);
        mock.set_color_mode(ColorMode::UniformColor);
        mock.set_uniform_color(Vec4::new(1.0, 0.0, 0.0, 1.0));
        mock.disable_color_output();
        mock.draw_index(0, 6);
        assert_eq!(mock.colored_pixels(), 0);

        mock.enable_color_output();
        mock.set_global_alpha(0.5);
        mock.draw_index(0, 6);
        assert_eq!(mock.colored_pixels(), 100);
        assert_eq!(mock.color_at(3, 3), Some(Vec4::new(1.0, 0.0, 0.0, 0.5)));
    }

    #[test]
    fn test_resource_bookkeeping() {
        let mock = MockPipeline::new();
        let pixmap = Pixmap::filled(2, 2, [255; 4]).unwrap();
        let texture = mock.create_texture(&pixmap).unwrap();
        let target = mock.create_render_target(4, 4).unwrap();
        assert_eq!(mock.live_textures(), 1);
        assert_eq!(mock.live_render_targets(), 1);

        mock.release_texture(texture);
        mock.release_render_target(target);
        assert_eq!(mock.live_textures(), 0);
        assert_eq!(mock.live_render_targets(), 0);

        mock.fail_textures(true);
        assert!(mock.create_texture(&pixmap).is_err());
    }
}
