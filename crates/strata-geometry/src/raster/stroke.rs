//! Stroke geometry generator.
//!
//! Expands a path into ribbons, joins and caps. Pieces overlap at joins, so
//! the canvas draws strokes through the stencil (front buffer plus a cover
//! rect) to blend every pixel once.

use glam::Vec2;
use strata_core::math::{Orientation, cross, orientation};
use strata_core::profiling::profile_function;
use tracing::trace;

use super::{RasterWriter, expand_line, perp};
use crate::curve::QuadraticBezier;
use crate::mesh::{Mesh, RangeKind, RasterRanges};
use crate::path::Path;
use crate::stroke::{LineCap, LineJoin, StrokeStyle};
use crate::vertex::VertexType;
use crate::visitor::{SegmentHandler, visit_path};

/// Cosine of the widest half angle one round-join fan covers.
const ROUND_JOIN_MIN_COS: f32 = 0.7;

/// Halving depth for quadratics that turn more than 90 degrees.
const MAX_QUAD_SPLIT_DEPTH: u32 = 4;

/// Where the generator is within a contour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContourState {
    /// No contour started.
    Idle,
    /// `move_to` seen, no visible segment yet.
    Started,
    /// At least one segment emitted.
    Streaming,
}

/// Turns segment events into stroke triangles.
#[derive(Debug)]
pub struct StrokeGenerator<'m> {
    writer: RasterWriter<'m>,
    style: StrokeStyle,
    radius: f32,
    state: ContourState,
    first: Vec2,
    first_dir: Vec2,
    current: Vec2,
    last_dir: Vec2,
}

impl<'m> StrokeGenerator<'m> {
    /// Generator writing into `writer`'s current target buffer.
    pub fn new(writer: RasterWriter<'m>, style: StrokeStyle) -> Self {
        Self {
            writer,
            radius: style.radius(),
            style,
            state: ContourState::Idle,
            first: Vec2::ZERO,
            first_dir: Vec2::ZERO,
            current: Vec2::ZERO,
            last_dir: Vec2::ZERO,
        }
    }

    pub fn writer(&self) -> &RasterWriter<'m> {
        &self.writer
    }

    pub fn into_writer(self) -> RasterWriter<'m> {
        self.writer
    }

    /// Record the start of a visible segment leaving `p0` along `dir`,
    /// emitting the join with the previous segment.
    fn begin_segment(&mut self, p0: Vec2, dir: Vec2) {
        match self.state {
            ContourState::Idle | ContourState::Started => {
                self.first_dir = dir;
                self.state = ContourState::Streaming;
            }
            ContourState::Streaming => self.join(p0, self.last_dir, dir),
        }
    }

    fn end_segment(&mut self, p1: Vec2, dir: Vec2) {
        self.current = p1;
        self.last_dir = dir;
    }

    /// Emit caps or the seam join for the open contour.
    fn finish_contour(&mut self) {
        if self.state == ContourState::Streaming {
            if self.current == self.first {
                self.join(self.first, self.last_dir, self.first_dir);
            } else {
                self.cap(self.first, -self.first_dir);
                self.cap(self.current, self.last_dir);
            }
        }
        self.state = ContourState::Idle;
    }

    fn stroke_line(&mut self, p0: Vec2, p1: Vec2) {
        let Some([a, b, c, d]) = expand_line(p0, p1, self.radius) else {
            trace!("skipping zero length stroke segment at {:?}", p0);
            self.current = p1;
            return;
        };
        let dir = (p1 - p0).normalize();
        self.begin_segment(p0, dir);

        let a = self.writer.line_vertex(a);
        let b = self.writer.line_vertex(b);
        let c = self.writer.line_vertex(c);
        let d = self.writer.line_vertex(d);
        self.writer.rect(a, b, c, d);

        self.end_segment(p1, dir);
    }

    fn stroke_quad(&mut self, quad: QuadraticBezier, depth: u32) {
        if orientation(quad.from, quad.control, quad.to) == Orientation::Linear {
            self.stroke_line(quad.from, quad.to);
            return;
        }

        let t0 = quad.start_tangent();
        let t1 = quad.end_tangent();
        if t0.dot(t1) < 0.0 && depth < MAX_QUAD_SPLIT_DEPTH {
            let (left, right) = quad.split(0.5);
            self.stroke_quad(left, depth + 1);
            self.stroke_quad(right, depth + 1);
            return;
        }

        let r = self.radius;
        let (n0, n1) = (perp(t0) * r, perp(t1) * r);
        let (a, b) = (quad.from + n0, quad.from - n0);
        let (c, d) = (quad.to + n1, quad.to - n1);
        let (Some(e_out), Some(e_in)) = (
            intersect_lines(a, t0, c, t1),
            intersect_lines(b, t0, d, t1),
        ) else {
            self.stroke_line(quad.from, quad.to);
            return;
        };

        self.begin_segment(quad.from, t0);

        let [a, b, e_out, e_in, c, d] =
            [a, b, e_out, e_in, c, d].map(|p| self.quad_stroke_vertex(&quad, p));
        self.writer.rect(a, b, e_out, e_in);
        self.writer.rect(e_out, e_in, c, d);

        self.end_segment(quad.to, t1);
    }

    /// Vertex carrying the implicit coordinates of `p` relative to the
    /// curve's control triangle.
    fn quad_stroke_vertex(&mut self, quad: &QuadraticBezier, p: Vec2) -> u32 {
        let [_, l1, l2] = barycentric(quad.from, quad.control, quad.to, p);
        let u = l1 * 0.5 + l2;
        let v = l2;
        self.writer.vertex(p, VertexType::QuadStroke, u, v)
    }

    /// Join at `center` between a segment arriving along `d_in` and one
    /// leaving along `d_out`.
    fn join(&mut self, center: Vec2, d_in: Vec2, d_out: Vec2) {
        if !(d_in.is_finite() && d_out.is_finite()) {
            trace!("skipping join with undefined direction at {:?}", center);
            return;
        }
        let turn = orientation(center - d_in, center, center + d_out);
        if turn == Orientation::Linear {
            return;
        }

        let r = self.radius;
        // the outer side is opposite to the turn
        let side = if turn == Orientation::CounterClockwise { -r } else { r };
        let p_in = center + perp(d_in) * side;
        let p_out = center + perp(d_out) * side;

        match self.style.join {
            LineJoin::Miter => self.miter_join(center, p_in, p_out),
            LineJoin::Bevel => self.bevel_join(center, p_in, p_out),
            LineJoin::Round => self.round_join(center, p_in - center, p_out - center),
        }
    }

    fn miter_join(&mut self, center: Vec2, p1: Vec2, p2: Vec2) {
        let out = (p1 - center) + (p2 - center);
        let r = self.radius;
        let k = 2.0 * r * r / out.length_squared();
        let pe = out * k;

        // |pe| = r / cos(turn / 2)
        let length = pe.length();
        if !length.is_finite() || length >= self.style.miter_limit * r {
            self.bevel_join(center, p1, p2);
            return;
        }

        let c = self.writer.line_vertex(center);
        let cp1 = self.writer.line_vertex(p1);
        let cp2 = self.writer.line_vertex(p2);
        let e = self.writer.line_vertex(center + pe);

        self.writer.triangle(c, cp1, e);
        self.writer.triangle(c, cp2, e);
    }

    fn bevel_join(&mut self, center: Vec2, p1: Vec2, p2: Vec2) {
        let a = self.writer.line_vertex(center);
        let b = self.writer.line_vertex(p1);
        let c = self.writer.line_vertex(p2);

        self.writer.triangle(a, b, c);
    }

    /// Fan from `center` over the arc between offsets `o1` and `o2` (both of
    /// length r). The virtual outer vertex sits where the tangents at both
    /// ends meet, so the fan contains the arc; wider arcs are halved first.
    fn round_join(&mut self, center: Vec2, o1: Vec2, o2: Vec2) {
        let r = self.radius;
        let mut bisector = (o1 + o2).normalize();
        if !bisector.is_finite() {
            // half turn, bend towards the side o1 -> o2 sweeps
            bisector = perp(o1).normalize();
        }

        // halve arcs wider than about 90 degrees
        let cos_half = o1.dot(bisector) / r;
        if cos_half < ROUND_JOIN_MIN_COS {
            let mid = bisector * r;
            self.round_join(center, o1, mid);
            self.round_join(center, mid, o2);
            return;
        }

        let out = center + bisector * (r / cos_half);
        let a = self.writer.circle_vertex(center, center);
        let b = self.writer.circle_vertex(center + o1, center);
        let c = self.writer.circle_vertex(center + o2, center);
        let e = self.writer.circle_vertex(out, center);

        self.writer.triangle(a, b, e);
        self.writer.triangle(a, e, c);
    }

    /// Cap at `center` facing `out_dir`.
    fn cap(&mut self, center: Vec2, out_dir: Vec2) {
        if self.style.cap == LineCap::Butt {
            return;
        }
        if !out_dir.is_finite() {
            trace!("skipping cap with undefined direction at {:?}", center);
            return;
        }
        let r = self.radius;
        let n = perp(out_dir) * r;
        let (p0, p1) = (center + n, center - n);
        let (a, b) = (p0 + out_dir * r, p1 + out_dir * r);

        let [i1, i2, i3, i4] = match self.style.cap {
            LineCap::Round => [p0, p1, a, b].map(|p| self.writer.circle_vertex(p, center)),
            _ => [p0, p1, a, b].map(|p| self.writer.line_vertex(p)),
        };
        self.writer.rect(i1, i2, i3, i4);
    }
}

impl SegmentHandler for StrokeGenerator<'_> {
    fn end_path(&mut self) {
        self.finish_contour();
    }

    fn move_to(&mut self, p: Vec2) {
        self.finish_contour();
        self.first = p;
        self.current = p;
        self.first_dir = Vec2::NAN;
        self.last_dir = Vec2::NAN;
        self.state = ContourState::Started;
    }

    fn line_to(&mut self, p0: Vec2, p1: Vec2) {
        self.stroke_line(p0, p1);
    }

    fn quad_to(&mut self, p0: Vec2, p1: Vec2, p2: Vec2) {
        self.stroke_quad(QuadraticBezier::new(p0, p1, p2), 0);
    }

    fn close(&mut self) {
        self.finish_contour();
        // further segments without a move start again at the contour start
        self.current = self.first;
        self.state = ContourState::Started;
    }
}

/// Intersection of the lines `p + s·dp` and `q + t·dq`.
fn intersect_lines(p: Vec2, dp: Vec2, q: Vec2, dq: Vec2) -> Option<Vec2> {
    let denom = cross(dp, dq);
    if denom.abs() < 1e-6 {
        return None;
    }
    let s = cross(q - p, dq) / denom;
    let hit = p + dp * s;
    hit.is_finite().then_some(hit)
}

/// Barycentric coordinates of `p` in triangle `(a, b, c)`.
fn barycentric(a: Vec2, b: Vec2, c: Vec2, p: Vec2) -> [f32; 3] {
    let area = cross(b - a, c - a);
    let l1 = cross(p - a, c - a) / area;
    let l2 = cross(b - a, p - a) / area;
    [1.0 - l1 - l2, l1, l2]
}

/// Stroke `path` into the stencil front buffer and append its bounds as the
/// cover rect in the color buffer.
pub fn stroke_path(mesh: &mut Mesh, path: &Path, style: StrokeStyle) -> RasterRanges {
    profile_function!();

    let mut writer = RasterWriter::new(mesh);
    writer.set_target(RangeKind::StencilFront);

    let mut generator = StrokeGenerator::new(writer, style);
    visit_path(path, false, &mut generator);

    let mut writer = generator.into_writer();
    if let Some(bounds) = writer.bounds() {
        writer.set_target(RangeKind::Color);
        writer.fill_rect(&bounds);
    }
    writer.finish()
}
