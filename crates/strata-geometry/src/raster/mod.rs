//! Mesh writers.
//!
//! Every raster call collects indices into four buffers (stencil front,
//! stencil back, color, anti-alias fringe) while appending vertices straight
//! to the frame [`Mesh`]. [`RasterWriter::finish`] copies the buffers into the mesh back
//! to back and returns the resulting [`RasterRanges`].

pub mod aa;
pub mod fill;
pub mod shape;
pub mod stroke;

use glam::Vec2;
use strata_core::Rect;

use crate::mesh::{Mesh, MeshRange, RangeKind, RasterRanges};
use crate::vertex::VertexType;

pub use aa::{AA_WIDTH, AaFringe, aa_fringe};
pub use fill::{FillTessellator, fill_path, fill_path_aa, stencil_path};
pub use shape::{fill_circle, fill_rect, raster_line, stroke_rect};
pub use stroke::{StrokeGenerator, stroke_path};

/// Collects one raster call's geometry.
#[derive(Debug)]
pub struct RasterWriter<'m> {
    mesh: &'m mut Mesh,
    front: Vec<u32>,
    back: Vec<u32>,
    color: Vec<u32>,
    aa: Vec<u32>,
    target: RangeKind,
    bounds: Option<Rect>,
}

impl<'m> RasterWriter<'m> {
    /// New writer targeting the color buffer.
    pub fn new(mesh: &'m mut Mesh) -> Self {
        Self {
            mesh,
            front: Vec::new(),
            back: Vec::new(),
            color: Vec::new(),
            aa: Vec::new(),
            target: RangeKind::Color,
            bounds: None,
        }
    }

    /// Buffer that [`rect`](Self::rect) and [`triangle`](Self::triangle)
    /// write to.
    pub fn set_target(&mut self, target: RangeKind) {
        self.target = target;
    }

    pub fn target(&self) -> RangeKind {
        self.target
    }

    /// Bounds of every vertex appended so far.
    pub fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    pub fn vertex(&mut self, p: Vec2, kind: VertexType, u: f32, v: f32) -> u32 {
        match self.bounds.as_mut() {
            Some(bounds) => bounds.join_point(p),
            None => self.bounds = Some(Rect::from_ltrb(p.x, p.y, p.x, p.y)),
        }
        self.mesh.append_vertex(p.x, p.y, kind, u, v)
    }

    pub fn line_vertex(&mut self, p: Vec2) -> u32 {
        self.vertex(p, VertexType::LineNormal, 0.0, 0.0)
    }

    /// Fringe vertex with `coverage` in `[0, 1]`.
    pub fn aa_vertex(&mut self, p: Vec2, coverage: f32) -> u32 {
        self.vertex(p, VertexType::LineAa, coverage, 0.0)
    }

    /// Vertex of a distance-field disc around `center`.
    pub fn circle_vertex(&mut self, p: Vec2, center: Vec2) -> u32 {
        self.vertex(p, VertexType::Circle, center.x, center.y)
    }

    fn buffer(&mut self, kind: RangeKind) -> &mut Vec<u32> {
        match kind {
            RangeKind::StencilFront => &mut self.front,
            RangeKind::StencilBack => &mut self.back,
            RangeKind::Color => &mut self.color,
            RangeKind::AaOutline => &mut self.aa,
        }
    }

    pub fn triangle(&mut self, a: u32, b: u32, c: u32) {
        let target = self.target;
        self.buffer(target).extend_from_slice(&[a, b, c]);
    }

    pub fn front_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.front.extend_from_slice(&[a, b, c]);
    }

    pub fn back_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.back.extend_from_slice(&[a, b, c]);
    }

    /// Two triangles over a quad laid out as
    ///
    /// ```text
    /// a --- c
    /// |     |
    /// b --- d
    /// ```
    pub fn rect(&mut self, a: u32, b: u32, c: u32, d: u32) {
        let target = self.target;
        self.buffer(target).extend_from_slice(&[a, b, c, b, d, c]);
    }

    /// Axis aligned rectangle of plain vertices.
    pub fn fill_rect(&mut self, rect: &Rect) {
        let a = self.line_vertex(Vec2::new(rect.left, rect.top));
        let b = self.line_vertex(Vec2::new(rect.left, rect.bottom));
        let c = self.line_vertex(Vec2::new(rect.right, rect.top));
        let d = self.line_vertex(Vec2::new(rect.right, rect.bottom));
        self.rect(a, b, c, d);
    }

    /// Move the buffered indices into the mesh.
    pub fn finish(self) -> RasterRanges {
        let Self {
            mesh,
            front,
            back,
            color,
            aa,
            ..
        } = self;

        let mut flush = |indices: &[u32]| {
            if indices.is_empty() {
                MeshRange::EMPTY
            } else {
                MeshRange::new(mesh.append_indices(indices), indices.len() as u32)
            }
        };

        RasterRanges {
            front: flush(&front),
            back: flush(&back),
            color: flush(&color),
            aa_outline: flush(&aa),
        }
    }
}

/// Left-hand normal of a direction.
#[inline]
pub fn perp(dir: Vec2) -> Vec2 {
    Vec2::new(-dir.y, dir.x)
}

/// Corners `[p0 + n·r, p0 - n·r, p1 + n·r, p1 - n·r]` of the ribbon along
/// `p0 -> p1`, `None` for a zero-length or non-finite segment.
pub fn expand_line(p0: Vec2, p1: Vec2, radius: f32) -> Option<[Vec2; 4]> {
    let dir = (p1 - p0).normalize();
    if !dir.is_finite() {
        return None;
    }
    let n = perp(dir) * radius;
    Some([p0 + n, p0 - n, p1 + n, p1 - n])
}
