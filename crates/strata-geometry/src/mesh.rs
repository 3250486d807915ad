//! Frame mesh: one shared vertex and index buffer that every raster call
//! appends to. Draw ops refer to slices of the index buffer by range.

use crate::vertex::{Vertex, VertexType};

/// A slice of the index buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct MeshRange {
    pub start: u32,
    pub count: u32,
}

impl MeshRange {
    pub const EMPTY: MeshRange = MeshRange { start: 0, count: 0 };

    pub fn new(start: u32, count: u32) -> Self {
        Self { start, count }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn end(&self) -> u32 {
        self.start + self.count
    }
}

/// Which pass a range feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeKind {
    /// Counter-clockwise triangles, incremented in the stencil.
    StencilFront,
    /// Clockwise triangles, decremented in the stencil.
    StencilBack,
    /// Triangles drawn to color (cover rect or direct geometry).
    Color,
    /// Anti-alias fringe.
    AaOutline,
}

/// The ranges produced by one raster call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RasterRanges {
    pub front: MeshRange,
    pub back: MeshRange,
    pub color: MeshRange,
    pub aa_outline: MeshRange,
}

impl RasterRanges {
    pub fn get(&self, kind: RangeKind) -> MeshRange {
        match kind {
            RangeKind::StencilFront => self.front,
            RangeKind::StencilBack => self.back,
            RangeKind::Color => self.color,
            RangeKind::AaOutline => self.aa_outline,
        }
    }

    /// True when coverage needs the stencil pass.
    pub fn needs_stencil(&self) -> bool {
        !self.front.is_empty() || !self.back.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.front.is_empty() && self.back.is_empty() && self.color.is_empty()
    }
}

/// Vertex and index storage for one frame.
#[derive(Debug, Default)]
pub struct Mesh {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one vertex and return its index.
    pub fn append_vertex(&mut self, x: f32, y: f32, kind: VertexType, u: f32, v: f32) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(Vertex::new(x, y, kind, u, v));
        index
    }

    /// Append indices and return where they start.
    pub fn append_indices(&mut self, indices: &[u32]) -> u32 {
        let start = self.indices.len() as u32;
        self.indices.extend_from_slice(indices);
        start
    }

    /// Index the next appended vertex will get.
    pub fn vertex_base(&self) -> u32 {
        self.vertices.len() as u32
    }

    /// Position the next appended index will get.
    pub fn index_base(&self) -> u32 {
        self.indices.len() as u32
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Indices of a range, empty when out of bounds.
    pub fn range_indices(&self, range: MeshRange) -> &[u32] {
        self.indices
            .get(range.start as usize..range.end() as usize)
            .unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Drop the frame's geometry, keeping the allocations.
    pub fn reset(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }
}
