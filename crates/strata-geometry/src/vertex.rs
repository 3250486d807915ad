//! Vertex format for tessellated geometry.
//!
//! Every raster path writes the same five-float vertex. The `mix` field tags
//! how the fragment stage interprets `(u, v)`.

use bytemuck::{Pod, Zeroable};
use static_assertions::const_assert_eq;

/// Interpretation of a vertex's `(u, v)` pair.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexType {
    /// Plain geometry, `(u, v)` unused.
    LineNormal = 1,
    /// `(u, v)` is the center of a disc; fragments farther than the stroke
    /// radius are discarded.
    Circle = 2,
    /// `(u, v)` are implicit quadratic coordinates, keep `u² - v <= 0`.
    QuadIn = 3,
    /// Anti-alias fringe. `u` is coverage, 1 on the shape edge and 0 one
    /// pixel outside it; `v` is unused.
    LineAa = 4,
    /// `(u, v)` are implicit quadratic coordinates of the stroked curve,
    /// the fragment stage keeps a band of the stroke radius around it.
    QuadStroke = 5,
}

impl VertexType {
    pub fn as_f32(self) -> f32 {
        self as u32 as f32
    }

    /// Decode a `mix` value.
    pub fn from_f32(mix: f32) -> Option<Self> {
        match mix as u32 {
            1 => Some(Self::LineNormal),
            2 => Some(Self::Circle),
            3 => Some(Self::QuadIn),
            4 => Some(Self::LineAa),
            5 => Some(Self::QuadStroke),
            _ => None,
        }
    }
}

/// GPU vertex.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub x: f32,
    pub y: f32,
    /// [`VertexType`] tag as a float.
    pub mix: f32,
    pub u: f32,
    pub v: f32,
}

const_assert_eq!(std::mem::size_of::<Vertex>(), 20);

impl Vertex {
    pub fn new(x: f32, y: f32, kind: VertexType, u: f32, v: f32) -> Self {
        Self {
            x,
            y,
            mix: kind.as_f32(),
            u,
            v,
        }
    }

    pub fn kind(&self) -> Option<VertexType> {
        VertexType::from_f32(self.mix)
    }

    pub fn position(&self) -> glam::Vec2 {
        glam::Vec2::new(self.x, self.y)
    }
}
