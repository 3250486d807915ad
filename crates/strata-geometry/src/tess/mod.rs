//! Half-edge mesh (doubly connected edge list).
//!
//! The topological core of a polygon tessellator: contours are loaded as
//! edge loops, then faces are split with [`HalfEdgeMesh::connect`] until
//! every inside face is a triangle.

mod mesh;

use std::fmt;

use strata_core::alloc::Handle;

pub use mesh::{HalfEdge, HalfEdgeMesh, MeshFace, MeshVertex};

/// Half-edge handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeId(pub(crate) Handle);

/// Vertex handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexId(pub(crate) Handle);

/// Face handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FaceId(pub(crate) Handle);

/// A broken invariant found by [`HalfEdgeMesh::check`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// `e.sym.sym != e` or `e.sym == e`.
    BrokenPair(EdgeId),
    /// `e.l_next.o_next.sym != e` or `e.o_next.sym.l_next != e`.
    BrokenRing(EdgeId),
    /// An edge is missing its origin or left face.
    Detached(EdgeId),
    /// An edge in a vertex ring does not start at that vertex.
    WrongOrigin(VertexId, EdgeId),
    /// An edge in a face loop does not have that face on its left.
    WrongFace(FaceId, EdgeId),
    /// A `prev` / `next` pair disagrees in a global list.
    BrokenList(&'static str),
}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeshError::BrokenPair(e) => write!(f, "edge {:?} is not paired with its sym", e),
            MeshError::BrokenRing(e) => write!(f, "edge {:?} breaks its origin or face ring", e),
            MeshError::Detached(e) => write!(f, "edge {:?} has no origin or left face", e),
            MeshError::WrongOrigin(v, e) => {
                write!(f, "edge {:?} in the ring of {:?} starts elsewhere", e, v)
            }
            MeshError::WrongFace(face, e) => {
                write!(f, "edge {:?} in the loop of {:?} borders another face", e, face)
            }
            MeshError::BrokenList(list) => write!(f, "{} list links are inconsistent", list),
        }
    }
}

impl std::error::Error for MeshError {}
