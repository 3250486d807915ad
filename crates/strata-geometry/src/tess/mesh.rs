use glam::Vec2;
use strata_core::alloc::Arena;

use super::{EdgeId, FaceId, MeshError, VertexId};

/// One directed half of an edge.
///
/// `o_next` walks counter-clockwise around the origin, `l_next` walks
/// counter-clockwise around the left face. `next` threads the global edge
/// list: `e.next` goes forward, `e.sym.next` goes backward.
#[derive(Debug, Clone)]
pub struct HalfEdge {
    next: EdgeId,
    sym: EdgeId,
    o_next: EdgeId,
    l_next: EdgeId,
    org: Option<VertexId>,
    l_face: Option<FaceId>,
    /// Change in winding number when crossing from the right face to the
    /// left face.
    pub winding: i32,
}

impl HalfEdge {
    fn detached(me: EdgeId) -> Self {
        Self {
            next: me,
            sym: me,
            o_next: me,
            l_next: me,
            org: None,
            l_face: None,
            winding: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MeshVertex {
    next: VertexId,
    prev: VertexId,
    edge: Option<EdgeId>,
    pub position: Vec2,
}

#[derive(Debug, Clone)]
pub struct MeshFace {
    next: FaceId,
    prev: FaceId,
    edge: Option<EdgeId>,
    /// The face lies inside the filled region.
    pub inside: bool,
}

/// Arena-backed half-edge mesh.
///
/// Vertices and faces live on circular doubly-linked lists anchored at
/// sentinel heads, edges on a circular list anchored at a sentinel pair.
/// Sentinels have no origin and no face.
#[derive(Debug)]
pub struct HalfEdgeMesh {
    edges: Arena<HalfEdge>,
    vertices: Arena<MeshVertex>,
    faces: Arena<MeshFace>,
    e_head: EdgeId,
    v_head: VertexId,
    f_head: FaceId,
}

impl Default for HalfEdgeMesh {
    fn default() -> Self {
        Self::new()
    }
}

impl HalfEdgeMesh {
    /// Empty mesh holding only the sentinels.
    pub fn new() -> Self {
        let mut edges = Arena::new();
        let e_head = EdgeId(edges.insert_with(|h| HalfEdge::detached(EdgeId(h))));
        let e_head_sym = EdgeId(edges.insert_with(|h| HalfEdge {
            sym: e_head,
            ..HalfEdge::detached(EdgeId(h))
        }));
        edges[e_head.0].sym = e_head_sym;

        let mut vertices = Arena::new();
        let v_head = VertexId(vertices.insert_with(|h| MeshVertex {
            next: VertexId(h),
            prev: VertexId(h),
            edge: None,
            position: Vec2::ZERO,
        }));

        let mut faces = Arena::new();
        let f_head = FaceId(faces.insert_with(|h| MeshFace {
            next: FaceId(h),
            prev: FaceId(h),
            edge: None,
            inside: false,
        }));

        Self {
            edges,
            vertices,
            faces,
            e_head,
            v_head,
            f_head,
        }
    }

    // ------------------------------------------------------------------
    // record access

    fn edge(&self, e: EdgeId) -> &HalfEdge {
        &self.edges[e.0]
    }

    fn edge_mut(&mut self, e: EdgeId) -> &mut HalfEdge {
        &mut self.edges[e.0]
    }

    fn vertex(&self, v: VertexId) -> &MeshVertex {
        &self.vertices[v.0]
    }

    fn vertex_mut(&mut self, v: VertexId) -> &mut MeshVertex {
        &mut self.vertices[v.0]
    }

    fn face(&self, f: FaceId) -> &MeshFace {
        &self.faces[f.0]
    }

    fn face_mut(&mut self, f: FaceId) -> &mut MeshFace {
        &mut self.faces[f.0]
    }

    // ------------------------------------------------------------------
    // navigation

    pub fn sym(&self, e: EdgeId) -> EdgeId {
        self.edge(e).sym
    }

    /// Next edge counter-clockwise around the origin.
    pub fn o_next(&self, e: EdgeId) -> EdgeId {
        self.edge(e).o_next
    }

    /// Next edge counter-clockwise around the left face.
    pub fn l_next(&self, e: EdgeId) -> EdgeId {
        self.edge(e).l_next
    }

    pub fn org(&self, e: EdgeId) -> Option<VertexId> {
        self.edge(e).org
    }

    pub fn dst(&self, e: EdgeId) -> Option<VertexId> {
        self.org(self.sym(e))
    }

    pub fn l_face(&self, e: EdgeId) -> Option<FaceId> {
        self.edge(e).l_face
    }

    pub fn r_face(&self, e: EdgeId) -> Option<FaceId> {
        self.l_face(self.sym(e))
    }

    pub fn o_prev(&self, e: EdgeId) -> EdgeId {
        self.l_next(self.sym(e))
    }

    pub fn l_prev(&self, e: EdgeId) -> EdgeId {
        self.sym(self.o_next(e))
    }

    pub fn d_prev(&self, e: EdgeId) -> EdgeId {
        self.sym(self.l_next(e))
    }

    pub fn r_prev(&self, e: EdgeId) -> EdgeId {
        self.o_next(self.sym(e))
    }

    pub fn d_next(&self, e: EdgeId) -> EdgeId {
        self.sym(self.r_prev(e))
    }

    pub fn r_next(&self, e: EdgeId) -> EdgeId {
        self.sym(self.o_prev(e))
    }

    // ------------------------------------------------------------------
    // attributes

    pub fn position(&self, v: VertexId) -> Vec2 {
        self.vertex(v).position
    }

    pub fn set_position(&mut self, v: VertexId, position: Vec2) {
        self.vertex_mut(v).position = position;
    }

    /// An edge leaving `v`.
    pub fn vertex_edge(&self, v: VertexId) -> Option<EdgeId> {
        self.vertex(v).edge
    }

    /// An edge with `f` on its left.
    pub fn face_edge(&self, f: FaceId) -> Option<EdgeId> {
        self.face(f).edge
    }

    pub fn is_inside(&self, f: FaceId) -> bool {
        self.face(f).inside
    }

    pub fn set_inside(&mut self, f: FaceId, inside: bool) {
        self.face_mut(f).inside = inside;
    }

    pub fn winding(&self, e: EdgeId) -> i32 {
        self.edge(e).winding
    }

    pub fn set_winding(&mut self, e: EdgeId, winding: i32) {
        self.edge_mut(e).winding = winding;
    }

    pub fn contains_edge(&self, e: EdgeId) -> bool {
        self.edges.contains(e.0)
    }

    pub fn contains_vertex(&self, v: VertexId) -> bool {
        self.vertices.contains(v.0)
    }

    pub fn contains_face(&self, f: FaceId) -> bool {
        self.faces.contains(f.0)
    }

    // ------------------------------------------------------------------
    // iteration

    /// Vertices in list order.
    pub fn vertices(&self) -> impl Iterator<Item = VertexId> + '_ {
        let head = self.v_head;
        std::iter::successors(Some(self.vertex(head).next), move |&v| Some(self.vertex(v).next))
            .take_while(move |&v| v != head)
    }

    /// Faces in list order.
    pub fn faces(&self) -> impl Iterator<Item = FaceId> + '_ {
        let head = self.f_head;
        std::iter::successors(Some(self.face(head).next), move |&f| Some(self.face(f).next))
            .take_while(move |&f| f != head)
    }

    /// One half of every edge pair, in list order.
    pub fn edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        let head = self.e_head;
        std::iter::successors(Some(self.edge(head).next), move |&e| Some(self.edge(e).next))
            .take_while(move |&e| e != head)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() - 1
    }

    pub fn face_count(&self) -> usize {
        self.faces.len() - 1
    }

    /// Number of edge pairs.
    pub fn edge_count(&self) -> usize {
        (self.edges.len() - 2) / 2
    }

    /// Edges around the left face of `e`, starting with `e`.
    pub fn face_loop(&self, e: EdgeId) -> Vec<EdgeId> {
        self.collect_ring(e, |mesh, e| mesh.l_next(e))
    }

    /// Edges leaving the origin of `e`, starting with `e`.
    pub fn vertex_ring(&self, e: EdgeId) -> Vec<EdgeId> {
        self.collect_ring(e, |mesh, e| mesh.o_next(e))
    }

    fn collect_ring(&self, start: EdgeId, step: impl Fn(&Self, EdgeId) -> EdgeId) -> Vec<EdgeId> {
        let mut ring = vec![start];
        let mut e = step(self, start);
        // a corrupted ring must not hang check()
        while e != start && ring.len() <= self.edges.len() {
            ring.push(e);
            e = step(self, e);
        }
        ring
    }

    /// Positions around face `f`.
    pub fn face_positions(&self, f: FaceId) -> Vec<Vec2> {
        let Some(start) = self.face_edge(f) else {
            return Vec::new();
        };
        self.face_loop(start)
            .into_iter()
            .filter_map(|e| self.org(e))
            .map(|v| self.position(v))
            .collect()
    }

    // ------------------------------------------------------------------
    // primitive operations

    /// Create one edge pair with two new vertices and one new face on both
    /// sides (a loop of length two around a single face).
    pub fn make_edge(&mut self) -> EdgeId {
        let e = self.make_edge_internal(self.e_head);
        let e_sym = self.sym(e);

        self.make_vertex_internal(e, self.v_head);
        self.make_vertex_internal(e_sym, self.v_head);
        self.make_face_internal(e, self.f_head);

        e
    }

    /// Exchange `e_org.o_next` with `e_dst.o_next`.
    ///
    /// Joins two distinct vertices or splits one (likewise for the left
    /// faces), the basic operation for changing mesh connectivity.
    pub fn splice(&mut self, e_org: EdgeId, e_dst: EdgeId) {
        if e_org == e_dst {
            return;
        }

        let mut joining_vertices = false;
        let mut joining_loops = false;

        let org = self.org(e_org);
        let dst_org = self.org(e_dst);
        debug_assert!(org.is_some() && dst_org.is_some(), "splice on a sentinel edge");
        if dst_org != org {
            // merging two disjoint vertices, e_dst's origin goes away
            joining_vertices = true;
            if let Some(v) = dst_org {
                self.destroy_vertex_internal(v, org);
            }
        }

        let face = self.l_face(e_org);
        let dst_face = self.l_face(e_dst);
        if dst_face != face {
            // connecting two disjoint loops, e_dst's face goes away
            joining_loops = true;
            if let Some(f) = dst_face {
                self.destroy_face_internal(f, face);
            }
        }

        self.splice_internal(e_dst, e_org);

        if !joining_vertices {
            // one vertex split in two, the new one is e_dst's origin
            if let Some(org) = org {
                self.make_vertex_internal(e_dst, org);
                self.vertex_mut(org).edge = Some(e_org);
            }
        }

        if !joining_loops {
            // one loop split in two, the new one is e_dst's left face
            if let Some(face) = face {
                self.make_face_internal(e_dst, face);
                self.face_mut(face).edge = Some(e_org);
            }
        }
    }

    /// New edge from `e_org`'s destination to a new vertex, inserted after
    /// `e_org` in its face loop.
    pub fn add_edge_vertex(&mut self, e_org: EdgeId) -> EdgeId {
        let e_new = self.make_edge_internal(e_org);
        let e_new_sym = self.sym(e_new);

        let e_org_l_next = self.l_next(e_org);
        self.splice_internal(e_new, e_org_l_next);

        let dst = self.dst(e_org);
        self.edge_mut(e_new).org = dst;
        let v_next = dst.unwrap_or(self.v_head);
        self.make_vertex_internal(e_new_sym, v_next);

        let face = self.l_face(e_org);
        self.edge_mut(e_new).l_face = face;
        self.edge_mut(e_new_sym).l_face = face;

        e_new
    }

    /// Split `e_org` in two by inserting a vertex. `e_org` keeps its origin,
    /// the returned edge continues from the new vertex to the old
    /// destination.
    pub fn split_edge(&mut self, e_org: EdgeId) -> EdgeId {
        let temp = self.add_edge_vertex(e_org);
        let e_new = self.sym(temp);

        // disconnect e_org from its destination and attach it to e_new's origin
        let e_org_sym = self.sym(e_org);
        let o_prev = self.o_prev(e_org_sym);
        self.splice_internal(e_org_sym, o_prev);
        self.splice_internal(e_org_sym, e_new);

        let new_org = self.org(e_new);
        self.edge_mut(e_org_sym).org = new_org;

        let e_new_sym = self.sym(e_new);
        if let Some(dst) = self.org(e_new_sym) {
            // may have pointed at e_org.sym
            self.vertex_mut(dst).edge = Some(e_new_sym);
        }

        let r_face = self.r_face(e_org);
        self.edge_mut(e_new_sym).l_face = r_face;

        let winding = self.winding(e_org);
        let sym_winding = self.winding(e_org_sym);
        self.edge_mut(e_new).winding = winding;
        self.edge_mut(e_new_sym).winding = sym_winding;

        e_new
    }

    /// New edge from `e_org`'s destination to `e_dst`'s origin.
    ///
    /// When both share a left face the face is split and the new face is on
    /// the left of the returned edge; otherwise the two loops are joined.
    pub fn connect(&mut self, e_org: EdgeId, e_dst: EdgeId) -> EdgeId {
        let e_new = self.make_edge_internal(e_org);
        let e_new_sym = self.sym(e_new);

        let mut joining_loops = false;
        let face = self.l_face(e_org);
        let dst_face = self.l_face(e_dst);
        if dst_face != face {
            joining_loops = true;
            if let Some(f) = dst_face {
                self.destroy_face_internal(f, face);
            }
        }

        let e_org_l_next = self.l_next(e_org);
        self.splice_internal(e_new, e_org_l_next);
        self.splice_internal(e_new_sym, e_dst);

        let dst = self.dst(e_org);
        let dst_org = self.org(e_dst);
        self.edge_mut(e_new).org = dst;
        self.edge_mut(e_new_sym).org = dst_org;
        self.edge_mut(e_new).l_face = face;
        self.edge_mut(e_new_sym).l_face = face;

        if let Some(face) = face {
            // the old face must point at an edge that stays on it
            self.face_mut(face).edge = Some(e_new_sym);
            if !joining_loops {
                self.make_face_internal(e_new, face);
            }
        }

        e_new
    }

    /// Remove the edge pair `e_del`, joining or splitting faces and deleting
    /// vertices left without edges.
    pub fn delete_edge(&mut self, e_del: EdgeId) {
        let e_del_sym = self.sym(e_del);
        let mut joining_loops = false;

        let l_face = self.l_face(e_del);
        let r_face = self.r_face(e_del);
        if l_face != r_face {
            // two faces become one
            joining_loops = true;
            if let Some(f) = l_face {
                self.destroy_face_internal(f, r_face);
            }
        }

        if self.o_next(e_del) == e_del {
            if let Some(v) = self.org(e_del) {
                self.destroy_vertex_internal(v, None);
            }
        } else {
            let o_prev = self.o_prev(e_del);
            let o_next = self.o_next(e_del);
            if let Some(f) = self.r_face(e_del) {
                self.face_mut(f).edge = Some(o_prev);
            }
            if let Some(v) = self.org(e_del) {
                self.vertex_mut(v).edge = Some(o_next);
            }

            self.splice_internal(e_del, o_prev);
            if !joining_loops {
                // one loop becomes two, give e_del's side its own face
                if let Some(f) = self.l_face(e_del) {
                    self.make_face_internal(e_del, f);
                }
            }
        }

        if self.o_next(e_del_sym) == e_del_sym {
            if let Some(v) = self.org(e_del_sym) {
                self.destroy_vertex_internal(v, None);
            }
            if let Some(f) = self.l_face(e_del_sym) {
                self.destroy_face_internal(f, None);
            }
        } else {
            let o_prev = self.o_prev(e_del_sym);
            let o_next = self.o_next(e_del_sym);
            if let Some(f) = self.l_face(e_del) {
                self.face_mut(f).edge = Some(o_prev);
            }
            if let Some(v) = self.org(e_del_sym) {
                self.vertex_mut(v).edge = Some(o_next);
            }
            self.splice_internal(e_del_sym, o_prev);
        }

        self.destroy_edge_internal(e_del);
    }

    /// Remove face `f_zap`, deleting every edge of its loop whose other
    /// side has no face either, and any vertex left isolated.
    pub fn zap_face(&mut self, f_zap: FaceId) {
        let Some(e_start) = self.face_edge(f_zap) else {
            return;
        };

        let mut e_next = self.l_next(e_start);
        loop {
            let e = e_next;
            e_next = self.l_next(e);

            self.edge_mut(e).l_face = None;
            if self.r_face(e).is_none() {
                if self.o_next(e) == e {
                    if let Some(v) = self.org(e) {
                        self.destroy_vertex_internal(v, None);
                    }
                } else {
                    let o_next = self.o_next(e);
                    if let Some(v) = self.org(e) {
                        self.vertex_mut(v).edge = Some(o_next);
                    }
                    let o_prev = self.o_prev(e);
                    self.splice_internal(e, o_prev);
                }

                let e_sym = self.sym(e);
                if self.o_next(e_sym) == e_sym {
                    if let Some(v) = self.org(e_sym) {
                        self.destroy_vertex_internal(v, None);
                    }
                } else {
                    let o_next = self.o_next(e_sym);
                    if let Some(v) = self.org(e_sym) {
                        self.vertex_mut(v).edge = Some(o_next);
                    }
                    let o_prev = self.o_prev(e_sym);
                    self.splice_internal(e_sym, o_prev);
                }

                self.destroy_edge_internal(e);
            }

            if e == e_start {
                break;
            }
        }

        let MeshFace { prev, next, .. } = *self.face(f_zap);
        self.face_mut(next).prev = prev;
        self.face_mut(prev).next = next;
        self.faces.remove(f_zap.0);
    }

    // ------------------------------------------------------------------
    // higher level helpers

    /// Load a closed polygon as one edge loop. Edges run in point order with
    /// winding +1 on their left, so a counter-clockwise polygon has its
    /// interior on the left face of the returned edge.
    pub fn add_polygon(&mut self, points: &[Vec2]) -> Option<EdgeId> {
        let mut current: Option<EdgeId> = None;

        for &p in points {
            let e = match current {
                None => {
                    // a single vertex with a self loop
                    let e = self.make_edge();
                    let e_sym = self.sym(e);
                    self.splice(e, e_sym);
                    e
                }
                Some(e) => {
                    self.split_edge(e);
                    self.l_next(e)
                }
            };

            if let Some(v) = self.org(e) {
                self.set_position(v, p);
            }
            self.edge_mut(e).winding = 1;
            let e_sym = self.sym(e);
            self.edge_mut(e_sym).winding = -1;
            current = Some(e);
        }

        current
    }

    /// Fan a convex face into triangles from the origin of its first edge.
    /// Returns every resulting face, `face` included.
    pub fn triangulate_face(&mut self, face: FaceId) -> Vec<FaceId> {
        let Some(mut e0) = self.face_edge(face) else {
            return Vec::new();
        };

        let mut faces = Vec::new();
        let mut remaining = self.face_loop(e0).len();
        while remaining > 3 {
            let e1 = self.l_next(e0);
            let e_new = self.connect(e1, e0);
            if let Some(f) = self.l_face(e_new) {
                faces.push(f);
            }
            e0 = self.sym(e_new);
            remaining -= 1;
        }
        faces.push(face);
        faces
    }

    /// Validate every structural invariant.
    pub fn check(&self) -> Result<(), MeshError> {
        // faces
        let mut f_prev = self.f_head;
        loop {
            let f = self.face(f_prev).next;
            if self.face(f).prev != f_prev {
                return Err(MeshError::BrokenList("face"));
            }
            if f == self.f_head {
                break;
            }
            let Some(start) = self.face(f).edge else {
                return Err(MeshError::BrokenList("face"));
            };
            for e in self.face_loop(start) {
                self.check_pair(e)?;
                if self.l_face(e) != Some(f) {
                    return Err(MeshError::WrongFace(f, e));
                }
            }
            f_prev = f;
        }

        // vertices
        let mut v_prev = self.v_head;
        loop {
            let v = self.vertex(v_prev).next;
            if self.vertex(v).prev != v_prev {
                return Err(MeshError::BrokenList("vertex"));
            }
            if v == self.v_head {
                break;
            }
            let Some(start) = self.vertex(v).edge else {
                return Err(MeshError::BrokenList("vertex"));
            };
            for e in self.vertex_ring(start) {
                self.check_pair(e)?;
                if self.org(e) != Some(v) {
                    return Err(MeshError::WrongOrigin(v, e));
                }
            }
            v_prev = v;
        }

        // edges
        let mut e_prev = self.e_head;
        loop {
            let e = self.edge(e_prev).next;
            if self.edge(self.sym(e)).next != self.sym(e_prev) {
                return Err(MeshError::BrokenList("edge"));
            }
            if e == self.e_head {
                break;
            }
            self.check_pair(e)?;
            if self.org(e).is_none() || self.dst(e).is_none() {
                return Err(MeshError::Detached(e));
            }
            if self.l_face(e).is_none() && self.r_face(e).is_none() {
                return Err(MeshError::Detached(e));
            }
            e_prev = e;
        }

        Ok(())
    }

    fn check_pair(&self, e: EdgeId) -> Result<(), MeshError> {
        let sym = self.sym(e);
        if sym == e || self.sym(sym) != e {
            return Err(MeshError::BrokenPair(e));
        }
        if self.sym(self.o_next(self.l_next(e))) != e || self.l_next(self.sym(self.o_next(e))) != e {
            return Err(MeshError::BrokenRing(e));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // internals

    /// New edge pair inserted before `e_next` in the global list, with both
    /// halves forming their own origin and face rings.
    fn make_edge_internal(&mut self, e_next: EdgeId) -> EdgeId {
        let e = EdgeId(self.edges.insert_with(|h| HalfEdge::detached(EdgeId(h))));
        let e_sym = EdgeId(self.edges.insert_with(|h| HalfEdge::detached(EdgeId(h))));

        let e_next_sym = self.sym(e_next);
        let e_prev = self.edge(e_next_sym).next;
        let e_prev_sym = self.sym(e_prev);

        self.edge_mut(e_sym).next = e_prev;
        self.edge_mut(e_prev_sym).next = e;
        self.edge_mut(e).next = e_next;
        self.edge_mut(e_next_sym).next = e_sym;

        let half = self.edge_mut(e);
        half.sym = e_sym;
        half.o_next = e;
        half.l_next = e_sym;

        let half = self.edge_mut(e_sym);
        half.sym = e;
        half.o_next = e_sym;
        half.l_next = e;

        e
    }

    /// Swap `a.o_next` and `b.o_next`, fixing the face rings to match.
    fn splice_internal(&mut self, a: EdgeId, b: EdgeId) {
        let a_o_next = self.o_next(a);
        let b_o_next = self.o_next(b);

        let a_o_next_sym = self.sym(a_o_next);
        let b_o_next_sym = self.sym(b_o_next);
        self.edge_mut(a_o_next_sym).l_next = b;
        self.edge_mut(b_o_next_sym).l_next = a;
        self.edge_mut(a).o_next = b_o_next;
        self.edge_mut(b).o_next = a_o_next;
    }

    /// New vertex inserted before `v_next`, becoming the origin of every
    /// edge in `e_org`'s origin ring.
    fn make_vertex_internal(&mut self, e_org: EdgeId, v_next: VertexId) {
        let v_prev = self.vertex(v_next).prev;
        let v_new = VertexId(self.vertices.insert(MeshVertex {
            next: v_next,
            prev: v_prev,
            edge: Some(e_org),
            position: Vec2::ZERO,
        }));
        self.vertex_mut(v_prev).next = v_new;
        self.vertex_mut(v_next).prev = v_new;

        for e in self.vertex_ring(e_org) {
            self.edge_mut(e).org = Some(v_new);
        }
    }

    /// New face inserted before `f_next`, becoming the left face of every
    /// edge in `e_org`'s loop. It inherits `f_next`'s inside flag.
    fn make_face_internal(&mut self, e_org: EdgeId, f_next: FaceId) {
        let f_prev = self.face(f_next).prev;
        let inside = self.face(f_next).inside;
        let f_new = FaceId(self.faces.insert(MeshFace {
            next: f_next,
            prev: f_prev,
            edge: Some(e_org),
            inside,
        }));
        self.face_mut(f_prev).next = f_new;
        self.face_mut(f_next).prev = f_new;

        for e in self.face_loop(e_org) {
            self.edge_mut(e).l_face = Some(f_new);
        }
    }

    /// Remove `v_del`, handing its edges to `new_org`.
    fn destroy_vertex_internal(&mut self, v_del: VertexId, new_org: Option<VertexId>) {
        if let Some(start) = self.vertex(v_del).edge {
            for e in self.vertex_ring(start) {
                self.edge_mut(e).org = new_org;
            }
        }

        let MeshVertex { prev, next, .. } = *self.vertex(v_del);
        self.vertex_mut(next).prev = prev;
        self.vertex_mut(prev).next = next;
        self.vertices.remove(v_del.0);
    }

    /// Remove `f_del`, handing its edges to `new_face`.
    fn destroy_face_internal(&mut self, f_del: FaceId, new_face: Option<FaceId>) {
        if let Some(start) = self.face(f_del).edge {
            for e in self.face_loop(start) {
                self.edge_mut(e).l_face = new_face;
            }
        }

        let MeshFace { prev, next, .. } = *self.face(f_del);
        self.face_mut(next).prev = prev;
        self.face_mut(prev).next = next;
        self.faces.remove(f_del.0);
    }

    /// Unlink the pair `e_del` from the global edge list and free it.
    fn destroy_edge_internal(&mut self, e_del: EdgeId) {
        let e_del_sym = self.sym(e_del);
        let e_next = self.edge(e_del).next;
        let e_prev = self.edge(e_del_sym).next;

        let e_next_sym = self.sym(e_next);
        let e_prev_sym = self.sym(e_prev);
        self.edge_mut(e_next_sym).next = e_prev;
        self.edge_mut(e_prev_sym).next = e_next;

        self.edges.remove(e_del_sym.0);
        self.edges.remove(e_del.0);
    }
}
