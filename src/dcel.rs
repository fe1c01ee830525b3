//! Doubly connected edge list.
//!
//! Every edge is a pair of twin half-edges. A half-edge has its face on the
//! left; `next` and `prev` walk the boundary of that face counter clockwise.
//! Unbounded edges simply miss the origin of one (or both) of their
//! half-edges, and the links that would go through infinity stay unset.

use crate::{points::SiteId, shape::Point};

macro_rules! id_type {
    ($name:ident) => {
        #[derive(Debug, Hash, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            pub const INVALID: $name = $name(u32::MAX);

            /// whether id is invalid
            pub fn invalid(&self) -> bool {
                self.0 == Self::INVALID.0
            }

            pub fn as_usize(&self) -> usize {
                self.0 as usize
            }

            pub(crate) fn from_index(index: usize) -> Self {
                Self(index as u32)
            }

            pub fn into_option(self) -> Option<Self> {
                if self.invalid() {
                    None
                } else {
                    Some(self)
                }
            }
        }
    };
}

id_type!(VertexId);
id_type!(HalfEdgeId);
id_type!(FaceId);

#[derive(Debug, Clone, Copy)]
pub struct Vertex {
    pub position: Point,
    /// any half-edge leaving this vertex
    pub incident: HalfEdgeId,
}

#[derive(Debug, Clone, Copy)]
pub struct HalfEdge {
    /// `INVALID` while the edge runs to infinity on this end
    pub origin: VertexId,
    pub twin: HalfEdgeId,
    pub next: HalfEdgeId,
    pub prev: HalfEdgeId,
    /// face on the left
    pub face: FaceId,
    excised: bool,
}

/// Voronoi cell of one site
#[derive(Debug, Clone, Copy)]
pub struct Face {
    pub site: SiteId,
    /// any half-edge on the boundary
    pub incident: HalfEdgeId,
}

#[derive(Debug, Clone, Default)]
pub struct Dcel {
    vertices: Vec<Vertex>,
    half_edges: Vec<HalfEdge>,
    faces: Vec<Face>,
    excised: usize,
}

impl Dcel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Room for the diagram of `sites` sites: at most `2n` vertices and `3n` edges.
    pub fn with_capacity(sites: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(2 * sites),
            half_edges: Vec::with_capacity(6 * sites),
            faces: Vec::with_capacity(sites),
            excised: 0,
        }
    }

    pub fn vertex_len(&self) -> usize {
        self.vertices.len()
    }

    /// half-edges, including excised ones until [`Self::compact`]
    pub fn half_edge_len(&self) -> usize {
        self.half_edges.len()
    }

    pub fn face_len(&self) -> usize {
        self.faces.len()
    }

    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(id.as_usize())
    }

    pub fn half_edge(&self, id: HalfEdgeId) -> Option<&HalfEdge> {
        self.half_edges.get(id.as_usize()).filter(|e| !e.excised)
    }

    pub fn face(&self, id: FaceId) -> Option<&Face> {
        self.faces.get(id.as_usize())
    }

    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &Vertex)> {
        self.vertices
            .iter()
            .enumerate()
            .map(|(idx, v)| (VertexId::from_index(idx), v))
    }

    /// live half-edges
    pub fn half_edges(&self) -> impl Iterator<Item = (HalfEdgeId, &HalfEdge)> {
        self.half_edges
            .iter()
            .enumerate()
            .filter(|(_, e)| !e.excised)
            .map(|(idx, e)| (HalfEdgeId::from_index(idx), e))
    }

    pub fn faces(&self) -> impl Iterator<Item = (FaceId, &Face)> {
        self.faces
            .iter()
            .enumerate()
            .map(|(idx, f)| (FaceId::from_index(idx), f))
    }

    pub fn origin(&self, edge: HalfEdgeId) -> Option<VertexId> {
        self.half_edge(edge)?.origin.into_option()
    }

    pub fn destination(&self, edge: HalfEdgeId) -> Option<VertexId> {
        self.origin(self.twin(edge)?)
    }

    pub fn twin(&self, edge: HalfEdgeId) -> Option<HalfEdgeId> {
        Some(self.half_edge(edge)?.twin)
    }

    pub fn next(&self, edge: HalfEdgeId) -> Option<HalfEdgeId> {
        self.half_edge(edge)?.next.into_option()
    }

    pub fn prev(&self, edge: HalfEdgeId) -> Option<HalfEdgeId> {
        self.half_edge(edge)?.prev.into_option()
    }

    /// helper method used in the crate when `edge` is known to be live
    pub(crate) fn twin_unchecked(&self, edge: HalfEdgeId) -> HalfEdgeId {
        debug_assert!(!self.half_edges[edge.as_usize()].excised);
        self.half_edges[edge.as_usize()].twin
    }

    pub fn face_of(&self, edge: HalfEdgeId) -> Option<FaceId> {
        Some(self.half_edge(edge)?.face)
    }

    /// position of the origin
    pub fn position(&self, vertex: VertexId) -> Option<Point> {
        self.vertex(vertex).map(|v| v.position)
    }

    pub fn create_vertex(&mut self, position: Point) -> VertexId {
        let id = VertexId::from_index(self.vertices.len());
        self.vertices.push(Vertex {
            position,
            incident: HalfEdgeId::INVALID,
        });
        id
    }

    pub fn create_face(&mut self, site: SiteId) -> FaceId {
        let id = FaceId::from_index(self.faces.len());
        self.faces.push(Face {
            site,
            incident: HalfEdgeId::INVALID,
        });
        id
    }

    /// Create twin half-edges, the first one with `left` on its left, the
    /// second one with `right`.
    pub fn create_half_edge_pair(&mut self, left: FaceId, right: FaceId) -> (HalfEdgeId, HalfEdgeId) {
        let a = HalfEdgeId::from_index(self.half_edges.len());
        let b = HalfEdgeId::from_index(self.half_edges.len() + 1);
        for (twin, face) in [(b, left), (a, right)] {
            self.half_edges.push(HalfEdge {
                origin: VertexId::INVALID,
                twin,
                next: HalfEdgeId::INVALID,
                prev: HalfEdgeId::INVALID,
                face,
                excised: false,
            });
        }
        for (edge, face) in [(a, left), (b, right)] {
            let face = &mut self.faces[face.as_usize()];
            if face.incident.invalid() {
                face.incident = edge;
            }
        }
        (a, b)
    }

    pub fn set_origin(&mut self, edge: HalfEdgeId, vertex: VertexId) {
        self.half_edges[edge.as_usize()].origin = vertex;
        let vertex = &mut self.vertices[vertex.as_usize()];
        if vertex.incident.invalid() {
            vertex.incident = edge;
        }
    }

    /// Make `next` follow `prev` on the boundary of their face.
    pub fn link(&mut self, prev: HalfEdgeId, next: HalfEdgeId) {
        debug_assert_eq!(
            self.half_edges[prev.as_usize()].face,
            self.half_edges[next.as_usize()].face,
            "linked half-edges share their face"
        );
        self.half_edges[prev.as_usize()].next = next;
        self.half_edges[next.as_usize()].prev = prev;
    }

    /// Link `edges` into a closed cycle, in order.
    pub fn link_face_boundary(&mut self, edges: &[HalfEdgeId]) {
        for (i, edge) in edges.iter().enumerate() {
            self.link(*edge, edges[(i + 1) % edges.len()]);
        }
    }

    /// Remove the zero length edge `edge`/twin, both halves start at the same
    /// vertex. The boundary cycles running through the pair are short cut.
    pub fn excise_pair(&mut self, edge: HalfEdgeId) {
        let twin = self.half_edges[edge.as_usize()].twin;
        debug_assert_eq!(
            self.half_edges[edge.as_usize()].origin,
            self.half_edges[twin.as_usize()].origin,
            "only zero length edges are excised"
        );

        for h in [edge, twin] {
            let HalfEdge {
                next, prev, face, origin, ..
            } = self.half_edges[h.as_usize()];

            match (prev.into_option(), next.into_option()) {
                (Some(p), Some(n)) => self.link(p, n),
                (Some(p), None) => self.half_edges[p.as_usize()].next = HalfEdgeId::INVALID,
                (None, Some(n)) => self.half_edges[n.as_usize()].prev = HalfEdgeId::INVALID,
                (None, None) => {}
            }

            let face = &mut self.faces[face.as_usize()];
            if face.incident == h {
                face.incident = next.into_option().or(prev.into_option()).unwrap_or(HalfEdgeId::INVALID);
            }
            if let Some(origin) = origin.into_option() {
                let vertex = &mut self.vertices[origin.as_usize()];
                if vertex.incident == h {
                    vertex.incident = HalfEdgeId::INVALID;
                }
            }

            let record = &mut self.half_edges[h.as_usize()];
            record.excised = true;
            record.next = HalfEdgeId::INVALID;
            record.prev = HalfEdgeId::INVALID;
        }
        self.excised += 2;
    }

    /// Drop excised half-edges, renumbering the rest. Ids handed out before
    /// are invalid afterwards.
    pub fn compact(&mut self) {
        if self.excised > 0 {
            let mut remap = vec![HalfEdgeId::INVALID; self.half_edges.len()];
            let mut kept = 0;
            for (old, edge) in self.half_edges.iter().enumerate() {
                if !edge.excised {
                    remap[old] = HalfEdgeId::from_index(kept);
                    kept += 1;
                }
            }

            let map = |id: HalfEdgeId| {
                id.into_option()
                    .map_or(HalfEdgeId::INVALID, |id| remap[id.as_usize()])
            };
            self.half_edges.retain(|e| !e.excised);
            for edge in self.half_edges.iter_mut() {
                edge.twin = map(edge.twin);
                edge.next = map(edge.next);
                edge.prev = map(edge.prev);
            }
            for face in self.faces.iter_mut() {
                face.incident = map(face.incident);
            }
            for vertex in self.vertices.iter_mut() {
                vertex.incident = map(vertex.incident);
            }
            self.excised = 0;
        }

        // a vertex may have lost its incident edge to an excised pair
        for idx in 0..self.half_edges.len() {
            let edge = &self.half_edges[idx];
            if let Some(origin) = edge.origin.into_option() {
                let vertex = &mut self.vertices[origin.as_usize()];
                if vertex.incident.invalid() {
                    vertex.incident = HalfEdgeId::from_index(idx);
                }
            }
        }
    }

    /// Number of edges around `vertex`
    pub fn degree(&self, vertex: VertexId) -> usize {
        let Some(start) = self.vertex(vertex).and_then(|v| v.incident.into_option()) else {
            return 0;
        };

        // walk the fan, twin then next, falls back to a scan on open links
        let mut count = 0;
        let mut edge = start;
        loop {
            count += 1;
            match self.twin(edge).and_then(|t| self.next(t)) {
                Some(n) if n == start => return count,
                Some(n) if count <= self.half_edges.len() => edge = n,
                _ => break,
            }
        }
        self.half_edges()
            .filter(|(_, e)| e.origin == vertex)
            .count()
    }

    /// Structural checks over every live record.
    pub fn verify(&self) -> bool {
        for (id, edge) in self.half_edges() {
            let Some(twin) = self.half_edge(edge.twin) else {
                return false;
            };
            if twin.twin != id || edge.twin == id {
                return false;
            }

            if let Some(next) = edge.next.into_option() {
                let Some(next_edge) = self.half_edge(next) else {
                    return false;
                };
                if next_edge.prev != id || next_edge.face != edge.face {
                    return false;
                }
                // origin(next(e)) == destination(e)
                if next_edge.origin.invalid() || next_edge.origin != twin.origin {
                    return false;
                }
            }
            if let Some(prev) = edge.prev.into_option() {
                match self.half_edge(prev) {
                    Some(prev_edge) if prev_edge.next == id => {}
                    _ => return false,
                }
            }
            if edge.face.as_usize() >= self.faces.len() {
                return false;
            }
            if let Some(origin) = edge.origin.into_option() {
                if origin.as_usize() >= self.vertices.len() {
                    return false;
                }
            }
        }

        for (id, vertex) in self.vertices() {
            if let Some(incident) = vertex.incident.into_option() {
                if self.origin(incident) != Some(id) {
                    return false;
                }
            }
        }
        for (id, face) in self.faces() {
            if let Some(incident) = face.incident.into_option() {
                if self.face_of(incident) != Some(id) {
                    return false;
                }
            }
        }
        true
    }
}
