use crate::{
    context::Stats,
    dcel::{Dcel, FaceId, HalfEdgeId, VertexId},
    points::{SiteId, Sites},
    shape::{BoundingBox, Edge, Point},
    utils::bisector_direction,
    Float,
};

/// The Voronoi diagram of a site set. One face per distinct site, face ids
/// follow [`SiteId`]s.
#[derive(Debug, Clone)]
pub struct Diagram {
    sites: Sites,
    dcel: Dcel,
    stats: Stats,
}

/// The region of one site
#[derive(Debug, Clone)]
pub struct Cell {
    pub face: FaceId,
    pub site: Point,
    /// boundary half-edges, counter clockwise. An unbounded cell lists its
    /// chains one after another, each starting with the edge coming in from
    /// infinity.
    pub edges: Vec<HalfEdgeId>,
    closed: bool,
}

impl Cell {
    /// whether the boundary is a single bounded cycle
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Vertices on the boundary, in walk order
    pub fn vertices(&self, diagram: &Diagram) -> Vec<Point> {
        let dcel = diagram.dcel();
        self.edges
            .iter()
            .filter_map(|e| dcel.origin(*e))
            .filter_map(|v| dcel.position(v))
            .collect()
    }
}

impl Diagram {
    pub(crate) fn new(sites: Sites, dcel: Dcel, stats: Stats) -> Self {
        Self { sites, dcel, stats }
    }

    pub fn sites(&self) -> &Sites {
        &self.sites
    }

    /// The raw edge list, for walking the topology
    pub fn dcel(&self) -> &Dcel {
        &self.dcel
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, Point)> + '_ {
        self.dcel.vertices().map(|(id, v)| (id, v.position))
    }

    pub fn vertex_len(&self) -> usize {
        self.dcel.vertex_len()
    }

    /// number of edges, each made of two half-edges
    pub fn edge_len(&self) -> usize {
        self.dcel.half_edge_len() / 2
    }

    pub fn face_len(&self) -> usize {
        self.dcel.face_len()
    }

    /// Face of the `index`th input point. Duplicates share a face.
    pub fn face_of_input(&self, index: usize) -> Option<FaceId> {
        self.sites.site_of_input(index).map(Self::face_of_site)
    }

    pub fn face_of_site(site: SiteId) -> FaceId {
        FaceId::from_index(site.as_usize())
    }

    /// the site owning `face`
    pub fn site_of(&self, face: FaceId) -> Option<Point> {
        self.dcel.face(face).and_then(|f| self.sites.get(f.site))
    }

    pub fn degree(&self, vertex: VertexId) -> usize {
        self.dcel.degree(vertex)
    }

    /// Geometry of the edge `half_edge` belongs to. Rays point away from
    /// their vertex, lines run through the midpoint of their two sites.
    pub fn edge(&self, half_edge: HalfEdgeId) -> Option<Edge> {
        let twin = self.dcel.twin(half_edge)?;
        let site = self.site_of(self.dcel.face_of(half_edge)?)?;
        let other = self.site_of(self.dcel.face_of(twin)?)?;
        let direction = normalize(bisector_direction(site, other));

        let position = |h| self.dcel.origin(h).and_then(|v| self.dcel.position(v));
        Some(match (position(half_edge), position(twin)) {
            (Some(a), Some(b)) => Edge::Segment { a, b },
            (Some(origin), None) => Edge::Ray { origin, direction },
            (None, Some(origin)) => Edge::Ray {
                origin,
                direction: Point::new(-direction.x, -direction.y),
            },
            (None, None) => Edge::Line {
                point: Point::new((site.x + other.x) / 2., (site.y + other.y) / 2.),
                direction,
            },
        })
    }

    /// All edges, one per twin pair
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.dcel
            .half_edges()
            .filter(|(id, e)| *id < e.twin)
            .filter_map(|(id, _)| self.edge(id))
    }

    pub fn cell(&self, face: FaceId) -> Option<Cell> {
        let record = self.dcel.face(face)?;
        let site = self.sites.get(record.site)?;

        let heads = self
            .dcel
            .half_edges()
            .filter(|(id, e)| e.face == face && self.dcel.prev(*id).is_none())
            .map(|(id, _)| id)
            .collect::<Vec<_>>();
        let closed = heads.is_empty() && record.incident.into_option().is_some();

        let mut edges = vec![];
        let starts = match record.incident.into_option() {
            Some(start) if closed => vec![start],
            _ => heads,
        };
        for start in starts {
            let mut edge = Some(start);
            while let Some(e) = edge {
                edges.push(e);
                // guards against a broken cycle
                if edges.len() > self.dcel.half_edge_len() {
                    return None;
                }
                edge = self.dcel.next(e).filter(|n| *n != start);
            }
        }

        Some(Cell {
            face,
            site,
            edges,
            closed,
        })
    }

    /// every cell, in face order
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.dcel.faces().filter_map(|(id, _)| self.cell(id))
    }

    /// Edges cut down to `bbox`, those missing it dropped.
    pub fn clip(&self, bbox: &BoundingBox) -> Vec<[Point; 2]> {
        self.edges().filter_map(|e| bbox.clip(&e)).collect()
    }
}

fn normalize(p: Point) -> Point {
    let len = Float::hypot(p.x, p.y);
    if len == 0. {
        p
    } else {
        Point::new(p.x / len, p.y / len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Builder;

    fn diamond() -> Diagram {
        Builder::new(vec![
            Point::new(0., 0.),
            Point::new(4., 0.),
            Point::new(0., 4.),
            Point::new(4., 4.),
            Point::new(2., 2.),
        ])
        .build()
        .unwrap()
        .compute()
        .unwrap()
    }

    #[test]
    fn test_edges() {
        let diagram = diamond();
        let edges = diagram.edges().collect::<Vec<_>>();
        assert_eq!(edges.len(), diagram.edge_len());
        assert_eq!(edges.len(), 8);
        assert_eq!(edges.iter().filter(|e| e.is_bounded()).count(), 4);

        for edge in edges {
            match edge {
                Edge::Segment { a, b } => assert!((a.distance(&b) - Float::sqrt(8.)).abs() < 1e-6),
                Edge::Ray { origin, direction } => {
                    // the rays leave the diamond
                    let center = Point::new(2., 2.);
                    let further = origin.offset(direction, 1.);
                    assert!(further.distance(&center) > origin.distance(&center));
                }
                Edge::Line { .. } => panic!("unexpected line"),
            }
        }
    }

    #[test]
    fn test_cells() {
        let diagram = diamond();
        assert_eq!(diagram.cells().count(), 5);
        for cell in diagram.cells() {
            assert_eq!(diagram.site_of(cell.face), Some(cell.site));
            let dcel = diagram.dcel();
            for e in &cell.edges {
                assert_eq!(dcel.face_of(*e), Some(cell.face));
            }

            if cell.site == Point::new(2., 2.) {
                assert!(cell.is_closed());
                assert_eq!(cell.edges.len(), 4);
            } else {
                // corner cells: ray in, one segment, ray out
                assert!(!cell.is_closed());
                assert_eq!(cell.edges.len(), 3);
                assert_eq!(dcel.origin(cell.edges[0]), None);
                assert_eq!(dcel.destination(cell.edges[2]), None);
                assert_eq!(cell.vertices(&diagram).len(), 2);
            }
        }
    }

    #[test]
    fn test_cells_of_parallel_lines() {
        let diagram = Builder::new(vec![
            Point::new(0., 0.),
            Point::new(1., 0.),
            Point::new(2., 0.),
        ])
        .build()
        .unwrap()
        .compute()
        .unwrap();

        let middle = diagram.face_of_input(1).unwrap();
        let cell = diagram.cell(middle).unwrap();
        assert!(!cell.is_closed());
        // two separate chains of one edge each
        assert_eq!(cell.edges.len(), 2);
        assert!(cell.vertices(&diagram).is_empty());
    }

    #[test]
    fn test_clip() {
        let diagram = diamond();
        let bbox = BoundingBox::new(Point::new(-1., -1.), Point::new(5., 5.));
        let segments = diagram.clip(&bbox);
        assert_eq!(segments.len(), 8);
        for [a, b] in segments {
            assert!(bbox.expand(1e-9).contains(&a));
            assert!(bbox.expand(1e-9).contains(&b));
        }

        // only the segments of the central cell reach in here
        let bbox = BoundingBox::new(Point::new(0.5, 0.5), Point::new(3.5, 3.5));
        assert_eq!(diagram.clip(&bbox).len(), 4);

        let far = BoundingBox::new(Point::new(100., 100.), Point::new(101., 101.));
        assert!(diagram.clip(&far).is_empty());
    }

    #[test]
    fn test_lookup() {
        let diagram = diamond();
        let face = diagram.face_of_input(4).unwrap();
        assert_eq!(diagram.site_of(face), Some(Point::new(2., 2.)));
        assert_eq!(diagram.face_of_input(5), None);
        assert_eq!(diagram.site_of(FaceId::from_index(5)), None);
        for (vertex, _) in diagram.vertices() {
            assert_eq!(diagram.degree(vertex), 3);
        }
    }
}
