use std::collections::HashMap;

use crate::{
    beach_line::BeachLine,
    dcel::{Dcel, FaceId, VertexId},
    events::EventQueue,
    points::{SiteId, Sites},
    shape::Point,
    Error, Float,
};

/// Counters of one sweep
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub site_events: usize,
    pub circle_events: usize,
    /// circle events dequeued after their arc was gone
    pub stale_events: usize,
    /// circle events deleted from the queue before they fired
    pub cancelled_events: usize,
    /// circle events that reused a coincident vertex
    pub merged_vertices: usize,
}

/// State of one sweep, handed to [`crate::Observer`]s.
pub struct Context<'a> {
    pub sites: &'a Sites,
    pub beach_line: BeachLine,
    pub queue: EventQueue,
    pub dcel: Dcel,
    /// y of the sweep line, never increases
    pub sweep_y: Float,
    pub stats: Stats,

    /// vertices closer than this are merged
    pub(crate) tolerance: Float,
    pub(crate) vertex_grid: VertexGrid,
}

impl<'a> Context<'a> {
    pub fn new(sites: &'a Sites, tolerance: Float) -> Result<Self, Error> {
        let mut dcel = Dcel::with_capacity(sites.len());
        for (site, _) in sites.iter() {
            dcel.create_face(site);
        }

        Ok(Self {
            sites,
            beach_line: BeachLine::with_capacity(sites.len()),
            // at most n sites plus one circle event per arc, 2n - 1 arcs
            queue: EventQueue::try_with_capacity(3 * sites.len() + 1)?,
            dcel,
            sweep_y: Float::INFINITY,
            stats: Stats::default(),
            tolerance,
            vertex_grid: VertexGrid::new(tolerance),
        })
    }

    /// Faces are created in site order
    pub fn face(&self, site: SiteId) -> FaceId {
        FaceId::from_index(site.as_usize())
    }
}

/// Vertices bucketed by position, cells at least `tolerance` wide so a
/// lookup only visits the 3x3 cells around the query.
#[derive(Debug, Default)]
pub(crate) struct VertexGrid {
    tolerance: Float,
    cell: Float,
    buckets: HashMap<(i64, i64), Vec<VertexId>>,
}

impl VertexGrid {
    pub fn new(tolerance: Float) -> Self {
        Self {
            tolerance,
            cell: tolerance.max(Float::EPSILON),
            buckets: HashMap::new(),
        }
    }

    fn key(&self, p: Point) -> (i64, i64) {
        // saturating casts, far away points share the border cells
        ((p.x / self.cell).floor() as i64, (p.y / self.cell).floor() as i64)
    }

    /// A vertex of `dcel` within tolerance of `p`
    pub fn find(&self, p: Point, dcel: &Dcel) -> Option<VertexId> {
        let (kx, ky) = self.key(p);
        for dx in -1..=1 {
            for dy in -1..=1 {
                let key = (kx.saturating_add(dx), ky.saturating_add(dy));
                let Some(bucket) = self.buckets.get(&key) else {
                    continue;
                };
                let found = bucket.iter().copied().find(|v| {
                    dcel.position(*v)
                        .is_some_and(|q| q.close_to(&p, self.tolerance))
                });
                if found.is_some() {
                    return found;
                }
            }
        }
        None
    }

    pub fn insert(&mut self, p: Point, vertex: VertexId) {
        let key = self.key(p);
        self.buckets.entry(key).or_default().push(vertex);
    }
}
