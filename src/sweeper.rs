use log::{debug, trace};

use crate::{
    avl::NodeId,
    beach_line::Breakpoint,
    context::Context,
    dcel::VertexId,
    diagram::Diagram,
    events::{CircleEvent, Event},
    points::{SiteId, Sites},
    queue::QueueHandle,
    shape::{BoundingBox, Point},
    utils::{circumcircle, orient_2d},
    Error, Float, DEFAULT_EPSILON,
};

/// Observer for the sweep, used to monitor how it works. Quite useful for
/// visual debugging when things go wrong, check the draw demo.
#[allow(unused_variables)]
pub trait Observer {
    /// A site event processed
    fn site_event(&mut self, site: SiteId, context: &Context) {}

    /// A circle event processed, the arc vanished at `vertex`
    fn circle_event(&mut self, event: &CircleEvent, vertex: VertexId, context: &Context) {}

    /// A circle event dequeued after its arc left the beach line
    fn stale_event(&mut self, event: &CircleEvent, context: &Context) {}

    #[inline]
    fn circle_scheduled(&mut self, event: &CircleEvent, context: &Context) {}

    /// A pending circle event deleted from the queue
    #[inline]
    fn circle_cancelled(&mut self, event: &CircleEvent, context: &Context) {}

    /// Sweep process done, only unbounded edges are left on the beach line
    fn sweep_done(&mut self, context: &Context) {}
}

/// Default dummy observer, blank impl, so all calls should be optimized out by compiler.
impl Observer for () {}

/// Voronoi Builder
///
/// # Example
/// ```rust
///    use fortune_rs::{Builder, Point};
///
///    let voronoi = Builder::new(vec![
///        Point::new(0., 0.),
///        Point::new(10., 0.),
///        Point::new(5., 8.),
///    ])
///    .add_site(Point::new(5., -8.))
///    .build()
///    .unwrap();
///    let diagram = voronoi.compute().unwrap();
///    assert_eq!(diagram.vertex_len(), 2);
/// ```
#[derive(Clone)]
pub struct Builder {
    points: Vec<Point>,
    epsilon: Float,
}

impl Builder {
    pub fn new(points: Vec<Point>) -> Self {
        Self {
            points,
            epsilon: DEFAULT_EPSILON,
        }
    }

    /// Add a single site
    pub fn add_site(mut self, point: Point) -> Self {
        self.points.push(point);
        self
    }

    /// Add multiple sites, batch version for `Self::add_site`
    pub fn add_sites(mut self, points: impl IntoIterator<Item = Point>) -> Self {
        self.points.extend(points);
        self
    }

    /// Relative tolerance for merging Voronoi vertices that land on the same
    /// spot, e.g. the centre of four cocircular sites. It is scaled by the
    /// extent of the input.
    pub fn epsilon(mut self, epsilon: Float) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Validate the sites, merge duplicates and build the [`Voronoi`]
    pub fn build(self) -> Result<Voronoi, Error> {
        let sites = Sites::new(self.points)?;
        Ok(Voronoi {
            sites,
            epsilon: self.epsilon,
        })
    }
}

/// Main interface, user should grab a new Voronoi by [`Builder::build`]
#[derive(Clone)]
pub struct Voronoi {
    sites: Sites,
    epsilon: Float,
}

impl Voronoi {
    pub fn sites(&self) -> &Sites {
        &self.sites
    }

    /// Run the sweep with dummy observer
    pub fn compute(self) -> Result<Diagram, Error> {
        self.compute_with_observer(&mut ())
    }

    /// Run the sweep with observer
    pub fn compute_with_observer(self, observer: &mut impl Observer) -> Result<Diagram, Error> {
        let tolerance = self.tolerance();
        let mut context = Context::new(&self.sites, tolerance)?;

        Self::sweep(&mut context, observer)?;
        observer.sweep_done(&context);

        let Context {
            mut dcel, stats, ..
        } = context;
        dcel.compact();
        debug_assert!(dcel.verify());
        debug!(
            "sweep done, {} sites, {} vertices, {} half-edges, {:?}",
            self.sites.len(),
            dcel.vertex_len(),
            dcel.half_edge_len(),
            stats
        );

        Ok(Diagram::new(self.sites, dcel, stats))
    }

    fn tolerance(&self) -> Float {
        let extent = BoundingBox::from_points(self.sites.iter().map(|(_, p)| p))
            .map_or(0., |bbox| bbox.width().max(bbox.height()));
        self.epsilon * extent.max(1.)
    }

    fn sweep(context: &mut Context, observer: &mut impl Observer) -> Result<(), Error> {
        let sites = context.sites;
        for (site, point) in sites.iter() {
            context.queue.push(Event::Site {
                site,
                point: *point,
            })?;
        }

        while let Some(event) = context.queue.pop() {
            context.sweep_y = context.sweep_y.min(event.y());
            match event {
                Event::Site { site, point } => {
                    Self::site_event(site, point, context, observer)?;
                    observer.site_event(site, context);
                }
                Event::Circle(circle) => match Self::circle_event(&circle, context, observer)? {
                    Some(vertex) => observer.circle_event(&circle, vertex, context),
                    None => observer.stale_event(&circle, context),
                },
            }

            debug_assert!(context.queue.verify());
            debug_assert!(context
                .beach_line
                .verify(context.sites, context.sweep_y, Float::INFINITY));
        }
        Ok(())
    }
}

/// Site event related methods
impl Voronoi {
    fn site_event(
        site: SiteId,
        point: Point,
        context: &mut Context,
        observer: &mut impl Observer,
    ) -> Result<(), Error> {
        debug!("site event {} at ({}, {})", site.as_u32(), point.x, point.y);
        context.stats.site_events += 1;

        let Some((arc, above)) = context.beach_line.locate_arc(point, context.sites) else {
            context.beach_line.init(site);
            return Ok(());
        };
        let face = context.face(site);
        let above_face = context.face(above.site);
        Self::clear_circle(arc, context, observer);

        if context.sites.point(above.site).y == point.y {
            // the arc above has no parabola yet, which only happens while
            // the topmost row comes in left to right
            let (edge, _) = context.dcel.create_half_edge_pair(face, above_face);
            if let Some((left, _)) = context.beach_line.append(arc, site, edge) {
                Self::check_circle(left, context, observer)?;
            }
            return Ok(());
        }

        // one new edge, traced in both directions: (above, site) keeps the
        // half with the new face on its left, (site, above) its twin
        let (left_edge, right_edge) = context.dcel.create_half_edge_pair(face, above_face);
        if let Some(split) = context
            .beach_line
            .split(arc, site, left_edge, right_edge)
        {
            Self::check_circle(split.left, context, observer)?;
            Self::check_circle(split.right, context, observer)?;
        }
        Ok(())
    }

    /// Schedule the circle event of `arc`, when its two breakpoints converge.
    fn check_circle(
        arc: NodeId,
        context: &mut Context,
        observer: &mut impl Observer,
    ) -> Result<(), Error> {
        let Some(hood) = context.beach_line.neighborhood(arc) else {
            return Ok(());
        };
        let site_of = |id| context.beach_line.arc(id).map(|a| a.site);
        let (Some(a), Some(b), Some(c)) = (site_of(hood.left_arc), site_of(arc), site_of(hood.right_arc))
        else {
            return Ok(());
        };
        if a == c {
            return Ok(());
        }

        let (pa, pb, pc) = (
            context.sites.point(a),
            context.sites.point(b),
            context.sites.point(c),
        );
        // breakpoints converge on a clockwise turn, collinear sites never do
        if !orient_2d(pa, pb, pc).is_cw() {
            return Ok(());
        }
        let Some((center, radius)) = circumcircle(pa, pb, pc) else {
            return Ok(());
        };
        let Some(generation) = context.beach_line.generation(arc) else {
            return Ok(());
        };

        let event = CircleEvent::new(center, radius, context.sweep_y, arc, generation);

        Self::clear_circle(arc, context, observer);
        let handle = context.queue.push(Event::Circle(event))?;
        if let Some(arc) = context.beach_line.arc_mut(arc) {
            arc.circle = Some(handle);
        }
        trace!(
            "circle scheduled for site {} at y {}, center ({}, {})",
            b.as_u32(),
            event.lowest.y,
            center.x,
            center.y
        );
        observer.circle_scheduled(&event, context);
        Ok(())
    }

    /// Delete the pending circle event of `arc`, if any
    fn clear_circle(arc: NodeId, context: &mut Context, observer: &mut impl Observer) {
        let handle: Option<QueueHandle> = context
            .beach_line
            .arc_mut(arc)
            .and_then(|arc| arc.circle.take());
        let Some(handle) = handle else {
            return;
        };

        if let Some(Event::Circle(event)) = context.queue.cancel(handle) {
            context.stats.cancelled_events += 1;
            trace!(
                "circle cancelled at y {}, center ({}, {})",
                event.lowest.y,
                event.center.x,
                event.center.y
            );
            observer.circle_cancelled(&event, context);
        }
    }
}

/// Circle event related methods
impl Voronoi {
    /// Returns the vertex the arc vanished at, `None` for a stale event.
    fn circle_event(
        event: &CircleEvent,
        context: &mut Context,
        observer: &mut impl Observer,
    ) -> Result<Option<VertexId>, Error> {
        let arc = event.arc;
        let hood = match context.beach_line.is_current_arc(arc, event.generation) {
            true => context.beach_line.neighborhood(arc),
            false => None,
        };
        let Some(hood) = hood else {
            context.stats.stale_events += 1;
            trace!("stale circle event at y {}", event.lowest.y);
            return Ok(None);
        };

        let beach_line = &context.beach_line;
        let (Some(left_arc), Some(middle), Some(right_arc), Some(left_bp), Some(right_bp)) = (
            beach_line.arc(hood.left_arc).copied(),
            beach_line.arc(arc).copied(),
            beach_line.arc(hood.right_arc).copied(),
            beach_line.breakpoint(hood.left_breakpoint).copied(),
            beach_line.breakpoint(hood.right_breakpoint).copied(),
        ) else {
            context.stats.stale_events += 1;
            return Ok(None);
        };

        context.stats.circle_events += 1;
        debug!(
            "circle event, arc of site {} vanishes at ({}, {})",
            middle.site.as_u32(),
            event.center.x,
            event.center.y
        );

        // the event fired, its handle is gone from the queue
        if let Some(arc) = context.beach_line.arc_mut(arc) {
            arc.circle = None;
        }
        Self::clear_circle(hood.left_arc, context, observer);
        Self::clear_circle(hood.right_arc, context, observer);

        let vertex = Self::place_vertex(event.center, context);

        let left_face = context.face(left_arc.site);
        let right_face = context.face(right_arc.site);
        let dcel = &mut context.dcel;
        let left_twin = dcel.twin_unchecked(left_bp.edge);
        let right_twin = dcel.twin_unchecked(right_bp.edge);
        let (merged_edge, merged_twin) = dcel.create_half_edge_pair(right_face, left_face);

        dcel.set_origin(left_twin, vertex);
        dcel.set_origin(right_twin, vertex);
        dcel.set_origin(merged_edge, vertex);

        // the vanished face, then the left face, then the right face
        dcel.link(left_bp.edge, right_twin);
        dcel.link(merged_twin, left_twin);
        dcel.link(right_bp.edge, merged_edge);

        context.beach_line.remove_arc(
            arc,
            Breakpoint {
                left: left_arc.site,
                right: right_arc.site,
                edge: merged_edge,
            },
        );

        // an edge born at the reused vertex has no length, both may be
        for edge in [left_bp.edge, right_bp.edge] {
            if context.dcel.origin(edge) == Some(vertex) {
                context.dcel.excise_pair(edge);
            }
        }

        Self::check_circle(hood.left_arc, context, observer)?;
        Self::check_circle(hood.right_arc, context, observer)?;
        Ok(Some(vertex))
    }

    /// A vertex at `center`, reusing any vertex already within tolerance.
    /// Several arcs vanishing at one centre, not necessarily next to each
    /// other, then share it.
    fn place_vertex(center: Point, context: &mut Context) -> VertexId {
        match context.vertex_grid.find(center, &context.dcel) {
            Some(vertex) => {
                context.stats.merged_vertices += 1;
                debug!("vertex {} reused for ({}, {})", vertex.as_usize(), center.x, center.y);
                vertex
            }
            None => {
                let vertex = context.dcel.create_vertex(center);
                context.vertex_grid.insert(center, vertex);
                vertex
            }
        }
    }
}
