use std::cmp::Ordering;

use crate::{
    avl::NodeId,
    order::Comparator,
    points::{sweep_order, SiteId},
    queue::{IndexedQueue, QueueHandle},
    shape::Point,
    Error, Float,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    /// the sweep reaches a site
    Site { site: SiteId, point: Point },
    /// an arc shrinks to nothing
    Circle(CircleEvent),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleEvent {
    /// the Voronoi vertex
    pub center: Point,
    /// lowest point of the circle, where the sweep fires the event
    pub lowest: Point,
    /// the disappearing arc
    pub arc: NodeId,
    /// generation of `arc` when the event was scheduled
    pub generation: u32,
}

impl CircleEvent {
    /// Event for the circle around `center`, due at its lowest point. Rounding
    /// may put that a hair above the sweep line, so it is clamped to `sweep_y`.
    pub fn new(center: Point, radius: Float, sweep_y: Float, arc: NodeId, generation: u32) -> Self {
        // `+ 0.` turns a negative zero into zero, `total_cmp` orders them apart
        let lowest = Point::new(center.x + 0., (center.y - radius).min(sweep_y) + 0.);
        Self {
            center,
            lowest,
            arc,
            generation,
        }
    }
}

impl Event {
    /// Point at which the sweep processes the event
    pub fn point(&self) -> Point {
        match self {
            Event::Site { point, .. } => *point,
            Event::Circle(circle) => circle.lowest,
        }
    }

    /// sweep coordinate
    pub fn y(&self) -> Float {
        self.point().y
    }

    pub fn is_circle(&self) -> bool {
        matches!(self, Event::Circle(_))
    }
}

#[derive(Debug, Clone, Copy)]
struct Queued {
    event: Event,
    /// enqueue order, the last tie-break
    seq: u64,
}

/// Event priority: higher y first, then smaller x, then circle before
/// site, then first in first out.
#[derive(Debug, Default, Clone, Copy)]
struct EventOrder;

impl Comparator<Queued> for EventOrder {
    fn compare(&self, a: &Queued, b: &Queued) -> Ordering {
        // sweep_order is Less for the earlier point, the queue wants Greater
        sweep_order(&b.event.point(), &a.event.point())
            .then_with(|| a.event.is_circle().cmp(&b.event.is_circle()))
            .then_with(|| b.seq.cmp(&a.seq))
    }
}

/// Event queue of one sweep.
pub struct EventQueue {
    queue: IndexedQueue<Queued, EventOrder>,
    next_seq: u64,
}

impl EventQueue {
    pub fn try_with_capacity(capacity: usize) -> Result<Self, Error> {
        Ok(Self {
            queue: IndexedQueue::try_new(capacity, EventOrder)?,
            next_seq: 0,
        })
    }

    pub fn push(&mut self, event: Event) -> Result<QueueHandle, Error> {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue
            .enqueue(Queued { event, seq })
            .ok_or(Error::EventQueueExhausted {
                capacity: self.queue.capacity(),
            })
    }

    pub fn pop(&mut self) -> Option<Event> {
        self.queue.dequeue().map(|q| q.event)
    }

    /// Delete a scheduled event, `None` when it already left the queue
    pub fn cancel(&mut self, handle: QueueHandle) -> Option<Event> {
        self.queue.remove(handle).map(|q| q.event)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }

    /// pending events, in heap order
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.queue.iter().map(|q| &q.event)
    }

    pub fn verify(&self) -> bool {
        self.queue.verify()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(id: u32, x: Float, y: Float) -> Event {
        Event::Site {
            site: SiteId(id),
            point: Point::new(x, y),
        }
    }

    fn circle(x: Float, y: Float) -> Event {
        Event::Circle(CircleEvent {
            center: Point::new(x, y + 1.),
            lowest: Point::new(x, y),
            arc: NodeId::INVALID,
            generation: 0,
        })
    }

    fn drain(queue: &mut EventQueue) -> Vec<Event> {
        std::iter::from_fn(|| queue.pop()).collect()
    }

    #[test]
    fn test_higher_y_first() {
        let mut queue = EventQueue::try_with_capacity(8).unwrap();
        queue.push(site(0, 0., 1.)).unwrap();
        queue.push(circle(5., 3.)).unwrap();
        queue.push(site(1, 0., 2.)).unwrap();

        let ys = drain(&mut queue).iter().map(Event::y).collect::<Vec<_>>();
        assert_eq!(ys, vec![3., 2., 1.]);
    }

    #[test]
    fn test_ties() {
        let mut queue = EventQueue::try_with_capacity(8).unwrap();
        queue.push(site(0, 1., 0.)).unwrap();
        queue.push(site(1, 0., 0.)).unwrap();
        queue.push(circle(0., 0.)).unwrap();
        queue.push(circle(0., 0.)).unwrap();
        let circles = queue.iter().filter(|e| e.is_circle()).count();
        assert_eq!(circles, 2);

        let events = drain(&mut queue);
        assert!(events[0].is_circle() && events[1].is_circle());
        assert_eq!(events[2], site(1, 0., 0.));
        assert_eq!(events[3], site(0, 1., 0.));
    }

    #[test]
    fn test_fifo_on_full_tie() {
        let mut queue = EventQueue::try_with_capacity(8).unwrap();
        let mut pushed = vec![];
        for generation in 0..5 {
            let event = Event::Circle(CircleEvent {
                center: Point::new(0., 1.),
                lowest: Point::new(0., 0.),
                arc: NodeId::INVALID,
                generation,
            });
            queue.push(event).unwrap();
            pushed.push(event);
        }
        assert_eq!(drain(&mut queue), pushed);
    }

    #[test]
    fn test_circle_at_negative_zero() {
        let event = CircleEvent::new(Point::new(-0., 0.5), 0.5, -0., NodeId::INVALID, 0);
        assert!(event.lowest.x.is_sign_positive());
        assert!(event.lowest.y.is_sign_positive());

        let event = CircleEvent::new(Point::new(0., 1.), 1., 5., NodeId::INVALID, 0);
        assert_eq!(event.lowest, Point::new(0., 0.));
        let event = CircleEvent::new(Point::new(0., 1.), 0.5, 0., NodeId::INVALID, 0);
        assert_eq!(event.lowest, Point::new(0., 0.));

        // a site at the same point still comes after the circle
        let mut queue = EventQueue::try_with_capacity(4).unwrap();
        queue.push(site(0, 0., 0.)).unwrap();
        let circle = Event::Circle(CircleEvent::new(
            Point::new(-0., 1.),
            1.,
            0.,
            NodeId::INVALID,
            0,
        ));
        queue.push(circle).unwrap();
        let events = drain(&mut queue);
        assert!(events[0].is_circle());
        assert_eq!(events[1], site(0, 0., 0.));
    }

    #[test]
    fn test_cancel_and_exhaustion() {
        let mut queue = EventQueue::try_with_capacity(2).unwrap();
        let handle = queue.push(circle(0., 0.)).unwrap();
        queue.push(site(0, 0., 1.)).unwrap();
        assert!(matches!(
            queue.push(site(1, 0., 2.)),
            Err(Error::EventQueueExhausted { capacity: 2 })
        ));

        assert_eq!(queue.cancel(handle), Some(circle(0., 0.)));
        assert_eq!(queue.cancel(handle), None);
        assert!(queue.verify());
        assert_eq!(drain(&mut queue), vec![site(0, 0., 1.)]);
    }
}
