use crate::Float;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: Float,
    pub y: Float,
}

impl Default for Point {
    fn default() -> Self {
        Self { x: 0., y: 0. }
    }
}

impl Point {
    pub fn new(x: Float, y: Float) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn distance_squared(&self, other: &Self) -> Float {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn distance(&self, other: &Self) -> Float {
        self.distance_squared(other).sqrt()
    }

    /// `self + t * direction`
    pub fn offset(&self, direction: Point, t: Float) -> Point {
        Point::new(self.x + t * direction.x, self.y + t * direction.y)
    }

    /// whether both coordinates are within `epsilon`
    pub fn close_to(&self, other: &Self, epsilon: Float) -> bool {
        (self.x - other.x).abs() <= epsilon && (self.y - other.y).abs() <= epsilon
    }
}

/// One Voronoi edge, as seen from the outside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Edge {
    /// both ends are Voronoi vertices
    Segment { a: Point, b: Point },
    /// starts at a vertex and runs to infinity along `direction`
    Ray { origin: Point, direction: Point },
    /// no vertex at all, two sites sharing the whole bisector
    Line { point: Point, direction: Point },
}

impl Edge {
    pub fn is_bounded(&self) -> bool {
        matches!(self, Edge::Segment { .. })
    }
}

/// Axis aligned box, `min` is the lower left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point,
    pub max: Point,
}

impl BoundingBox {
    /// Create from two opposite corners, in any order
    pub fn new(a: Point, b: Point) -> Self {
        Self {
            min: Point::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Smallest box holding all `points`, `None` for no points
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        Some(iter.fold(Self::new(first, first), |bbox, p| Self {
            min: Point::new(bbox.min.x.min(p.x), bbox.min.y.min(p.y)),
            max: Point::new(bbox.max.x.max(p.x), bbox.max.y.max(p.y)),
        }))
    }

    pub fn width(&self) -> Float {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> Float {
        self.max.y - self.min.y
    }

    pub fn contains(&self, p: &Point) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Grow every side by `margin`
    pub fn expand(&self, margin: Float) -> Self {
        Self {
            min: Point::new(self.min.x - margin, self.min.y - margin),
            max: Point::new(self.max.x + margin, self.max.y + margin),
        }
    }

    /// Clip `edge` against the box (Liang-Barsky). `None` when nothing of the
    /// edge lies inside.
    pub fn clip(&self, edge: &Edge) -> Option<[Point; 2]> {
        let (origin, direction, mut t0, mut t1) = match *edge {
            Edge::Segment { a, b } => (a, Point::new(b.x - a.x, b.y - a.y), 0., 1.),
            Edge::Ray { origin, direction } => (origin, direction, 0., Float::INFINITY),
            Edge::Line { point, direction } => {
                (point, direction, Float::NEG_INFINITY, Float::INFINITY)
            }
        };

        for (p, q) in [
            (-direction.x, origin.x - self.min.x),
            (direction.x, self.max.x - origin.x),
            (-direction.y, origin.y - self.min.y),
            (direction.y, self.max.y - origin.y),
        ] {
            if p == 0. {
                // parallel to this side
                if q < 0. {
                    return None;
                }
                continue;
            }
            let r = q / p;
            if p < 0. {
                t0 = Float::max(t0, r);
            } else {
                t1 = Float::min(t1, r);
            }
            if t0 > t1 {
                return None;
            }
        }

        if !t0.is_finite() || !t1.is_finite() {
            // zero direction on an unbounded edge
            return None;
        }
        Some([origin.offset(direction, t0), origin.offset(direction, t1)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> BoundingBox {
        BoundingBox::new(Point::new(0., 0.), Point::new(10., 10.))
    }

    #[test]
    fn test_bounding_box() {
        let bbox = BoundingBox::from_points(&[
            Point::new(3., -1.),
            Point::new(-2., 4.),
            Point::new(1., 1.),
        ])
        .unwrap();
        assert_eq!(bbox.min, Point::new(-2., -1.));
        assert_eq!(bbox.max, Point::new(3., 4.));
        assert_eq!(bbox.width(), 5.);
        assert!(bbox.contains(&Point::new(0., 0.)));
        assert!(!bbox.contains(&Point::new(0., 4.5)));
        assert!(bbox.expand(1.).contains(&Point::new(0., 4.5)));

        assert!(BoundingBox::from_points(&[]).is_none());
    }

    #[test]
    fn test_clip_segment() {
        let bbox = unit_box();
        let inside = Edge::Segment {
            a: Point::new(1., 1.),
            b: Point::new(2., 3.),
        };
        assert_eq!(
            bbox.clip(&inside),
            Some([Point::new(1., 1.), Point::new(2., 3.)])
        );

        let crossing = Edge::Segment {
            a: Point::new(-5., 5.),
            b: Point::new(15., 5.),
        };
        assert_eq!(
            bbox.clip(&crossing),
            Some([Point::new(0., 5.), Point::new(10., 5.)])
        );

        let outside = Edge::Segment {
            a: Point::new(-5., -5.),
            b: Point::new(-1., 20.),
        };
        assert_eq!(bbox.clip(&outside), None);
    }

    #[test]
    fn test_clip_ray_and_line() {
        let bbox = unit_box();
        let ray = Edge::Ray {
            origin: Point::new(5., 5.),
            direction: Point::new(0., -2.),
        };
        assert_eq!(
            bbox.clip(&ray),
            Some([Point::new(5., 5.), Point::new(5., 0.)])
        );

        let away = Edge::Ray {
            origin: Point::new(5., 20.),
            direction: Point::new(0., 1.),
        };
        assert_eq!(bbox.clip(&away), None);

        let line = Edge::Line {
            point: Point::new(5., 20.),
            direction: Point::new(0., 1.),
        };
        assert_eq!(
            bbox.clip(&line),
            Some([Point::new(5., 0.), Point::new(5., 10.)])
        );

        let parallel_outside = Edge::Line {
            point: Point::new(-1., 0.),
            direction: Point::new(0., 1.),
        };
        assert_eq!(bbox.clip(&parallel_outside), None);
    }
}
