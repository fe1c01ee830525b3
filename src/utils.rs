use crate::{shape::Point, Float};

#[derive(Debug, PartialEq, Eq)]
pub enum Orientation {
    /// Clock Wise
    ///
    ///  a     b
    ///             c
    ///
    CW,
    /// Counter Clock Wise
    ///             c
    ///  a     b
    CCW,
    /// Collinear
    ///  a     b    c
    Collinear,
}

impl Orientation {
    pub fn is_cw(&self) -> bool {
        matches!(self, Self::CW)
    }

    pub fn is_ccw(&self) -> bool {
        matches!(self, Self::CCW)
    }

    pub fn is_collinear(&self) -> bool {
        matches!(self, Self::Collinear)
    }
}

fn coord(p: Point) -> robust::Coord<Float> {
    robust::Coord { x: p.x, y: p.y }
}

/// Exact orientation of `c` relative to the directed line `a -> b`.
pub fn orient_2d(a: Point, b: Point, c: Point) -> Orientation {
    let det = robust::orient2d(coord(a), coord(b), coord(c));
    if det > 0. {
        Orientation::CCW
    } else if det < 0. {
        Orientation::CW
    } else {
        Orientation::Collinear
    }
}

/// Centre and radius of the circle through `a`, `b` and `c`, `None` when
/// they are collinear.
pub fn circumcircle(a: Point, b: Point, c: Point) -> Option<(Point, Float)> {
    if orient_2d(a, b, c).is_collinear() {
        return None;
    }

    // relative to a, keeps the products small
    let (bx, by) = (b.x - a.x, b.y - a.y);
    let (cx, cy) = (c.x - a.x, c.y - a.y);
    let d = 2. * (bx * cy - by * cx);
    if d == 0. {
        return None;
    }
    let b_len = bx * bx + by * by;
    let c_len = cx * cx + cy * cy;
    let ux = (cy * b_len - by * c_len) / d;
    let uy = (bx * c_len - cx * b_len) / d;

    Some((Point::new(a.x + ux, a.y + uy), (ux * ux + uy * uy).sqrt()))
}

/// Height of the parabola with `focus` and horizontal directrix `sweep_y` at `x`.
/// The focus must lie strictly above the directrix.
pub fn parabola_y(focus: Point, sweep_y: Float, x: Float) -> Float {
    let d = focus.y - sweep_y;
    let dx = x - focus.x;
    (dx * dx + d * d) / (2. * d) + sweep_y
}

/// x of the breakpoint with the arc of `left` on its left and the arc of
/// `right` on its right, when the sweep line is at `sweep_y`.
///
/// Both sites must lie on or above the sweep line. A site on the sweep line
/// has a degenerate, vertical arc, and the breakpoint sits at its x.
pub fn breakpoint_x(left: Point, right: Point, sweep_y: Float) -> Float {
    let dl = left.y - sweep_y;
    let dr = right.y - sweep_y;

    if dl <= 0. && dr <= 0. {
        return (left.x + right.x) / 2.;
    }
    if dl <= 0. {
        return left.x;
    }
    if dr <= 0. {
        return right.x;
    }

    // with the origin at (left.x, sweep_y) the crossing solves
    // (dr - dl) u^2 + 2 dl bx u - dl (dr (dr - dl) + bx^2) = 0
    let bx = right.x - left.x;
    let a = dr - dl;
    if a == 0. {
        return (left.x + right.x) / 2.;
    }
    let s = (dl * dr * (bx * bx + a * a)).sqrt();

    // pick the form that does not subtract nearly equal values
    let u = if bx > 0. {
        dl * (bx * bx + dr * a) / (dl * bx + s)
    } else {
        (s - dl * bx) / a
    };
    left.x + u
}

/// Direction of the bisector of `site` and `other`, with `site` on its left.
pub fn bisector_direction(site: Point, other: Point) -> Point {
    Point::new(site.y - other.y, other.x - site.x)
}
