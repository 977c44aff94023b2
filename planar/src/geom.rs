use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// A point in the plane.
///
/// Points are compared (see [`Point::sweep_key`]) by `y` and then by `x`.
#[derive(Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    /// The horizontal coordinate (longitude, for geographic data).
    pub x: f64,
    /// The vertical coordinate (latitude, for geographic data).
    pub y: f64,
}

impl std::fmt::Debug for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:?}, {:?})", self.x, self.y)
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Point { x, y }
    }
}

impl From<Point> for [f64; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point { x, y }
    }
}

/// A totally ordered key for a point, sorting by `y` and then by `x`.
pub type SweepKey = (OrderedFloat<f64>, OrderedFloat<f64>);

impl Point {
    /// Creates a new point.
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    /// The sweep-line order of this point: by `y`, then by `x`.
    pub fn sweep_key(&self) -> SweepKey {
        (OrderedFloat(self.y), OrderedFloat(self.x))
    }

    /// Returns true if this point sorts strictly before `other` in sweep-line order.
    pub fn sweep_lt(&self, other: &Point) -> bool {
        self.sweep_key() < other.sweep_key()
    }

    /// Are both coordinates finite?
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// The point `(1 - t) * self + t * other`.
    pub fn affine(&self, other: &Self, t: f64) -> Self {
        Point {
            x: (1.0 - t) * self.x + t * other.x,
            y: (1.0 - t) * self.y + t * other.y,
        }
    }

    /// The Euclidean distance between two points.
    pub fn distance(&self, other: &Point) -> f64 {
        (*other - *self).length()
    }
}

impl std::ops::Sub for Point {
    type Output = Vector;

    fn sub(self, rhs: Self) -> Self::Output {
        Vector {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl std::ops::Add<Vector> for Point {
    type Output = Point;

    fn add(self, rhs: Vector) -> Self::Output {
        Point {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

/// A displacement between two points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vector {
    /// Horizontal component.
    pub x: f64,
    /// Vertical component.
    pub y: f64,
}

impl Vector {
    /// The z component of the cross product.
    pub fn cross(&self, other: Vector) -> f64 {
        self.x * other.y - self.y * other.x
    }

    /// The dot product.
    pub fn dot(&self, other: Vector) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// The Euclidean length.
    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// This vector, multiplied by `s`.
    pub fn scale(&self, s: f64) -> Vector {
        Vector {
            x: self.x * s,
            y: self.y * s,
        }
    }

    /// This vector rotated a quarter turn clockwise.
    pub fn perp_right(&self) -> Vector {
        Vector {
            x: self.y,
            y: -self.x,
        }
    }

    /// The unit vector in the same direction, or `None` for the zero vector.
    pub fn normalized(&self) -> Option<Vector> {
        let len = self.length();
        (len > 0.0 && len.is_finite()).then(|| self.scale(1.0 / len))
    }
}

/// The orientation of the triangle `a`, `b`, `c`.
///
/// Positive if the points are in counter-clockwise order, negative if
/// clockwise, and exactly zero if they are collinear. The sign is computed
/// with adaptive-precision arithmetic, so it is always correct.
pub fn orient(a: &Point, b: &Point, c: &Point) -> f64 {
    robust::orient2d(
        robust::Coord { x: a.x, y: a.y },
        robust::Coord { x: b.x, y: b.y },
        robust::Coord { x: c.x, y: c.y },
    )
}

/// The point on the segment `a -- b` closest to `p`.
pub fn project_onto_segment(p: &Point, a: &Point, b: &Point) -> Point {
    let ab = *b - *a;
    let len2 = ab.dot(ab);
    if len2 == 0.0 {
        return *a;
    }
    let t = ((*p - *a).dot(ab) / len2).clamp(0.0, 1.0);
    a.affine(b, t)
}

/// The distance from `p` to the segment `a -- b`.
pub fn segment_distance(p: &Point, a: &Point, b: &Point) -> f64 {
    p.distance(&project_onto_segment(p, a, b))
}

/// The distance from `p` to an open polyline.
///
/// Returns infinity for an empty polyline.
pub fn polyline_distance(p: &Point, line: &[Point]) -> f64 {
    match line {
        [] => f64::INFINITY,
        [q] => p.distance(q),
        _ => line
            .windows(2)
            .map(|w| segment_distance(p, &w[0], &w[1]))
            .fold(f64::INFINITY, f64::min),
    }
}

/// A line segment.
///
/// The start point is always strictly less than the end point, in sweep-line
/// order. This is the right representation for the arrangement, but it's a
/// little clunky for other things because we need to keep track of the
/// original orientation.
#[derive(Clone, Copy, PartialEq)]
pub struct Segment {
    /// The smaller endpoint, in sweep-line order.
    pub start: Point,
    /// The larger endpoint, in sweep-line order.
    pub end: Point,
}

impl std::fmt::Debug for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} -- {:?}", self.start, self.end)
    }
}

/// How two segments meet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SegmentIntersection {
    /// They don't.
    None,
    /// In a single point.
    Point(Point),
    /// They're collinear and share the sub-segment between these two points
    /// (in sweep-line order).
    Overlap(Point, Point),
}

impl Segment {
    /// Creates a segment between two points, putting them in sweep-line order.
    pub fn new(a: Point, b: Point) -> Self {
        if b.sweep_lt(&a) {
            Segment { start: b, end: a }
        } else {
            Segment { start: a, end: b }
        }
    }

    /// The smallest `x` coordinate of the segment.
    pub fn min_x(&self) -> f64 {
        self.start.x.min(self.end.x)
    }

    /// The largest `x` coordinate of the segment.
    pub fn max_x(&self) -> f64 {
        self.start.x.max(self.end.x)
    }

    /// Does `p` lie on this segment (endpoints included)?
    pub fn contains(&self, p: &Point) -> bool {
        orient(&self.start, &self.end, p) == 0.0
            && !p.sweep_lt(&self.start)
            && !self.end.sweep_lt(p)
    }

    /// Where along this segment `p` falls, as a fraction of the way from
    /// `start` to `end`. Only meaningful for points on (or near) the segment.
    pub fn parameter(&self, p: &Point) -> f64 {
        let d = self.end - self.start;
        let len2 = d.dot(d);
        if len2 == 0.0 {
            0.0
        } else {
            (*p - self.start).dot(d) / len2
        }
    }

    /// Computes the intersection between this segment and another.
    ///
    /// All the classification is done with exact orientation predicates, so
    /// this never misses an intersection or invents one. When an endpoint of
    /// one segment lies on the other, that endpoint is returned exactly; only
    /// proper crossings require computing a new (rounded) point.
    pub fn intersect(&self, other: &Segment) -> SegmentIntersection {
        if self.end.y < other.start.y
            || other.end.y < self.start.y
            || self.max_x() < other.min_x()
            || other.max_x() < self.min_x()
        {
            return SegmentIntersection::None;
        }

        if self.start == self.end {
            return if other.contains(&self.start) {
                SegmentIntersection::Point(self.start)
            } else {
                SegmentIntersection::None
            };
        }
        if other.start == other.end {
            return if self.contains(&other.start) {
                SegmentIntersection::Point(other.start)
            } else {
                SegmentIntersection::None
            };
        }

        let (p, q, r, s) = (&self.start, &self.end, &other.start, &other.end);
        let o1 = orient(p, q, r);
        let o2 = orient(p, q, s);
        let o3 = orient(r, s, p);
        let o4 = orient(r, s, q);

        if o1 == 0.0 && o2 == 0.0 {
            // Collinear. Sweep-line order is monotone along any line, so the
            // overlap is just the larger start up to the smaller end.
            let lo = if p.sweep_lt(r) { *r } else { *p };
            let hi = if q.sweep_lt(s) { *q } else { *s };
            return if lo.sweep_lt(&hi) {
                SegmentIntersection::Overlap(lo, hi)
            } else if lo == hi {
                SegmentIntersection::Point(lo)
            } else {
                SegmentIntersection::None
            };
        }

        if (o1 > 0.0 && o2 > 0.0)
            || (o1 < 0.0 && o2 < 0.0)
            || (o3 > 0.0 && o4 > 0.0)
            || (o3 < 0.0 && o4 < 0.0)
        {
            return SegmentIntersection::None;
        }

        if o1 == 0.0 {
            return SegmentIntersection::Point(*r);
        }
        if o2 == 0.0 {
            return SegmentIntersection::Point(*s);
        }
        if o3 == 0.0 {
            return SegmentIntersection::Point(*p);
        }
        if o4 == 0.0 {
            return SegmentIntersection::Point(*q);
        }

        // A proper crossing.
        let d = *q - *p;
        let e = *s - *r;
        let t = (*r - *p).cross(e) / d.cross(e);
        let x = p.affine(q, t.clamp(0.0, 1.0));
        // Rounding can push the point slightly outside the segments; pull it
        // back into the box that both of them share.
        let x = Point {
            x: x.x.clamp(
                self.min_x().max(other.min_x()),
                self.max_x().min(other.max_x()),
            ),
            y: x.y.clamp(self.start.y.max(other.start.y), self.end.y.min(other.end.y)),
        };
        SegmentIntersection::Point(x)
    }

    /// Do the interiors of these segments cross at a single point, with each
    /// segment having points strictly on both sides of the other?
    #[cfg(test)]
    pub fn crosses_properly(&self, other: &Segment) -> bool {
        let o1 = orient(&self.start, &self.end, &other.start);
        let o2 = orient(&self.start, &self.end, &other.end);
        let o3 = orient(&other.start, &other.end, &self.start);
        let o4 = orient(&other.start, &other.end, &self.end);
        o1 * o2 < 0.0 && o3 * o4 < 0.0
    }
}
