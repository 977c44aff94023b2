//! Rings, polygons, and regions, and the geometric questions we ask of them.

use std::collections::BinaryHeap;

use ordered_float::OrderedFloat;
use serde::Serialize;

use crate::{
    geom::{orient, segment_distance, Point, Segment, SegmentIntersection},
    BooleanOp, Error, FillRule,
};

/// A closed ring of points. The last point connects back to the first, and
/// isn't repeated.
#[derive(Clone, Debug, Default, PartialEq, Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Ring(Vec<Point>);

impl Ring {
    /// Creates a ring, dropping a final point that repeats the first.
    pub fn new(mut points: Vec<Point>) -> Self {
        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        Ring(points)
    }

    /// The points of the ring, without repeating the first one.
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// The number of points.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Does the ring have no points?
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the edges of the ring, including the closing one.
    pub fn edges(&self) -> impl Iterator<Item = (&Point, &Point)> + '_ {
        let n = self.0.len();
        (0..n).map(move |i| (&self.0[i], &self.0[(i + 1) % n]))
    }

    /// The shoelace area: positive for counter-clockwise rings.
    pub fn signed_area(&self) -> f64 {
        self.edges().map(|(p, q)| p.x * q.y - p.y * q.x).sum::<f64>() / 2.0
    }

    /// Reverses the ring's orientation.
    pub fn reverse(&mut self) {
        self.0.reverse();
    }

    /// How many times this ring winds counter-clockwise around `p`.
    ///
    /// Points exactly on the ring get whatever answer the half-open crossing
    /// rule gives them.
    pub fn winding_number(&self, p: &Point) -> i32 {
        let mut w = 0;
        for (a, b) in self.edges() {
            if a.y <= p.y {
                if b.y > p.y && orient(a, b, p) > 0.0 {
                    w += 1;
                }
            } else if b.y <= p.y && orient(a, b, p) < 0.0 {
                w -= 1;
            }
        }
        w
    }

    /// The distance from `p` to the closest point of the ring.
    pub fn distance(&self, p: &Point) -> f64 {
        self.edges()
            .map(|(a, b)| segment_distance(p, a, b))
            .fold(f64::INFINITY, f64::min)
    }
}

impl From<Vec<Point>> for Ring {
    fn from(points: Vec<Point>) -> Self {
        Ring::new(points)
    }
}

/// A polygon with holes.
///
/// Polygons constructed with [`Polygon::new`] have their exterior wound
/// counter-clockwise and their holes wound clockwise, so that every point of
/// the polygon has winding number one.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Polygon {
    /// The outer boundary.
    pub exterior: Ring,
    /// The holes.
    pub interiors: Vec<Ring>,
}

/// A cell in the search for the pole of inaccessibility.
struct Cell {
    center: Point,
    half: f64,
    /// Signed distance from the center to the polygon boundary.
    dist: f64,
    /// An upper bound on the distance for any point in the cell.
    max: f64,
}

impl Cell {
    fn new(center: Point, half: f64, polygon: &Polygon) -> Self {
        let dist = polygon.signed_distance(&center);
        Cell {
            center,
            half,
            dist,
            max: dist + half * std::f64::consts::SQRT_2,
        }
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

impl Eq for Cell {}

impl PartialOrd for Cell {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cell {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        OrderedFloat(self.max).cmp(&OrderedFloat(other.max))
    }
}

/// Points closer than this to a boundary don't count as being strictly inside.
const BOUNDARY_SLOP: f64 = 1e-9;

impl Polygon {
    /// Creates a polygon, fixing up the orientations of its rings.
    pub fn new(mut exterior: Ring, mut interiors: Vec<Ring>) -> Self {
        if exterior.signed_area() < 0.0 {
            exterior.reverse();
        }
        for hole in &mut interiors {
            if hole.signed_area() > 0.0 {
                hole.reverse();
            }
        }
        Polygon {
            exterior,
            interiors,
        }
    }

    /// The exterior followed by the holes.
    pub fn rings(&self) -> impl Iterator<Item = &Ring> + '_ {
        std::iter::once(&self.exterior).chain(&self.interiors)
    }

    /// The area enclosed by the exterior, minus the area of the holes.
    pub fn area(&self) -> f64 {
        self.exterior.signed_area().abs()
            - self
                .interiors
                .iter()
                .map(|r| r.signed_area().abs())
                .sum::<f64>()
    }

    /// Is `p` inside the polygon? Points on the boundary may go either way.
    pub fn contains_point(&self, p: &Point) -> bool {
        self.exterior.winding_number(p) != 0
            && self.interiors.iter().all(|h| h.winding_number(p) == 0)
    }

    /// The distance from `p` to the polygon's boundary.
    pub fn boundary_distance(&self, p: &Point) -> f64 {
        self.rings().map(|r| r.distance(p)).fold(f64::INFINITY, f64::min)
    }

    /// Is `p` inside the polygon and not on its boundary?
    pub fn contains_point_strictly(&self, p: &Point) -> bool {
        self.contains_point(p) && self.boundary_distance(p) > BOUNDARY_SLOP
    }

    /// The distance to the boundary, positive inside the polygon and negative outside.
    pub fn signed_distance(&self, p: &Point) -> f64 {
        let d = self.boundary_distance(p);
        if self.contains_point(p) {
            d
        } else {
            -d
        }
    }

    /// Returns `(min, max)` corners of the bounding box, or `None` for an empty polygon.
    pub fn bounding_box(&self) -> Option<(Point, Point)> {
        let pts = self.exterior.points();
        let first = pts.first()?;
        Some(pts.iter().fold((*first, *first), |(lo, hi), p| {
            (
                Point::new(lo.x.min(p.x), lo.y.min(p.y)),
                Point::new(hi.x.max(p.x), hi.y.max(p.y)),
            )
        }))
    }

    /// Does some part of the open polyline `line` pass through the interior of this polygon?
    ///
    /// Touching the boundary, or running along it, doesn't count.
    pub fn meets_interior(&self, line: &[Point]) -> bool {
        for w in line.windows(2) {
            let seg = Segment::new(w[0], w[1]);
            let mut ts = vec![0.0, 1.0];
            for (a, b) in self.rings().flat_map(|r| r.edges()) {
                match seg.intersect(&Segment::new(*a, *b)) {
                    SegmentIntersection::None => {}
                    SegmentIntersection::Point(p) => ts.push(seg.parameter(&p)),
                    SegmentIntersection::Overlap(p, q) => {
                        ts.push(seg.parameter(&p));
                        ts.push(seg.parameter(&q));
                    }
                }
            }
            ts.sort_by_key(|t| OrderedFloat(*t));
            ts.dedup();
            // Between consecutive crossings the piece is either entirely inside or entirely outside.
            for t in ts.windows(2) {
                let mid = seg.start.affine(&seg.end, (t[0] + t[1]) / 2.0);
                if self.contains_point_strictly(&mid) {
                    return true;
                }
            }
        }
        false
    }

    /// Finds the pole of inaccessibility: the interior point farthest from the boundary.
    ///
    /// Returns the point and its distance to the boundary (the radius of the
    /// largest inscribed circle), to within `precision`. The distance is zero
    /// for degenerate polygons.
    pub fn pole_of_inaccessibility(&self, precision: f64) -> (Point, f64) {
        let Some((lo, hi)) = self.bounding_box() else {
            return (Point::new(0.0, 0.0), 0.0);
        };
        let size = (hi.x - lo.x).min(hi.y - lo.y);
        if !(size > 0.0) {
            return (lo, 0.0);
        }
        let precision = precision.max(size * 1e-7);

        let mut heap = BinaryHeap::new();
        let half = size / 2.0;
        let mut y = lo.y;
        while y < hi.y {
            let mut x = lo.x;
            while x < hi.x {
                heap.push(Cell::new(Point::new(x + half, y + half), half, self));
                x += size;
            }
            y += size;
        }

        let centroid = self.centroid();
        let bbox_center = lo.affine(&hi, 0.5);
        let mut best = [centroid, bbox_center]
            .into_iter()
            .map(|c| (c, self.signed_distance(&c)))
            .max_by_key(|(_, d)| OrderedFloat(*d))
            .unwrap_or((centroid, f64::NEG_INFINITY));

        while let Some(cell) = heap.pop() {
            if cell.dist > best.1 {
                best = (cell.center, cell.dist);
            }
            if cell.max - best.1 <= precision {
                continue;
            }
            let h = cell.half / 2.0;
            for (dx, dy) in [(-h, -h), (h, -h), (-h, h), (h, h)] {
                let c = Point::new(cell.center.x + dx, cell.center.y + dy);
                heap.push(Cell::new(c, h, self));
            }
        }

        (best.0, best.1.max(0.0))
    }

    /// The area centroid of the exterior ring.
    fn centroid(&self) -> Point {
        let pts = self.exterior.points();
        let mut a = 0.0;
        let (mut cx, mut cy) = (0.0, 0.0);
        for (p, q) in self.exterior.edges() {
            let f = p.x * q.y - q.x * p.y;
            cx += (p.x + q.x) * f;
            cy += (p.y + q.y) * f;
            a += f * 3.0;
        }
        if a == 0.0 {
            pts.first().copied().unwrap_or(Point::new(0.0, 0.0))
        } else {
            Point::new(cx / a, cy / a)
        }
    }

    /// Does this polygon contain `other`, once `other` has been shrunk by `tolerance`?
    ///
    /// Shrinking `other` pulls its boundary in by `tolerance`, so parts of
    /// `other` that stick out of this polygon by less than that don't matter.
    /// If `other` disappears entirely when shrunk, the answer is no.
    pub fn contains_eroded(&self, other: &Polygon, tolerance: f64) -> bool {
        let (pole, radius) = other.pole_of_inaccessibility(tolerance / 10.0);
        if radius <= tolerance || !self.contains_point(&pole) {
            return false;
        }

        let close_enough =
            |p: &Point| self.contains_point(p) || self.boundary_distance(p) <= tolerance;
        other.rings().all(|ring| {
            ring.edges()
                .all(|(p, q)| close_enough(p) && close_enough(&p.affine(q, 0.5)))
        })
    }
}

/// A collection of polygons with disjoint interiors.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Region {
    polygons: Vec<Polygon>,
}

impl From<Polygon> for Region {
    fn from(polygon: Polygon) -> Self {
        Region {
            polygons: vec![polygon],
        }
    }
}

impl From<Vec<Polygon>> for Region {
    fn from(polygons: Vec<Polygon>) -> Self {
        Region { polygons }
    }
}

impl Region {
    /// Assembles a region from a bunch of boundary rings.
    ///
    /// Counter-clockwise rings are exteriors and clockwise rings are holes.
    /// Each hole goes to the smallest exterior that contains it; rings with
    /// zero area are dropped.
    pub fn from_rings(rings: Vec<Ring>) -> Self {
        let (mut exteriors, mut holes): (Vec<_>, Vec<_>) = (Vec::new(), Vec::new());
        for ring in rings {
            let area = ring.signed_area();
            if area > 0.0 {
                exteriors.push((area, ring));
            } else if area < 0.0 {
                holes.push(ring);
            }
        }

        let mut interiors: Vec<Vec<Ring>> = vec![Vec::new(); exteriors.len()];
        for hole in holes {
            let (a, b) = (hole.points()[0], hole.points()[1]);
            let sample = a.affine(&b, 0.5);
            let parent = (0..exteriors.len())
                .filter(|i| exteriors[*i].1.winding_number(&sample) != 0)
                .min_by_key(|i| OrderedFloat(exteriors[*i].0));
            if let Some(i) = parent {
                interiors[i].push(hole);
            }
        }

        Region {
            polygons: exteriors
                .into_iter()
                .zip(interiors)
                .map(|((_, ext), holes)| Polygon::new(ext, holes))
                .collect(),
        }
    }

    /// The polygons making up the region.
    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    /// Consumes the region, returning its polygons.
    pub fn into_polygons(self) -> Vec<Polygon> {
        self.polygons
    }

    /// Does the region have no polygons?
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// The total area of the polygons.
    pub fn area(&self) -> f64 {
        self.polygons.iter().map(Polygon::area).sum()
    }

    /// All the rings of all the polygons.
    pub fn rings(&self) -> impl Iterator<Item = &Ring> + '_ {
        self.polygons.iter().flat_map(Polygon::rings)
    }

    /// Is `p` in any of the polygons?
    pub fn contains_point(&self, p: &Point) -> bool {
        self.polygons.iter().any(|poly| poly.contains_point(p))
    }

    /// The points in both regions, under the non-zero fill rule.
    pub fn intersection(&self, other: &Region) -> Result<Region, Error> {
        crate::boolean_op(self, other, FillRule::NonZero, BooleanOp::Intersection)
    }

    /// The points in either region, under the non-zero fill rule.
    pub fn union(&self, other: &Region) -> Result<Region, Error> {
        crate::boolean_op(self, other, FillRule::NonZero, BooleanOp::Union)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    fn square(x0: f64, y0: f64, size: f64) -> Ring {
        Ring::new(vec![
            p(x0, y0),
            p(x0 + size, y0),
            p(x0 + size, y0 + size),
            p(x0, y0 + size),
        ])
    }

    #[test]
    fn orientation_is_fixed() {
        let mut ext = square(0.0, 0.0, 4.0);
        ext.reverse();
        let poly = Polygon::new(ext, vec![square(1.0, 1.0, 1.0)]);
        assert!(poly.exterior.signed_area() > 0.0);
        assert!(poly.interiors[0].signed_area() < 0.0);
        assert_eq!(poly.area(), 15.0);
    }

    #[test]
    fn containment_respects_holes() {
        let poly = Polygon::new(square(0.0, 0.0, 4.0), vec![square(1.0, 1.0, 1.0)]);
        assert!(poly.contains_point(&p(3.0, 3.0)));
        assert!(!poly.contains_point(&p(1.5, 1.5)));
        assert!(!poly.contains_point(&p(5.0, 1.5)));
    }

    #[test]
    fn closing_point_is_dropped() {
        let ring = Ring::new(vec![p(0.0, 0.0), p(1.0, 0.0), p(0.0, 1.0), p(0.0, 0.0)]);
        assert_eq!(ring.len(), 3);
        assert_eq!(ring.signed_area(), 0.5);
    }

    #[test]
    fn line_through_interior() {
        let poly = Polygon::new(square(0.0, 0.0, 2.0), vec![]);
        assert!(poly.meets_interior(&[p(-1.0, 1.0), p(3.0, 1.0)]));
        assert!(poly.meets_interior(&[p(0.5, 0.5), p(0.6, 0.5)]));
        // Along an edge, and outside.
        assert!(!poly.meets_interior(&[p(0.0, -1.0), p(0.0, 3.0)]));
        assert!(!poly.meets_interior(&[p(3.0, 0.0), p(3.0, 2.0)]));
        // Just touching a corner.
        assert!(!poly.meets_interior(&[p(-1.0, 1.0), p(0.0, 0.0), p(1.0, -1.0)]));
    }

    #[test]
    fn pole_of_square() {
        let poly = Polygon::new(square(0.0, 0.0, 2.0), vec![]);
        let (pole, radius) = poly.pole_of_inaccessibility(1e-6);
        assert!((radius - 1.0).abs() < 1e-5);
        assert!(pole.distance(&p(1.0, 1.0)) < 1e-4);
    }

    #[test]
    fn pole_avoids_hole() {
        let poly = Polygon::new(square(0.0, 0.0, 6.0), vec![square(2.0, 2.0, 2.0)]);
        let (pole, radius) = poly.pole_of_inaccessibility(1e-4);
        assert!(poly.contains_point(&pole));
        assert!(radius > 1.1 && radius < 1.25);
    }

    #[test]
    fn eroded_containment() {
        let outline = Polygon::new(square(0.0, 0.0, 10.0), vec![]);
        // Inside.
        assert!(outline.contains_eroded(&Polygon::new(square(1.0, 1.0, 2.0), vec![]), 0.01));
        // Sharing an edge with the outline.
        assert!(outline.contains_eroded(&Polygon::new(square(0.0, 0.0, 2.0), vec![]), 0.01));
        // Poking out just a little.
        assert!(outline.contains_eroded(&Polygon::new(square(8.0, 1.0, 2.005), vec![]), 0.01));
        // Poking out a lot.
        assert!(!outline.contains_eroded(&Polygon::new(square(9.0, 1.0, 2.0), vec![]), 0.01));
        // Entirely outside.
        assert!(!outline.contains_eroded(&Polygon::new(square(20.0, 1.0, 2.0), vec![]), 0.01));
        // Too thin to survive erosion.
        let sliver = Polygon::new(
            Ring::new(vec![p(1.0, 1.0), p(5.0, 1.0), p(5.0, 1.01), p(1.0, 1.01)]),
            vec![],
        );
        assert!(!outline.contains_eroded(&sliver, 0.01));
    }

    #[test]
    fn holes_go_to_smallest_exterior() {
        let mut hole = square(3.0, 3.0, 1.0);
        hole.reverse();
        let region = Region::from_rings(vec![
            square(0.0, 0.0, 10.0),
            square(2.0, 2.0, 4.0),
            hole,
        ]);
        assert_eq!(region.polygons().len(), 2);
        let small = region
            .polygons()
            .iter()
            .find(|poly| poly.exterior.signed_area() == 16.0)
            .unwrap();
        assert_eq!(small.interiors.len(), 1);
    }
}
