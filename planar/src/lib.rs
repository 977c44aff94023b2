#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

mod geom;
mod offset;
mod polygon;
mod segments;
pub mod topology;

pub use geom::{
    orient, polyline_distance, project_onto_segment, segment_distance, Point, Segment,
    SegmentIntersection, SweepKey, Vector,
};
pub use offset::offset_polyline;
pub use polygon::{Polygon, Region, Ring};
pub use segments::{SegIdx, Segments, Shape};
pub use topology::{Face, Topology, WindingNumber};

/// A fill rule tells us how to decide whether a point is "inside" a polyline.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
pub enum FillRule {
    /// The point is "inside" if its winding number is odd.
    EvenOdd,
    /// The point is "inside" if its winding number is non-zero.
    NonZero,
}

impl FillRule {
    fn is_inside(self, winding: i32) -> bool {
        match self {
            FillRule::EvenOdd => winding % 2 != 0,
            FillRule::NonZero => winding != 0,
        }
    }
}

/// Binary operations between sets.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
pub enum BooleanOp {
    /// A point is in the union of two sets if it is in either one.
    Union,
    /// A point is in the intersection of two sets if it is in both.
    Intersection,
    /// A point is in the difference of two sets if it is in the first but not the second.
    Difference,
    /// A point is in the exclusive-or of two sets if it is in one or the other, but not both.
    Xor,
}

/// The input points were faulty.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, thiserror::Error)]
pub enum Error {
    /// At least one of the inputs was infinite.
    #[error("infinite coordinate in input")]
    Infinity,
    /// At least one of the inputs was not a number.
    #[error("NaN coordinate in input")]
    NaN,
}

fn extrema(mut xs: impl Iterator<Item = f64>) -> Result<(f64, f64), Error> {
    xs.try_fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), x| {
        if x.is_nan() {
            Err(Error::NaN)
        } else {
            Ok((x.min(min), x.max(max)))
        }
    })
}

/// The snapping tolerance we can support for a collection of points.
///
/// This scales with the largest coordinate: points closer together than a
/// small multiple of the rounding error at that magnitude get treated as equal.
pub fn default_eps<'a>(points: impl IntoIterator<Item = &'a Point>) -> Result<f64, Error> {
    let (min, max) = extrema(points.into_iter().flat_map(|p| [p.x, p.y]))?;
    if min.is_infinite() || max.is_infinite() {
        // Both infinite means there weren't any points.
        if min == f64::INFINITY && max == f64::NEG_INFINITY {
            return Ok(0.0);
        }
        return Err(Error::Infinity);
    }

    let m_2 = min.abs().max(max.abs());
    Ok(m_2 * (f64::EPSILON * 64.0))
}

/// Computes a boolean operation between two regions.
pub fn boolean_op(
    set_a: &Region,
    set_b: &Region,
    fill_rule: FillRule,
    op: BooleanOp,
) -> Result<Region, Error> {
    let eps = default_eps(
        set_a
            .rings()
            .chain(set_b.rings())
            .flat_map(|r| r.points()),
    )?;

    let mut segs = Segments::default();
    for ring in set_a.rings() {
        segs.add_points(ring.points().iter().copied(), true, Shape::A)?;
    }
    for ring in set_b.rings() {
        segs.add_points(ring.points().iter().copied(), true, Shape::B)?;
    }
    let top = Topology::new(&segs, eps);

    let inside = |windings: WindingNumber| {
        let a = fill_rule.is_inside(windings.shape_a);
        let b = fill_rule.is_inside(windings.shape_b);
        match op {
            BooleanOp::Union => a || b,
            BooleanOp::Intersection => a && b,
            BooleanOp::Xor => a != b,
            BooleanOp::Difference => a && !b,
        }
    };

    Ok(Region::from_rings(top.contours(inside)))
}

/// Splits the plane along some closed rings and open polylines, and returns the bounded pieces.
///
/// The rings are shape `A` and the polylines are shape `B`, so each face's
/// winding number says how it sits relative to the rings. Parts of the
/// polylines that don't separate anything (loose ends, and bridges between
/// otherwise separate pieces) are ignored.
///
/// Points closer together than `eps` are merged; if it's `None`, we use
/// [`default_eps`].
pub fn polygonize<'a>(
    rings: impl IntoIterator<Item = &'a Ring>,
    lines: impl IntoIterator<Item = &'a [Point]>,
    eps: Option<f64>,
) -> Result<Vec<Face>, Error> {
    let rings: Vec<&Ring> = rings.into_iter().collect();
    let lines: Vec<&[Point]> = lines.into_iter().collect();
    let min_eps = default_eps(
        rings
            .iter()
            .flat_map(|r| r.points())
            .chain(lines.iter().flat_map(|l| l.iter())),
    )?;
    let eps = eps.map_or(min_eps, |e| e.max(min_eps));

    let mut segs = Segments::default();
    for ring in rings {
        segs.add_points(ring.points().iter().copied(), true, Shape::A)?;
    }
    for line in lines {
        segs.add_points(line.iter().copied(), false, Shape::B)?;
    }
    let mut top = Topology::new(&segs, eps);
    top.remove_dangles_and_cuts();
    Ok(top.faces())
}
