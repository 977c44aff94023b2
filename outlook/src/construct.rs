//! Turning one polyline into the regions of the outline that it encloses.
//!
//! A contour encloses whatever is on its right-hand side. Closed contours
//! enclose their interior directly. Open contours run from one edge of the
//! outline to another, and enclose the part of the outline on their right. We
//! find those parts by cutting the outline up along the polyline, and keeping
//! the faces that a line running just to the right of the polyline passes
//! through.

use planar::{offset_polyline, Point, Polygon, Segments, Shape};
use tracing::trace;

use crate::{
    config::ConstructionConfig, coords::Coordinate, error::GeometryError, outline::Outline,
};

/// A region built from one polyline, tagged with the polyline that made it.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    /// The polyline, after extension. Closed polylines repeat their first point at the end.
    pub tag: Vec<Point>,
    /// The region, clipped to the outline.
    pub polygon: Polygon,
}

/// Builds the candidate regions for one polyline.
pub fn construct(
    polyline: &[Coordinate],
    outline: &Outline,
    config: &ConstructionConfig,
) -> Result<Vec<Candidate>, GeometryError> {
    let closed = polyline.len() > 1 && polyline.first() == polyline.last();

    let mut points: Vec<Point> = Vec::with_capacity(polyline.len() + 2);
    for c in polyline {
        let p = c.to_point();
        if points.last() != Some(&p) {
            points.push(p);
        }
    }
    if closed {
        points.pop();
        if points.len() < 3 {
            return Err(GeometryError::Degenerate);
        }
    } else if points.len() < 2 {
        return Err(GeometryError::Degenerate);
    }

    let mut segs = Segments::default();
    segs.add_points(points.iter().copied(), closed, Shape::A)?;
    if !segs.is_simple() {
        return Err(GeometryError::SelfIntersecting);
    }

    let (line, test_line) = if closed {
        let mut test_line = offset_polyline(&points, -config.test_offset, true);
        if let Some(first) = test_line.first().copied() {
            test_line.push(first);
        }
        let mut line = points;
        line.push(line[0]);
        (line, test_line)
    } else {
        let line = extend(&points, outline, config.extension_fraction)?;
        let test_line = offset_polyline(&line, -config.test_offset, false);
        (line, test_line)
    };

    let faces = planar::polygonize(outline.rings(), [&line[..]], config.snap_epsilon)?;
    trace!(faces = faces.len(), "cut up the outline");

    let candidates: Vec<_> = faces
        .into_iter()
        .filter(|face| face.polygon.meets_interior(&test_line))
        .filter(|face| outline.contains_eroded(&face.polygon, config.erosion_tolerance))
        .map(|face| Candidate {
            tag: line.clone(),
            polygon: face.polygon,
        })
        .collect();

    if candidates.is_empty() {
        Err(GeometryError::NoQualifyingFaces)
    } else {
        Ok(candidates)
    }
}

/// Extends both ends of an open polyline so that they end up strictly outside the outline.
///
/// Each end first gets pushed out along its end segment by `fraction` of
/// that segment. If that isn't enough to leave the outline, it keeps going
/// along the same ray until it's `fraction` of a segment past a crossing of
/// the outline's boundary.
fn extend(points: &[Point], outline: &Outline, fraction: f64) -> Result<Vec<Point>, GeometryError> {
    let n = points.len();
    let start = extend_end(points[0], points[1], outline, fraction)?;
    let end = extend_end(points[n - 1], points[n - 2], outline, fraction)?;

    let mut ret = Vec::with_capacity(n + 2);
    ret.push(start);
    ret.extend_from_slice(points);
    ret.push(end);
    Ok(ret)
}

/// Extends the polyline's endpoint `end` away from its neighbor `prev`.
fn extend_end(
    end: Point,
    prev: Point,
    outline: &Outline,
    fraction: f64,
) -> Result<Point, GeometryError> {
    let d = end - prev;
    let first_try = end + d.scale(fraction);
    if outline.strictly_outside(&first_try) {
        return Ok(first_try);
    }

    // Parameters along the ray `end + t * d` where it crosses the boundary.
    let mut crossings: Vec<f64> = outline
        .rings()
        .flat_map(|r| r.edges())
        .filter_map(|(a, b)| {
            let e = *b - *a;
            let denom = d.cross(e);
            if denom == 0.0 {
                return None;
            }
            let w = *a - end;
            let t = w.cross(e) / denom;
            let s = w.cross(d) / denom;
            (t > 0.0 && (0.0..=1.0).contains(&s)).then_some(t)
        })
        .collect();
    crossings.sort_by(f64::total_cmp);

    crossings
        .into_iter()
        .map(|t| end + d.scale(t + fraction))
        .find(|p| outline.strictly_outside(p))
        .ok_or(GeometryError::ExtensionFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use planar::Ring;

    fn outline() -> Outline {
        // 20 degrees of longitude by 15 of latitude.
        Outline::new(Polygon::new(
            Ring::new(vec![
                Point::new(-105.0, 30.0),
                Point::new(-85.0, 30.0),
                Point::new(-85.0, 45.0),
                Point::new(-105.0, 45.0),
            ]),
            vec![],
        ))
        .unwrap()
    }

    fn coords(groups: &str) -> Vec<Coordinate> {
        groups
            .split_whitespace()
            .map(|g| Coordinate::decode(g).unwrap())
            .collect()
    }

    #[test]
    fn closed_contour_inside() {
        // Clockwise, so the inside is on the right.
        let line = coords("35009500 40009500 40009000 35009000 35009500");
        let candidates = construct(&line, &outline(), &ConstructionConfig::default()).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].polygon.area(), 25.0);
        assert!(candidates[0].polygon.interiors.is_empty());
    }

    #[test]
    fn counter_clockwise_contour_encloses_the_outside() {
        let line = coords("35009500 35009000 40009000 40009500 35009500");
        let candidates = construct(&line, &outline(), &ConstructionConfig::default()).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].polygon.interiors.len(), 1);
        assert_eq!(candidates[0].polygon.area(), 300.0 - 25.0);
    }

    #[test]
    fn open_contour_across_the_outline() {
        // Northward along 95W, so the east side is enclosed.
        let line = coords("30009500 45009500");
        let candidates = construct(&line, &outline(), &ConstructionConfig::default()).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].polygon.area(), 150.0);
        assert!(candidates[0]
            .polygon
            .contains_point(&Point::new(-90.0, 40.0)));
        assert_eq!(candidates[0].tag.len(), 4);
    }

    #[test]
    fn short_ends_get_pushed_out() {
        // The ends are well inside the outline, and 3% of a segment doesn't reach the edge.
        let line = coords("32009500 43009500");
        let candidates = construct(&line, &outline(), &ConstructionConfig::default()).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].polygon.area(), 150.0);
        let tag = &candidates[0].tag;
        assert!(outline().strictly_outside(&tag[0]));
        assert!(outline().strictly_outside(&tag[tag.len() - 1]));
    }

    /// The box with a notch cut down from the top edge, between `x0` and `x1`, to 35N.
    fn notched(x0: f64, x1: f64) -> Outline {
        let pts = [
            (-105.0, 30.0),
            (-85.0, 30.0),
            (-85.0, 45.0),
            (x1, 45.0),
            (x1, 35.0),
            (x0, 35.0),
            (x0, 45.0),
            (-105.0, 45.0),
        ];
        Outline::new(Polygon::new(
            Ring::new(pts.iter().map(|&(x, y)| Point::new(x, y)).collect()),
            vec![],
        ))
        .unwrap()
    }

    #[test]
    fn open_contour_across_a_notch() {
        // Eastward along 40N, so everything south of it is enclosed. That's a
        // single U-shaped face; the bit of the notch below the line is outside
        // the outline and doesn't count.
        let outline = notched(-100.0, -90.0);
        let line = coords("40000400 40008600");
        let candidates = construct(&line, &outline, &ConstructionConfig::default()).unwrap();
        assert_eq!(candidates.len(), 1);
        let poly = &candidates[0].polygon;
        assert!((poly.area() - 150.0).abs() < 1e-9);
        assert!(poly.contains_point(&Point::new(-102.0, 38.0)));
        assert!(poly.contains_point(&Point::new(-88.0, 38.0)));
        assert!(!poly.contains_point(&Point::new(-95.0, 38.0)));
    }

    #[test]
    fn extension_skips_over_a_narrow_notch() {
        // Westward along 40N, ending just short of a notch 0.2 degrees wide.
        // Pushing past the notch's near wall only lands in the land on its
        // other side, so the end has to go all the way to the western edge.
        let outline = notched(-95.1, -94.9);
        let line = coords("40008600 40009400");
        let candidates = construct(&line, &outline, &ConstructionConfig::default()).unwrap();

        let tag = &candidates[0].tag;
        let last = tag[tag.len() - 1];
        assert!(last.x < -105.0);
        assert!(outline.strictly_outside(&last));

        // North of the line, on both sides of the notch.
        assert_eq!(candidates.len(), 2);
        let total: f64 = candidates.iter().map(|c| c.polygon.area()).sum();
        assert!((total - 99.0).abs() < 1e-9);
        assert!(candidates
            .iter()
            .any(|c| c.polygon.contains_point(&Point::new(-100.0, 42.0))));
        assert!(candidates
            .iter()
            .any(|c| c.polygon.contains_point(&Point::new(-90.0, 42.0))));
    }

    #[test]
    fn holes_in_the_outline_stay_out() {
        let exterior = outline().polygon().exterior.clone();
        let hole = Ring::new(vec![
            Point::new(-93.0, 37.0),
            Point::new(-92.0, 37.0),
            Point::new(-92.0, 38.0),
            Point::new(-93.0, 38.0),
        ]);
        let outline = Outline::new(Polygon::new(exterior, vec![hole])).unwrap();

        let line = coords("30009500 45009500");
        let candidates = construct(&line, &outline, &ConstructionConfig::default()).unwrap();
        assert_eq!(candidates.len(), 1);
        let poly = &candidates[0].polygon;
        assert_eq!(poly.interiors.len(), 1);
        assert!((poly.area() - 149.0).abs() < 1e-9);
        assert!(!poly.contains_point(&Point::new(-92.5, 37.5)));
        assert!(poly.contains_point(&Point::new(-90.0, 40.0)));
    }

    #[test]
    fn degenerate() {
        let config = ConstructionConfig::default();
        assert_matches!(
            construct(&coords("35009500"), &outline(), &config),
            Err(GeometryError::Degenerate)
        );
        assert_matches!(
            construct(&coords("35009500 35009500"), &outline(), &config),
            Err(GeometryError::Degenerate)
        );
        assert_matches!(
            construct(&coords("35009500 36009500 35009500"), &outline(), &config),
            Err(GeometryError::Degenerate)
        );
    }

    #[test]
    fn self_intersecting() {
        let line = coords("35009500 40009000 40009500 35009000");
        assert_matches!(
            construct(&line, &outline(), &ConstructionConfig::default()),
            Err(GeometryError::SelfIntersecting)
        );
    }

    #[test]
    fn outside_the_outline() {
        // A closed contour out in the ocean.
        let line = coords("20009500 25009500 25009000 20009000 20009500");
        assert_matches!(
            construct(&line, &outline(), &ConstructionConfig::default()),
            Err(GeometryError::NoQualifyingFaces)
        );
    }
}
