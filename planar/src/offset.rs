use crate::geom::{Point, Vector};

/// Mitre joins longer than this many offset distances get bevelled instead.
const MITRE_LIMIT: f64 = 5.0;

/// Offsets a polyline sideways by `distance`.
///
/// Positive distances offset to the left (walking forward along the
/// polyline) and negative distances to the right. Corners get mitre joins,
/// unless the mitre would stick out too far, in which case they're bevelled.
///
/// The result isn't cleaned up: offsetting into a tight corner can make the
/// output loop back on itself.
pub fn offset_polyline(points: &[Point], distance: f64, closed: bool) -> Vec<Point> {
    let mut pts: Vec<Point> = Vec::with_capacity(points.len());
    for p in points {
        if pts.last() != Some(p) {
            pts.push(*p);
        }
    }
    if closed && pts.len() > 1 && pts.first() == pts.last() {
        pts.pop();
    }
    if pts.len() < 2 {
        return pts;
    }

    let n = pts.len();
    let seg_count = if closed { n } else { n - 1 };
    // Consecutive points are distinct, so every direction is nonzero.
    let normals: Vec<Vector> = (0..seg_count)
        .map(|i| {
            let d = pts[(i + 1) % n] - pts[i];
            let d = d.normalized().unwrap_or(Vector { x: 1.0, y: 0.0 });
            Vector { x: -d.y, y: d.x }
        })
        .collect();

    let mut out = Vec::with_capacity(n + 2);
    let join = |out: &mut Vec<Point>, p: Point, before: Vector, after: Vector| {
        let bisector = Vector {
            x: before.x + after.x,
            y: before.y + after.y,
        };
        let miter = bisector.normalized().and_then(|m| {
            let cos = m.dot(after);
            (cos > 1.0 / MITRE_LIMIT).then(|| m.scale(distance / cos))
        });
        match miter {
            Some(m) => out.push(p + m),
            None => {
                out.push(p + before.scale(distance));
                out.push(p + after.scale(distance));
            }
        }
    };

    if closed {
        for i in 0..n {
            join(&mut out, pts[i], normals[(i + n - 1) % n], normals[i]);
        }
    } else {
        out.push(pts[0] + normals[0].scale(distance));
        for i in 1..(n - 1) {
            join(&mut out, pts[i], normals[i - 1], normals[i]);
        }
        out.push(pts[n - 1] + normals[n - 2].scale(distance));
    }
    out
}
