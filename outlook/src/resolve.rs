//! Making the regions of one risk level disjoint.
//!
//! Contours are encoded independently, so the regions built from two of them
//! can claim the same territory. Typically this happens when two open
//! contours both cross the whole outline, and the region they're meant to
//! describe is the strip between them. We fix this up by repeatedly
//! replacing the largest overlapping region with its intersection with the
//! region whose contour is closest to its own.

use ordered_float::OrderedFloat;
use planar::{polyline_distance, Point, Polygon, Region};
use tracing::{debug, trace};

use crate::{config::ResolveConfig, construct::Candidate, error::ResolveError};

/// One entry of the working set.
#[derive(Clone, Debug)]
struct Record {
    id: usize,
    /// The polylines that this region was built from.
    tag: Vec<Vec<Point>>,
    region: Region,
    area: f64,
}

impl Record {
    fn new(id: usize, tag: Vec<Vec<Point>>, region: Region) -> Record {
        let area = region.area();
        Record {
            id,
            tag,
            region,
            area,
        }
    }
}

fn bounding_box(region: &Region) -> Option<(Point, Point)> {
    region
        .polygons()
        .iter()
        .filter_map(Polygon::bounding_box)
        .reduce(|(lo0, hi0), (lo1, hi1)| {
            (
                Point::new(lo0.x.min(lo1.x), lo0.y.min(lo1.y)),
                Point::new(hi0.x.max(hi1.x), hi0.y.max(hi1.y)),
            )
        })
}

/// Do these regions share more than `tolerance` of area?
fn overlaps(a: &Region, b: &Region, tolerance: f64) -> Result<bool, ResolveError> {
    let (Some((lo_a, hi_a)), Some((lo_b, hi_b))) = (bounding_box(a), bounding_box(b)) else {
        return Ok(false);
    };
    if hi_a.x <= lo_b.x || hi_b.x <= lo_a.x || hi_a.y <= lo_b.y || hi_b.y <= lo_a.y {
        return Ok(false);
    }
    Ok(a.intersection(b)?.area() > tolerance)
}

fn any_overlap(records: &[Record], tolerance: f64) -> Result<bool, ResolveError> {
    for (i, a) in records.iter().enumerate() {
        for b in &records[(i + 1)..] {
            if overlaps(&a.region, &b.region, tolerance)? {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

/// Every `stride`-th vertex of the tag, so that we look at no more than `limit` of them.
fn sample(tag: &[Vec<Point>], limit: usize) -> impl Iterator<Item = &Point> + '_ {
    let total: usize = tag.iter().map(Vec::len).sum();
    let stride = total.div_ceil(limit.max(1)).max(1);
    tag.iter().flatten().step_by(stride)
}

/// How close two tags get: the smallest distance from a (sampled) vertex of
/// one of them to the polylines of the other.
pub fn line_distance(a: &[Vec<Point>], b: &[Vec<Point>], sample_limit: usize) -> f64 {
    let one_way = |from: &[Vec<Point>], to: &[Vec<Point>]| {
        sample(from, sample_limit)
            .flat_map(|p| to.iter().map(move |line| polyline_distance(p, line)))
            .fold(f64::INFINITY, f64::min)
    };
    one_way(a, b).min(one_way(b, a))
}

/// Resolves the candidates of one risk level into disjoint polygons.
pub fn resolve(
    candidates: Vec<Candidate>,
    config: &ResolveConfig,
) -> Result<Vec<Polygon>, ResolveError> {
    let mut working: Vec<Record> = candidates
        .into_iter()
        .enumerate()
        .map(|(id, c)| Record::new(id, vec![c.tag], c.polygon.into()))
        .collect();
    let mut settled: Vec<Record> = Vec::new();
    let tolerance = config.overlap_tolerance;

    let mut iterations = 0;
    while any_overlap(&working, tolerance)? {
        if iterations >= config.max_resolve_iterations {
            return Err(ResolveError::NonConvergent { iterations });
        }
        iterations += 1;

        working.sort_by(|a, b| {
            OrderedFloat(b.area)
                .cmp(&OrderedFloat(a.area))
                .then(a.id.cmp(&b.id))
        });
        let target = working.remove(0);

        let mut partners = Vec::new();
        for (idx, rec) in working.iter().enumerate() {
            if overlaps(&target.region, &rec.region, tolerance)? {
                partners.push(idx);
            }
        }
        let Some(&partner) = partners.iter().min_by(|&&i, &&j| {
            let di = line_distance(&target.tag, &working[i].tag, config.tag_sample_limit);
            let dj = line_distance(&target.tag, &working[j].tag, config.tag_sample_limit);
            OrderedFloat(di)
                .cmp(&OrderedFloat(dj))
                .then(working[i].id.cmp(&working[j].id))
        }) else {
            // Everything else only ever shrinks, so nothing will overlap this one again.
            trace!(id = target.id, "settled");
            settled.push(target);
            continue;
        };

        let partner = working.remove(partner);
        trace!(target = target.id, partner = partner.id, "intersecting");
        let region = target.region.intersection(&partner.region)?;
        if region.area() > 0.0 {
            let mut tag = target.tag;
            tag.extend(partner.tag);
            working.push(Record::new(target.id, tag, region));
        }
    }
    debug!(
        iterations,
        regions = settled.len() + working.len(),
        "resolved overlaps"
    );

    Ok(settled
        .into_iter()
        .chain(working)
        .flat_map(|rec| rec.region.into_polygons())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use planar::Ring;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Candidate {
        let ring = vec![
            Point::new(x0, y0),
            Point::new(x0, y1),
            Point::new(x1, y1),
            Point::new(x1, y0),
        ];
        let mut tag = ring.clone();
        tag.push(ring[0]);
        Candidate {
            tag,
            polygon: Polygon::new(Ring::new(ring), vec![]),
        }
    }

    fn total_overlap(polys: &[Polygon]) -> f64 {
        let mut total = 0.0;
        for (i, a) in polys.iter().enumerate() {
            for b in &polys[(i + 1)..] {
                let a: Region = a.clone().into();
                let b: Region = b.clone().into();
                total += a.intersection(&b).unwrap().area();
            }
        }
        total
    }

    #[test]
    fn disjoint_candidates_pass_through() {
        let candidates = vec![rect(0.0, 0.0, 1.0, 1.0), rect(1.0, 0.0, 2.0, 1.0)];
        let out = resolve(candidates.clone(), &ResolveConfig::default()).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], candidates[0].polygon);
        assert_eq!(out[1], candidates[1].polygon);
    }

    #[test]
    fn identical_candidates_merge() {
        let candidates = vec![rect(0.0, 0.0, 2.0, 2.0), rect(0.0, 0.0, 2.0, 2.0)];
        let out = resolve(candidates, &ResolveConfig::default()).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].area(), 4.0);
    }

    #[test]
    fn closest_partner_wins() {
        let candidates = vec![
            rect(0.0, 0.0, 10.0, 10.0),
            rect(1.0, 1.0, 4.0, 4.0),
            rect(8.0, 8.0, 12.0, 12.0),
        ];
        let out = resolve(candidates, &ResolveConfig::default()).unwrap();
        let mut areas: Vec<_> = out.iter().map(Polygon::area).collect();
        areas.sort_by(f64::total_cmp);
        // The small square's edges run closer to the big square's than the corner square's do,
        // and once the big square has shrunk it no longer meets the corner square.
        assert_eq!(areas, vec![9.0, 16.0]);
        assert_eq!(total_overlap(&out), 0.0);
    }

    #[test]
    fn iteration_limit() {
        let candidates = vec![rect(0.0, 0.0, 2.0, 2.0), rect(1.0, 1.0, 3.0, 3.0)];
        let config = ResolveConfig {
            max_resolve_iterations: 0,
            ..ResolveConfig::default()
        };
        assert_matches!(
            resolve(candidates, &config),
            Err(ResolveError::NonConvergent { iterations: 0 })
        );
    }

    #[test]
    fn distance_between_tags() {
        let a = vec![vec![Point::new(0.0, 0.0), Point::new(4.0, 0.0)]];
        let b = vec![vec![Point::new(2.0, 1.0), Point::new(2.0, 5.0)]];
        assert_eq!(line_distance(&a, &b, 100), 1.0);
        assert_eq!(line_distance(&b, &a, 100), 1.0);
    }
}
