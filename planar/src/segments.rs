use crate::{
    geom::{Point, Segment, SegmentIntersection},
    Error,
};

/// An index into our segment arena.
///
/// Throughout this library, we assign identities to segments, so that we may
/// consider segments as different even if they have the same start- and end-points.
///
/// This index is used to identify a segment, whose data can be retrieved by looking
/// it up in [`Segments`]. (Of course, this index-as-identifier breaks down if there are
/// multiple `Segments` in flight. Just be careful not to mix them up.)
#[derive(Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub struct SegIdx(pub usize);

impl std::fmt::Debug for SegIdx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "s_{}", self.0)
    }
}

/// We support binary operations, so every input polyline belongs to one of two shapes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Shape {
    /// The first operand.
    A,
    /// The second operand.
    B,
}

/// An arena of segments, grouped into the polylines they came from.
#[derive(Debug, Clone, Default)]
pub struct Segments {
    segs: Vec<Segment>,
    contour_prev: Vec<Option<SegIdx>>,
    contour_next: Vec<Option<SegIdx>>,
    /// For each segment, stores true if the sweep-line order (small y to big y)
    /// is the same as the orientation in its original polyline.
    orientation: Vec<bool>,
    shape: Vec<Shape>,
    /// For each segment, the index of the polyline it belongs to.
    contour: Vec<usize>,
    contour_count: usize,
}

impl Segments {
    /// Returns the segment at `idx`.
    pub fn get(&self, idx: SegIdx) -> &Segment {
        &self.segs[idx.0]
    }

    /// The number of segments.
    pub fn len(&self) -> usize {
        self.segs.len()
    }

    /// Are there no segments at all?
    pub fn is_empty(&self) -> bool {
        self.segs.is_empty()
    }

    /// Iterates over the indices of all the segments.
    pub fn indices(&self) -> impl Iterator<Item = SegIdx> {
        (0..self.segs.len()).map(SegIdx)
    }

    /// Iterates over all the segments, in index order.
    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.segs.iter()
    }

    /// The start of the segment, in the direction of its polyline.
    pub fn oriented_start(&self, idx: SegIdx) -> &Point {
        if self.orientation[idx.0] {
            &self.get(idx).start
        } else {
            &self.get(idx).end
        }
    }

    /// The end of the segment, in the direction of its polyline.
    pub fn oriented_end(&self, idx: SegIdx) -> &Point {
        if self.orientation[idx.0] {
            &self.get(idx).end
        } else {
            &self.get(idx).start
        }
    }

    /// Does the segment's polyline run from its sweep-line start to its end?
    pub fn positively_oriented(&self, idx: SegIdx) -> bool {
        self.orientation[idx.0]
    }

    /// Which operand the segment belongs to.
    pub fn shape(&self, idx: SegIdx) -> Shape {
        self.shape[idx.0]
    }

    /// The index of the polyline that the segment belongs to.
    pub fn contour(&self, idx: SegIdx) -> usize {
        self.contour[idx.0]
    }

    /// How many polylines have been added.
    pub fn contour_count(&self) -> usize {
        self.contour_count
    }

    /// The previous segment in the same polyline, if there is one.
    pub fn contour_prev(&self, idx: SegIdx) -> Option<SegIdx> {
        self.contour_prev[idx.0]
    }

    /// The next segment in the same polyline, if there is one.
    pub fn contour_next(&self, idx: SegIdx) -> Option<SegIdx> {
        self.contour_next[idx.0]
    }

    /// Are these two segments neighbors in the same polyline?
    pub fn adjacent(&self, i: SegIdx, j: SegIdx) -> bool {
        self.contour_next(i) == Some(j) || self.contour_next(j) == Some(i)
    }

    /// Adds a polyline to the arena.
    ///
    /// Repeated consecutive points are collapsed, and a closed polyline whose
    /// last point repeats its first is treated as though the repetition wasn't
    /// there. Polylines with fewer than two distinct points add nothing.
    pub fn add_points<P: Into<Point>>(
        &mut self,
        ps: impl IntoIterator<Item = P>,
        closed: bool,
        shape: Shape,
    ) -> Result<(), Error> {
        let mut points: Vec<Point> = Vec::new();
        for p in ps {
            let p = p.into();
            if p.x.is_nan() || p.y.is_nan() {
                return Err(Error::NaN);
            }
            if !p.is_finite() {
                return Err(Error::Infinity);
            }
            if points.last() != Some(&p) {
                points.push(p);
            }
        }
        if closed && points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        if points.len() <= 1 {
            return Ok(());
        }

        let old_len = self.segs.len();
        let contour = self.contour_count;
        self.contour_count += 1;

        let n = if closed { points.len() } else { points.len() - 1 };
        for i in 0..n {
            let p = points[i];
            let q = points[(i + 1) % points.len()];
            self.segs.push(Segment::new(p, q));
            self.orientation.push(!q.sweep_lt(&p));
            self.shape.push(shape);
            self.contour.push(contour);
            let idx = self.segs.len() - 1;
            self.contour_prev
                .push((idx > old_len).then(|| SegIdx(idx - 1)));
            self.contour_next
                .push((idx + 1 < old_len + n).then(|| SegIdx(idx + 1)));
        }
        if closed {
            self.contour_prev[old_len] = Some(SegIdx(old_len + n - 1));
            self.contour_next[old_len + n - 1] = Some(SegIdx(old_len));
        }
        Ok(())
    }

    /// Creates an arena holding a single closed polyline.
    pub fn from_closed_cycle<P: Into<Point>>(
        ps: impl IntoIterator<Item = P>,
        shape: Shape,
    ) -> Result<Self, Error> {
        let mut ret = Self::default();
        ret.add_points(ps, true, shape)?;
        Ok(ret)
    }

    /// Indices of segments, sorted by their smallest `y` coordinate.
    pub(crate) fn sweep_order(&self) -> Vec<SegIdx> {
        let mut order: Vec<_> = self.indices().collect();
        order.sort_by(|a, b| {
            self.get(*a)
                .start
                .sweep_key()
                .cmp(&self.get(*b).start.sweep_key())
        });
        order
    }

    /// Calls `f` on every pair of segments whose bounding boxes overlap.
    ///
    /// This sweeps a horizontal line upwards, so segments that are far apart
    /// vertically are never compared.
    pub(crate) fn candidate_pairs(&self, mut f: impl FnMut(SegIdx, SegIdx)) {
        let order = self.sweep_order();
        for (pos, &i) in order.iter().enumerate() {
            let si = self.get(i);
            for &j in &order[(pos + 1)..] {
                let sj = self.get(j);
                if sj.start.y > si.end.y {
                    break;
                }
                if sj.max_x() < si.min_x() || si.max_x() < sj.min_x() {
                    continue;
                }
                f(i, j);
            }
        }
    }

    /// Returns true if no two segments of the same polyline meet, other
    /// than neighbors sharing their common endpoint.
    pub fn is_simple(&self) -> bool {
        let mut simple = true;
        self.candidate_pairs(|i, j| {
            if !simple || self.contour(i) != self.contour(j) {
                return;
            }
            match self.get(i).intersect(self.get(j)) {
                SegmentIntersection::None => {}
                SegmentIntersection::Overlap(..) => simple = false,
                SegmentIntersection::Point(p) => {
                    let shared = if self.contour_next(i) == Some(j) {
                        Some(self.oriented_end(i))
                    } else if self.contour_next(j) == Some(i) {
                        Some(self.oriented_end(j))
                    } else {
                        None
                    };
                    if shared != Some(&p) {
                        simple = false;
                    }
                }
            }
        });
        simple
    }
}
