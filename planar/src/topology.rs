//! Utilities for computing topological properties of polylines.
//!
//! A [`Topology`] is the planar arrangement of a collection of segments: every
//! input segment is split wherever it meets another one, coincident pieces are
//! merged, and the pieces around each point are put in angular order. From
//! there we can walk faces (to split a region along a set of curves) or walk
//! the boundary of any set that can be described by winding numbers (to do
//! boolean operations).

use std::collections::{BTreeMap, HashMap, VecDeque};

use ordered_float::OrderedFloat;

use crate::{
    geom::{orient, Point, SegmentIntersection, SweepKey},
    polygon::{Polygon, Ring},
    segments::{Segments, Shape},
};

/// We support boolean operations, so a "winding number" for us is two winding
/// numbers, one for each shape.
#[derive(Clone, Copy, Hash, PartialEq, Eq, Default, serde::Serialize)]
pub struct WindingNumber {
    /// The winding number of the first shape.
    pub shape_a: i32,
    /// The winding number of the second shape.
    pub shape_b: i32,
}

impl std::fmt::Debug for WindingNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}a + {}b", self.shape_a, self.shape_b)
    }
}

impl std::ops::Add for WindingNumber {
    type Output = WindingNumber;

    fn add(self, rhs: Self) -> Self::Output {
        WindingNumber {
            shape_a: self.shape_a + rhs.shape_a,
            shape_b: self.shape_b + rhs.shape_b,
        }
    }
}

impl std::ops::Sub for WindingNumber {
    type Output = WindingNumber;

    fn sub(self, rhs: Self) -> Self::Output {
        WindingNumber {
            shape_a: self.shape_a - rhs.shape_a,
            shape_b: self.shape_b - rhs.shape_b,
        }
    }
}

/// For a segment, we store two winding numbers (one on each side of the segment).
///
/// For simple segments, the winding numbers on two sides only differ by one. Once
/// we merge segments, they can differ by more.
#[derive(Clone, Copy, Hash, PartialEq, Eq, Default, serde::Serialize)]
pub struct HalfSegmentWindingNumbers {
    /// This half-segment is incident to a point. Imagine you're standing at
    /// that point, looking out along the segment. This is the winding number of
    /// the area just counter-clockwise (to the left, from your point of view)
    /// of the segment.
    pub counter_clockwise: WindingNumber,
    /// This half-segment is incident to a point. Imagine you're standing at
    /// that point, looking out along the segment. This is the winding number of
    /// the area just clockwise (to the right, from your point of view) of the segment.
    pub clockwise: WindingNumber,
}

impl HalfSegmentWindingNumbers {
    /// A half-segment's winding numbers are trivial if they're the same on both sides.
    /// In this case, the segment is invisible to the topology of the sets.
    pub fn is_trivial(&self) -> bool {
        self.counter_clockwise == self.clockwise
    }

    /// Returns the winding numbers of our opposite half-segment.
    fn flipped(self) -> Self {
        Self {
            counter_clockwise: self.clockwise,
            clockwise: self.counter_clockwise,
        }
    }
}

impl std::fmt::Debug for HalfSegmentWindingNumbers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} | {:?}", self.clockwise, self.counter_clockwise)
    }
}

/// An index into the set of output segments.
///
/// There's no compile-time magic preventing misuse of this index, but you
/// should only use this to index into the [`Topology`] that you got it from.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, serde::Serialize)]
pub struct OutputSegIdx(usize);

impl OutputSegIdx {
    /// Returns an index to the first half of this output segment.
    pub fn first_half(self) -> HalfOutputSegIdx {
        HalfOutputSegIdx {
            idx: self,
            first_half: true,
        }
    }

    /// Returns an index to the second half of this output segment.
    pub fn second_half(self) -> HalfOutputSegIdx {
        HalfOutputSegIdx {
            idx: self,
            first_half: false,
        }
    }
}

/// An index that refers to one end of an output segment.
///
/// The two ends of an output segment are sweep-line ordered: the "first" half
/// has a smaller `y` coordinate (or smaller `x` coordinate if the `y`s are
/// tied) than the "second" half.
#[derive(Clone, Copy, Hash, PartialEq, Eq, serde::Serialize)]
pub struct HalfOutputSegIdx {
    idx: OutputSegIdx,
    first_half: bool,
}

impl HalfOutputSegIdx {
    fn other_half(self) -> Self {
        Self {
            idx: self.idx,
            first_half: !self.first_half,
        }
    }
}

impl std::fmt::Debug for HalfOutputSegIdx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.first_half {
            write!(f, "s{}->", self.idx.0)
        } else {
            write!(f, "s{}<-", self.idx.0)
        }
    }
}

/// A vector indexed by half-output segments.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
struct HalfOutputSegVec<T> {
    start: Vec<T>,
    end: Vec<T>,
}

impl<T> Default for HalfOutputSegVec<T> {
    fn default() -> Self {
        Self {
            start: Vec::new(),
            end: Vec::new(),
        }
    }
}

impl<T: Clone> HalfOutputSegVec<T> {
    fn filled(value: T, len: usize) -> Self {
        Self {
            start: vec![value.clone(); len],
            end: vec![value; len],
        }
    }
}

impl<T> std::ops::Index<HalfOutputSegIdx> for HalfOutputSegVec<T> {
    type Output = T;

    fn index(&self, index: HalfOutputSegIdx) -> &Self::Output {
        if index.first_half {
            &self.start[index.idx.0]
        } else {
            &self.end[index.idx.0]
        }
    }
}

impl<T> std::ops::IndexMut<HalfOutputSegIdx> for HalfOutputSegVec<T> {
    fn index_mut(&mut self, index: HalfOutputSegIdx) -> &mut T {
        if index.first_half {
            &mut self.start[index.idx.0]
        } else {
            &mut self.end[index.idx.0]
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
struct OutputSegVec<T> {
    inner: Vec<T>,
}

impl<T> Default for OutputSegVec<T> {
    fn default() -> Self {
        Self { inner: Vec::new() }
    }
}

impl<T> std::ops::Index<OutputSegIdx> for OutputSegVec<T> {
    type Output = T;

    fn index(&self, index: OutputSegIdx) -> &Self::Output {
        &self.inner[index.0]
    }
}

impl<T> std::ops::IndexMut<OutputSegIdx> for OutputSegVec<T> {
    fn index_mut(&mut self, index: OutputSegIdx) -> &mut T {
        &mut self.inner[index.0]
    }
}

#[derive(Clone, Copy, PartialEq, Eq, serde::Serialize)]
struct PointNeighbors {
    clockwise: HalfOutputSegIdx,
    counter_clockwise: HalfOutputSegIdx,
}

impl std::fmt::Debug for PointNeighbors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} o {:?}", self.counter_clockwise, self.clockwise)
    }
}

/// The points of the arrangement, with nearby points snapped together.
#[derive(Default)]
struct Vertices {
    points: Vec<Point>,
    index: BTreeMap<SweepKey, usize>,
}

impl Vertices {
    /// Returns the vertex within `eps` of `p` (the closest, if there are several),
    /// adding a new one if there isn't any.
    fn snap(&mut self, p: Point, eps: f64) -> usize {
        let lo = (OrderedFloat(p.y - eps), OrderedFloat(f64::NEG_INFINITY));
        let hi = (OrderedFloat(p.y + eps), OrderedFloat(f64::INFINITY));
        let mut best: Option<(f64, usize)> = None;
        for (_, &v) in self.index.range(lo..=hi) {
            let q = self.points[v];
            if (q.x - p.x).abs() <= eps {
                let d = p.distance(&q);
                if best.map_or(true, |(best_d, _)| d < best_d) {
                    best = Some((d, v));
                }
            }
        }
        if let Some((_, v)) = best {
            return v;
        }

        let v = self.points.len();
        self.points.push(p);
        self.index.insert(p.sweep_key(), v);
        v
    }
}

/// A face of an arrangement: a polygon, together with the winding numbers of its interior.
#[derive(Clone, Debug, serde::Serialize)]
pub struct Face {
    /// The face itself. Its exterior winds counter-clockwise and its holes clockwise.
    pub polygon: Polygon,
    /// The winding numbers of the input shapes throughout the face's interior.
    pub winding: WindingNumber,
}

/// The planar arrangement of a collection of segments.
///
/// Computes winding numbers, faces, and boolean operations. Shape `A` and shape `B`
/// polylines are tracked separately, so that winding numbers can be used to
/// combine them. Winding numbers are only meaningful for shapes made of closed
/// polylines; open polylines still take part in splitting the plane into faces.
#[derive(Clone, Debug)]
pub struct Topology {
    /// How the winding number changes when crossing each output segment from its
    /// clockwise side to its counter-clockwise side (as seen from its first half).
    delta: OutputSegVec<WindingNumber>,
    /// Winding numbers of each segment.
    ///
    /// This is sort of logically indexed by `HalfOutputSegIdx`, because we can look at the
    /// `HalfSegmentWindingNumbers` for each `HalfOutputSegIdx`. But since the two halves of
    /// the winding numbers are determined by one another, we only store the winding numbers
    /// for the start half of the output segment.
    winding: OutputSegVec<HalfSegmentWindingNumbers>,
    /// The output points.
    point: HalfOutputSegVec<Point>,
    /// The vertex index of each output point. Half-segments meeting at a point share a vertex.
    vertex: HalfOutputSegVec<usize>,
    vertex_count: usize,
    /// For each output half-segment, its neighboring segments are the ones that share a point with it.
    point_neighbors: HalfOutputSegVec<PointNeighbors>,
    /// Marks the output segments that have been deleted.
    deleted: OutputSegVec<bool>,
}

impl Topology {
    /// Creates a new `Topology` for a collection of segments and a given tolerance.
    ///
    /// Points closer than `eps` are considered to be the same point.
    pub fn new(segments: &Segments, eps: f64) -> Self {
        // Where each input segment gets split. The endpoints are always there.
        let mut splits: Vec<Vec<Point>> = segments
            .segments()
            .map(|s| vec![s.start, s.end])
            .collect();
        segments.candidate_pairs(|i, j| match segments.get(i).intersect(segments.get(j)) {
            SegmentIntersection::None => {}
            SegmentIntersection::Point(p) => {
                splits[i.0].push(p);
                splits[j.0].push(p);
            }
            SegmentIntersection::Overlap(p, q) => {
                splits[i.0].extend([p, q]);
                splits[j.0].extend([p, q]);
            }
        });

        // Snap the input endpoints before anything else, so that computed
        // intersection points get snapped to them and not the other way around.
        let mut vertices = Vertices::default();
        for s in segments.segments() {
            vertices.snap(s.start, eps);
            vertices.snap(s.end, eps);
        }

        let mut ret = Topology {
            delta: OutputSegVec::default(),
            winding: OutputSegVec::default(),
            point: HalfOutputSegVec::default(),
            vertex: HalfOutputSegVec::default(),
            vertex_count: 0,
            point_neighbors: HalfOutputSegVec::default(),
            deleted: OutputSegVec::default(),
        };

        // Coincident pieces of input segments get merged into a single output segment.
        let mut output_segs: HashMap<(usize, usize), OutputSegIdx> = HashMap::new();
        for idx in segments.indices() {
            let seg = segments.get(idx);
            let mut pts = std::mem::take(&mut splits[idx.0]);
            pts.sort_by_key(|p| OrderedFloat(seg.parameter(p)));
            let mut vs: Vec<usize> = pts.into_iter().map(|p| vertices.snap(p, eps)).collect();
            vs.dedup();

            let shape = segments.shape(idx);
            for w in vs.windows(2) {
                let (u, v) = (w[0], w[1]);
                if u == v {
                    continue;
                }
                let (first, second) = if vertices.points[v].sweep_lt(&vertices.points[u]) {
                    (v, u)
                } else {
                    (u, v)
                };
                // Walking along the input segment from `start` to `end` takes us from `u` to `v`.
                let forward = (first == u) == segments.positively_oriented(idx);
                let sign = if forward { 1 } else { -1 };

                let out = *output_segs.entry((first, second)).or_insert_with(|| {
                    ret.new_seg(
                        (vertices.points[first], first),
                        (vertices.points[second], second),
                    )
                });
                match shape {
                    Shape::A => ret.delta[out].shape_a += sign,
                    Shape::B => ret.delta[out].shape_b += sign,
                }
            }
        }
        ret.vertex_count = vertices.points.len();

        ret.link_points();
        ret.compute_winding();
        ret
    }

    fn new_seg(&mut self, first: (Point, usize), second: (Point, usize)) -> OutputSegIdx {
        let idx = OutputSegIdx(self.delta.inner.len());
        self.delta.inner.push(WindingNumber::default());
        self.winding.inner.push(HalfSegmentWindingNumbers::default());
        self.point.start.push(first.0);
        self.point.end.push(second.0);
        self.vertex.start.push(first.1);
        self.vertex.end.push(second.1);
        let no_nbrs = PointNeighbors {
            clockwise: idx.first_half(),
            counter_clockwise: idx.first_half(),
        };
        self.point_neighbors.start.push(no_nbrs);
        self.point_neighbors.end.push(PointNeighbors {
            clockwise: idx.second_half(),
            counter_clockwise: idx.second_half(),
        });
        self.deleted.inner.push(false);
        idx
    }

    /// Sorts the half-segments around each point counter-clockwise, and links them up.
    fn link_points(&mut self) {
        let mut around: Vec<Vec<HalfOutputSegIdx>> = vec![Vec::new(); self.vertex_count];
        for idx in self.segment_indices() {
            for half in [idx.first_half(), idx.second_half()] {
                around[self.vertex[half]].push(half);
            }
        }

        for halves in &mut around {
            let Some(&first) = halves.first() else {
                continue;
            };
            let center = self.point[first];
            halves.sort_by(|a, b| {
                angle_cmp(&center, &self.point[a.other_half()], &self.point[b.other_half()])
            });
            let n = halves.len();
            for (i, &half) in halves.iter().enumerate() {
                self.point_neighbors[half] = PointNeighbors {
                    counter_clockwise: halves[(i + 1) % n],
                    clockwise: halves[(i + n - 1) % n],
                };
            }
        }
    }

    /// The half-segment that follows `half` when walking around the face on its left.
    fn next_in_face(&self, half: HalfOutputSegIdx) -> HalfOutputSegIdx {
        self.point_neighbors[half.other_half()].clockwise
    }

    /// Walks all the faces of the arrangement.
    ///
    /// Each half-segment belongs to the face on its left (looking out from its
    /// point along the segment), so bounded faces are walked counter-clockwise
    /// and the unbounded face of each connected component is walked clockwise.
    fn walk_faces(&self) -> (HalfOutputSegVec<Option<usize>>, Vec<Vec<HalfOutputSegIdx>>) {
        let mut face_of = HalfOutputSegVec::filled(None, self.delta.inner.len());
        let mut faces = Vec::new();
        for idx in self.segment_indices() {
            for half in [idx.first_half(), idx.second_half()] {
                if face_of[half].is_some() {
                    continue;
                }
                let face = faces.len();
                let mut walk = Vec::new();
                let mut cur = half;
                loop {
                    face_of[cur] = Some(face);
                    walk.push(cur);
                    cur = self.next_in_face(cur);
                    if cur == half {
                        break;
                    }
                }
                faces.push(walk);
            }
        }
        (face_of, faces)
    }

    fn walk_area(&self, walk: &[HalfOutputSegIdx]) -> f64 {
        walk.iter()
            .map(|h| {
                let p = self.point[*h];
                let q = self.point[h.other_half()];
                p.x * q.y - p.y * q.x
            })
            .sum::<f64>()
            / 2.0
    }

    /// Labels each vertex with its connected component.
    fn components(&self) -> Vec<usize> {
        let mut parent: Vec<usize> = (0..self.vertex_count).collect();
        fn find(parent: &mut [usize], mut x: usize) -> usize {
            while parent[x] != x {
                parent[x] = parent[parent[x]];
                x = parent[x];
            }
            x
        }
        for idx in self.segment_indices() {
            let a = find(&mut parent, self.vertex[idx.first_half()]);
            let b = find(&mut parent, self.vertex[idx.second_half()]);
            parent[a] = b;
        }
        (0..self.vertex_count).map(|v| find(&mut parent, v)).collect()
    }

    /// The winding number at `p`, counting only the output segments for which `include` is true.
    ///
    /// `p` must not lie on any of the included segments.
    fn winding_at(&self, p: &Point, include: impl Fn(OutputSegIdx) -> bool) -> WindingNumber {
        let mut w = WindingNumber::default();
        for idx in self.segment_indices() {
            if !include(idx) {
                continue;
            }
            // The first half is the lower one, so every segment points up (or right).
            let a = &self.point[idx.first_half()];
            let b = &self.point[idx.second_half()];
            if a.y <= p.y && p.y < b.y && orient(a, b, p) > 0.0 {
                w = w + self.delta[idx];
            }
        }
        w
    }

    /// Fills out the winding numbers on both sides of every output segment.
    ///
    /// Within a connected component, we start from the unbounded face and cross
    /// segments one at a time. The unbounded face of each component gets its
    /// winding number from the segments of the other components.
    fn compute_winding(&mut self) {
        let (face_of, faces) = self.walk_faces();
        let component = self.components();
        let face_component: Vec<usize> = faces
            .iter()
            .map(|walk| component[self.vertex[walk[0]]])
            .collect();

        let mut outer: HashMap<usize, (f64, usize)> = HashMap::new();
        for (face, walk) in faces.iter().enumerate() {
            let area = self.walk_area(walk);
            let entry = outer.entry(face_component[face]).or_insert((area, face));
            if area < entry.0 {
                *entry = (area, face);
            }
        }

        let mut face_winding: Vec<Option<WindingNumber>> = vec![None; faces.len()];
        let mut queue = VecDeque::new();
        let mut outer_faces: Vec<_> = outer.into_iter().collect();
        outer_faces.sort_by_key(|(comp, _)| *comp);
        for (comp, (_, face)) in outer_faces {
            let p = self.point[faces[face][0]];
            let w = self.winding_at(&p, |idx| component[self.vertex[idx.first_half()]] != comp);
            face_winding[face] = Some(w);
            queue.push_back(face);
        }

        while let Some(face) = queue.pop_front() {
            let Some(w) = face_winding[face] else {
                continue;
            };
            for &half in &faces[face] {
                let Some(across) = face_of[half.other_half()] else {
                    continue;
                };
                if face_winding[across].is_some() {
                    continue;
                }
                // The face on the left of a first half is on the counter-clockwise side.
                let delta = self.delta[half.idx];
                face_winding[across] = Some(if half.first_half { w - delta } else { w + delta });
                queue.push_back(across);
            }
        }

        let indices: Vec<_> = self.segment_indices().collect();
        for idx in indices {
            let ccw = face_of[idx.first_half()].and_then(|f| face_winding[f]);
            let cw = face_of[idx.second_half()].and_then(|f| face_winding[f]);
            self.winding[idx] = HalfSegmentWindingNumbers {
                counter_clockwise: ccw.unwrap_or_default(),
                clockwise: cw.unwrap_or_default(),
            };
        }
    }

    fn delete_half(&mut self, half_seg: HalfOutputSegIdx) {
        let nbr = self.point_neighbors[half_seg];
        self.point_neighbors[nbr.clockwise].counter_clockwise = nbr.counter_clockwise;
        self.point_neighbors[nbr.counter_clockwise].clockwise = nbr.clockwise;
    }

    fn delete(&mut self, seg: OutputSegIdx) {
        self.deleted[seg] = true;
        self.delete_half(seg.first_half());
        self.delete_half(seg.second_half());
    }

    /// Removes every segment that has the same face on both sides.
    ///
    /// These are the dangling ends of open polylines, and the "cut" segments
    /// that connect two otherwise separate parts of the arrangement. Neither of
    /// them bounds anything. Removing a cut segment never turns another segment
    /// into a cut, so one pass is enough.
    pub fn remove_dangles_and_cuts(&mut self) {
        let (face_of, _) = self.walk_faces();
        let cuts: Vec<_> = self
            .segment_indices()
            .filter(|idx| face_of[idx.first_half()] == face_of[idx.second_half()])
            .collect();
        for idx in cuts {
            self.delete(idx);
        }
    }

    /// Iterates over indices of all output segments.
    pub fn segment_indices(&self) -> impl Iterator<Item = OutputSegIdx> + '_ {
        (0..self.delta.inner.len())
            .filter(|i| !self.deleted.inner[*i])
            .map(OutputSegIdx)
    }

    /// Returns the winding numbers of an output half-segment.
    pub fn winding(&self, idx: HalfOutputSegIdx) -> HalfSegmentWindingNumbers {
        if idx.first_half {
            self.winding[idx.idx]
        } else {
            self.winding[idx.idx].flipped()
        }
    }

    /// Returns the endpoint of an output half-segment.
    pub fn point(&self, idx: HalfOutputSegIdx) -> &Point {
        &self.point[idx]
    }

    /// Returns the bounded faces of the arrangement.
    ///
    /// Parts of the arrangement that aren't connected to each other become
    /// holes: a closed polyline sitting in the middle of a face cuts a hole in
    /// that face (and also forms a face of its own).
    ///
    /// Call [`Topology::remove_dangles_and_cuts`] first if you want faces with
    /// simple boundaries.
    pub fn faces(&self) -> Vec<Face> {
        let (_, walks) = self.walk_faces();
        let component = self.components();

        struct Walked {
            ring: Ring,
            area: f64,
            component: usize,
            winding: WindingNumber,
        }
        let walked: Vec<Walked> = walks
            .iter()
            .map(|walk| {
                let first = walk[0];
                Walked {
                    ring: Ring::new(walk.iter().map(|h| self.point[*h]).collect()),
                    area: self.walk_area(walk),
                    component: component[self.vertex[first]],
                    winding: self.winding(first).counter_clockwise,
                }
            })
            .collect();

        // The unbounded face of each component is the one with the smallest signed area.
        let mut outer: HashMap<usize, usize> = HashMap::new();
        for (i, w) in walked.iter().enumerate() {
            let entry = outer.entry(w.component).or_insert(i);
            if w.area < walked[*entry].area {
                *entry = i;
            }
        }

        let bounded: Vec<usize> = (0..walked.len())
            .filter(|i| walked[*i].area > 0.0 && outer.get(&walked[*i].component) != Some(i))
            .collect();

        let mut holes: HashMap<usize, Vec<Ring>> = HashMap::new();
        let mut outer: Vec<_> = outer.into_iter().collect();
        outer.sort();
        for (comp, i) in outer {
            let sample = walked[i].ring.points()[0];
            // The smallest face of some other component that contains this one.
            let parent = bounded
                .iter()
                .filter(|j| walked[**j].component != comp)
                .filter(|j| walked[**j].ring.winding_number(&sample) != 0)
                .min_by_key(|j| OrderedFloat(walked[**j].area));
            if let Some(&parent) = parent {
                holes
                    .entry(parent)
                    .or_default()
                    .push(walked[i].ring.clone());
            }
        }

        bounded
            .into_iter()
            .map(|i| Face {
                polygon: Polygon::new(
                    walked[i].ring.clone(),
                    holes.remove(&i).unwrap_or_default(),
                ),
                winding: walked[i].winding,
            })
            .collect()
    }

    /// Returns the contours of some set defined by this topology.
    ///
    /// The callback function `inside` takes a winding number and returns `true`
    /// if a point with that winding number should be in the resulting set. For example,
    /// to compute a boolean "and" using the non-zero winding rule, `inside` should be
    /// `|w| w.shape_a != 0 && w.shape_b != 0`.
    ///
    /// Each returned ring has the set on its left, so outer boundaries wind
    /// counter-clockwise and the boundaries of holes wind clockwise. When a walk
    /// comes back to a point it has already visited, the loop it made is split
    /// off into a separate ring; that way no ring repeats a point.
    pub fn contours(&self, inside: impl Fn(WindingNumber) -> bool) -> Vec<Ring> {
        let bdy = |idx: OutputSegIdx| -> bool {
            inside(self.winding[idx].clockwise) != inside(self.winding[idx].counter_clockwise)
        };

        let mut ret = Vec::new();
        let mut visited = vec![false; self.delta.inner.len()];
        for idx in self.segment_indices() {
            if visited[idx.0] || !bdy(idx) {
                continue;
            }

            // Arrange the orientation so that the interior is on our left as we walk.
            let start = if inside(self.winding[idx].counter_clockwise) {
                idx.first_half()
            } else {
                idx.second_half()
            };
            visited[idx.0] = true;

            // Each entry is a half-segment at a contour point, leading to the next point.
            let mut segs = vec![start];
            let mut last_visit: HashMap<SweepKey, usize> = HashMap::new();
            last_visit.insert(self.point[start].sweep_key(), 0);
            let mut next = start.other_half();
            loop {
                // Walk clockwise around the point until we find the next segment
                // that's on the boundary.
                let mut nbr = self.point_neighbors[next].clockwise;
                while inside(self.winding(nbr).clockwise) && nbr != next {
                    nbr = self.point_neighbors[nbr].clockwise;
                }
                if nbr == start || visited[nbr.idx.0] {
                    break;
                }
                visited[nbr.idx.0] = true;

                let p = self.point[nbr];
                if let Some(&pos) = last_visit.get(&p.sweep_key()) {
                    // We repeated a point, so the part of the walk since the last
                    // visit is a closed loop of its own.
                    let looped = segs.split_off(pos);
                    for h in &looped {
                        last_visit.remove(&self.point[*h].sweep_key());
                    }
                    ret.push(Ring::new(looped.iter().map(|h| self.point[*h]).collect()));
                }
                last_visit.insert(p.sweep_key(), segs.len());
                segs.push(nbr);
                next = nbr.other_half();
            }
            ret.push(Ring::new(segs.iter().map(|h| self.point[*h]).collect()));
        }

        ret
    }
}

/// Compares the directions from `center` to `p` and to `q`, counter-clockwise
/// starting from the positive `x` axis.
fn angle_cmp(center: &Point, p: &Point, q: &Point) -> std::cmp::Ordering {
    use std::cmp::Ordering;

    let half = |r: &Point| {
        if r.y > center.y || (r.y == center.y && r.x > center.x) {
            0
        } else {
            1
        }
    };
    half(p).cmp(&half(q)).then_with(|| {
        let o = orient(center, p, q);
        if o > 0.0 {
            Ordering::Less
        } else if o < 0.0 {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    })
}
