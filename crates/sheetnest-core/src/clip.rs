//! Boolean/offset/Minkowski kernel. Mediates between world millimetres and
//! the clipping backend by snapping every coordinate that crosses the
//! boundary to a 1/1000 mm grid (`f64::round` is round-half-away-from-zero).
//!
//! All operations take and return flat sequences of simple rings. Hole rings
//! appear in the flat list next to their outers; [`ClipEngine::difference`]
//! and [`ClipEngine::offset`] reassemble them by containment depth before
//! calling the backend. Kernel failures never escape: union and offset fall
//! back to the subject, difference and Minkowski to the empty sequence.

use std::panic::{catch_unwind, AssertUnwindSafe};

use geo::{unary_union, BooleanOps, Coord, LineString, MultiPolygon, Polygon as GeoPolygon};
use tracing::warn;

use crate::geometry::{point_in_polygon, polygon_area};
use crate::model::{Point, Polygon};

/// World units per kernel grid step: 1000 steps per millimetre.
pub const CLIP_SCALE: f64 = 1000.0;

/// Rings with less area than one kernel grid cell are noise.
const MIN_RING_AREA: f64 = 1.0 / (CLIP_SCALE * CLIP_SCALE);

#[derive(Debug, Clone, Copy)]
pub struct ClipEngine {
    scale: f64,
}

impl Default for ClipEngine {
    fn default() -> Self {
        Self { scale: CLIP_SCALE }
    }
}

impl ClipEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// The source kernel needed an async warm-up before the first boolean
    /// op; this backend is usable from construction, so readiness is
    /// unconditional. Callers that must work pre-kernel use the
    /// segment-intersection path in [`crate::collide`].
    pub fn is_ready(&self) -> bool {
        true
    }

    fn snap(&self, v: f64) -> f64 {
        (v * self.scale).round() / self.scale
    }

    fn snap_point(&self, p: &Point) -> Point {
        Point::new(self.snap(p.x), self.snap(p.y))
    }

    fn ring_to_geo(&self, ring: &[Point]) -> GeoPolygon<f64> {
        let coords: Vec<Coord<f64>> = ring
            .iter()
            .map(|p| {
                let p = self.snap_point(p);
                Coord { x: p.x, y: p.y }
            })
            .collect();
        GeoPolygon::new(LineString::new(coords), vec![])
    }

    fn line_string_to_ring(&self, ls: &LineString<f64>) -> Polygon {
        let mut out: Polygon = ls
            .coords()
            .map(|c| Point::new(self.snap(c.x), self.snap(c.y)))
            .collect();
        if out.len() >= 2 {
            let first = out[0];
            let last = out[out.len() - 1];
            if (first.x - last.x).abs() <= f64::EPSILON && (first.y - last.y).abs() <= f64::EPSILON
            {
                out.pop();
            }
        }
        out
    }

    fn rings_from_geo(&self, mp: &MultiPolygon<f64>, include_holes: bool) -> Vec<Polygon> {
        let mut out = Vec::new();
        for poly in mp.iter() {
            let ext = self.line_string_to_ring(poly.exterior());
            if ext.len() >= 3 && polygon_area(&ext) > MIN_RING_AREA {
                out.push(ext);
            }
            if include_holes {
                for hole in poly.interiors() {
                    let ring = self.line_string_to_ring(hole);
                    if ring.len() >= 3 && polygon_area(&ring) > MIN_RING_AREA {
                        out.push(ring);
                    }
                }
            }
        }
        out
    }

    fn usable<'a>(&self, rings: &'a [Polygon]) -> Vec<&'a Polygon> {
        rings
            .iter()
            .filter(|r| r.len() >= 3 && polygon_area(r) > MIN_RING_AREA)
            .collect()
    }

    /// Rebuilds polygons-with-holes from a flat ring list. A ring whose
    /// first vertex lies inside an odd number of other rings is a hole and
    /// is attached to the smallest outer ring containing it.
    fn assemble(&self, rings: &[Polygon]) -> MultiPolygon<f64> {
        let rings = self.usable(rings);
        let mut outers: Vec<(usize, f64)> = Vec::new();
        let mut holes: Vec<usize> = Vec::new();
        for (i, ring) in rings.iter().enumerate() {
            let probe = ring[0];
            let depth = rings
                .iter()
                .enumerate()
                .filter(|(j, other)| *j != i && point_in_polygon(other, probe.x, probe.y))
                .count();
            if depth % 2 == 0 {
                outers.push((i, polygon_area(ring)));
            } else {
                holes.push(i);
            }
        }

        let mut polys: Vec<(usize, f64, Vec<usize>)> = outers
            .into_iter()
            .map(|(i, area)| (i, area, Vec::new()))
            .collect();
        for h in holes {
            let probe = rings[h][0];
            let owner = polys
                .iter_mut()
                .filter(|(i, _, _)| point_in_polygon(rings[*i], probe.x, probe.y))
                .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
            if let Some((_, _, ring_holes)) = owner {
                ring_holes.push(h);
            }
        }

        MultiPolygon::new(
            polys
                .into_iter()
                .map(|(i, _, ring_holes)| {
                    let exterior = self.ring_to_geo(rings[i]).exterior().clone();
                    let interiors = ring_holes
                        .into_iter()
                        .map(|h| self.ring_to_geo(rings[h]).exterior().clone())
                        .collect();
                    GeoPolygon::new(exterior, interiors)
                })
                .collect(),
        )
    }

    /// Non-zero union of independent filled rings. Merges touching and
    /// overlapping rings; enclosed voids come back as hole rings.
    pub fn union(&self, rings: &[Polygon]) -> Vec<Polygon> {
        let usable = self.usable(rings);
        if usable.is_empty() {
            return Vec::new();
        }
        if usable.len() == 1 {
            return vec![usable[0].clone()];
        }
        let geo_polys: Vec<GeoPolygon<f64>> =
            usable.iter().map(|r| self.ring_to_geo(r)).collect();
        match catch_unwind(AssertUnwindSafe(|| unary_union(geo_polys.iter()))) {
            Ok(mp) => self.rings_from_geo(&mp, true),
            Err(_) => {
                warn!("clip kernel union failed; returning subject unchanged");
                rings.to_vec()
            }
        }
    }

    /// `subject - clip`. Both sides may carry hole rings in the flat list.
    pub fn difference(&self, subject: &[Polygon], clip: &[Polygon]) -> Vec<Polygon> {
        if self.usable(subject).is_empty() {
            return Vec::new();
        }
        if self.usable(clip).is_empty() {
            return subject.to_vec();
        }
        let subject_mp = self.assemble(subject);
        let clip_mp = self.assemble(clip);
        match catch_unwind(AssertUnwindSafe(|| subject_mp.difference(&clip_mp))) {
            Ok(mp) => self.rings_from_geo(&mp, true),
            Err(_) => {
                warn!("clip kernel difference failed; returning empty");
                Vec::new()
            }
        }
    }

    /// `a ∩ b`; used by the boolean overlap path of the collision oracle.
    pub fn intersection(&self, a: &[Polygon], b: &[Polygon]) -> Vec<Polygon> {
        if self.usable(a).is_empty() || self.usable(b).is_empty() {
            return Vec::new();
        }
        let a_mp = self.assemble(a);
        let b_mp = self.assemble(b);
        match catch_unwind(AssertUnwindSafe(|| a_mp.intersection(&b_mp))) {
            Ok(mp) => self.rings_from_geo(&mp, true),
            Err(_) => {
                warn!("clip kernel intersection failed; returning empty");
                Vec::new()
            }
        }
    }

    /// Miter offset; positive `delta` expands, negative contracts, zero is
    /// the identity.
    pub fn offset(&self, rings: &[Polygon], delta: f64) -> Vec<Polygon> {
        if delta == 0.0 {
            return rings.to_vec();
        }
        if self.usable(rings).is_empty() {
            return Vec::new();
        }
        let mp = self.assemble(rings);
        match catch_unwind(AssertUnwindSafe(|| {
            geo_buffer::buffer_multi_polygon(&mp, delta)
        })) {
            Ok(buffered) => self.rings_from_geo(&buffered, true),
            Err(_) => {
                warn!(delta, "clip kernel offset failed; returning subject unchanged");
                rings.to_vec()
            }
        }
    }

    /// Minkowski sum of two closed rings, Clipper style: one parallelogram
    /// per (pattern edge, subject edge) pair, all unioned. The exterior rings
    /// of that union are the filled sum; for hole-free operands the filled
    /// sum itself has no holes, so only exteriors are returned.
    pub fn minkowski_sum(&self, pattern: &[Point], subject: &[Point], closed: bool) -> Vec<Polygon> {
        match self.minkowski_union(pattern, subject, closed) {
            Some(mp) => self.rings_from_geo(&mp, false),
            None => Vec::new(),
        }
    }

    /// Interior rings of the Minkowski edge-band union. For a bin as the
    /// subject this is the locus where the pattern fits strictly inside —
    /// the general inner-fit polygon.
    pub fn minkowski_interior(&self, pattern: &[Point], subject: &[Point]) -> Vec<Polygon> {
        match self.minkowski_union(pattern, subject, true) {
            Some(mp) => {
                let mut out = Vec::new();
                for poly in mp.iter() {
                    for hole in poly.interiors() {
                        let ring = self.line_string_to_ring(hole);
                        if ring.len() >= 3 && polygon_area(&ring) > MIN_RING_AREA {
                            out.push(ring);
                        }
                    }
                }
                out
            }
            None => Vec::new(),
        }
    }

    fn minkowski_union(
        &self,
        pattern: &[Point],
        subject: &[Point],
        closed: bool,
    ) -> Option<MultiPolygon<f64>> {
        if pattern.len() < 3 || subject.len() < 2 {
            return None;
        }
        let pattern: Vec<Point> = pattern.iter().map(|p| self.snap_point(p)).collect();
        let subject: Vec<Point> = subject.iter().map(|p| self.snap_point(p)).collect();

        let subject_edges = if closed {
            subject.len()
        } else {
            subject.len() - 1
        };
        let mut quads: Vec<GeoPolygon<f64>> =
            Vec::with_capacity(pattern.len() * subject_edges);
        for i in 0..pattern.len() {
            let p0 = pattern[i];
            let p1 = pattern[(i + 1) % pattern.len()];
            for j in 0..subject_edges {
                let s0 = subject[j];
                let s1 = subject[(j + 1) % subject.len()];
                let mut quad = vec![
                    Point::new(s0.x + p0.x, s0.y + p0.y),
                    Point::new(s1.x + p0.x, s1.y + p0.y),
                    Point::new(s1.x + p1.x, s1.y + p1.y),
                    Point::new(s0.x + p1.x, s0.y + p1.y),
                ];
                if crate::geometry::signed_area(&quad) < 0.0 {
                    quad.reverse();
                }
                if polygon_area(&quad) <= MIN_RING_AREA {
                    continue;
                }
                quads.push(self.ring_to_geo(&quad));
            }
        }
        if quads.is_empty() {
            return None;
        }
        match catch_unwind(AssertUnwindSafe(|| unary_union(quads.iter()))) {
            Ok(mp) => Some(mp),
            Err(_) => {
                warn!("clip kernel minkowski union failed; returning empty");
                None
            }
        }
    }
}
