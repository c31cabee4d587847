//! No-Fit and Inner-Fit Polygon construction, plus the per-job cache.
//!
//! Contract: with the moving part anchored at its first vertex, placing that
//! anchor strictly inside `NFP(A, B)` makes A and B overlap, strictly outside
//! keeps them disjoint, and on the boundary they touch.

use std::collections::HashMap;

use crate::clip::ClipEngine;
use crate::geometry::{normalize_to_first_vertex, polygon_area, polygon_bbox};
use crate::model::{BoundingBox, Point, Polygon};

const EPS: f64 = 1e-9;

/// Cheap structural fingerprint: vertex count plus centi-area. Collision
/// prone across similar designs, which is why cache keys also carry both
/// rotations and the inside flag, and why the cache lives for one job only.
pub fn shape_fingerprint(poly: &[Point]) -> String {
    format!(
        "p{}_a{}",
        poly.len(),
        (100.0 * polygon_area(poly)).round() as i64
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NfpKey {
    shape_a: String,
    shape_b: String,
    rot_a_centi: i64,
    rot_b_centi: i64,
    inside: bool,
}

impl NfpKey {
    pub fn new(shape_a: String, shape_b: String, rot_a: f64, rot_b: f64, inside: bool) -> Self {
        Self {
            shape_a,
            shape_b,
            rot_a_centi: (rot_a * 100.0).round() as i64,
            rot_b_centi: (rot_b * 100.0).round() as i64,
            inside,
        }
    }
}

/// Single-writer NFP cache, owned by one placer run. Not thread-safe by
/// design; parallel search must partition by placer instance.
#[derive(Debug, Default)]
pub struct NfpCache {
    map: HashMap<NfpKey, Vec<Polygon>>,
}

impl NfpCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }

    pub fn get_or_insert_with(
        &mut self,
        key: NfpKey,
        compute: impl FnOnce() -> Vec<Polygon>,
    ) -> &Vec<Polygon> {
        self.map.entry(key).or_insert_with(compute)
    }
}

/// `NFP(A, B) = A ⊕ (−B)` with B first translated so its anchor is the
/// origin. Empty on degenerate input or kernel failure.
pub fn no_fit_polygon(engine: &ClipEngine, fixed: &[Point], moving: &[Point]) -> Vec<Polygon> {
    if fixed.len() < 3 || moving.len() < 3 {
        return Vec::new();
    }
    let anchored = normalize_to_first_vertex(moving);
    let negated: Polygon = anchored.iter().map(|p| Point::new(-p.x, -p.y)).collect();
    engine.minkowski_sum(&negated, fixed, true)
}

/// Closed-form inner fit for an axis-aligned rectangular bin. Returns the
/// rectangle of anchor positions at which the part fits inside `bounds`, or
/// `None` when the part cannot fit at all. The rectangle may be degenerate
/// (zero width and/or height) for an exact fit.
pub fn inner_fit_rect(bounds: &BoundingBox, moving: &[Point]) -> Option<Polygon> {
    if moving.len() < 3 {
        return None;
    }
    let bb = polygon_bbox(moving)?;
    let anchor = moving[0];
    let off_left = anchor.x - bb.x;
    let off_right = bb.max_x() - anchor.x;
    let off_top = anchor.y - bb.y;
    let off_bottom = bb.max_y() - anchor.y;

    let x1 = bounds.x + off_left;
    let x2 = bounds.x + bounds.width - off_right;
    let y1 = bounds.y + off_top;
    let y2 = bounds.y + bounds.height - off_bottom;
    if x2 - x1 < -EPS || y2 - y1 < -EPS {
        return None;
    }
    let x2 = x2.max(x1);
    let y2 = y2.max(y1);
    Some(vec![
        Point::new(x1, y1),
        Point::new(x2, y1),
        Point::new(x2, y2),
        Point::new(x1, y2),
    ])
}

/// General Minkowski-based inner fit for an arbitrary bin polygon: the
/// interior rings of `bin ⊕ (−B)` are the anchor positions where B sits
/// strictly inside the bin. Only exercised on rectangles in practice; the
/// closed form above is authoritative there.
pub fn inner_fit_polygon(engine: &ClipEngine, bin: &[Point], moving: &[Point]) -> Vec<Polygon> {
    if bin.len() < 3 || moving.len() < 3 {
        return Vec::new();
    }
    let anchored = normalize_to_first_vertex(moving);
    let negated: Polygon = anchored.iter().map(|p| Point::new(-p.x, -p.y)).collect();
    engine.minkowski_interior(&negated, bin)
}
