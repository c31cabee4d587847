//! Exact polygon-overlap oracle. Works on concave rings, needs no kernel
//! (cold-start safe), and prefilters through bounding boxes: callers may rely
//! on "bboxes apart by more than the margin implies no collision".

use crate::clip::ClipEngine;
use crate::geometry::{
    bboxes_overlap, point_in_polygon, point_segment_distance, polygon_bbox, segments_intersect,
};
use crate::model::{Point, Polygon};

const EPS: f64 = 1e-7;

/// True when `a` and `b` overlap, or come closer than `margin` when
/// `margin > 0`.
pub fn collides(a: &[Point], b: &[Point], margin: f64) -> bool {
    if a.len() < 3 || b.len() < 3 {
        return false;
    }
    let (Some(ba), Some(bb)) = (polygon_bbox(a), polygon_bbox(b)) else {
        return false;
    };
    if !bboxes_overlap(&ba, &bb, margin) {
        return false;
    }
    if margin > 0.0 {
        min_polygon_distance(a, b) < margin
    } else {
        overlap_exact(a, b)
    }
}

/// Edge intersection or reference-vertex containment, no margin.
fn overlap_exact(a: &[Point], b: &[Point]) -> bool {
    for i in 0..a.len() {
        let a1 = a[i];
        let a2 = a[(i + 1) % a.len()];
        for j in 0..b.len() {
            let b1 = b[j];
            let b2 = b[(j + 1) % b.len()];
            if segments_intersect(a1, a2, b1, b2) {
                return true;
            }
        }
    }
    point_in_polygon(b, a[0].x, a[0].y) || point_in_polygon(a, b[0].x, b[0].y)
}

/// Minimum distance between two rings; zero when they overlap or touch.
pub fn min_polygon_distance(a: &[Point], b: &[Point]) -> f64 {
    if overlap_exact(a, b) {
        return 0.0;
    }
    let mut min = f64::INFINITY;
    for &p in a {
        for j in 0..b.len() {
            min = min.min(point_segment_distance(p, b[j], b[(j + 1) % b.len()]));
        }
    }
    for &p in b {
        for i in 0..a.len() {
            min = min.min(point_segment_distance(p, a[i], a[(i + 1) % a.len()]));
        }
    }
    min
}

/// All vertices inside the sheet shrunk by `margin` (boundary counts, with a
/// small float slack).
pub fn polygon_inside_bounds(poly: &[Point], sheet_w: f64, sheet_h: f64, margin: f64) -> bool {
    poly.iter().all(|p| {
        p.x >= margin - EPS
            && p.y >= margin - EPS
            && p.x <= sheet_w - margin + EPS
            && p.y <= sheet_h - margin + EPS
    })
}

/// Minimum over all vertices of the distance to the nearest sheet edge.
pub fn min_distance_to_bounds(poly: &[Point], sheet_w: f64, sheet_h: f64) -> f64 {
    poly.iter()
        .map(|p| {
            p.x.min(p.y)
                .min(sheet_w - p.x)
                .min(sheet_h - p.y)
        })
        .fold(f64::INFINITY, f64::min)
}

/// Sign-stable cross products over consecutive edges.
pub fn is_convex(poly: &[Point]) -> bool {
    if poly.len() < 4 {
        return poly.len() == 3;
    }
    let n = poly.len();
    let mut sign = 0.0_f64;
    for i in 0..n {
        let a = poly[i];
        let b = poly[(i + 1) % n];
        let c = poly[(i + 2) % n];
        let cross = (b.x - a.x) * (c.y - b.y) - (b.y - a.y) * (c.x - b.x);
        if cross.abs() <= EPS {
            continue;
        }
        if sign == 0.0 {
            sign = cross.signum();
        } else if cross.signum() != sign {
            return false;
        }
    }
    true
}

/// Pairwise check over an already-rendered placement set.
pub fn multi_placement_collision(rendered: &[Polygon], margin: f64) -> bool {
    for i in 0..rendered.len() {
        for j in (i + 1)..rendered.len() {
            if collides(&rendered[i], &rendered[j], margin) {
                return true;
            }
        }
    }
    false
}

/// Boolean-engine overlap path: expand each side by half the margin and test
/// whether the intersection is non-empty. Agrees with [`collides`] up to the
/// kernel grid; requires a ready kernel.
pub fn collides_clip(engine: &ClipEngine, a: &[Point], b: &[Point], margin: f64) -> bool {
    if a.len() < 3 || b.len() < 3 {
        return false;
    }
    let (Some(ba), Some(bb)) = (polygon_bbox(a), polygon_bbox(b)) else {
        return false;
    };
    if !bboxes_overlap(&ba, &bb, margin) {
        return false;
    }
    let a_rings = vec![a.to_vec()];
    let b_rings = vec![b.to_vec()];
    let a_grown = engine.offset(&a_rings, margin / 2.0);
    let b_grown = engine.offset(&b_rings, margin / 2.0);
    !engine.intersection(&a_grown, &b_grown).is_empty()
}
