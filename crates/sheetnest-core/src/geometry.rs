//! Plain-float geometry primitives. Everything here works on simple rings
//! (`&[Point]`) and returns fresh vectors; the fixed-precision boolean kernel
//! lives in [`crate::clip`].

use crate::model::{BoundingBox, Point, Polygon};

/// Rotates `p` by `degrees` counter-clockwise about `center`.
pub fn rotate_point(p: Point, degrees: f64, center: Point) -> Point {
    let rad = degrees.to_radians();
    let (sin, cos) = rad.sin_cos();
    let dx = p.x - center.x;
    let dy = p.y - center.y;
    Point::new(
        center.x + dx * cos - dy * sin,
        center.y + dx * sin + dy * cos,
    )
}

pub fn rotate_polygon(poly: &[Point], degrees: f64, center: Point) -> Polygon {
    poly.iter()
        .map(|&p| rotate_point(p, degrees, center))
        .collect()
}

pub fn translate_polygon(poly: &[Point], dx: f64, dy: f64) -> Polygon {
    poly.iter()
        .map(|p| Point::new(p.x + dx, p.y + dy))
        .collect()
}

/// Arithmetic mean of the vertices.
pub fn centroid(poly: &[Point]) -> Point {
    if poly.is_empty() {
        return Point::ORIGIN;
    }
    let n = poly.len() as f64;
    let (sx, sy) = poly
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Point::new(sx / n, sy / n)
}

pub fn polygon_bbox(poly: &[Point]) -> Option<BoundingBox> {
    let first = poly.first()?;
    let mut min_x = first.x;
    let mut min_y = first.y;
    let mut max_x = first.x;
    let mut max_y = first.y;
    for p in &poly[1..] {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    Some(BoundingBox::new(min_x, min_y, max_x - min_x, max_y - min_y))
}

pub fn polygons_bbox(polys: &[Polygon]) -> Option<BoundingBox> {
    let mut acc: Option<BoundingBox> = None;
    for poly in polys {
        let Some(bb) = polygon_bbox(poly) else {
            continue;
        };
        acc = Some(match acc {
            None => bb,
            Some(a) => {
                let min_x = a.x.min(bb.x);
                let min_y = a.y.min(bb.y);
                let max_x = a.max_x().max(bb.max_x());
                let max_y = a.max_y().max(bb.max_y());
                BoundingBox::new(min_x, min_y, max_x - min_x, max_y - min_y)
            }
        });
    }
    acc
}

/// Shoelace area with sign; positive for counter-clockwise winding.
pub fn signed_area(poly: &[Point]) -> f64 {
    if poly.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..poly.len() {
        let a = poly[i];
        let b = poly[(i + 1) % poly.len()];
        sum += a.x * b.y - b.x * a.y;
    }
    sum / 2.0
}

/// Absolute shoelace area.
pub fn polygon_area(poly: &[Point]) -> f64 {
    signed_area(poly).abs()
}

/// Ray-cast point-in-polygon with the half-open rule
/// `(yi > py) != (yj > py)`, so horizontal edges are never counted twice.
pub fn point_in_polygon(poly: &[Point], x: f64, y: f64) -> bool {
    if poly.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = poly.len() - 1;
    for i in 0..poly.len() {
        let pi = poly[i];
        let pj = poly[j];
        if (pi.y > y) != (pj.y > y) {
            let x_cross = (pj.x - pi.x) * (y - pi.y) / (pj.y - pi.y) + pi.x;
            if x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Distance from `p` to the closed segment `a..b`.
pub fn point_segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len2 = dx * dx + dy * dy;
    if len2 <= f64::EPSILON {
        return ((p.x - a.x).powi(2) + (p.y - a.y).powi(2)).sqrt();
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len2).clamp(0.0, 1.0);
    let cx = a.x + t * dx;
    let cy = a.y + t * dy;
    ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt()
}

fn orient(a: Point, b: Point, c: Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

fn on_segment(a: Point, b: Point, p: Point) -> bool {
    p.x >= a.x.min(b.x) - f64::EPSILON
        && p.x <= a.x.max(b.x) + f64::EPSILON
        && p.y >= a.y.min(b.y) - f64::EPSILON
        && p.y <= a.y.max(b.y) + f64::EPSILON
}

/// True when segments `a1..a2` and `b1..b2` share at least one point,
/// touching endpoints and collinear overlap included.
pub fn segments_intersect(a1: Point, a2: Point, b1: Point, b2: Point) -> bool {
    let d1 = orient(b1, b2, a1);
    let d2 = orient(b1, b2, a2);
    let d3 = orient(a1, a2, b1);
    let d4 = orient(a1, a2, b2);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }
    (d1.abs() <= f64::EPSILON && on_segment(b1, b2, a1))
        || (d2.abs() <= f64::EPSILON && on_segment(b1, b2, a2))
        || (d3.abs() <= f64::EPSILON && on_segment(a1, a2, b1))
        || (d4.abs() <= f64::EPSILON && on_segment(a1, a2, b2))
}

/// True when the boxes, each grown by `margin`, overlap or touch.
pub fn bboxes_overlap(a: &BoundingBox, b: &BoundingBox, margin: f64) -> bool {
    let a = a.expand(margin);
    !(a.max_x() < b.x || b.max_x() < a.x || a.max_y() < b.y || b.max_y() < a.y)
}

/// Shifts the ring so its first vertex sits on the origin (NFP anchor frame).
pub fn normalize_to_first_vertex(poly: &[Point]) -> Polygon {
    match poly.first() {
        Some(&first) => translate_polygon(poly, -first.x, -first.y),
        None => Vec::new(),
    }
}

/// Shifts the ring so its bbox min sits on the origin (ingestion frame).
/// Not interchangeable with [`normalize_to_first_vertex`].
pub fn normalize_to_bbox_origin(poly: &[Point]) -> Polygon {
    match polygon_bbox(poly) {
        Some(bb) => translate_polygon(poly, -bb.x, -bb.y),
        None => Vec::new(),
    }
}
