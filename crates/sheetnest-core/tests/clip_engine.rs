use sheetnest_core::clip::{ClipEngine, CLIP_SCALE};
use sheetnest_core::geometry::{polygon_area, polygon_bbox};
use sheetnest_core::model::{Point, Polygon};

fn square(origin_x: f64, origin_y: f64, side: f64) -> Polygon {
    vec![
        Point::new(origin_x, origin_y),
        Point::new(origin_x + side, origin_y),
        Point::new(origin_x + side, origin_y + side),
        Point::new(origin_x, origin_y + side),
    ]
}

#[test]
fn engine_is_ready_from_construction() {
    assert!(ClipEngine::new().is_ready());
}

#[test]
fn union_merges_overlapping_rings() {
    let engine = ClipEngine::new();
    let merged = engine.union(&[square(0.0, 0.0, 10.0), square(5.0, 0.0, 10.0)]);
    assert_eq!(merged.len(), 1);
    assert!((polygon_area(&merged[0]) - 150.0).abs() < 1e-3);
}

#[test]
fn union_keeps_disjoint_rings_apart() {
    let engine = ClipEngine::new();
    let out = engine.union(&[square(0.0, 0.0, 10.0), square(30.0, 0.0, 10.0)]);
    assert_eq!(out.len(), 2);
}

#[test]
fn union_of_empty_input_is_empty() {
    let engine = ClipEngine::new();
    assert!(engine.union(&[]).is_empty());
}

#[test]
fn difference_cuts_a_hole() {
    let engine = ClipEngine::new();
    let outer = vec![square(0.0, 0.0, 10.0)];
    let inner = vec![square(2.0, 2.0, 6.0)];
    let rings = engine.difference(&outer, &inner);
    // One outer ring plus one hole ring in the flat list.
    assert_eq!(rings.len(), 2);
    let mut areas: Vec<f64> = rings.iter().map(|r| polygon_area(r)).collect();
    areas.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert!((areas[0] - 36.0).abs() < 1e-3);
    assert!((areas[1] - 100.0).abs() < 1e-3);
}

#[test]
fn difference_with_empty_clip_returns_subject() {
    let engine = ClipEngine::new();
    let subject = vec![square(0.0, 0.0, 10.0)];
    assert_eq!(engine.difference(&subject, &[]), subject);
}

#[test]
fn difference_respects_hole_rings_in_the_clip() {
    let engine = ClipEngine::new();
    // Clip = ring with a hole: subtracting it from a large subject must keep
    // the material inside the hole.
    let subject = vec![square(0.0, 0.0, 30.0)];
    let clip = vec![square(5.0, 5.0, 20.0), square(10.0, 10.0, 10.0)];
    let rings = engine.difference(&subject, &clip);
    let total: f64 = {
        // even-odd accounting: outer areas minus hole areas
        let mut outer = 0.0;
        let mut hole = 0.0;
        for r in &rings {
            let probe = r[0];
            let depth = rings
                .iter()
                .filter(|other| {
                    !std::ptr::eq(*other, r)
                        && sheetnest_core::geometry::point_in_polygon(other, probe.x, probe.y)
                })
                .count();
            if depth % 2 == 0 {
                outer += polygon_area(r);
            } else {
                hole += polygon_area(r);
            }
        }
        outer - hole
    };
    // 900 total, minus the 400 annulus (20^2 - 10^2), keeping the 100 island.
    assert!((total - 600.0).abs() < 1e-2, "kept area {total}");
}

#[test]
fn offset_expands_and_contracts() {
    let engine = ClipEngine::new();
    let rings = vec![square(0.0, 0.0, 10.0)];

    let grown = engine.offset(&rings, 2.0);
    assert_eq!(grown.len(), 1);
    // Exactly 196 with miter corners; a shade less if the kernel bevels.
    let area = polygon_area(&grown[0]);
    assert!((192.0..=196.5).contains(&area), "grown area {area}");
    let bb = polygon_bbox(&grown[0]).unwrap();
    assert!((bb.x + 2.0).abs() < 1e-3 && (bb.y + 2.0).abs() < 1e-3);

    let shrunk = engine.offset(&rings, -2.0);
    assert_eq!(shrunk.len(), 1);
    assert!((polygon_area(&shrunk[0]) - 36.0).abs() < 1e-2);
}

#[test]
fn minkowski_sum_of_squares() {
    let engine = ClipEngine::new();
    // Pattern centred on the origin, subject a 10 mm square: the sum is a
    // 12 mm square spanning [-1, 11].
    let pattern = vec![
        Point::new(-1.0, -1.0),
        Point::new(1.0, -1.0),
        Point::new(1.0, 1.0),
        Point::new(-1.0, 1.0),
    ];
    let sum = engine.minkowski_sum(&pattern, &square(0.0, 0.0, 10.0), true);
    assert_eq!(sum.len(), 1);
    let bb = polygon_bbox(&sum[0]).unwrap();
    assert!((bb.x + 1.0).abs() < 1e-3);
    assert!((bb.y + 1.0).abs() < 1e-3);
    assert!((bb.max_x() - 11.0).abs() < 1e-3);
    assert!((bb.max_y() - 11.0).abs() < 1e-3);
}

#[test]
fn minkowski_rejects_degenerate_operands() {
    let engine = ClipEngine::new();
    let line = vec![Point::new(0.0, 0.0), Point::new(5.0, 0.0)];
    assert!(engine.minkowski_sum(&line, &square(0.0, 0.0, 10.0), true).is_empty());
}

#[test]
fn coordinates_snap_to_the_kernel_grid() {
    let engine = ClipEngine::new();
    let jittered = vec![square(0.00012, 0.00049, 10.0)];
    let out = engine.union(&[jittered[0].clone(), square(5.0, 0.0, 10.0)]);
    for ring in &out {
        for p in ring {
            let gx = p.x * CLIP_SCALE;
            let gy = p.y * CLIP_SCALE;
            assert!((gx - gx.round()).abs() < 1e-6, "x {} off grid", p.x);
            assert!((gy - gy.round()).abs() < 1e-6, "y {} off grid", p.y);
        }
    }
}
