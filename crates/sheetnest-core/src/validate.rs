//! Validation of user-edited placement lists: hard sheet bounds plus
//! pairwise margin clearance, reported as human-readable messages with
//! 1-based placement indices.

use crate::collide::{collides, polygon_inside_bounds};
use crate::config::MainPolygonRule;
use crate::model::{Design, Placement, Polygon, SheetPreset};

/// Checks every placement against the sheet (hard bounds, margin 0) and each
/// pair for margin clearance. An empty result means the layout is valid.
pub fn validate_placements(
    design: &Design,
    sheet: &SheetPreset,
    margin: f64,
    rule: MainPolygonRule,
    placements: &[Placement],
) -> Vec<String> {
    let mut errors = Vec::new();
    if design.polygons.is_empty() {
        return errors;
    }

    for (i, placement) in placements.iter().enumerate() {
        let rings = design.render_placement(placement);
        if !rings
            .iter()
            .all(|ring| polygon_inside_bounds(ring, sheet.width, sheet.height, 0.0))
        {
            errors.push(format!("placement {} is outside the sheet", i + 1));
        }
    }

    let shapes: Vec<Polygon> = placements
        .iter()
        .map(|placement| design.render_main(rule, placement))
        .collect();
    for i in 0..shapes.len() {
        for j in (i + 1)..shapes.len() {
            if collides(&shapes[i], &shapes[j], margin) {
                errors.push(format!("placements {} and {} collide", i + 1, j + 1));
            }
        }
    }
    errors
}

/// Drag-time predicate: would moving placement `index` to `(x, y)` keep the
/// layout valid? Bounds are checked with the full margin here, so a part
/// being dragged never commits closer to the edge than a fresh placement
/// could.
pub fn move_is_valid(
    design: &Design,
    sheet: &SheetPreset,
    margin: f64,
    rule: MainPolygonRule,
    placements: &[Placement],
    index: usize,
    x: f64,
    y: f64,
) -> bool {
    if design.polygons.is_empty() {
        return false;
    }
    let Some(current) = placements.get(index) else {
        return false;
    };
    let moved = Placement {
        x,
        y,
        ..current.clone()
    };
    let shape = design.render_main(rule, &moved);
    if !polygon_inside_bounds(&shape, sheet.width, sheet.height, margin) {
        return false;
    }
    placements
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != index)
        .all(|(_, other)| !collides(&shape, &design.render_main(rule, other), margin))
}
