//! Deterministic bottom-left-fill placer driven by NFP/IFP reasoning.
//!
//! NFP work happens in the first-vertex-at-origin frame: the anchor of the
//! rotated part is its first vertex and `position` is the world coordinate of
//! that anchor. Committed placements are expressed in the rendered frame
//! (rotate about the design bbox centre, then translate), and every candidate
//! is re-validated there before commit so the two frames can never drift
//! apart silently.

use tracing::trace;

use super::{anchor_to_render_translation, max_placements, NestStrategy};
use crate::clip::ClipEngine;
use crate::collide::{collides, polygon_inside_bounds};
use crate::config::{MainPolygonRule, NestConfig};
use crate::error::Result;
use crate::geometry::{
    normalize_to_first_vertex, point_in_polygon, polygon_area, polygon_bbox, rotate_polygon,
    translate_polygon,
};
use crate::model::{BoundingBox, Design, Placement, Point, Polygon, SheetPreset};
use crate::nfp::{inner_fit_rect, no_fit_polygon, shape_fingerprint, NfpCache, NfpKey};
use crate::pipeline::JobControl;

const EPS: f64 = 1e-9;
/// Adaptive-grid target: keep candidate lattices around this many points.
const TARGET_CANDIDATES: f64 = 1e5;
/// Lattices finer than a tenth of a millimetre outresolve the clip kernel.
const MIN_GRID_STEP: f64 = 0.1;

/// How the placement loop picks rotations per iteration.
pub enum RotationPlan<'a> {
    /// Try every rotation, keep the overall bottom-left winner (BLF proper).
    Sweep(&'a [f64]),
    /// Iteration `i` uses `seq[i % len]` only (GA fitness evaluation).
    Sequence(&'a [f64]),
}

/// Result of one placement run.
#[derive(Debug, Clone)]
pub struct BlfOutcome {
    pub placements: Vec<Placement>,
    /// Input indices that could not be placed; always empty for
    /// single-design nesting.
    pub unplaced: Vec<usize>,
    pub efficiency: f64,
}

pub struct BlfPacker {
    margin: f64,
    rotations: Vec<f64>,
    grid_step: Option<f64>,
    rule: MainPolygonRule,
}

impl BlfPacker {
    pub fn from_config(cfg: &NestConfig) -> Self {
        Self {
            margin: cfg.margin,
            rotations: cfg.allowed_rotations(),
            grid_step: cfg.grid_step,
            rule: cfg.main_polygon,
        }
    }

    pub fn run(
        &self,
        design: &Design,
        sheet: &SheetPreset,
        ctl: &mut JobControl,
    ) -> Result<BlfOutcome> {
        place_all(
            design,
            sheet,
            self.margin,
            self.grid_step,
            self.rule,
            RotationPlan::Sweep(&self.rotations),
            ctl,
        )
    }
}

impl NestStrategy for BlfPacker {
    fn name(&self) -> &'static str {
        "nfp-blf"
    }

    fn pack(
        &mut self,
        design: &Design,
        sheet: &SheetPreset,
        ctl: &mut JobControl,
    ) -> Result<Vec<Placement>> {
        self.run(design, sheet, ctl).map(|o| o.placements)
    }
}

struct PlacedPart {
    /// Origin-anchored rotated ring, for NFP generation.
    norm: Polygon,
    /// World position of the anchor (first vertex).
    position: Point,
    rotation: f64,
    /// Rendered-frame ring, for the final collision oracle.
    rendered: Polygon,
}

/// The shared placement loop behind both the BLF strategy and the GA fitness
/// evaluator.
pub fn place_all(
    design: &Design,
    sheet: &SheetPreset,
    margin: f64,
    grid_step: Option<f64>,
    rule: MainPolygonRule,
    plan: RotationPlan<'_>,
    ctl: &mut JobControl,
) -> Result<BlfOutcome> {
    let sheet_area = sheet.area();
    let empty = |placements: Vec<Placement>| {
        let efficiency = if sheet_area > 0.0 {
            100.0 * placements.len() as f64 * design.area / sheet_area
        } else {
            0.0
        };
        BlfOutcome {
            placements,
            unplaced: Vec::new(),
            efficiency,
        }
    };

    if design.polygons.is_empty() {
        return Ok(empty(Vec::new()));
    }
    let main = design.main_polygon(rule).clone();
    if main.len() < 3 || polygon_area(&main) <= f64::EPSILON {
        return Ok(empty(Vec::new()));
    }
    let effective = BoundingBox::new(
        margin,
        margin,
        sheet.width - 2.0 * margin,
        sheet.height - 2.0 * margin,
    );
    if effective.width < -EPS || effective.height < -EPS {
        return Ok(empty(Vec::new()));
    }

    let engine = ClipEngine::new();
    let mut cache = NfpCache::new();
    let design_center = design.bounding_box.center();
    let cap = max_placements(sheet_area, design.area);
    let attempt_budget = 2 * cap;
    let base_step = grid_step.unwrap_or(margin);

    let mut placed: Vec<PlacedPart> = Vec::new();
    let mut placements: Vec<Placement> = Vec::new();
    let mut attempts = 0usize;

    while placements.len() < cap && attempts < attempt_budget {
        ctl.checkpoint(
            100.0 * placements.len() as f32 / cap.max(1) as f32,
            "placing part",
        )?;

        let sweep;
        let rotations: &[f64] = match &plan {
            RotationPlan::Sweep(rots) => *rots,
            RotationPlan::Sequence(seq) => {
                sweep = [seq[placements.len() % seq.len()]];
                &sweep
            }
        };

        let mut best: Option<(Point, f64, Polygon)> = None;
        for &rotation in rotations {
            let rotated =
                normalize_to_first_vertex(&rotate_polygon(&main, rotation, Point::ORIGIN));
            let Some(candidate) = candidate_for_rotation(
                &engine,
                &mut cache,
                &placed,
                &rotated,
                rotation,
                &effective,
                margin,
                base_step,
            ) else {
                continue;
            };
            let better = match &best {
                None => true,
                Some((b, _, _)) => {
                    candidate.y < b.y - EPS
                        || (candidate.y < b.y + EPS && candidate.x < b.x - EPS)
                }
            };
            if better {
                best = Some((candidate, rotation, rotated));
            }
        }

        let Some((anchor, rotation, rotated)) = best else {
            break; // no rotation produced a candidate: the sheet is full
        };
        attempts += 1;

        let (tx, ty) =
            anchor_to_render_translation(main[0], design_center, rotation, anchor);
        let placement = Placement {
            design_id: design.id.clone(),
            x: tx,
            y: ty,
            rotation,
        };
        let rendered = design.render_main(rule, &placement);
        let inside = polygon_inside_bounds(&rendered, sheet.width, sheet.height, margin);
        let clear = placed
            .iter()
            .all(|p| !collides(&rendered, &p.rendered, 0.0));
        if !inside || !clear {
            trace!(
                ?anchor,
                rotation,
                inside,
                clear,
                "candidate failed rendered-frame validation"
            );
            continue;
        }

        placed.push(PlacedPart {
            norm: rotated,
            position: anchor,
            rotation,
            rendered,
        });
        placements.push(placement);
    }

    Ok(empty(placements))
}

/// Best (bottom-left) anchor for one rotation, or None when the rotation has
/// no valid area on this sheet.
#[allow(clippy::too_many_arguments)]
fn candidate_for_rotation(
    engine: &ClipEngine,
    cache: &mut NfpCache,
    placed: &[PlacedPart],
    rotated: &Polygon,
    rotation: f64,
    effective: &BoundingBox,
    margin: f64,
    base_step: f64,
) -> Option<Point> {
    let ifp = inner_fit_rect(effective, rotated)?;
    let ifp_bb = polygon_bbox(&ifp)?;

    let mut all_nfps: Vec<Polygon> = Vec::new();
    let rotated_fp = shape_fingerprint(rotated);
    for part in placed {
        let key = NfpKey::new(
            shape_fingerprint(&part.norm),
            rotated_fp.clone(),
            part.rotation,
            rotation,
            false,
        );
        let nfp = cache.get_or_insert_with(key, || no_fit_polygon(engine, &part.norm, rotated));
        for ring in nfp {
            all_nfps.push(translate_polygon(ring, part.position.x, part.position.y));
        }
    }

    if all_nfps.is_empty() {
        return bottom_left_candidate(std::slice::from_ref(&ifp), base_step);
    }

    let unioned = engine.union(&all_nfps);
    let blocked = if margin > 0.0 {
        engine.offset(&unioned, margin)
    } else {
        unioned
    };

    // Exact fit: the IFP collapses to a segment or point, which the boolean
    // kernel cannot subtract from. Probe its corners directly.
    if ifp_bb.width < EPS || ifp_bb.height < EPS {
        let mut best: Option<Point> = None;
        for &corner in &ifp {
            if inside_even_odd(&blocked, corner) {
                continue;
            }
            consider(&mut best, corner);
        }
        return best;
    }

    let valid = engine.difference(std::slice::from_ref(&ifp), &blocked);
    if valid.is_empty() {
        return None; // numeric edge or fully blocked: skip this rotation
    }
    bottom_left_candidate(&valid, base_step)
}

fn inside_even_odd(rings: &[Polygon], p: Point) -> bool {
    rings
        .iter()
        .filter(|r| point_in_polygon(r, p.x, p.y))
        .count()
        % 2
        == 1
}

fn consider(best: &mut Option<Point>, p: Point) {
    let better = match best {
        None => true,
        Some(b) => p.y < b.y - EPS || (p.y < b.y + EPS && p.x < b.x - EPS),
    };
    if better {
        *best = Some(p);
    }
}

/// Bottom-left candidate over the valid-area rings: every ring vertex plus an
/// adaptive lattice. Rows are scanned upward and the scan stops once no row
/// can beat the current best, which keeps the lattice cost proportional to
/// how far up the first free spot sits.
fn bottom_left_candidate(valid: &[Polygon], base_step: f64) -> Option<Point> {
    let first_bb = polygon_bbox(valid.first()?)?;
    let step = (first_bb.area() / TARGET_CANDIDATES)
        .sqrt()
        .max(base_step)
        .max(MIN_GRID_STEP);

    let mut best: Option<Point> = None;
    for ring in valid {
        for &v in ring {
            consider(&mut best, v);
        }
    }

    for ring in valid {
        let Some(bb) = polygon_bbox(ring) else {
            continue;
        };
        let mut y = bb.y;
        while y <= bb.max_y() + EPS {
            if let Some(b) = best {
                if y > b.y + EPS {
                    break;
                }
            }
            let mut x = bb.x;
            while x <= bb.max_x() + EPS {
                if inside_even_odd(valid, Point::new(x, y)) {
                    consider(&mut best, Point::new(x, y));
                    break; // first hit in the row is the row's min-x
                }
                x += step;
            }
            y += step;
        }
    }
    best
}
