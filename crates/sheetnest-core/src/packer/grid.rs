//! Rectilinear packers: a rotation sweep that tiles the design bbox on a
//! regular grid, and a two-pass mixed-rotation lattice packer that drops 0°
//! and 90° copies wherever the collision oracle allows.

use super::NestStrategy;
use crate::collide::collides;
use crate::config::MainPolygonRule;
use crate::error::Result;
use crate::model::{Design, Placement, Polygon, SheetPreset};
use crate::pipeline::JobControl;

const EPS: f64 = 1e-9;

/// Tries each quarter rotation, computes the rectilinear row/column count
/// from the rotated bbox, and lays the winner out on a regular grid with
/// `side + margin` spacing.
pub struct RotationSweepPacker {
    pub margin: f64,
}

impl NestStrategy for RotationSweepPacker {
    fn name(&self) -> &'static str {
        "grid-sweep"
    }

    fn pack(
        &mut self,
        design: &Design,
        sheet: &SheetPreset,
        ctl: &mut JobControl,
    ) -> Result<Vec<Placement>> {
        ctl.checkpoint(0.0, "grid rotation sweep")?;
        let margin = self.margin;
        let avail_w = sheet.width - 2.0 * margin;
        let avail_h = sheet.height - 2.0 * margin;
        if avail_w <= 0.0 || avail_h <= 0.0 {
            return Ok(Vec::new());
        }

        let mut best: Option<(f64, usize, usize, f64, f64)> = None;
        for rotation in [0.0, 90.0, 180.0, 270.0] {
            let (w, h) = design.rotated_dims(rotation);
            if w <= EPS || h <= EPS || w > avail_w + EPS || h > avail_h + EPS {
                continue;
            }
            let cols = ((avail_w + margin) / (w + margin)).floor() as usize;
            let rows = ((avail_h + margin) / (h + margin)).floor() as usize;
            let count = cols * rows;
            if count > 0 && best.map_or(true, |(_, bc, br, _, _)| count > bc * br) {
                best = Some((rotation, cols, rows, w, h));
            }
        }
        let Some((rotation, cols, rows, w, h)) = best else {
            return Ok(Vec::new());
        };

        let center = design.bounding_box.center();
        let mut placements = Vec::with_capacity(cols * rows);
        for row in 0..rows {
            for col in 0..cols {
                let cell_x = margin + col as f64 * (w + margin);
                let cell_y = margin + row as f64 * (h + margin);
                placements.push(Placement {
                    design_id: design.id.clone(),
                    x: cell_x - center.x + w / 2.0,
                    y: cell_y - center.y + h / 2.0,
                    rotation,
                });
            }
        }
        Ok(placements)
    }
}

/// Lattice packer that mixes 0° and 90° copies. Two passes: a coarse lattice
/// of `max(margin, min-side / 4)`, then half that to fill leftover gaps.
/// Every candidate is validated against the already-placed shapes with the
/// collision oracle, so concave designs interlock where their bboxes would
/// not.
pub struct MixedGridPacker {
    pub margin: f64,
    pub rule: MainPolygonRule,
}

impl NestStrategy for MixedGridPacker {
    fn name(&self) -> &'static str {
        "grid-mixed"
    }

    fn pack(
        &mut self,
        design: &Design,
        sheet: &SheetPreset,
        ctl: &mut JobControl,
    ) -> Result<Vec<Placement>> {
        let margin = self.margin;
        let bw = design.bounding_box.width;
        let bh = design.bounding_box.height;
        if design.polygons.is_empty() || bw <= EPS || bh <= EPS {
            return Ok(Vec::new());
        }
        let coarse = (bw.min(bh) / 4.0).max(margin).max(0.5);
        let center = design.bounding_box.center();

        let mut shapes: Vec<Polygon> = Vec::new();
        let mut placements: Vec<Placement> = Vec::new();

        for (pass, step) in [coarse, coarse / 2.0].into_iter().enumerate() {
            ctl.checkpoint(50.0 * pass as f32, "mixed-rotation grid pass")?;
            let mut y = margin;
            while y <= sheet.height - margin + EPS {
                let mut x = margin;
                while x <= sheet.width - margin + EPS {
                    for rotation in [0.0, 90.0] {
                        let (w, h) = design.rotated_dims(rotation);
                        if x + w > sheet.width - margin + EPS
                            || y + h > sheet.height - margin + EPS
                        {
                            continue;
                        }
                        let placement = Placement {
                            design_id: design.id.clone(),
                            x: x - center.x + w / 2.0,
                            y: y - center.y + h / 2.0,
                            rotation,
                        };
                        let shape = design.render_main(self.rule, &placement);
                        if shapes.iter().all(|s| !collides(&shape, s, margin)) {
                            shapes.push(shape);
                            placements.push(placement);
                            break;
                        }
                    }
                    x += step;
                }
                y += step;
            }
        }
        Ok(placements)
    }
}
