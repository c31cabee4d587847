//! Nesting driver: runs the strategy portfolio per sheet, keeps the best
//! layout, and ranks sheets by utilisation. Cancellation is cooperative and
//! observed only at suspension points — between sheets, between GA
//! generations, and between BLF placements.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::collide::min_distance_to_bounds;
use crate::config::{NestConfig, Strategy};
use crate::error::{NestError, Result};
use crate::geometry::polygon_area;
use crate::model::{Design, NestingResult, Placement, SheetPreset};
use crate::packer::blf::BlfPacker;
use crate::packer::ga::GaPacker;
use crate::packer::grid::{MixedGridPacker, RotationSweepPacker};
use crate::packer::NestStrategy;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// A layout triggers the warning flag when any placement sits closer than
/// this to a sheet edge.
pub const EDGE_WARNING_MM: f64 = 3.0;

/// Shared cancel flag; cloning hands out another observer of the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Advisory progress report; the controller may coalesce these.
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub percent: f32,
    pub message: String,
}

/// Cancellation observer plus optional progress sink, threaded through every
/// suspension point of a nesting job.
pub struct JobControl {
    cancel: CancelToken,
    progress: Option<Box<dyn FnMut(ProgressEvent) + Send>>,
}

impl Default for JobControl {
    fn default() -> Self {
        Self::new()
    }
}

impl JobControl {
    pub fn new() -> Self {
        Self {
            cancel: CancelToken::new(),
            progress: None,
        }
    }

    pub fn with_cancel(cancel: CancelToken) -> Self {
        Self {
            cancel,
            progress: None,
        }
    }

    pub fn on_progress(mut self, callback: impl FnMut(ProgressEvent) + Send + 'static) -> Self {
        self.progress = Some(Box::new(callback));
        self
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Suspension point: observes the cancel flag, then reports progress.
    pub fn checkpoint(&mut self, percent: f32, message: &str) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(NestError::Cancelled);
        }
        if let Some(callback) = &mut self.progress {
            callback(ProgressEvent {
                percent: percent.clamp(0.0, 100.0),
                message: message.to_string(),
            });
        }
        Ok(())
    }
}

/// Nests `design` onto every sheet and returns the layouts ranked by
/// descending efficiency. Sheets that hold no copy at all are omitted, not
/// errors. Degenerate designs short-circuit to an empty ranking.
#[instrument(skip_all)]
pub fn nest(
    design: &Design,
    sheets: &[SheetPreset],
    cfg: &NestConfig,
    ctl: &mut JobControl,
) -> Result<Vec<NestingResult>> {
    cfg.validate()?;
    if design_is_degenerate(design, cfg) {
        debug!(design = %design.id, "degenerate design; nothing to place");
        return Ok(Vec::new());
    }

    #[cfg(feature = "parallel")]
    if cfg.parallel {
        let cancel = ctl.cancel_token();
        let outcomes: Vec<Result<Option<NestingResult>>> = sheets
            .par_iter()
            .map(|sheet| {
                let mut sheet_ctl = JobControl::with_cancel(cancel.clone());
                nest_sheet(design, sheet, cfg, &mut sheet_ctl)
            })
            .collect();
        let mut results = Vec::new();
        for outcome in outcomes {
            if let Some(result) = outcome? {
                results.push(result);
            }
        }
        rank(&mut results);
        return Ok(results);
    }

    let mut results = Vec::new();
    for (index, sheet) in sheets.iter().enumerate() {
        ctl.checkpoint(
            100.0 * index as f32 / sheets.len().max(1) as f32,
            &format!("nesting onto {}", sheet.name),
        )?;
        if let Some(result) = nest_sheet(design, sheet, cfg, ctl)? {
            results.push(result);
        }
    }
    ctl.checkpoint(100.0, "ranking sheets")?;
    rank(&mut results);
    Ok(results)
}

/// Runs the configured strategy portfolio on one sheet and keeps the variant
/// with the most placements; ties go to the variant that ran first.
pub fn nest_sheet(
    design: &Design,
    sheet: &SheetPreset,
    cfg: &NestConfig,
    ctl: &mut JobControl,
) -> Result<Option<NestingResult>> {
    if design_is_degenerate(design, cfg) {
        return Ok(None);
    }
    let mut strategies: Vec<Box<dyn NestStrategy>> = vec![
        Box::new(RotationSweepPacker { margin: cfg.margin }),
        Box::new(MixedGridPacker {
            margin: cfg.margin,
            rule: cfg.main_polygon,
        }),
    ];
    if cfg.algorithm != Strategy::Fast {
        strategies.push(Box::new(BlfPacker::from_config(cfg)));
    }
    if cfg.algorithm == Strategy::NfpGa {
        strategies.push(Box::new(GaPacker::from_config(cfg)));
    }

    let mut best: Vec<Placement> = Vec::new();
    let mut winner = "";
    for mut strategy in strategies {
        match strategy.pack(design, sheet, ctl) {
            Ok(placements) => {
                debug!(
                    strategy = strategy.name(),
                    count = placements.len(),
                    sheet = %sheet.name,
                    "strategy finished"
                );
                if placements.len() > best.len() {
                    best = placements;
                    winner = strategy.name();
                }
            }
            Err(NestError::Cancelled) => return Err(NestError::Cancelled),
            Err(err) => {
                // KernelUnavailable and friends disable one variant, never
                // the whole sheet.
                warn!(strategy = strategy.name(), %err, "strategy failed; skipping variant");
            }
        }
    }

    if best.is_empty() {
        return Ok(None);
    }
    debug!(winner, count = best.len(), sheet = %sheet.name, "layout selected");

    let edge_warning = best.iter().any(|placement| {
        design
            .render_placement(placement)
            .iter()
            .any(|ring| min_distance_to_bounds(ring, sheet.width, sheet.height) < EDGE_WARNING_MM)
    });
    Ok(Some(NestingResult::from_placements(
        design,
        sheet,
        best,
        edge_warning,
    )))
}

fn design_is_degenerate(design: &Design, cfg: &NestConfig) -> bool {
    if design.polygons.is_empty() || design.area <= f64::EPSILON {
        return true;
    }
    let main = design.main_polygon(cfg.main_polygon);
    main.len() < 3 || polygon_area(main) <= f64::EPSILON
}

fn rank(results: &mut [NestingResult]) {
    results.sort_by(|a, b| {
        b.efficiency
            .partial_cmp(&a.efficiency)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}
