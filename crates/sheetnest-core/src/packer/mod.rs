use crate::error::Result;
use crate::geometry::rotate_point;
use crate::model::{Design, Placement, Point, SheetPreset};
use crate::pipeline::JobControl;

pub mod blf;
pub mod ga;
pub mod grid;

/// A strategy fills one sheet with copies of one design.
///
/// Implementations must commit only placements that are pairwise
/// non-colliding and inside the sheet shrunk by the configured margin;
/// `pack` returns an empty list when nothing fits.
pub trait NestStrategy {
    fn name(&self) -> &'static str;
    fn pack(
        &mut self,
        design: &Design,
        sheet: &SheetPreset,
        ctl: &mut JobControl,
    ) -> Result<Vec<Placement>>;
}

/// Upper bound on copies of a design a sheet could hold, plus slack.
pub(crate) fn max_placements(sheet_area: f64, design_area: f64) -> usize {
    if design_area <= f64::EPSILON {
        return 0;
    }
    (sheet_area / design_area).ceil() as usize + 10
}

/// Converts an NFP-frame anchor (world position of the rotated part's first
/// vertex) into the rendered-frame translation of a [`Placement`]: the
/// translation applied after rotating the design about its bbox centre.
pub(crate) fn anchor_to_render_translation(
    main_first_vertex: Point,
    design_center: Point,
    rotation: f64,
    anchor: Point,
) -> (f64, f64) {
    let r_first = rotate_point(main_first_vertex, rotation, Point::ORIGIN);
    let r_center = rotate_point(design_center, rotation, Point::ORIGIN);
    (
        anchor.x - r_first.x + r_center.x - design_center.x,
        anchor.y - r_first.y + r_center.y - design_center.y,
    )
}
