//! Core library for nesting copies of an irregular polygonal design onto
//! rectangular sheets.
//!
//! - Geometry: NFP/IFP from Minkowski sums, exact concave collision oracle,
//!   fixed-grid boolean/offset kernel
//! - Strategies: grid rotation sweep, mixed-rotation lattice, NFP
//!   bottom-left fill, genetic search over order and rotation
//! - Driver: `nest` tries the portfolio per sheet and ranks sheets by
//!   utilisation; `job::spawn_nest_job` runs it off-thread with progress and
//!   cooperative cancellation.
//!
//! Quick example:
//! ```ignore
//! use sheetnest_core::prelude::*;
//! # fn main() -> sheetnest_core::Result<()> {
//! let design = Design::new("l", "L bracket", vec![vec![
//!     Point::new(0.0, 0.0), Point::new(20.0, 0.0), Point::new(20.0, 10.0),
//!     Point::new(10.0, 10.0), Point::new(10.0, 30.0), Point::new(0.0, 30.0),
//! ]])?;
//! let cfg = NestConfig::default();
//! let results = nest(&design, &sheet_presets(), &cfg, &mut JobControl::new())?;
//! println!("best sheet: {:?}", results.first().map(|r| &r.sheet.name));
//! # Ok(()) }
//! ```

pub mod clip;
pub mod collide;
pub mod config;
pub mod error;
pub mod export;
pub mod geometry;
pub mod job;
pub mod model;
pub mod nfp;
pub mod packer;
pub mod pipeline;
pub mod presets;
pub mod validate;

pub use config::*;
pub use error::*;
pub use model::*;
pub use pipeline::*;

/// Convenience prelude for common types and functions.
/// Importing `sheetnest_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::config::{GaConfig, MainPolygonRule, NestConfig, NestConfigBuilder, Strategy};
    pub use crate::error::{NestError, Result};
    pub use crate::export::{layout_to_svg, results_to_json};
    pub use crate::job::{spawn_nest_job, JobEvent, JobHandle};
    pub use crate::model::{
        BoundingBox, Design, NestingResult, Placement, Point, Polygon, SheetPreset,
    };
    pub use crate::pipeline::{nest, nest_sheet, CancelToken, JobControl, ProgressEvent};
    pub use crate::presets::{preset_by_id, sheet_presets};
    pub use crate::validate::{move_is_valid, validate_placements};
}
