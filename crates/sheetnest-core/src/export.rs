//! Result exporters: JSON metadata for tooling and an SVG rendering of one
//! sheet layout for eyeballing.

use crate::error::{NestError, Result};
use crate::model::{Design, NestingResult};

/// Pretty JSON of the ranked results.
pub fn results_to_json(results: &[NestingResult]) -> Result<String> {
    serde_json::to_string_pretty(results).map_err(|e| NestError::Encode(e.to_string()))
}

/// SVG document of one sheet: the sheet outline plus every rendered
/// placement as outlined polygons.
pub fn layout_to_svg(design: &Design, result: &NestingResult) -> String {
    let width = result.sheet.width;
    let height = result.sheet.height;
    let mut body = String::new();
    body.push_str(&format!(
        "<rect x=\"0\" y=\"0\" width=\"{width}\" height=\"{height}\" fill=\"none\" stroke=\"#1565c0\" stroke-width=\"0.5\"/>\n"
    ));
    for placement in &result.placements {
        for ring in design.render_placement(placement) {
            let points: Vec<String> = ring
                .iter()
                .map(|p| format!("{:.3},{:.3}", p.x, p.y))
                .collect();
            body.push_str(&format!(
                "<polygon points=\"{}\" fill=\"#e3f2fd\" stroke=\"#0d47a1\" stroke-width=\"0.4\"/>\n",
                points.join(" ")
            ));
        }
    }
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {width} {height}\" width=\"{width}mm\" height=\"{height}mm\">\n{body}</svg>\n"
    )
}
