use sheetnest_core::collide::multi_placement_collision;
use sheetnest_core::collide::polygon_inside_bounds;
use sheetnest_core::config::NestConfig;
use sheetnest_core::model::{Design, Point, SheetPreset};
use sheetnest_core::packer::blf::BlfPacker;
use sheetnest_core::pipeline::JobControl;

fn ring(points: &[(f64, f64)]) -> Vec<Point> {
    points.iter().map(|&(x, y)| Point::new(x, y)).collect()
}

fn l_design_small() -> Design {
    Design::new(
        "l-small",
        "L 20x30",
        vec![ring(&[
            (0.0, 0.0),
            (20.0, 0.0),
            (20.0, 10.0),
            (10.0, 10.0),
            (10.0, 30.0),
            (0.0, 30.0),
        ])],
    )
    .unwrap()
}

fn run_blf(design: &Design, sheet: &SheetPreset, cfg: &NestConfig) -> sheetnest_core::packer::blf::BlfOutcome {
    BlfPacker::from_config(cfg)
        .run(design, sheet, &mut JobControl::new())
        .expect("blf run")
}

fn assert_layout_invariants(design: &Design, sheet: &SheetPreset, cfg: &NestConfig, placements: &[sheetnest_core::model::Placement]) {
    let rendered: Vec<Vec<Point>> = placements
        .iter()
        .map(|p| design.render_main(cfg.main_polygon, p))
        .collect();
    for (i, shape) in rendered.iter().enumerate() {
        assert!(
            polygon_inside_bounds(shape, sheet.width, sheet.height, cfg.margin),
            "placement {} escapes the sheet margin",
            i + 1
        );
    }
    assert!(
        !multi_placement_collision(&rendered, 0.0),
        "committed placements overlap"
    );
}

/// Scenario A: L-shape on 100x100, margin 3, 90-degree step.
#[test]
fn l_shape_on_small_square_sheet() {
    let design = l_design_small();
    assert!((design.area - 400.0).abs() < 1e-9);

    let sheet = SheetPreset::new("s100", "100x100", 100.0, 100.0, "custom");
    let cfg = NestConfig::builder().margin(3.0).rotation_step(90).build();
    let outcome = run_blf(&design, &sheet, &cfg);

    assert!(
        outcome.placements.len() >= 6,
        "expected at least 6 placements, got {}",
        outcome.placements.len()
    );
    assert!(outcome.unplaced.is_empty());
    assert!(
        outcome.efficiency >= 24.0,
        "efficiency {:.1}% below 24%",
        outcome.efficiency
    );
    assert_layout_invariants(&design, &sheet, &cfg, &outcome.placements);
}

/// Scenario C: sample box polygon on a B1 sheet.
#[test]
fn box_polygon_on_b1_sheet() {
    let design = Design::new(
        "box",
        "Sample box",
        vec![ring(&[
            (10.0, 10.0),
            (190.0, 10.0),
            (190.0, 60.0),
            (140.0, 60.0),
            (140.0, 140.0),
            (10.0, 140.0),
        ])],
    )
    .unwrap();
    let sheet = SheetPreset::new("b1", "B1", 728.0, 1030.0, "iso-b");
    let cfg = NestConfig::builder().margin(3.0).rotation_step(90).build();
    let outcome = run_blf(&design, &sheet, &cfg);

    assert!(
        outcome.placements.len() >= 20,
        "expected at least 20 placements, got {}",
        outcome.placements.len()
    );
    assert_layout_invariants(&design, &sheet, &cfg, &outcome.placements);
}

/// Scenario D: 60x60 L variant on A2.
#[test]
fn l_variant_on_a2_sheet() {
    let design = Design::new(
        "l-60",
        "L 60x60",
        vec![ring(&[
            (0.0, 0.0),
            (60.0, 0.0),
            (60.0, 30.0),
            (30.0, 30.0),
            (30.0, 60.0),
            (0.0, 60.0),
        ])],
    )
    .unwrap();
    let sheet = SheetPreset::new("a2", "A2", 420.0, 594.0, "iso-a");
    let cfg = NestConfig::builder().margin(3.0).rotation_step(90).build();
    let outcome = run_blf(&design, &sheet, &cfg);

    assert!(
        outcome.placements.len() >= 30,
        "expected at least 30 placements, got {}",
        outcome.placements.len()
    );
    assert_layout_invariants(&design, &sheet, &cfg, &outcome.placements);
}

/// The BLF is fully deterministic: two runs on identical inputs commit
/// identical placements.
#[test]
fn blf_is_deterministic() {
    let design = l_design_small();
    let sheet = SheetPreset::new("s100", "100x100", 100.0, 100.0, "custom");
    let cfg = NestConfig::builder().margin(3.0).rotation_step(90).build();

    let first = run_blf(&design, &sheet, &cfg);
    let second = run_blf(&design, &sheet, &cfg);
    assert_eq!(first.placements, second.placements);
}

/// Efficiency follows the area identity exactly.
#[test]
fn efficiency_matches_area_identity() {
    let design = l_design_small();
    let sheet = SheetPreset::new("s100", "100x100", 100.0, 100.0, "custom");
    let cfg = NestConfig::builder().margin(3.0).rotation_step(90).build();
    let outcome = run_blf(&design, &sheet, &cfg);

    let expected =
        100.0 * outcome.placements.len() as f64 * design.area / (sheet.width * sheet.height);
    assert!(
        (outcome.efficiency - expected).abs() < 1e-9,
        "efficiency {} != {}",
        outcome.efficiency,
        expected
    );
}
