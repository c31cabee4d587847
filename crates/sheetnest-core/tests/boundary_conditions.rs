use sheetnest_core::clip::ClipEngine;
use sheetnest_core::config::{GaConfig, NestConfig};
use sheetnest_core::error::NestError;
use sheetnest_core::model::{BoundingBox, Design, Point, SheetPreset};
use sheetnest_core::packer::blf::BlfPacker;
use sheetnest_core::pipeline::{nest, JobControl};

fn square_design(side: f64) -> Design {
    Design::new(
        "sq",
        "Square",
        vec![vec![
            Point::new(0.0, 0.0),
            Point::new(side, 0.0),
            Point::new(side, side),
            Point::new(0.0, side),
        ]],
    )
    .unwrap()
}

/// Design exactly equal to the sheet minus margins fits exactly once.
#[test]
fn exact_fit_places_one_copy() {
    let design = square_design(94.0);
    let sheet = SheetPreset::new("s", "100x100", 100.0, 100.0, "custom");
    let cfg = NestConfig::builder().margin(3.0).build();
    let outcome = BlfPacker::from_config(&cfg)
        .run(&design, &sheet, &mut JobControl::new())
        .unwrap();
    assert_eq!(outcome.placements.len(), 1);
}

/// A design larger than the sheet in every rotation yields no placements.
#[test]
fn oversized_design_places_nothing() {
    let design = square_design(120.0);
    let sheet = SheetPreset::new("s", "100x100", 100.0, 100.0, "custom");
    let cfg = NestConfig::builder().margin(3.0).build();
    let outcome = BlfPacker::from_config(&cfg)
        .run(&design, &sheet, &mut JobControl::new())
        .unwrap();
    assert!(outcome.placements.is_empty());
}

/// Degenerate designs short-circuit to an empty ranking without panicking.
#[test]
fn degenerate_design_is_no_placements_not_a_panic() {
    // Bypass the constructor to get a two-vertex "polygon" into the engine.
    let design = Design {
        id: "bad".into(),
        name: "Bad".into(),
        view_box: None,
        polygons: vec![vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)]],
        bounding_box: BoundingBox::new(0.0, 0.0, 10.0, 0.0),
        area: 0.0,
    };
    let sheets = vec![SheetPreset::new("a4", "A4", 210.0, 297.0, "iso-a")];
    let cfg = NestConfig::default();
    let results = nest(&design, &sheets, &cfg, &mut JobControl::new()).unwrap();
    assert!(results.is_empty());
}

#[test]
fn constructor_rejects_degenerate_input() {
    let err = Design::new(
        "zero",
        "Zero area",
        vec![vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(20.0, 0.0),
        ]],
    )
    .unwrap_err();
    assert!(matches!(err, NestError::DegenerateInput(_)));

    let err = Design::new("empty", "Empty", vec![]).unwrap_err();
    assert!(matches!(err, NestError::Empty));
}

/// Zero margin makes the NFP expansion the identity.
#[test]
fn zero_delta_offset_is_identity() {
    let engine = ClipEngine::new();
    let rings = vec![vec![
        Point::new(0.0, 0.0),
        Point::new(10.0, 0.0),
        Point::new(10.0, 10.0),
        Point::new(0.0, 10.0),
    ]];
    assert_eq!(engine.offset(&rings, 0.0), rings);
}

#[test]
fn config_validation_rejects_bad_values() {
    let cfg = NestConfig::builder().margin(-1.0).build();
    assert!(matches!(cfg.validate(), Err(NestError::InvalidConfig(_))));

    let cfg = NestConfig::builder().rotation_step(7).build();
    assert!(matches!(cfg.validate(), Err(NestError::InvalidConfig(_))));

    let cfg = NestConfig::builder()
        .ga(GaConfig {
            population_size: 1,
            ..GaConfig::default()
        })
        .build();
    assert!(matches!(cfg.validate(), Err(NestError::InvalidConfig(_))));

    let cfg = NestConfig::builder()
        .ga(GaConfig {
            mutation_rate: 1.5,
            ..GaConfig::default()
        })
        .build();
    assert!(matches!(cfg.validate(), Err(NestError::InvalidConfig(_))));

    assert!(NestConfig::default().validate().is_ok());
}

/// Sheets that cannot hold a single copy are skipped, not errors, and the
/// ranking comes back sorted by efficiency.
#[test]
fn ranking_skips_unpackable_sheets() {
    let design = square_design(90.0);
    let sheets = vec![
        SheetPreset::new("tiny", "50x50", 50.0, 50.0, "custom"),
        SheetPreset::new("s", "100x100", 100.0, 100.0, "custom"),
        SheetPreset::new("l", "300x300", 300.0, 300.0, "custom"),
    ];
    let cfg = NestConfig::builder().margin(3.0).build();
    let results = nest(&design, &sheets, &cfg, &mut JobControl::new()).unwrap();

    assert!(results.iter().all(|r| r.sheet.id != "tiny"));
    assert!(!results.is_empty());
    for pair in results.windows(2) {
        assert!(
            pair[0].efficiency >= pair[1].efficiency,
            "results not ranked by efficiency"
        );
    }
    for r in &results {
        assert!((r.wasted_area - (r.sheet.area() - r.used_area)).abs() < 1e-9);
    }
}
