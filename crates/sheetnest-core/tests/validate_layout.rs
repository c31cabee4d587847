use sheetnest_core::config::MainPolygonRule;
use sheetnest_core::model::{Design, Placement, Point, SheetPreset};
use sheetnest_core::validate::{move_is_valid, validate_placements};

fn rect_design() -> Design {
    Design::new(
        "r",
        "Rect 40x20",
        vec![vec![
            Point::new(0.0, 0.0),
            Point::new(40.0, 0.0),
            Point::new(40.0, 20.0),
            Point::new(0.0, 20.0),
        ]],
    )
    .unwrap()
}

fn place(design: &Design, x: f64, y: f64) -> Placement {
    Placement {
        design_id: design.id.clone(),
        x,
        y,
        rotation: 0.0,
    }
}

#[test]
fn valid_layout_produces_no_errors() {
    let design = rect_design();
    let sheet = SheetPreset::new("s", "200x200", 200.0, 200.0, "custom");
    let placements = vec![place(&design, 10.0, 10.0), place(&design, 10.0, 60.0)];
    let errors = validate_placements(
        &design,
        &sheet,
        3.0,
        MainPolygonRule::LargestArea,
        &placements,
    );
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");
}

#[test]
fn out_of_bounds_is_reported_with_one_based_index() {
    let design = rect_design();
    let sheet = SheetPreset::new("s", "200x200", 200.0, 200.0, "custom");
    let placements = vec![place(&design, 10.0, 10.0), place(&design, 180.0, 10.0)];
    let errors = validate_placements(
        &design,
        &sheet,
        3.0,
        MainPolygonRule::LargestArea,
        &placements,
    );
    assert_eq!(errors.len(), 1);
    assert!(
        errors[0].contains("placement 2"),
        "message should name placement 2: {}",
        errors[0]
    );
}

#[test]
fn colliding_pair_is_reported() {
    let design = rect_design();
    let sheet = SheetPreset::new("s", "200x200", 200.0, 200.0, "custom");
    let placements = vec![place(&design, 10.0, 10.0), place(&design, 30.0, 10.0)];
    let errors = validate_placements(
        &design,
        &sheet,
        3.0,
        MainPolygonRule::LargestArea,
        &placements,
    );
    assert_eq!(errors.len(), 1);
    assert!(
        errors[0].contains("1") && errors[0].contains("2") && errors[0].contains("collide"),
        "unexpected message: {}",
        errors[0]
    );
}

#[test]
fn margin_violation_counts_as_collision() {
    let design = rect_design();
    let sheet = SheetPreset::new("s", "200x200", 200.0, 200.0, "custom");
    // Parts 2 mm apart violate a 3 mm margin even though they do not touch.
    let placements = vec![place(&design, 10.0, 10.0), place(&design, 10.0, 32.0)];
    let errors = validate_placements(
        &design,
        &sheet,
        3.0,
        MainPolygonRule::LargestArea,
        &placements,
    );
    assert_eq!(errors.len(), 1);
}

#[test]
fn drag_moves_validate_against_margin() {
    let design = rect_design();
    let sheet = SheetPreset::new("s", "200x200", 200.0, 200.0, "custom");
    let placements = vec![place(&design, 10.0, 10.0), place(&design, 10.0, 60.0)];

    // Sliding part 2 well clear of part 1: fine.
    assert!(move_is_valid(
        &design,
        &sheet,
        3.0,
        MainPolygonRule::LargestArea,
        &placements,
        1,
        10.0,
        100.0
    ));
    // Dropping part 2 on top of part 1: rejected.
    assert!(!move_is_valid(
        &design,
        &sheet,
        3.0,
        MainPolygonRule::LargestArea,
        &placements,
        1,
        12.0,
        12.0
    ));
    // Dragging within 3 mm of the sheet edge: rejected at drag time.
    assert!(!move_is_valid(
        &design,
        &sheet,
        3.0,
        MainPolygonRule::LargestArea,
        &placements,
        1,
        1.0,
        100.0
    ));
    // Unknown index: rejected.
    assert!(!move_is_valid(
        &design,
        &sheet,
        3.0,
        MainPolygonRule::LargestArea,
        &placements,
        5,
        10.0,
        100.0
    ));
}
