use serde::{Deserialize, Serialize};

use crate::config::MainPolygonRule;
use crate::error::{NestError, Result};
use crate::geometry::{
    polygon_area, polygon_bbox, polygons_bbox, rotate_polygon, translate_polygon,
};

/// A point in world coordinates (millimetres).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A simple closed ring of >= 3 points. The first vertex is the reference
/// point (anchor) used by NFP/IFP reasoning.
pub type Polygon = Vec<Point>;

/// Axis-aligned bounding box in world millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Grows the box by `margin` on every side (negative shrinks).
    pub fn expand(&self, margin: f64) -> BoundingBox {
        BoundingBox::new(
            self.x - margin,
            self.y - margin,
            self.width + 2.0 * margin,
            self.height + 2.0 * margin,
        )
    }

    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.max_x() && p.y >= self.y && p.y <= self.max_y()
    }
}

/// An immutable design to be nested. Created once by the ingestion side and
/// read-only afterwards; polygons are normalised so the design bbox min sits
/// at the origin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Design {
    pub id: String,
    pub name: String,
    /// Original drawing viewport, if the ingestion side had one.
    pub view_box: Option<BoundingBox>,
    /// Closed rings in world mm; index 0 is conceptually the outline.
    pub polygons: Vec<Polygon>,
    pub bounding_box: BoundingBox,
    /// Sum of the absolute shoelace areas of all rings.
    pub area: f64,
}

impl Design {
    /// Builds a design from raw rings, shifting everything so the combined
    /// bbox min lands on the origin.
    pub fn new(id: impl Into<String>, name: impl Into<String>, polygons: Vec<Polygon>) -> Result<Self> {
        let id = id.into();
        let name = name.into();
        if polygons.is_empty() {
            return Err(NestError::Empty);
        }
        let bbox = polygons_bbox(&polygons)
            .ok_or_else(|| NestError::DegenerateInput(format!("design '{id}' has no vertices")))?;
        let polygons: Vec<Polygon> = polygons
            .iter()
            .map(|p| translate_polygon(p, -bbox.x, -bbox.y))
            .collect();
        let bounding_box = BoundingBox::new(0.0, 0.0, bbox.width, bbox.height);
        let area: f64 = polygons.iter().map(|p| polygon_area(p)).sum();
        if area <= f64::EPSILON {
            return Err(NestError::DegenerateInput(format!(
                "design '{id}' has zero area"
            )));
        }
        Ok(Self {
            id,
            name,
            view_box: None,
            polygons,
            bounding_box,
            area,
        })
    }

    /// The ring used as the collision shape. `LargestArea` is the principled
    /// default; `MostVertices` reproduces the legacy selection.
    pub fn main_polygon(&self, rule: MainPolygonRule) -> &Polygon {
        match rule {
            MainPolygonRule::LargestArea => self
                .polygons
                .iter()
                .max_by(|a, b| {
                    polygon_area(a)
                        .partial_cmp(&polygon_area(b))
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .unwrap_or(&self.polygons[0]),
            MainPolygonRule::MostVertices => self
                .polygons
                .iter()
                .max_by_key(|p| p.len())
                .unwrap_or(&self.polygons[0]),
        }
    }

    /// Reconstructs the occupied rings of one placement in the rendered
    /// frame: rotate about the design bbox centre, then translate.
    pub fn render_placement(&self, placement: &Placement) -> Vec<Polygon> {
        let center = self.bounding_box.center();
        self.polygons
            .iter()
            .map(|p| {
                translate_polygon(
                    &rotate_polygon(p, placement.rotation, center),
                    placement.x,
                    placement.y,
                )
            })
            .collect()
    }

    /// Like [`render_placement`](Self::render_placement) but only for the
    /// main collision ring.
    pub fn render_main(&self, rule: MainPolygonRule, placement: &Placement) -> Polygon {
        let center = self.bounding_box.center();
        translate_polygon(
            &rotate_polygon(self.main_polygon(rule), placement.rotation, center),
            placement.x,
            placement.y,
        )
    }

    /// Bbox of the main collision ring.
    pub fn main_bbox(&self, rule: MainPolygonRule) -> Option<BoundingBox> {
        polygon_bbox(self.main_polygon(rule))
    }

    /// Rotates the whole design bbox by a multiple of 90 degrees and reports
    /// the resulting axis-aligned dimensions.
    pub fn rotated_dims(&self, rotation: f64) -> (f64, f64) {
        let quarter = ((rotation / 90.0).round() as i64).rem_euclid(4);
        if quarter % 2 == 0 {
            (self.bounding_box.width, self.bounding_box.height)
        } else {
            (self.bounding_box.height, self.bounding_box.width)
        }
    }
}

/// A rectangular sheet the engine packs into.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SheetPreset {
    pub id: String,
    pub name: String,
    /// Width in millimetres.
    pub width: f64,
    /// Height in millimetres.
    pub height: f64,
    pub category: String,
}

impl SheetPreset {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        width: f64,
        height: f64,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            width,
            height,
            category: category.into(),
        }
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

/// One committed copy of the design on a sheet. `(x, y)` is the translation
/// applied after rotating the design about its bbox centre; `rotation` is in
/// degrees and is not quantised by the engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Placement {
    pub design_id: String,
    pub x: f64,
    pub y: f64,
    pub rotation: f64,
}

/// Layout produced for one sheet, plus its utilisation statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NestingResult {
    pub sheet: SheetPreset,
    pub placements: Vec<Placement>,
    pub count: usize,
    /// Percentage of the sheet covered by placed copies, in [0, 100].
    pub efficiency: f64,
    pub used_area: f64,
    pub wasted_area: f64,
    /// True when some placement sits within 3 mm of a sheet edge.
    pub edge_warning: bool,
}

impl NestingResult {
    pub fn from_placements(
        design: &Design,
        sheet: &SheetPreset,
        placements: Vec<Placement>,
        edge_warning: bool,
    ) -> Self {
        let count = placements.len();
        let used_area = count as f64 * design.area;
        let sheet_area = sheet.area();
        Self {
            sheet: sheet.clone(),
            placements,
            count,
            efficiency: if sheet_area > 0.0 {
                100.0 * used_area / sheet_area
            } else {
                0.0
            },
            used_area,
            wasted_area: sheet_area - used_area,
            edge_warning,
        }
    }
}
