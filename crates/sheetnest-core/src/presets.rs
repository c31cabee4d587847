//! Static sheet-preset catalogue. Dimensions in millimetres, portrait.

use crate::model::SheetPreset;

/// The built-in catalogue: ISO A/B series plus common board formats.
pub fn sheet_presets() -> Vec<SheetPreset> {
    vec![
        SheetPreset::new("a5", "A5", 148.0, 210.0, "iso-a"),
        SheetPreset::new("a4", "A4", 210.0, 297.0, "iso-a"),
        SheetPreset::new("a3", "A3", 297.0, 420.0, "iso-a"),
        SheetPreset::new("a2", "A2", 420.0, 594.0, "iso-a"),
        SheetPreset::new("a1", "A1", 594.0, 841.0, "iso-a"),
        SheetPreset::new("a0", "A0", 841.0, 1189.0, "iso-a"),
        SheetPreset::new("b2", "B2", 515.0, 728.0, "iso-b"),
        SheetPreset::new("b1", "B1", 728.0, 1030.0, "iso-b"),
        SheetPreset::new("board-s", "Board 600x900", 600.0, 900.0, "board"),
        SheetPreset::new("board-m", "Board 1000x2000", 1000.0, 2000.0, "board"),
        SheetPreset::new("board-l", "Board 1220x2440", 1220.0, 2440.0, "board"),
    ]
}

/// Looks a preset up by id, case-insensitively.
pub fn preset_by_id(id: &str) -> Option<SheetPreset> {
    sheet_presets()
        .into_iter()
        .find(|preset| preset.id.eq_ignore_ascii_case(id))
}
