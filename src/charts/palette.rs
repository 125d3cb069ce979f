//! Chart colors: the named age-bracket palette and the viridis ramp.

use plotters::style::colors::colormaps::{ColorMap, ViridisRGB};
use plotters::style::RGBColor;

/// Age bracket colors, in assignment order.
pub const AGE_PALETTE: [(&str, RGBColor); 10] = [
    ("darkviolet", RGBColor(148, 0, 211)),
    ("indigo", RGBColor(75, 0, 130)),
    ("darkslateblue", RGBColor(72, 61, 139)),
    ("steelblue", RGBColor(70, 130, 180)),
    ("darkcyan", RGBColor(0, 139, 139)),
    ("mediumseagreen", RGBColor(60, 179, 113)),
    ("limegreen", RGBColor(50, 205, 50)),
    ("yellowgreen", RGBColor(154, 205, 50)),
    ("greenyellow", RGBColor(173, 255, 47)),
    ("yellow", RGBColor(255, 255, 0)),
];

pub const BAR_STROKE: RGBColor = RGBColor(47, 79, 79); // darkslategray
pub const AVERAGE_LINE: RGBColor = RGBColor(220, 20, 60); // crimson
pub const DIAGNOSIS_GRID: RGBColor = RGBColor(211, 211, 211); // lightgray
pub const SPECIALTY_GRID: RGBColor = RGBColor(220, 220, 220); // gainsboro

/// Perceptually uniform viridis color at `t` (clamped to [0, 1]).
pub fn viridis(t: f64) -> RGBColor {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    ViridisRGB.get_color(t)
}

/// Convert a palette color for use in the egui viewer.
pub fn to_color32(color: RGBColor) -> egui::Color32 {
    egui::Color32::from_rgb(color.0, color.1, color.2)
}
