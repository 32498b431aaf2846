//! Unit conversion. All internal geometry is in design units (points,
//! 1/72 inch).

use serde::{Deserialize, Serialize};

/// Pixels in an imperial inch.
pub const PIXELS_PER_INCH: f32 = 96.0;
/// Points in an imperial inch.
pub const POINTS_PER_INCH: f32 = 72.0;
/// Millimetres in an imperial inch.
pub const MM_PER_INCH: f32 = 25.4;

/// Points for the given pixels.
pub fn px_to_pt(px: f32) -> f32 {
    px * (POINTS_PER_INCH / PIXELS_PER_INCH)
}

/// Pixels for the given points.
pub fn pt_to_px(pt: f32) -> f32 {
    pt * (PIXELS_PER_INCH / POINTS_PER_INCH)
}

pub fn mm_to_pt(mm: f32) -> f32 {
    mm * (POINTS_PER_INCH / MM_PER_INCH)
}

pub fn in_to_pt(inches: f32) -> f32 {
    inches * POINTS_PER_INCH
}

/// The unit a measurement was given in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    /// Design units (points).
    #[default]
    Design,
    /// Millimetres.
    Metric,
    /// Inches.
    Imperial,
    /// CSS pixels at 96 DPI.
    Pixel,
}

impl Unit {
    /// Convert `value`, expressed in this unit, to points.
    pub fn to_points(self, value: f32) -> f32 {
        match self {
            Unit::Design => value,
            Unit::Metric => mm_to_pt(value),
            Unit::Imperial => in_to_pt(value),
            Unit::Pixel => px_to_pt(value),
        }
    }
}
