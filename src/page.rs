//! Page geometry – named sizes, orientation and margins.

use serde::{Deserialize, Serialize};

use crate::units::Unit;

/// Page orientation for the generated PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Portrait mode: height > width (default).
    #[default]
    Portrait,
    /// Landscape mode: width and height are swapped.
    Landscape,
}

/// Standard page sizes, dimensions in points (portrait).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PageSize {
    #[default]
    Letter,
    Legal,
    Tabloid,
    Ledger,
    AnsiA,
    A1,
    A2,
    A3,
    A4,
    A5,
}

impl PageSize {
    /// Look up a size by name, case-insensitively. Unknown names fall back to
    /// `Letter`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "letter" => PageSize::Letter,
            "legal" => PageSize::Legal,
            "tabloid" => PageSize::Tabloid,
            "ledger" => PageSize::Ledger,
            "ansi" | "ansia" => PageSize::AnsiA,
            "a1" => PageSize::A1,
            "a2" => PageSize::A2,
            "a3" => PageSize::A3,
            "a4" => PageSize::A4,
            "a5" => PageSize::A5,
            other => {
                log::debug!("Unknown page size '{other}', using Letter");
                PageSize::Letter
            }
        }
    }

    /// Portrait `(width, height)` in points.
    pub fn dimensions(self) -> (f32, f32) {
        match self {
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
            PageSize::Tabloid => (792.0, 1224.0),
            PageSize::Ledger => (791.0, 1224.7),
            PageSize::AnsiA => (612.4, 791.0),
            PageSize::A1 => (1684.0, 2384.2),
            PageSize::A2 => (1190.7, 1684.0),
            PageSize::A3 => (842.0, 1190.7),
            PageSize::A4 => (595.4, 842.0),
            PageSize::A5 => (419.6, 595.4),
        }
    }
}

/// Page size and orientation of a session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub size: PageSize,
    /// Portrait width in points.
    pub width: f32,
    /// Portrait height in points.
    pub height: f32,
    pub orientation: Orientation,
}

impl Page {
    pub fn new(size: PageSize, orientation: Orientation) -> Self {
        let (width, height) = size.dimensions();
        Self {
            size,
            width,
            height,
            orientation,
        }
    }

    /// Build from a size name and landscape flag.
    pub fn from_name(name: &str, landscape: bool) -> Self {
        let orientation = if landscape {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        };
        Self::new(PageSize::from_name(name), orientation)
    }

    /// Effective page width after applying orientation. This is the whole
    /// page, margins included.
    pub fn effective_width(&self) -> f32 {
        match self.orientation {
            Orientation::Portrait => self.width,
            Orientation::Landscape => self.height,
        }
    }

    /// Effective page height after applying orientation.
    pub fn effective_height(&self) -> f32 {
        match self.orientation {
            Orientation::Portrait => self.height,
            Orientation::Landscape => self.width,
        }
    }

    /// Orientation-applied format handed to the backend.
    pub fn format(&self) -> PageFormat {
        PageFormat {
            width: self.effective_width(),
            height: self.effective_height(),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(PageSize::Letter, Orientation::Portrait)
    }
}

/// Physical page dimensions as the backend sees them (already oriented).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageFormat {
    pub width: f32,
    pub height: f32,
}

/// Page margins.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    #[serde(default)]
    pub unit: Unit,
}

impl Margins {
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
            unit: Unit::Design,
        }
    }

    pub fn all(value: f32) -> Self {
        Self::new(value, value, value, value)
    }

    /// 1 inch on every edge.
    pub fn word() -> Self {
        Self::all(72.0)
    }

    /// 1 inch top and bottom, 3/4 inch left and right.
    pub fn moderate() -> Self {
        Self::new(54.0, 72.0, 54.0, 72.0)
    }

    /// 1/2 inch on every edge.
    pub fn narrow() -> Self {
        Self::all(36.0)
    }

    /// 1/4 inch on every edge. Likely to clip on many printers.
    pub fn super_narrow() -> Self {
        Self::all(18.0)
    }

    /// The same margins expressed in points.
    pub fn to_points(self) -> Self {
        let u = self.unit;
        Self::new(
            u.to_points(self.left),
            u.to_points(self.top),
            u.to_points(self.right),
            u.to_points(self.bottom),
        )
    }
}

impl Default for Margins {
    fn default() -> Self {
        Self::word()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_size_lookup_is_case_insensitive() {
        assert_eq!(PageSize::from_name("LeGaL"), PageSize::Legal);
        assert_eq!(PageSize::from_name("ansi"), PageSize::AnsiA);
        assert_eq!(PageSize::from_name("a4"), PageSize::A4);
        assert_eq!(PageSize::from_name("b5"), PageSize::Letter);
    }

    #[test]
    fn landscape_swaps_effective_dimensions() {
        let portrait = Page::from_name("letter", false);
        assert_eq!(portrait.effective_width(), 612.0);
        assert_eq!(portrait.effective_height(), 792.0);

        let landscape = Page::from_name("letter", true);
        assert_eq!(landscape.effective_width(), 792.0);
        assert_eq!(landscape.effective_height(), 612.0);
        assert_eq!(landscape.format().width, 792.0);
    }

    #[test]
    fn metric_margins_convert_to_points() {
        let m = Margins {
            unit: Unit::Metric,
            ..Margins::all(25.4)
        }
        .to_points();
        assert!((m.left - 72.0).abs() < 1e-3);
        assert_eq!(m.unit, Unit::Design);
    }
}
