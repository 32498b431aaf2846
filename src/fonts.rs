//! Font selection and text measurement.
//!
//! The PDF base-14 families (Helvetica, Times, Courier; Arial maps to
//! Helvetica) are measured with average-advance heuristics. TrueType families
//! registered at runtime are measured from their real glyph advances using
//! `ttf-parser` and embedded by the renderer.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::style::Style;

/// Family used when a style names none.
pub const DEFAULT_FAMILY: &str = "Helvetica";

/// Font state handed to the backend: family, variant flags and size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontSpec {
    pub family: String,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikeout: bool,
    /// Size in points.
    pub size: f32,
}

impl FontSpec {
    pub fn new(family: &str, size: f32) -> Self {
        Self {
            family: family.to_string(),
            bold: false,
            italic: false,
            underline: false,
            strikeout: false,
            size,
        }
    }

    /// The font a style asks for.
    pub fn from_style(style: &Style) -> Self {
        let family = if style.font.family.trim().is_empty() {
            DEFAULT_FAMILY
        } else {
            style.font.family.as_str()
        };
        Self {
            family: family.to_string(),
            bold: style.variant.bold,
            italic: style.variant.italic,
            underline: style.variant.underline,
            strikeout: style.variant.strikeout,
            size: style.text_size,
        }
    }

    pub fn key(&self) -> FontKey {
        FontKey::new(&self.family, self.bold, self.italic)
    }
}

impl Default for FontSpec {
    fn default() -> Self {
        Self::new(DEFAULT_FAMILY, 12.0)
    }
}

/// The PDF base-14 text families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinFamily {
    Helvetica,
    Times,
    Courier,
}

impl BuiltinFamily {
    pub fn from_family(family: &str) -> Option<Self> {
        match family.trim().to_lowercase().as_str() {
            "" | "helvetica" | "arial" => Some(BuiltinFamily::Helvetica),
            "times" | "times-roman" | "times new roman" => Some(BuiltinFamily::Times),
            "courier" | "courier new" => Some(BuiltinFamily::Courier),
            _ => None,
        }
    }

    /// Average advance as a fraction of the font size.
    fn average_advance(self, bold: bool) -> f32 {
        match (self, bold) {
            (BuiltinFamily::Courier, _) => 0.6,
            (BuiltinFamily::Times, false) => 0.45,
            (BuiltinFamily::Times, true) => 0.5,
            (BuiltinFamily::Helvetica, false) => 0.5,
            // Bold is ~10 % wider.
            (BuiltinFamily::Helvetica, true) => 0.55,
        }
    }
}

/// A loaded TrueType face with metrics.
#[derive(Clone)]
pub struct FontData {
    /// Raw font bytes (kept alive for ttf-parser's zero-copy API).
    pub bytes: Vec<u8>,
    pub units_per_em: f32,
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct FontKey {
    /// Lower-cased family name.
    pub family: String,
    pub bold: bool,
    pub italic: bool,
}

impl FontKey {
    pub fn new(family: &str, bold: bool, italic: bool) -> Self {
        Self {
            family: family.trim().to_lowercase(),
            bold,
            italic,
        }
    }
}

/// Registered TrueType faces plus builtin metrics.
#[derive(Default, Clone)]
pub struct FontManager {
    fonts: HashMap<FontKey, FontData>,
}

impl FontManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a TTF/OTF face from bytes under `family`.
    pub fn load_font(&mut self, family: &str, bold: bool, italic: bool, bytes: Vec<u8>) -> Result<()> {
        let face = ttf_parser::Face::parse(&bytes, 0)
            .map_err(|e| Error::FontParse(format!("Failed to parse font '{family}': {e}")))?;

        let data = FontData {
            units_per_em: face.units_per_em() as f32,
            bytes,
        };

        log::debug!("Registered font '{family}' (bold={bold}, italic={italic})");
        self.fonts.insert(FontKey::new(family, bold, italic), data);
        Ok(())
    }

    /// Face for a key: exact variant first, then the family's regular face.
    pub fn get(&self, key: &FontKey) -> Option<&FontData> {
        self.fonts
            .get(key)
            .or_else(|| self.fonts.get(&FontKey::new(&key.family, false, false)))
    }

    pub fn is_registered(&self, family: &str) -> bool {
        let wanted = family.trim().to_lowercase();
        self.fonts.keys().any(|k| k.family == wanted)
    }

    /// Measure the width of a string in points.
    ///
    /// Registered faces sum real glyph advances. Everything else uses an
    /// average character width for the builtin family (Helvetica when the
    /// family is unknown).
    pub fn measure_text_width(&self, text: &str, font: &FontSpec) -> f32 {
        if let Some(data) = self.get(&font.key()) {
            if let Ok(face) = ttf_parser::Face::parse(&data.bytes, 0) {
                let scale = font.size / data.units_per_em;
                let mut width = 0.0f32;
                for ch in text.chars() {
                    if let Some(gid) = face.glyph_index(ch) {
                        let advance = face.glyph_hor_advance(gid).unwrap_or(0);
                        width += advance as f32 * scale;
                    } else {
                        // Fallback for missing glyph
                        width += font.size * 0.5;
                    }
                }
                return width;
            }
        }

        let family = BuiltinFamily::from_family(&font.family).unwrap_or(BuiltinFamily::Helvetica);
        text.chars().count() as f32 * font.size * family.average_advance(font.bold)
    }

    /// Every registered key.
    pub fn keys(&self) -> Vec<FontKey> {
        self.fonts.keys().cloned().collect()
    }

    /// Font bytes for embedding in the PDF.
    pub fn font_bytes(&self, key: &FontKey) -> Option<&[u8]> {
        self.get(key).map(|d| d.bytes.as_slice())
    }
}
