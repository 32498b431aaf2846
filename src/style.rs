//! Style registry – named bundles of font, color, size, border and background
//! attributes, looked up case-insensitively with a fallback to "Normal".

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Name of the style every lookup falls back to.
pub const NORMAL: &str = "Normal";

// ---------------------------------------------------------------------------
// Style
// ---------------------------------------------------------------------------

/// A named style. The zero value (`Style::default()`) has an empty name and a
/// text size of 0, which marks it as unusable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Style {
    pub name: String,
    /// Font size in points.
    pub text_size: f32,
    pub color: Color,
    pub variant: Variants,
    /// Height of one line of text in points.
    pub line_height: f32,
    pub border: Border,
    pub background: Color,
    pub font: FontRef,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            name: String::new(),
            text_size: 0.0,
            color: Color::BLACK,
            variant: Variants::default(),
            line_height: 0.0,
            border: Border::default(),
            background: Color::TRANSPARENT,
            font: FontRef::default(),
        }
    }
}

impl Style {
    /// A plain style with the given name, size and line height.
    pub fn new(name: &str, text_size: f32, line_height: f32) -> Self {
        Self {
            name: name.to_string(),
            text_size,
            line_height,
            font: FontRef::new("Helvetica"),
            ..Self::default()
        }
    }

    /// A style is usable once it has a text size.
    pub fn is_valid(&self) -> bool {
        self.text_size > 0.0
    }

    pub fn bold(mut self) -> Self {
        self.variant.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.variant.italic = true;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background = color;
        self
    }

    pub fn with_font(mut self, family: &str) -> Self {
        self.font = FontRef::new(family);
        self
    }

    pub fn with_border(mut self, border: Border) -> Self {
        self.border = border;
        self
    }
}

/// Text variant flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Variants {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikeout: bool,
}

/// Per-edge border widths in points.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BorderWidths {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl BorderWidths {
    pub fn all(width: f32) -> Self {
        Self {
            left: width,
            top: width,
            right: width,
            bottom: width,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Border {
    pub color: Color,
    pub width: BorderWidths,
}

/// Reference to a font family, either a builtin (Helvetica, Arial, Times,
/// Courier) or a TrueType family registered with the session.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FontRef {
    pub family: String,
}

impl FontRef {
    pub fn new(family: &str) -> Self {
        Self {
            family: family.to_string(),
        }
    }
}

/// RGBA colour (0.0 – 1.0).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    #[serde(default = "Color::opaque")]
    pub a: f32,
}

impl Color {
    pub const BLACK: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    pub const WHITE: Self = Self {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };
    pub const GREY: Self = Self {
        r: 0.85,
        g: 0.85,
        b: 0.85,
        a: 1.0,
    };
    pub const TRANSPARENT: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };

    fn opaque() -> f32 {
        1.0
    }

    /// Opaque colour from 8-bit channels.
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a: 1.0,
        }
    }

    pub fn is_transparent(&self) -> bool {
        self.a < 0.001
    }

    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() == 6 {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Self::rgb(r, g, b))
        } else if hex.len() == 3 {
            let r = u8::from_str_radix(&hex[0..1].repeat(2), 16).ok()?;
            let g = u8::from_str_radix(&hex[1..2].repeat(2), 16).ok()?;
            let b = u8::from_str_radix(&hex[2..3].repeat(2), 16).ok()?;
            Some(Self::rgb(r, g, b))
        } else {
            None
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

// ---------------------------------------------------------------------------
// Alignment
// ---------------------------------------------------------------------------

/// Horizontal text alignment. Left when nothing is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    /// Parse a one-letter code (`L`, `C`, `R`, `J`). Anything else is left.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_uppercase().as_str() {
            "C" => Alignment::Center,
            "R" => Alignment::Right,
            "J" => Alignment::Justify,
            _ => Alignment::Left,
        }
    }

    /// Wrap `inner` in the rich-text alignment tag. Justified text has no
    /// rich-text form and renders left aligned.
    pub fn wrap_markup(self, inner: &str) -> String {
        match self {
            Alignment::Center => format!("<center>{inner}</center>"),
            Alignment::Right => format!("<right>{inner}</right>"),
            Alignment::Left | Alignment::Justify => format!("<left>{inner}</left>"),
        }
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Outcome of a successful style lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleLookup {
    /// The requested name matched.
    Found(Style),
    /// The requested name did not match; "Normal" was used instead.
    UsedFallback(Style),
}

impl StyleLookup {
    pub fn into_style(self) -> Style {
        match self {
            StyleLookup::Found(s) | StyleLookup::UsedFallback(s) => s,
        }
    }

    pub fn style(&self) -> &Style {
        match self {
            StyleLookup::Found(s) | StyleLookup::UsedFallback(s) => s,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, StyleLookup::UsedFallback(_))
    }
}

/// Ordered list of styles. Duplicate names are allowed; the first match in
/// insertion order wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleRegistry {
    styles: Vec<Style>,
}

impl StyleRegistry {
    pub fn new(styles: Vec<Style>) -> Self {
        Self { styles }
    }

    /// Add one style, keeping the existing ones.
    pub fn append(&mut self, style: Style) {
        self.styles.push(style);
    }

    /// Discard every style and use `styles` instead.
    pub fn replace(&mut self, styles: Vec<Style>) {
        self.styles = styles;
    }

    pub fn styles(&self) -> &[Style] {
        &self.styles
    }

    fn find(&self, name: &str) -> Option<&Style> {
        let wanted = name.to_lowercase();
        self.styles
            .iter()
            .find(|s| s.name.to_lowercase() == wanted)
    }

    /// Tagged lookup. A name that is missing, or that matches a style without
    /// a text size, falls back to "Normal".
    pub fn lookup(&self, name: &str) -> Result<StyleLookup> {
        if let Some(style) = self.find(name).filter(|s| s.is_valid()) {
            return Ok(StyleLookup::Found(style.clone()));
        }
        match self.find(NORMAL).filter(|s| s.is_valid()) {
            Some(normal) => {
                log::debug!("Style '{name}' not found, using '{NORMAL}'");
                Ok(StyleLookup::UsedFallback(normal.clone()))
            }
            None => Err(Error::StyleNotFound(name.to_string())),
        }
    }

    /// Resolve a style by name, falling back to "Normal".
    pub fn resolve(&self, name: &str) -> Result<Style> {
        self.lookup(name).map(StyleLookup::into_style)
    }
}

// ---------------------------------------------------------------------------
// Default style sheet
// ---------------------------------------------------------------------------

/// Style used for table cells and header/footer text.
pub fn basic_table() -> Style {
    Style::new("Table", 10.0, 14.0).with_border(Border {
        color: Color::BLACK,
        width: BorderWidths::all(1.0),
    })
}

/// A basic document style sheet: Title, Subtitle, Heading 1–3, Normal, Table.
pub fn default_styles() -> Vec<Style> {
    let dark_blue = Color::rgb(0x1a, 0x36, 0x5d);
    vec![
        Style::new("Title", 28.0, 32.0)
            .bold()
            .with_color(dark_blue)
            .with_border(Border {
                color: dark_blue,
                width: BorderWidths {
                    bottom: 1.0,
                    ..BorderWidths::default()
                },
            }),
        Style::new("Subtitle", 16.0, 20.0)
            .italic()
            .with_color(Color::rgb(0x55, 0x55, 0x55)),
        Style::new("Heading 1", 20.0, 24.0).bold().with_color(dark_blue),
        Style::new("Heading 2", 16.0, 20.0).bold().with_color(dark_blue),
        Style::new("Heading 3", 13.0, 17.0).bold(),
        Style::new(NORMAL, 11.0, 15.0),
        basic_table(),
    ]
}
