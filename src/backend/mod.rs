//! Page-drawing backend – the primitive the layout layer drives.
//!
//! [`PageBackend`] is the seam between layout decisions (styles, flow, tables,
//! images) and the thing that actually places text runs, lines and images on
//! pages. [`Canvas`] is the in-memory implementation shipped with the crate;
//! it records drawing operations per page and hands them to
//! [`crate::render`] when the document is saved.

mod canvas;

pub use canvas::{Canvas, CanvasPage, DrawOp, Stroke, CELL_PADDING};

use std::io::Write;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::fonts::FontSpec;
use crate::page::PageFormat;
use crate::style::{Alignment, Color, Style};

/// Document metadata embedded in the PDF.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentInfo {
    pub title: String,
    pub author: String,
    pub subject: String,
    pub keywords: String,
}

/// A bordered and/or filled cell drawn at the cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell<'a> {
    pub width: f32,
    pub height: f32,
    pub text: &'a str,
    /// Frame line width; 0 draws no frame.
    pub border: f32,
    pub align: Alignment,
    /// Paint the cell background with the fill color.
    pub fill: bool,
}

/// Raster image file formats the backend distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Other,
}

impl ImageFormat {
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_uppercase().as_str() {
            "PNG" => ImageFormat::Png,
            "JPG" | "JPEG" => ImageFormat::Jpeg,
            "GIF" => ImageFormat::Gif,
            _ => ImageFormat::Other,
        }
    }

    /// Formats that carry resolution metadata.
    pub fn has_dpi_metadata(self) -> bool {
        matches!(self, ImageFormat::Png | ImageFormat::Jpeg)
    }
}

/// An image placed at absolute page coordinates (top-left origin).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageDraw {
    pub path: PathBuf,
    pub format: ImageFormat,
    pub x: f32,
    pub y: f32,
    /// Width in points; 0 derives it from the file when `read_dpi` is set.
    pub width: f32,
    /// Height in points; 0 derives it from the file when `read_dpi` is set.
    pub height: f32,
    pub read_dpi: bool,
}

/// Callbacks run by the backend when a page starts and when it is closed.
///
/// Hooks run with automatic page breaks disabled; the backend restores its
/// font and color state afterwards.
pub trait PageHook {
    fn on_page_start(&self, _backend: &mut dyn PageBackend, _page_number: usize) {}
    fn on_page_end(&self, _backend: &mut dyn PageBackend, _page_number: usize) {}
}

/// The page-drawing primitive. Coordinates are in points with the origin at
/// the top-left corner of the page.
pub trait PageBackend {
    // Cursor
    fn x(&self) -> f32;
    fn y(&self) -> f32;
    fn set_x(&mut self, x: f32);
    /// Move to `y` and back to the left margin.
    fn set_y(&mut self, y: f32);
    fn set_xy(&mut self, x: f32, y: f32);
    /// Line break: back to the left margin, down by `height` or by the height
    /// of the last line written when `None`.
    fn new_line(&mut self, height: Option<f32>);

    // Drawing
    fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32);
    fn cell(&mut self, cell: &Cell<'_>);
    /// Write wrapped plain text starting at the cursor.
    fn write_aligned(&mut self, line_height: f32, text: &str, align: Alignment);
    /// Write wrapper-tag markup (see [`crate::richtext`]).
    fn write_rich(&mut self, line_height: f32, markup: &str);
    fn image(&mut self, image: &ImageDraw);

    // Measurement
    fn string_width(&self, text: &str) -> f32;

    // Pages
    fn add_page(&mut self, format: Option<PageFormat>);
    fn page_number(&self) -> usize;
    fn page_size(&self) -> PageFormat;
    fn set_auto_page_break(&mut self, enabled: bool, margin: f32);

    // Graphics state
    fn set_font(&mut self, font: &FontSpec);
    fn font(&self) -> FontSpec;
    fn set_text_color(&mut self, color: Color);
    fn set_draw_color(&mut self, color: Color);
    fn draw_color(&self) -> Color;
    fn set_fill_color(&mut self, color: Color);
    fn set_line_width(&mut self, width: f32);
    fn line_width(&self) -> f32;

    // Margins
    fn set_margins(&mut self, left: f32, top: f32, right: f32);
    fn set_left_margin(&mut self, left: f32);
    fn set_right_margin(&mut self, right: f32);
    /// `(left, top, right, bottom)`; bottom is the auto page break margin.
    fn margins(&self) -> (f32, f32, f32, f32);

    // Document
    fn register_font(&mut self, family: &str, bytes: Vec<u8>) -> Result<()>;
    fn set_page_hook(&mut self, hook: Option<Box<dyn PageHook>>);
    fn set_info(&mut self, info: &DocumentInfo);
    fn save(&mut self, sink: &mut dyn Write) -> Result<()>;
}

/// Load a style into the backend. With `font_only` just the font and text
/// color change; otherwise line width, draw and fill colors follow the
/// style's bottom border and background.
pub fn apply_style(backend: &mut dyn PageBackend, style: &Style, font_only: bool) {
    backend.set_text_color(style.color);
    backend.set_font(&FontSpec::from_style(style));
    if !font_only {
        backend.set_line_width(style.border.width.bottom);
        backend.set_draw_color(style.border.color);
        backend.set_fill_color(style.background);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_format_from_extension() {
        assert_eq!(ImageFormat::from_extension("png"), ImageFormat::Png);
        assert_eq!(ImageFormat::from_extension("JPG"), ImageFormat::Jpeg);
        assert_eq!(ImageFormat::from_extension("bmp"), ImageFormat::Other);
        assert!(ImageFormat::Jpeg.has_dpi_metadata());
        assert!(!ImageFormat::Gif.has_dpi_metadata());
    }

    #[test]
    fn apply_style_font_only_leaves_draw_state() {
        let mut canvas = Canvas::new();
        canvas.add_page(None);
        canvas.set_line_width(0.7);
        let style = crate::style::basic_table().with_background(Color::GREY);
        apply_style(&mut canvas, &style, true);
        assert_eq!(canvas.line_width(), 0.7);
        assert_eq!(canvas.font().size, 10.0);

        apply_style(&mut canvas, &style, false);
        assert_eq!(canvas.line_width(), 1.0);
    }
}
