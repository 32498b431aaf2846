//! Canvas – an in-memory [`PageBackend`] that keeps a cursor, wraps text,
//! breaks pages and records drawing operations per page.
//!
//! The recorded pages are the "frozen" structure between layout and PDF
//! rendering: they encode exactly what goes on each page, in top-left page
//! coordinates, and serialise to JSON for inspection.

use std::io::Write;

use serde::{Deserialize, Serialize};

use super::{Cell, DocumentInfo, ImageDraw, PageBackend, PageHook};
use crate::error::Result;
use crate::fonts::{FontManager, FontSpec};
use crate::page::{Page, PageFormat};
use crate::richtext::parse_rich_text;
use crate::style::{Alignment, Color};

/// Horizontal padding between a cell edge and its text.
pub const CELL_PADDING: f32 = 2.0;

/// Default margins before a session sets its own (1 cm).
const DEFAULT_MARGIN: f32 = 28.35;
/// Default auto page break margin (2 cm).
const DEFAULT_BREAK_MARGIN: f32 = 56.7;

/// One recorded drawing operation. Coordinates are page-absolute points with
/// the origin at the top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    /// A text run; `y` is the top of its line box.
    Text {
        x: f32,
        y: f32,
        text: String,
        font: FontSpec,
        color: Color,
        line_height: f32,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        color: Color,
        width: f32,
    },
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: Option<Color>,
        stroke: Option<Stroke>,
    },
    Image(ImageDraw),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub color: Color,
    pub width: f32,
}

/// One page of recorded content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasPage {
    /// Width in points (orientation applied).
    pub width: f32,
    pub height: f32,
    pub ops: Vec<DrawOp>,
}

impl CanvasPage {
    fn new(format: PageFormat) -> Self {
        Self {
            width: format.width,
            height: format.height,
            ops: Vec::new(),
        }
    }

    /// Every text run on the page, in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

#[derive(Debug, Clone)]
struct GraphicsState {
    font: FontSpec,
    text_color: Color,
    draw_color: Color,
    fill_color: Color,
    line_width: f32,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            font: FontSpec::default(),
            text_color: Color::BLACK,
            draw_color: Color::BLACK,
            fill_color: Color::TRANSPARENT,
            line_width: 0.567,
        }
    }
}

/// A word, an inter-word space or a forced line break, with the font it is
/// drawn in.
#[derive(Debug, Clone)]
enum Token {
    Word(String, FontSpec),
    Space(FontSpec),
    Break,
}

/// A measured token placed on a line.
#[derive(Debug, Clone)]
struct Placed {
    text: String,
    font: FontSpec,
    width: f32,
    is_space: bool,
}

/// In-memory page recorder.
pub struct Canvas {
    pages: Vec<CanvasPage>,
    format: PageFormat,
    fonts: FontManager,
    state: GraphicsState,
    x: f32,
    y: f32,
    last_h: f32,
    left: f32,
    top: f32,
    right: f32,
    auto_break: bool,
    break_margin: f32,
    hook: Option<Box<dyn PageHook>>,
    in_hook: bool,
    page_decorated: bool,
    page_closed: bool,
    info: DocumentInfo,
}

impl Canvas {
    /// An empty canvas using Letter portrait pages.
    pub fn new() -> Self {
        Self::with_format(Page::default().format())
    }

    pub fn with_format(format: PageFormat) -> Self {
        Self {
            pages: Vec::new(),
            format,
            fonts: FontManager::new(),
            state: GraphicsState::default(),
            x: DEFAULT_MARGIN,
            y: DEFAULT_MARGIN,
            last_h: 0.0,
            left: DEFAULT_MARGIN,
            top: DEFAULT_MARGIN,
            right: DEFAULT_MARGIN,
            auto_break: true,
            break_margin: DEFAULT_BREAK_MARGIN,
            hook: None,
            in_hook: false,
            page_decorated: false,
            page_closed: false,
            info: DocumentInfo::default(),
        }
    }

    pub fn pages(&self) -> &[CanvasPage] {
        &self.pages
    }

    pub fn fonts(&self) -> &FontManager {
        &self.fonts
    }

    pub fn info(&self) -> &DocumentInfo {
        &self.info
    }

    /// Serialise the recorded pages.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self.pages).unwrap_or_default()
    }

    /// Close the last page (running the page-end hook) without saving.
    pub fn close(&mut self) {
        if !self.pages.is_empty() {
            self.end_page();
        }
    }

    // -- pages --------------------------------------------------------------

    fn ensure_page(&mut self) {
        if self.pages.is_empty() {
            self.add_page(None);
        }
    }

    fn push_op(&mut self, op: DrawOp) {
        self.ensure_page();
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }

    fn end_page(&mut self) {
        if self.page_closed {
            return;
        }
        self.run_hook(false);
        self.page_closed = true;
    }

    fn run_hook(&mut self, start: bool) {
        let Some(hook) = self.hook.take() else {
            return;
        };
        let saved = self.state.clone();
        self.in_hook = true;
        let page_number = self.pages.len();
        if start {
            hook.on_page_start(self, page_number);
        } else {
            hook.on_page_end(self, page_number);
        }
        self.in_hook = false;
        self.state = saved;
        self.hook = Some(hook);
    }

    fn break_needed(&self, height: f32) -> bool {
        self.auto_break && !self.in_hook && self.y + height > self.format.height - self.break_margin
    }

    /// Start a new page if a line of `height` does not fit. Keeps x.
    fn ensure_room(&mut self, height: f32) {
        if self.break_needed(height) {
            let x = self.x;
            log::debug!("Automatic page break at y={:.1}", self.y);
            self.add_page(None);
            self.x = x;
        }
    }

    // -- text layout ----------------------------------------------------------

    fn tokenize(runs: &[(String, FontSpec)]) -> Vec<Token> {
        let mut tokens = Vec::new();
        for (text, font) in runs {
            let mut word = String::new();
            for c in text.chars() {
                if c == '\n' || c == ' ' || c == '\t' {
                    if !word.is_empty() {
                        tokens.push(Token::Word(std::mem::take(&mut word), font.clone()));
                    }
                    if c == '\n' {
                        tokens.push(Token::Break);
                    } else {
                        tokens.push(Token::Space(font.clone()));
                    }
                } else if c != '\r' {
                    word.push(c);
                }
            }
            if !word.is_empty() {
                tokens.push(Token::Word(word, font.clone()));
            }
        }
        tokens
    }

    /// Greedy word wrap of `runs` from the cursor. The first line starts at
    /// the cursor x; continuation lines start at the left margin. The cursor
    /// ends after the last glyph of the last line.
    fn write_runs(&mut self, line_height: f32, runs: &[(String, FontSpec)], align: Alignment) {
        self.ensure_page();
        let tokens = Self::tokenize(runs);
        let right_edge = self.format.width - self.right;

        let mut line: Vec<Placed> = Vec::new();
        let mut line_w = 0.0f32;
        let mut start_x = self.x;
        let mut first_line = true;

        for token in tokens {
            match token {
                Token::Break => {
                    self.emit_line(&mut line, start_x, align, line_height);
                    self.advance_line(line_height);
                    start_x = self.left;
                    line_w = 0.0;
                    first_line = false;
                }
                Token::Space(font) => {
                    if line.is_empty() && !first_line {
                        continue;
                    }
                    let width = self.fonts.measure_text_width(" ", &font);
                    line_w += width;
                    line.push(Placed {
                        text: " ".to_string(),
                        font,
                        width,
                        is_space: true,
                    });
                }
                Token::Word(text, font) => {
                    let width = self.fonts.measure_text_width(&text, &font);
                    let avail = right_edge - start_x;
                    if line_w + width > avail {
                        let has_word = line.iter().any(|p| !p.is_space);
                        if has_word || start_x > self.left + 0.01 {
                            self.emit_line(&mut line, start_x, align, line_height);
                            self.advance_line(line_height);
                            start_x = self.left;
                            line_w = 0.0;
                            first_line = false;
                        }
                    }
                    line_w += width;
                    line.push(Placed {
                        text,
                        font,
                        width,
                        is_space: false,
                    });
                }
            }
        }

        let end_x = self.emit_line(&mut line, start_x, align, line_height);
        self.x = end_x;
        self.last_h = line_height;
    }

    fn advance_line(&mut self, line_height: f32) {
        self.x = self.left;
        self.y += line_height;
    }

    /// Draw one line and clear it. Returns the x just past the line.
    fn emit_line(&mut self, line: &mut Vec<Placed>, start_x: f32, align: Alignment, line_height: f32) -> f32 {
        if line.is_empty() {
            return start_x;
        }
        self.ensure_room(line_height);

        let right_edge = self.format.width - self.right;
        // Trailing spaces do not count towards alignment of wrapped lines.
        while line.len() > 1 && line.last().map(|p| p.is_space).unwrap_or(false) {
            line.pop();
        }
        let line_w: f32 = line.iter().map(|p| p.width).sum();
        let avail = right_edge - start_x;
        let offset = match align {
            Alignment::Left | Alignment::Justify => 0.0,
            Alignment::Center => ((avail - line_w) / 2.0).max(0.0),
            Alignment::Right => (avail - line_w).max(0.0),
        };

        let mut x = start_x + offset;
        let mut seg_x = x;
        let mut seg_text = String::new();
        let mut seg_font: Option<FontSpec> = None;
        let y = self.y;
        let color = self.state.text_color;

        for placed in line.drain(..) {
            if seg_font.as_ref().is_some_and(|f| *f != placed.font) {
                if let Some(font) = seg_font.take() {
                    self.push_text(seg_x, y, std::mem::take(&mut seg_text), font, color, line_height);
                }
                seg_x = x;
            }
            if seg_font.is_none() {
                seg_font = Some(placed.font.clone());
                seg_x = x;
            }
            seg_text.push_str(&placed.text);
            x += placed.width;
        }
        if let Some(font) = seg_font {
            self.push_text(seg_x, y, seg_text, font, color, line_height);
        }
        x
    }

    fn push_text(&mut self, x: f32, y: f32, text: String, font: FontSpec, color: Color, line_height: f32) {
        if text.trim().is_empty() && !font.underline {
            return;
        }
        self.push_op(DrawOp::Text {
            x,
            y,
            text,
            font,
            color,
            line_height,
        });
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

impl PageBackend for Canvas {
    fn x(&self) -> f32 {
        self.x
    }

    fn y(&self) -> f32 {
        self.y
    }

    fn set_x(&mut self, x: f32) {
        self.x = x;
    }

    fn set_y(&mut self, y: f32) {
        self.x = self.left;
        self.y = y;
    }

    fn set_xy(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
    }

    fn new_line(&mut self, height: Option<f32>) {
        let h = height.unwrap_or(self.last_h);
        self.advance_line(h);
    }

    fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        let op = DrawOp::Line {
            x1,
            y1,
            x2,
            y2,
            color: self.state.draw_color,
            width: self.state.line_width,
        };
        self.push_op(op);
    }

    fn cell(&mut self, cell: &Cell<'_>) {
        self.ensure_page();
        self.ensure_room(cell.height);
        let (x, y) = (self.x, self.y);

        let fill = (cell.fill && !self.state.fill_color.is_transparent()).then_some(self.state.fill_color);
        let stroke = (cell.border > 0.0).then_some(Stroke {
            color: self.state.draw_color,
            width: cell.border,
        });
        if fill.is_some() || stroke.is_some() {
            self.push_op(DrawOp::Rect {
                x,
                y,
                width: cell.width,
                height: cell.height,
                fill,
                stroke,
            });
        }

        if !cell.text.is_empty() {
            let text_w = self.string_width(cell.text);
            let dx = match cell.align {
                Alignment::Left | Alignment::Justify => CELL_PADDING,
                Alignment::Center => (cell.width - text_w) / 2.0,
                Alignment::Right => cell.width - CELL_PADDING - text_w,
            };
            let font = self.state.font.clone();
            let color = self.state.text_color;
            self.push_text(x + dx, y, cell.text.to_string(), font, color, cell.height);
        }

        self.x += cell.width;
        self.last_h = cell.height;
    }

    fn write_aligned(&mut self, line_height: f32, text: &str, align: Alignment) {
        let runs = vec![(text.to_string(), self.state.font.clone())];
        self.write_runs(line_height, &runs, align);
    }

    fn write_rich(&mut self, line_height: f32, markup: &str) {
        let base = self.state.font.clone();
        for (i, block) in parse_rich_text(markup).into_iter().enumerate() {
            if i > 0 && self.x > self.left + 0.01 {
                self.new_line(Some(line_height));
            }
            let runs: Vec<(String, FontSpec)> = block
                .runs
                .into_iter()
                .map(|run| {
                    let mut font = base.clone();
                    font.bold |= run.bold;
                    font.italic |= run.italic;
                    font.underline |= run.underline;
                    (run.text, font)
                })
                .collect();
            self.write_runs(line_height, &runs, block.align);
        }
    }

    fn image(&mut self, image: &ImageDraw) {
        self.push_op(DrawOp::Image(image.clone()));
    }

    fn string_width(&self, text: &str) -> f32 {
        self.fonts.measure_text_width(text, &self.state.font)
    }

    fn add_page(&mut self, format: Option<PageFormat>) {
        if !self.pages.is_empty() {
            self.end_page();
        }
        if let Some(format) = format {
            self.format = format;
        }
        self.pages.push(CanvasPage::new(self.format));
        self.x = self.left;
        self.y = self.top;
        self.page_closed = false;
        self.page_decorated = self.hook.is_some();
        self.run_hook(true);
    }

    fn page_number(&self) -> usize {
        self.pages.len()
    }

    fn page_size(&self) -> PageFormat {
        self.format
    }

    fn set_auto_page_break(&mut self, enabled: bool, margin: f32) {
        self.auto_break = enabled;
        self.break_margin = margin;
    }

    fn set_font(&mut self, font: &FontSpec) {
        self.state.font = font.clone();
    }

    fn font(&self) -> FontSpec {
        self.state.font.clone()
    }

    fn set_text_color(&mut self, color: Color) {
        self.state.text_color = color;
    }

    fn set_draw_color(&mut self, color: Color) {
        self.state.draw_color = color;
    }

    fn draw_color(&self) -> Color {
        self.state.draw_color
    }

    fn set_fill_color(&mut self, color: Color) {
        self.state.fill_color = color;
    }

    fn set_line_width(&mut self, width: f32) {
        self.state.line_width = width;
    }

    fn line_width(&self) -> f32 {
        self.state.line_width
    }

    fn set_margins(&mut self, left: f32, top: f32, right: f32) {
        self.left = left;
        self.top = top;
        self.right = right;
    }

    fn set_left_margin(&mut self, left: f32) {
        self.left = left;
        if self.pages.is_empty() || self.x < left {
            self.x = left;
        }
    }

    fn set_right_margin(&mut self, right: f32) {
        self.right = right;
    }

    fn margins(&self) -> (f32, f32, f32, f32) {
        (self.left, self.top, self.right, self.break_margin)
    }

    fn register_font(&mut self, family: &str, bytes: Vec<u8>) -> Result<()> {
        self.fonts.load_font(family, false, false, bytes)
    }

    fn set_page_hook(&mut self, hook: Option<Box<dyn PageHook>>) {
        self.hook = hook;
        // A page opened before the hook was installed is decorated now. A
        // blank page keeps the cursor where the hook leaves it; otherwise the
        // cursor is put back.
        if self.hook.is_some() && !self.page_decorated {
            let Some(blank) = self.pages.last().map(|p| p.ops.is_empty()) else {
                return;
            };
            let (x, y, last_h) = (self.x, self.y, self.last_h);
            self.set_xy(self.left, self.top);
            self.run_hook(true);
            if !blank {
                self.x = x;
                self.y = y;
                self.last_h = last_h;
            }
            self.page_decorated = true;
        }
    }

    fn set_info(&mut self, info: &DocumentInfo) {
        self.info = info.clone();
    }

    fn save(&mut self, sink: &mut dyn Write) -> Result<()> {
        self.ensure_page();
        self.close();
        let bytes = crate::render::render_pdf(&self.pages, &self.fonts, &self.info)?;
        sink.write_all(&bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas() -> Canvas {
        let mut c = Canvas::new();
        c.set_margins(36.0, 36.0, 36.0);
        c.set_auto_page_break(true, 36.0);
        c.add_page(None);
        c.set_font(&FontSpec::new("Helvetica", 10.0));
        c
    }

    #[test]
    fn short_text_stays_on_one_line() {
        let mut c = canvas();
        c.write_aligned(14.0, "Hello world", Alignment::Left);
        let page = &c.pages()[0];
        assert_eq!(page.ops.len(), 1);
        assert_eq!(c.y(), 36.0);
        // 11 chars × 10 × 0.5
        assert!((c.x() - (36.0 + 55.0)).abs() < 0.01);
    }

    #[test]
    fn long_text_wraps_within_margins() {
        let mut c = canvas();
        let text = "word ".repeat(60);
        c.write_aligned(14.0, &text, Alignment::Left);
        let right_edge = 612.0 - 36.0;
        for op in &c.pages()[0].ops {
            if let DrawOp::Text { x, text, font, .. } = op {
                let w = c.fonts().measure_text_width(text.trim_end(), font);
                assert!(x + w <= right_edge + 0.01, "line overflows: {text:?}");
            }
        }
        assert!(c.y() > 36.0);
    }

    #[test]
    fn centered_line_is_offset() {
        let mut c = canvas();
        c.write_aligned(14.0, "abcd", Alignment::Center);
        if let DrawOp::Text { x, .. } = &c.pages()[0].ops[0] {
            // available 540, text 20 → offset 260
            assert!((x - 296.0).abs() < 0.01);
        } else {
            panic!("expected text op");
        }
    }

    #[test]
    fn automatic_page_break() {
        let mut c = canvas();
        for _ in 0..80 {
            c.write_aligned(14.0, "line", Alignment::Left);
            c.new_line(None);
        }
        assert!(c.page_number() > 1);
    }

    #[test]
    fn cell_advances_x_and_records_rect() {
        let mut c = canvas();
        c.set_fill_color(Color::GREY);
        c.cell(&Cell {
            width: 50.0,
            height: 14.0,
            text: "A",
            border: 1.0,
            align: Alignment::Center,
            fill: true,
        });
        assert_eq!(c.x(), 86.0);
        let ops = &c.pages()[0].ops;
        assert!(matches!(ops[0], DrawOp::Rect { width, .. } if width == 50.0));
        c.new_line(None);
        assert_eq!(c.y(), 50.0);
        assert_eq!(c.x(), 36.0);
    }

    #[test]
    fn rich_text_splits_runs_by_font() {
        let mut c = canvas();
        c.write_rich(14.0, "<left><b>Bold</b> plain</left>");
        let fonts: Vec<bool> = c.pages()[0]
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { font, .. } => Some(font.bold),
                _ => None,
            })
            .collect();
        assert_eq!(fonts, vec![true, false]);
    }

    struct Marker;

    impl PageHook for Marker {
        fn on_page_start(&self, backend: &mut dyn PageBackend, page_number: usize) {
            backend.write_aligned(10.0, &format!("start {page_number}"), Alignment::Left);
            backend.new_line(None);
        }

        fn on_page_end(&self, backend: &mut dyn PageBackend, page_number: usize) {
            backend.set_y(700.0);
            backend.write_aligned(10.0, &format!("end {page_number}"), Alignment::Left);
        }
    }

    #[test]
    fn hooks_run_on_every_page() {
        let mut c = canvas();
        c.set_page_hook(Some(Box::new(Marker)));
        c.add_page(None);
        c.close();
        let first: Vec<&str> = c.pages()[0].texts().collect();
        let second: Vec<&str> = c.pages()[1].texts().collect();
        assert_eq!(first, vec!["start 1", "end 1"]);
        assert_eq!(second, vec!["start 2", "end 2"]);
    }

    #[test]
    fn op_log_serialises_tagged_ops() {
        let mut c = canvas();
        c.write_aligned(14.0, "Hello", Alignment::Left);
        c.line(36.0, 60.0, 576.0, 60.0);
        let json = c.to_json();
        assert!(json.contains("\"op\": \"text\""));
        assert!(json.contains("\"op\": \"line\""));
        let pages: Vec<CanvasPage> = serde_json::from_str(&json).unwrap();
        assert_eq!(pages, c.pages());
    }
}
