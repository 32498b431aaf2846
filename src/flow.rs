//! Flow writer – styled, paginated text output at the cursor.
//!
//! Each write checks the page bottom, adds heading spacing, resolves the
//! style, routes marked-up text through the rich-text path, draws the style's
//! decoration line and finally resets the font to "Normal".

use serde::{Deserialize, Serialize};

use crate::backend::PageBackend;
use crate::document::Document;
use crate::error::Result;
use crate::style::{Alignment, Style};

/// Where the flow writer is within a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FlowState {
    #[default]
    Idle,
    Writing,
    /// The cursor passed the bottom margin; a new page is being started.
    PageBreakPending,
}

/// Styles whose names contain "heading" or "title" (but not "subtitle") get
/// a line break before the text.
pub fn is_heading_start(style_name: &str) -> bool {
    let name = style_name.to_lowercase();
    (name.contains("heading") || name.contains("title")) && !name.contains("subtitle")
}

/// Headings other than titles get a line break after the text.
pub fn is_heading_end(style_name: &str) -> bool {
    let name = style_name.to_lowercase();
    name.contains("heading") && !name.contains("title")
}

impl<B: PageBackend> Document<B> {
    /// Write `text` in the named style.
    ///
    /// An unresolvable style does not stop the write: the text goes out with
    /// the empty zero-value style and the lookup error is returned afterwards.
    pub fn write(&mut self, style_name: &str, align: Alignment, text: &str) -> Result<()> {
        if self.check_bottom() {
            self.flow_state = FlowState::PageBreakPending;
            log::debug!("Cursor past the bottom margin, starting page {}", self.backend.page_number() + 1);
            self.page_break();
        }
        self.flow_state = FlowState::Writing;

        self.heading_start(style_name);

        let (style, failure) = match self.styles.resolve(style_name) {
            Ok(style) => (style, None),
            Err(e) => {
                log::warn!("{e}; writing with an empty style");
                (Style::default(), Some(e))
            }
        };

        let markup = self.markup.parse(text);
        if markup.matched {
            self.set_style(&style, false);
            let wrapped = align.wrap_markup(&markup.rendered);
            self.backend.write_rich(style.line_height, &wrapped);
        } else if !text.is_empty() {
            self.set_style(&style, true);
            self.backend.write_aligned(style.line_height, text, align);
        }

        self.heading_end(style_name);
        self.bottom_line(&style);
        self.reset_font();
        self.flow_state = FlowState::Idle;

        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Write starting at the vertical middle of the page.
    pub fn write_centered(&mut self, style_name: &str, align: Alignment, text: &str) -> Result<()> {
        let line_height = self
            .styles
            .resolve(style_name)
            .map(|s| s.line_height)
            .unwrap_or_default();
        let y = self.height() / 2.0 - line_height / 2.0;
        self.backend.set_y(y);
        self.write(style_name, align, text)
    }

    /// Spacing before a heading.
    pub fn heading_start(&mut self, style_name: &str) {
        if is_heading_start(style_name) {
            self.backend.new_line(None);
        }
    }

    /// Spacing after a heading.
    pub fn heading_end(&mut self, style_name: &str) {
        if is_heading_end(style_name) {
            self.backend.new_line(None);
        }
    }

    /// Draw the style's decoration line when it has a bottom border.
    pub fn bottom_line(&mut self, style: &Style) {
        if style.border.width.bottom > 0.0 {
            self.draw_bottom_line(style);
        }
    }

    /// Rule under the text just written, across the text area, in the
    /// style's border color and bottom width. Draw color and line width are
    /// left as they were.
    pub fn draw_bottom_line(&mut self, style: &Style) {
        let y = self.backend.y() + style.line_height + 2.0;
        let saved_color = self.backend.draw_color();
        let saved_width = self.backend.line_width();

        self.backend.set_draw_color(style.border.color);
        self.backend.set_line_width(style.border.width.bottom);
        let (left, _, right, _) = self.backend.margins();
        let end = self.width() - right;
        self.backend.line(left, y, end, y);
        self.backend.set_xy(left, y + style.border.width.bottom + 5.0);

        self.backend.set_line_width(saved_width);
        self.backend.set_draw_color(saved_color);
    }
}
