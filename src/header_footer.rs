//! Headers and footers – three content blocks (left, center, right) drawn on
//! every page by a [`PageHook`] installed on the backend.

use serde::{Deserialize, Serialize};

use crate::backend::{apply_style, PageBackend, PageHook};
use crate::page::Margins;
use crate::style::{basic_table, Alignment, Style};

/// Where the page number goes relative to the block text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageNumber {
    /// `"<n> <text>"`
    Prepend,
    /// `"<text> <n>"`
    Append,
}

/// One header or footer region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    pub text: String,
    pub style: Style,
    pub align: Alignment,
    pub page_number: Option<PageNumber>,
}

impl ContentBlock {
    pub fn new(text: &str, style: Style, align: Alignment) -> Self {
        Self {
            text: text.to_string(),
            style,
            align,
            page_number: None,
        }
    }

    pub fn with_page_number(mut self, placement: PageNumber) -> Self {
        self.page_number = Some(placement);
        self
    }

    /// Whitespace-only blocks are not drawn.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Block text with the page number interpolated.
    pub fn render_text(&self, page: usize) -> String {
        match self.page_number {
            Some(PageNumber::Prepend) => format!("{page} {}", self.text),
            Some(PageNumber::Append) => format!("{} {page}", self.text),
            None => self.text.clone(),
        }
    }

    /// Block text wrapped in its alignment tag.
    pub fn to_markup(&self, page: usize) -> String {
        self.align.wrap_markup(&self.render_text(page))
    }
}

/// Left, center and right blocks of a header or footer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderFooter {
    pub left: ContentBlock,
    pub center: ContentBlock,
    pub right: ContentBlock,
}

impl Default for HeaderFooter {
    fn default() -> Self {
        Self {
            left: ContentBlock::new("", basic_table(), Alignment::Left),
            center: ContentBlock::new("", basic_table(), Alignment::Center),
            right: ContentBlock::new("", basic_table(), Alignment::Right),
        }
    }
}

impl HeaderFooter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blocks(&self) -> [&ContentBlock; 3] {
        [&self.left, &self.center, &self.right]
    }

    pub fn is_empty(&self) -> bool {
        self.blocks().iter().all(|b| b.is_empty())
    }

    /// Draw every non-empty block starting at `(left, y)`, each in its own
    /// style. Returns the tallest line height used.
    fn draw(&self, backend: &mut dyn PageBackend, left: f32, y: f32, page: usize) -> f32 {
        let mut line_height = 0.0f32;
        for block in self.blocks().into_iter().filter(|b| !b.is_empty()) {
            backend.set_xy(left, y);
            apply_style(backend, &block.style, false);
            backend.write_rich(block.style.line_height, &block.to_markup(page));
            line_height = line_height.max(block.style.line_height);
        }
        line_height
    }
}

/// Page hook drawing the session header at the top margin of each new page
/// and the footer when each page is closed.
#[derive(Debug, Clone)]
pub struct PageDecorations {
    pub header: Option<HeaderFooter>,
    pub footer: Option<HeaderFooter>,
    /// Session margins in points.
    pub margins: Margins,
}

impl PageHook for PageDecorations {
    fn on_page_start(&self, backend: &mut dyn PageBackend, page_number: usize) {
        let Some(header) = self.header.as_ref().filter(|h| !h.is_empty()) else {
            return;
        };
        let top = self.margins.top;
        let line_height = header.draw(backend, self.margins.left, top, page_number);
        // Body text starts below the header.
        backend.set_xy(self.margins.left, top);
        backend.new_line(Some(line_height));
    }

    fn on_page_end(&self, backend: &mut dyn PageBackend, page_number: usize) {
        let Some(footer) = self.footer.as_ref().filter(|f| !f.is_empty()) else {
            return;
        };
        let y = backend.page_size().height - self.margins.top - self.margins.bottom / 2.0;
        footer.draw(backend, self.margins.left, y, page_number);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Canvas, DrawOp};

    fn block(text: &str) -> ContentBlock {
        ContentBlock::new(text, basic_table(), Alignment::Right)
    }

    #[test]
    fn page_number_placement() {
        assert_eq!(block("Page").with_page_number(PageNumber::Append).render_text(3), "Page 3");
        assert_eq!(block("of 9").with_page_number(PageNumber::Prepend).render_text(2), "2 of 9");
        assert_eq!(block("Report").render_text(4), "Report");
        assert_eq!(
            block("Page").with_page_number(PageNumber::Append).to_markup(1),
            "<right>Page 1</right>"
        );
    }

    #[test]
    fn whitespace_blocks_are_empty() {
        assert!(block("   ").is_empty());
        assert!(!block(" x ").is_empty());
        assert!(HeaderFooter::new().is_empty());
    }

    #[test]
    fn header_pushes_body_down_and_footer_sits_near_bottom() {
        let margins = Margins::narrow();
        let mut canvas = Canvas::new();
        canvas.set_margins(36.0, 36.0, 36.0);
        canvas.set_auto_page_break(true, 36.0);

        let mut header = HeaderFooter::new();
        header.left.text = "Left".into();
        header.right = block("Page").with_page_number(PageNumber::Append);
        let mut footer = HeaderFooter::new();
        footer.center.text = "Footer".into();

        canvas.set_page_hook(Some(Box::new(PageDecorations {
            header: Some(header),
            footer: Some(footer),
            margins,
        })));
        canvas.add_page(None);
        assert_eq!(canvas.y(), 36.0 + 14.0);
        canvas.close();

        let texts: Vec<(String, f32)> = canvas.pages()[0]
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, y, .. } => Some((text.clone(), *y)),
                _ => None,
            })
            .collect();
        assert_eq!(texts[0], ("Left".to_string(), 36.0));
        assert_eq!(texts[1], ("Page 1".to_string(), 36.0));
        assert_eq!(texts[2], ("Footer".to_string(), 792.0 - 36.0 - 18.0));
    }
}
