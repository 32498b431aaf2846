//! Rich-text reader – turns the wrapper-tag markup produced by
//! [`crate::markup`] and the header/footer blocks into styled runs.
//!
//! Only a fixed tag set is recognised:
//! - Inline: `<b>`, `<i>`, `<u>`
//! - Block alignment: `<left>`, `<center>`, `<right>`
//!
//! Any other `<` is kept as literal text.

use crate::style::Alignment;

/// A span of text sharing one set of variant flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RichRun {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

/// Consecutive runs sharing one alignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RichBlock {
    pub align: Alignment,
    pub runs: Vec<RichRun>,
}

impl RichBlock {
    fn new(align: Alignment) -> Self {
        Self {
            align,
            runs: Vec::new(),
        }
    }

    /// Concatenated text of every run.
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagKind {
    Bold,
    Italic,
    Underline,
    Align(Alignment),
}

impl TagKind {
    fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "b" => Some(TagKind::Bold),
            "i" => Some(TagKind::Italic),
            "u" => Some(TagKind::Underline),
            "left" => Some(TagKind::Align(Alignment::Left)),
            "center" => Some(TagKind::Align(Alignment::Center)),
            "right" => Some(TagKind::Align(Alignment::Right)),
            _ => None,
        }
    }
}

/// Parse wrapper-tag markup into alignment blocks. Blocks without any text
/// are dropped.
pub fn parse_rich_text(markup: &str) -> Vec<RichBlock> {
    let mut reader = Reader::new(markup);
    reader.run();
    reader.blocks
}

struct Reader<'a> {
    input: &'a str,
    pos: usize,
    pending: String,
    bold: usize,
    italic: usize,
    underline: usize,
    align_stack: Vec<Alignment>,
    current: RichBlock,
    blocks: Vec<RichBlock>,
}

impl<'a> Reader<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            pending: String::new(),
            bold: 0,
            italic: 0,
            underline: 0,
            align_stack: Vec::new(),
            current: RichBlock::new(Alignment::Left),
            blocks: Vec::new(),
        }
    }

    fn run(&mut self) {
        while !self.eof() {
            if let Some((kind, closing, len)) = self.peek_tag() {
                self.flush_text();
                self.apply_tag(kind, closing);
                self.pos += len;
            } else {
                let c = self.current_char();
                self.pending.push(c);
                self.pos += c.len_utf8();
            }
        }
        self.flush_text();
        self.finish_block(Alignment::Left);
    }

    fn apply_tag(&mut self, kind: TagKind, closing: bool) {
        match kind {
            TagKind::Bold => toggle(&mut self.bold, closing),
            TagKind::Italic => toggle(&mut self.italic, closing),
            TagKind::Underline => toggle(&mut self.underline, closing),
            TagKind::Align(align) => {
                if closing {
                    self.align_stack.pop();
                } else {
                    self.align_stack.push(align);
                }
                let next = self.align_stack.last().copied().unwrap_or_default();
                self.finish_block(next);
            }
        }
    }

    /// Push the current block (if it has text) and start a new one.
    fn finish_block(&mut self, next_align: Alignment) {
        let done = std::mem::replace(&mut self.current, RichBlock::new(next_align));
        if done.runs.iter().any(|r| !r.text.is_empty()) {
            self.blocks.push(done);
        }
    }

    fn flush_text(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let text = decode_entities(&std::mem::take(&mut self.pending));
        self.current.runs.push(RichRun {
            text,
            bold: self.bold > 0,
            italic: self.italic > 0,
            underline: self.underline > 0,
        });
    }

    /// Recognise `<name>` or `</name>` for a known tag at the cursor.
    /// Returns the tag, whether it closes, and its byte length.
    fn peek_tag(&self) -> Option<(TagKind, bool, usize)> {
        let rest = &self.input[self.pos..];
        let inner = rest.strip_prefix('<')?;
        let (closing, inner) = match inner.strip_prefix('/') {
            Some(after) => (true, after),
            None => (false, inner),
        };
        let end = inner.find('>')?;
        let name = &inner[..end];
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphabetic()) {
            return None;
        }
        let kind = TagKind::from_name(name)?;
        let len = 1 + usize::from(closing) + end + 1;
        Some((kind, closing, len))
    }

    fn eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn current_char(&self) -> char {
        self.input[self.pos..].chars().next().unwrap_or('\0')
    }
}

fn toggle(depth: &mut usize, closing: bool) {
    if closing {
        *depth = depth.saturating_sub(1);
    } else {
        *depth += 1;
    }
}

fn decode_entities(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&nbsp;", "\u{00A0}")
        .replace("&amp;", "&")
}
