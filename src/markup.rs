//! Inline markup – converts the lightweight `__bold__`, `_*italic*_` and
//! `_#underline#_` delimiters into the `<b>`, `<i>` and `<u>` wrapper tags
//! understood by the backend's rich-text path.
//!
//! The three passes run in a fixed order, each over the output of the
//! previous one. Overlapping delimiters (a bold pair spanning an italic pair,
//! for example) therefore resolve by pass order rather than by nesting, and
//! the result for such input is unspecified.

use regex::Regex;

/// One delimiter grammar and its replacement.
#[derive(Debug, Clone)]
struct ParseGroup {
    expression: Regex,
    substitution: &'static str,
}

impl ParseGroup {
    fn new(pattern: &str, substitution: &'static str) -> Self {
        Self {
            expression: Regex::new(pattern).expect("markup pattern is a valid regex"),
            substitution,
        }
    }

    /// Replace every match. Returns the text and whether anything matched.
    fn apply(&self, text: &str) -> (String, bool) {
        if self.expression.is_match(text) {
            let out = self
                .expression
                .replace_all(text, self.substitution)
                .into_owned();
            (out, true)
        } else {
            (text.to_string(), false)
        }
    }
}

/// Result of running the markup passes over a piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markup {
    /// Text with wrapper tags substituted, or the input when nothing matched.
    pub rendered: String,
    /// True when at least one pass matched and the rich-text path is needed.
    pub matched: bool,
}

/// Compiled bold, italic and underline passes.
#[derive(Debug, Clone)]
pub struct MarkupParser {
    groups: Vec<ParseGroup>,
}

impl MarkupParser {
    pub fn new() -> Self {
        Self {
            groups: vec![
                ParseGroup::new(r"(?m)__(\S+[^_]*)__", "<b>$1</b>"),
                ParseGroup::new(r"(?m)_\*(\S+[^_*]*)\*_", "<i>$1</i>"),
                ParseGroup::new(r"(?m)_#(\S+[^_#]*)#_", "<u>$1</u>"),
            ],
        }
    }

    pub fn parse(&self, text: &str) -> Markup {
        let mut out = text.to_string();
        let mut matched = false;
        for group in &self.groups {
            let (next, hit) = group.apply(&out);
            out = next;
            matched |= hit;
        }
        if matched {
            Markup {
                rendered: out,
                matched,
            }
        } else {
            Markup {
                rendered: text.to_string(),
                matched,
            }
        }
    }
}

impl Default for MarkupParser {
    fn default() -> Self {
        Self::new()
    }
}
