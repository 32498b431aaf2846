//! Symbolic page positions – two-letter codes such as `"tl"` or `"cc"`
//! resolved against the page size and session margins.

use serde::{Deserialize, Serialize};

use crate::backend::PageBackend;
use crate::document::Document;
use crate::error::{Error, Result};

/// A point on the page in points, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Vertical {
    Top,
    Center,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Horizontal {
    Left,
    Center,
    Right,
}

/// A parsed position code: vertical letter `t`/`c`/`b` then horizontal
/// letter `l`/`c`/`r`, case-insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anchor {
    pub vertical: Vertical,
    pub horizontal: Horizontal,
}

impl Anchor {
    pub fn parse(code: &str) -> Result<Self> {
        let invalid = || Error::InvalidPosition(code.to_string());
        let lower = code.to_lowercase();
        let mut chars = lower.chars();
        let (Some(v), Some(h), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(invalid());
        };
        let vertical = match v {
            't' => Vertical::Top,
            'c' => Vertical::Center,
            'b' => Vertical::Bottom,
            _ => return Err(invalid()),
        };
        let horizontal = match h {
            'l' => Horizontal::Left,
            'c' => Horizontal::Center,
            'r' => Horizontal::Right,
            _ => return Err(invalid()),
        };
        Ok(Self { vertical, horizontal })
    }
}

impl<B: PageBackend> Document<B> {
    /// Coordinates of an anchor: top/bottom sit on the margins, center is
    /// half the page; left/right sit on the margins.
    pub fn anchor_point(&self, anchor: Anchor) -> Point {
        let m = &self.margins;
        let y = match anchor.vertical {
            Vertical::Top => m.top,
            Vertical::Center => self.height() / 2.0,
            Vertical::Bottom => self.height() - m.bottom,
        };
        let x = match anchor.horizontal {
            Horizontal::Left => m.left,
            Horizontal::Center => self.width() / 2.0,
            Horizontal::Right => self.width() - m.right,
        };
        Point { x, y }
    }

    pub fn resolve_position(&self, code: &str) -> Result<Point> {
        Anchor::parse(code).map(|anchor| self.anchor_point(anchor))
    }

    /// Like [`resolve_position`](Self::resolve_position), but an invalid
    /// code is logged and resolves to the page origin.
    pub fn position_or_origin(&self, code: &str) -> Point {
        self.resolve_position(code).unwrap_or_else(|e| {
            log::warn!("{e}");
            Point::default()
        })
    }
}
