//! # styled-pdf – named styles and paginated layout on top of a PDF page backend
//!
//! This crate turns "write this text in style *Heading 1*", "put this image at
//! the bottom right" or "add this table" into positioned drawing operations.
//! The pipeline stages are:
//!
//! 1. **Style** – resolve a named style with a "Normal" fallback ([`style`])
//! 2. **Markup** – turn `__bold__`, `_*italic*_`, `_#underline#_` into rich
//!    text ([`markup`], [`richtext`])
//! 3. **Flow** – write at the cursor with heading spacing, decoration lines and
//!    page breaks ([`flow`]), place images ([`image`]) and tables ([`table`])
//! 4. **Record** – wrap lines and record drawing operations per page on a
//!    [`PageBackend`] ([`backend`])
//! 5. **Render** – emit PDF bytes via printpdf ([`render`])
//!
//! ```no_run
//! use styled_pdf::{Alignment, Document, Margins, SessionConfig};
//!
//! let config = SessionConfig::new("Letter", false, Margins::narrow());
//! let mut doc = Document::start(&config)?;
//! doc.write_centered("Title", Alignment::Center, "Quarterly Report")?;
//! doc.page_break();
//! doc.write("Normal", Alignment::Left, "Revenue grew __twelve percent__.")?;
//! doc.finish("report.pdf")?;
//! # Ok::<(), styled_pdf::Error>(())
//! ```

pub mod backend;
pub mod config;
pub mod document;
pub mod error;
pub mod flow;
pub mod fonts;
pub mod header_footer;
pub mod image;
pub mod markup;
pub mod page;
pub mod position;
pub mod render;
pub mod richtext;
pub mod style;
pub mod table;
pub mod units;

// Re-exports for convenience
pub use backend::{Canvas, DocumentInfo, PageBackend, PageHook};
pub use config::SessionConfig;
pub use document::Document;
pub use error::{Error, Result};
pub use flow::FlowState;
pub use header_footer::{ContentBlock, HeaderFooter, PageNumber};
pub use image::{Image, InsetSide};
pub use page::{Margins, Orientation, Page, PageSize};
pub use position::Point;
pub use style::{Alignment, Color, Style, StyleLookup, StyleRegistry};
pub use table::{CellSpec, Table};
