//! Table layout – content-driven or fixed column widths, a header row and
//! optionally striped data rows, drawn as bordered cells.
//!
//! Cells are written as `"<A>**<text>"` where `<A>` is `L`, `C` or `R`:
//!
//! ```text
//! headers: ["C**Name", "R**Amount"]
//! row:     ["L**Coffee", "R**3.50"]
//! ```

use serde::{Deserialize, Serialize};

use crate::backend::{Cell, PageBackend};
use crate::document::Document;
use crate::style::{Alignment, Style};

/// Padding added to every measured column.
pub const COLUMN_PADDING: f32 = 6.0;

/// Separator between the alignment code and the cell text.
const ALIGN_SEPARATOR: &str = "**";

/// One parsed cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellSpec {
    pub align: Alignment,
    pub text: String,
}

impl CellSpec {
    /// Split on the first `**`. Without a separator the cell is left-aligned
    /// and the whole string is its text.
    pub fn parse(spec: &str) -> Self {
        match spec.split_once(ALIGN_SEPARATOR) {
            Some((code, text)) => Self {
                align: Alignment::from_code(code),
                text: text.to_string(),
            },
            None => Self {
                align: Alignment::Left,
                text: spec.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub header_style: Style,
    pub row_style: Style,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>, header_style: Style, row_style: Style) -> Self {
        Self {
            headers,
            rows,
            header_style,
            row_style,
        }
    }

    /// Widest of the header and every row.
    pub fn column_count(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0)
    }
}

impl<B: PageBackend> Document<B> {
    /// Width of every column: the widest rounded cell text plus 6pt. Headers
    /// are measured in the header style's font, rows in the row style's.
    pub fn column_widths(&mut self, table: &Table) -> Vec<f32> {
        let mut widths = vec![0.0f32; table.column_count()];

        self.set_style(&table.header_style, true);
        for (i, header) in table.headers.iter().enumerate() {
            let w = self.string_width(&CellSpec::parse(header).text).round() + COLUMN_PADDING;
            widths[i] = widths[i].max(w);
        }

        self.set_style(&table.row_style, true);
        for row in &table.rows {
            for (i, cell) in row.iter().enumerate() {
                let w = self.string_width(&CellSpec::parse(cell).text).round() + COLUMN_PADDING;
                widths[i] = widths[i].max(w);
            }
        }
        widths
    }

    /// Draw the header row. A `fixed_width` other than 0 overrides the
    /// computed column widths.
    pub fn render_table_header(&mut self, table: &Table, fixed_width: f32) {
        let widths = self.widths_for(table, fixed_width);
        self.draw_header(table, &widths, fixed_width);
    }

    /// Draw the data rows, using `alternate` on every odd row when given,
    /// then restore the full "Normal" style.
    pub fn render_table_rows(&mut self, table: &Table, alternate: Option<&Style>, fixed_width: f32) {
        let widths = self.widths_for(table, fixed_width);
        self.draw_rows(table, &widths, alternate, fixed_width);
    }

    /// Add a complete table: two blank lines, the header, the rows and one
    /// trailing blank line. Striping is enabled only by an alternate style
    /// with a non-empty name.
    pub fn add_table(&mut self, table: &Table, alternate: Option<&Style>, fixed_width: f32) {
        let alternate = alternate.filter(|s| !s.name.is_empty());
        self.backend.new_line(None);
        self.backend.new_line(None);

        let widths = self.column_widths(table);
        log::debug!("Table with {} columns, widths {widths:?}", widths.len());
        self.draw_header(table, &widths, fixed_width);
        self.draw_rows(table, &widths, alternate, fixed_width);

        self.reset_font();
        self.backend.new_line(None);
    }

    /// Equal column width filling the text area; 0 for no columns.
    pub fn distribute_columns_evenly(&self, columns: usize) -> f32 {
        if columns == 0 {
            return 0.0;
        }
        (self.width() - (self.margins.left + self.margins.right)) / columns as f32
    }

    fn widths_for(&mut self, table: &Table, fixed_width: f32) -> Vec<f32> {
        if fixed_width != 0.0 {
            vec![fixed_width; table.column_count()]
        } else {
            self.column_widths(table)
        }
    }

    fn draw_header(&mut self, table: &Table, widths: &[f32], fixed_width: f32) {
        let style = &table.header_style;
        self.set_style(style, false);
        for (i, header) in table.headers.iter().enumerate() {
            let spec = CellSpec::parse(header);
            self.backend.cell(&Cell {
                width: column_width(widths, i, fixed_width),
                height: style.line_height,
                text: &spec.text,
                border: style.border.width.top,
                align: spec.align,
                fill: true,
            });
        }
        self.backend.new_line(None);
    }

    fn draw_rows(&mut self, table: &Table, widths: &[f32], alternate: Option<&Style>, fixed_width: f32) {
        let row_style = &table.row_style;
        for (r, row) in table.rows.iter().enumerate() {
            match alternate {
                Some(alt) if r % 2 == 1 => self.set_style(alt, false),
                _ => self.set_style(row_style, false),
            }
            for (i, cell) in row.iter().enumerate() {
                let spec = CellSpec::parse(cell);
                self.backend.cell(&Cell {
                    width: column_width(widths, i, fixed_width),
                    height: row_style.line_height,
                    text: &spec.text,
                    border: row_style.border.width.top,
                    align: spec.align,
                    fill: true,
                });
            }
            self.backend.new_line(None);
        }

        match self.styles.resolve(crate::style::NORMAL) {
            Ok(normal) => self.set_style(&normal, false),
            Err(e) => log::warn!("Cannot restore style after table: {e}"),
        }
    }
}

fn column_width(widths: &[f32], column: usize, fixed_width: f32) -> f32 {
    if fixed_width != 0.0 {
        fixed_width
    } else {
        widths.get(column).copied().unwrap_or_default()
    }
}
