//! Plain text tables with ASCII borders.
//!
//! ```rust
//! use tbd::table::TextTable;
//!
//! let mut table = TextTable::new();
//! table.set_header(["Label", "Value"]).unwrap();
//! table.add_row(["OS", "linux"]).unwrap();
//!
//! assert_eq!(
//!     table.draw(),
//!     "+-------+-------+\n\
//!      | Label | Value |\n\
//!      +-------+-------+\n\
//!      | OS    | linux |\n\
//!      +-------+-------+"
//! );
//! ```
//!
//! Column widths use Unicode display width, so wide characters line up.
//! A cell containing newlines spans several physical rows.
//!
//! Cells are left-aligned. With [`TextTable::set_align_numbers`] enabled,
//! cells holding a number (see [`decide_alignment`]) are right-aligned.

use thiserror::Error;
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("no headers")]
    NoHeaders,

    #[error("no cells")]
    EmptyRow,

    #[error("row has {cells} cells but the header has {width}")]
    RowTooWide { cells: usize, width: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left,
    Right,
}

/// Right for decimal integers, hex integers (with or without `0x`) and
/// floats; left for everything else.
pub fn decide_alignment(cell: &str) -> Alignment {
    let hex = cell.strip_prefix("0x").unwrap_or(cell);
    let numeric = cell.parse::<i64>().is_ok()
        || i64::from_str_radix(hex, 16).is_ok()
        || cell.parse::<f64>().is_ok();
    if numeric {
        Alignment::Right
    } else {
        Alignment::Left
    }
}

#[derive(Debug, Clone)]
struct Cell {
    text: String,
    // alignment of the whole logical cell, shared by its lines
    numeric: Alignment,
}

#[derive(Debug, Clone)]
enum Row {
    Cells(Vec<Cell>),
    Line,
}

/// A table of text cells.
#[derive(Debug, Clone, Default)]
pub struct TextTable {
    header: Vec<Row>,
    rows: Vec<Row>,
    columns: usize,
    align_numbers: bool,
}

impl TextTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the header. The number of headers fixes the column count.
    ///
    /// Rows added before are padded to the new column count; a header
    /// narrower than an existing row is rejected.
    pub fn set_header<I, S>(&mut self, headers: I) -> Result<(), TableError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let headers: Vec<String> = headers.into_iter().map(Into::into).collect();
        if headers.is_empty() {
            return Err(TableError::NoHeaders);
        }
        let widest = self.rows.iter().map(Row::len).max().unwrap_or(0);
        if widest > headers.len() {
            return Err(TableError::RowTooWide {
                cells: widest,
                width: headers.len(),
            });
        }

        self.columns = headers.len();
        self.header = split_lines(&headers);
        for row in &mut self.rows {
            if let Row::Cells(cells) = row {
                cells.resize_with(self.columns, Cell::empty);
            }
        }
        Ok(())
    }

    /// Adds a row; missing trailing cells are left empty.
    pub fn add_row<I, S>(&mut self, cells: I) -> Result<(), TableError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut cells: Vec<String> = cells.into_iter().map(Into::into).collect();
        if cells.is_empty() {
            return Err(TableError::EmptyRow);
        }
        if cells.len() > self.columns {
            return Err(TableError::RowTooWide {
                cells: cells.len(),
                width: self.columns,
            });
        }
        cells.resize(self.columns, String::new());
        self.rows.extend(split_lines(&cells));
        Ok(())
    }

    /// Adds a horizontal border between rows.
    pub fn add_row_line(&mut self) {
        self.rows.push(Row::Line);
    }

    /// Right-aligns numeric cells when enabled.
    pub fn set_align_numbers(&mut self, enabled: bool) {
        self.align_numbers = enabled;
    }

    /// Renders the table, without a trailing newline.
    pub fn draw(&self) -> String {
        let widths = self.widths();
        let border = border(&widths);
        let mut lines = vec![border.clone()];
        lines.extend(self.header.iter().map(|row| self.render(row, &widths, &border)));
        lines.push(border.clone());
        lines.extend(self.rows.iter().map(|row| self.render(row, &widths, &border)));
        if !self.rows.is_empty() {
            lines.push(border);
        }
        lines.join("\n")
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths = vec![0; self.columns];
        for row in self.header.iter().chain(&self.rows) {
            if let Row::Cells(cells) = row {
                for (width, cell) in widths.iter_mut().zip(cells) {
                    *width = (*width).max(cell.text.width());
                }
            }
        }
        widths
    }

    fn render(&self, row: &Row, widths: &[usize], border: &str) -> String {
        match row {
            Row::Line => border.to_string(),
            Row::Cells(cells) => {
                let mut out = String::from("|");
                for (cell, width) in cells.iter().zip(widths) {
                    let padding = " ".repeat(width.saturating_sub(cell.text.width()));
                    out.push(' ');
                    if self.align_numbers && cell.numeric == Alignment::Right {
                        out.push_str(&padding);
                        out.push_str(&cell.text);
                    } else {
                        out.push_str(&cell.text);
                        out.push_str(&padding);
                    }
                    out.push_str(" |");
                }
                out
            }
        }
    }
}

impl Row {
    fn len(&self) -> usize {
        match self {
            Row::Cells(cells) => cells.len(),
            Row::Line => 0,
        }
    }
}

impl Cell {
    fn empty() -> Self {
        Self {
            text: String::new(),
            numeric: Alignment::Left,
        }
    }
}

/// Splits multi-line cells into physical rows.
fn split_lines(cells: &[String]) -> Vec<Row> {
    let split: Vec<(Vec<&str>, Alignment)> = cells
        .iter()
        .map(|c| (c.split('\n').collect(), decide_alignment(c)))
        .collect();
    let height = split.iter().map(|(lines, _)| lines.len()).max().unwrap_or(1);
    (0..height)
        .map(|line| {
            let row = split
                .iter()
                .map(|(lines, numeric)| Cell {
                    text: lines.get(line).copied().unwrap_or("").to_string(),
                    numeric: *numeric,
                })
                .collect();
            Row::Cells(row)
        })
        .collect()
}

fn border(widths: &[usize]) -> String {
    let mut out = String::from("+");
    for width in widths {
        out.push_str(&"-".repeat(width + 2));
        out.push('+');
    }
    out
}
