//! Cell references with per-axis relative/absolute flags.

use super::address::{Address, push_column_letters, push_sheet_prefix};
use crate::common::error::{Error, Result};
use serde::Serialize;
use std::fmt;

/// Number of rows in a sheet (2^20).
pub const MAX_ROWS: u32 = 1_048_576;

/// Number of columns in a sheet (2^14).
pub const MAX_COLS: u32 = 16_384;

/// Inclusive coordinate limits for one kind of reference.
///
/// A plain cell lives in `[0, MAX)`. The end of a half-open range sits one
/// past its last included cell, so it lives in `[1, MAX]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Bounds {
    pub min_row: u32,
    pub max_row: u32,
    pub min_col: u32,
    pub max_col: u32,
}

impl Bounds {
    pub const CELL: Bounds = Bounds {
        min_row: 0,
        max_row: MAX_ROWS - 1,
        min_col: 0,
        max_col: MAX_COLS - 1,
    };

    pub const RANGE_END: Bounds = Bounds {
        min_row: 1,
        max_row: MAX_ROWS,
        min_col: 1,
        max_col: MAX_COLS,
    };

    /// Whether (`row`, `col`) lies inside these bounds.
    #[inline]
    pub fn contains(&self, row: u32, col: u32) -> bool {
        (self.min_row..=self.max_row).contains(&row) && (self.min_col..=self.max_col).contains(&col)
    }
}

/// A single cell reference.
///
/// Rows and columns are 0-based. `row_rel`/`col_rel` record whether the axis
/// moves when the containing formula is relocated (`A1`) or stays pinned
/// (`$A$1`). Two cells are equal when all five fields are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    sheet: String,
    row: u32,
    col: u32,
    row_rel: bool,
    col_rel: bool,
}

impl Cell {
    /// Create an absolute reference to (`row`, `col`) on `sheet`.
    pub fn new(sheet: impl Into<String>, row: u32, col: u32) -> Result<Self> {
        if row >= MAX_ROWS {
            return Err(Error::OutOfRange(format!("row index {row}")));
        }
        if col >= MAX_COLS {
            return Err(Error::OutOfRange(format!("column index {col}")));
        }
        Ok(Self::from_parts(sheet.into(), row, col, false, false))
    }

    #[inline]
    pub(crate) fn from_parts(sheet: String, row: u32, col: u32, row_rel: bool, col_rel: bool) -> Self {
        Self {
            sheet,
            row,
            col,
            row_rel,
            col_rel,
        }
    }

    /// Parse an address such as `B3`, `$B$3` or `'My Sheet'!B$3`.
    ///
    /// Unqualified addresses resolve against `default_sheet`; an empty
    /// `default_sheet` means there is none.
    pub fn parse(text: &str, default_sheet: &str) -> Result<Self> {
        Address::parse(text)?.to_cell(Some(default_sheet))
    }

    /// Sheet this cell belongs to.
    #[inline]
    pub fn sheet(&self) -> &str {
        &self.sheet
    }

    /// 0-based row index.
    #[inline]
    pub fn row(&self) -> u32 {
        self.row
    }

    /// 0-based column index.
    #[inline]
    pub fn col(&self) -> u32 {
        self.col
    }

    /// Whether the row moves with the formula.
    #[inline]
    pub fn row_rel(&self) -> bool {
        self.row_rel
    }

    /// Whether the column moves with the formula.
    #[inline]
    pub fn col_rel(&self) -> bool {
        self.col_rel
    }

    /// Same cell with the given relativity flags.
    pub fn with_relativity(mut self, row_rel: bool, col_rel: bool) -> Self {
        self.row_rel = row_rel;
        self.col_rel = col_rel;
        self
    }

    /// Same cell with both axes relative (dollars stripped).
    pub fn to_relative(&self) -> Self {
        self.clone().with_relativity(true, true)
    }

    /// Same cell with both axes absolute (dollars added).
    pub fn to_absolute(&self) -> Self {
        self.clone().with_relativity(false, false)
    }

    pub(crate) fn set_sheet(&mut self, sheet: &str) {
        if self.sheet != sheet {
            self.sheet = sheet.to_string();
        }
    }

    /// Fully qualified address, e.g. `Sheet1!$A1`.
    pub fn to_address(&self) -> String {
        let mut out = String::with_capacity(self.sheet.len() + 10);
        push_sheet_prefix(&mut out, &self.sheet);
        self.push_local(&mut out);
        out
    }

    /// Address without the sheet qualifier when the cell lives on `relative_sheet`.
    pub fn to_address_rel(&self, relative_sheet: &str) -> String {
        if self.sheet == relative_sheet {
            self.to_local_address()
        } else {
            self.to_address()
        }
    }

    /// Address without any sheet qualifier, e.g. `$A1`.
    pub fn to_local_address(&self) -> String {
        let mut out = String::with_capacity(10);
        self.push_local(&mut out);
        out
    }

    pub(crate) fn push_local(&self, out: &mut String) {
        if !self.col_rel {
            out.push('$');
        }
        push_column_letters(out, self.col);
        if !self.row_rel {
            out.push('$');
        }
        out.push_str(itoa::Buffer::new().format(u64::from(self.row) + 1));
    }

    /// Translate both axes by the given deltas, regardless of relativity.
    pub fn shift(&self, rows: i64, cols: i64) -> Result<Self> {
        self.translate(rows, cols, Bounds::CELL)
    }

    /// Translate only the relative axes; absolute axes stay pinned.
    pub fn shift_if_rel(&self, rows: i64, cols: i64) -> Result<Self> {
        self.translate_if_rel(rows, cols, Bounds::CELL)
    }

    pub(crate) fn translate_if_rel(&self, rows: i64, cols: i64, bounds: Bounds) -> Result<Self> {
        let rows = if self.row_rel { rows } else { 0 };
        let cols = if self.col_rel { cols } else { 0 };
        self.translate(rows, cols, bounds)
    }

    /// Move the cell, checking each delta against the room left on its axis
    /// before any arithmetic happens.
    pub(crate) fn translate(&self, rows: i64, cols: i64, bounds: Bounds) -> Result<Self> {
        let row = i64::from(self.row);
        let col = i64::from(self.col);

        if rows < i64::from(bounds.min_row) - row || rows > i64::from(bounds.max_row) - row {
            return Err(Error::OutOfRange(format!(
                "cannot shift row {} by {rows}",
                self.row + 1
            )));
        }
        if cols < i64::from(bounds.min_col) - col || cols > i64::from(bounds.max_col) - col {
            return Err(Error::OutOfRange(format!(
                "cannot shift column {} by {cols}",
                self.col + 1
            )));
        }

        Ok(Self {
            sheet: self.sheet.clone(),
            row: (row + rows) as u32,
            col: (col + cols) as u32,
            row_rel: self.row_rel,
            col_rel: self.col_rel,
        })
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_address())
    }
}
