//! Rectangular cell ranges.
//!
//! Text ranges are inclusive (`A1:B2` covers four cells). Internally a
//! [`Range`] is half-open: `end` sits one row and one column past the last
//! included cell, so `end - start` is the size. The conversion happens only
//! when parsing text and when rendering it back.

use super::address::Address;
use super::cell::{Bounds, Cell};
use crate::common::error::{Error, Result};
use serde::Serialize;
use std::fmt;

/// A half-open rectangle of cells on a single sheet.
///
/// Reversed ranges such as `B1:A1` are kept as written; they simply contain
/// no cells.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Range {
    start: Cell,
    end: Cell,
}

impl Range {
    /// Build a range from its start and its half-open end.
    ///
    /// The end is moved onto the start's sheet. An end on row 0 or column 0
    /// would close the range before the first cell and fails `OutOfRange`.
    pub fn new(start: Cell, mut end: Cell) -> Result<Self> {
        if !Bounds::RANGE_END.contains(end.row(), end.col()) {
            return Err(Error::OutOfRange(format!(
                "range end at row index {}, column index {}",
                end.row(),
                end.col()
            )));
        }
        end.set_sheet(start.sheet());
        Ok(Self { start, end })
    }

    /// Build a range from an inclusive end, as written in formula text.
    pub fn from_inclusive(start: Cell, end: Cell) -> Result<Self> {
        let end = end.translate(1, 1, Bounds::RANGE_END)?;
        Self::new(start, end)
    }

    /// Parse `A1:B2`, `Sheet2!$A$1:B2` or `'My Sheet'!A1:B2`.
    ///
    /// The start resolves against `sheet`; the end resolves against the
    /// start's sheet and is then forced onto it, so `Sheet2!A1:Sheet3!A5`
    /// lies entirely on `Sheet2`.
    pub fn parse(text: &str, sheet: &str) -> Result<Self> {
        let (start_text, end_text) = split_range(text)?;
        let start_addr = Address::parse(start_text)?;
        let end_addr = Address::parse(end_text)?;

        let start = start_addr.to_cell(Some(sheet))?;
        let end = end_addr.to_cell(Some(start.sheet()))?;
        Self::from_inclusive(start, end)
    }

    /// First included cell.
    #[inline]
    pub fn start(&self) -> &Cell {
        &self.start
    }

    /// One past the last included cell on both axes.
    #[inline]
    pub fn end(&self) -> &Cell {
        &self.end
    }

    /// Sheet shared by both endpoints.
    #[inline]
    pub fn sheet(&self) -> &str {
        self.start.sheet()
    }

    /// Last included cell, as written in formula text.
    pub fn inclusive_end(&self) -> Cell {
        let end = &self.end;
        Cell::from_parts(
            end.sheet().to_string(),
            end.row().saturating_sub(1),
            end.col().saturating_sub(1),
            end.row_rel(),
            end.col_rel(),
        )
    }

    /// Number of rows covered; zero for reversed ranges.
    pub fn row_count(&self) -> u32 {
        self.end.row().saturating_sub(self.start.row())
    }

    /// Number of columns covered; zero for reversed ranges.
    pub fn col_count(&self) -> u32 {
        self.end.col().saturating_sub(self.start.col())
    }

    /// Whether the range covers no cell at all.
    pub fn is_empty(&self) -> bool {
        self.row_count() == 0 || self.col_count() == 0
    }

    /// Iterate over the covered cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        let cols = self.start.col()..self.end.col();
        (self.start.row()..self.end.row()).flat_map(move |row| {
            cols.clone()
                .map(move |col| Cell::from_parts(self.sheet().to_string(), row, col, true, true))
        })
    }

    /// Translate both endpoints unconditionally.
    pub fn shift(&self, rows: i64, cols: i64) -> Result<Self> {
        Ok(Self {
            start: self.start.shift(rows, cols)?,
            end: self.end.translate(rows, cols, Bounds::RANGE_END)?,
        })
    }

    /// Translate each axis of each endpoint only when that axis is relative.
    pub fn shift_if_rel(&self, rows: i64, cols: i64) -> Result<Self> {
        Ok(Self {
            start: self.start.shift_if_rel(rows, cols)?,
            end: self.end.translate_if_rel(rows, cols, Bounds::RANGE_END)?,
        })
    }

    /// Inclusive text form, omitting the sheet when it is `relative_sheet`.
    ///
    /// The end never carries a sheet qualifier.
    pub fn to_string_rel(&self, relative_sheet: &str) -> String {
        let mut out = self.start.to_address_rel(relative_sheet);
        out.push(':');
        self.inclusive_end().push_local(&mut out);
        out
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.inclusive_end().to_local_address())
    }
}

/// Byte offsets of the colons outside quoted sheet names.
fn unquoted_colons(text: &str) -> impl Iterator<Item = usize> + '_ {
    let mut in_quotes = false;
    text.char_indices().filter_map(move |(idx, ch)| match ch {
        '\'' => {
            in_quotes = !in_quotes;
            None
        },
        ':' if !in_quotes => Some(idx),
        _ => None,
    })
}

/// Whether reference text names a range rather than a single cell.
pub(crate) fn is_range_text(text: &str) -> bool {
    unquoted_colons(text).next().is_some()
}

/// Split range text on its single colon, ignoring colons inside quoted sheet names.
fn split_range(text: &str) -> Result<(&str, &str)> {
    let mut colons = unquoted_colons(text);
    match (colons.next(), colons.next()) {
        (Some(idx), None) => Ok((&text[..idx], &text[idx + 1..])),
        _ => Err(Error::InvalidRange(text.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::cell::{MAX_COLS, MAX_ROWS};

    #[test]
    fn test_parse_rejects_bad_ranges() {
        assert!(matches!(Range::parse("A1:", "Sheet1"), Err(Error::InvalidFormat(_))));
        assert!(matches!(Range::parse(":B1", "Sheet1"), Err(Error::InvalidFormat(_))));
        assert!(matches!(Range::parse("B:C", "Sheet1"), Err(Error::InvalidFormat(_))));
        assert!(matches!(Range::parse("A1", "Sheet1"), Err(Error::InvalidRange(_))));
        assert!(matches!(Range::parse("A1:B2:C3", "Sheet1"), Err(Error::InvalidRange(_))));
    }

    #[test]
    fn test_parse_is_half_open() {
        let range = Range::parse("A1:B1", "Sheet1").unwrap();
        assert_eq!((range.start().row(), range.start().col()), (0, 0));
        assert_eq!((range.end().row(), range.end().col()), (1, 2));
        assert_eq!(range.row_count(), 1);
        assert_eq!(range.col_count(), 2);
        assert_eq!(range.to_string(), "Sheet1!A1:B1");
    }

    #[test]
    fn test_end_sheet_follows_start() {
        let range = Range::parse("Sheet2!A1:Sheet3!A5", "Sheet1").unwrap();
        assert_eq!(range.start().sheet(), "Sheet2");
        assert_eq!(range.end().sheet(), "Sheet2");

        let range = Range::parse("Sheet2!A1:B2", "Sheet1").unwrap();
        assert_eq!(range.end().sheet(), "Sheet2");

        let range = Range::parse("A1:Sheet2!A5", "Sheet1").unwrap();
        assert_eq!(range.sheet(), "Sheet1");
        assert_eq!(range.end().sheet(), "Sheet1");
    }

    #[test]
    fn test_new_rejects_end_before_first_cell() {
        let start = Cell::new("S", 0, 0).unwrap();
        for (row, col) in [(0, 2), (2, 0), (0, 0)] {
            let end = Cell::new("S", row, col).unwrap();
            assert!(matches!(Range::new(start.clone(), end), Err(Error::OutOfRange(_))));
        }

        let end = Cell::new("Other", 2, 2).unwrap();
        let range = Range::new(start, end).unwrap();
        assert_eq!(range.end().sheet(), "S");
        assert_eq!(range.to_string(), "S!$A$1:$B$2");
    }

    #[test]
    fn test_quoted_sheet_name() {
        let range = Range::parse("'Q1 Sales (2024)'!A1:B2", "Sheet1").unwrap();
        assert_eq!(range.sheet(), "Q1 Sales (2024)");
        assert_eq!(range.to_string_rel("Sheet1"), "'Q1 Sales (2024)'!A1:B2");
    }

    #[test]
    fn test_range_text_ignores_quoted_colons() {
        assert!(is_range_text("A1:B2"));
        assert!(is_range_text("'Q1 Sales'!A1:B2"));
        assert!(!is_range_text("'Q1: Sales'!A1"));
        assert!(!is_range_text("$C$5"));
    }

    #[test]
    fn test_reversed_range_is_kept_and_empty() {
        let range = Range::parse("B1:A1", "Sheet1").unwrap();
        assert_eq!(range.start().col(), 1);
        assert_eq!(range.end().col(), 1);
        assert!(range.is_empty());
        assert_eq!(range.cells().count(), 0);
        assert_eq!(range.to_string_rel("Sheet1"), "B1:A1");
    }

    #[test]
    fn test_cells_row_major() {
        let range = Range::parse("A1:B2", "S").unwrap();
        let cells: Vec<String> = range.cells().map(|c| c.to_local_address()).collect();
        assert_eq!(cells, ["A1", "B1", "A2", "B2"]);
    }

    #[test]
    fn test_full_sheet_range() {
        let range = Range::parse("A1:XFD1048576", "S").unwrap();
        assert_eq!((range.end().row(), range.end().col()), (MAX_ROWS, MAX_COLS));
        assert_eq!(range.to_string_rel("S"), "A1:XFD1048576");
        assert!(range.shift(1, 0).is_err());
    }

    #[test]
    fn test_to_string_rel() {
        let range = Range::parse("General!$C$52:$I$56", "Cashflow").unwrap();
        assert_eq!(range.to_string_rel("Cashflow"), "General!$C$52:$I$56");
        assert_eq!(range.to_string_rel("General"), "$C$52:$I$56");
    }

    #[test]
    fn test_shift_if_rel_per_endpoint() {
        let range = Range::parse("$C$51:$I51", "S").unwrap();
        let shifted = range.shift_if_rel(3, 5).unwrap();
        assert_eq!(shifted.to_string_rel("S"), "$C$51:$I54");

        let range = Range::parse("A1:B1", "S").unwrap();
        assert_eq!(range.shift_if_rel(5, 3).unwrap().to_string_rel("S"), "D6:E6");
        assert_eq!(range.shift(5, 3).unwrap().to_string_rel("S"), "D6:E6");
        assert!(matches!(range.shift_if_rel(-1, 0), Err(Error::OutOfRange(_))));
    }

    #[test]
    fn test_reversed_range_cannot_shift_end_off_sheet() {
        let range = Range::parse("A5:A1", "S").unwrap();
        assert!(matches!(range.shift_if_rel(-1, 0), Err(Error::OutOfRange(_))));
    }
}
