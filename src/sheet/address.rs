//! A1-style address text: shape checks, sheet qualifiers and column letters.
//!
//! Address grammar:
//!
//! ```text
//! address := [sheet "!"] ["$"] LETTERS ["$"] DIGITS
//! sheet   := BARE_NAME | "'" QUOTED_NAME "'"
//! ```
//!
//! Rows are 1-based in text and 0-based in [`Cell`]. Columns use bijective
//! base-26 letters (`A` = 0, `Z` = 25, `AA` = 26, ..., `XFD` = 16383).

use super::cell::{Cell, MAX_COLS, MAX_ROWS};
use crate::common::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;
use std::fmt;

// Unanchored on purpose: a qualified address like `Sheet1!A1` contains the shape.
static ADDRESS_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[$]?[A-Z]+[$]?[1-9][0-9]*").expect("valid address pattern"));
static LETTER_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Z]+").expect("valid letter pattern"));
static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+").expect("valid digit pattern"));

/// Address text that passed the fast shape check.
///
/// Construction via [`Address::parse`] does not validate bounds or the sheet
/// name; [`Address::to_cell`] performs the full conversion.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address(String);

impl Address {
    /// Check that `text` looks like a cell address.
    ///
    /// This is intentionally lenient: `B1000000000000000` passes here and
    /// only fails later, in [`Address::to_cell`].
    pub fn parse(text: &str) -> Result<Self> {
        if !is_address(text) {
            return Err(Error::InvalidFormat(text.to_string()));
        }
        Ok(Self(text.to_string()))
    }

    /// The raw address text.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert the address into a [`Cell`].
    ///
    /// An explicit sheet prefix wins over `default_sheet`. Without either,
    /// the conversion fails with [`Error::MissingSheet`].
    pub fn to_cell(&self, default_sheet: Option<&str>) -> Result<Cell> {
        let split = split_address(&self.0)?;
        let sheet = match split.sheet {
            Some(sheet) => sheet.into_owned(),
            None => match default_sheet.filter(|s| !s.is_empty()) {
                Some(sheet) => sheet.to_string(),
                None => return Err(Error::MissingSheet(self.0.clone())),
            },
        };
        local_to_cell(sheet, split.local)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether `text` contains an address-shaped run such as `A1`, `$A$1` or `AZ10`.
#[inline]
pub fn is_address(text: &str) -> bool {
    ADDRESS_SHAPE.is_match(text)
}

/// Address split into its optional sheet and its local part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SplitAddress<'a> {
    pub sheet: Option<Cow<'a, str>>,
    pub local: &'a str,
}

/// Split `Sheet1!A1` / `'My Sheet'!A1` on the last `!`.
pub(crate) fn split_address(address: &str) -> Result<SplitAddress<'_>> {
    let Some(bang) = address.rfind('!') else {
        return Ok(SplitAddress {
            sheet: None,
            local: address,
        });
    };

    let sheet = unescape_sheet_name(&address[..bang])?;
    if sheet.is_empty() {
        return Err(Error::MissingSheet(address.to_string()));
    }

    Ok(SplitAddress {
        sheet: Some(sheet),
        local: &address[bang + 1..],
    })
}

/// Strip the quotes around a sheet name and collapse doubled quotes.
fn unescape_sheet_name(raw: &str) -> Result<Cow<'_, str>> {
    let quoted_start = raw.starts_with('\'');
    let quoted_end = raw.len() >= 2 && raw.ends_with('\'');

    match (quoted_start, quoted_end) {
        (false, false) => Ok(Cow::Borrowed(raw)),
        (true, true) => {
            let inner = &raw[1..raw.len() - 1];
            if inner.contains("''") {
                Ok(Cow::Owned(inner.replace("''", "'")))
            } else {
                Ok(Cow::Borrowed(inner))
            }
        },
        _ => Err(Error::InvalidFormat(format!("unbalanced quotes in sheet name {raw}"))),
    }
}

/// Decode the local part (`$C$1`, `AZ10`, ...) of an address.
fn local_to_cell(sheet: String, local: &str) -> Result<Cell> {
    let mut letters = LETTER_RUN.find_iter(local);
    let (Some(letter_run), None) = (letters.next(), letters.next()) else {
        return Err(Error::InvalidLocalAddress(format!("{local}: expected one letter run")));
    };
    let mut digits = DIGIT_RUN.find_iter(local);
    let (Some(digit_run), None) = (digits.next(), digits.next()) else {
        return Err(Error::InvalidLocalAddress(format!("{local}: expected one digit run")));
    };

    let row = digit_run
        .as_str()
        .parse::<u64>()
        .ok()
        .and_then(|row| row.checked_sub(1))
        .filter(|row| *row < u64::from(MAX_ROWS))
        .ok_or_else(|| Error::OutOfRange(format!("row {} in {local}", digit_run.as_str())))?;
    let col = letters_to_column(letter_run.as_str())?;
    let (row_rel, col_rel) = relativeness(local);

    Ok(Cell::from_parts(sheet, row as u32, col, row_rel, col_rel))
}

/// Per-axis relativity from the dollar signs of a local address.
///
/// Returns `(row_rel, col_rel)`:
/// - no dollar: both relative
/// - one dollar in front of the letters: column absolute
/// - one dollar elsewhere: row absolute
/// - two dollars with a leading one: both absolute
fn relativeness(local: &str) -> (bool, bool) {
    let dollars = local.bytes().filter(|b| *b == b'$').count();
    if dollars == 0 {
        return (true, true);
    }
    let col_rel = !local.starts_with('$');
    let row_rel = !((dollars == 2 && !col_rel) || (dollars == 1 && col_rel));
    (row_rel, col_rel)
}

/// Convert column letters to a 0-based column index.
///
/// `A` = 0, `Z` = 25, `AA` = 26, `AZ` = 51, `XFD` = 16383. This helper folds
/// case, but address text itself must use uppercase letters: `a1` is not a
/// valid address.
pub fn letters_to_column(letters: &str) -> Result<u32> {
    if letters.is_empty() {
        return Err(Error::InvalidLocalAddress("empty column letters".to_string()));
    }

    let mut column: u32 = 0;
    for ch in letters.chars() {
        if !ch.is_ascii_alphabetic() {
            return Err(Error::InvalidLocalAddress(format!("column letters {letters}")));
        }
        let digit = u32::from(ch.to_ascii_uppercase() as u8 - b'A') + 1;
        column = column
            .checked_mul(26)
            .and_then(|c| c.checked_add(digit))
            .filter(|c| *c <= MAX_COLS)
            .ok_or_else(|| Error::OutOfRange(format!("column {letters}")))?;
    }

    Ok(column - 1)
}

/// Convert a 0-based column index to its letters.
pub fn column_to_letters(col: u32) -> Result<String> {
    if col >= MAX_COLS {
        return Err(Error::OutOfRange(format!("column index {col}")));
    }
    let mut out = String::with_capacity(3);
    push_column_letters(&mut out, col);
    Ok(out)
}

/// Append the bijective base-26 letters of `col` to `out`.
pub(crate) fn push_column_letters(out: &mut String, col: u32) {
    let mut buf = [0u8; 8];
    let mut pos = buf.len();
    let mut dividend = u64::from(col) + 1;

    while dividend > 0 {
        let modulo = (dividend - 1) % 26;
        pos -= 1;
        buf[pos] = b'A' + modulo as u8;
        dividend = (dividend - modulo) / 26;
    }

    // Only ASCII uppercase letters were written.
    out.extend(buf[pos..].iter().map(|b| char::from(*b)));
}

/// Whether a sheet name must be quoted in an address.
///
/// Bare names start with something other than a digit or a dot and contain
/// only ASCII letters, digits and underscores.
pub fn needs_quoting(sheet: &str) -> bool {
    let mut chars = sheet.chars();
    match chars.next() {
        None => true,
        Some(first) if first.is_ascii_digit() || first == '.' => true,
        Some(first) => !(is_bare_char(first) && chars.all(is_bare_char)),
    }
}

#[inline]
fn is_bare_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// Append `sheet` followed by `!`, quoting it when required.
pub(crate) fn push_sheet_prefix(out: &mut String, sheet: &str) {
    if needs_quoting(sheet) {
        out.push('\'');
        out.push_str(&sheet.replace('\'', "''"));
        out.push('\'');
    } else {
        out.push_str(sheet);
    }
    out.push('!');
}
