//! Formula text as stored in a cell.

use super::ast::Node;
use super::parser::parse;
use super::shift::shift_formula;
use crate::common::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static COMMA_WITH_SPACES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*,\s*").expect("valid comma pattern"));

/// Cell content known to be a formula: `=` followed by at least one character.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Formula(String);

impl Formula {
    pub fn new(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        if text.len() > 1 && text.starts_with('=') {
            Ok(Self(text))
        } else {
            Err(Error::InvalidFormat(format!("not a formula: {text}")))
        }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse into a tree, resolving unqualified references against `sheet`.
    pub fn parse(&self, sheet: &str) -> Result<Node> {
        parse(&self.0, sheet)
    }

    /// Shifted copy, see [`shift_formula`].
    pub fn shift(&self, rows: i64, cols: i64, sheet: &str) -> Result<Self> {
        shift_formula(&self.0, rows, cols, sheet).map(Self)
    }

    /// Copy with every `$` removed.
    ///
    /// Lossy: meant for comparing formulas while ignoring absolute markers.
    pub fn without_dollars(&self) -> Self {
        Self(self.0.replace('$', ""))
    }

    /// Copy with whitespace around commas removed, so `SUM(A1, B1)` reads
    /// `SUM(A1,B1)`.
    ///
    /// Lossy: commas inside quoted sheet names and text literals are
    /// rewritten too.
    pub fn without_comma_spaces(&self) -> Self {
        Self(COMMA_WITH_SPACES.replace_all(&self.0, ",").into_owned())
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Formula {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for Formula {
    type Error = Error;

    fn try_from(text: &str) -> Result<Self> {
        Self::new(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_leading_equals() {
        assert!(Formula::new("=A1").is_ok());
        assert!(matches!(Formula::new("="), Err(Error::InvalidFormat(_))));
        assert!(matches!(Formula::new("A1"), Err(Error::InvalidFormat(_))));
        assert!(matches!(Formula::try_from(""), Err(Error::InvalidFormat(_))));
    }

    #[test]
    fn test_normalisation_helpers() {
        let formula = Formula::new("=SUM($A$1 ,  B$2)").unwrap();
        assert_eq!(formula.without_dollars().as_str(), "=SUM(A1 ,  B2)");
        assert_eq!(formula.without_comma_spaces().as_str(), "=SUM($A$1,B$2)");
    }

    #[test]
    fn test_shift_and_parse() {
        let formula = Formula::new("=A1+1").unwrap();
        let shifted = formula.shift(1, 1, "Sheet1").unwrap();
        assert_eq!(shifted.to_string(), "=B2+1");
        assert!(shifted.parse("Sheet1").unwrap().children().len() == 2);
    }
}
