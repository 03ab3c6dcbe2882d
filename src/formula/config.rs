/// Configuration options for formula parsing.
///
/// # Examples
///
/// ```rust
/// use cellshift::formula::FormulaOptions;
///
/// // Create with defaults
/// let options = FormulaOptions::default();
///
/// // Or customize
/// let options = FormulaOptions::new()
///     .with_max_depth(64)
///     .with_reject_trailing_tokens(true);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormulaOptions {
    /// Deepest nesting of parentheses, prefix operators and function calls
    /// accepted while parsing, and the tallest tree built from them
    pub max_depth: usize,
    /// Whether tokens left after the expression fail the parse
    pub reject_trailing_tokens: bool,
}

impl Default for FormulaOptions {
    fn default() -> Self {
        Self {
            max_depth: 256,
            reject_trailing_tokens: false,
        }
    }
}

impl FormulaOptions {
    /// Create a new `FormulaOptions` with default values.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the nesting limit.
    ///
    /// Parsing fails with `DepthLimitExceeded` once a formula nests deeper
    /// or its tree grows taller, as a long `=1+1+...+1` chain does.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cellshift::formula::FormulaOptions;
    ///
    /// let options = FormulaOptions::new().with_max_depth(16);
    /// ```
    #[inline]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set whether unconsumed tokens are an error.
    ///
    /// By default leftovers after a complete expression, such as the `%` in
    /// `=A1%`, are ignored.
    #[inline]
    pub fn with_reject_trailing_tokens(mut self, reject: bool) -> Self {
        self.reject_trailing_tokens = reject;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formula_options_builder() {
        let options = FormulaOptions::new()
            .with_max_depth(8)
            .with_reject_trailing_tokens(true);

        assert_eq!(options.max_depth, 8);
        assert!(options.reject_trailing_tokens);
    }

    #[test]
    fn test_formula_options_default() {
        let options = FormulaOptions::default();
        assert_eq!(options.max_depth, 256);
        assert!(!options.reject_trailing_tokens);
    }
}
