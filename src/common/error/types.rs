//! Unified error type for formula parsing, serialization and shifting.
//!
//! Every fallible operation in the crate fails with exactly one of these
//! variants, describing the first failure encountered. No operation returns
//! a partial tree alongside an error.
use thiserror::Error;

/// Main error type for cellshift operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Text does not have the shape of a cell address
    #[error("Invalid address format: {0}")]
    InvalidFormat(String),

    /// Address carries no sheet and no default sheet was supplied
    #[error("Missing sheet name for address: {0}")]
    MissingSheet(String),

    /// Local part of an address is not one letter run followed by one digit run
    #[error("Invalid local address: {0}")]
    InvalidLocalAddress(String),

    /// Row or column outside the sheet bounds
    #[error("Out of range: {0}")]
    OutOfRange(String),

    /// Range text is not two endpoints separated by a single colon
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    /// Formula moved between two different sheets
    #[error("Cannot move formula from sheet '{from}' to sheet '{to}'")]
    CrossSheetMove { from: String, to: String },

    /// Operand or operator stack was empty when a value was required
    #[error("Stack underflow: {0}")]
    StackUnderflow(&'static str),

    /// Sentinel bookkeeping of the operator stack was broken
    #[error("Stack invariant violated: {0}")]
    StackInvariantViolation(&'static str),

    /// Parser loop did not advance the token position
    #[error("Parser made no progress at token {position}")]
    NoProgress { position: usize },

    /// Parsing finished without producing an expression
    #[error("Formula produced no expression")]
    EmptyResult,

    /// Attempt to advance past the end of the token stream
    #[error("Unexpected end of input at token {position}")]
    EndOfInput { position: usize },

    /// Token that cannot be used where it appears
    #[error("Invalid token at {position}: {message}")]
    InvalidToken { position: usize, message: String },

    /// Nesting deeper than the configured limit
    #[error("Nesting depth exceeds limit of {limit}")]
    DepthLimitExceeded { limit: usize },

    /// Tokens left over after the expression (strict mode only)
    #[error("Unconsumed tokens starting at token {position}")]
    TrailingTokens { position: usize },

    /// Built-in tokenizer failure
    #[error("Lex error at offset {offset}: {message}")]
    Lex { offset: usize, message: String },
}

/// Result type for cellshift operations.
pub type Result<T> = std::result::Result<T, Error>;
