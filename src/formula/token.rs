//! Classified formula tokens.
//!
//! A token is the unit handed from a lexer to the parser. The type/subtype
//! vocabulary follows the common Excel formula tokenizer contract:
//!
//! | type              | subtypes                              |
//! |-------------------|---------------------------------------|
//! | `Operand`         | `Number`, `Text`, `Logical`, `Range`, `Error` |
//! | `OperatorInfix`   | -                                     |
//! | `OperatorPrefix`  | -                                     |
//! | `OperatorPostfix` | -                                     |
//! | `Function`        | `Start`, `Stop`                       |
//! | `Subexpression`   | `Start`, `Stop`                       |
//! | `Argument`        | -                                     |

use std::fmt;

/// Token type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TokenType {
    /// Literal or reference
    Operand,
    /// Binary operator such as `+` or `<>`
    OperatorInfix,
    /// Prefix operator (`-`)
    OperatorPrefix,
    /// Postfix operator (`%`)
    OperatorPostfix,
    /// Function call boundary
    Function,
    /// Parenthesised group boundary
    Subexpression,
    /// Function argument separator
    Argument,
    /// Whitespace run, only seen before classification
    Whitespace,
    /// Anything else, including the end-of-stream marker
    #[default]
    Noop,
}

impl TokenType {
    /// Name used by the tokenizer contract.
    pub fn as_str(self) -> &'static str {
        match self {
            TokenType::Operand => "Operand",
            TokenType::OperatorInfix => "OperatorInfix",
            TokenType::OperatorPrefix => "OperatorPrefix",
            TokenType::OperatorPostfix => "OperatorPostfix",
            TokenType::Function => "Function",
            TokenType::Subexpression => "Subexpression",
            TokenType::Argument => "Argument",
            TokenType::Whitespace => "Whitespace",
            TokenType::Noop => "Noop",
        }
    }

    /// Look up a contract name; unknown names map to [`TokenType::Noop`].
    pub fn from_name(name: &str) -> Self {
        match name {
            "Operand" => TokenType::Operand,
            "OperatorInfix" => TokenType::OperatorInfix,
            "OperatorPrefix" => TokenType::OperatorPrefix,
            "OperatorPostfix" => TokenType::OperatorPostfix,
            "Function" => TokenType::Function,
            "Subexpression" => TokenType::Subexpression,
            "Argument" => TokenType::Argument,
            "Whitespace" => TokenType::Whitespace,
            _ => TokenType::Noop,
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token subtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TokenSubtype {
    #[default]
    Nothing,
    Start,
    Stop,
    Text,
    Number,
    Logical,
    Error,
    Range,
}

impl TokenSubtype {
    /// Name used by the tokenizer contract (empty for [`TokenSubtype::Nothing`]).
    pub fn as_str(self) -> &'static str {
        match self {
            TokenSubtype::Nothing => "",
            TokenSubtype::Start => "Start",
            TokenSubtype::Stop => "Stop",
            TokenSubtype::Text => "Text",
            TokenSubtype::Number => "Number",
            TokenSubtype::Logical => "Logical",
            TokenSubtype::Error => "Error",
            TokenSubtype::Range => "Range",
        }
    }

    /// Look up a contract name; unknown names such as the operator subtype
    /// `Math` map to [`TokenSubtype::Nothing`].
    pub fn from_name(name: &str) -> Self {
        match name {
            "Start" => TokenSubtype::Start,
            "Stop" => TokenSubtype::Stop,
            "Text" => TokenSubtype::Text,
            "Number" => TokenSubtype::Number,
            "Logical" => TokenSubtype::Logical,
            "Error" => TokenSubtype::Error,
            "Range" => TokenSubtype::Range,
            _ => TokenSubtype::Nothing,
        }
    }
}

impl fmt::Display for TokenSubtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified token with its raw text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Token {
    pub kind: TokenType,
    pub subtype: TokenSubtype,
    pub value: String,
}

impl Token {
    pub fn new(kind: TokenType, subtype: TokenSubtype, value: impl Into<String>) -> Self {
        Self {
            kind,
            subtype,
            value: value.into(),
        }
    }

    /// Build a token from the string triple emitted by an external lexer.
    pub fn from_raw(kind: &str, subtype: &str, value: impl Into<String>) -> Self {
        Self::new(TokenType::from_name(kind), TokenSubtype::from_name(subtype), value)
    }

    #[inline]
    pub fn operand(subtype: TokenSubtype, value: impl Into<String>) -> Self {
        Self::new(TokenType::Operand, subtype, value)
    }

    #[inline]
    pub fn infix(symbol: impl Into<String>) -> Self {
        Self::new(TokenType::OperatorInfix, TokenSubtype::Nothing, symbol)
    }

    #[inline]
    pub fn prefix(symbol: impl Into<String>) -> Self {
        Self::new(TokenType::OperatorPrefix, TokenSubtype::Nothing, symbol)
    }

    #[inline]
    pub fn postfix(symbol: impl Into<String>) -> Self {
        Self::new(TokenType::OperatorPostfix, TokenSubtype::Nothing, symbol)
    }

    /// Whether this token has the given type and, unless `subtype` is
    /// [`TokenSubtype::Nothing`], the given subtype.
    #[inline]
    pub fn is(&self, kind: TokenType, subtype: TokenSubtype) -> bool {
        self.kind == kind && (subtype == TokenSubtype::Nothing || self.subtype == subtype)
    }

    /// Ends an operand: an operand, a closing boundary, or a postfix operator.
    pub(crate) fn ends_operand(&self) -> bool {
        match self.kind {
            TokenType::Operand | TokenType::OperatorPostfix => true,
            TokenType::Function | TokenType::Subexpression => self.subtype == TokenSubtype::Stop,
            _ => false,
        }
    }

    /// Starts an operand: an operand or an opening boundary.
    pub(crate) fn starts_operand(&self) -> bool {
        match self.kind {
            TokenType::Operand => true,
            TokenType::Function | TokenType::Subexpression => self.subtype == TokenSubtype::Start,
            _ => false,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if self.subtype != TokenSubtype::Nothing {
            write!(f, "/{}", self.subtype)?;
        }
        write!(f, " {:?}", self.value)
    }
}
