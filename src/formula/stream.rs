//! Token stream with lookahead predicates.

use super::token::{Token, TokenSubtype, TokenType};
use crate::common::error::{Error, Result};
use crate::sheet::range::is_range_text;

/// Cursor over a token sequence.
///
/// One empty token is appended on construction, so [`TokenStream::peek`]
/// always has something to return and lookahead never runs past the buffer.
#[derive(Debug, Clone)]
pub struct TokenStream {
    tokens: Vec<Token>,
    position: usize,
}

impl TokenStream {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        tokens.push(Token::default());
        Self {
            tokens,
            position: 0,
        }
    }

    /// Current token; the empty end marker once everything is consumed.
    #[inline]
    pub fn peek(&self) -> &Token {
        &self.tokens[self.position]
    }

    /// Move past the current token.
    ///
    /// Fails with [`Error::EndOfInput`] when the current token is the end marker.
    pub fn advance(&mut self) -> Result<()> {
        if self.position + 1 >= self.tokens.len() {
            return Err(Error::EndOfInput {
                position: self.position,
            });
        }
        self.position += 1;
        Ok(())
    }

    /// Number of tokens consumed so far. Never decreases.
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Whether only the end marker is left.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.position + 1 == self.tokens.len()
    }

    /// Number of real tokens, excluding the end marker.
    #[inline]
    pub fn len(&self) -> usize {
        self.tokens.len() - 1
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn next_is(&self, kind: TokenType, subtype: TokenSubtype) -> bool {
        self.peek().is(kind, subtype)
    }

    pub fn next_is_open_paren(&self) -> bool {
        self.next_is(TokenType::Subexpression, TokenSubtype::Start)
    }

    pub fn next_is_close_paren(&self) -> bool {
        self.next_is(TokenType::Subexpression, TokenSubtype::Stop)
    }

    /// Number, text, logical, cell or range operand.
    pub fn next_is_terminal(&self) -> bool {
        self.next_is_number()
            || self.next_is_text()
            || self.next_is_range()
            || self.next_is_cell()
            || self.next_is_logical()
    }

    pub fn next_is_function_call(&self) -> bool {
        self.next_is(TokenType::Function, TokenSubtype::Start)
    }

    pub fn next_is_argument_separator(&self) -> bool {
        self.next_is(TokenType::Argument, TokenSubtype::Nothing)
    }

    pub fn next_is_function_end(&self) -> bool {
        self.next_is(TokenType::Function, TokenSubtype::Stop)
    }

    pub fn next_is_binary_operator(&self) -> bool {
        self.next_is(TokenType::OperatorInfix, TokenSubtype::Nothing)
    }

    pub fn next_is_prefix_operator(&self) -> bool {
        self.next_is(TokenType::OperatorPrefix, TokenSubtype::Nothing)
    }

    pub fn next_is_postfix_operator(&self) -> bool {
        self.next_is(TokenType::OperatorPostfix, TokenSubtype::Nothing)
    }

    /// Range operand containing a colon outside any quoted sheet name,
    /// e.g. `A1:B2`.
    pub fn next_is_range(&self) -> bool {
        self.next_is(TokenType::Operand, TokenSubtype::Range) && is_range_text(&self.peek().value)
    }

    /// Range operand without such a colon, i.e. a single cell.
    pub fn next_is_cell(&self) -> bool {
        self.next_is(TokenType::Operand, TokenSubtype::Range) && !is_range_text(&self.peek().value)
    }

    pub fn next_is_number(&self) -> bool {
        self.next_is(TokenType::Operand, TokenSubtype::Number)
    }

    pub fn next_is_text(&self) -> bool {
        self.next_is(TokenType::Operand, TokenSubtype::Text)
    }

    pub fn next_is_logical(&self) -> bool {
        self.next_is(TokenType::Operand, TokenSubtype::Logical)
    }
}
