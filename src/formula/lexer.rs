//! Built-in formula tokenizer.
//!
//! Produces the classified token contract consumed by the parser. Scanning
//! runs in two passes: the first splits the text into raw tokens (operands,
//! operators, boundaries and whitespace runs); the second resolves what the
//! first pass cannot know locally, such as whether a `-` is a negation or a
//! subtraction, whether whitespace is the intersection operator, and
//! whether a bare operand is a number, a logical or a reference.

use super::token::{Token, TokenSubtype, TokenType};
use crate::common::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::iter::Peekable;
use std::str::CharIndices;

/// Mantissa awaiting an exponent sign, e.g. the `1.5E` of `1.5E+3`.
static SCIENTIFIC_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]*\.?[0-9]+[Ee]$").expect("valid scientific pattern"));

static NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]+\.?[0-9]*|\.[0-9]+)([Ee][+-]?[0-9]+)?$").expect("valid number pattern")
});

const ERROR_LITERALS: [&str; 8] = [
    "#NULL!",
    "#DIV/0!",
    "#VALUE!",
    "#REF!",
    "#NAME?",
    "#NUM!",
    "#N/A",
    "#GETTING_DATA",
];

/// Tokenize formula text, with or without its leading `=`.
///
/// # Example
///
/// ```
/// use cellshift::formula::lexer::tokenize;
/// use cellshift::formula::token::{TokenSubtype, TokenType};
///
/// let tokens = tokenize("=SUM(A1:B2)*-2").unwrap();
/// assert_eq!(tokens[0].kind, TokenType::Function);
/// assert_eq!(tokens[1].subtype, TokenSubtype::Range);
/// assert_eq!(tokens[4].kind, TokenType::OperatorPrefix);
/// ```
pub fn tokenize(formula: &str) -> Result<Vec<Token>> {
    let trimmed = formula.trim_start();
    let offset = formula.len() - trimmed.len();
    let (body, offset) = match trimmed.strip_prefix('=') {
        Some(rest) => (rest, offset + 1),
        None => (trimmed, offset),
    };

    let raw = Scanner::new(body.trim_end(), offset).scan()?;
    Ok(classify(raw))
}

/// First pass: split text into raw tokens.
struct Scanner<'a> {
    text: &'a str,
    chars: Peekable<CharIndices<'a>>,
    /// Offset of `text` inside the caller's formula, for error reporting.
    base: usize,
    tokens: Vec<Token>,
    operand: String,
    /// Open function and subexpression boundaries.
    open: Vec<TokenType>,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str, base: usize) -> Self {
        Self {
            text,
            chars: text.char_indices().peekable(),
            base,
            tokens: Vec::new(),
            operand: String::new(),
            open: Vec::new(),
        }
    }

    fn scan(mut self) -> Result<Vec<Token>> {
        while let Some((at, ch)) = self.chars.next() {
            match ch {
                '"' => {
                    self.flush();
                    let text = self.quoted_text(at)?;
                    self.tokens.push(Token::operand(TokenSubtype::Text, text));
                },
                '\'' => {
                    self.operand.push(ch);
                    self.sheet_quote(at)?;
                },
                '[' => {
                    self.operand.push(ch);
                    self.bracket(at)?;
                },
                '#' if self.operand.is_empty() => {
                    match ERROR_LITERALS.iter().find(|lit| self.text[at..].starts_with(**lit)) {
                        Some(lit) => {
                            // the literal is ASCII, so skipping chars skips bytes
                            for _ in 1..lit.len() {
                                self.chars.next();
                            }
                            self.tokens.push(Token::operand(TokenSubtype::Error, *lit));
                        },
                        None => self.operand.push(ch),
                    }
                },
                '+' | '-' if SCIENTIFIC_PREFIX.is_match(&self.operand) => self.operand.push(ch),
                '+' | '-' | '*' | '/' | '^' | '&' | '=' => {
                    self.flush();
                    self.tokens.push(Token::infix(ch.to_string()));
                },
                '<' | '>' => {
                    self.flush();
                    let symbol = match (ch, self.chars.peek().map(|&(_, next)| next)) {
                        ('<', Some('=')) | ('>', Some('=')) | ('<', Some('>')) => {
                            let (_, next) = self.chars.next().unwrap_or((at, ch));
                            format!("{ch}{next}")
                        },
                        _ => ch.to_string(),
                    };
                    self.tokens.push(Token::infix(symbol));
                },
                '%' => {
                    self.flush();
                    self.tokens.push(Token::postfix("%"));
                },
                '(' => {
                    if self.operand.is_empty() {
                        self.open.push(TokenType::Subexpression);
                        self.tokens
                            .push(Token::new(TokenType::Subexpression, TokenSubtype::Start, ""));
                    } else {
                        let name = std::mem::take(&mut self.operand);
                        self.open.push(TokenType::Function);
                        self.tokens
                            .push(Token::new(TokenType::Function, TokenSubtype::Start, name));
                    }
                },
                ')' => {
                    self.flush();
                    let kind = self.open.pop().ok_or_else(|| self.error(at, "unmatched ')'"))?;
                    self.tokens.push(Token::new(kind, TokenSubtype::Stop, ""));
                },
                ',' => {
                    self.flush();
                    if self.open.last() == Some(&TokenType::Function) {
                        self.tokens
                            .push(Token::new(TokenType::Argument, TokenSubtype::Nothing, ","));
                    } else {
                        self.tokens.push(Token::infix(","));
                    }
                },
                '{' | '}' | ';' => {
                    return Err(self.error(at, "array constants are not supported"));
                },
                ch if ch.is_whitespace() => {
                    self.flush();
                    while self.chars.next_if(|&(_, next)| next.is_whitespace()).is_some() {}
                    self.tokens
                        .push(Token::new(TokenType::Whitespace, TokenSubtype::Nothing, " "));
                },
                _ => self.operand.push(ch),
            }
        }

        self.flush();
        Ok(self.tokens)
    }

    /// Emit the pending operand, still unclassified.
    fn flush(&mut self) {
        if !self.operand.is_empty() {
            let value = std::mem::take(&mut self.operand);
            self.tokens.push(Token::operand(TokenSubtype::Nothing, value));
        }
    }

    /// Read a double-quoted string body, resolving `""` escapes.
    fn quoted_text(&mut self, start: usize) -> Result<String> {
        let mut text = String::new();
        while let Some((_, ch)) = self.chars.next() {
            if ch == '"' {
                if self.chars.next_if(|&(_, next)| next == '"').is_none() {
                    return Ok(text);
                }
            }
            text.push(ch);
        }
        Err(self.error(start, "unterminated string"))
    }

    /// Copy a quoted sheet name into the operand verbatim, `''` included.
    fn sheet_quote(&mut self, start: usize) -> Result<()> {
        while let Some((_, ch)) = self.chars.next() {
            self.operand.push(ch);
            if ch == '\'' {
                match self.chars.next_if(|&(_, next)| next == '\'') {
                    Some((_, escaped)) => self.operand.push(escaped),
                    None => return Ok(()),
                }
            }
        }
        Err(self.error(start, "unterminated sheet name"))
    }

    fn bracket(&mut self, start: usize) -> Result<()> {
        while let Some((_, ch)) = self.chars.next() {
            self.operand.push(ch);
            if ch == ']' {
                return Ok(());
            }
        }
        Err(self.error(start, "unterminated '['"))
    }

    fn error(&self, at: usize, message: &str) -> Error {
        Error::Lex {
            offset: self.base + at,
            message: message.to_string(),
        }
    }
}

/// Second pass: resolve whitespace, signs and operand subtypes.
fn classify(raw: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(raw.len());

    for (i, mut token) in raw.iter().cloned().enumerate() {
        match token.kind {
            TokenType::Whitespace => {
                let after_operand = i > 0 && raw[i - 1].ends_operand();
                let before_operand = raw.get(i + 1).is_some_and(Token::starts_operand);
                if after_operand && before_operand {
                    out.push(Token::infix(" "));
                }
            },
            TokenType::OperatorInfix if token.value == "-" || token.value == "+" => {
                let binary = out.last().is_some_and(Token::ends_operand);
                if binary {
                    out.push(token);
                } else if token.value == "-" {
                    token.kind = TokenType::OperatorPrefix;
                    out.push(token);
                }
            },
            TokenType::Operand if token.subtype == TokenSubtype::Nothing => {
                token.subtype = operand_subtype(&token.value);
                out.push(token);
            },
            _ => out.push(token),
        }
    }

    out
}

fn operand_subtype(value: &str) -> TokenSubtype {
    if value.eq_ignore_ascii_case("TRUE") || value.eq_ignore_ascii_case("FALSE") {
        TokenSubtype::Logical
    } else if NUMBER.is_match(value) {
        TokenSubtype::Number
    } else {
        TokenSubtype::Range
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(formula: &str) -> Vec<(TokenType, TokenSubtype, String)> {
        tokenize(formula)
            .unwrap()
            .into_iter()
            .map(|t| (t.kind, t.subtype, t.value))
            .collect()
    }

    fn values(formula: &str) -> Vec<String> {
        tokenize(formula).unwrap().into_iter().map(|t| t.value).collect()
    }

    #[test]
    fn test_simple_binary() {
        assert_eq!(
            kinds("=A1+5"),
            vec![
                (TokenType::Operand, TokenSubtype::Range, "A1".to_string()),
                (TokenType::OperatorInfix, TokenSubtype::Nothing, "+".to_string()),
                (TokenType::Operand, TokenSubtype::Number, "5".to_string()),
            ]
        );
    }

    #[test]
    fn test_function_arguments() {
        let tokens = tokenize("SUM(A1:B2, 3)").unwrap();
        assert!(tokens[0].is(TokenType::Function, TokenSubtype::Start));
        assert_eq!(tokens[0].value, "SUM");
        assert!(tokens[1].is(TokenType::Operand, TokenSubtype::Range));
        assert_eq!(tokens[2].kind, TokenType::Argument);
        assert!(tokens[3].is(TokenType::Operand, TokenSubtype::Number));
        assert!(tokens[4].is(TokenType::Function, TokenSubtype::Stop));
        assert_eq!(tokens.len(), 5);
    }

    #[test]
    fn test_comma_outside_function_is_union() {
        let tokens = tokenize("(A1,B2)").unwrap();
        assert_eq!(tokens[2], Token::infix(","));
        assert!(tokens[4].is(TokenType::Subexpression, TokenSubtype::Stop));
    }

    #[test]
    fn test_prefix_and_binary_minus() {
        let tokens = tokenize("-A1--2").unwrap();
        assert_eq!(tokens[0].kind, TokenType::OperatorPrefix);
        assert_eq!(tokens[2].kind, TokenType::OperatorInfix);
        assert_eq!(tokens[3].kind, TokenType::OperatorPrefix);
    }

    #[test]
    fn test_unary_plus_is_dropped() {
        assert_eq!(values("+A1*+2"), ["A1", "*", "2"]);
    }

    #[test]
    fn test_whitespace_intersection() {
        let tokens = tokenize("A1:B2 B1:C3").unwrap();
        assert_eq!(tokens[1], Token::infix(" "));
        // spaces around operators carry no meaning
        assert_eq!(values(" A1 +  B2 "), ["A1", "+", "B2"]);
    }

    #[test]
    fn test_text_with_escaped_quotes() {
        let tokens = tokenize(r#"="say ""hi"""&A1"#).unwrap();
        assert_eq!(tokens[0], Token::operand(TokenSubtype::Text, r#"say "hi""#));
        assert_eq!(tokens[1], Token::infix("&"));
    }

    #[test]
    fn test_quoted_sheet_stays_in_operand() {
        let tokens = tokenize("'My Sheet''s'!A1:B2+1").unwrap();
        assert_eq!(tokens[0].value, "'My Sheet''s'!A1:B2");
        assert_eq!(tokens[0].subtype, TokenSubtype::Range);
    }

    #[test]
    fn test_comparison_operators() {
        assert_eq!(values("A1<>B1"), ["A1", "<>", "B1"]);
        assert_eq!(values("A1<=B1"), ["A1", "<=", "B1"]);
        assert_eq!(values("A1>=B1"), ["A1", ">=", "B1"]);
        assert_eq!(values("A1<B1"), ["A1", "<", "B1"]);
    }

    #[test]
    fn test_scientific_number() {
        let tokens = tokenize("1.5E+3*2").unwrap();
        assert_eq!(tokens[0], Token::operand(TokenSubtype::Number, "1.5E+3"));
        assert_eq!(tokens[1], Token::infix("*"));
    }

    #[test]
    fn test_percent_and_logical() {
        let tokens = tokenize("50%&true").unwrap();
        assert_eq!(tokens[0], Token::operand(TokenSubtype::Number, "50"));
        assert_eq!(tokens[1], Token::postfix("%"));
        assert_eq!(tokens[3], Token::operand(TokenSubtype::Logical, "true"));
    }

    #[test]
    fn test_error_literal() {
        let tokens = tokenize("IF(A1,#N/A,#DIV/0!)").unwrap();
        assert_eq!(tokens[3], Token::operand(TokenSubtype::Error, "#N/A"));
        assert_eq!(tokens[5], Token::operand(TokenSubtype::Error, "#DIV/0!"));
    }

    #[test]
    fn test_lex_errors() {
        assert!(matches!(tokenize("\"abc"), Err(Error::Lex { offset: 0, .. })));
        assert!(matches!(tokenize("=A1)"), Err(Error::Lex { offset: 3, .. })));
        assert!(matches!(tokenize("{1,2}"), Err(Error::Lex { .. })));
        assert!(matches!(tokenize("'Sheet1!A1"), Err(Error::Lex { .. })));
    }

    #[test]
    fn test_unclosed_group_is_left_to_the_parser() {
        let tokens = tokenize("(A1+5").unwrap();
        assert_eq!(tokens.len(), 4);
    }
}
