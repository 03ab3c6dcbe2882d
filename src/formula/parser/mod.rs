//! Formula parser.
//!
//! Drives a [`TokenStream`] through the [`ShuntingYard`] to build a [`Node`]
//! tree. Operator precedence is resolved by the yard; this module only
//! decides what each token starts (a literal, a group, a negation or a
//! function call) and opens a fresh sentinel scope for every group and
//! argument list.
//!
//! # Example
//!
//! ```
//! use cellshift::formula::{parse, serialize};
//!
//! let tree = parse("=(A1+B2)-C3*D4/E5", "Sheet1").unwrap();
//! assert_eq!(serialize(&tree, "Sheet1"), "=A1+B2-C3*D4/E5");
//! ```

mod terminal;

use super::ast::Node;
use super::config::FormulaOptions;
use super::lexer::tokenize;
use super::operators::{BinaryOp, UnaryOp};
use super::shunting_yard::{Operator, ShuntingYard};
use super::stream::TokenStream;
use super::token::Token;
use crate::common::error::{Error, Result};
use tracing::{debug, trace};

/// Build a tree from classified tokens, resolving unqualified references
/// against `sheet`.
pub fn build_tree(tokens: Vec<Token>, sheet: &str) -> Result<Node> {
    build_tree_with(tokens, sheet, FormulaOptions::default())
}

pub fn build_tree_with(tokens: Vec<Token>, sheet: &str, options: FormulaOptions) -> Result<Node> {
    FormulaParser::new(tokens, sheet, options).build()
}

/// Tokenize and parse formula text.
pub fn parse(formula: &str, sheet: &str) -> Result<Node> {
    parse_with(formula, sheet, FormulaOptions::default())
}

pub fn parse_with(formula: &str, sheet: &str, options: FormulaOptions) -> Result<Node> {
    build_tree_with(tokenize(formula)?, sheet, options)
}

/// Parser state for one formula.
pub struct FormulaParser<'a> {
    stream: TokenStream,
    sheet: &'a str,
    options: FormulaOptions,
    /// Current nesting of groups, negations and calls. The yard separately
    /// caps the height of the tree built from them.
    depth: usize,
}

impl<'a> FormulaParser<'a> {
    pub fn new(tokens: Vec<Token>, sheet: &'a str, options: FormulaOptions) -> Self {
        Self {
            stream: TokenStream::new(tokens),
            sheet,
            options,
            depth: 0,
        }
    }

    /// Parse the whole stream into a single tree.
    pub fn build(mut self) -> Result<Node> {
        let mut yard = ShuntingYard::new().with_depth_limit(self.options.max_depth);
        self.parse_expression(&mut yard)?;

        if self.options.reject_trailing_tokens && !self.stream.is_exhausted() {
            return Err(Error::TrailingTokens {
                position: self.stream.position(),
            });
        }

        let tree = yard.finish()?;
        debug!(
            tokens = self.stream.len(),
            consumed = self.stream.position(),
            depth = tree.depth(),
            "built formula tree"
        );
        Ok(tree)
    }

    /// One operand expression followed by any number of
    /// `operator operand-expression` pairs, reduced down to this scope's
    /// sentinel.
    fn parse_expression(&mut self, yard: &mut ShuntingYard<Node>) -> Result<()> {
        self.parse_operand_expression(yard)?;

        let mut last = None;
        while self.stream.next_is_binary_operator() {
            self.ensure_progress(&mut last)?;
            let op = self.binary_operator()?;
            yard.push_operator(Operator::Binary(op))?;
            self.stream.advance()?;
            self.parse_operand_expression(yard)?;
        }

        yard.reduce_scope()
    }

    fn parse_operand_expression(&mut self, yard: &mut ShuntingYard<Node>) -> Result<()> {
        if self.stream.next_is_terminal() {
            self.parse_terminal(yard)
        } else if self.stream.next_is_open_paren() {
            self.descend(|parser| {
                parser.stream.advance()?;
                yard.within_sentinel(|yard| parser.parse_expression(yard))?;
                parser.expect_close_paren()
            })
        } else if self.stream.next_is_prefix_operator() {
            self.descend(|parser| {
                let op = parser.prefix_operator()?;
                yard.push_operator(Operator::Unary(op))?;
                parser.stream.advance()?;
                parser.parse_operand_expression(yard)
            })
        } else if self.stream.next_is_function_call() {
            self.descend(|parser| parser.parse_function_call(yard))
        } else {
            // Tolerated: the caller sees the missing operand, if any, as an
            // underflow when the scope is reduced.
            trace!(
                position = self.stream.position(),
                kind = %self.stream.peek().kind,
                "no operand expression at token"
            );
            Ok(())
        }
    }

    fn parse_function_call(&mut self, yard: &mut ShuntingYard<Node>) -> Result<()> {
        let name = self.stream.peek().value.clone();
        self.stream.advance()?;

        yard.within_sentinel(|yard| {
            let mut count = 0;
            let mut last = None;
            while !self.stream.next_is_function_end() {
                self.ensure_progress(&mut last)?;
                self.parse_expression(yard)?;
                count += 1;
                if self.stream.next_is_argument_separator() {
                    self.stream.advance()?;
                }
            }
            yard.reduce_call(count, |args| Node::function(name, args))
        })?;

        self.stream.advance()
    }

    fn expect_close_paren(&mut self) -> Result<()> {
        if self.stream.next_is_close_paren() {
            return self.stream.advance();
        }
        let position = self.stream.position();
        if self.stream.is_exhausted() {
            Err(Error::EndOfInput { position })
        } else {
            Err(Error::InvalidToken {
                position,
                message: format!("expected ')', found {}", self.stream.peek()),
            })
        }
    }

    fn binary_operator(&self) -> Result<BinaryOp> {
        let token = self.stream.peek();
        BinaryOp::from_symbol(&token.value).ok_or_else(|| Error::InvalidToken {
            position: self.stream.position(),
            message: format!("unknown binary operator {:?}", token.value),
        })
    }

    fn prefix_operator(&self) -> Result<UnaryOp> {
        let token = self.stream.peek();
        UnaryOp::from_symbol(&token.value).ok_or_else(|| Error::InvalidToken {
            position: self.stream.position(),
            message: format!("unknown prefix operator {:?}", token.value),
        })
    }

    /// Fail when a loop iteration starts where the previous one did.
    fn ensure_progress(&self, last: &mut Option<usize>) -> Result<()> {
        let position = self.stream.position();
        if last.replace(position) == Some(position) {
            return Err(Error::NoProgress { position });
        }
        Ok(())
    }

    /// Run `body` one nesting level deeper.
    fn descend(&mut self, body: impl FnOnce(&mut Self) -> Result<()>) -> Result<()> {
        if self.depth >= self.options.max_depth {
            return Err(Error::DepthLimitExceeded {
                limit: self.options.max_depth,
            });
        }
        self.depth += 1;
        let result = body(self);
        self.depth -= 1;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::token::{TokenSubtype, TokenType};
    use crate::sheet::{Cell, Range};

    fn cell(text: &str) -> Node {
        Node::Cell(Cell::parse(text, "Sheet1").unwrap())
    }

    #[test]
    fn test_precedence_and_grouping() {
        let tree = parse("=A1+B1*C1", "Sheet1").unwrap();
        assert_eq!(
            tree,
            Node::binary(
                BinaryOp::Add,
                cell("A1"),
                Node::binary(BinaryOp::Mul, cell("B1"), cell("C1"))
            )
        );

        let tree = parse("=(A1+B1)*C1", "Sheet1").unwrap();
        assert_eq!(
            tree,
            Node::binary(
                BinaryOp::Mul,
                Node::binary(BinaryOp::Add, cell("A1"), cell("B1")),
                cell("C1")
            )
        );
    }

    #[test]
    fn test_left_associative_subtraction() {
        let tree = parse("=A1-B1-C1", "Sheet1").unwrap();
        assert_eq!(
            tree,
            Node::binary(
                BinaryOp::Sub,
                Node::binary(BinaryOp::Sub, cell("A1"), cell("B1")),
                cell("C1")
            )
        );
    }

    #[test]
    fn test_negation_binds_tightest() {
        let tree = parse("=-A1^2", "Sheet1").unwrap();
        assert_eq!(
            tree,
            Node::binary(
                BinaryOp::Pow,
                Node::unary(UnaryOp::Neg, cell("A1")),
                Node::Number(2.0)
            )
        );

        let tree = parse("=--A1", "Sheet1").unwrap();
        assert_eq!(
            tree,
            Node::unary(UnaryOp::Neg, Node::unary(UnaryOp::Neg, cell("A1")))
        );
    }

    #[test]
    fn test_function_arguments_in_order() {
        let tree = parse("=IF(A1>0, SUM(A1:B2), \"no\")", "Sheet1").unwrap();
        let Node::Function { name, args } = tree else {
            panic!("expected a function node");
        };
        assert_eq!(name, "IF");
        assert_eq!(args.len(), 3);
        assert_eq!(
            args[0],
            Node::binary(BinaryOp::Gt, cell("A1"), Node::Number(0.0))
        );
        assert_eq!(
            args[1],
            Node::function(
                "SUM",
                vec![Node::CellRange(Range::parse("A1:B2", "Sheet1").unwrap())]
            )
        );
        assert_eq!(args[2], Node::Text("no".to_string()));
    }

    #[test]
    fn test_empty_argument_list() {
        assert_eq!(parse("=NOW()", "Sheet1").unwrap(), Node::function("NOW", Vec::new()));
    }

    #[test]
    fn test_malformed_inputs_fail() {
        assert_eq!(
            parse("=(A1+5", "Sheet1"),
            Err(Error::EndOfInput { position: 4 })
        );
        assert!(parse("=SUM(A1:(A4)+5", "Sheet1").is_err());
        assert!(matches!(
            parse("=A(1+5", "Sheet1"),
            Err(Error::NoProgress { .. })
        ));
        assert!(parse("=(A1+5)*B1(", "Sheet1").is_err());
        assert!(matches!(
            parse("=SUM(,A1)", "Sheet1"),
            Err(Error::StackUnderflow(_))
        ));
    }

    #[test]
    fn test_group_closed_by_wrong_token() {
        let tokens = vec![
            Token::new(TokenType::Subexpression, TokenSubtype::Start, ""),
            Token::operand(TokenSubtype::Number, "1"),
            Token::new(TokenType::Function, TokenSubtype::Stop, ""),
        ];
        assert!(matches!(
            build_tree(tokens, "Sheet1"),
            Err(Error::InvalidToken { position: 2, .. })
        ));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(build_tree(Vec::new(), "Sheet1"), Err(Error::EmptyResult));
        assert_eq!(parse("=", "Sheet1"), Err(Error::EmptyResult));
    }

    #[test]
    fn test_trailing_tokens() {
        let lenient = parse("=A1%", "Sheet1").unwrap();
        assert_eq!(lenient, cell("A1"));

        let strict = FormulaOptions::new().with_reject_trailing_tokens(true);
        assert_eq!(
            parse_with("=A1%", "Sheet1", strict),
            Err(Error::TrailingTokens { position: 1 })
        );
        assert!(parse_with("=A1+1", "Sheet1", strict).is_ok());
    }

    #[test]
    fn test_depth_limit() {
        let options = FormulaOptions::new().with_max_depth(2);
        assert!(parse_with("=((A1))", "Sheet1", options).is_ok());
        assert_eq!(
            parse_with("=(((A1)))", "Sheet1", options),
            Err(Error::DepthLimitExceeded { limit: 2 })
        );
        assert_eq!(
            parse_with("=SUM(ABS(-A1))", "Sheet1", options),
            Err(Error::DepthLimitExceeded { limit: 2 })
        );
    }

    #[test]
    fn test_long_operator_chain_hits_depth_limit() {
        let within = format!("=1{}", "+1".repeat(255));
        let tree = parse(&within, "Sheet1").unwrap();
        assert_eq!(tree.depth(), 256);

        let chain = format!("=1{}", "+1".repeat(4000));
        assert_eq!(
            parse(&chain, "Sheet1"),
            Err(Error::DepthLimitExceeded { limit: 256 })
        );

        let options = FormulaOptions::new().with_max_depth(3);
        assert!(parse_with("=A1*B1+C1", "Sheet1", options).is_ok());
        assert_eq!(
            parse_with("=A1*B1+C1-D1", "Sheet1", options),
            Err(Error::DepthLimitExceeded { limit: 3 })
        );
    }

    #[test]
    fn test_external_token_triples() {
        let tokens = vec![
            Token::from_raw("Function", "Start", "SUM"),
            Token::from_raw("Operand", "Range", "A1:A3"),
            Token::from_raw("Argument", "", ","),
            Token::from_raw("Operand", "Number", "2"),
            Token::from_raw("Function", "Stop", ""),
        ];
        let tree = build_tree(tokens, "Data").unwrap();
        assert_eq!(
            tree,
            Node::function(
                "SUM",
                vec![
                    Node::CellRange(Range::parse("A1:A3", "Data").unwrap()),
                    Node::Number(2.0)
                ]
            )
        );
    }
}
