//! Literal and reference operands.

use super::FormulaParser;
use crate::common::error::{Error, Result};
use crate::formula::ast::Node;
use crate::formula::shunting_yard::ShuntingYard;
use crate::sheet::{Cell, Range};

impl FormulaParser<'_> {
    /// Parse the terminal at the cursor and push it as an operand.
    ///
    /// A number directly followed by `%` absorbs the percent sign.
    pub(super) fn parse_terminal(&mut self, yard: &mut ShuntingYard<Node>) -> Result<()> {
        let position = self.stream.position();
        let value = self.stream.peek().value.as_str();

        let node = if self.stream.next_is_number() {
            Node::Number(parse_number(value, position)?)
        } else if self.stream.next_is_text() {
            Node::Text(value.to_string())
        } else if self.stream.next_is_logical() {
            Node::Logical(parse_logical(value, position)?)
        } else if self.stream.next_is_cell() {
            Node::Cell(Cell::parse(value, self.sheet)?)
        } else if self.stream.next_is_range() {
            Node::CellRange(Range::parse(value, self.sheet)?)
        } else {
            return Err(Error::InvalidToken {
                position,
                message: format!("expected a terminal, found {}", self.stream.peek()),
            });
        };
        self.stream.advance()?;

        let node = match node {
            Node::Number(number) if self.next_is_percent() => {
                self.stream.advance()?;
                Node::Number(number * 0.01)
            },
            other => other,
        };

        yard.push_operand(node);
        Ok(())
    }

    fn next_is_percent(&self) -> bool {
        self.stream.next_is_postfix_operator() && self.stream.peek().value == "%"
    }
}

fn parse_number(text: &str, position: usize) -> Result<f64> {
    fast_float2::parse::<f64, _>(text).map_err(|_| Error::InvalidToken {
        position,
        message: format!("invalid number literal {text:?}"),
    })
}

fn parse_logical(text: &str, position: usize) -> Result<bool> {
    if text.eq_ignore_ascii_case("TRUE") {
        Ok(true)
    } else if text.eq_ignore_ascii_case("FALSE") {
        Ok(false)
    } else {
        Err(Error::InvalidToken {
            position,
            message: format!("invalid logical literal {text:?}"),
        })
    }
}
