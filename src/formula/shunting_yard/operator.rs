//! Operator-stack entries and the reduction ordering rule.

use crate::formula::operators::{BinaryOp, UnaryOp};

/// An operator waiting on the operator stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Unary(UnaryOp),
    Binary(BinaryOp),
}

impl Operator {
    #[inline]
    pub fn precedence(self) -> u8 {
        match self {
            Operator::Unary(op) => op.precedence(),
            Operator::Binary(op) => op.precedence(),
        }
    }

    #[inline]
    pub fn is_unary(self) -> bool {
        matches!(self, Operator::Unary(_))
    }

    #[inline]
    pub fn is_left_associative(self) -> bool {
        match self {
            Operator::Unary(_) => true,
            Operator::Binary(op) => op.is_left_associative(),
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Unary(op) => op.symbol(),
            Operator::Binary(op) => op.symbol(),
        }
    }
}

/// One slot of the operator stack.
///
/// A sentinel bounds a parsing scope. It is a distinct marker, never an
/// operator with a very low precedence, and it is never reduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackEntry {
    Sentinel {
        /// Identity of the scope that pushed it.
        scope: u32,
        /// Operand-stack height when the scope opened.
        floor: usize,
    },
    Op(Operator),
}

impl StackEntry {
    #[inline]
    pub fn is_sentinel(&self) -> bool {
        matches!(self, StackEntry::Sentinel { .. })
    }

    /// Whether `self`, sitting on the stack, must be reduced before `incoming`
    /// is pushed on top of it.
    pub fn evaluates_before(&self, incoming: &StackEntry) -> bool {
        let StackEntry::Op(this) = self else {
            return false;
        };
        let StackEntry::Op(other) = incoming else {
            return true;
        };
        if other.is_unary() {
            return false;
        }
        if this.is_unary() {
            return this.precedence() >= other.precedence();
        }
        if this.precedence() == other.precedence() {
            this.is_left_associative()
        } else {
            this.precedence() > other.precedence()
        }
    }
}
