//! Operator vocabulary and the process-wide precedence tables.
//!
//! The tables are compile-time perfect-hash maps: built once, never mutated,
//! and safe to read from any number of threads.

use phf::phf_map;
use serde::Serialize;
use std::fmt;

/// Binary operators, from tightest to loosest binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BinaryOp {
    /// Range intersection (`A1:B2 B1:C2`)
    Intersect,
    /// Range union (`(A1,B2)`)
    Union,
    Pow,
    Mul,
    Div,
    Add,
    Sub,
    Concat,
    Eq,
    Ne,
    Le,
    Ge,
    Gt,
    Lt,
}

/// Unary prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum UnaryOp {
    Neg,
}

/// Binary operator symbols.
pub static BINARY_OPERATORS: phf::Map<&'static str, BinaryOp> = phf_map! {
    // cell range union and intersect
    " " => BinaryOp::Intersect,
    "," => BinaryOp::Union,
    // raise to power
    "^" => BinaryOp::Pow,
    // multiply, divide
    "*" => BinaryOp::Mul,
    "/" => BinaryOp::Div,
    // add, subtract
    "+" => BinaryOp::Add,
    "-" => BinaryOp::Sub,
    // string concat
    "&" => BinaryOp::Concat,
    // comparison
    "=" => BinaryOp::Eq,
    "<>" => BinaryOp::Ne,
    "<=" => BinaryOp::Le,
    ">=" => BinaryOp::Ge,
    ">" => BinaryOp::Gt,
    "<" => BinaryOp::Lt,
};

/// Prefix operator symbols.
pub static PREFIX_OPERATORS: phf::Map<&'static str, UnaryOp> = phf_map! {
    "-" => UnaryOp::Neg,
};

impl BinaryOp {
    /// Look up an infix symbol.
    #[inline]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        BINARY_OPERATORS.get(symbol).copied()
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Intersect => " ",
            BinaryOp::Union => ",",
            BinaryOp::Pow => "^",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Concat => "&",
            BinaryOp::Eq => "=",
            BinaryOp::Ne => "<>",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::Gt => ">",
            BinaryOp::Lt => "<",
        }
    }

    /// Binding strength; higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Intersect | BinaryOp::Union => 8,
            BinaryOp::Pow => 5,
            BinaryOp::Mul | BinaryOp::Div => 4,
            BinaryOp::Add | BinaryOp::Sub => 3,
            BinaryOp::Concat => 2,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Le | BinaryOp::Ge | BinaryOp::Gt | BinaryOp::Lt => 1,
        }
    }

    /// `a OP b == b OP a`.
    pub fn is_commutative(self) -> bool {
        matches!(
            self,
            BinaryOp::Intersect | BinaryOp::Mul | BinaryOp::Add | BinaryOp::Eq | BinaryOp::Ne
        )
    }

    /// All binary operators group left to right.
    #[inline]
    pub fn is_left_associative(self) -> bool {
        true
    }
}

impl UnaryOp {
    /// Look up a prefix symbol.
    #[inline]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        PREFIX_OPERATORS.get(symbol).copied()
    }

    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
        }
    }

    /// Negation binds tighter than every binary arithmetic operator.
    pub fn precedence(self) -> u8 {
        match self {
            UnaryOp::Neg => 7,
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbols_round_trip() {
        for (symbol, op) in BINARY_OPERATORS.entries() {
            assert_eq!(op.symbol(), *symbol);
            assert_eq!(BinaryOp::from_symbol(symbol), Some(*op));
        }
        assert_eq!(UnaryOp::from_symbol("-"), Some(UnaryOp::Neg));
        assert_eq!(UnaryOp::from_symbol("+"), None);
        assert_eq!(BinaryOp::from_symbol("%"), None);
    }

    #[test]
    fn test_precedence_order() {
        assert!(BinaryOp::Pow.precedence() > BinaryOp::Mul.precedence());
        assert!(BinaryOp::Mul.precedence() > BinaryOp::Add.precedence());
        assert!(BinaryOp::Add.precedence() > BinaryOp::Concat.precedence());
        assert!(BinaryOp::Concat.precedence() > BinaryOp::Eq.precedence());
        assert!(UnaryOp::Neg.precedence() > BinaryOp::Pow.precedence());
        assert!(!BinaryOp::Sub.is_commutative());
        assert!(BinaryOp::Add.is_commutative());
    }
}
