//! Cellshift - spreadsheet formula parsing, serialization and relocation
//!
//! This library turns spreadsheet formula text into an expression tree,
//! writes trees back as minimal, precedence-correct formula text, and shifts
//! formulas the way a spreadsheet does when a cell is copied: relative
//! references move, absolute (`$`) ones stay put.
//!
//! # Features
//!
//! - **Cell model**: A1-style addresses with sheet qualifiers, per-axis
//!   absolute/relative flags, and half-open ranges
//! - **Shunting-yard parser**: explicit operand and operator stacks with
//!   sentinel-bounded scopes for groups and argument lists
//! - **Canonical serializer**: fewest parentheses that re-parse to the same tree
//! - **Shift transform**: relocate a tree by a row/column delta or between cells
//!
//! # Example - Shifting a formula
//!
//! ```
//! use cellshift::formula::shift_formula;
//!
//! let shifted = shift_formula("=SUM(A1:B1)*$C$1", 5, 3, "Sheet1").unwrap();
//! assert_eq!(shifted, "=SUM(D6:E6)*$C$1");
//! ```
//!
//! # Example - Working with the tree
//!
//! ```
//! use cellshift::{Cell, Node, move_node, parse, serialize};
//!
//! # fn main() -> cellshift::Result<()> {
//! let tree = parse("=A1-(B1-C1)", "Sheet1")?;
//! assert!(matches!(tree, Node::Binary { .. }));
//!
//! let origin = Cell::parse("D1", "Sheet1")?;
//! let dest = Cell::parse("D3", "Sheet1")?;
//! let moved = move_node(&tree, &origin, &dest)?;
//! assert_eq!(serialize(&moved, "Sheet1"), "=A3-(B3-C3)");
//! # Ok(())
//! # }
//! ```
//!
//! # Logging
//!
//! Parse and shift events are emitted through [`tracing`]; install a
//! subscriber in the application to see them.

pub mod common;
pub mod formula;
pub mod sheet;

pub use common::{Error, Result};
pub use formula::{
    FormulaOptions, Node, build_tree, move_node, parse, serialize, shift_formula, shift_node,
    tokenize,
};
pub use sheet::{Cell, Range};
