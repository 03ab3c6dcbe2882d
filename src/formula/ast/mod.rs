//! Expression tree for spreadsheet formulas.
//!
//! [`Node`] is a closed set of variants: literals, references, function
//! calls and operator expressions. Serializing, shifting and comparing trees
//! all match on it exhaustively.

mod node;
mod view;

pub use node::{Node, NodeKind};
pub use view::{NodeView, ViewValue};
