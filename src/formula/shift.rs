//! Relocating formulas.
//!
//! Shifting translates every relative axis of every reference by the same
//! delta and leaves absolute axes pinned, which is what happens to a formula
//! when its cell is copied elsewhere on the sheet.

use super::ast::Node;
use super::config::FormulaOptions;
use super::parser::parse_with;
use super::serialize::serialize;
use crate::common::error::{Error, Result};
use crate::sheet::Cell;
use tracing::debug;

/// Return a copy of `node` with its references shifted by (`rows`, `cols`).
///
/// Fails with [`Error::OutOfRange`] if any reference would leave the sheet.
pub fn shift_node(node: &Node, rows: i64, cols: i64) -> Result<Node> {
    Ok(match node {
        Node::Number(_) | Node::Text(_) | Node::Logical(_) => node.clone(),
        Node::Cell(cell) => Node::Cell(cell.shift_if_rel(rows, cols)?),
        Node::CellRange(range) => Node::CellRange(range.shift_if_rel(rows, cols)?),
        Node::Function { name, args } => Node::Function {
            name: name.clone(),
            args: args
                .iter()
                .map(|arg| shift_node(arg, rows, cols))
                .collect::<Result<Vec<_>>>()?,
        },
        Node::Binary { op, left, right } => Node::binary(
            *op,
            shift_node(left, rows, cols)?,
            shift_node(right, rows, cols)?,
        ),
        Node::Unary { op, operand } => Node::unary(*op, shift_node(operand, rows, cols)?),
    })
}

/// Shift `node` as if its formula moved from `origin` to `dest`.
///
/// Both cells must be on the same sheet.
pub fn move_node(node: &Node, origin: &Cell, dest: &Cell) -> Result<Node> {
    if origin.sheet() != dest.sheet() {
        return Err(Error::CrossSheetMove {
            from: origin.sheet().to_string(),
            to: dest.sheet().to_string(),
        });
    }
    let rows = i64::from(dest.row()) - i64::from(origin.row());
    let cols = i64::from(dest.col()) - i64::from(origin.col());
    shift_node(node, rows, cols)
}

/// Parse, shift and re-serialize formula text in one call.
///
/// Each call parses from scratch. To shift the same formula repeatedly,
/// parse it once and call [`shift_node`] and [`serialize`] directly.
///
/// # Example
///
/// ```
/// use cellshift::formula::shift_formula;
///
/// let shifted = shift_formula("=SUM(A1:B1)", 5, 3, "Sheet1").unwrap();
/// assert_eq!(shifted, "=SUM(D6:E6)");
/// ```
pub fn shift_formula(formula: &str, rows: i64, cols: i64, sheet: &str) -> Result<String> {
    shift_formula_with(formula, rows, cols, sheet, FormulaOptions::default())
}

pub fn shift_formula_with(
    formula: &str,
    rows: i64,
    cols: i64,
    sheet: &str,
    options: FormulaOptions,
) -> Result<String> {
    debug!(rows, cols, sheet, "shifting formula");
    let tree = parse_with(formula, sheet, options)?;
    let shifted = shift_node(&tree, rows, cols)?;
    Ok(serialize(&shifted, sheet))
}
