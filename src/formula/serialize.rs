//! Tree to canonical formula text.
//!
//! Output carries the fewest parentheses that still re-parse to the same
//! tree. A child is wrapped only when it binds looser than its parent
//! operator requires; the right operand of a non-commutative operator is
//! also wrapped at equal precedence, so `A1-(B1-C1)` keeps its parentheses.

use super::ast::Node;
use super::operators::BinaryOp;
use std::fmt::Write;

/// Integers beyond this lose precision as `f64`, so they are printed by the
/// float formatter instead of through `i64`.
const EXACT_INTEGER_LIMIT: f64 = 9_007_199_254_740_992.0;

/// Rendering context handed down to a child node.
#[derive(Debug, Clone, Copy)]
struct Context {
    /// Precedence the enclosing operator demands, `None` at the root and
    /// inside explicit parentheses.
    parent: Option<u8>,
    /// Directly inside a function argument list, where a bare `,` would
    /// split the argument.
    in_args: bool,
}

impl Context {
    const ROOT: Context = Context {
        parent: None,
        in_args: false,
    };
    const ARGUMENT: Context = Context {
        parent: None,
        in_args: true,
    };
}

/// Render `node` as formula text, leading `=` included.
///
/// References on `sheet` are written without a sheet qualifier.
pub fn serialize(node: &Node, sheet: &str) -> String {
    let mut out = String::with_capacity(32);
    out.push('=');
    write_node(&mut out, node, Context::ROOT, sheet);
    out
}

fn write_node(out: &mut String, node: &Node, ctx: Context, sheet: &str) {
    match node {
        Node::Number(value) => write_number(out, *value),
        Node::Text(text) => write_text(out, text),
        Node::Logical(value) => out.push_str(if *value { "TRUE" } else { "FALSE" }),
        Node::Cell(cell) => out.push_str(&cell.to_address_rel(sheet)),
        Node::CellRange(range) => out.push_str(&range.to_string_rel(sheet)),
        Node::Function { name, args } => {
            out.push_str(name);
            out.push('(');
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_node(out, arg, Context::ARGUMENT, sheet);
            }
            out.push(')');
        },
        Node::Binary { op, left, right } => write_binary(out, *op, left, right, ctx, sheet),
        Node::Unary { op, operand } => {
            // Range operators bind tighter than negation.
            let wrap = ctx.parent.is_some_and(|parent| parent > op.precedence());
            if wrap {
                out.push('(');
            }
            out.push_str(op.symbol());
            if operand.is_terminal() {
                write_node(out, operand, Context::ROOT, sheet);
            } else {
                out.push('(');
                write_node(out, operand, Context::ROOT, sheet);
                out.push(')');
            }
            if wrap {
                out.push(')');
            }
        },
    }
}

fn write_binary(out: &mut String, op: BinaryOp, left: &Node, right: &Node, ctx: Context, sheet: &str) {
    let precedence = op.precedence();
    let wrap = ctx.parent.is_some_and(|parent| parent > precedence)
        || (op == BinaryOp::Union && ctx.in_args);

    let in_args = ctx.in_args && !wrap;
    let left_ctx = Context {
        parent: Some(precedence),
        in_args,
    };
    let right_ctx = Context {
        parent: Some(if op.is_commutative() { precedence } else { precedence + 1 }),
        in_args,
    };

    if wrap {
        out.push('(');
    }
    write_node(out, left, left_ctx, sheet);
    out.push_str(op.symbol());
    write_node(out, right, right_ctx, sheet);
    if wrap {
        out.push(')');
    }
}

fn write_number(out: &mut String, value: f64) {
    if !value.is_finite() {
        out.push_str("#NUM!");
    } else if value.fract() == 0.0 && value.abs() < EXACT_INTEGER_LIMIT {
        let mut buf = itoa::Buffer::new();
        out.push_str(buf.format(value as i64));
    } else if value.fract() == 0.0 {
        let _ = write!(out, "{value:.0}");
    } else {
        let _ = write!(out, "{value:.4}");
    }
}

fn write_text(out: &mut String, text: &str) {
    out.reserve(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        if ch == '"' {
            out.push('"');
        }
        out.push(ch);
    }
    out.push('"');
}
