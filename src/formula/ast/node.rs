use crate::formula::operators::{BinaryOp, UnaryOp};
use crate::formula::shunting_yard::Reduce;
use crate::sheet::{Cell, Range};
use std::fmt;

/// Expression tree node.
///
/// Trees are immutable values: transforms such as shifting build a new tree
/// and leave the input untouched. Equality is structural.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Number(f64),
    Text(String),
    Logical(bool),
    Cell(Cell),
    /// Range with a half-open end
    CellRange(Range),
    Function {
        name: String,
        args: Vec<Node>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Node>,
        right: Box<Node>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Node>,
    },
}

/// Variant tag of a [`Node`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Number,
    Text,
    Logical,
    Cell,
    CellRange,
    Function,
    Binary,
    Unary,
}

impl NodeKind {
    /// Short label used by the debug view.
    pub fn label(self) -> &'static str {
        match self {
            NodeKind::Number => "num",
            NodeKind::Text => "txt",
            NodeKind::Logical => "bool",
            NodeKind::Cell => "cell",
            NodeKind::CellRange => "range",
            NodeKind::Function => "func",
            NodeKind::Binary => "binExp",
            NodeKind::Unary => "unaExp",
        }
    }

    /// Leaf kinds carry no child nodes.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            NodeKind::Number | NodeKind::Text | NodeKind::Logical | NodeKind::Cell | NodeKind::CellRange
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Node {
    pub fn binary(op: BinaryOp, left: Node, right: Node) -> Self {
        Node::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn unary(op: UnaryOp, operand: Node) -> Self {
        Node::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn function(name: impl Into<String>, args: Vec<Node>) -> Self {
        Node::Function {
            name: name.into(),
            args,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Number(_) => NodeKind::Number,
            Node::Text(_) => NodeKind::Text,
            Node::Logical(_) => NodeKind::Logical,
            Node::Cell(_) => NodeKind::Cell,
            Node::CellRange(_) => NodeKind::CellRange,
            Node::Function { .. } => NodeKind::Function,
            Node::Binary { .. } => NodeKind::Binary,
            Node::Unary { .. } => NodeKind::Unary,
        }
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.kind().is_terminal()
    }

    /// Direct children, left to right.
    pub fn children(&self) -> Vec<&Node> {
        match self {
            Node::Function { args, .. } => args.iter().collect(),
            Node::Binary { left, right, .. } => vec![left, right],
            Node::Unary { operand, .. } => vec![operand],
            _ => Vec::new(),
        }
    }

    /// Nesting depth; a terminal has depth 1.
    ///
    /// Walks the tree with an explicit stack, so it is safe on trees of any
    /// height.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 1)];
        while let Some((node, level)) = pending.pop() {
            deepest = deepest.max(level);
            pending.extend(node.children().into_iter().map(|child| (child, level + 1)));
        }
        deepest
    }
}

impl Reduce for Node {
    fn reduce_unary(op: UnaryOp, operand: Self) -> Self {
        Node::unary(op, operand)
    }

    fn reduce_binary(op: BinaryOp, left: Self, right: Self) -> Self {
        Node::binary(op, left, right)
    }
}
