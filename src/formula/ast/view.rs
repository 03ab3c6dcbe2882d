use super::node::Node;
use serde::Serialize;

/// Label/children rendering of a tree, for debugging and tooling.
///
/// Serializes as `{"type": ..., "value": ...}` where `value` is a label for
/// terminals, a single view for unary expressions, and a list otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeView {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: ViewValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ViewValue {
    Label(String),
    Child(Box<NodeView>),
    Children(Vec<NodeView>),
}

impl Node {
    pub fn to_view(&self) -> NodeView {
        let kind = self.kind().label();
        match self {
            Node::Number(value) => leaf(kind, format!("{value:.6}")),
            Node::Text(text) => leaf(kind, text.clone()),
            Node::Logical(value) => leaf(kind, value.to_string()),
            Node::Cell(cell) => leaf(kind, cell.to_address()),
            Node::CellRange(range) => leaf(kind, range.to_string()),
            Node::Function { name, args } => NodeView {
                kind: format!("{kind} {name}"),
                value: ViewValue::Children(args.iter().map(Node::to_view).collect()),
            },
            Node::Binary { op, left, right } => NodeView {
                kind: format!("{kind} {op}"),
                value: ViewValue::Children(vec![left.to_view(), right.to_view()]),
            },
            Node::Unary { op, operand } => NodeView {
                kind: format!("{kind} {op}"),
                value: ViewValue::Child(Box::new(operand.to_view())),
            },
        }
    }

    /// Debug view rendered as JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.to_view())
    }
}

fn leaf(kind: &str, label: String) -> NodeView {
    NodeView {
        kind: kind.to_string(),
        value: ViewValue::Label(label),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::operators::{BinaryOp, UnaryOp};
    use crate::sheet::{Cell, Range};

    #[test]
    fn test_view_labels() {
        let range = Range::parse("A1:B2", "Sheet1").unwrap();
        let tree = Node::function(
            "SUM",
            vec![
                Node::CellRange(range),
                Node::unary(UnaryOp::Neg, Node::Number(1.5)),
                Node::binary(
                    BinaryOp::Concat,
                    Node::Text("a".into()),
                    Node::Logical(true),
                ),
            ],
        );

        let json = tree.to_json().unwrap();
        assert_eq!(
            json,
            concat!(
                r#"{"type":"func SUM","value":["#,
                r#"{"type":"range","value":"Sheet1!A1:B2"},"#,
                r#"{"type":"unaExp -","value":{"type":"num","value":"1.500000"}},"#,
                r#"{"type":"binExp &","value":["#,
                r#"{"type":"txt","value":"a"},{"type":"bool","value":"true"}]}]}"#
            )
        );
    }

    #[test]
    fn test_cell_label_is_qualified() {
        let cell = Cell::parse("$C$3", "My Sheet").unwrap();
        let view = Node::Cell(cell).to_view();
        assert_eq!(view.kind, "cell");
        assert_eq!(view.value, ViewValue::Label("'My Sheet'!$C$3".to_string()));
    }
}
