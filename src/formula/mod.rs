// Formula Module - Spreadsheet Formula Parsing, Serialization and Shifting
//
// Pipeline:
//
//   text --lexer--> tokens --parser/shunting_yard--> Node --serialize--> text
//                                                      |
//                                                    shift
//
// The parser accepts tokens from any producer that follows the token
// contract in `token`; the built-in `lexer` is one such producer.
//
// # Example
//
// ```
// use cellshift::formula::{parse, serialize, shift_node};
//
// let tree = parse("=SUM(A1:B1)*$C$1", "Sheet1").unwrap();
// let moved = shift_node(&tree, 5, 3).unwrap();
// assert_eq!(serialize(&moved, "Sheet1"), "=SUM(D6:E6)*$C$1");
// ```

/// Expression tree and its debug view
pub mod ast;
/// Parser options
pub mod config;
/// Built-in tokenizer
pub mod lexer;
/// Operator symbols and precedence tables
pub mod operators;
/// Token stream to tree
pub mod parser;
/// Tree to text
pub mod serialize;
/// Reference relocation
pub mod shift;
/// Two-stack reduction engine
pub mod shunting_yard;
pub mod stream;
pub mod text;
pub mod token;

pub use ast::{Node, NodeKind, NodeView};
pub use config::FormulaOptions;
pub use lexer::tokenize;
pub use operators::{BinaryOp, UnaryOp};
pub use parser::{build_tree, build_tree_with, parse, parse_with};
pub use serialize::serialize;
pub use shift::{move_node, shift_formula, shift_formula_with, shift_node};
pub use text::Formula;
pub use token::{Token, TokenSubtype, TokenType};
