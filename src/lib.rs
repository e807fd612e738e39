pub mod ast;
pub mod classifier;
pub mod cli;
pub mod convert;
pub mod document;
pub mod evaluator;
pub mod expression;
pub mod lazy;
pub mod lexer;
pub mod output;
pub mod parser;
pub mod transform;
pub mod value;

pub use ast::{ArraySelector, Operator, Postfix, Segment, SegmentKind, SlicePiece, Token};
pub use classifier::PathClassifier;
pub use convert::{json_to_value, value_to_json};
pub use document::Document;
pub use evaluator::{Evaluator, QueryError, ResultSet, collapse};
pub use expression::{BoolEvaluator, ExprError};
pub use lexer::Lexer;
pub use output::{to_json, to_json_pretty};
pub use parser::{Parser, to_postfix};
pub use transform::Key;
pub use value::{Identity, Value};
