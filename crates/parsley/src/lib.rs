//! Parsley: a small expression language evaluated against JSON-like records.
//!
//! # Overview
//!
//! Expressions are infix text such as
//! `(object_attributes.state == "opened") && contains_any(object_attributes.labels, "title", "automated")`.
//! Identifiers are dotted paths into the record. Missing paths evaluate to
//! [`Value::Absent`] rather than failing, and any comparison with an absent
//! value is `false`.
//!
//! Operators and functions live in a [`Registry`], which embedders can extend
//! with their own tokens and callables before parsing.
//!
//! # Example
//!
//! ```
//! use parsley::{parse, Record, Registry, Value};
//! use serde_json::json;
//!
//! let registry = Registry::new();
//! let ast = parse("36/6*3+2^2-(3+5)", &registry).unwrap();
//! assert_eq!(ast.eval(&Record::new()).unwrap(), Value::Number(14.0));
//!
//! let record = json!({"labels": [{"title": "automated"}]});
//! let ast = parse(r#"contains_any(labels, "title", "automated")"#, &registry).unwrap();
//! assert_eq!(ast.eval(record.as_object().unwrap()).unwrap(), Value::Boolean(true));
//! ```

pub mod cache;
pub mod engine;
pub mod error;
pub mod functions;
pub mod lexer;
pub mod node;
pub mod operators;
pub mod parser;
pub mod registry;
pub mod value;

pub use cache::{ExpressionCache, MemoryCache, NoopCache};
pub use engine::{Engine, EngineOptions};
pub use error::{CoercionError, Error, EvalError, LexError, ParseError, Side};
pub use functions::Function;
pub use lexer::{Lexer, Token, TokenKind};
pub use node::{Expression, Node};
pub use operators::{
    calculate, calculate_unary, BinaryOp, BinaryOperator, Precedence, UnaryOp, UnaryOperator,
};
pub use parser::{parse, parse_with_options, ParserOptions};
pub use registry::Registry;
pub use value::{lookup, to_boolean, to_number, to_string, types_match, Record, Value};
