//! The expression tree and its evaluation.

use crate::error::{EvalError, Side};
use crate::functions::Function;
use crate::operators::{BinaryOp, BinaryOperator, Precedence, UnaryOp, UnaryOperator};
use crate::value::{lookup, Record, Value};
use std::fmt;
use std::sync::Arc;

/// A node supplied by an embedder through a registry constructor.
pub trait Expression: fmt::Debug + fmt::Display + Send + Sync {
    fn eval<'r>(&self, record: &'r Record) -> Result<Value<'r>, EvalError>;
}

/// A parsed expression.
///
/// Trees are immutable once built, so the same node can be evaluated against
/// any number of records, from any number of threads.
#[derive(Debug, Clone)]
pub enum Node {
    /// Numeric literal.
    Number(f64),
    /// String literal.
    String(String),
    /// Dotted path into the record, e.g. `object_attributes.state`.
    Variable(String),
    Unary {
        operator: Arc<dyn UnaryOperator>,
        operand: Box<Node>,
    },
    Binary {
        operator: Arc<dyn BinaryOperator>,
        left: Box<Node>,
        right: Box<Node>,
    },
    /// Function call. `function` is resolved by the parser; a call built by
    /// hand without one fails with `FunctionNotFound` when evaluated.
    Call {
        name: String,
        function: Option<Function>,
        args: Vec<Node>,
    },
    Custom(Arc<dyn Expression>),
}

impl Node {
    pub fn number(n: f64) -> Self {
        Node::Number(n)
    }

    pub fn string(s: impl Into<String>) -> Self {
        Node::String(s.into())
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Node::Variable(name.into())
    }

    pub fn unary(operator: impl UnaryOperator + 'static, operand: Node) -> Self {
        Node::Unary {
            operator: Arc::new(operator),
            operand: Box::new(operand),
        }
    }

    pub fn negate(operand: Node) -> Self {
        Node::unary(UnaryOp::Negate, operand)
    }

    pub fn binary(operator: impl BinaryOperator + 'static, left: Node, right: Node) -> Self {
        Node::Binary {
            operator: Arc::new(operator),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Builds a binary node from a built-in token such as `"=="`.
    pub fn builtin_binary(token: &str, left: Node, right: Node) -> Option<Self> {
        BinaryOp::from_token(token).map(|op| Node::binary(op, left, right))
    }

    pub fn call(name: impl Into<String>, function: Option<Function>, args: Vec<Node>) -> Self {
        Node::Call {
            name: name.into(),
            function,
            args,
        }
    }

    pub fn custom(expression: impl Expression + 'static) -> Self {
        Node::Custom(Arc::new(expression))
    }

    /// Evaluates the tree against `record`. Lists and records in the result
    /// borrow from `record`.
    pub fn eval<'r>(&self, record: &'r Record) -> Result<Value<'r>, EvalError> {
        match self {
            Node::Number(n) => Ok(Value::Number(*n)),
            Node::String(s) => Ok(Value::String(s.clone())),
            Node::Variable(name) => Ok(lookup(record, name)),
            Node::Unary { operator, operand } => {
                let value = operand
                    .eval(record)
                    .map_err(|e| EvalError::UnaryOperand(Box::new(e)))?;
                operator.calculate(value)
            }
            Node::Binary {
                operator,
                left,
                right,
            } => {
                let left = left.eval(record).map_err(|e| EvalError::Operand {
                    side: Side::Left,
                    source: Box::new(e),
                })?;
                let right = right.eval(record).map_err(|e| EvalError::Operand {
                    side: Side::Right,
                    source: Box::new(e),
                })?;
                operator.calculate(left, right)
            }
            Node::Call {
                name,
                function,
                args,
            } => {
                let mut values = Vec::with_capacity(args.len());
                for (index, arg) in args.iter().enumerate() {
                    let value = arg
                        .eval(record)
                        .map_err(|e| EvalError::ArgumentEvaluationFailed {
                            index,
                            source: Box::new(e),
                        })?;
                    values.push(value);
                }
                let function = function
                    .as_ref()
                    .ok_or_else(|| EvalError::FunctionNotFound(name.clone()))?;
                function.call(&values).map_err(|e| EvalError::FunctionFailed {
                    name: name.clone(),
                    source: Box::new(e),
                })
            }
            Node::Custom(expression) => expression.eval(record),
        }
    }

    /// Canonical source form of the tree. Same as `to_string()`.
    pub fn to_display_text(&self) -> String {
        self.to_string()
    }

    fn precedence(&self) -> Option<Precedence> {
        match self {
            Node::Binary { operator, .. } => Some(operator.precedence()),
            _ => None,
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>, parent: Precedence, right: bool) -> fmt::Result {
        match self.precedence() {
            Some(own) if own < parent || (right && own == parent) => write!(f, "({})", self),
            _ => write!(f, "{}", self),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Number(n) => write!(f, "{}", n),
            Node::String(s) => write!(f, "\"{}\"", s),
            Node::Variable(name) => f.write_str(name),
            Node::Unary { operator, operand } => write!(f, "{}({})", operator.token(), operand),
            Node::Binary {
                operator,
                left,
                right,
            } => {
                let tier = operator.precedence();
                left.fmt_operand(f, tier, false)?;
                if operator.spaced() {
                    write!(f, " {} ", operator.token())?;
                } else {
                    f.write_str(operator.token())?;
                }
                right.fmt_operand(f, tier, true)
            }
            Node::Call { name, args, .. } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
            Node::Custom(expression) => write!(f, "{}", expression),
        }
    }
}
