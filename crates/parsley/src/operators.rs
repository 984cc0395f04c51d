//! Built-in unary and binary operators and the traits that let embedders
//! supply their own.

use crate::error::{EvalError, Side};
use crate::value::{to_boolean, to_number, Value};
use std::fmt;

/// Behaviour of a prefix operator bound into a unary node.
pub trait UnaryOperator: fmt::Debug + Send + Sync {
    /// Source text of the operator, used when rendering the node.
    fn token(&self) -> &str;

    fn calculate<'a>(&self, operand: Value<'a>) -> Result<Value<'a>, EvalError>;
}

/// Behaviour of an infix operator bound into a binary node.
pub trait BinaryOperator: fmt::Debug + Send + Sync {
    /// Source text of the operator, used when rendering the node.
    fn token(&self) -> &str;

    fn calculate<'a>(&self, left: Value<'a>, right: Value<'a>) -> Result<Value<'a>, EvalError>;

    /// Whether the rendered form puts spaces around the token.
    fn spaced(&self) -> bool {
        false
    }

    fn precedence(&self) -> Precedence {
        Precedence::Multiplicative
    }
}

/// Parser tier an infix operator binds at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    /// `+`, `-`
    Additive,
    /// `*`, `/`, `^`, comparisons and logical operators
    Multiplicative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Negate,
}

impl UnaryOp {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "-" => Some(UnaryOp::Negate),
            _ => None,
        }
    }
}

impl UnaryOperator for UnaryOp {
    fn token(&self) -> &str {
        match self {
            UnaryOp::Negate => "-",
        }
    }

    fn calculate<'a>(&self, operand: Value<'a>) -> Result<Value<'a>, EvalError> {
        match self {
            UnaryOp::Negate => Ok(Value::Number(-to_number(&operand)?)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
    Equal,
    /// Single `=`, kept for older rules.
    LegacyEqual,
    Less,
    Greater,
    And,
    Or,
}

impl BinaryOp {
    pub fn from_token(token: &str) -> Option<Self> {
        let op = match token {
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Subtract,
            "*" => BinaryOp::Multiply,
            "/" => BinaryOp::Divide,
            "^" => BinaryOp::Power,
            "==" => BinaryOp::Equal,
            "=" => BinaryOp::LegacyEqual,
            "<" => BinaryOp::Less,
            ">" => BinaryOp::Greater,
            "&&" => BinaryOp::And,
            "||" => BinaryOp::Or,
            _ => return None,
        };
        Some(op)
    }

    fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Equal | BinaryOp::LegacyEqual | BinaryOp::Less | BinaryOp::Greater
        )
    }

    fn calculate_strings(self, a: &str, b: &str) -> Result<Value<'static>, EvalError> {
        match self {
            BinaryOp::Less => Ok(Value::Boolean(a < b)),
            BinaryOp::Greater => Ok(Value::Boolean(a > b)),
            BinaryOp::Equal | BinaryOp::LegacyEqual => Ok(Value::Boolean(a == b)),
            BinaryOp::Add => Ok(Value::String(format!("{}{}", a, b))),
            other => Err(EvalError::InvalidStringOperation {
                operator: other.token().to_string(),
            }),
        }
    }

    fn calculate_numbers(self, a: f64, b: f64) -> Value<'static> {
        match self {
            BinaryOp::Less => Value::Boolean(a < b),
            BinaryOp::Greater => Value::Boolean(a > b),
            BinaryOp::Equal | BinaryOp::LegacyEqual => Value::Boolean(a == b),
            BinaryOp::Add => Value::Number(a + b),
            BinaryOp::Subtract => Value::Number(a - b),
            BinaryOp::Multiply => Value::Number(a * b),
            BinaryOp::Divide => Value::Number(a / b),
            BinaryOp::Power => Value::Number(a.powf(b)),
            BinaryOp::And => Value::Boolean(a > 0.0 && b > 0.0),
            BinaryOp::Or => Value::Boolean(a > 0.0 || b > 0.0),
        }
    }
}

impl BinaryOperator for BinaryOp {
    fn token(&self) -> &str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Power => "^",
            BinaryOp::Equal => "==",
            BinaryOp::LegacyEqual => "=",
            BinaryOp::Less => "<",
            BinaryOp::Greater => ">",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }

    fn calculate<'a>(&self, left: Value<'a>, right: Value<'a>) -> Result<Value<'a>, EvalError> {
        let op = *self;

        if matches!(op, BinaryOp::And | BinaryOp::Or) {
            let invalid = || EvalError::InvalidBooleanOperands {
                left: left.type_name(),
                right: right.type_name(),
            };
            let x = to_boolean(&left).map_err(|_| invalid())?;
            let y = to_boolean(&right).map_err(|_| invalid())?;
            return Ok(Value::Boolean(if op == BinaryOp::Or { x || y } else { x && y }));
        }

        if op.is_comparison() && (left.is_absent() || right.is_absent()) {
            return Ok(Value::Boolean(false));
        }

        match (&left, &right) {
            (Value::String(a), Value::String(b)) => return op.calculate_strings(a, b),
            (Value::String(_), _) | (_, Value::String(_)) => {
                return Err(EvalError::OperandTypeMismatch {
                    left: left.type_name(),
                    right: right.type_name(),
                })
            }
            _ => {}
        }

        let a = to_number(&left).map_err(|source| EvalError::OperandCoercion {
            side: Side::Left,
            source,
        })?;
        let b = to_number(&right).map_err(|source| EvalError::OperandCoercion {
            side: Side::Right,
            source,
        })?;
        Ok(op.calculate_numbers(a, b))
    }

    fn spaced(&self) -> bool {
        matches!(
            self,
            BinaryOp::Less
                | BinaryOp::Greater
                | BinaryOp::Equal
                | BinaryOp::LegacyEqual
                | BinaryOp::And
                | BinaryOp::Or
        )
    }

    fn precedence(&self) -> Precedence {
        match self {
            BinaryOp::Add | BinaryOp::Subtract => Precedence::Additive,
            _ => Precedence::Multiplicative,
        }
    }
}

/// Applies a built-in binary operator by its token.
pub fn calculate<'a>(
    operator: &str,
    left: Value<'a>,
    right: Value<'a>,
) -> Result<Value<'a>, EvalError> {
    BinaryOp::from_token(operator)
        .ok_or_else(|| EvalError::UnrecognisedOperator(operator.to_string()))?
        .calculate(left, right)
}

/// Applies a built-in unary operator by its token.
pub fn calculate_unary<'a>(operator: &str, operand: Value<'a>) -> Result<Value<'a>, EvalError> {
    UnaryOp::from_token(operator)
        .ok_or_else(|| EvalError::UnrecognisedOperator(operator.to_string()))?
        .calculate(operand)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoercionError;

    fn calc(
        op: &str,
        a: impl Into<Value<'static>>,
        b: impl Into<Value<'static>>,
    ) -> Result<Value<'static>, EvalError> {
        calculate(op, a.into(), b.into())
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(calc("+", 3.0, 3.0), Ok(Value::Number(6.0)));
        assert_eq!(calc("+", 3.4, -3.0), Ok(Value::Number(0.3999999999999999)));
        assert_eq!(calc("/", 3.4, 3.0), Ok(Value::Number(1.1333333333333333)));
        assert_eq!(calc("*", 3.4, -3.0), Ok(Value::Number(-10.2)));
        assert_eq!(calc("-", 3.4, 3.0), Ok(Value::Number(0.3999999999999999)));
        assert_eq!(calc("^", 3.0, 3.0), Ok(Value::Number(27.0)));
        assert_eq!(calc("^", 2.0, 10.0), Ok(Value::Number(1024.0)));
    }

    #[test]
    fn test_division_by_zero_follows_ieee() {
        assert_eq!(calc("/", 1.0, 0.0), Ok(Value::Number(f64::INFINITY)));
        match calc("/", 0.0, 0.0) {
            Ok(Value::Number(n)) => assert!(n.is_nan()),
            other => panic!("expected NaN, got {other:?}"),
        }
    }

    #[test]
    fn test_numeric_comparisons() {
        assert_eq!(calc("+", Value::Number(1.0), Value::Number(2.0)), Ok(Value::Number(3.0)));
        assert_eq!(calc("<", 1.0, 2.0), Ok(Value::Boolean(true)));
        assert_eq!(calc(">", 1.0, 2.0), Ok(Value::Boolean(false)));
        assert_eq!(calc("=", 1.0, 1.0), Ok(Value::Boolean(true)));
    }

    #[test]
    fn test_numeric_strings_coerce() {
        assert_eq!(calculate_unary("-", Value::from("2.5")), Ok(Value::Number(-2.5)));
        assert_eq!(calculate_unary("-", Value::from("-4")), Ok(Value::Number(4.0)));
        assert_eq!(calc("&&", "2", 1.0), Ok(Value::Boolean(true)));
        assert_eq!(calc("&&", "0.00", true), Ok(Value::Boolean(false)));
        assert_eq!(calc("||", "-1", "3"), Ok(Value::Boolean(true)));
        // Arithmetic and comparison never mix a string with a number.
        assert!(matches!(
            calc("+", "1", 2.0),
            Err(EvalError::OperandTypeMismatch { left: "string", right: "number" })
        ));
        assert_eq!(calc("<", "10", "9"), Ok(Value::Boolean(true)));
    }

    #[test]
    fn test_logical() {
        assert_eq!(calc("&&", true, true), Ok(Value::Boolean(true)));
        assert_eq!(calc("&&", true, false), Ok(Value::Boolean(false)));
        assert_eq!(calc("||", false, true), Ok(Value::Boolean(true)));
        assert_eq!(calc("||", "false", "false"), Ok(Value::Boolean(false)));
        assert_eq!(calc("&&", "true", "true"), Ok(Value::Boolean(true)));
    }

    #[test]
    fn test_logical_reports_both_types() {
        let err = calc("&&", "blam", false).unwrap_err();
        assert_eq!(err.to_string(), "could not parse as boolean: string bool");
        let err = calc("||", true, "blep").unwrap_err();
        assert_eq!(err.to_string(), "could not parse as boolean: bool string");
        let err = calc("||", "blam", 1.0).unwrap_err();
        assert_eq!(err.to_string(), "could not parse as boolean: string number");
    }

    #[test]
    fn test_strings() {
        assert_eq!(calc("<", "a", "b"), Ok(Value::Boolean(true)));
        assert_eq!(calc(">", "a", "b"), Ok(Value::Boolean(false)));
        assert_eq!(calc("==", "a", "a"), Ok(Value::Boolean(true)));
        assert_eq!(calc("=", "a", "b"), Ok(Value::Boolean(false)));
        assert_eq!(calc("+", "note", "_"), Ok(Value::from("note_")));
        assert!(matches!(
            calc("-", "a", "b"),
            Err(EvalError::InvalidStringOperation { .. })
        ));
    }

    #[test]
    fn test_one_sided_string() {
        let err = calc("==", "a", 2.0).unwrap_err();
        assert_eq!(err.to_string(), "only one side of comparison was a string: string number");
        let err = calc("==", 2.0, "a").unwrap_err();
        assert_eq!(err.to_string(), "only one side of comparison was a string: number string");
    }

    #[test]
    fn test_absent_comparisons_are_false() {
        assert_eq!(calc("==", Value::Absent, "x"), Ok(Value::Boolean(false)));
        assert_eq!(calc("<", 1.0, Value::Absent), Ok(Value::Boolean(false)));
        assert_eq!(calc("==", Value::Absent, Value::Absent), Ok(Value::Boolean(false)));
        assert!(matches!(
            calc("+", Value::Absent, 1.0),
            Err(EvalError::OperandCoercion { side: Side::Left, .. })
        ));
    }

    #[test]
    fn test_numeric_coercion_reports_side() {
        let err = calc("*", true, 2.0).unwrap_err();
        assert_eq!(
            err,
            EvalError::OperandCoercion {
                side: Side::Left,
                source: CoercionError::InvalidNumber { found: "bool".into() },
            }
        );
        assert!(matches!(
            calc("*", 2.0, true),
            Err(EvalError::OperandCoercion { side: Side::Right, .. })
        ));
    }

    #[test]
    fn test_unrecognised() {
        assert_eq!(
            calc("£", 1.0, 1.0),
            Err(EvalError::UnrecognisedOperator("£".into()))
        );
        assert_eq!(
            calculate_unary("!", Value::Number(1.0)),
            Err(EvalError::UnrecognisedOperator("!".into()))
        );
    }

    #[test]
    fn test_negate() {
        assert_eq!(calculate_unary("-", Value::Number(12.0)), Ok(Value::Number(-12.0)));
        assert_eq!(calculate_unary("-", Value::from("2.5")), Ok(Value::Number(-2.5)));
        assert!(calculate_unary("-", Value::from("x")).is_err());
    }
}
