use std::fmt;

use thiserror::Error;

/// Errors raised while turning source text into tokens.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LexError {
    #[error("unexpected character: {character} at position {position}")]
    UnexpectedCharacter { character: char, position: usize },

    /// A scanned numeric literal that `f64` parsing rejected. `Lexer` only
    /// scans digits with at most one point and at least one digit, which
    /// always parse, so it does not produce this today.
    #[error("error parsing float: {literal} at position {position}")]
    InvalidNumericLiteral { literal: String, position: usize },
}

/// Errors raised while building an AST from tokens.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("unexpected token: {token} at position {position}")]
    UnexpectedToken { token: String, position: usize },

    #[error("missing close parenthesis at position {position}")]
    MissingCloseParenthesis { position: usize },

    #[error("unexpected characters at end of expression: {token} at position {position}")]
    UnexpectedTrailingInput { token: String, position: usize },

    #[error("function not found: {0}")]
    UnknownFunction(String),

    #[error("unterminated string starting at position {position}")]
    UnterminatedString { position: usize },

    #[error("expression nested deeper than {limit} levels")]
    NestingTooDeep { limit: usize },
}

/// A value could not be coerced into the type an operator needs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoercionError {
    #[error("cannot convert {found} to number")]
    InvalidNumber { found: String },

    #[error("{found} could not be parsed as a bool")]
    InvalidBoolean { found: String },
}

/// Which operand of a binary node an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => f.write_str("lhs"),
            Side::Right => f.write_str("rhs"),
        }
    }
}

/// Errors raised while evaluating an AST against a record.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error(transparent)]
    Coercion(#[from] CoercionError),

    #[error("could not parse as boolean: {left} {right}")]
    InvalidBooleanOperands {
        left: &'static str,
        right: &'static str,
    },

    #[error("only one side of comparison was a string: {left} {right}")]
    OperandTypeMismatch {
        left: &'static str,
        right: &'static str,
    },

    #[error("operator {operator} is not supported between strings")]
    InvalidStringOperation { operator: String },

    #[error("error in {side}: {source}")]
    OperandCoercion {
        side: Side,
        #[source]
        source: CoercionError,
    },

    #[error("unrecognised op: {0}")]
    UnrecognisedOperator(String),

    #[error("function {0} not found")]
    FunctionNotFound(String),

    #[error("error in argument {index}: {source}")]
    ArgumentEvaluationFailed {
        index: usize,
        #[source]
        source: Box<EvalError>,
    },

    #[error("{side} error: {source}")]
    Operand {
        side: Side,
        #[source]
        source: Box<EvalError>,
    },

    #[error("operand error: {0}")]
    UnaryOperand(#[source] Box<EvalError>),

    #[error("error calling function {name}: {source}")]
    FunctionFailed {
        name: String,
        #[source]
        source: Box<EvalError>,
    },

    #[error("expected {expected} argument(s), found {found}")]
    ArgumentCount { expected: usize, found: usize },

    #[error("invalid argument {index}: {details}")]
    InvalidArgument { index: usize, details: String },
}

/// Anything that can go wrong between source text and a coerced result.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("error evaluating expression: {0}")]
    Eval(#[from] EvalError),

    #[error("error converting result: {0}")]
    Coercion(#[from] CoercionError),
}
