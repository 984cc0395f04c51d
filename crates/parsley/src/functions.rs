//! Callable functions and the built-in set.

use crate::error::EvalError;
use crate::operators::calculate;
use crate::value::{lookup, to_boolean, to_number, Value};
use serde_json::Value as JsonValue;
use std::fmt;
use std::sync::Arc;

type FunctionImpl = dyn for<'a> Fn(&[Value<'a>]) -> Result<Value<'a>, EvalError> + Send + Sync;

/// A function callable from an expression, e.g. `ceil(x)`.
#[derive(Clone)]
pub struct Function {
    inner: Arc<FunctionImpl>,
}

impl Function {
    pub fn new<F>(f: F) -> Self
    where
        F: for<'a> Fn(&[Value<'a>]) -> Result<Value<'a>, EvalError> + Send + Sync + 'static,
    {
        Function { inner: Arc::new(f) }
    }

    pub fn call<'a>(&self, args: &[Value<'a>]) -> Result<Value<'a>, EvalError> {
        (self.inner)(args)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Function")
    }
}

fn expect_args(args: &[Value], expected: usize) -> Result<(), EvalError> {
    if args.len() != expected {
        return Err(EvalError::ArgumentCount {
            expected,
            found: args.len(),
        });
    }
    Ok(())
}

fn numeric(op: fn(f64) -> f64) -> Function {
    Function::new(move |args| {
        expect_args(args, 1)?;
        Ok(Value::Number(op(to_number(&args[0])?)))
    })
}

fn not<'a>(args: &[Value<'a>]) -> Result<Value<'a>, EvalError> {
    expect_args(args, 1)?;
    Ok(Value::Boolean(!to_boolean(&args[0])?))
}

/// `contains_any(list, field, target)`: true if any record in `list` has a
/// `field` equal to `target`. A missing list contains nothing.
fn contains_any<'a>(args: &[Value<'a>]) -> Result<Value<'a>, EvalError> {
    expect_args(args, 3)?;
    let items = match &args[0] {
        Value::List(items) => items,
        Value::Absent => return Ok(Value::Boolean(false)),
        other => {
            return Err(EvalError::InvalidArgument {
                index: 0,
                details: format!("expected list, found {}", other.type_name()),
            })
        }
    };
    let field = args[1].as_str().ok_or_else(|| EvalError::InvalidArgument {
        index: 1,
        details: format!("expected string, found {}", args[1].type_name()),
    })?;

    for item in items.iter() {
        let candidate = match item {
            JsonValue::Object(record) => lookup(record, field),
            _ => Value::Absent,
        };
        if let Value::Boolean(true) = calculate("==", candidate, args[2].clone())? {
            return Ok(Value::Boolean(true));
        }
    }
    Ok(Value::Boolean(false))
}

/// The functions every registry starts with.
pub fn builtins() -> Vec<(&'static str, Function)> {
    vec![
        ("ceil", numeric(f64::ceil)),
        ("floor", numeric(f64::floor)),
        ("round", numeric(f64::round)),
        ("truncate", numeric(f64::trunc)),
        ("absolute", numeric(f64::abs)),
        ("contains_any", Function::new(contains_any)),
        ("not", Function::new(not)),
    ]
}
