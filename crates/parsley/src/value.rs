//! Runtime values and the coercion rules between them.

use crate::error::CoercionError;
use serde_json::Value as JsonValue;
use std::borrow::Cow;
use std::fmt;
use std::mem;

/// The evaluation context: a nested key-value document.
pub type Record = serde_json::Map<String, JsonValue>;

const TRUTHY: [&str; 5] = ["yes", "true", "y", "1", "yarp"];
const FALSY: [&str; 5] = ["no", "false", "n", "0", "narp"];

/// A value produced while evaluating an expression.
///
/// Scalars are `Number`, `String` and `Boolean`. `Absent` marks a variable
/// path that did not resolve. `List` and `Record` carry composite shapes from
/// the input record so functions can walk them; they never survive numeric
/// or boolean coercion. Composites read from a record borrow from it for
/// `'a`, so looking up a large list copies nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    Absent,
    Number(f64),
    String(String),
    Boolean(bool),
    List(Cow<'a, [JsonValue]>),
    Record(Cow<'a, Record>),
}

impl<'a> Value<'a> {
    /// Converts a raw JSON value taken from a record. `null` is treated as
    /// absent. Arrays and objects are borrowed, not copied.
    pub fn from_json(value: &'a JsonValue) -> Self {
        match value {
            JsonValue::Null => Value::Absent,
            JsonValue::Bool(b) => Value::Boolean(*b),
            JsonValue::Number(n) => n.as_f64().map(Value::Number).unwrap_or(Value::Absent),
            JsonValue::String(s) => Value::String(s.clone()),
            JsonValue::Array(items) => Value::List(Cow::Borrowed(items.as_slice())),
            JsonValue::Object(map) => Value::Record(Cow::Borrowed(map)),
        }
    }

    /// Detaches the value from the record it was read from.
    pub fn into_owned(self) -> Value<'static> {
        match self {
            Value::Absent => Value::Absent,
            Value::Number(n) => Value::Number(n),
            Value::String(s) => Value::String(s),
            Value::Boolean(b) => Value::Boolean(b),
            Value::List(items) => Value::List(Cow::Owned(items.into_owned())),
            Value::Record(map) => Value::Record(Cow::Owned(map.into_owned())),
        }
    }

    /// Name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Absent => "absent",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Boolean(_) => "bool",
            Value::List(_) => "list",
            Value::Record(_) => "record",
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Converts back into JSON. `Absent` becomes `null`; non-finite numbers
    /// become `null` as well since JSON cannot carry them.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Absent => JsonValue::Null,
            Value::Number(n) => serde_json::Number::from_f64(*n)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Value::String(s) => JsonValue::String(s.clone()),
            Value::Boolean(b) => JsonValue::Bool(*b),
            Value::List(items) => JsonValue::Array(items.to_vec()),
            Value::Record(map) => JsonValue::Object(Record::clone(map)),
        }
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Absent => Ok(()),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => f.write_str(s),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::List(_) | Value::Record(_) => write!(f, "{}", self.to_json()),
        }
    }
}

impl From<f64> for Value<'_> {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value<'_> {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value<'_> {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<String> for Value<'_> {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value<'_> {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl<'a> From<&'a JsonValue> for Value<'a> {
    fn from(v: &'a JsonValue) -> Self {
        Value::from_json(v)
    }
}

/// Coerces a value into a number.
///
/// Numbers pass through, strings are parsed as floating point literals and
/// anything else is rejected.
pub fn to_number(value: &Value) -> Result<f64, CoercionError> {
    match value {
        Value::Number(n) => Ok(*n),
        Value::String(s) => s.parse::<f64>().map_err(|_| CoercionError::InvalidNumber {
            found: format!("string '{}'", s),
        }),
        other => Err(CoercionError::InvalidNumber {
            found: other.type_name().to_string(),
        }),
    }
}

/// Coerces a value into a boolean.
///
/// - numbers are true when strictly greater than zero
/// - strings are matched case-insensitively against the known truthy and falsy
///   words, then parsed as a number
pub fn to_boolean(value: &Value) -> Result<bool, CoercionError> {
    match value {
        Value::Boolean(b) => Ok(*b),
        Value::Number(n) => Ok(*n > 0.0),
        Value::String(s) => {
            let lowered = s.to_lowercase();
            if TRUTHY.contains(&lowered.as_str()) {
                return Ok(true);
            }
            if FALSY.contains(&lowered.as_str()) {
                return Ok(false);
            }
            s.parse::<f64>()
                .map(|n| n > 0.0)
                .map_err(|_| CoercionError::InvalidBoolean {
                    found: format!("string '{}'", s),
                })
        }
        other => Err(CoercionError::InvalidBoolean {
            found: other.type_name().to_string(),
        }),
    }
}

/// Renders a value as text. Never fails.
pub fn to_string(value: &Value) -> String {
    value.to_string()
}

/// Returns true if both values are the same variant.
pub fn types_match(a: &Value, b: &Value) -> bool {
    mem::discriminant(a) == mem::discriminant(b)
}

/// Resolves a dotted path such as `a.b.c` inside a record.
///
/// Any missing segment, or an intermediate value that is not an object,
/// yields `Value::Absent`.
pub fn lookup<'a>(record: &'a Record, path: &str) -> Value<'a> {
    let mut segments = path.split('.');
    let Some(first) = segments.next() else {
        return Value::Absent;
    };
    let mut current = match record.get(first) {
        Some(v) => v,
        None => return Value::Absent,
    };
    for segment in segments {
        current = match current {
            JsonValue::Object(map) => match map.get(segment) {
                Some(v) => v,
                None => return Value::Absent,
            },
            _ => return Value::Absent,
        };
    }
    Value::from_json(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(v: JsonValue) -> Record {
        match v {
            JsonValue::Object(map) => map,
            _ => panic!("fixture must be an object"),
        }
    }

    #[test]
    fn test_to_number() {
        assert_eq!(to_number(&Value::Number(12.0)), Ok(12.0));
        assert_eq!(to_number(&Value::from("12.011")), Ok(12.011));
        assert!(matches!(
            to_number(&Value::from("blep")),
            Err(CoercionError::InvalidNumber { .. })
        ));
        assert!(to_number(&Value::Boolean(true)).is_err());
        assert!(to_number(&Value::Absent).is_err());
    }

    #[test]
    fn test_to_boolean_words() {
        assert_eq!(to_boolean(&Value::from("YARP")), Ok(true));
        assert_eq!(to_boolean(&Value::from("Yes")), Ok(true));
        assert_eq!(to_boolean(&Value::from("y")), Ok(true));
        assert_eq!(to_boolean(&Value::from("narp")), Ok(false));
        assert_eq!(to_boolean(&Value::from("FALSE")), Ok(false));
    }

    #[test]
    fn test_to_boolean_numeric() {
        assert_eq!(to_boolean(&Value::from("0.00")), Ok(false));
        assert_eq!(to_boolean(&Value::from("12")), Ok(true));
        assert_eq!(to_boolean(&Value::from("-3")), Ok(false));
        assert_eq!(to_boolean(&Value::Number(0.5)), Ok(true));
        assert_eq!(to_boolean(&Value::Number(0.0)), Ok(false));
    }

    #[test]
    fn test_to_boolean_rejects() {
        assert!(matches!(
            to_boolean(&Value::from("blam")),
            Err(CoercionError::InvalidBoolean { .. })
        ));
        assert!(to_boolean(&Value::List(vec![json!(1), json!(2)].into())).is_err());
        assert!(to_boolean(&Value::Absent).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(to_string(&Value::Number(3.0)), "3");
        assert_eq!(to_string(&Value::Number(2.9)), "2.9");
        assert_eq!(to_string(&Value::Number(-4.0)), "-4");
        assert_eq!(to_string(&Value::Boolean(true)), "true");
        assert_eq!(to_string(&Value::Absent), "");
        assert_eq!(to_string(&Value::List(vec![json!(1), json!("a")].into())), r#"[1,"a"]"#);
    }

    #[test]
    fn test_types_match() {
        assert!(types_match(&Value::Number(1.0), &Value::Number(2.0)));
        assert!(!types_match(&Value::Number(1.0), &Value::from("1")));
        assert!(types_match(&Value::Absent, &Value::Absent));
    }

    #[test]
    fn test_lookup() {
        let data = record(json!({"foo": {"bar": {"baz": "hello"}}, "n": 2, "nil": null}));
        assert_eq!(lookup(&data, "foo.bar.baz"), Value::from("hello"));
        assert_eq!(lookup(&data, "n"), Value::Number(2.0));
        assert_eq!(lookup(&data, "nil"), Value::Absent);
        assert_eq!(lookup(&data, "missing"), Value::Absent);
        assert_eq!(lookup(&data, "foo.nope.baz"), Value::Absent);
        assert_eq!(lookup(&data, "n.deeper"), Value::Absent);
    }

    #[test]
    fn test_lookup_borrows_composites() {
        let data = record(json!({"tags": ["a", "b"], "meta": {"k": 1}}));
        match lookup(&data, "tags") {
            Value::List(Cow::Borrowed(items)) => {
                assert!(std::ptr::eq(items, data["tags"].as_array().unwrap().as_slice()))
            }
            other => panic!("expected borrowed list, got {:?}", other),
        }
        match lookup(&data, "meta") {
            Value::Record(Cow::Borrowed(map)) => {
                assert!(std::ptr::eq(map, data["meta"].as_object().unwrap()))
            }
            other => panic!("expected borrowed record, got {:?}", other),
        }
    }

    #[test]
    fn test_into_owned_detaches_from_record() {
        let owned = {
            let data = record(json!({"tags": ["a", "b"]}));
            lookup(&data, "tags").into_owned()
        };
        assert!(matches!(&owned, Value::List(Cow::Owned(_))));
        assert_eq!(owned.to_json(), json!(["a", "b"]));
    }

    #[test]
    fn test_lookup_empty_nested_record() {
        let data = record(json!({"a": {}}));
        assert_eq!(lookup(&data, "a.b.c"), Value::Absent);
    }
}
