//! Property tests over generated arithmetic expressions.

use parsley::{
    parse, to_boolean, Engine, EngineOptions, LexError, Lexer, Record, Registry, Value,
};
use proptest::prelude::*;
use serde_json::json;

fn record() -> Record {
    match json!({"x": 3, "y": {"z": 2.5}, "s": "text"}) {
        serde_json::Value::Object(map) => map,
        _ => unreachable!(),
    }
}

fn arithmetic() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        (0u32..1000).prop_map(|n| n.to_string()),
        (0u32..100, 1u32..100).prop_map(|(a, b)| format!("{}.{}", a, b)),
        Just("x".to_string()),
        Just("y.z".to_string()),
        Just("missing".to_string()),
    ];
    leaf.prop_recursive(4, 32, 2, |inner| {
        prop_oneof![
            (
                inner.clone(),
                prop::sample::select(vec!["+", "-", "*", "/", "^", "==", "<", ">"]),
                inner.clone()
            )
                .prop_map(|(a, op, b)| format!("{} {} {}", a, op, b)),
            inner.clone().prop_map(|a| format!("({})", a)),
            inner.clone().prop_map(|a| format!("-{}", a)),
            inner.prop_map(|a| format!("round({})", a)),
        ]
    })
}

/// Results compared through their debug form so NaN equals NaN.
fn outcome<T: std::fmt::Debug>(result: T) -> String {
    format!("{:?}", result)
}

proptest! {
    #[test]
    fn display_text_reparses_to_same_tree(expression in arithmetic()) {
        let registry = Registry::new();
        let node = parse(&expression, &registry).unwrap();
        let text = node.to_display_text();
        let reparsed = parse(&text, &registry).unwrap();
        prop_assert_eq!(reparsed.to_display_text(), text);

        let data = record();
        prop_assert_eq!(outcome(node.eval(&data)), outcome(reparsed.eval(&data)));
    }

    #[test]
    fn evaluation_is_deterministic(expression in arithmetic()) {
        let registry = Registry::new();
        let node = parse(&expression, &registry).unwrap();
        let data = record();
        prop_assert_eq!(outcome(node.eval(&data)), outcome(node.eval(&data)));
    }

    #[test]
    fn caching_does_not_change_results(expression in arithmetic()) {
        let cached = Engine::with_options(EngineOptions {
            cache_capacity: Some(4),
            ..EngineOptions::default()
        });
        let uncached = Engine::new();
        let data = record();
        let expected = outcome(uncached.evaluate(&expression, &data));
        prop_assert_eq!(outcome(cached.evaluate(&expression, &data)), expected.clone());
        prop_assert_eq!(outcome(cached.evaluate(&expression, &data)), expected);
    }

    #[test]
    fn numbers_are_truthy_when_positive(n in any::<f64>().prop_filter("finite", |n| n.is_finite())) {
        prop_assert_eq!(to_boolean(&Value::Number(n)), Ok(n > 0.0));
        prop_assert_eq!(to_boolean(&Value::String(n.to_string())), Ok(n > 0.0));
    }

    #[test]
    fn scanned_numeric_literals_always_parse(input in "[0-9.]{1,16}") {
        let registry = Registry::new();
        let result = Lexer::new(&input, &registry).tokenize();
        let rejected = matches!(result, Err(LexError::InvalidNumericLiteral { .. }));
        prop_assert!(!rejected, "{:?}", result);
    }

    #[test]
    fn arbitrary_input_never_panics(input in ".{0,40}") {
        let registry = Registry::new();
        let _ = Lexer::new(&input, &registry).tokenize();
        let _ = parse(&input, &registry);
    }
}
