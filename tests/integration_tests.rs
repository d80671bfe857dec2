// tests/integration_tests.rs

use std::collections::HashMap;
use std::sync::Arc;
use std::thread;

use condex::builtins::{Arity, Registry};
use condex::{CancelToken, Context, Error, EvalError, Evaluator, ParseError, Value};

fn object(pairs: Vec<(&str, Value)>) -> Value {
    Value::Object(
        pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
    )
}

/// foo = 10, bar = { baz: 5, qux: { quux: 5 } }
fn nested_context() -> Context {
    let bar = object(vec![
        ("baz", Value::Integer(5)),
        ("qux", object(vec![("quux", Value::Integer(5))])),
    ]);
    Context::from_pairs([("foo", Value::Integer(10)), ("bar", bar)])
}

fn eval(input: &str) -> Value {
    eval_in(&Context::new(), input)
}

fn eval_in(ctx: &Context, input: &str) -> Value {
    condex::evaluate(ctx, input).unwrap_or_else(|e| panic!("Failed to evaluate {}: {}", input, e))
}

fn eval_err(ctx: &Context, input: &str) -> EvalError {
    match condex::evaluate(ctx, input) {
        Err(Error::Eval(e)) => e,
        other => panic!("Expected an evaluation error for {}, got {:?}", input, other),
    }
}

// ============================================================================
// Arithmetic and comparison
// ============================================================================

#[test]
fn test_boolean_results() {
    let test_cases = vec![
        "5 % 2 == 1",
        "5 // 2 == 2",
        "5 / 2 == 2",
        "5 + 5 * 5 == 30",
        "(5 + 5) * 5 == 50",
        "2 ** 3 == 8",
        "2 ^ 3 == 8",
        "1 << 2 == 4",
        "4 >> 2 == 1",
        "5 == 5.00",
        "-5 * 4 == -20",
        "-(5 * 4) == -20",
        "(2+5) == 7",
        "(2.5+4.5) == 7",
        "(2+5) != 4",
        "-2 + 3 * 4 - 5 // 2 ^ 2 << 1 >> 2 % 3 == 4",
        "max(max(10, 20), max(5.25, 25)) == 25",
        "\"abc\" + \"def\" == \"abcdef\"",
        "\"abc\" < \"abd\"",
        "!(1 > 2)",
        "true != false",
        "[1, \"a\"] == [1.0, \"a\"]",
    ];

    for input in test_cases {
        assert_eq!(eval(input), Value::Boolean(true), "Failed for input: {}", input);
    }
}

#[test]
fn test_numeric_kinds() {
    assert_eq!(eval("7 / 2"), Value::Integer(3));
    assert_eq!(eval("7 / 2.0"), Value::Float(3.5));
    assert_eq!(eval("7.9 // 2"), Value::Integer(3));
    assert_eq!(eval("2 ** 3"), Value::Float(8.0));
    assert_eq!(eval("2 ** 3 ** 2"), Value::Float(512.0));
    assert_eq!(eval("-7 % 3"), Value::Integer(-1));
}

#[test]
fn test_float_literal_with_exponent() {
    let ctx = Context::from_pairs([("a", 1), ("b", 1)]);
    assert_eq!(eval_in(&ctx, "a + (b * 1e+06)"), Value::Float(1000001.0));
}

#[test]
fn test_mismatched_equality_is_false() {
    assert_eq!(eval("5 == \"5\""), Value::Boolean(false));
    assert_eq!(eval("5 != \"5\""), Value::Boolean(true));
    assert_eq!(eval("true == 1"), Value::Boolean(false));
}

// ============================================================================
// Variables
// ============================================================================

#[test]
fn test_nested_context() {
    let ctx = nested_context();
    assert_eq!(
        eval_in(&ctx, "foo == (bar.baz + bar.qux.quux)"),
        Value::Boolean(true)
    );
    assert_eq!(eval_in(&ctx, "bar.qux.quux * 2"), Value::Integer(10));
    assert_eq!(
        eval_in(&ctx, "bar.qux"),
        object(vec![("quux", Value::Integer(5))])
    );
}

#[test]
fn test_comparison_with_variables() {
    let ctx = Context::from_pairs([
        ("foo", Value::Boolean(false)),
        ("bar", Value::Integer(3)),
        ("baz", Value::Integer(2)),
    ]);
    assert_eq!(
        eval_in(&ctx, "false == foo || ( bar >= baz )"),
        Value::Boolean(true)
    );
    assert_eq!(eval_in(&ctx, "foo || bar < baz"), Value::Boolean(false));
}

#[test]
fn test_name_value_pairs_as_variables() {
    let test_cases = vec![
        (vec![("foo", Value::Integer(5))], "foo == 5", true),
        (vec![("foo", Value::Integer(4))], "foo == 5", false),
        (
            vec![("foo", Value::Integer(5)), ("bar", Value::from("x"))],
            "foo == 5 && bar == \"x\"",
            true,
        ),
    ];

    for (pairs, input, expected) in test_cases {
        let ctx = Context::from_pairs(pairs);
        assert_eq!(
            eval_in(&ctx, input),
            Value::Boolean(expected),
            "Failed for input: {}",
            input
        );
    }
}

#[test]
fn test_missing_variables() {
    let ctx = nested_context();
    match eval_err(&ctx, "bar.qux.missing == 1") {
        EvalError::Lookup { path } => assert_eq!(path, "bar.qux.missing"),
        other => panic!("Expected Lookup, got {:?}", other),
    }
    // foo is not an object
    assert!(matches!(
        eval_err(&ctx, "foo.bar"),
        EvalError::Lookup { .. }
    ));
    assert!(matches!(eval_err(&ctx, "nope"), EvalError::Lookup { .. }));
}

#[test]
fn test_variable_free_trees_ignore_context() {
    let expr = condex::parse("5 + 5 * 5 == 30 && sqrt(16) == 4").unwrap();
    let evaluator = Evaluator::new();
    let empty = evaluator.eval(&expr, &Context::new()).unwrap();
    let full = evaluator.eval(&expr, &nested_context()).unwrap();
    assert_eq!(empty, full);
    assert_eq!(empty, Value::Boolean(true));
}

#[test]
fn test_overlay_context_does_not_leak() {
    let base = nested_context();
    let overlay = base.with_variables(HashMap::from([("foo".to_string(), Value::Integer(1))]));
    assert_eq!(eval_in(&overlay, "foo + bar.baz"), Value::Integer(6));
    assert_eq!(eval_in(&base, "foo + bar.baz"), Value::Integer(15));
}

// ============================================================================
// Arrays
// ============================================================================

#[test]
fn test_array_literals() {
    assert_eq!(eval("int[1, 2, 3]"), Value::from(vec![1, 2, 3]));
    assert_eq!(eval("float[1, 2.5]"), Value::from(vec![1.0, 2.5]));
    assert_eq!(
        eval("[1, \"a\", true]"),
        Value::Array(vec![Value::Integer(1), Value::from("a"), Value::Boolean(true)])
    );
    assert_eq!(eval("string[]"), Value::Array(vec![]));
}

#[test]
fn test_array_element_hints_are_enforced() {
    let ctx = Context::new();
    for input in ["int[1, 2.5]", "string[\"a\", 1]", "bool[true, 0]", "float[\"1\"]"] {
        assert!(
            matches!(eval_err(&ctx, input), EvalError::Type(_)),
            "Expected a type error for {}",
            input
        );
    }
}

// ============================================================================
// Logical operators
// ============================================================================

#[test]
fn test_logical_operators_short_circuit() {
    let ctx = Context::new();
    // The right side would fail if evaluated
    assert_eq!(eval("false && missing"), Value::Boolean(false));
    assert_eq!(eval("true || 1 / 0 == 1"), Value::Boolean(true));
    assert_eq!(eval("false && unknown_fn()"), Value::Boolean(false));

    assert!(matches!(
        eval_err(&ctx, "true && missing"),
        EvalError::Lookup { .. }
    ));
    assert!(matches!(
        eval_err(&ctx, "false || 1 / 0 == 1"),
        EvalError::DivideByZero
    ));
}

#[test]
fn test_logical_operators_require_booleans() {
    let ctx = Context::new();
    assert!(matches!(eval_err(&ctx, "1 && true"), EvalError::Type(_)));
    assert!(matches!(eval_err(&ctx, "true && 1"), EvalError::Type(_)));
    assert!(matches!(eval_err(&ctx, "!5"), EvalError::Type(_)));
}

// ============================================================================
// Higher-order builtins
// ============================================================================

#[test]
fn test_filter_map_reduce() {
    assert_eq!(
        eval("filter(int[1,2,3,4,5], \"x > 3\")"),
        Value::from(vec![4, 5])
    );
    assert_eq!(
        eval("filter(int[1,2,3,4,5], \"x > 3\") == [4, 5]"),
        Value::Boolean(true)
    );
    assert_eq!(
        eval("map(int[1,2,3,4,5], \"_x * 2\")"),
        Value::from(vec![2, 4, 6, 8, 10])
    );
    assert_eq!(eval("map(int[1,2,3], \"_x * _i\")"), Value::from(vec![0, 2, 6]));
    assert_eq!(eval("reduce(int[1,2,3,4,5], \"add\")"), Value::Integer(15));
    assert_eq!(eval("reduce(int[1,2,3,4,5], \"add\", 10)"), Value::Integer(25));
}

#[test]
fn test_sub_expressions_see_outer_variables() {
    let ctx = nested_context();
    assert_eq!(
        eval_in(&ctx, "filter(int[1, 5, 9], \"x >= bar.baz\")"),
        Value::from(vec![5, 9])
    );
    // Loop variables shadow outer ones only inside the sub-expression
    let ctx = Context::from_pairs([("x", 100)]);
    assert_eq!(eval_in(&ctx, "map(int[1], \"x\")"), Value::from(vec![1]));
    assert_eq!(eval_in(&ctx, "x"), Value::Integer(100));
}

#[test]
fn test_sub_expression_failures_are_nested() {
    let ctx = Context::new();
    match eval_err(&ctx, "map(int[1, 2], \"_x / 0\")") {
        EvalError::Nested { expression, error } => {
            assert_eq!(expression, "_x / 0");
            assert!(matches!(*error, Error::Eval(EvalError::DivideByZero)));
        }
        other => panic!("Expected Nested, got {:?}", other),
    }

    match eval_err(&ctx, "filter(int[1], \"x >\")") {
        EvalError::Nested { error, .. } => {
            assert!(matches!(*error, Error::Parse(ParseError::UnexpectedEof { .. })));
        }
        other => panic!("Expected Nested, got {:?}", other),
    }
}

#[test]
fn test_filter_requires_boolean_results() {
    let ctx = Context::new();
    assert!(matches!(
        eval_err(&ctx, "filter(int[1, 2], \"x + 1\")"),
        EvalError::Type(_)
    ));
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_evaluation_errors() {
    let ctx = Context::new();
    assert!(matches!(eval_err(&ctx, "1 / 0"), EvalError::DivideByZero));
    assert!(matches!(eval_err(&ctx, "1.5 / 0"), EvalError::DivideByZero));
    assert!(matches!(eval_err(&ctx, "5 % 0"), EvalError::DivideByZero));
    assert!(matches!(eval_err(&ctx, "\"a\" * 2"), EvalError::Type(_)));
    assert!(matches!(eval_err(&ctx, "\"a\" - \"b\""), EvalError::Type(_)));
    assert!(matches!(eval_err(&ctx, "true < false"), EvalError::Type(_)));
    assert!(matches!(
        eval_err(&ctx, "9223372036854775807 + 1"),
        EvalError::Overflow(_)
    ));
    for input in ["1e19 // 1", "1e300 % 7", "-1e300 >> 1"] {
        assert!(
            matches!(eval_err(&ctx, input), EvalError::Overflow(_)),
            "Failed for input: {}",
            input
        );
    }
    assert!(matches!(eval_err(&ctx, "5 % sqrt(-1)"), EvalError::Type(_)));
    match eval_err(&ctx, "nope(1)") {
        EvalError::UnknownFunction(name) => assert_eq!(name, "nope"),
        other => panic!("Expected UnknownFunction, got {:?}", other),
    }
    match eval_err(&ctx, "sqrt(1, 2)") {
        EvalError::Arity {
            function,
            expected,
            got,
        } => {
            assert_eq!(function, "sqrt");
            assert_eq!(expected, Arity::Exact(1));
            assert_eq!(got, 2);
        }
        other => panic!("Expected Arity, got {:?}", other),
    }
}

#[test]
fn test_parse_errors_surface_through_evaluate() {
    let result = condex::evaluate(&Context::new(), "45 + ((1250 x 100) / 100)");
    assert!(matches!(result, Err(Error::Parse(_))));
}

#[test]
fn test_long_operator_chains_are_rejected() {
    let chain = format!("1{}", " + 1".repeat(200_000));
    assert!(matches!(
        condex::evaluate(&Context::new(), &chain),
        Err(Error::Parse(ParseError::TooDeeplyNested { .. }))
    ));
    assert!(matches!(
        condex::render(&chain),
        Err(ParseError::TooDeeplyNested { .. })
    ));

    let chain = format!("1{}", " + 1".repeat(99));
    assert_eq!(eval(&chain), Value::Integer(100));
}

#[test]
fn test_error_messages() {
    let err = condex::evaluate(&Context::new(), "missing + 1").unwrap_err();
    assert_eq!(err.to_string(), "Undefined variable 'missing'");

    let err = condex::evaluate(&Context::new(), "sqrt()").unwrap_err();
    assert_eq!(err.to_string(), "sqrt expects exactly 1 argument(s), got 0");
}

// ============================================================================
// Cancellation
// ============================================================================

#[test]
fn test_cancelled_context_stops_calls() {
    let token = CancelToken::new();
    let ctx = Context::new().with_cancel_token(token.clone());
    assert_eq!(eval_in(&ctx, "sqrt(16)"), Value::Float(4.0));

    token.cancel();
    assert!(matches!(eval_err(&ctx, "sqrt(16)"), EvalError::Cancelled));
    // Call-free expressions never observe the token
    assert_eq!(eval_in(&ctx, "1 + 2"), Value::Integer(3));
}

#[test]
fn test_cancellation_inside_iteration_is_not_nested() {
    let mut registry = Registry::standard();
    registry.register_with_arity("stop", Arity::Exact(0), |call, _| {
        call.context().cancel_token().cancel();
        Ok(Value::Integer(0))
    });
    let evaluator = Evaluator::with_registry(registry);

    let ctx = Context::new();
    let result = evaluator.evaluate("map(int[1, 2, 3], \"stop()\")", &ctx);
    assert!(matches!(result, Err(Error::Eval(EvalError::Cancelled))));
    assert!(ctx.cancel_token().is_cancelled());
}

// ============================================================================
// Custom registries
// ============================================================================

#[test]
fn test_custom_function() {
    let mut registry = Registry::standard();
    registry.register_with_arity("custom", Arity::Exact(1), |call, args| {
        let squared = call.invoke("mul", vec![args[0].clone(), args[0].clone()])?;
        call.invoke("double", vec![squared])
    });
    let evaluator = Evaluator::with_registry(registry);
    let ctx = Context::new();

    assert_eq!(
        evaluator.evaluate("custom(3)", &ctx).unwrap(),
        Value::Integer(18)
    );
    assert_eq!(
        evaluator
            .evaluate("map(int[1, 2, 3], \"custom(_x)\")", &ctx)
            .unwrap(),
        Value::from(vec![2, 8, 18])
    );
    // The shared default evaluator is unaffected
    assert!(matches!(
        eval_err(&ctx, "custom(3)"),
        EvalError::UnknownFunction(_)
    ));
}

#[test]
fn test_empty_registry() {
    let evaluator = Evaluator::with_registry(Registry::new());
    let ctx = Context::new();
    assert_eq!(
        evaluator.evaluate("1 + 2 * 3", &ctx).unwrap(),
        Value::Integer(7)
    );
    assert!(matches!(
        evaluator.evaluate("sqrt(4)", &ctx),
        Err(Error::Eval(EvalError::UnknownFunction(_)))
    ));
}

#[test]
fn test_reduce_with_registered_function() {
    let mut registry = Registry::standard();
    registry.register_with_arity("longer", Arity::Exact(2), |_, args| {
        let a = args[0].as_str().unwrap_or_default();
        let b = args[1].as_str().unwrap_or_default();
        Ok(Value::from(if b.len() > a.len() { b } else { a }))
    });
    let evaluator = Evaluator::with_registry(registry);
    let result = evaluator
        .evaluate("reduce([\"a\", \"abc\", \"ab\"], \"longer\")", &Context::new())
        .unwrap();
    assert_eq!(result, Value::from("abc"));
}

// ============================================================================
// Concurrency
// ============================================================================

#[test]
fn test_shared_tree_across_threads() {
    let evaluator = Arc::new(Evaluator::new());
    let expr = Arc::new(condex::parse("n * 2 + sum(int[1, 2, 3])").unwrap());

    let handles: Vec<_> = (0..8)
        .map(|n| {
            let evaluator = Arc::clone(&evaluator);
            let expr = Arc::clone(&expr);
            thread::spawn(move || {
                let ctx = Context::from_pairs([("n", n)]);
                evaluator.eval(&expr, &ctx).unwrap()
            })
        })
        .collect();

    for (n, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), Value::Float(n as f64 * 2.0 + 6.0));
    }
}

#[test]
fn test_core_types_are_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<condex::Expr>();
    assert_send_sync::<Value>();
    assert_send_sync::<Context>();
    assert_send_sync::<Registry>();
    assert_send_sync::<Evaluator>();
    assert_send_sync::<Error>();
}
