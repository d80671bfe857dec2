//! Arithmetic, trigonometry and rounding, plus one function per operator.

use std::f64::consts::PI;

use crate::{
    ast::{BinOp, UnaryOp},
    builtins::{Arity, CallContext, Registry, expected, number},
    evaluator::{EvalError, ops},
    value::{self, Value},
};

pub fn register(registry: &mut Registry) {
    // Operator forms share the evaluator's operator semantics.
    for op in BinOp::ALL {
        registry.register_with_arity(op.function_name(), Arity::Exact(2), move |_, args| {
            ops::apply_binary(op, &args[0], &args[1])
        });
    }
    for op in [UnaryOp::Neg, UnaryOp::Not] {
        registry.register_with_arity(op.function_name(), Arity::Exact(1), move |_, args| {
            ops::apply_unary(op, &args[0])
        });
    }

    float_fn(registry, "acos", f64::acos);
    float_fn(registry, "asin", f64::asin);
    float_fn(registry, "atan", f64::atan);
    float_fn(registry, "cos", f64::cos);
    float_fn(registry, "cosh", f64::cosh);
    float_fn(registry, "sin", f64::sin);
    float_fn(registry, "sinh", f64::sinh);
    float_fn(registry, "tan", f64::tan);
    float_fn(registry, "tanh", f64::tanh);
    float_fn(registry, "sqrt", f64::sqrt);
    float_fn(registry, "log10", f64::log10);
    float_fn(registry, "log2", f64::log2);
    float_fn(registry, "deg2rad", |x| x * PI / 180.0);
    float_fn(registry, "rad2deg", |x| x * 180.0 / PI);

    float_fn2(registry, "hypot", f64::hypot);
    float_fn2(registry, "log", |x, base| x.ln() / base.ln());
    float_fn2(registry, "root", |x, n| x.powf(1.0 / n));

    registry.register_with_arity("abs", Arity::Exact(1), abs);
    registry.register_with_arity("double", Arity::Exact(1), double);
    registry.register_with_arity("exp", Arity::Between(1, 2), exp);
    registry.register_with_arity("ceil", Arity::Exact(1), |call, args| {
        round_with(call, &args[0], f64::ceil)
    });
    registry.register_with_arity("floor", Arity::Exact(1), |call, args| {
        round_with(call, &args[0], f64::floor)
    });
    registry.register_with_arity("round", Arity::Exact(1), |call, args| {
        round_with(call, &args[0], f64::round)
    });
}

/// Registers a one-argument function over floats.
fn float_fn(registry: &mut Registry, name: &'static str, f: fn(f64) -> f64) {
    registry.register_with_arity(name, Arity::Exact(1), move |call, args| {
        Ok(Value::Float(f(number(call.function(), &args[0])?)))
    });
}

fn float_fn2(registry: &mut Registry, name: &'static str, f: fn(f64, f64) -> f64) {
    registry.register_with_arity(name, Arity::Exact(2), move |call, args| {
        let a = number(call.function(), &args[0])?;
        let b = number(call.function(), &args[1])?;
        Ok(Value::Float(f(a, b)))
    });
}

fn abs(call: &CallContext<'_>, args: Vec<Value>) -> Result<Value, EvalError> {
    match &args[0] {
        Value::Integer(n) => n
            .checked_abs()
            .map(Value::Integer)
            .ok_or_else(|| EvalError::Overflow(call.function().to_string())),
        Value::Float(n) => Ok(Value::Float(n.abs())),
        other => Err(expected(call.function(), "a number", other)),
    }
}

fn double(call: &CallContext<'_>, args: Vec<Value>) -> Result<Value, EvalError> {
    match &args[0] {
        Value::Integer(n) => n
            .checked_mul(2)
            .map(Value::Integer)
            .ok_or_else(|| EvalError::Overflow(call.function().to_string())),
        Value::Float(n) => Ok(Value::Float(n * 2.0)),
        other => Err(expected(call.function(), "a number", other)),
    }
}

/// `exp(x)` is e raised to x; `exp(x, y)` raises x to y.
fn exp(call: &CallContext<'_>, args: Vec<Value>) -> Result<Value, EvalError> {
    let x = number(call.function(), &args[0])?;
    match args.get(1) {
        Some(y) => Ok(Value::Float(x.powf(number(call.function(), y)?))),
        None => Ok(Value::Float(x.exp())),
    }
}

/// Rounds a float to an integer with `f`; integers pass through.
fn round_with(call: &CallContext<'_>, value: &Value, f: fn(f64) -> f64) -> Result<Value, EvalError> {
    match value {
        Value::Integer(n) => Ok(Value::Integer(*n)),
        Value::Float(x) => float_to_int(call.function(), f(*x)).map(Value::Integer),
        other => Err(expected(call.function(), "a number", other)),
    }
}

/// Converts an already-rounded float, failing when it has no i64 equivalent.
fn float_to_int(function: &str, x: f64) -> Result<i64, EvalError> {
    value::float_to_int(x).ok_or_else(|| {
        EvalError::invalid_argument(function, format!("{} does not fit in an integer", x))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_to_int_bounds() {
        assert_eq!(float_to_int("round", 6.0).unwrap(), 6);
        assert_eq!(float_to_int("round", -2.0).unwrap(), -2);
        assert!(float_to_int("round", f64::NAN).is_err());
        assert!(float_to_int("round", 1e19).is_err());
    }
}
