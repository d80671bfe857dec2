//! Array transforms, including the higher-order `filter`, `map` and `reduce`.
//!
//! `filter` and `map` take their per-element logic as source text, parsed
//! once and evaluated for every element against a context that binds:
//!
//! | Name | Value |
//! |------|-------|
//! | `x`, `_x` | the current element |
//! | `_i` | its zero-based index |
//!
//! ```text
//! filter(int[1, 2, 3, 4, 5], "x > 3")        // [4, 5]
//! map(int[1, 2, 3], "_x * _i")               // [0, 2, 6]
//! reduce(int[1, 2, 3, 4, 5], "add", 10)      // 25
//! ```

use std::collections::HashMap;

use log::debug;
use rand::{Rng, seq::SliceRandom};

use crate::{
    builtins::{Arity, CallContext, Registry, array, expected, integer, string},
    context::Context,
    evaluator::EvalError,
    value::Value,
};

pub fn register(registry: &mut Registry) {
    registry.register_with_arity("filter", Arity::Exact(2), filter);
    registry.register_with_arity("map", Arity::Exact(2), map);
    registry.register_with_arity("reduce", Arity::Between(2, 3), reduce);
    registry.register_with_arity("concat", Arity::AtLeast(2), concat);
    registry.register_with_arity("len", Arity::Exact(1), len);
    registry.register_with_arity("reverse", Arity::Exact(1), reverse);
    registry.register_with_arity("slice", Arity::Exact(3), slice);
    registry.register_with_arity("sort", Arity::Exact(1), sort);
    registry.register_with_arity("unique", Arity::Exact(1), unique);
    registry.register_with_arity("shuffle", Arity::Exact(1), shuffle);
    registry.register_with_arity("rand", Arity::Between(1, 2), random);
    registry.register("list", |_, args| Ok(Value::Array(args)));
}

/// Context for one iteration of `filter`/`map`.
fn element_context(call: &CallContext<'_>, index: usize, element: &Value) -> Context {
    let mut vars = HashMap::with_capacity(3);
    vars.insert("x".to_string(), element.clone());
    vars.insert("_x".to_string(), element.clone());
    vars.insert("_i".to_string(), Value::Integer(index as i64));
    call.context().with_variables(vars)
}

fn filter(call: &CallContext<'_>, args: Vec<Value>) -> Result<Value, EvalError> {
    let items = array(call.function(), &args[0])?;
    let source = string(call.function(), &args[1])?;
    let expr = call.parse(source)?;
    debug!("filter over {} elements with '{}'", items.len(), source);

    let mut kept = Vec::new();
    for (i, item) in items.iter().enumerate() {
        call.context().check_cancelled()?;
        let ctx = element_context(call, i, item);
        match call.eval(source, &expr, &ctx)? {
            Value::Boolean(true) => kept.push(item.clone()),
            Value::Boolean(false) => {}
            other => {
                return Err(EvalError::Type(format!(
                    "filter expression '{}' must yield a boolean, got {}",
                    source,
                    other.type_name()
                )));
            }
        }
    }
    Ok(Value::Array(kept))
}

fn map(call: &CallContext<'_>, args: Vec<Value>) -> Result<Value, EvalError> {
    let items = array(call.function(), &args[0])?;
    let source = string(call.function(), &args[1])?;
    let expr = call.parse(source)?;
    debug!("map over {} elements with '{}'", items.len(), source);

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            call.context().check_cancelled()?;
            call.eval(source, &expr, &element_context(call, i, item))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array)
}

/// Folds with a registered two-argument function. Without a seed the first
/// element starts the fold.
fn reduce(call: &CallContext<'_>, mut args: Vec<Value>) -> Result<Value, EvalError> {
    let seed = if args.len() == 3 { args.pop() } else { None };
    let items = array(call.function(), &args[0])?;
    let name = string(call.function(), &args[1])?;
    debug!("reduce over {} elements with '{}'", items.len(), name);

    let (mut accumulator, rest) = match (seed, items.split_first()) {
        (Some(seed), _) => (seed, items),
        (None, Some((first, rest))) => (first.clone(), rest),
        (None, None) => {
            return Err(EvalError::invalid_argument(
                call.function(),
                "cannot reduce an empty array without an initial value",
            ));
        }
    };

    for item in rest {
        accumulator = call.invoke(name, vec![accumulator, item.clone()])?;
    }
    Ok(accumulator)
}

/// Joins strings or arrays; every argument must be of the first one's kind.
fn concat(call: &CallContext<'_>, args: Vec<Value>) -> Result<Value, EvalError> {
    match &args[0] {
        Value::String(_) => args
            .iter()
            .map(|v| string(call.function(), v))
            .collect::<Result<String, _>>()
            .map(Value::String),
        Value::Array(_) => {
            let mut joined = Vec::new();
            for v in &args {
                joined.extend_from_slice(array(call.function(), v)?);
            }
            Ok(Value::Array(joined))
        }
        other => Err(expected(call.function(), "strings or arrays", other)),
    }
}

fn len(call: &CallContext<'_>, args: Vec<Value>) -> Result<Value, EvalError> {
    let n = match &args[0] {
        Value::String(s) => s.chars().count(),
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        other => return Err(expected(call.function(), "a string, array or object", other)),
    };
    Ok(Value::Integer(n as i64))
}

fn reverse(call: &CallContext<'_>, mut args: Vec<Value>) -> Result<Value, EvalError> {
    match args.swap_remove(0) {
        Value::String(s) => Ok(Value::String(s.chars().rev().collect())),
        Value::Array(mut items) => {
            items.reverse();
            Ok(Value::Array(items))
        }
        other => Err(expected(call.function(), "a string or array", &other)),
    }
}

/// `slice(arr, start, end)`: elements `start..end`.
fn slice(call: &CallContext<'_>, args: Vec<Value>) -> Result<Value, EvalError> {
    let items = array(call.function(), &args[0])?;
    let start = integer(call.function(), &args[1])?;
    let end = integer(call.function(), &args[2])?;

    let range = usize::try_from(start)
        .ok()
        .zip(usize::try_from(end).ok())
        .filter(|(s, e)| s <= e && *e <= items.len());

    match range {
        Some((s, e)) => Ok(Value::Array(items[s..e].to_vec())),
        None => Err(EvalError::invalid_argument(
            call.function(),
            format!(
                "range {}..{} out of bounds for an array of length {}",
                start,
                end,
                items.len()
            ),
        )),
    }
}

/// Sorts numbers or strings in ascending order; mixed arrays are rejected.
fn sort(call: &CallContext<'_>, mut args: Vec<Value>) -> Result<Value, EvalError> {
    let mut items = match args.swap_remove(0) {
        Value::Array(items) => items,
        other => return Err(expected(call.function(), "an array", &other)),
    };

    let all_numbers = items.iter().all(Value::is_number);
    let all_strings = items.iter().all(|v| matches!(v, Value::String(_)));
    if !all_numbers && !all_strings {
        return Err(EvalError::Type(
            "sort expects an array of numbers or an array of strings".to_string(),
        ));
    }
    if items.iter().any(|v| matches!(v, Value::Float(x) if x.is_nan())) {
        return Err(EvalError::invalid_argument(call.function(), "cannot sort NaN"));
    }

    // Both kinds are totally ordered once NaN is excluded
    items.sort_by(|a, b| a.compare(b).unwrap_or(std::cmp::Ordering::Equal));
    Ok(Value::Array(items))
}

/// Drops repeated elements, keeping first occurrences in order.
fn unique(call: &CallContext<'_>, args: Vec<Value>) -> Result<Value, EvalError> {
    let items = array(call.function(), &args[0])?;
    let mut seen: Vec<Value> = Vec::with_capacity(items.len());
    for item in items {
        if !seen.contains(item) {
            seen.push(item.clone());
        }
    }
    Ok(Value::Array(seen))
}

fn shuffle(call: &CallContext<'_>, mut args: Vec<Value>) -> Result<Value, EvalError> {
    match args.swap_remove(0) {
        Value::Array(mut items) => {
            items.shuffle(&mut rand::thread_rng());
            Ok(Value::Array(items))
        }
        other => Err(expected(call.function(), "an array", &other)),
    }
}

/// `rand("int"[, n])` or `rand("float64"[, n])`. With a positive `n` the
/// result lies in `[0, n)`; otherwise ints span the non-negative i64 range
/// and floats `[0, 1)`.
fn random(call: &CallContext<'_>, args: Vec<Value>) -> Result<Value, EvalError> {
    let kind = string(call.function(), &args[0])?;
    let bound = match args.get(1) {
        Some(v) => integer(call.function(), v)?,
        None => 0,
    };

    let mut rng = rand::thread_rng();
    match (kind, bound) {
        ("int", n) if n > 0 => Ok(Value::Integer(rng.gen_range(0..n))),
        ("int", _) => Ok(Value::Integer(rng.gen_range(0..=i64::MAX))),
        ("float64", n) if n > 0 => Ok(Value::Float(rng.gen_range(0.0..n as f64))),
        ("float64", _) => Ok(Value::Float(rng.gen_range(0.0..1.0))),
        (other, _) => Err(EvalError::invalid_argument(
            call.function(),
            format!("unknown kind '{}', expected \"int\" or \"float64\"", other),
        )),
    }
}
