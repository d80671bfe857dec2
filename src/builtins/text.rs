//! Hashing, string predicates and environment lookup.

use std::env;

use log::trace;
use regex::Regex;
use sha2::{Digest, Sha256, Sha512};

use crate::{
    builtins::{Arity, CallContext, Registry, expected, string},
    evaluator::EvalError,
    value::Value,
};

pub fn register(registry: &mut Registry) {
    registry.register_with_arity("sha256", Arity::Exact(1), |call, args| {
        let input = hash_input(call, &args[0])?;
        Ok(Value::String(format!("{:x}", Sha256::digest(input.as_bytes()))))
    });
    registry.register_with_arity("sha512", Arity::Exact(1), |call, args| {
        let input = hash_input(call, &args[0])?;
        Ok(Value::String(format!("{:x}", Sha512::digest(input.as_bytes()))))
    });

    registry.register_with_arity("upper", Arity::Exact(1), |call, args| {
        Ok(Value::String(string(call.function(), &args[0])?.to_uppercase()))
    });
    registry.register_with_arity("lower", Arity::Exact(1), |call, args| {
        Ok(Value::String(string(call.function(), &args[0])?.to_lowercase()))
    });

    registry.register_with_arity("contains", Arity::Exact(2), contains);
    registry.register_with_arity("startswith", Arity::Exact(2), |call, args| {
        let (s, prefix) = string_pair(call, &args)?;
        Ok(Value::Boolean(s.starts_with(prefix)))
    });
    registry.register_with_arity("endswith", Arity::Exact(2), |call, args| {
        let (s, suffix) = string_pair(call, &args)?;
        Ok(Value::Boolean(s.ends_with(suffix)))
    });
    registry.register_with_arity("matches", Arity::Exact(2), matches);
    registry.register_with_arity("env", Arity::Exact(1), lookup_env);
}

/// Text that gets hashed: strings as-is, integers in decimal, floats with six
/// fractional digits.
fn hash_input(call: &CallContext<'_>, value: &Value) -> Result<String, EvalError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Integer(n) => Ok(n.to_string()),
        Value::Float(x) => Ok(format!("{:.6}", x)),
        other => Err(expected(call.function(), "a string or number", other)),
    }
}

fn string_pair<'v>(
    call: &CallContext<'_>,
    args: &'v [Value],
) -> Result<(&'v str, &'v str), EvalError> {
    Ok((
        string(call.function(), &args[0])?,
        string(call.function(), &args[1])?,
    ))
}

/// Substring test on strings, membership test on arrays.
fn contains(call: &CallContext<'_>, args: Vec<Value>) -> Result<Value, EvalError> {
    match &args[0] {
        Value::String(s) => {
            let needle = string(call.function(), &args[1])?;
            Ok(Value::Boolean(s.contains(needle)))
        }
        Value::Array(items) => Ok(Value::Boolean(
            items.iter().any(|item| item.loose_eq(&args[1])),
        )),
        other => Err(expected(call.function(), "a string or array", other)),
    }
}

/// `matches(s, pattern)`: whether the regular expression matches anywhere in `s`.
fn matches(call: &CallContext<'_>, args: Vec<Value>) -> Result<Value, EvalError> {
    let (s, pattern) = string_pair(call, &args)?;
    let re = Regex::new(pattern).map_err(|e| {
        EvalError::invalid_argument(call.function(), format!("invalid pattern: {}", e))
    })?;
    Ok(Value::Boolean(re.is_match(s)))
}

/// Reads an environment variable; unset or non-UTF-8 values read as "".
fn lookup_env(call: &CallContext<'_>, args: Vec<Value>) -> Result<Value, EvalError> {
    call.context().check_cancelled()?;
    let name = string(call.function(), &args[0])?;
    trace!("env lookup {}", name);
    Ok(Value::String(env::var(name).unwrap_or_default()))
}
