//! Aggregates over numeric arguments and simple time-value-of-money helpers.

use std::cmp::Ordering;

use rust_decimal::{
    Decimal,
    prelude::{FromPrimitive, ToPrimitive},
};

use crate::{
    builtins::{Arity, CallContext, Registry, expected, number},
    evaluator::EvalError,
    value::Value,
};

pub fn register(registry: &mut Registry) {
    registry.register_with_arity("max", Arity::AtLeast(1), |call, args| {
        extreme(call, &args, Ordering::Greater)
    });
    registry.register_with_arity("min", Arity::AtLeast(1), |call, args| {
        extreme(call, &args, Ordering::Less)
    });
    registry.register_with_arity("mean", Arity::AtLeast(1), |call, args| {
        let xs = numbers(call, &args)?;
        Ok(Value::Float(mean(&xs)))
    });
    registry.register_with_arity("median", Arity::AtLeast(1), median);
    registry.register_with_arity("mode", Arity::AtLeast(1), mode);
    registry.register_with_arity("stddev", Arity::AtLeast(1), |call, args| {
        // Population standard deviation
        let xs = numbers(call, &args)?;
        Ok(Value::Float((squared_deviations(&xs) / xs.len() as f64).sqrt()))
    });
    registry.register_with_arity("variance", Arity::AtLeast(2), |call, args| {
        // Sample variance
        let xs = numbers(call, &args)?;
        Ok(Value::Float(squared_deviations(&xs) / (xs.len() - 1) as f64))
    });
    registry.register_with_arity("sum", Arity::AtLeast(1), sum);
    registry.register_with_arity("pv", Arity::Exact(3), |call, args| {
        let (fv, rate, periods) = money_args(call, &args)?;
        let factor = (1.0 + rate).powf(periods);
        if factor == 0.0 {
            return Err(EvalError::DivideByZero);
        }
        Ok(Value::Float(fv / factor))
    });
    registry.register_with_arity("fv", Arity::Exact(3), |call, args| {
        let (pv, rate, periods) = money_args(call, &args)?;
        Ok(Value::Float(pv * (1.0 + rate).powf(periods)))
    });
}

fn numbers(call: &CallContext<'_>, args: &[Value]) -> Result<Vec<f64>, EvalError> {
    args.iter().map(|v| number(call.function(), v)).collect()
}

fn mean(xs: &[f64]) -> f64 {
    xs.iter().sum::<f64>() / xs.len() as f64
}

fn squared_deviations(xs: &[f64]) -> f64 {
    let m = mean(xs);
    xs.iter().map(|x| (x - m).powi(2)).sum()
}

/// `max`/`min`: integral when every argument is an integer.
fn extreme(call: &CallContext<'_>, args: &[Value], keep: Ordering) -> Result<Value, EvalError> {
    let integers = args
        .iter()
        .map(|v| match v {
            Value::Integer(n) => Some(*n),
            _ => None,
        })
        .collect::<Option<Vec<i64>>>();

    if let Some(ints) = integers {
        let best = ints
            .into_iter()
            .reduce(|a, b| if b.cmp(&a) == keep { b } else { a });
        return best
            .map(Value::Integer)
            .ok_or_else(|| EvalError::invalid_argument(call.function(), "no arguments"));
    }

    let xs = numbers(call, args)?;
    xs.into_iter()
        .reduce(|a, b| if b.partial_cmp(&a) == Some(keep) { b } else { a })
        .map(Value::Float)
        .ok_or_else(|| EvalError::invalid_argument(call.function(), "no arguments"))
}

fn median(call: &CallContext<'_>, args: Vec<Value>) -> Result<Value, EvalError> {
    let mut xs = numbers(call, &args)?;
    xs.sort_by(f64::total_cmp);

    let mid = xs.len() / 2;
    let median = if xs.len() % 2 == 0 {
        (xs[mid - 1] + xs[mid]) / 2.0
    } else {
        xs[mid]
    };
    Ok(Value::Float(median))
}

/// Most frequent value; ties go to the value seen first.
fn mode(call: &CallContext<'_>, args: Vec<Value>) -> Result<Value, EvalError> {
    let xs = numbers(call, &args)?;

    let mut counts: Vec<(f64, usize)> = Vec::new();
    for x in xs {
        match counts.iter_mut().find(|(v, _)| *v == x) {
            Some((_, count)) => *count += 1,
            None => counts.push((x, 1)),
        }
    }

    let mut best = counts[0];
    for &(value, count) in &counts[1..] {
        if count > best.1 {
            best = (value, count);
        }
    }
    Ok(Value::Float(best.0))
}

/// Sums numbers and the contents of (nested) arrays in decimal arithmetic.
fn sum(call: &CallContext<'_>, args: Vec<Value>) -> Result<Value, EvalError> {
    let total = sum_decimal(call.function(), &args)?;
    total
        .to_f64()
        .map(Value::Float)
        .ok_or_else(|| EvalError::Overflow(call.function().to_string()))
}

fn sum_decimal(function: &str, values: &[Value]) -> Result<Decimal, EvalError> {
    let mut total = Decimal::ZERO;
    for value in values {
        let term = match value {
            Value::Integer(n) => Decimal::from(*n),
            Value::Float(x) => Decimal::from_f64(*x).ok_or_else(|| {
                EvalError::invalid_argument(function, format!("cannot sum {}", x))
            })?,
            Value::Array(items) => sum_decimal(function, items)?,
            other => return Err(expected(function, "numbers or arrays of numbers", other)),
        };
        total = total
            .checked_add(term)
            .ok_or_else(|| EvalError::Overflow(function.to_string()))?;
    }
    Ok(total)
}

fn money_args(call: &CallContext<'_>, args: &[Value]) -> Result<(f64, f64, f64), EvalError> {
    Ok((
        number(call.function(), &args[0])?,
        number(call.function(), &args[1])?,
        number(call.function(), &args[2])?,
    ))
}
