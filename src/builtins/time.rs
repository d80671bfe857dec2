//! Date and time parsing. All results are UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};

use crate::{
    builtins::{Arity, CallContext, Registry, expected, string},
    evaluator::EvalError,
    value::Value,
};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const TIME_FORMAT: &str = "%H:%M:%S";

pub fn register(registry: &mut Registry) {
    registry.register_with_arity("date", Arity::Exact(1), date);
    registry.register_with_arity("datetime", Arity::Exact(1), datetime);
    registry.register_with_arity("time", Arity::Exact(1), time);
    registry.register_with_arity("diffdate", Arity::Exact(2), difference);
    registry.register_with_arity("difftime", Arity::Exact(2), difference);
}

fn invalid(call: &CallContext<'_>, input: &str, format: &str, err: chrono::ParseError) -> EvalError {
    EvalError::invalid_argument(
        call.function(),
        format!("cannot parse '{}' as {}: {}", input, format, err),
    )
}

/// `date("YYYY-MM-DD")`, midnight of that day.
fn date(call: &CallContext<'_>, args: Vec<Value>) -> Result<Value, EvalError> {
    let input = string(call.function(), &args[0])?;
    let day = NaiveDate::parse_from_str(input, DATE_FORMAT)
        .map_err(|e| invalid(call, input, DATE_FORMAT, e))?;
    Ok(Value::Time(day.and_time(NaiveTime::default()).and_utc()))
}

/// `datetime("YYYY-MM-DD HH:MM:SS")`
fn datetime(call: &CallContext<'_>, args: Vec<Value>) -> Result<Value, EvalError> {
    let input = string(call.function(), &args[0])?;
    let moment = NaiveDateTime::parse_from_str(input, DATETIME_FORMAT)
        .map_err(|e| invalid(call, input, DATETIME_FORMAT, e))?;
    Ok(Value::Time(moment.and_utc()))
}

/// `time("HH:MM:SS")`, placed on 0000-01-01 so that times compare and
/// subtract among themselves.
fn time(call: &CallContext<'_>, args: Vec<Value>) -> Result<Value, EvalError> {
    let input = string(call.function(), &args[0])?;
    let clock = NaiveTime::parse_from_str(input, TIME_FORMAT)
        .map_err(|e| invalid(call, input, TIME_FORMAT, e))?;
    let epoch = NaiveDate::from_ymd_opt(0, 1, 1)
        .ok_or_else(|| EvalError::invalid_argument(call.function(), "year 0 out of range"))?;
    Ok(Value::Time(epoch.and_time(clock).and_utc()))
}

/// Absolute distance between two instants.
fn difference(call: &CallContext<'_>, args: Vec<Value>) -> Result<Value, EvalError> {
    let a = instant(call, &args[0])?;
    let b = instant(call, &args[1])?;
    let delta = a.signed_duration_since(b);
    Ok(Value::Duration(if delta < TimeDelta::zero() {
        -delta
    } else {
        delta
    }))
}

fn instant(call: &CallContext<'_>, value: &Value) -> Result<DateTime<Utc>, EvalError> {
    match value {
        Value::Time(t) => Ok(*t),
        other => Err(expected(call.function(), "a time", other)),
    }
}
