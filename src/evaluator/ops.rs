//! Operator semantics over already-evaluated operands.
//!
//! The evaluator calls into this module for every binary and unary node, and
//! the operator-named builtins (`add`, `divint`, `shl`, `eq`, ...) call the
//! same functions, so both paths agree on promotion and error behavior.

use std::cmp::Ordering;

use crate::{
    ast::{BinOp, UnaryOp},
    evaluator::EvalError,
    value::{Numeric, Value, float_to_int, promote},
};

/// Applies a binary operator to two values.
///
/// `&&` and `||` are accepted here with both operands already evaluated;
/// the evaluator short-circuits before reaching this point.
pub fn apply_binary(op: BinOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    match op {
        BinOp::Add => add(left, right),
        BinOp::Subtract => subtract(left, right),
        BinOp::Multiply => multiply(left, right),
        BinOp::Divide => divide(left, right),
        BinOp::Modulo => modulo(left, right),
        BinOp::FloorDivide => floor_divide(left, right),
        BinOp::Power => power(left, right),
        BinOp::ShiftLeft | BinOp::ShiftRight => shift(op, left, right),
        BinOp::Equal => Ok(Value::Boolean(left.loose_eq(right))),
        BinOp::NotEqual => Ok(Value::Boolean(!left.loose_eq(right))),
        BinOp::LessThan | BinOp::LessEqual | BinOp::GreaterThan | BinOp::GreaterEqual => {
            compare(op, left, right)
        }
        BinOp::And | BinOp::Or => {
            let l = expect_bool(op, left)?;
            let r = expect_bool(op, right)?;
            Ok(Value::Boolean(if op == BinOp::And { l && r } else { l || r }))
        }
    }
}

pub fn apply_unary(op: UnaryOp, operand: &Value) -> Result<Value, EvalError> {
    match (op, operand) {
        (UnaryOp::Neg, Value::Integer(n)) => n
            .checked_neg()
            .map(Value::Integer)
            .ok_or_else(|| overflow("-")),
        (UnaryOp::Neg, Value::Float(n)) => Ok(Value::Float(-n)),
        (UnaryOp::Neg, Value::Duration(d)) => Ok(Value::Duration(-*d)),
        (UnaryOp::Not, Value::Boolean(b)) => Ok(Value::Boolean(!b)),
        (op, v) => Err(EvalError::Type(format!(
            "Cannot apply '{}' to {}",
            op,
            v.type_name()
        ))),
    }
}

/// Requires a boolean operand for a logical operator.
pub fn expect_bool(op: BinOp, value: &Value) -> Result<bool, EvalError> {
    value.as_bool().ok_or_else(|| {
        EvalError::Type(format!(
            "'{}' requires boolean operands, got {}",
            op.symbol(),
            value.type_name()
        ))
    })
}

fn overflow(op: &str) -> EvalError {
    EvalError::Overflow(op.to_string())
}

fn mismatch(verb: &str, left: &Value, right: &Value) -> EvalError {
    EvalError::Type(format!(
        "Cannot {} {} and {}",
        verb,
        left.type_name(),
        right.type_name()
    ))
}

fn add(left: &Value, right: &Value) -> Result<Value, EvalError> {
    if let Some(numeric) = promote(left, right) {
        return match numeric {
            Numeric::Integers(a, b) => a
                .checked_add(b)
                .map(Value::Integer)
                .ok_or_else(|| overflow("+")),
            Numeric::Floats(a, b) => Ok(Value::Float(a + b)),
        };
    }

    match (left, right) {
        (Value::String(a), Value::String(b)) => Ok(Value::String(format!("{}{}", a, b))),
        (Value::Time(t), Value::Duration(d)) | (Value::Duration(d), Value::Time(t)) => t
            .checked_add_signed(*d)
            .map(Value::Time)
            .ok_or_else(|| overflow("+")),
        (Value::Duration(a), Value::Duration(b)) => a
            .checked_add(b)
            .map(Value::Duration)
            .ok_or_else(|| overflow("+")),
        (a, b) => Err(mismatch("add", a, b)),
    }
}

fn subtract(left: &Value, right: &Value) -> Result<Value, EvalError> {
    if let Some(numeric) = promote(left, right) {
        return match numeric {
            Numeric::Integers(a, b) => a
                .checked_sub(b)
                .map(Value::Integer)
                .ok_or_else(|| overflow("-")),
            Numeric::Floats(a, b) => Ok(Value::Float(a - b)),
        };
    }

    match (left, right) {
        (Value::Time(a), Value::Time(b)) => Ok(Value::Duration(a.signed_duration_since(*b))),
        (Value::Time(t), Value::Duration(d)) => t
            .checked_sub_signed(*d)
            .map(Value::Time)
            .ok_or_else(|| overflow("-")),
        (Value::Duration(a), Value::Duration(b)) => a
            .checked_sub(b)
            .map(Value::Duration)
            .ok_or_else(|| overflow("-")),
        (a, b) => Err(EvalError::Type(format!(
            "Cannot subtract {} from {}",
            b.type_name(),
            a.type_name()
        ))),
    }
}

fn multiply(left: &Value, right: &Value) -> Result<Value, EvalError> {
    match promote(left, right) {
        Some(Numeric::Integers(a, b)) => a
            .checked_mul(b)
            .map(Value::Integer)
            .ok_or_else(|| overflow("*")),
        Some(Numeric::Floats(a, b)) => Ok(Value::Float(a * b)),
        None => Err(mismatch("multiply", left, right)),
    }
}

fn divide(left: &Value, right: &Value) -> Result<Value, EvalError> {
    match promote(left, right) {
        Some(Numeric::Integers(_, 0)) => Err(EvalError::DivideByZero),
        // Int over Int truncates toward zero
        Some(Numeric::Integers(a, b)) => a
            .checked_div(b)
            .map(Value::Integer)
            .ok_or_else(|| overflow("/")),
        Some(Numeric::Floats(_, b)) if b == 0.0 => Err(EvalError::DivideByZero),
        Some(Numeric::Floats(a, b)) => Ok(Value::Float(a / b)),
        None => Err(mismatch("divide", left, right)),
    }
}

/// Truncates both operands to integers, as `%`, `//` and the shifts require.
fn integer_operands(
    op: BinOp,
    verb: &str,
    left: &Value,
    right: &Value,
) -> Result<(i64, i64), EvalError> {
    match (integer_operand(op, left)?, integer_operand(op, right)?) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(mismatch(verb, left, right)),
    }
}

/// `None` for non-numbers; floats outside the i64 range overflow.
fn integer_operand(op: BinOp, value: &Value) -> Result<Option<i64>, EvalError> {
    match value {
        Value::Float(x) if x.is_nan() => Err(EvalError::Type(format!(
            "Cannot use NaN as an operand of '{}'",
            op.symbol()
        ))),
        Value::Float(x) => float_to_int(x.trunc())
            .map(Some)
            .ok_or_else(|| overflow(op.symbol())),
        other => Ok(other.as_int()),
    }
}

fn modulo(left: &Value, right: &Value) -> Result<Value, EvalError> {
    let (a, b) = integer_operands(BinOp::Modulo, "take the remainder of", left, right)?;
    if b == 0 {
        return Err(EvalError::DivideByZero);
    }
    a.checked_rem(b)
        .map(Value::Integer)
        .ok_or_else(|| overflow("%"))
}

fn floor_divide(left: &Value, right: &Value) -> Result<Value, EvalError> {
    let (a, b) = integer_operands(BinOp::FloorDivide, "divide", left, right)?;
    if b == 0 {
        return Err(EvalError::DivideByZero);
    }
    a.checked_div(b)
        .map(Value::Integer)
        .ok_or_else(|| overflow("//"))
}

fn power(left: &Value, right: &Value) -> Result<Value, EvalError> {
    match (left.as_float(), right.as_float()) {
        (Some(base), Some(exponent)) => Ok(Value::Float(base.powf(exponent))),
        _ => Err(EvalError::Type(format!(
            "Cannot raise {} to the power of {}",
            left.type_name(),
            right.type_name()
        ))),
    }
}

fn shift(op: BinOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    let (value, amount) = integer_operands(op, "shift", left, right)?;
    if amount < 0 {
        return Err(EvalError::Type(format!(
            "Shift amount must not be negative, got {}",
            amount
        )));
    }

    let shifted = match (op, u32::try_from(amount)) {
        (BinOp::ShiftLeft, Ok(n)) if n < i64::BITS => value << n,
        (BinOp::ShiftLeft, _) => 0,
        (_, Ok(n)) if n < i64::BITS => value >> n,
        // Saturates to the sign bit
        (_, _) => {
            if value < 0 {
                -1
            } else {
                0
            }
        }
    };
    Ok(Value::Integer(shifted))
}

fn compare(op: BinOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    let ordering = left.compare(right).ok_or_else(|| {
        EvalError::Type(format!(
            "Cannot compare {} {} {}",
            left.type_name(),
            op.symbol(),
            right.type_name()
        ))
    })?;

    let result = match op {
        BinOp::LessThan => ordering == Ordering::Less,
        BinOp::LessEqual => ordering != Ordering::Greater,
        BinOp::GreaterThan => ordering == Ordering::Greater,
        _ => ordering != Ordering::Less,
    };
    Ok(Value::Boolean(result))
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, TimeZone, Utc};

    use super::*;

    fn bin(op: BinOp, l: impl Into<Value>, r: impl Into<Value>) -> Result<Value, EvalError> {
        apply_binary(op, &l.into(), &r.into())
    }

    #[test]
    fn integer_arithmetic_stays_integral() {
        assert_eq!(bin(BinOp::Add, 2, 3).unwrap(), Value::Integer(5));
        assert_eq!(bin(BinOp::Divide, 5, 2).unwrap(), Value::Integer(2));
        assert_eq!(bin(BinOp::Divide, -7, 2).unwrap(), Value::Integer(-3));
        assert_eq!(bin(BinOp::Modulo, 5, 2).unwrap(), Value::Integer(1));
        assert_eq!(bin(BinOp::FloorDivide, 5, 2).unwrap(), Value::Integer(2));
    }

    #[test]
    fn mixed_arithmetic_promotes_to_float() {
        assert_eq!(bin(BinOp::Add, 2, 0.5).unwrap(), Value::Float(2.5));
        assert_eq!(bin(BinOp::Divide, 5.0, 2).unwrap(), Value::Float(2.5));
        // `%` and `//` truncate first
        assert_eq!(bin(BinOp::Modulo, 5.9, 2).unwrap(), Value::Integer(1));
        assert_eq!(bin(BinOp::FloorDivide, 5, 4.0).unwrap(), Value::Integer(1));
        assert_eq!(bin(BinOp::Power, 2, 3).unwrap(), Value::Float(8.0));
    }

    #[test]
    fn zero_divisors_are_errors() {
        for op in [BinOp::Divide, BinOp::Modulo, BinOp::FloorDivide] {
            assert!(matches!(bin(op, 1, 0), Err(EvalError::DivideByZero)));
        }
        assert!(matches!(
            bin(BinOp::Divide, 1.5, 0.0),
            Err(EvalError::DivideByZero)
        ));
        // 0.5 truncates to a zero divisor
        assert!(matches!(
            bin(BinOp::Modulo, 3, 0.5),
            Err(EvalError::DivideByZero)
        ));
    }

    #[test]
    fn overflow_is_reported() {
        assert!(matches!(
            bin(BinOp::Add, i64::MAX, 1),
            Err(EvalError::Overflow(_))
        ));
        assert!(matches!(
            bin(BinOp::Divide, i64::MIN, -1),
            Err(EvalError::Overflow(_))
        ));
        assert!(matches!(
            apply_unary(UnaryOp::Neg, &Value::Integer(i64::MIN)),
            Err(EvalError::Overflow(_))
        ));
    }

    #[test]
    fn shifts() {
        assert_eq!(bin(BinOp::ShiftLeft, 1, 2).unwrap(), Value::Integer(4));
        assert_eq!(bin(BinOp::ShiftRight, 4, 2).unwrap(), Value::Integer(1));
        assert_eq!(bin(BinOp::ShiftLeft, 1.9, 2).unwrap(), Value::Integer(4));
        assert_eq!(bin(BinOp::ShiftLeft, 1, 64).unwrap(), Value::Integer(0));
        assert_eq!(bin(BinOp::ShiftRight, -8, 100).unwrap(), Value::Integer(-1));
        assert!(matches!(
            bin(BinOp::ShiftLeft, 1, -1),
            Err(EvalError::Type(_))
        ));
    }

    #[test]
    fn integer_operators_reject_unrepresentable_floats() {
        let test_cases = vec![
            (BinOp::FloorDivide, Value::Float(1e19), Value::Integer(1)),
            (BinOp::Modulo, Value::Float(1e300), Value::Integer(7)),
            (BinOp::ShiftRight, Value::Float(-1e300), Value::Integer(1)),
            (BinOp::ShiftLeft, Value::Integer(1), Value::Float(f64::INFINITY)),
            (BinOp::Modulo, Value::Integer(5), Value::Float(9.3e18)),
        ];

        for (op, left, right) in test_cases {
            let result = apply_binary(op, &left, &right);
            assert!(
                matches!(result, Err(EvalError::Overflow(_))),
                "Failed for input: {} {} {}",
                left,
                op.symbol(),
                right
            );
        }

        // NaN is not a zero divisor
        assert!(matches!(
            bin(BinOp::Modulo, 5, f64::NAN),
            Err(EvalError::Type(_))
        ));
        assert!(matches!(
            bin(BinOp::FloorDivide, f64::NAN, 2),
            Err(EvalError::Type(_))
        ));

        // Floats just below 2^63 still fit
        assert_eq!(
            bin(BinOp::FloorDivide, 9.2e18, 1).unwrap(),
            Value::Integer(9_200_000_000_000_000_000)
        );
    }

    #[test]
    fn string_concatenation_only_with_strings() {
        assert_eq!(bin(BinOp::Add, "ab", "cd").unwrap(), Value::from("abcd"));
        assert!(matches!(bin(BinOp::Add, "ab", 1), Err(EvalError::Type(_))));
        assert!(matches!(
            bin(BinOp::Multiply, "ab", 2),
            Err(EvalError::Type(_))
        ));
    }

    #[test]
    fn time_arithmetic() {
        let a = Utc.with_ymd_and_hms(2016, 1, 1, 0, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2016, 1, 2, 0, 0, 0).unwrap();
        let day = TimeDelta::days(1);

        assert_eq!(bin(BinOp::Subtract, b, a).unwrap(), Value::Duration(day));
        assert_eq!(bin(BinOp::Add, a, day).unwrap(), Value::Time(b));
        assert_eq!(bin(BinOp::Subtract, b, day).unwrap(), Value::Time(a));
        assert_eq!(bin(BinOp::LessThan, a, b).unwrap(), Value::Boolean(true));
    }

    #[test]
    fn comparisons() {
        assert_eq!(bin(BinOp::Equal, 5, 5.0).unwrap(), Value::Boolean(true));
        assert_eq!(bin(BinOp::NotEqual, 5, "5").unwrap(), Value::Boolean(true));
        assert_eq!(bin(BinOp::GreaterEqual, 2, 2).unwrap(), Value::Boolean(true));
        assert_eq!(bin(BinOp::LessThan, "a", "b").unwrap(), Value::Boolean(true));
        assert!(matches!(
            bin(BinOp::LessThan, true, false),
            Err(EvalError::Type(_))
        ));
        assert!(matches!(bin(BinOp::LessThan, 1, "1"), Err(EvalError::Type(_))));
    }

    #[test]
    fn logical_operators_require_booleans() {
        assert_eq!(bin(BinOp::And, true, false).unwrap(), Value::Boolean(false));
        assert_eq!(bin(BinOp::Or, true, false).unwrap(), Value::Boolean(true));
        assert!(matches!(bin(BinOp::And, 1, true), Err(EvalError::Type(_))));
        assert!(matches!(
            apply_unary(UnaryOp::Not, &Value::Integer(1)),
            Err(EvalError::Type(_))
        ));
    }
}
