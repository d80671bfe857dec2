use std::{cmp::Ordering, collections::HashMap, fmt};

use chrono::{DateTime, TimeDelta, Utc};

/// A runtime value produced by evaluation or supplied through a context.
///
/// Integers and floats are kept apart: integer arithmetic stays integral
/// and only mixes with floats through [`promote`].
///
/// # Examples
///
/// ```
/// use condex::Value;
/// use std::collections::HashMap;
///
/// let integer = Value::Integer(42);
/// let float = Value::Float(5.25);
/// let string = Value::from("hello");
///
/// let mut obj = HashMap::new();
/// obj.insert("baz".to_string(), Value::Integer(5));
/// let object = Value::Object(obj);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent value; only enters through host data
    Null,

    Boolean(bool),

    Integer(i64),

    Float(f64),

    String(String),

    /// Point in time, always UTC
    Time(DateTime<Utc>),

    /// Signed span of time
    Duration(TimeDelta),

    Array(Vec<Value>),

    /// String-keyed mapping, walked by dotted variable paths
    Object(HashMap<String, Value>),
}

/// Result of bringing two numeric operands to a common representation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Numeric {
    /// Both operands were integers
    Integers(i64, i64),
    /// At least one operand was a float; both are now floats
    Floats(f64, f64),
}

/// Converts an integral float to an i64, or `None` when it has no i64
/// equivalent.
pub fn float_to_int(x: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, which is itself out of range
    if x.is_finite() && x >= i64::MIN as f64 && x < i64::MAX as f64 {
        Some(x as i64)
    } else {
        None
    }
}

/// The numeric promotion rule shared by every operator and arithmetic builtin.
///
/// Int with Int stays integral, any Float promotes both sides to Float.
/// Returns `None` when either side is not a number.
pub fn promote(left: &Value, right: &Value) -> Option<Numeric> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => Some(Numeric::Integers(*a, *b)),
        (Value::Integer(a), Value::Float(b)) => Some(Numeric::Floats(*a as f64, *b)),
        (Value::Float(a), Value::Integer(b)) => Some(Numeric::Floats(*a, *b as f64)),
        (Value::Float(a), Value::Float(b)) => Some(Numeric::Floats(*a, *b)),
        _ => None,
    }
}

/// Returns a human-readable type name for a Value
pub fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Boolean(_) => "boolean",
        Value::Integer(_) => "integer",
        Value::Float(_) => "float",
        Value::String(_) => "string",
        Value::Time(_) => "time",
        Value::Duration(_) => "duration",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        type_name(self)
    }

    /// Get as float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Get as integer, truncating floats toward zero.
    ///
    /// Floats with no i64 equivalent after truncation (NaN, infinities,
    /// magnitudes of 2^63 and beyond) give `None`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            Value::Float(n) => float_to_int(n.trunc()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Float(_))
    }

    /// Equality used by `==` and `!=`.
    ///
    /// Integers and floats compare by numeric value; values of unrelated
    /// kinds are simply unequal.
    pub fn loose_eq(&self, other: &Value) -> bool {
        if let Some(numeric) = promote(self, other) {
            return match numeric {
                Numeric::Integers(a, b) => a == b,
                Numeric::Floats(a, b) => a == b,
            };
        }

        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Time(a), Value::Time(b)) => a == b,
            (Value::Duration(a), Value::Duration(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.loose_eq(y))
            }
            (Value::Object(a), Value::Object(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.get(k).is_some_and(|w| v.loose_eq(w)))
            }
            _ => false,
        }
    }

    /// Ordering used by `<`, `<=`, `>`, `>=`.
    ///
    /// Defined for numbers (across Int/Float), strings, times and durations.
    /// `None` means the pair cannot be ordered.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        if let Some(numeric) = promote(self, other) {
            return match numeric {
                Numeric::Integers(a, b) => Some(a.cmp(&b)),
                Numeric::Floats(a, b) => a.partial_cmp(&b),
            };
        }

        match (self, other) {
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Time(a), Value::Time(b)) => Some(a.cmp(b)),
            (Value::Duration(a), Value::Duration(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::String(s) => f.write_str(s),
            Value::Time(t) => write!(f, "{}", t),
            Value::Duration(d) => write!(f, "{}", d),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Object(map) => {
                let mut keys: Vec<&String> = map.keys().collect();
                keys.sort();
                f.write_str("{")?;
                for (i, key) in keys.into_iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", key, map[key])?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n.into())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Value::Time(t)
    }
}

impl From<TimeDelta> for Value {
    fn from(d: TimeDelta) -> Self {
        Value::Duration(d)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

impl From<HashMap<String, Value>> for Value {
    fn from(map: HashMap<String, Value>) -> Self {
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn promotion_keeps_integers_integral() {
        assert_eq!(
            promote(&Value::Integer(5), &Value::Integer(2)),
            Some(Numeric::Integers(5, 2))
        );
        assert_eq!(
            promote(&Value::Integer(5), &Value::Float(2.5)),
            Some(Numeric::Floats(5.0, 2.5))
        );
        assert_eq!(promote(&Value::from("5"), &Value::Integer(2)), None);
    }

    #[test]
    fn loose_equality_across_numeric_kinds() {
        assert!(Value::Integer(5).loose_eq(&Value::Float(5.0)));
        assert!(!Value::Integer(5).loose_eq(&Value::from("5")));
        assert!(Value::from(vec![1, 2]).loose_eq(&Value::from(vec![1.0, 2.0])));
        assert!(!Value::from(vec![1, 2]).loose_eq(&Value::from(vec![1])));
    }

    #[test]
    fn ordering_is_kind_restricted() {
        assert_eq!(
            Value::Integer(2).compare(&Value::Float(2.5)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Value::from("b").compare(&Value::from("a")),
            Some(Ordering::Greater)
        );
        assert_eq!(Value::Boolean(true).compare(&Value::Boolean(false)), None);
        assert_eq!(Value::Integer(1).compare(&Value::from("1")), None);
    }

    #[test]
    fn as_int_truncates_toward_zero() {
        assert_eq!(Value::Float(2.9).as_int(), Some(2));
        assert_eq!(Value::Float(-2.9).as_int(), Some(-2));
        assert_eq!(Value::Float(f64::NAN).as_int(), None);
        assert_eq!(Value::Float(1e19).as_int(), None);
        assert_eq!(Value::Float(-1e300).as_int(), None);
    }

    #[test]
    fn float_to_int_bounds() {
        assert_eq!(float_to_int(6.0), Some(6));
        assert_eq!(float_to_int(-2.0), Some(-2));
        assert_eq!(float_to_int(i64::MIN as f64), Some(i64::MIN));
        assert_eq!(float_to_int(i64::MAX as f64), None);
        assert_eq!(float_to_int(f64::INFINITY), None);
        assert_eq!(float_to_int(f64::NAN), None);
    }

    #[test]
    fn display_sorts_object_keys() {
        let mut map = HashMap::new();
        map.insert("b".to_string(), Value::Integer(2));
        map.insert("a".to_string(), Value::from(vec![1, 2]));
        assert_eq!(Value::Object(map).to_string(), "{a: [1, 2], b: 2}");
    }
}
