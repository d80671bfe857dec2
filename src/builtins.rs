//! # Builtin Functions
//!
//! Call nodes are resolved by name against a [`Registry`]. The registry is
//! an explicit value: [`Registry::new`] starts empty, [`Registry::standard`]
//! carries the library below, and hosts add their own functions with
//! [`Registry::register`] before handing the registry to an
//! [`Evaluator`](crate::Evaluator).
//!
//! ## Library
//!
//! - **[math]** - arithmetic, trigonometry, rounding, and the operator-named
//!   functions (`add`, `shl`, `eq`, ...) used by rendered templates
//! - **[stats]** - `max`, `min`, `mean`, `median`, `mode`, `stddev`,
//!   `variance`, `sum`, `pv`, `fv`
//! - **[arrays]** - `filter`, `map`, `reduce` and other array transforms
//! - **[time]** - date/time parsing and differences
//! - **[text]** - hashing, string predicates, environment lookup
//!
//! ## Writing a builtin
//!
//! A builtin receives its already-evaluated arguments and a [`CallContext`]
//! through which it can read the caller's context or call back into the
//! evaluator.
//!
//! ```
//! use condex::{Context, Evaluator, Value};
//! use condex::builtins::{Arity, Registry};
//!
//! let mut registry = Registry::standard();
//! registry.register_with_arity("twice", Arity::Exact(1), |call, args| {
//!     call.invoke("mul", vec![args[0].clone(), Value::Integer(2)])
//! });
//!
//! let evaluator = Evaluator::with_registry(registry);
//! let result = evaluator.evaluate("twice(21)", &Context::new()).unwrap();
//! assert_eq!(result, Value::Integer(42));
//! ```

use std::{collections::HashMap, fmt, sync::Arc};

use crate::{
    ast::Expr,
    context::Context,
    evaluator::{EvalError, Evaluator},
    value::Value,
};

pub mod arrays;
pub mod math;
pub mod stats;
pub mod text;
pub mod time;

/// A registered function.
pub type BuiltinFn =
    Arc<dyn Fn(&CallContext<'_>, Vec<Value>) -> Result<Value, EvalError> + Send + Sync>;

/// Accepted argument counts for a builtin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly n arguments
    Exact(usize),
    /// At least n arguments
    AtLeast(usize),
    /// Between min and max arguments (inclusive)
    Between(usize, usize),
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exact(n) => count == n,
            Arity::AtLeast(n) => count >= n,
            Arity::Between(min, max) => (min..=max).contains(&count),
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "exactly {}", n),
            Arity::AtLeast(n) => write!(f, "at least {}", n),
            Arity::Between(min, max) => write!(f, "{} to {}", min, max),
        }
    }
}

/// Fails with [`EvalError::Arity`] unless `args` fits `arity`.
pub fn check_arity(function: &str, arity: Arity, args: &[Value]) -> Result<(), EvalError> {
    if arity.accepts(args.len()) {
        Ok(())
    } else {
        Err(EvalError::Arity {
            function: function.to_string(),
            expected: arity,
            got: args.len(),
        })
    }
}

/// Name to function mapping consulted by call nodes.
#[derive(Clone, Default)]
pub struct Registry {
    functions: HashMap<String, BuiltinFn>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the full standard library.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        math::register(&mut registry);
        stats::register(&mut registry);
        arrays::register(&mut registry);
        time::register(&mut registry);
        text::register(&mut registry);
        registry
    }

    /// Adds or replaces `name`. The function checks its own arguments.
    pub fn register<F>(&mut self, name: impl Into<String>, function: F) -> &mut Self
    where
        F: Fn(&CallContext<'_>, Vec<Value>) -> Result<Value, EvalError> + Send + Sync + 'static,
    {
        self.functions.insert(name.into(), Arc::new(function));
        self
    }

    /// Adds or replaces `name`, rejecting calls whose argument count does not
    /// fit `arity` before `function` runs.
    pub fn register_with_arity<F>(
        &mut self,
        name: impl Into<String>,
        arity: Arity,
        function: F,
    ) -> &mut Self
    where
        F: Fn(&CallContext<'_>, Vec<Value>) -> Result<Value, EvalError> + Send + Sync + 'static,
    {
        self.register(name, move |call, args| {
            check_arity(call.function(), arity, &args)?;
            function(call, args)
        })
    }

    pub fn get(&self, name: &str) -> Option<&BuiltinFn> {
        self.functions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

/// What a builtin sees of the call that invoked it.
pub struct CallContext<'a> {
    evaluator: &'a Evaluator,
    context: &'a Context,
    function: &'a str,
}

impl<'a> CallContext<'a> {
    pub(crate) fn new(evaluator: &'a Evaluator, context: &'a Context, function: &'a str) -> Self {
        CallContext {
            evaluator,
            context,
            function,
        }
    }

    /// The context the call was evaluated in.
    pub fn context(&self) -> &Context {
        self.context
    }

    /// Name under which the running function was called.
    pub fn function(&self) -> &str {
        self.function
    }

    /// Calls another registered function with already-evaluated arguments.
    pub fn invoke(&self, name: &str, args: Vec<Value>) -> Result<Value, EvalError> {
        self.context.check_cancelled()?;
        let function = self
            .evaluator
            .registry()
            .get(name)
            .ok_or_else(|| EvalError::UnknownFunction(name.to_string()))?;
        function(&CallContext::new(self.evaluator, self.context, name), args)
    }

    /// Runs the whole pipeline on `source` against `ctx`, typically a
    /// context derived from [`CallContext::context`].
    ///
    /// Failures come back as [`EvalError::Nested`] carrying `source`;
    /// cancellation is passed through unwrapped.
    pub fn evaluate(&self, source: &str, ctx: &Context) -> Result<Value, EvalError> {
        self.evaluator
            .evaluate(source, ctx)
            .map_err(|error| EvalError::nested(source, error))
    }

    /// Parses `source` once for repeated evaluation with [`CallContext::eval`].
    pub fn parse(&self, source: &str) -> Result<Expr, EvalError> {
        crate::parse(source).map_err(|error| EvalError::nested(source, error.into()))
    }

    /// Evaluates a tree obtained from [`CallContext::parse`]; `source` labels
    /// nested errors.
    pub fn eval(&self, source: &str, expr: &Expr, ctx: &Context) -> Result<Value, EvalError> {
        self.evaluator
            .eval(expr, ctx)
            .map_err(|error| EvalError::nested(source, error.into()))
    }
}

/// Numeric argument as a float.
pub(crate) fn number(function: &str, value: &Value) -> Result<f64, EvalError> {
    value.as_float().ok_or_else(|| expected(function, "a number", value))
}

pub(crate) fn string<'v>(function: &str, value: &'v Value) -> Result<&'v str, EvalError> {
    value.as_str().ok_or_else(|| expected(function, "a string", value))
}

pub(crate) fn integer(function: &str, value: &Value) -> Result<i64, EvalError> {
    match value {
        Value::Integer(n) => Ok(*n),
        other => Err(expected(function, "an integer", other)),
    }
}

pub(crate) fn array<'v>(function: &str, value: &'v Value) -> Result<&'v [Value], EvalError> {
    value.as_array().ok_or_else(|| expected(function, "an array", value))
}

pub(crate) fn expected(function: &str, what: &str, got: &Value) -> EvalError {
    EvalError::Type(format!(
        "{} expects {}, got {}",
        function,
        what,
        got.type_name()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arity_accepts() {
        assert!(Arity::Exact(2).accepts(2));
        assert!(!Arity::Exact(2).accepts(3));
        assert!(Arity::AtLeast(1).accepts(10));
        assert!(!Arity::AtLeast(1).accepts(0));
        assert!(Arity::Between(2, 3).accepts(3));
        assert!(!Arity::Between(2, 3).accepts(4));
    }

    #[test]
    fn arity_errors_name_the_function() {
        let err = check_arity("sqrt", Arity::Exact(1), &[]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "sqrt expects exactly 1 argument(s), got 0"
        );
    }

    #[test]
    fn registries_are_independent() {
        let mut custom = Registry::new();
        custom.register("answer", |_, _| Ok(Value::Integer(42)));

        assert!(custom.contains("answer"));
        assert!(!custom.contains("add"));
        assert!(!Registry::standard().contains("answer"));
        assert_eq!(custom.names(), vec!["answer"]);
    }
}
