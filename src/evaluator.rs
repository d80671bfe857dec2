use std::sync::Arc;

use log::trace;
use thiserror::Error;

use crate::{
    ast::{BinOp, ElementType, Expr},
    builtins::{Arity, CallContext, Registry},
    context::Context,
    error::Error,
    value::Value,
};

pub mod ops;

/// Errors that can occur while evaluating an expression.
#[derive(Debug, Clone, Error)]
pub enum EvalError {
    /// Operand or argument of the wrong kind
    #[error("Type error: {0}")]
    Type(String),

    /// Variable path that does not resolve in the context
    #[error("Undefined variable '{path}'")]
    Lookup { path: String },

    #[error("Division by zero")]
    DivideByZero,

    #[error("Unknown function '{0}'")]
    UnknownFunction(String),

    #[error("{function} expects {expected} argument(s), got {got}")]
    Arity {
        function: String,
        expected: Arity,
        got: usize,
    },

    #[error("Evaluation cancelled")]
    Cancelled,

    /// Integer result outside the i64 range
    #[error("Integer overflow in '{0}'")]
    Overflow(String),

    /// Well-typed argument with an unacceptable value, such as a malformed date
    #[error("{function}: {message}")]
    InvalidArgument { function: String, message: String },

    /// Failure inside the textual sub-expression of a higher-order builtin
    #[error("Error evaluating expression '{expression}': {error}")]
    Nested {
        expression: String,
        error: Box<Error>,
    },
}

impl EvalError {
    pub fn invalid_argument(function: &str, message: impl Into<String>) -> Self {
        EvalError::InvalidArgument {
            function: function.to_string(),
            message: message.into(),
        }
    }

    /// Wraps a failure of the sub-expression `expression`. Cancellation is
    /// not wrapped so callers can still match on it directly.
    pub fn nested(expression: &str, error: Error) -> Self {
        match error {
            Error::Eval(EvalError::Cancelled) => EvalError::Cancelled,
            error => EvalError::Nested {
                expression: expression.to_string(),
                error: Box::new(error),
            },
        }
    }
}

/// Tree-walking evaluator.
///
/// Holds the builtin registry consulted by call nodes. The registry is
/// frozen once handed over, so one evaluator can be shared across threads
/// and evaluate any number of trees concurrently.
#[derive(Clone)]
pub struct Evaluator {
    registry: Arc<Registry>,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Evaluator")
            .field("registry", &self.registry)
            .finish()
    }
}

impl Evaluator {
    /// Creates an evaluator backed by the standard builtin library.
    pub fn new() -> Self {
        Self::with_registry(Registry::standard())
    }

    pub fn with_registry(registry: Registry) -> Self {
        Evaluator {
            registry: Arc::new(registry),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Lexes, parses and evaluates `source` against `ctx`.
    ///
    /// # Examples
    ///
    /// ```
    /// use condex::{Context, Evaluator, Value};
    ///
    /// let evaluator = Evaluator::new();
    /// let ctx = Context::from_pairs([("price", 30), ("quantity", 4)]);
    ///
    /// let result = evaluator.evaluate("price * quantity >= 100", &ctx).unwrap();
    /// assert_eq!(result, Value::Boolean(true));
    /// ```
    pub fn evaluate(&self, source: &str, ctx: &Context) -> Result<Value, Error> {
        let expr = crate::parse(source)?;
        Ok(self.eval(&expr, ctx)?)
    }

    /// Evaluates a parsed tree against `ctx`.
    ///
    /// The tree is not modified and variable-free trees give the same
    /// result under any context.
    pub fn eval(&self, expr: &Expr, ctx: &Context) -> Result<Value, EvalError> {
        match expr {
            Expr::Integer(n) => Ok(Value::Integer(*n)),
            Expr::Float(n) => Ok(Value::Float(*n)),
            Expr::String(s) => Ok(Value::String(s.clone())),
            Expr::Boolean(b) => Ok(Value::Boolean(*b)),

            Expr::Array {
                element_type,
                elements,
            } => elements
                .iter()
                .map(|element| coerce_element(*element_type, self.eval(element, ctx)?))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),

            Expr::Variable(path) => ctx.resolve(path),

            Expr::UnaryOp { op, operand } => {
                let value = self.eval(operand, ctx)?;
                ops::apply_unary(*op, &value)
            }

            Expr::BinaryOp { op, left, right } if op.is_logical() => {
                self.eval_logical(*op, left, right, ctx)
            }

            Expr::BinaryOp { op, left, right } => {
                let left = self.eval(left, ctx)?;
                let right = self.eval(right, ctx)?;
                ops::apply_binary(*op, &left, &right)
            }

            Expr::Call { name, args } => self.eval_call(name, args, ctx),
        }
    }

    /// `&&` and `||`: the right operand is only evaluated when the left one
    /// does not decide the result.
    fn eval_logical(
        &self,
        op: BinOp,
        left: &Expr,
        right: &Expr,
        ctx: &Context,
    ) -> Result<Value, EvalError> {
        let left = ops::expect_bool(op, &self.eval(left, ctx)?)?;
        let decided = match op {
            BinOp::And => !left,
            _ => left,
        };
        if decided {
            return Ok(Value::Boolean(left));
        }

        let right = ops::expect_bool(op, &self.eval(right, ctx)?)?;
        Ok(Value::Boolean(right))
    }

    fn eval_call(&self, name: &str, args: &[Expr], ctx: &Context) -> Result<Value, EvalError> {
        ctx.check_cancelled()?;

        let function = self
            .registry
            .get(name)
            .ok_or_else(|| EvalError::UnknownFunction(name.to_string()))?;

        let values = args
            .iter()
            .map(|arg| self.eval(arg, ctx))
            .collect::<Result<Vec<_>, _>>()?;

        trace!("call {}({} args)", name, values.len());
        function(&CallContext::new(self, ctx, name), values)
    }
}

/// Applies the element-type hint of an array literal.
fn coerce_element(element_type: ElementType, value: Value) -> Result<Value, EvalError> {
    match (element_type, value) {
        (ElementType::Any, v)
        | (ElementType::Int, v @ Value::Integer(_))
        | (ElementType::Float, v @ Value::Float(_))
        | (ElementType::String, v @ Value::String(_))
        | (ElementType::Bool, v @ Value::Boolean(_)) => Ok(v),
        (ElementType::Float, Value::Integer(n)) => Ok(Value::Float(n as f64)),
        (element_type, v) => Err(EvalError::Type(format!(
            "{}[...] cannot hold a {}",
            element_type,
            v.type_name()
        ))),
    }
}
