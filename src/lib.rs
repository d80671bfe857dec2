//! # condex
//!
//! An embeddable expression language for user-supplied conditions:
//! comparisons, logical and arithmetic operators, dotted variable paths,
//! string and array literals, and calls into a registry of builtins.
//!
//! Source text is lexed and parsed into an [`Expr`], which can then be
//! evaluated against a [`Context`] or rendered as a template conditional.
//!
//! ```
//! use condex::{Context, Value};
//! use std::collections::HashMap;
//!
//! let mut bar = HashMap::new();
//! bar.insert("baz".to_string(), Value::Integer(5));
//! let ctx = Context::from_pairs([("foo", Value::Integer(5)), ("bar", Value::Object(bar))]);
//!
//! assert_eq!(condex::evaluate(&ctx, "foo == bar.baz").unwrap(), Value::Boolean(true));
//! assert_eq!(condex::render("foo == bar.baz").unwrap(), "eq .foo .bar.baz");
//! ```
use std::sync::LazyLock;

pub mod ast;
pub mod builtins;
pub mod cli;
pub mod context;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod parser;
pub mod template;
pub mod value;

pub use ast::{BinOp, ElementType, Expr, Token, UnaryOp};
pub use builtins::{Arity, CallContext, Registry};
pub use context::{CancelToken, Context};
pub use error::Error;
pub use evaluator::{EvalError, Evaluator};
pub use lexer::{LexError, Lexer, Position};
pub use parser::{ParseError, Parser};
pub use value::Value;

static DEFAULT_EVALUATOR: LazyLock<Evaluator> = LazyLock::new(Evaluator::new);

/// Parses a complete expression.
pub fn parse(source: &str) -> Result<Expr, ParseError> {
    Parser::new(Lexer::new(source))?.parse()
}

/// Parses and evaluates `source` with the standard builtins.
///
/// Parse and evaluation failures both come back through [`Error`].
pub fn evaluate(ctx: &Context, source: &str) -> Result<Value, Error> {
    DEFAULT_EVALUATOR.evaluate(source, ctx)
}

/// Parses `source` and renders it as a template conditional.
pub fn render(source: &str) -> Result<String, ParseError> {
    parse(source).map(|expr| template::render(&expr))
}
