//! CLI support for condex
//!
//! Provides programmatic access to the `condex` command for embedding in
//! other tools.

mod check;
mod convert;

pub use check::{CheckOptions, CheckResult, context_from_json, execute_check};
pub use convert::{json_to_value, value_to_json};

use std::io;

use thiserror::Error;

use crate::{EvalError, ParseError, Registry};

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Evaluation error: {0}")]
    Eval(#[from] EvalError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Variables were valid JSON but not an object
    #[error("Variables must be a JSON object, got {0}")]
    InvalidVars(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Renders the expression as a template conditional
pub fn render_template(expression: &str) -> Result<String, CliError> {
    Ok(crate::render(expression)?)
}

/// Names of the standard builtins, sorted
pub fn function_names() -> Vec<String> {
    Registry::standard()
        .names()
        .into_iter()
        .map(str::to_string)
        .collect()
}
