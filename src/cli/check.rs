//! Evaluate or syntax-check an expression against JSON variables

use super::{CliError, json_to_value, value_to_json};
use crate::{Context, Evaluator, Value};

/// Options for the `eval` and `check` commands
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// The expression to evaluate
    pub expression: String,
    /// JSON object whose members become variables
    pub vars: Option<String>,
    /// Only validate syntax, don't evaluate
    pub syntax_only: bool,
}

/// Result of a check operation
#[derive(Debug)]
pub enum CheckResult {
    /// Syntax validation passed
    SyntaxValid,
    /// Expression evaluated successfully
    Success(serde_json::Value),
}

/// Builds the evaluation context from a JSON object.
pub fn context_from_json(json: &str) -> Result<Context, CliError> {
    match json_to_value(serde_json::from_str(json)?) {
        Value::Object(vars) => Ok(Context::from_variables(vars)),
        other => Err(CliError::InvalidVars(other.type_name())),
    }
}

/// Parse, and unless `syntax_only` is set, evaluate the expression
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    let expr = crate::parse(&options.expression)?;

    if options.syntax_only {
        return Ok(CheckResult::SyntaxValid);
    }

    let ctx = match &options.vars {
        Some(json) if !json.trim().is_empty() => context_from_json(json)?,
        _ => Context::new(),
    };

    let result = Evaluator::new().eval(&expr, &ctx)?;
    Ok(CheckResult::Success(value_to_json(result)))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn run(expression: &str, vars: Option<&str>) -> Result<CheckResult, CliError> {
        execute_check(&CheckOptions {
            expression: expression.to_string(),
            vars: vars.map(str::to_string),
            syntax_only: false,
        })
    }

    #[test]
    fn evaluates_against_json_variables() {
        let result = run(
            "foo == (bar.baz + bar.qux.quux)",
            Some(r#"{"foo": 10, "bar": {"baz": 5, "qux": {"quux": 5}}}"#),
        )
        .unwrap();
        assert!(matches!(result, CheckResult::Success(v) if v == json!(true)));
    }

    #[test]
    fn syntax_only_skips_evaluation() {
        let result = execute_check(&CheckOptions {
            expression: "undefined_variable + 1".to_string(),
            vars: None,
            syntax_only: true,
        })
        .unwrap();
        assert!(matches!(result, CheckResult::SyntaxValid));
    }

    #[test]
    fn vars_must_be_an_object() {
        assert!(matches!(
            run("1", Some("[1, 2]")),
            Err(CliError::InvalidVars("array"))
        ));
        assert!(matches!(run("1 +", None), Err(CliError::Parse(_))));
        assert!(matches!(run("nope", None), Err(CliError::Eval(_))));
    }
}
