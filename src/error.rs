use thiserror::Error;

use crate::{evaluator::EvalError, parser::ParseError};

/// Failure of the composed lex, parse and evaluate pipeline.
#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Eval(#[from] EvalError),
}

impl From<crate::lexer::LexError> for Error {
    fn from(e: crate::lexer::LexError) -> Self {
        Error::Parse(ParseError::Lex(e))
    }
}
