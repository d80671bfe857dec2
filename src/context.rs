//! Variable bindings consulted during evaluation.
//!
//! A [`Context`] is a chain of immutable frames. Deriving a context with
//! [`Context::with_variables`] pushes a new frame that shadows the parent;
//! the parent is shared, never copied or mutated. Higher-order builtins use
//! this to bind loop variables (`x`, `_x`, `_i`) per element.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use crate::{evaluator::EvalError, value::Value};

/// Cooperative cancellation signal shared between a host and an evaluation.
///
/// Cloning yields a handle to the same signal.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Default)]
struct Frame {
    vars: HashMap<String, Value>,
    parent: Option<Arc<Frame>>,
}

#[derive(Debug, Clone, Default)]
pub struct Context {
    frame: Arc<Frame>,
    cancel: CancelToken,
}

impl Context {
    /// An empty context with its own cancellation token.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_variables(vars: HashMap<String, Value>) -> Self {
        Context::new().with_variables(vars)
    }

    /// Builds a context from `(name, value)` pairs.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self::from_variables(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Derives a context whose bindings shadow this one's.
    ///
    /// `self` is left untouched; the derived context shares the parent
    /// frames and the cancellation token.
    pub fn with_variables(&self, vars: HashMap<String, Value>) -> Self {
        Context {
            frame: Arc::new(Frame {
                vars,
                parent: Some(Arc::clone(&self.frame)),
            }),
            cancel: self.cancel.clone(),
        }
    }

    /// Replaces the cancellation token, keeping the bindings.
    pub fn with_cancel_token(&self, cancel: CancelToken) -> Self {
        Context {
            frame: Arc::clone(&self.frame),
            cancel,
        }
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Fails with [`EvalError::Cancelled`] once the token has fired.
    pub fn check_cancelled(&self) -> Result<(), EvalError> {
        if self.cancel.is_cancelled() {
            Err(EvalError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Looks up a top-level name, innermost frame first.
    pub fn get(&self, name: &str) -> Option<&Value> {
        let mut frame = Some(&self.frame);
        while let Some(current) = frame {
            if let Some(value) = current.vars.get(name) {
                return Some(value);
            }
            frame = current.parent.as_ref();
        }
        None
    }

    /// Resolves a dotted path: the first segment against the context, each
    /// following segment against the object produced so far.
    pub fn resolve(&self, path: &[String]) -> Result<Value, EvalError> {
        let lookup_error = || EvalError::Lookup {
            path: path.join("."),
        };

        let (first, rest) = path.split_first().ok_or_else(lookup_error)?;
        let mut current = self.get(first).ok_or_else(lookup_error)?;

        for segment in rest {
            current = match current {
                Value::Object(map) => map.get(segment).ok_or_else(lookup_error)?,
                _ => return Err(lookup_error()),
            };
        }

        Ok(current.clone())
    }
}
