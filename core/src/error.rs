//! Error types for evaluation and for the JSON codec.
//!
//! Every failure raised by the evaluator is an [`EvalError`]: a categorised
//! [`ErrorKind`] plus the trace of forms that were being evaluated when it
//! happened. Errors propagate to the caller unchanged; there is no recovery
//! inside the evaluator.

use std::fmt;

use thiserror::Error;

use crate::language::Value;

/// Longest rendering of a single trace frame before it is truncated.
const MAX_FRAME_LEN: usize = 96;

/// Frames kept per error; outer frames beyond this are only counted.
const MAX_TRACE_FRAMES: usize = 32;

/// Categories of evaluation failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ErrorKind {
    /// A name is bound neither locally nor globally
    #[error("unbound name {0:?}")]
    UnboundName(String),

    /// `def` or `defmacro` of a name that already exists
    #[error("{kind} {name:?} already defined")]
    AlreadyDefined { kind: TableKind, name: String },

    /// Wrong number of arguments to a special form or builtin
    #[error("{0}")]
    ArityError(String),

    /// A value has the wrong shape for the operation
    #[error("type error: {0}")]
    TypeError(String),

    /// A parameter pattern does not match its argument
    #[error("cannot destructure: {0}")]
    DestructureError(String),

    /// Application of something that is not callable
    #[error("not a function {0}")]
    NotAFunction(String),

    /// A builtin reference naming no known primitive
    #[error("undefined builtin {0:?}")]
    UndefinedBuiltin(String),

    /// A mapping was applied to a non-text key
    #[error("invalid key type {0}")]
    InvalidKeyType(String),

    /// Integer overflow or integer division by zero
    #[error("arithmetic error: {0}")]
    ArithmeticError(String),

    /// Evaluation nested deeper than the configured limit
    #[error("expansion too deep: nesting exceeds limit of {limit}")]
    ExpansionTooDeep { limit: usize },
}

/// Which append-only table a definition targeted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Global,
    Macro,
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableKind::Global => write!(f, "name"),
            TableKind::Macro => write!(f, "macro"),
        }
    }
}

/// An evaluation failure with the trace of enclosing forms.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}")]
pub struct EvalError {
    pub kind: ErrorKind,
    /// Rendered forms, innermost first
    pub trace: Vec<String>,
    /// Frames dropped once the trace was full
    pub omitted: usize,
}

impl EvalError {
    pub fn new(kind: ErrorKind) -> Self {
        EvalError {
            kind,
            trace: Vec::new(),
            omitted: 0,
        }
    }

    pub fn unbound(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnboundName(name.into()))
    }

    pub fn arity(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ArityError(message.into()))
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TypeError(message.into()))
    }

    pub fn destructure(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DestructureError(message.into()))
    }

    pub fn not_a_function(value: &Value) -> Self {
        Self::new(ErrorKind::NotAFunction(value.to_string()))
    }

    pub fn arithmetic(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ArithmeticError(message.into()))
    }

    /// Record `form` as the next enclosing frame of the trace.
    pub fn with_frame(mut self, form: &Value) -> Self {
        if self.trace.len() >= MAX_TRACE_FRAMES {
            self.omitted += 1;
            return self;
        }
        let mut rendered = form.to_string();
        if rendered.len() > MAX_FRAME_LEN {
            let mut cut = MAX_FRAME_LEN;
            while !rendered.is_char_boundary(cut) {
                cut -= 1;
            }
            rendered.truncate(cut);
            rendered.push_str("...");
        }
        self.trace.push(rendered);
        self
    }
}

impl From<ErrorKind> for EvalError {
    fn from(kind: ErrorKind) -> Self {
        EvalError::new(kind)
    }
}

/// Failures converting between JSON text and values.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("syntax error: {0}")]
    Syntax(#[from] serde_json::Error),

    #[error("cannot encode non-finite number {0}")]
    NonFiniteNumber(f64),
}

pub type Result<T, E = EvalError> = std::result::Result<T, E>;
