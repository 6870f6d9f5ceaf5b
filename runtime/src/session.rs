//! One read-eval-print request at a time.
//!
//! A [`Session`] is the recovery boundary: a failed request is reported and
//! discarded, and whatever the evaluator committed before failing stays.

use std::fmt::Write as _;

use lson::{CodecError, EvalError, Value, parse, to_json_string};
use thiserror::Error;

use crate::interpreter::Evaluator;
use crate::options::EvalOptions;

/// Anything that can go wrong with a single request
#[derive(Debug, Error)]
pub enum RequestError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Eval(#[from] EvalError),
}

pub struct Session {
    evaluator: Evaluator,
}

impl Session {
    pub fn new(options: EvalOptions) -> Result<Self, EvalError> {
        Ok(Session {
            evaluator: Evaluator::with_options(options)?,
        })
    }

    pub fn from_evaluator(evaluator: Evaluator) -> Self {
        Session { evaluator }
    }

    pub fn evaluator(&mut self) -> &mut Evaluator {
        &mut self.evaluator
    }

    /// Decode `line`, evaluate it in an empty local environment, encode the result
    pub fn eval_line(&mut self, line: &str) -> Result<String, RequestError> {
        let exp = parse(line)?;
        let value = self.eval_value(&exp)?;
        Ok(to_json_string(&value)?)
    }

    pub fn eval_value(&mut self, exp: &Value) -> Result<Value, RequestError> {
        Ok(self.evaluator.eval_toplevel(exp)?)
    }
}

/// Render a failure as the read loop prints it: the message, then the trace
pub fn render_error(err: &RequestError) -> String {
    let mut out = format!("Error: {err}");
    if let RequestError::Eval(eval_err) = err {
        for frame in &eval_err.trace {
            let _ = write!(out, "\n    in {frame}");
        }
        if eval_err.omitted > 0 {
            let _ = write!(out, "\n    ... {} more", eval_err.omitted);
        }
    }
    out
}
