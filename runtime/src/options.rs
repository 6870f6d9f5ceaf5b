//! Configuration options for an evaluator.

/// Default limit on nested `eval` calls.
pub const DEFAULT_MAX_DEPTH: usize = 10_000;

/// Resource limits applied during evaluation.
///
/// # Example
///
/// ```
/// use lson_runtime::{EvalOptions, Evaluator};
///
/// let options = EvalOptions { max_depth: 500 };
/// let evaluator = Evaluator::with_options(options).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct EvalOptions {
    /// Maximum nesting of `eval` calls, macro expansion included.
    /// Exceeding it fails with `ExpansionTooDeep`.
    ///
    /// Default: 10_000
    pub max_depth: usize,
}

impl Default for EvalOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
