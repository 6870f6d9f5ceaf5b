//! LSON runtime - evaluator and read loop
//!
//! This crate provides the execution side of LSON:
//! - Tree-walking evaluator with special forms and macro expansion
//! - Parameter destructuring
//! - Builtin primitives
//! - Bootstrap programs (`defun`, `not`) written in LSON itself
//! - A request/response session used by the REPL

pub mod binder;
pub mod bootstrap;
pub mod builtins;
pub mod interpreter;
pub mod options;
pub mod session;

// Re-export evaluator types
pub use interpreter::Evaluator;
pub use options::{DEFAULT_MAX_DEPTH, EvalOptions};
pub use session::{RequestError, Session, render_error};
