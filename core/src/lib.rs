//! Core language definition for LSON
//!
//! LSON programs are JSON documents: arrays are forms, objects are mappings,
//! and strings double as identifiers. This crate holds the value model, the
//! environments, the error taxonomy, and the JSON codec. The evaluator lives
//! in the `lson-runtime` crate; it shares [`ensure_sufficient_stack`] with the
//! recursive walks here.

pub mod codec;
pub mod environment;
pub mod error;
pub mod language;
pub mod numeric;
pub mod stack;

// Re-export commonly used items for convenience
pub use codec::{decode, parse, parse_all, to_json_string};
pub use environment::{Binding, Env, Table};
pub use error::{CodecError, ErrorKind, EvalError, Result, TableKind};
pub use language::{Closure, MapValue, Value};
pub use numeric::Number;
pub use stack::ensure_sufficient_stack;
