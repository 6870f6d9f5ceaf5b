//! Conversion between JSON and [`Value`].
//!
//! Program text is JSON: arrays are forms, objects are mappings, and every
//! other literal maps onto the matching value. Decoding never fails once the
//! text is valid JSON; encoding fails only for non-finite floats.
//!
//! `serde_json` bounds the nesting it will parse. Values built by evaluation
//! can nest far deeper, so encoding walks them with the stack guard instead of
//! going through `serde_json::Value`.

use serde_json::{Number as JsonNumber, Value as Json};

use crate::error::CodecError;
use crate::language::{MapValue, Value};
use crate::numeric::Number;
use crate::stack::ensure_sufficient_stack;

/// Parse JSON text into a value
pub fn parse(input: &str) -> Result<Value, CodecError> {
    let json: Json = serde_json::from_str(input)?;
    Ok(decode(&json))
}

/// Parse a stream of whitespace-separated JSON documents
pub fn parse_all(input: &str) -> impl Iterator<Item = Result<Value, CodecError>> + '_ {
    serde_json::Deserializer::from_str(input)
        .into_iter::<Json>()
        .map(|json| json.map(|json| decode(&json)).map_err(CodecError::from))
}

pub fn decode(json: &Json) -> Value {
    match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => Value::Number(decode_number(n)),
        Json::String(s) => Value::text(s),
        Json::Array(items) => Value::seq(items.iter().map(decode).collect()),
        Json::Object(entries) => Value::map(
            entries
                .iter()
                .map(|(k, v)| (k.clone(), decode(v)))
                .collect::<MapValue>(),
        ),
    }
}

fn decode_number(n: &JsonNumber) -> Number {
    match n.as_i64() {
        Some(i) => Number::Int(i),
        // u64 beyond i64 range and real literals both become floats
        None => Number::Float(n.as_f64().unwrap_or(f64::NAN)),
    }
}

/// Encode a value as compact JSON text. Closures become
/// `["closure", form, bindings]` and builtins `["builtin", name]`; the text is
/// the value's `Display` rendering, which only non-finite floats can make
/// invalid.
pub fn to_json_string(value: &Value) -> Result<String, CodecError> {
    ensure_finite(value)?;
    Ok(value.to_string())
}

fn ensure_finite(value: &Value) -> Result<(), CodecError> {
    match value {
        Value::Number(Number::Float(x)) if !x.is_finite() => Err(CodecError::NonFiniteNumber(*x)),
        Value::Seq(items) => ensure_sufficient_stack(|| items.iter().try_for_each(ensure_finite)),
        Value::Map(entries) => {
            ensure_sufficient_stack(|| entries.values().try_for_each(ensure_finite))
        }
        Value::Closure(closure) => ensure_sufficient_stack(|| {
            closure.form.iter().try_for_each(ensure_finite)?;
            closure
                .env
                .bindings()
                .try_for_each(|(_, bound)| ensure_finite(bound))
        }),
        _ => Ok(()),
    }
}

impl From<Json> for Value {
    fn from(json: Json) -> Self {
        decode(&json)
    }
}
