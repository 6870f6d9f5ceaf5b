use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::environment::Env;
use crate::numeric::Number;
use crate::stack::ensure_sufficient_stack;

// ============================================================================
// Core Type System
// ============================================================================

/// A closure: the literal `fn` form it was created from plus the local
/// environment active at that point.
#[derive(Debug)]
pub struct Closure {
    /// The whole `["fn", params, body...]` form
    pub form: Rc<Vec<Value>>,
    pub env: Env,
}

impl Closure {
    /// The parameter pattern (second element of the form)
    pub fn params(&self) -> &Value {
        self.form.get(1).unwrap_or(&Value::Null)
    }

    /// Body expressions, evaluated in order
    pub fn body(&self) -> &[Value] {
        self.form.get(2..).unwrap_or(&[])
    }
}

pub type MapValue = BTreeMap<String, Value>;

/// Runtime values. Text doubles as identifier when evaluated.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Number(Number),
    Text(Rc<str>),
    Seq(Rc<Vec<Value>>),
    Map(Rc<MapValue>),
    Closure(Rc<Closure>),
    /// Reference to a named primitive
    Builtin(Rc<str>),
}

impl Value {
    pub fn int(n: i64) -> Value {
        Value::Number(Number::Int(n))
    }

    pub fn float(x: f64) -> Value {
        Value::Number(Number::Float(x))
    }

    pub fn text(s: impl AsRef<str>) -> Value {
        Value::Text(Rc::from(s.as_ref()))
    }

    pub fn seq(elements: Vec<Value>) -> Value {
        Value::Seq(Rc::new(elements))
    }

    pub fn map(entries: MapValue) -> Value {
        Value::Map(Rc::new(entries))
    }

    pub fn builtin(name: impl AsRef<str>) -> Value {
        Value::Builtin(Rc::from(name.as_ref()))
    }

    pub fn closure(form: Rc<Vec<Value>>, env: Env) -> Value {
        Value::Closure(Rc::new(Closure { form, env }))
    }

    /// Only `false` and `null` are falsy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Null | Value::Bool(false))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(&**s),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::Seq(elements) => Some(elements.as_slice()),
            _ => None,
        }
    }

    /// Short name of the value's shape, for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::Text(_) => "text",
            Value::Seq(_) => "sequence",
            Value::Map(_) => "mapping",
            Value::Closure(_) => "closure",
            Value::Builtin(_) => "builtin",
        }
    }
}

// Structural equality; closures compare by identity
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Seq(a), Value::Seq(b)) => ensure_sufficient_stack(|| a == b),
            (Value::Map(a), Value::Map(b)) => ensure_sufficient_stack(|| a == b),
            (Value::Closure(a), Value::Closure(b)) => Rc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => a == b,
            _ => false,
        }
    }
}

// ============================================================================
// Display Implementation
// ============================================================================

fn write_escaped(f: &mut fmt::Formatter, s: &str) -> fmt::Result {
    write!(f, "\"")?;
    for c in s.chars() {
        match c {
            '"' => write!(f, "\\\"")?,
            '\\' => write!(f, "\\\\")?,
            '\n' => write!(f, "\\n")?,
            '\r' => write!(f, "\\r")?,
            '\t' => write!(f, "\\t")?,
            '\u{8}' => write!(f, "\\b")?,
            '\u{c}' => write!(f, "\\f")?,
            c if (c as u32) < 0x20 => write!(f, "\\u{:04x}", c as u32)?,
            c => write!(f, "{c}")?,
        }
    }
    write!(f, "\"")
}

fn write_seq<'a>(f: &mut fmt::Formatter, items: impl Iterator<Item = &'a Value>) -> fmt::Result {
    write!(f, "[")?;
    for (i, item) in items.enumerate() {
        if i > 0 {
            write!(f, ",")?;
        }
        write!(f, "{item}")?;
    }
    write!(f, "]")
}

fn write_map(f: &mut fmt::Formatter, entries: &MapValue) -> fmt::Result {
    write!(f, "{{")?;
    for (i, (k, v)) in entries.iter().enumerate() {
        if i > 0 {
            write!(f, ",")?;
        }
        write_escaped(f, k)?;
        write!(f, ":{v}")?;
    }
    write!(f, "}}")
}

fn write_closure(f: &mut fmt::Formatter, closure: &Closure) -> fmt::Result {
    write!(f, "[\"closure\",")?;
    write_seq(f, closure.form.iter())?;
    write!(f, ",[")?;
    for (i, (name, value)) in closure.env.bindings().enumerate() {
        if i > 0 {
            write!(f, ",")?;
        }
        write!(f, "[")?;
        write_escaped(f, name)?;
        write!(f, ",{value}]")?;
    }
    write!(f, "]]")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::Text(s) => write_escaped(f, s),
            // Nesting is unbounded, so each level may grow the stack
            Value::Seq(elements) => ensure_sufficient_stack(|| write_seq(f, elements.iter())),
            Value::Map(entries) => ensure_sufficient_stack(|| write_map(f, entries)),
            Value::Closure(closure) => ensure_sufficient_stack(|| write_closure(f, closure)),
            Value::Builtin(name) => {
                write!(f, "[\"builtin\",")?;
                write_escaped(f, name)?;
                write!(f, "]")
            }
        }
    }
}
