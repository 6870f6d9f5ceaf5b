//! Builtin primitives
//!
//! Builtins are referenced by name (`["builtin", name]`) and always receive
//! already-evaluated arguments. `let` is the exception: it is registered in
//! the macro table, so it receives raw forms and returns code.

use std::cmp::Ordering;
use std::io::Write;
use std::rc::Rc;

use lson::{ErrorKind, EvalError, Result, Value};

use crate::interpreter::Evaluator;

/// Builtins bound in the global table, front of the table first
pub const FUNCTIONS: &[&str] = &[
    ">=", ">", "==", "!=", "<", "<=", "+", "-", "*", "/", "list", "p", "globals", "append",
    "conj", "cons",
];

/// Builtins bound in the macro table
pub const MACROS: &[&str] = &["let"];

/// Bind every builtin in a fresh evaluator.
pub fn register(evaluator: &mut Evaluator) -> Result<()> {
    // Tables list newest first, so insert back to front
    for name in FUNCTIONS.iter().rev() {
        evaluator
            .globals_mut()
            .define(Rc::from(*name), Value::builtin(name))?;
    }
    for name in MACROS {
        evaluator
            .macros_mut()
            .define(Rc::from(*name), Value::builtin(name))?;
    }
    Ok(())
}

/// Dispatch a builtin by name.
pub fn call(evaluator: &mut Evaluator, name: &str, args: &[Value]) -> Result<Value> {
    tracing::trace!(builtin = name, argc = args.len(), "call");
    match name {
        "+" | "-" | "*" | "/" => fold_arithmetic(name, args),
        ">=" | ">" | "==" | "!=" | "<" | "<=" => compare_chain(name, args),
        "list" => Ok(Value::seq(args.to_vec())),
        "let" => expand_let(args),
        "p" => debug_print(evaluator.debug_sink(), args),
        "globals" => Ok(Value::seq(
            evaluator
                .globals()
                .names()
                .map(|global| Value::Text(Rc::clone(global)))
                .collect(),
        )),
        "append" => append(args),
        "conj" => conj(args),
        "cons" => cons(args),
        _ => Err(ErrorKind::UndefinedBuiltin(name.to_string()).into()),
    }
}

// ============================================================================
// Arithmetic
// ============================================================================

/// Left fold; no arguments yields null and one argument is returned as is
fn fold_arithmetic(op: &str, args: &[Value]) -> Result<Value> {
    let Some((first, rest)) = args.split_first() else {
        return Ok(Value::Null);
    };
    rest.iter()
        .try_fold(first.clone(), |acc, arg| combine(op, &acc, arg))
}

fn combine(op: &str, a: &Value, b: &Value) -> Result<Value> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let n = match op {
                "+" => x.add(*y)?,
                "-" => x.sub(*y)?,
                "*" => x.mul(*y)?,
                _ => x.div(*y)?,
            };
            Ok(Value::Number(n))
        }
        (Value::Text(x), Value::Text(y)) if op == "+" => Ok(Value::text(format!("{x}{y}"))),
        (Value::Seq(x), Value::Seq(y)) if op == "+" => {
            Ok(Value::seq(x.iter().chain(y.iter()).cloned().collect()))
        }
        _ => Err(EvalError::type_error(format!(
            "{op}: cannot combine {} with {}",
            a.type_name(),
            b.type_name()
        ))),
    }
}

// ============================================================================
// Comparison
// ============================================================================

/// True iff every consecutive pair satisfies the comparator
fn compare_chain(op: &str, args: &[Value]) -> Result<Value> {
    if args.len() < 2 {
        return Err(EvalError::arity(format!(
            "{op}: 2 or more arguments expected"
        )));
    }
    for pair in args.windows(2) {
        if !compare(op, &pair[0], &pair[1])? {
            return Ok(Value::Bool(false));
        }
    }
    Ok(Value::Bool(true))
}

fn compare(op: &str, a: &Value, b: &Value) -> Result<bool> {
    match op {
        "==" => return Ok(a == b),
        "!=" => return Ok(a != b),
        _ => {}
    }

    let ordering = match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.partial_cmp(y),
        (Value::Text(x), Value::Text(y)) => Some(x.cmp(y)),
        _ => {
            return Err(EvalError::type_error(format!(
                "comparison of {} with {} failed",
                a.type_name(),
                b.type_name()
            )));
        }
    };

    // NaN compares false against everything
    let Some(ordering) = ordering else {
        return Ok(false);
    };
    Ok(match op {
        ">=" => ordering != Ordering::Less,
        ">" => ordering == Ordering::Greater,
        "<" => ordering == Ordering::Less,
        _ => ordering != Ordering::Greater,
    })
}

// ============================================================================
// Sequences
// ============================================================================

fn append(args: &[Value]) -> Result<Value> {
    let mut result = Vec::new();
    for arg in args {
        let Value::Seq(elements) = arg else {
            return Err(EvalError::type_error(format!(
                "append expects sequences, got {}",
                arg.type_name()
            )));
        };
        result.extend(elements.iter().cloned());
    }
    Ok(Value::seq(result))
}

fn conj(args: &[Value]) -> Result<Value> {
    let [target, items @ ..] = args else {
        return Err(EvalError::arity("too few arguments"));
    };
    if items.is_empty() {
        return Err(EvalError::arity("too few arguments"));
    }
    let Value::Seq(elements) = target else {
        return Err(EvalError::type_error(format!(
            "conj expects a sequence, got {}",
            target.type_name()
        )));
    };
    let mut result = Vec::with_capacity(elements.len() + items.len());
    result.extend(elements.iter().cloned());
    result.extend(items.iter().cloned());
    Ok(Value::seq(result))
}

fn cons(args: &[Value]) -> Result<Value> {
    let [head, tail] = args else {
        return Err(EvalError::arity("wrong # of arguments"));
    };
    let Value::Seq(elements) = tail else {
        return Err(EvalError::type_error(format!(
            "cons expects a sequence, got {}",
            tail.type_name()
        )));
    };
    let mut result = Vec::with_capacity(elements.len() + 1);
    result.push(head.clone());
    result.extend(elements.iter().cloned());
    Ok(Value::seq(result))
}

// ============================================================================
// Macros and diagnostics
// ============================================================================

/// `["let", [n1, v1, n2, v2...], body...]` becomes `[["fn", [n1, n2...], body...], v1, v2...]`
fn expand_let(args: &[Value]) -> Result<Value> {
    let [pairs, body @ ..] = args else {
        return Err(EvalError::arity("let requires a binding list"));
    };
    let Value::Seq(pairs) = pairs else {
        return Err(EvalError::type_error("let expects a binding list"));
    };
    if pairs.len() % 2 != 0 {
        return Err(EvalError::arity("let expects name/value pairs"));
    }

    let names: Vec<Value> = pairs.iter().step_by(2).cloned().collect();
    let values = pairs.iter().skip(1).step_by(2).cloned();

    let mut fn_form = Vec::with_capacity(body.len() + 2);
    fn_form.push(Value::text("fn"));
    fn_form.push(Value::seq(names));
    fn_form.extend_from_slice(body);

    let mut call = vec![Value::seq(fn_form)];
    call.extend(values);
    Ok(Value::seq(call))
}

/// Write each argument on its own line; pass the input through
fn debug_print(sink: &mut dyn Write, args: &[Value]) -> Result<Value> {
    for arg in args {
        if let Err(e) = writeln!(sink, "{arg}") {
            tracing::warn!(error = %e, "p: failed to write");
        }
    }
    if let Err(e) = sink.flush() {
        tracing::warn!(error = %e, "p: failed to flush");
    }
    Ok(match args {
        [] => Value::Null,
        [single] => single.clone(),
        many => Value::seq(many.to_vec()),
    })
}
