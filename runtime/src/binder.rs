//! Parameter destructuring.
//!
//! A parameter pattern is a sequence whose entries are plain names, nested
//! patterns, or the variadic marker `&` followed by exactly one name that
//! captures every remaining argument.

use std::rc::Rc;

use lson::{Binding, EvalError, Result, Value};

/// Marker introducing the rest parameter
pub const REST_MARKER: &str = "&";

/// Match `params` against `args`, producing bindings in parameter order.
pub fn bind(params: &[Value], args: &[Value]) -> Result<Vec<Binding>> {
    let mut bindings = Vec::with_capacity(params.len());
    bind_into(&mut bindings, params, args)?;
    Ok(bindings)
}

fn bind_into(bindings: &mut Vec<Binding>, params: &[Value], args: &[Value]) -> Result<()> {
    let mut args = args;
    let mut rest = params;

    while let Some((param, remaining)) = rest.split_first() {
        match param {
            Value::Text(name) if &**name == REST_MARKER => {
                return bind_rest(bindings, remaining, args);
            }
            Value::Text(name) => {
                let (arg, others) = args
                    .split_first()
                    .ok_or_else(|| EvalError::arity("too few arguments"))?;
                bindings.push((Rc::clone(name), arg.clone()));
                args = others;
            }
            Value::Seq(pattern) => {
                let (arg, others) = match args.split_first() {
                    Some((Value::Seq(nested), others)) => (nested, others),
                    Some((other, _)) => {
                        return Err(EvalError::destructure(format!(
                            "cannot undestructure a non-sequence value {other}"
                        )));
                    }
                    None => {
                        return Err(EvalError::destructure(
                            "missing argument for nested pattern",
                        ));
                    }
                };
                bind_into(bindings, pattern, arg)?;
                args = others;
            }
            other => {
                return Err(EvalError::destructure(format!(
                    "unsupported parameter {other}"
                )));
            }
        }
        rest = remaining;
    }

    if !args.is_empty() {
        return Err(EvalError::arity("too many arguments"));
    }
    Ok(())
}

fn bind_rest(bindings: &mut Vec<Binding>, names: &[Value], args: &[Value]) -> Result<()> {
    match names {
        [Value::Text(name)] => {
            bindings.push((Rc::clone(name), Value::seq(args.to_vec())));
            Ok(())
        }
        [] => Err(EvalError::destructure("no name after &")),
        [_] => Err(EvalError::destructure("rest parameter must be a name")),
        _ => Err(EvalError::destructure("too many names after &")),
    }
}
