//! Programs every evaluator runs on construction.
//!
//! `defun` and `not` are written in the language itself, using only the
//! special forms and the `list`/`append` builtins.

use lson::{Env, Result, Value};
use serde_json::{Value as Json, json};

use crate::interpreter::Evaluator;

/// `["defun", name, params, body...]` expands to
/// `["do", ["def", name, ["fn", params, body...]], ["", name]]`.
fn defun() -> Json {
    json!(["defmacro", "defun", ["name", "params", "&", "body"],
        ["list", ["", "do"],
            ["list", ["", "def"], "name",
                ["append", ["list", ["", "fn"], "params"], "body"]],
            ["list", ["", ""], "name"]]])
}

fn not() -> Json {
    json!(["defun", "not", ["x"], ["if", "x", false, true]])
}

pub fn programs() -> Vec<Value> {
    vec![Value::from(defun()), Value::from(not())]
}

pub fn run(evaluator: &mut Evaluator) -> Result<()> {
    for program in programs() {
        evaluator.eval(&program, &Env::new())?;
    }
    Ok(())
}
