use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use lson::{ErrorKind, Value};
use lson_runtime::{EvalOptions, Evaluator, RequestError, Session};
use pretty_assertions::assert_eq;

fn eval_expr(input: &str) -> String {
    let mut session = Session::new(EvalOptions::default()).unwrap();
    match session.eval_line(input) {
        Ok(result) => result,
        Err(e) => format!("Error: {e}"),
    }
}

fn eval_kind(input: &str) -> ErrorKind {
    let mut session = Session::new(EvalOptions::default()).unwrap();
    match session.eval_line(input) {
        Err(RequestError::Eval(e)) => e.kind,
        other => panic!("expected an evaluation error, got {other:?}"),
    }
}

/// A writer that can be inspected after the evaluator took ownership of it
#[derive(Clone, Default)]
struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).unwrap()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// ============================================================================
// Arithmetic
// ============================================================================

#[test]
fn test_arithmetic_folds() {
    assert_eq!(eval_expr(r#"["+", 1, 2, 3]"#), "6");
    assert_eq!(eval_expr(r#"["-", 10, 1, 2]"#), "7");
    assert_eq!(eval_expr(r#"["*", 2, 3, 4]"#), "24");
    assert_eq!(eval_expr(r#"["/", 100, 5, 2]"#), "10");
}

#[test]
fn test_arithmetic_argument_counts() {
    assert_eq!(eval_expr(r#"["+"]"#), "null");
    assert_eq!(eval_expr(r#"["*"]"#), "null");
    assert_eq!(eval_expr(r#"["-", 5]"#), "5");
    assert_eq!(eval_expr(r#"["/", 5]"#), "5");
}

#[test]
fn test_integer_division_floors() {
    assert_eq!(eval_expr(r#"["/", 7, 2]"#), "3");
    assert_eq!(eval_expr(r#"["/", -7, 2]"#), "-4");
    assert_eq!(eval_expr(r#"["/", 7, -2]"#), "-4");
}

#[test]
fn test_mixed_numbers_promote_to_float() {
    assert_eq!(eval_expr(r#"["+", 1, 2.5]"#), "3.5");
    assert_eq!(eval_expr(r#"["/", 7.0, 2]"#), "3.5");
    assert_eq!(eval_expr(r#"["*", 2, 1.5]"#), "3.0");
}

#[test]
fn test_arithmetic_errors() {
    assert!(matches!(
        eval_kind(r#"["/", 1, 0]"#),
        ErrorKind::ArithmeticError(_)
    ));
    assert!(matches!(
        eval_kind(r#"["+", 9223372036854775807, 1]"#),
        ErrorKind::ArithmeticError(_)
    ));
    assert!(matches!(
        eval_kind(r#"["+", 1, ["", "a"]]"#),
        ErrorKind::TypeError(_)
    ));
    assert!(matches!(eval_kind(r#"["*", 1, null]"#), ErrorKind::TypeError(_)));
}

#[test]
fn test_float_division_by_zero_is_infinite() {
    // Infinity has no JSON encoding, so compare instead of printing
    assert_eq!(eval_expr(r#"["==", ["/", 1.0, 0], ["/", 2.0, 0]]"#), "true");
    assert_eq!(eval_expr(r#"["<", 1e308, ["/", 1.0, 0]]"#), "true");
}

#[test]
fn test_plus_concatenates() {
    assert_eq!(eval_expr(r#"["+", ["", "ab"], ["", "cd"], ["", "e"]]"#), r#""abcde""#);
    assert_eq!(
        eval_expr(r#"["+", ["list", 1], ["list", 2, 3], []]"#),
        "[1,2,3]"
    );
    assert!(matches!(
        eval_kind(r#"["-", ["list", 1], ["list", 2]]"#),
        ErrorKind::TypeError(_)
    ));
}

// ============================================================================
// Comparison
// ============================================================================

#[test]
fn test_comparison_chains() {
    assert_eq!(eval_expr(r#"["<", 1, 2, 3]"#), "true");
    assert_eq!(eval_expr(r#"["<", 1, 3, 2]"#), "false");
    assert_eq!(eval_expr(r#"["<=", 1, 1, 2]"#), "true");
    assert_eq!(eval_expr(r#"[">", 3, 2, 1]"#), "true");
    assert_eq!(eval_expr(r#"[">=", 3, 3, 4]"#), "false");
    assert_eq!(eval_expr(r#"["!=", 1, 2, 1]"#), "true");
    assert_eq!(eval_expr(r#"["==", 2, 2, 2]"#), "true");
}

#[test]
fn test_comparison_needs_two_arguments() {
    assert!(matches!(eval_kind(r#"["<", 1]"#), ErrorKind::ArityError(_)));
    assert!(matches!(eval_kind(r#"["=="]"#), ErrorKind::ArityError(_)));
}

#[test]
fn test_equality_is_structural() {
    assert_eq!(eval_expr(r#"["==", 1, 1.0]"#), "true");
    assert_eq!(eval_expr(r#"["==", ["list", 1, 2], ["list", 1, 2]]"#), "true");
    assert_eq!(eval_expr(r#"["==", {"a": 1}, {"a": ["-", 2, 1]}]"#), "true");
    assert_eq!(eval_expr(r#"["==", null, false]"#), "false");
    assert_eq!(eval_expr(r#"["==", ["", "1"], 1]"#), "false");
}

#[test]
fn test_integer_float_comparison_is_exact() {
    assert_eq!(eval_expr(r#"["==", 9007199254740993, 9007199254740992.0]"#), "false");
    assert_eq!(eval_expr(r#"["<", 9007199254740992.0, 9007199254740993]"#), "true");
    assert_eq!(eval_expr(r#"["==", 9007199254740992, 9007199254740992.0]"#), "true");
    assert_eq!(eval_expr(r#"["<", 2, 2.5, 3]"#), "true");
}

#[test]
fn test_ordering_of_texts() {
    assert_eq!(eval_expr(r#"["<", ["", "apple"], ["", "banana"]]"#), "true");
    assert!(matches!(
        eval_kind(r#"["<", 1, ["", "a"]]"#),
        ErrorKind::TypeError(_)
    ));
    assert!(matches!(
        eval_kind(r#"["<", ["list"], ["list"]]"#),
        ErrorKind::TypeError(_)
    ));
}

// ============================================================================
// Sequences
// ============================================================================

#[test]
fn test_list() {
    assert_eq!(eval_expr(r#"["list"]"#), "[]");
    assert_eq!(eval_expr(r#"["list", 1, ["+", 1, 1]]"#), "[1,2]");
}

#[test]
fn test_append() {
    assert_eq!(eval_expr(r#"["append"]"#), "[]");
    assert_eq!(
        eval_expr(r#"["append", ["list", 1], [], ["list", 2, 3]]"#),
        "[1,2,3]"
    );
    assert!(matches!(eval_kind(r#"["append", 1]"#), ErrorKind::TypeError(_)));
}

#[test]
fn test_conj() {
    assert_eq!(eval_expr(r#"["conj", ["list", 1], 2, 3]"#), "[1,2,3]");
    assert_eq!(eval_expr(r#"["conj", [], ["list"]]"#), "[[]]");
    assert!(matches!(eval_kind(r#"["conj", ["list", 1]]"#), ErrorKind::ArityError(_)));
    assert!(matches!(eval_kind(r#"["conj", 1, 2]"#), ErrorKind::TypeError(_)));
}

#[test]
fn test_cons() {
    assert_eq!(eval_expr(r#"["cons", 0, ["list", 1, 2]]"#), "[0,1,2]");
    assert_eq!(eval_expr(r#"["cons", ["list"], []]"#), "[[]]");
    assert!(matches!(eval_kind(r#"["cons", 0, 1]"#), ErrorKind::TypeError(_)));
    assert!(matches!(eval_kind(r#"["cons", 0]"#), ErrorKind::ArityError(_)));
}

#[test]
fn test_sequence_builtins_do_not_mutate_inputs() {
    let mut session = Session::new(EvalOptions::default()).unwrap();
    session.eval_line(r#"["def", "xs", ["list", 1, 2]]"#).unwrap();
    session.eval_line(r#"["conj", "xs", 3]"#).unwrap();
    session.eval_line(r#"["cons", 0, "xs"]"#).unwrap();
    session.eval_line(r#"["append", "xs", "xs"]"#).unwrap();
    assert_eq!(session.eval_line(r#""xs""#).unwrap(), "[1,2]");
}

// ============================================================================
// Introspection and diagnostics
// ============================================================================

#[test]
fn test_globals_lists_newest_first() {
    assert_eq!(
        eval_expr(r#"["globals"]"#),
        r#"["not",">=",">","==","!=","<","<=","+","-","*","/","list","p","globals","append","conj","cons"]"#
    );

    let mut session = Session::new(EvalOptions::default()).unwrap();
    session.eval_line(r#"["def", "answer", 42]"#).unwrap();
    let names = session.eval_line(r#"["globals"]"#).unwrap();
    assert!(names.starts_with(r#"["answer","not",">=""#));
}

#[test]
fn test_p_writes_to_debug_sink() {
    let buffer = SharedBuffer::default();
    let mut evaluator = Evaluator::new().unwrap();
    evaluator.set_debug_sink(Box::new(buffer.clone()));
    let mut session = Session::from_evaluator(evaluator);

    assert_eq!(session.eval_line(r#"["p", ["+", 1, 2]]"#).unwrap(), "3");
    assert_eq!(
        session.eval_line(r#"["p", ["", "hi"], ["list", 1]]"#).unwrap(),
        r#"["hi",[1]]"#
    );
    assert_eq!(session.eval_line(r#"["p"]"#).unwrap(), "null");
    assert_eq!(buffer.contents(), "3\n\"hi\"\n[1]\n");
}

#[test]
fn test_builtins_are_values() {
    assert_eq!(eval_expr(r#""cons""#), r#"["builtin","cons"]"#);
    assert_eq!(
        eval_expr(r#"[["fn", ["f"], ["f", 2, 3]], "*"]"#),
        "6"
    );
}

#[test]
fn test_undefined_builtin() {
    let mut evaluator = Evaluator::new().unwrap();
    let err = evaluator
        .apply(&Value::builtin("nope"), &[])
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::UndefinedBuiltin("nope".into()));
}

#[test]
fn test_let_is_not_callable_as_a_value() {
    // let lives in the macro table only
    assert_eq!(
        eval_kind(r#"[["fn", [], "let"]]"#),
        ErrorKind::UnboundName("let".into())
    );
}
