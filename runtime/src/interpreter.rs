use std::io::{self, Write};
use std::rc::Rc;

use lson::{
    Closure, Env, ErrorKind, EvalError, Result, Table, TableKind, Value, ensure_sufficient_stack,
};

use crate::binder::bind;
use crate::bootstrap;
use crate::builtins;
use crate::options::EvalOptions;

// ============================================================================
// Evaluator
// ============================================================================

/// One evaluator instance: its global table, its macro table, and the sink
/// the `p` builtin writes to. Instances share nothing with each other.
pub struct Evaluator {
    globals: Table,
    macros: Table,
    options: EvalOptions,
    depth: usize,
    debug_sink: Box<dyn Write>,
}

impl Evaluator {
    /// Create an evaluator with default options and run the bootstrap programs.
    pub fn new() -> Result<Self> {
        Self::with_options(EvalOptions::default())
    }

    pub fn with_options(options: EvalOptions) -> Result<Self> {
        let mut evaluator = Evaluator {
            globals: Table::new(TableKind::Global),
            macros: Table::new(TableKind::Macro),
            options,
            depth: 0,
            debug_sink: Box::new(io::stderr()),
        };
        builtins::register(&mut evaluator)?;
        bootstrap::run(&mut evaluator)?;
        Ok(evaluator)
    }

    /// Replace the sink the `p` builtin writes to
    pub fn set_debug_sink(&mut self, sink: Box<dyn Write>) {
        self.debug_sink = sink;
    }

    pub fn globals(&self) -> &Table {
        &self.globals
    }

    pub fn macros(&self) -> &Table {
        &self.macros
    }

    pub(crate) fn globals_mut(&mut self) -> &mut Table {
        &mut self.globals
    }

    pub(crate) fn macros_mut(&mut self) -> &mut Table {
        &mut self.macros
    }

    pub(crate) fn debug_sink(&mut self) -> &mut dyn Write {
        self.debug_sink.as_mut()
    }

    /// Evaluate one top-level request with an empty local environment.
    pub fn eval_toplevel(&mut self, exp: &Value) -> Result<Value> {
        self.eval(exp, &Env::new())
    }

    /// Evaluate `exp` in the local environment `env`.
    pub fn eval(&mut self, exp: &Value, env: &Env) -> Result<Value> {
        if self.depth >= self.options.max_depth {
            tracing::warn!(limit = self.options.max_depth, "evaluation depth limit reached");
            return Err(ErrorKind::ExpansionTooDeep {
                limit: self.options.max_depth,
            }
            .into());
        }

        self.depth += 1;
        let result = ensure_sufficient_stack(|| self.eval_value(exp, env));
        self.depth -= 1;
        result
    }

    fn eval_value(&mut self, exp: &Value, env: &Env) -> Result<Value> {
        match exp {
            // Strings in evaluated position are names
            Value::Text(name) => self.lookup(name, env),

            Value::Seq(form) if !form.is_empty() => self
                .eval_form(form, env)
                .map_err(|e| e.with_frame(exp)),

            Value::Map(entries) => {
                let mut evaluated = entries.as_ref().clone();
                for value in evaluated.values_mut() {
                    *value = self.eval(value, env)?;
                }
                Ok(Value::map(evaluated))
            }

            // Numbers, booleans, null, the empty sequence, and callables
            _ => Ok(exp.clone()),
        }
    }

    fn lookup(&self, name: &str, env: &Env) -> Result<Value> {
        env.lookup(name)
            .or_else(|| self.globals.lookup(name))
            .cloned()
            .ok_or_else(|| EvalError::unbound(name))
    }

    // ========================================================================
    // Special forms
    // ========================================================================

    fn eval_form(&mut self, form: &Rc<Vec<Value>>, env: &Env) -> Result<Value> {
        let Some((head, args)) = form.split_first() else {
            return Ok(Value::seq(Vec::new()));
        };

        match head.as_text() {
            Some("quote" | "") => quote(args),
            Some("def") => self.eval_def(args, env),
            Some("if") => self.eval_if(args, env),
            Some("fn") => make_closure(form, env),
            Some("defmacro") => self.eval_defmacro(args, env),
            Some("do") => self.eval_do(args, env),
            Some(name) if self.macros.contains(name) => self.expand_macro(name, args, env),
            _ => {
                let function = self.eval(head, env)?;
                let args = args
                    .iter()
                    .map(|arg| self.eval(arg, env))
                    .collect::<Result<Vec<_>>>()?;
                self.apply(&function, &args)
            }
        }
    }

    fn eval_def(&mut self, args: &[Value], env: &Env) -> Result<Value> {
        let [name, value_expr] = args else {
            return Err(EvalError::arity("def requires 2 args"));
        };
        let Value::Text(name) = name else {
            return Err(EvalError::type_error(format!(
                "def expects a name, got {}",
                name.type_name()
            )));
        };
        if self.globals.contains(name) {
            return Err(ErrorKind::AlreadyDefined {
                kind: TableKind::Global,
                name: name.to_string(),
            }
            .into());
        }

        let value = self.eval(value_expr, env)?;
        self.globals.define(Rc::clone(name), value.clone())?;
        Ok(value)
    }

    fn eval_if(&mut self, args: &[Value], env: &Env) -> Result<Value> {
        let (test, then_clause, else_clause) = match args {
            [test, then_clause] => (test, then_clause, None),
            [test, then_clause, else_clause] => (test, then_clause, Some(else_clause)),
            _ => return Err(EvalError::arity("invalid if form")),
        };

        if self.eval(test, env)?.is_truthy() {
            self.eval(then_clause, env)
        } else {
            match else_clause {
                Some(else_clause) => self.eval(else_clause, env),
                None => Ok(Value::Null),
            }
        }
    }

    fn eval_defmacro(&mut self, args: &[Value], env: &Env) -> Result<Value> {
        let [name, params, body @ ..] = args else {
            return Err(EvalError::arity("defmacro requires a name and a parameter list"));
        };
        let Value::Text(name) = name else {
            return Err(EvalError::type_error("defmacro expects a name"));
        };
        if !matches!(params, Value::Seq(_)) {
            return Err(EvalError::type_error("defmacro expects a parameter list"));
        }
        if self.macros.contains(name) {
            return Err(ErrorKind::AlreadyDefined {
                kind: TableKind::Macro,
                name: name.to_string(),
            }
            .into());
        }

        let mut fn_form = Vec::with_capacity(body.len() + 2);
        fn_form.push(Value::text("fn"));
        fn_form.push(params.clone());
        fn_form.extend_from_slice(body);
        let expander = self.eval(&Value::seq(fn_form), env)?;

        self.macros.define(Rc::clone(name), expander)?;
        Ok(Value::Text(Rc::clone(name)))
    }

    fn eval_do(&mut self, args: &[Value], env: &Env) -> Result<Value> {
        let mut result = Value::Null;
        for arg in args {
            result = self.eval(arg, env)?;
        }
        Ok(result)
    }

    /// Apply the macro to the unevaluated arguments, then evaluate the expansion
    fn expand_macro(&mut self, name: &str, args: &[Value], env: &Env) -> Result<Value> {
        let Some(expander) = self.macros.lookup(name).cloned() else {
            return Err(EvalError::unbound(name));
        };
        let expansion = self.apply(&expander, args)?;
        tracing::debug!(name, %expansion, "macro expanded");
        self.eval(&expansion, env)
    }

    // ========================================================================
    // Application
    // ========================================================================

    /// Call `function` with already-evaluated `args`.
    pub fn apply(&mut self, function: &Value, args: &[Value]) -> Result<Value> {
        match function {
            // A mapping is a one-argument accessor
            Value::Map(entries) => {
                let key = args
                    .first()
                    .ok_or_else(|| EvalError::arity("wrong # of arguments"))?;
                let Value::Text(key) = key else {
                    return Err(ErrorKind::InvalidKeyType(key.to_string()).into());
                };
                Ok(entries.get(&**key).cloned().unwrap_or(Value::Null))
            }
            Value::Closure(closure) => self.apply_closure(closure, args),
            Value::Builtin(name) => builtins::call(self, name, args),
            other => Err(EvalError::not_a_function(other)),
        }
    }

    fn apply_closure(&mut self, closure: &Closure, args: &[Value]) -> Result<Value> {
        let params = closure
            .params()
            .as_seq()
            .ok_or_else(|| EvalError::type_error("fn expects a parameter list"))?;
        let env = closure.env.extend(bind(params, args)?);

        let mut result = Value::Null;
        for exp in closure.body() {
            result = self.eval(exp, &env)?;
        }
        Ok(result)
    }
}

fn quote(args: &[Value]) -> Result<Value> {
    match args {
        [] => Err(EvalError::arity("no arguments to quote")),
        [single] => Ok(single.clone()),
        many => Ok(Value::seq(many.to_vec())),
    }
}

/// Capture the literal form and the current environment; nothing is evaluated
fn make_closure(form: &Rc<Vec<Value>>, env: &Env) -> Result<Value> {
    match form.get(1) {
        Some(Value::Seq(_)) => Ok(Value::closure(Rc::clone(form), env.clone())),
        Some(other) => Err(EvalError::type_error(format!(
            "fn expects a parameter list, got {}",
            other.type_name()
        ))),
        None => Err(EvalError::arity("fn requires a parameter list")),
    }
}
