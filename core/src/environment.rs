//! Environments for name bindings
//!
//! Local bindings form an immutable chain of scopes: a function application
//! prepends one scope to the closure's saved environment and never mutates the
//! parent, so sibling closures share their common tail.
//!
//! Global and macro definitions live in a [`Table`], which is append-only and
//! refuses to rebind a name.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::error::{ErrorKind, Result, TableKind};
use crate::language::Value;

pub type Binding = (Rc<str>, Value);

// ============================================================================
// Local environment
// ============================================================================

#[derive(Debug)]
struct Scope {
    bindings: Vec<Binding>,
    parent: Env,
}

/// Local environment. Cheap to clone (just an Rc increment).
#[derive(Debug, Clone, Default)]
pub struct Env {
    head: Option<Rc<Scope>>,
}

impl Env {
    /// The empty environment
    pub fn new() -> Self {
        Env { head: None }
    }

    /// Create a child environment with `bindings` in front of this one
    pub fn extend(&self, bindings: Vec<Binding>) -> Self {
        if bindings.is_empty() {
            return self.clone();
        }
        Env {
            head: Some(Rc::new(Scope {
                bindings,
                parent: self.clone(),
            })),
        }
    }

    /// Look up a name, walking outward; the frontmost binding wins
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.bindings()
            .find(|(bound, _)| &**bound == name)
            .map(|(_, value)| value)
    }

    /// All bindings, front to back, shadowed ones included
    pub fn bindings(&self) -> impl Iterator<Item = &Binding> {
        let mut scope = self.head.as_deref();
        std::iter::from_fn(move || {
            let current = scope?;
            scope = current.parent.head.as_deref();
            Some(current.bindings.iter())
        })
        .flatten()
    }
}

// ============================================================================
// Append-only tables
// ============================================================================

/// An append-only, name-unique table of definitions.
#[derive(Debug)]
pub struct Table {
    kind: TableKind,
    entries: Vec<Binding>,
    index: FxHashMap<Rc<str>, usize>,
}

impl Table {
    pub fn new(kind: TableKind) -> Self {
        Table {
            kind,
            entries: Vec::new(),
            index: FxHashMap::default(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.index.get(name).map(|&i| &self.entries[i].1)
    }

    /// Bind `name`; rebinding an existing name fails `AlreadyDefined`
    pub fn define(&mut self, name: Rc<str>, value: Value) -> Result<()> {
        if self.contains(&name) {
            return Err(ErrorKind::AlreadyDefined {
                kind: self.kind,
                name: name.to_string(),
            }
            .into());
        }
        tracing::debug!(table = %self.kind, %name, "define");
        self.index.insert(name.clone(), self.entries.len());
        self.entries.push((name, value));
        Ok(())
    }

    /// Defined names, most recent first
    pub fn names(&self) -> impl Iterator<Item = &Rc<str>> {
        self.entries.iter().rev().map(|(name, _)| name)
    }
}
