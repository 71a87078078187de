//! Lexically scoped variable bindings for script evaluation.

use std::collections::HashMap;

use thistle_foundation::Value;

/// A stack of lexical scopes.
///
/// The engine seeds the root scope with the call context (`this`, `me`,
/// `here`, `tokens`, captured variables, parameters); `let` forms push and
/// pop inner scopes during evaluation.
#[derive(Clone, Debug, Default)]
pub struct Env {
    scopes: Vec<HashMap<String, Value>>,
}

impl Env {
    /// Creates an environment with a single empty root scope.
    #[must_use]
    pub fn new() -> Self {
        Self {
            scopes: vec![HashMap::new()],
        }
    }

    /// Defines a binding in the innermost scope.
    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.into(), value);
        }
    }

    /// Looks a name up, innermost scope first.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Value> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name).cloned())
    }

    /// Pushes a new inner scope.
    pub fn push(&mut self) {
        self.scopes.push(HashMap::new());
    }

    /// Pops the innermost scope. The root scope is never popped.
    pub fn pop(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Returns the current scope depth.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }
}
