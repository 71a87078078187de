//! The verb and function catalog.
//!
//! Stores every handler definition in the system, indexed by owner. The
//! catalog is deliberately dumb storage: resolution order, inheritance,
//! and pattern matching live in [`crate::resolve`].

use std::collections::HashMap;
use std::time::SystemTime;

use thistle_foundation::{HandlerId, Result, Value};

use crate::pattern::Pattern;
use crate::record::{Function, NewFunction, NewVerb, Owner, Provenance, Verb};

/// Storage for all verb and function definitions.
#[derive(Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Catalog {
    verbs: HashMap<HandlerId, Verb>,
    functions: HashMap<HandlerId, Function>,
    next: u64,
}

impl Catalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored verbs.
    #[must_use]
    pub fn verb_count(&self) -> usize {
        self.verbs.len()
    }

    /// Returns the number of stored functions.
    #[must_use]
    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    fn next_id(&mut self) -> HandlerId {
        self.next += 1;
        HandlerId::new(self.next)
    }

    // --- Verbs ---

    /// Inserts a verb, validating its pattern first.
    ///
    /// The pattern (if any) must compile; a bad pattern is rejected here
    /// rather than surfacing as a silent match failure at dispatch time.
    pub fn add_verb(&mut self, new: NewVerb) -> Result<HandlerId> {
        if let Some(pattern) = &new.pattern {
            Pattern::compile(pattern)?;
        }
        let id = self.next_id();
        let now = SystemTime::now();
        self.verbs.insert(
            id,
            Verb {
                id,
                owner: new.owner,
                name: new.name,
                aliases: new.aliases,
                pattern: new.pattern,
                body: new.body,
                provenance: new.provenance,
                created: now,
                modified: now,
            },
        );
        Ok(id)
    }

    /// Gets a verb by id.
    #[must_use]
    pub fn verb(&self, id: HandlerId) -> Option<&Verb> {
        self.verbs.get(&id)
    }

    /// Replaces a verb's body, updating its modification time.
    #[must_use]
    pub fn set_verb_body(&mut self, id: HandlerId, body: impl Into<String>) -> bool {
        match self.verbs.get_mut(&id) {
            Some(verb) => {
                verb.body = body.into();
                verb.modified = SystemTime::now();
                true
            }
            None => false,
        }
    }

    /// Removes a verb by id.
    pub fn remove_verb(&mut self, id: HandlerId) -> Option<Verb> {
        self.verbs.remove(&id)
    }

    /// Lists the verbs attached to an owner, in insertion order.
    #[must_use]
    pub fn verbs_for(&self, owner: Owner) -> Vec<&Verb> {
        let mut found: Vec<&Verb> = self.verbs.values().filter(|v| v.owner == owner).collect();
        found.sort_by_key(|v| v.id);
        found
    }

    /// Returns true if a verb with this name exists on the owner.
    #[must_use]
    pub fn has_verb(&self, owner: Owner, name: &str) -> bool {
        self.verbs
            .values()
            .any(|v| v.owner == owner && v.matches_name(name))
    }

    /// Iterates over all stored verbs.
    pub fn verbs(&self) -> impl Iterator<Item = &Verb> {
        self.verbs.values()
    }

    // --- Functions ---

    /// Inserts a function.
    pub fn add_function(&mut self, new: NewFunction) -> HandlerId {
        let id = self.next_id();
        let now = SystemTime::now();
        self.functions.insert(
            id,
            Function {
                id,
                owner: new.owner,
                name: new.name,
                params: new.params,
                returns: new.returns,
                body: new.body,
                provenance: new.provenance,
                created: now,
                modified: now,
            },
        );
        id
    }

    /// Gets a function by id.
    #[must_use]
    pub fn function(&self, id: HandlerId) -> Option<&Function> {
        self.functions.get(&id)
    }

    /// Removes a function by id.
    pub fn remove_function(&mut self, id: HandlerId) -> Option<Function> {
        self.functions.remove(&id)
    }

    /// Lists the functions attached to an owner, in insertion order.
    #[must_use]
    pub fn functions_for(&self, owner: Owner) -> Vec<&Function> {
        let mut found: Vec<&Function> = self
            .functions
            .values()
            .filter(|f| f.owner == owner)
            .collect();
        found.sort_by_key(|f| f.id);
        found
    }

    /// Returns true if a function with this name exists on the owner.
    #[must_use]
    pub fn has_function(&self, owner: Owner, name: &str) -> bool {
        self.functions
            .values()
            .any(|f| f.owner == owner && f.matches_name(name))
    }

    /// Iterates over all stored functions.
    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        self.functions.values()
    }

    // --- Bulk operations for reload ---

    /// Removes every system-authored handler, keeping user definitions.
    ///
    /// This is the ordinary-reload purge: the source tree is about to be
    /// re-read, and anything it produced last time is stale.
    pub fn purge_system(&mut self) {
        self.verbs.retain(|_, v| v.provenance == Provenance::User);
        self.functions.retain(|_, f| f.provenance == Provenance::User);
    }

    /// Removes every handler regardless of provenance.
    pub fn purge_all(&mut self) {
        self.verbs.clear();
        self.functions.clear();
    }

    /// Counts handlers with the given provenance.
    #[must_use]
    pub fn count_by_provenance(&self, provenance: Provenance) -> usize {
        self.verbs.values().filter(|v| v.provenance == provenance).count()
            + self
                .functions
                .values()
                .filter(|f| f.provenance == provenance)
                .count()
    }
}

/// A stable textual summary of the catalog, for admin verbs.
#[must_use]
pub fn describe(catalog: &Catalog, owner: Owner) -> Value {
    let mut lines: Vec<Value> = Vec::new();
    for verb in catalog.verbs_for(owner) {
        let mut line = verb.name.clone();
        if !verb.aliases.is_empty() {
            line.push_str(&format!(" ({})", verb.aliases.join(", ")));
        }
        if let Some(pattern) = &verb.pattern {
            line.push_str(&format!(" [{pattern}]"));
        }
        lines.push(Value::from(line));
    }
    for function in catalog.functions_for(owner) {
        let params: Vec<String> = function
            .params
            .iter()
            .map(|(name, ty)| format!("{name}: {ty}"))
            .collect();
        lines.push(Value::from(format!(
            "{}({}) -> {}",
            function.name,
            params.join(", "),
            function.returns
        )));
    }
    Value::List(lines.into_iter().collect())
}
