//! Stored verb and function records.

use std::time::SystemTime;

use thistle_foundation::{ClassId, HandlerId, ObjectId, Type};

/// Who authored a handler.
///
/// Provenance decides reload behavior: an ordinary reload purges only
/// system-authored handlers; user-authored handlers survive everything
/// short of an explicit force-reload.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Provenance {
    /// Loaded from the source tree; purged and re-created on reload.
    System,
    /// Authored at runtime; survives ordinary reloads.
    User,
}

/// The object or class a handler is attached to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Owner {
    /// Attached directly to an object instance.
    Object(ObjectId),
    /// Attached to a class; inherited by all instances below it.
    Class(ClassId),
}

impl Owner {
    /// The owner holding global handlers.
    pub const SYSTEM: Self = Self::Object(ObjectId::SYSTEM);
}

/// Where a resolved definition was found relative to the query object.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DefinitionSource {
    /// Defined directly on the queried object.
    Instance,
    /// Inherited from a class in the object's chain.
    Class(ClassId),
    /// Merged in from the global system object.
    System,
}

/// A command handler matched against free-text input.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Verb {
    /// Generated record id.
    pub id: HandlerId,
    /// The object or class this verb is attached to.
    pub owner: Owner,
    /// Primary name.
    pub name: String,
    /// Alternate names.
    pub aliases: Vec<String>,
    /// Optional argument pattern (wildcard or named-capture dialect).
    pub pattern: Option<String>,
    /// Script body text; empty means "not yet implemented".
    pub body: String,
    /// System or user authored.
    pub provenance: Provenance,
    /// When the record was created.
    pub created: SystemTime,
    /// When the record was last modified.
    pub modified: SystemTime,
}

impl Verb {
    /// Returns true if `word` matches this verb's name, case-insensitively.
    #[must_use]
    pub fn matches_name(&self, word: &str) -> bool {
        self.name.eq_ignore_ascii_case(word)
    }

    /// Returns true if `word` matches one of the aliases, case-insensitively.
    #[must_use]
    pub fn matches_alias(&self, word: &str) -> bool {
        self.aliases.iter().any(|a| a.eq_ignore_ascii_case(word))
    }

    /// Returns true if this verb has a non-empty body.
    #[must_use]
    pub fn has_body(&self) -> bool {
        !self.body.trim().is_empty()
    }

    /// Returns true if this is an administrative verb.
    ///
    /// Administrative verbs carry a `@` prefix and are reachable only from
    /// top-level input, never from nested calls.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.name.starts_with('@')
    }
}

/// A typed, parameterized callable invoked programmatically.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Function {
    /// Generated record id.
    pub id: HandlerId,
    /// The object or class this function is attached to.
    pub owner: Owner,
    /// Function name.
    pub name: String,
    /// Ordered (parameter name, declared type) pairs.
    pub params: Vec<(String, Type)>,
    /// Declared return type; checked advisorily after execution.
    pub returns: Type,
    /// Script body text.
    pub body: String,
    /// System or user authored.
    pub provenance: Provenance,
    /// When the record was created.
    pub created: SystemTime,
    /// When the record was last modified.
    pub modified: SystemTime,
}

impl Function {
    /// Returns true if `word` matches this function's name, case-insensitively.
    #[must_use]
    pub fn matches_name(&self, word: &str) -> bool {
        self.name.eq_ignore_ascii_case(word)
    }

    /// Returns true if this function has a non-empty body.
    #[must_use]
    pub fn has_body(&self) -> bool {
        !self.body.trim().is_empty()
    }
}

/// Fields for a verb about to be inserted into the catalog.
#[derive(Clone, Debug)]
pub struct NewVerb {
    /// The object or class to attach to.
    pub owner: Owner,
    /// Primary name.
    pub name: String,
    /// Alternate names.
    pub aliases: Vec<String>,
    /// Optional argument pattern.
    pub pattern: Option<String>,
    /// Script body text.
    pub body: String,
    /// System or user authored.
    pub provenance: Provenance,
}

impl NewVerb {
    /// Creates a minimal user-authored verb on the given owner.
    #[must_use]
    pub fn user(owner: Owner, name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            owner,
            name: name.into(),
            aliases: Vec::new(),
            pattern: None,
            body: body.into(),
            provenance: Provenance::User,
        }
    }

    /// Creates a minimal system-authored verb on the given owner.
    #[must_use]
    pub fn system(owner: Owner, name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            owner,
            name: name.into(),
            aliases: Vec::new(),
            pattern: None,
            body: body.into(),
            provenance: Provenance::System,
        }
    }

    /// Sets the aliases from a space-separated string.
    #[must_use]
    pub fn with_aliases(mut self, aliases: &str) -> Self {
        self.aliases = aliases.split_whitespace().map(str::to_string).collect();
        self
    }

    /// Sets the argument pattern.
    #[must_use]
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }
}

/// Fields for a function about to be inserted into the catalog.
#[derive(Clone, Debug)]
pub struct NewFunction {
    /// The object or class to attach to.
    pub owner: Owner,
    /// Function name.
    pub name: String,
    /// Ordered (parameter name, declared type) pairs.
    pub params: Vec<(String, Type)>,
    /// Declared return type.
    pub returns: Type,
    /// Script body text.
    pub body: String,
    /// System or user authored.
    pub provenance: Provenance,
}
