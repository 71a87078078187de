//! Object class records.

use thistle_foundation::ClassId;

/// A class in the object inheritance hierarchy.
///
/// Classes form a tree via the `parent` link. The graph is assumed
/// acyclic; the chain walk in [`crate::World::inheritance_chain`]
/// truncates on a revisited id so a bad graph cannot hang the resolver.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjectClass {
    /// This class's id.
    pub id: ClassId,
    /// Class name, unique case-insensitively.
    pub name: String,
    /// Parent class, if any.
    pub parent: Option<ClassId>,
}

impl ObjectClass {
    /// Creates a new class record.
    #[must_use]
    pub fn new(id: ClassId, name: impl Into<String>, parent: Option<ClassId>) -> Self {
        Self {
            id,
            name: name.into(),
            parent,
        }
    }
}
