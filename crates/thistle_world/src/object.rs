//! Object instance records.

use thistle_foundation::{ClassId, ObjectId, Value};

/// A live object instance.
///
/// Property bags and contents use persistent collections, so cloning an
/// instance (for snapshots) is cheap.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjectInstance {
    /// This object's id.
    pub id: ObjectId,
    /// The class this object instantiates.
    pub class: ClassId,
    /// Named properties.
    pub properties: im::HashMap<String, Value>,
    /// The object containing this one, if any.
    pub location: Option<ObjectId>,
    /// Objects contained in this one.
    pub contents: im::Vector<ObjectId>,
}

impl ObjectInstance {
    /// Creates a new instance of the given class with an empty property bag.
    #[must_use]
    pub fn new(id: ObjectId, class: ClassId) -> Self {
        Self {
            id,
            class,
            properties: im::HashMap::new(),
            location: None,
            contents: im::Vector::new(),
        }
    }

    /// Gets a property value, or nil if absent.
    #[must_use]
    pub fn property(&self, name: &str) -> Value {
        self.properties.get(name).cloned().unwrap_or(Value::Nil)
    }

    /// Sets a property value.
    pub fn set_property(&mut self, name: impl Into<String>, value: Value) {
        self.properties.insert(name.into(), value);
    }

    /// Returns the object's display name: the `name` property if it is a
    /// string, otherwise the `#n` form of its id.
    #[must_use]
    pub fn display_name(&self) -> String {
        match self.properties.get("name") {
            Some(Value::Str(s)) => s.to_string(),
            _ => self.id.to_string(),
        }
    }
}
