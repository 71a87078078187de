//! The host interface scripts run against.
//!
//! The interpreter has no direct access to the world. Every observable
//! effect of a script goes through this trait; the engine's executor
//! implements it, and [`NullHost`] serves tests that only exercise pure
//! evaluation.

use thistle_foundation::{Error, ObjectId, Result, Value};

/// World access surface exposed to scripts.
pub trait ScriptHost {
    /// Gets a named property on an object (nil if absent).
    fn get_property(&mut self, object: ObjectId, name: &str) -> Result<Value>;

    /// Sets a named property on an object.
    fn set_property(&mut self, object: ObjectId, name: &str, value: Value) -> Result<()>;

    /// Returns the location of an object, or nil.
    fn location_of(&mut self, object: ObjectId) -> Result<Value>;

    /// Returns the contents of an object as a list of object references.
    fn contents_of(&mut self, object: ObjectId) -> Result<Value>;

    /// Returns an object's display name.
    fn name_of(&mut self, object: ObjectId) -> Result<String>;

    /// Moves an object to a new location.
    fn move_object(&mut self, object: ObjectId, dest: ObjectId) -> Result<()>;

    /// Instantiates a new object of the named class.
    fn create_object(&mut self, class_name: &str) -> Result<ObjectId>;

    /// Delivers a line of output to a connected actor.
    fn notify(&mut self, actor: ObjectId, line: &str) -> Result<()>;

    /// Invokes another handler through a symbolic reference.
    ///
    /// `target` is either an object value or a string reference
    /// (`"me"`, `"system"`, `"$class"`, or a free-text name); resolution
    /// happens in the engine. Faults in the callee are contained there and
    /// surface here as a nil result.
    fn call_handler(&mut self, target: Value, verb: &str, args: Vec<Value>) -> Result<Value>;

    /// Returns a random integer in `[low, high]` from the world's RNG.
    fn random_range(&mut self, low: i64, high: i64) -> Result<i64>;
}

/// A host that rejects all world access.
///
/// Used to evaluate pure expressions in tests; any world-touching builtin
/// fails with a reference failure.
#[derive(Debug, Default)]
pub struct NullHost;

impl NullHost {
    fn refuse<T>(op: &str) -> Result<T> {
        Err(Error::reference_failure(format!(
            "no world available for {op}"
        )))
    }
}

impl ScriptHost for NullHost {
    fn get_property(&mut self, _object: ObjectId, _name: &str) -> Result<Value> {
        Self::refuse("get")
    }

    fn set_property(&mut self, _object: ObjectId, _name: &str, _value: Value) -> Result<()> {
        Self::refuse("set!")
    }

    fn location_of(&mut self, _object: ObjectId) -> Result<Value> {
        Self::refuse("location")
    }

    fn contents_of(&mut self, _object: ObjectId) -> Result<Value> {
        Self::refuse("contents")
    }

    fn name_of(&mut self, _object: ObjectId) -> Result<String> {
        Self::refuse("name")
    }

    fn move_object(&mut self, _object: ObjectId, _dest: ObjectId) -> Result<()> {
        Self::refuse("move!")
    }

    fn create_object(&mut self, _class_name: &str) -> Result<ObjectId> {
        Self::refuse("create!")
    }

    fn notify(&mut self, _actor: ObjectId, _line: &str) -> Result<()> {
        Self::refuse("say")
    }

    fn call_handler(&mut self, _target: Value, _verb: &str, _args: Vec<Value>) -> Result<Value> {
        Self::refuse("call")
    }

    fn random_range(&mut self, _low: i64, _high: i64) -> Result<i64> {
        Self::refuse("random")
    }
}
