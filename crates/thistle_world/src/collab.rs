//! Collaborator traits consumed by the engine and reload coordinator.
//!
//! The session/transport layer supplies real implementations; tests and
//! the REPL use the simple ones provided here.

use thistle_foundation::ObjectId;

/// Delivers output lines to connected actors.
pub trait Notifier: Send {
    /// Delivers a line of output to a specific connected actor.
    fn notify(&mut self, actor: ObjectId, line: &str);

    /// Enumerates currently connected actors.
    fn connected(&self) -> Vec<ObjectId>;
}

/// Answers privilege-flag queries about actors.
pub trait Permissions: Send + Sync {
    /// Returns true if the actor carries the named flag.
    fn has_flag(&self, actor: ObjectId, flag: &str) -> bool;
}

/// A notifier that buffers every line, used by tests and batch tools.
#[derive(Debug, Default)]
pub struct BufferNotifier {
    /// Lines delivered so far, as (actor, line) pairs.
    pub lines: Vec<(ObjectId, String)>,
    /// Actors reported as connected.
    pub connected: Vec<ObjectId>,
}

impl BufferNotifier {
    /// Creates an empty buffer notifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a buffer notifier that reports the given actors as connected.
    #[must_use]
    pub fn with_connected(connected: Vec<ObjectId>) -> Self {
        Self {
            lines: Vec::new(),
            connected,
        }
    }

    /// Returns all lines delivered to the given actor.
    #[must_use]
    pub fn lines_for(&self, actor: ObjectId) -> Vec<&str> {
        self.lines
            .iter()
            .filter(|(a, _)| *a == actor)
            .map(|(_, l)| l.as_str())
            .collect()
    }
}

impl Notifier for BufferNotifier {
    fn notify(&mut self, actor: ObjectId, line: &str) {
        self.lines.push((actor, line.to_string()));
    }

    fn connected(&self) -> Vec<ObjectId> {
        self.connected.clone()
    }
}
