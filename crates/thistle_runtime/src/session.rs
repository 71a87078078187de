//! A connected actor's command session.

use std::sync::Arc;

use thistle_engine::{DispatchOutcome, Dispatcher};
use thistle_foundation::{ObjectId, Result};
use thistle_reload::SharedState;
use thistle_world::Notifier;

/// A notifier that prints every line straight to stdout.
///
/// The interactive runtime has exactly one actor at the terminal, so
/// every notification is for them.
#[derive(Debug, Default)]
pub struct ConsoleNotifier {
    connected: Vec<ObjectId>,
}

impl ConsoleNotifier {
    /// Creates a console notifier with the given connected actors.
    #[must_use]
    pub fn new(connected: Vec<ObjectId>) -> Self {
        Self { connected }
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&mut self, _actor: ObjectId, line: &str) {
        println!("{line}");
    }

    fn connected(&self) -> Vec<ObjectId> {
        self.connected.clone()
    }
}

/// One actor's live connection to the shared world.
///
/// Sessions are thin: they hold the actor identity and a dispatcher, and
/// lock the shared state only for the duration of a single command.
pub struct Session {
    shared: Arc<SharedState>,
    actor: ObjectId,
    dispatcher: Dispatcher,
}

impl Session {
    /// Creates a session for the given actor.
    #[must_use]
    pub fn new(shared: Arc<SharedState>, actor: ObjectId) -> Self {
        Self {
            shared,
            actor,
            dispatcher: Dispatcher::new(),
        }
    }

    /// The actor this session acts as.
    #[must_use]
    pub const fn actor(&self) -> ObjectId {
        self.actor
    }

    /// The shared state this session runs against.
    #[must_use]
    pub fn shared(&self) -> &Arc<SharedState> {
        &self.shared
    }

    /// Executes one line of input as the session's actor.
    ///
    /// Unmatched input earns the actor a confused reply; handler faults
    /// propagate to the caller after the world locks are released.
    pub fn execute(&self, input: &str) -> Result<DispatchOutcome> {
        let outcome = {
            let mut world = self.shared.world.lock();
            let catalog = self.shared.catalog.lock();
            let mut notifier = self.shared.notifier.lock();
            self.dispatcher.dispatch(
                &mut world,
                &catalog,
                notifier.as_mut(),
                self.actor,
                input,
            )?
        };
        if matches!(outcome, DispatchOutcome::NoMatch) && !input.trim().is_empty() {
            let mut notifier = self.shared.notifier.lock();
            notifier.notify(self.actor, "Huh? (type \"look\" to look around)");
        }
        Ok(outcome)
    }
}
