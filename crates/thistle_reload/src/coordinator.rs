//! Hot-reload coordination.
//!
//! A filesystem watcher feeds change events in; each source category gets
//! its own debounce window so a burst of editor saves becomes one reload.
//! Every further event during the window resets it, so the reload fires
//! after the tree has been quiet for the full debounce interval.
//!
//! Reloads are serialized per category, each behind its own lock.
//! Wizard-flagged connected actors
//! hear about a finished reload only after that lock is released, so an
//! announcement can never deadlock against a handler running mid-reload.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::Mutex;

use thistle_engine::Catalog;
use thistle_foundation::{Error, ErrorKind, Result};
use thistle_world::{Notifier, Permissions, World};

use crate::loader::{LoadSummary, SourceCategory, SourceLoader};

/// Server state the coordinator reloads into.
///
/// The runtime shares this with its sessions; the coordinator's timer
/// threads lock what they need for the duration of one reload and nothing
/// longer.
pub struct SharedState {
    /// The object store.
    pub world: Mutex<World>,
    /// The handler catalog.
    pub catalog: Mutex<Catalog>,
    /// Output sink for load-time scripts and reload announcements.
    pub notifier: Mutex<Box<dyn Notifier>>,
}

impl SharedState {
    /// Wraps the given state for sharing.
    #[must_use]
    pub fn new(world: World, catalog: Catalog, notifier: Box<dyn Notifier>) -> Arc<Self> {
        Arc::new(Self {
            world: Mutex::new(world),
            catalog: Mutex::new(catalog),
            notifier: Mutex::new(notifier),
        })
    }
}

/// Reload behavior knobs.
#[derive(Clone, Debug)]
pub struct ReloadConfig {
    /// Quiet window after the last file event before a reload fires.
    pub debounce: Duration,
}

impl Default for ReloadConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(500),
        }
    }
}

/// Where a category currently is in its reload cycle.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ReloadPhase {
    /// Nothing pending.
    #[default]
    Idle,
    /// A change was seen; the debounce timer is running.
    Pending,
    /// A reload is in progress.
    Reloading,
}

struct TimerHandle {
    cancel: Arc<AtomicBool>,
}

struct Inner {
    loader: SourceLoader,
    config: ReloadConfig,
    shared: Arc<SharedState>,
    permissions: Arc<dyn Permissions>,
    enabled: AtomicBool,
    shutdown: AtomicBool,
    reload_locks: HashMap<SourceCategory, Mutex<()>>,
    phases: Mutex<HashMap<SourceCategory, ReloadPhase>>,
    timers: Mutex<HashMap<SourceCategory, TimerHandle>>,
}

/// Watches a source tree and reloads changed categories after a quiet
/// window.
pub struct ReloadCoordinator {
    inner: Arc<Inner>,
    watcher: Option<RecommendedWatcher>,
}

impl ReloadCoordinator {
    /// Creates a coordinator with the default configuration.
    ///
    /// Watching starts disarmed; call [`watch`] to start reacting to
    /// filesystem changes. Manual reloads work regardless.
    ///
    /// [`watch`]: Self::watch
    #[must_use]
    pub fn new(
        loader: SourceLoader,
        shared: Arc<SharedState>,
        permissions: Arc<dyn Permissions>,
    ) -> Self {
        Self::with_config(loader, shared, permissions, ReloadConfig::default())
    }

    /// Creates a coordinator with an explicit configuration.
    #[must_use]
    pub fn with_config(
        loader: SourceLoader,
        shared: Arc<SharedState>,
        permissions: Arc<dyn Permissions>,
        config: ReloadConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                loader,
                config,
                shared,
                permissions,
                enabled: AtomicBool::new(false),
                shutdown: AtomicBool::new(false),
                reload_locks: SourceCategory::ALL
                    .into_iter()
                    .map(|category| (category, Mutex::new(())))
                    .collect(),
                phases: Mutex::new(HashMap::new()),
                timers: Mutex::new(HashMap::new()),
            }),
            watcher: None,
        }
    }

    /// Starts the filesystem watcher over the source tree and arms
    /// automatic reloads.
    pub fn watch(&mut self) -> Result<()> {
        if self.watcher.is_some() {
            self.enable();
            return Ok(());
        }
        let inner = Arc::clone(&self.inner);
        let root = self.inner.loader.root().to_path_buf();
        let mut watcher =
            notify::recommended_watcher(move |event: notify::Result<Event>| {
                let Ok(event) = event else { return };
                if !matches!(
                    event.kind,
                    EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
                ) {
                    return;
                }
                for path in &event.paths {
                    if let Some(category) = SourceCategory::of_path(&root, path) {
                        inner.file_event(category);
                    }
                }
            })
            .map_err(watch_error)?;
        watcher
            .watch(self.inner.loader.root(), RecursiveMode::Recursive)
            .map_err(watch_error)?;
        self.watcher = Some(watcher);
        self.enable();
        Ok(())
    }

    /// Arms automatic reloads.
    pub fn enable(&self) {
        self.inner.enabled.store(true, Ordering::SeqCst);
    }

    /// Disarms automatic reloads.
    ///
    /// Only future filesystem events are gated; a debounce timer that is
    /// already armed still fires its reload.
    pub fn disable(&self) {
        self.inner.enabled.store(false, Ordering::SeqCst);
    }

    /// Returns true if automatic reloads are armed.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.inner.enabled.load(Ordering::SeqCst)
    }

    /// Returns the reload phase of a category.
    #[must_use]
    pub fn phase(&self, category: SourceCategory) -> ReloadPhase {
        self.inner.phase(category)
    }

    /// Records a file event for a category, arming its debounce timer.
    ///
    /// The watcher calls this; it is public so transports without
    /// filesystem access (or tests) can feed events in directly.
    pub fn notify_change(&self, category: SourceCategory) {
        self.inner.file_event(category);
    }

    /// Reloads one category immediately.
    pub fn reload(&self, category: SourceCategory) -> Result<LoadSummary> {
        self.inner.perform_reload(category)
    }

    /// Reloads every category immediately.
    pub fn reload_all(&self) -> Result<LoadSummary> {
        let mut summary = LoadSummary::default();
        for category in SourceCategory::ALL {
            summary.absorb(self.inner.perform_reload(category)?);
        }
        Ok(summary)
    }

    /// Drops every handler, user-authored ones included, and loads the
    /// source tree from scratch.
    pub fn force_reload(&self) -> Result<LoadSummary> {
        let inner = &self.inner;
        let summary;
        {
            let _guards: Vec<_> = SourceCategory::ALL
                .iter()
                .map(|category| inner.reload_locks[category].lock())
                .collect();
            let mut world = inner.shared.world.lock();
            let mut catalog = inner.shared.catalog.lock();
            let mut notifier = inner.shared.notifier.lock();
            catalog.purge_all();
            summary = inner
                .loader
                .load_all(&mut world, &mut catalog, notifier.as_mut())?;
        }
        inner.announce("force reload", summary);
        Ok(summary)
    }

    /// Stops watching and cancels all pending reloads.
    ///
    /// Manual reloads remain legal after shutdown; only the automatic
    /// machinery is torn down.
    pub fn shutdown(&mut self) {
        self.watcher = None;
        self.inner.shutdown.store(true, Ordering::SeqCst);
        self.inner.enabled.store(false, Ordering::SeqCst);
        self.inner.cancel_timers();
        self.inner.phases.lock().clear();
    }
}

impl Drop for ReloadCoordinator {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl Inner {
    fn phase(&self, category: SourceCategory) -> ReloadPhase {
        self.phases
            .lock()
            .get(&category)
            .copied()
            .unwrap_or_default()
    }

    fn cancel_timers(&self) {
        let mut timers = self.timers.lock();
        for (_, timer) in timers.drain() {
            timer.cancel.store(true, Ordering::SeqCst);
        }
        let mut phases = self.phases.lock();
        for phase in phases.values_mut() {
            if *phase == ReloadPhase::Pending {
                *phase = ReloadPhase::Idle;
            }
        }
    }
}

impl Inner {
    /// Arms (or restarts) a category's debounce timer.
    ///
    /// Runs on `Arc<Self>` so the fired timer thread can perform the
    /// reload itself.
    fn file_event(self: &Arc<Self>, category: SourceCategory) {
        if !self.enabled.load(Ordering::SeqCst) || self.shutdown.load(Ordering::SeqCst) {
            return;
        }
        self.phases.lock().insert(category, ReloadPhase::Pending);

        let cancel = Arc::new(AtomicBool::new(false));
        {
            let mut timers = self.timers.lock();
            if let Some(old) = timers.insert(
                category,
                TimerHandle {
                    cancel: Arc::clone(&cancel),
                },
            ) {
                // A fresh event during the window restarts it.
                old.cancel.store(true, Ordering::SeqCst);
            }
        }

        let inner = Arc::clone(self);
        thread::spawn(move || {
            thread::sleep(inner.config.debounce);
            if cancel.load(Ordering::SeqCst) || inner.shutdown.load(Ordering::SeqCst) {
                return;
            }
            match inner.perform_reload(category) {
                Ok(summary) => {
                    tracing::info!(%category, %summary, "reload complete");
                }
                Err(err) => {
                    tracing::error!(%category, %err, "reload failed");
                }
            }
        });
    }
}

impl Inner {
    fn perform_reload(&self, category: SourceCategory) -> Result<LoadSummary> {
        self.phases.lock().insert(category, ReloadPhase::Reloading);
        let result;
        {
            let _guard = self.reload_locks[&category].lock();
            let mut world = self.shared.world.lock();
            let mut catalog = self.shared.catalog.lock();
            let mut notifier = self.shared.notifier.lock();
            if category == SourceCategory::Handlers {
                // Stale system-authored handlers go; user handlers stay.
                catalog.purge_system();
            }
            result = self.loader.load_category(
                category,
                &mut world,
                &mut catalog,
                notifier.as_mut(),
            );
        }
        // Back to Idle whether the load worked or not; a failed reload
        // must not wedge the category's state machine.
        self.phases.lock().insert(category, ReloadPhase::Idle);
        let summary = result?;
        self.announce(category.dir(), summary);
        Ok(summary)
    }

    /// Tells wizard-flagged connected actors what a reload did.
    ///
    /// Runs with no state locks held except the notifier's own.
    fn announce(&self, what: &str, summary: LoadSummary) {
        let mut notifier = self.shared.notifier.lock();
        let connected = notifier.connected();
        for actor in connected {
            if self.permissions.has_flag(actor, "wizard") {
                notifier.notify(actor, &format!("[{what}] {summary}"));
            }
        }
    }
}

fn watch_error(err: notify::Error) -> Error {
    Error::new(ErrorKind::Internal(format!("watcher: {err}")))
}
