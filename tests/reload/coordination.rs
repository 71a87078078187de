//! Live reload through the coordinator, observed from a session.

use std::fs;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tempfile::TempDir;
use thistle_engine::{Catalog, NewVerb, Owner, Provenance};
use thistle_foundation::ObjectId;
use thistle_reload::{
    ReloadConfig, ReloadCoordinator, SharedState, SourceCategory, SourceLoader,
};
use thistle_runtime::Session;
use thistle_world::{BufferNotifier, Permissions, World};

struct NoWizards;

impl Permissions for NoWizards {
    fn has_flag(&self, _actor: ObjectId, _flag: &str) -> bool {
        false
    }
}

fn write_verb(dir: &TempDir, file: &str, name: &str, line: &str) {
    let path = dir.path().join("handlers").join(file);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(
        path,
        format!("(verb \"{name}\" :system true (say \"{line}\"))"),
    )
    .unwrap();
}

struct Stack {
    dir: TempDir,
    shared: Arc<SharedState>,
    coordinator: ReloadCoordinator,
    actor: ObjectId,
}

fn stack() -> Stack {
    let dir = TempDir::new().unwrap();
    write_verb(&dir, "core.th", "ping", "pong");

    let mut world = World::new(0);
    let player = world.register_class("player", None);
    let actor = world.spawn(player).unwrap();
    let mut catalog = Catalog::new();
    let mut notifier = BufferNotifier::new();
    let loader = SourceLoader::new(dir.path());
    loader
        .load_all(&mut world, &mut catalog, &mut notifier)
        .unwrap();

    let shared = SharedState::new(world, catalog, Box::new(BufferNotifier::new()));
    let coordinator = ReloadCoordinator::with_config(
        loader,
        Arc::clone(&shared),
        Arc::new(NoWizards),
        ReloadConfig {
            debounce: Duration::from_millis(20),
        },
    );
    Stack {
        dir,
        shared,
        coordinator,
        actor,
    }
}

#[test]
fn sessions_see_reloaded_bodies() {
    let stack = stack();
    let session = Session::new(Arc::clone(&stack.shared), stack.actor);
    session.execute("ping").unwrap();

    write_verb(&stack.dir, "core.th", "ping", "pong 2.0");
    stack.coordinator.reload(SourceCategory::Handlers).unwrap();

    session.execute("ping").unwrap();
    // Catalog now carries the rewritten body.
    let catalog = stack.shared.catalog.lock();
    let verb = catalog.verbs_for(Owner::SYSTEM)[0];
    assert!(verb.body.contains("pong 2.0"));
}

#[test]
fn user_handlers_survive_ordinary_reloads() {
    let stack = stack();
    {
        let mut catalog = stack.shared.catalog.lock();
        catalog
            .add_verb(NewVerb::user(Owner::SYSTEM, "dance", "(say \"you dance\")"))
            .unwrap();
    }

    stack.coordinator.reload(SourceCategory::Handlers).unwrap();
    let catalog = stack.shared.catalog.lock();
    assert!(catalog.has_verb(Owner::SYSTEM, "dance"));
    assert!(catalog.has_verb(Owner::SYSTEM, "ping"));
    assert_eq!(catalog.count_by_provenance(Provenance::User), 1);
}

#[test]
fn force_reload_starts_from_scratch() {
    let stack = stack();
    {
        let mut catalog = stack.shared.catalog.lock();
        catalog
            .add_verb(NewVerb::user(Owner::SYSTEM, "dance", "(say \"you dance\")"))
            .unwrap();
    }

    stack.coordinator.force_reload().unwrap();
    let catalog = stack.shared.catalog.lock();
    assert!(!catalog.has_verb(Owner::SYSTEM, "dance"));
    assert!(catalog.has_verb(Owner::SYSTEM, "ping"));
}

#[test]
fn change_events_reload_after_the_quiet_window() {
    let stack = stack();
    stack.coordinator.enable();

    write_verb(&stack.dir, "core.th", "ping", "pong 3.0");
    stack.coordinator.notify_change(SourceCategory::Handlers);

    // Nothing yet; the debounce window is still open.
    {
        let catalog = stack.shared.catalog.lock();
        assert!(!catalog.verbs_for(Owner::SYSTEM)[0].body.contains("3.0"));
    }

    thread::sleep(Duration::from_millis(200));
    let catalog = stack.shared.catalog.lock();
    assert!(catalog.verbs_for(Owner::SYSTEM)[0].body.contains("3.0"));
}

#[test]
fn events_are_ignored_while_disarmed() {
    let stack = stack();
    write_verb(&stack.dir, "core.th", "ping", "pong 4.0");
    stack.coordinator.notify_change(SourceCategory::Handlers);
    thread::sleep(Duration::from_millis(200));

    let catalog = stack.shared.catalog.lock();
    assert!(!catalog.verbs_for(Owner::SYSTEM)[0].body.contains("4.0"));
}
