//! User-authored handlers surviving a restart via snapshots.

use std::fs;

use tempfile::TempDir;
use thistle_engine::{Catalog, DispatchOutcome, Dispatcher, NewVerb, Owner, Provenance};
use thistle_foundation::ObjectId;
use thistle_reload::SourceLoader;
use thistle_runtime::{Snapshot, serialize};
use thistle_world::{BufferNotifier, World};

const WORLD: &str = r#"
(class "player")
(object "alice" :class "player")
"#;

const HANDLERS: &str = r#"
(verb "ping" :system true (say "pong"))
"#;

fn source_tree() -> TempDir {
    let dir = TempDir::new().unwrap();
    for (rel, content) in [
        ("resources/world.th", WORLD),
        ("handlers/core.th", HANDLERS),
    ] {
        let path = dir.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
    dir
}

fn boot(dir: &TempDir) -> (World, Catalog, ObjectId) {
    let mut world = World::new(0);
    let mut catalog = Catalog::new();
    let mut scratch = BufferNotifier::new();
    SourceLoader::new(dir.path())
        .load_all(&mut world, &mut catalog, &mut scratch)
        .unwrap();
    let alice = world.find_by_name("alice", None).unwrap();
    (world, catalog, alice)
}

#[test]
fn user_verbs_survive_a_restart() {
    let tree = source_tree();
    let snapshot_path = tree.path().join("handlers.msgpack");

    // First run: the user writes a verb at runtime, then the process
    // saves a snapshot on the way out.
    {
        let (_, mut catalog, _) = boot(&tree);
        catalog
            .add_verb(NewVerb::user(Owner::SYSTEM, "dance", "(say \"you dance\")"))
            .unwrap();
        let snapshot = Snapshot::capture(&catalog);
        serialize::save_to_file(&snapshot, &snapshot_path).unwrap();
    }

    // Second run: a fresh boot from the same sources plus the snapshot.
    let (mut world, mut catalog, alice) = boot(&tree);
    assert!(!catalog.has_verb(Owner::SYSTEM, "dance"));
    let restored = serialize::load_from_file(&snapshot_path)
        .unwrap()
        .restore(&mut catalog)
        .unwrap();
    assert_eq!(restored, 1);

    let mut notifier = BufferNotifier::new();
    let outcome = Dispatcher::new()
        .dispatch(&mut world, &catalog, &mut notifier, alice, "dance")
        .unwrap();
    assert!(matches!(outcome, DispatchOutcome::Matched { .. }));
    assert_eq!(notifier.lines_for(alice), vec!["you dance"]);
}

#[test]
fn snapshots_ignore_source_authored_handlers() {
    let tree = source_tree();
    let (_, catalog, _) = boot(&tree);
    // Everything so far came from the source tree.
    assert!(catalog.verb_count() > 0);
    let snapshot = Snapshot::capture(&catalog);
    assert!(snapshot.is_empty());
}

#[test]
fn restore_is_idempotent() {
    let tree = source_tree();
    let (_, mut catalog, _) = boot(&tree);
    catalog
        .add_verb(NewVerb::user(Owner::SYSTEM, "dance", "(say \"you dance\")"))
        .unwrap();
    let snapshot = Snapshot::capture(&catalog);

    assert_eq!(snapshot.restore(&mut catalog).unwrap(), 0);
    assert_eq!(catalog.count_by_provenance(Provenance::User), 1);
}
