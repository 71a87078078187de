//! Booting a world from a source tree, then commanding it.

use std::fs;

use tempfile::TempDir;
use thistle_engine::{Catalog, DispatchOutcome, Dispatcher};
use thistle_foundation::{ObjectId, Value};
use thistle_reload::{LoadSummary, SourceLoader};
use thistle_world::{BufferNotifier, World};

fn tree(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (rel, content) in files {
        let path = dir.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
    dir
}

fn boot(dir: &TempDir) -> (World, Catalog, LoadSummary) {
    let mut world = World::new(0);
    let mut catalog = Catalog::new();
    let mut notifier = BufferNotifier::new();
    let loader = SourceLoader::new(dir.path());
    let summary = loader
        .load_all(&mut world, &mut catalog, &mut notifier)
        .unwrap();
    (world, catalog, summary)
}

fn command(
    world: &mut World,
    catalog: &Catalog,
    actor: ObjectId,
    input: &str,
) -> (DispatchOutcome, Vec<String>) {
    let mut notifier = BufferNotifier::new();
    let outcome = Dispatcher::new()
        .dispatch(world, catalog, &mut notifier, actor, input)
        .unwrap();
    let lines = notifier.lines.into_iter().map(|(_, l)| l).collect();
    (outcome, lines)
}

const WORLD: &str = r#"
(class "room")
(class "player")
(object "lobby" :class "room"
    :props {"description" "A dusty lobby."}
    :exits ["north"])
(object "garden" :class "room"
    :props {"description" "An overgrown garden."})
(object "alice" :class "player" :location "lobby")
"#;

const HANDLERS: &str = r#"
(verb "look" :on "room" :aliases ["l"]
    (say (get here "description")))
(verb "go" :system true :pattern "*"
    (say "you head " (nth tokens 1)))
"#;

#[test]
fn a_loaded_world_answers_commands() {
    let dir = tree(&[
        ("resources/world.th", WORLD),
        ("handlers/core.th", HANDLERS),
    ]);
    let (mut world, catalog, summary) = boot(&dir);
    assert_eq!(summary.classes, 2);
    assert_eq!(summary.objects, 3);
    assert_eq!(summary.verbs, 2);
    assert_eq!(summary.errors, 0);

    let alice = world.find_by_name("alice", None).unwrap();
    let (outcome, lines) = command(&mut world, &catalog, alice, "look");
    assert!(matches!(outcome, DispatchOutcome::Matched { .. }));
    assert_eq!(lines, ["A dusty lobby."]);

    // The alias came through the handler file too.
    let (_, lines) = command(&mut world, &catalog, alice, "l");
    assert_eq!(lines, ["A dusty lobby."]);
}

#[test]
fn loaded_exits_gate_movement_shorthand() {
    let dir = tree(&[
        ("resources/world.th", WORLD),
        ("handlers/core.th", HANDLERS),
    ]);
    let (mut world, catalog, _) = boot(&dir);
    let alice = world.find_by_name("alice", None).unwrap();

    let (_, lines) = command(&mut world, &catalog, alice, "n");
    assert_eq!(lines, ["you head north"]);

    let (outcome, _) = command(&mut world, &catalog, alice, "s");
    assert!(matches!(outcome, DispatchOutcome::NoMatch));
}

#[test]
fn setup_scripts_run_after_handlers() {
    let dir = tree(&[
        ("resources/world.th", WORLD),
        ("handlers/core.th", HANDLERS),
        (
            "scripts/setup.th",
            r#"(set! (call "system" "noop") "x" 1)"#,
        ),
        (
            "scripts/bless.th",
            r#"(set! system "blessed" true)"#,
        ),
    ]);
    let (world, _, summary) = boot(&dir);
    // bless.th ran; setup.th faulted and was counted, not fatal.
    assert_eq!(
        world.get_property(ObjectId::SYSTEM, "blessed").unwrap(),
        Value::Bool(true)
    );
    assert_eq!(summary.scripts, 1);
    assert_eq!(summary.errors, 1);
}

#[test]
fn a_bad_file_does_not_sink_its_neighbors() {
    let dir = tree(&[
        ("handlers/broken.th", "(verb \"oops\""),
        (
            "handlers/fine.th",
            r#"(verb "wave" :system true (say "you wave"))"#,
        ),
    ]);
    let (_, catalog, summary) = boot(&dir);
    assert_eq!(summary.verbs, 1);
    assert_eq!(summary.errors, 1);
    assert_eq!(catalog.verb_count(), 1);
}

#[test]
fn objects_land_in_their_declared_locations() {
    let dir = tree(&[("resources/world.th", WORLD)]);
    let (world, _, _) = boot(&dir);
    let lobby = world.find_by_name("lobby", None).unwrap();
    let alice = world.find_by_name("alice", None).unwrap();
    assert_eq!(world.location_of(alice), Some(lobby));
}
