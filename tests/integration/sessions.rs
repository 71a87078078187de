//! A small playable world, booted from source and driven by a session.

use std::fs;
use std::sync::Arc;

use parking_lot::Mutex;
use tempfile::TempDir;
use thistle_engine::Catalog;
use thistle_foundation::ObjectId;
use thistle_reload::{SharedState, SourceLoader};
use thistle_runtime::Session;
use thistle_world::{BufferNotifier, Notifier, World};

/// Notifier whose buffer outlives the shared-state box.
struct TappedNotifier(Arc<Mutex<Vec<(ObjectId, String)>>>);

impl Notifier for TappedNotifier {
    fn notify(&mut self, actor: ObjectId, line: &str) {
        self.0.lock().push((actor, line.to_string()));
    }

    fn connected(&self) -> Vec<ObjectId> {
        Vec::new()
    }
}

type Lines = Arc<Mutex<Vec<(ObjectId, String)>>>;

const WORLD: &str = r#"
(class "room")
(class "player")
(object "lobby" :class "room"
    :props {"description" "A dusty lobby."}
    :exits ["north"])
(object "garden" :class "room"
    :props {"description" "An overgrown garden."}
    :exits ["south"])
(object "alice" :class "player" :location "lobby")
"#;

const HANDLERS: &str = r#"
(verb "look" :on "room" :aliases ["l"]
    (say (get here "description")))
(verb "go" :system true :pattern "*"
    (let [dest (get here (nth tokens 1))]
        (when dest
            (move! me dest)
            (say "You go " (nth tokens 1) "."))))
"#;

// Object ids are deterministic: #0 system, then spawn order within the
// resource file.
const LINKS: &str = r#"
(set! #1 "north" #2)
(set! #2 "south" #1)
"#;

fn boot() -> (Session, Lines) {
    let dir = TempDir::new().unwrap();
    for (rel, content) in [
        ("resources/world.th", WORLD),
        ("handlers/core.th", HANDLERS),
        ("scripts/links.th", LINKS),
    ] {
        let path = dir.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    let mut world = World::new(0);
    let mut catalog = Catalog::new();
    let mut scratch = BufferNotifier::new();
    SourceLoader::new(dir.path())
        .load_all(&mut world, &mut catalog, &mut scratch)
        .unwrap();

    let alice = world.find_by_name("alice", None).unwrap();
    let lines: Lines = Arc::new(Mutex::new(Vec::new()));
    let shared = SharedState::new(
        world,
        catalog,
        Box::new(TappedNotifier(Arc::clone(&lines))),
    );
    (Session::new(shared, alice), lines)
}

fn heard(lines: &Lines) -> Vec<String> {
    let collected = lines.lock().iter().map(|(_, l)| l.clone()).collect();
    lines.lock().clear();
    collected
}

#[test]
fn looking_describes_the_current_room() {
    let (session, lines) = boot();
    session.execute("look").unwrap();
    assert_eq!(heard(&lines), ["A dusty lobby."]);
}

#[test]
fn movement_crosses_linked_rooms_and_back() {
    let (session, lines) = boot();

    session.execute("n").unwrap();
    assert_eq!(heard(&lines), ["You go north."]);

    session.execute("look").unwrap();
    assert_eq!(heard(&lines), ["An overgrown garden."]);

    session.execute("s").unwrap();
    session.execute("l").unwrap();
    assert_eq!(heard(&lines), ["You go south.", "A dusty lobby."]);
}

#[test]
fn exits_limit_where_the_session_can_go() {
    let (session, lines) = boot();
    // The lobby only lists north.
    session.execute("s").unwrap();
    let replies = heard(&lines);
    assert_eq!(replies.len(), 1);
    assert!(replies[0].starts_with("Huh?"));
}

#[test]
fn gibberish_earns_a_confused_reply() {
    let (session, lines) = boot();
    session.execute("transmogrify the lobby").unwrap();
    let replies = heard(&lines);
    assert_eq!(replies.len(), 1);
    assert!(replies[0].starts_with("Huh?"));
}

#[test]
fn actor_location_tracks_movement() {
    let (session, _lines) = boot();
    session.execute("n").unwrap();
    let world = session.shared().world.lock();
    let alice = session.actor();
    let garden = world.find_by_name("garden", None).unwrap();
    assert_eq!(world.location_of(alice), Some(garden));
}
