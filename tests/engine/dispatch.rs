//! Free-text command dispatch over the room.

use thistle_engine::{Catalog, DispatchOutcome, Dispatcher, NewVerb, Owner};
use thistle_foundation::{ObjectId, Value};
use thistle_world::{BufferNotifier, World};

struct Fixture {
    world: World,
    catalog: Catalog,
    actor: ObjectId,
    room: ObjectId,
    lantern: ObjectId,
}

fn fixture() -> Fixture {
    let mut world = World::new(3);
    let room_class = world.register_class("room", None);
    let player_class = world.register_class("player", None);
    let item_class = world.register_class("item", None);

    let room = world.spawn(room_class).unwrap();
    let actor = world.spawn(player_class).unwrap();
    let lantern = world.spawn(item_class).unwrap();
    world.move_object(actor, room).unwrap();
    world.move_object(lantern, room).unwrap();
    world
        .set_property(lantern, "name", Value::from("lantern"))
        .unwrap();

    Fixture {
        world,
        catalog: Catalog::new(),
        actor,
        room,
        lantern,
    }
}

fn run(f: &mut Fixture, input: &str) -> (DispatchOutcome, Vec<String>) {
    let mut notifier = BufferNotifier::new();
    let outcome = Dispatcher::new()
        .dispatch(&mut f.world, &f.catalog, &mut notifier, f.actor, input)
        .unwrap();
    let lines = notifier
        .lines
        .into_iter()
        .map(|(_, line)| line)
        .collect();
    (outcome, lines)
}

// =============================================================================
// Candidate ordering
// =============================================================================

#[test]
fn room_contents_claim_commands_before_the_room() {
    let mut f = fixture();
    f.catalog
        .add_verb(NewVerb::system(
            Owner::Object(f.lantern),
            "light",
            "(say \"the lantern flares\")",
        ))
        .unwrap();
    f.catalog
        .add_verb(NewVerb::system(
            Owner::Object(f.room),
            "light",
            "(say \"the room brightens\")",
        ))
        .unwrap();

    let (outcome, lines) = run(&mut f, "light");
    assert!(matches!(outcome, DispatchOutcome::Matched { .. }));
    assert_eq!(lines, ["the lantern flares"]);
}

#[test]
fn the_room_claims_commands_before_the_actor() {
    let mut f = fixture();
    f.catalog
        .add_verb(NewVerb::system(
            Owner::Object(f.room),
            "shout",
            "(say \"it echoes\")",
        ))
        .unwrap();
    f.catalog
        .add_verb(NewVerb::system(
            Owner::Object(f.actor),
            "shout",
            "(say \"hoarse already\")",
        ))
        .unwrap();

    let (_, lines) = run(&mut f, "shout");
    assert_eq!(lines, ["it echoes"]);
}

#[test]
fn system_verbs_are_the_last_resort() {
    let mut f = fixture();
    f.catalog
        .add_verb(NewVerb::system(
            Owner::SYSTEM,
            "who",
            "(say \"just you\")",
        ))
        .unwrap();

    let (outcome, lines) = run(&mut f, "who");
    assert!(matches!(outcome, DispatchOutcome::Matched { .. }));
    assert_eq!(lines, ["just you"]);
}

#[test]
fn unclaimed_input_is_no_match() {
    let mut f = fixture();
    let (outcome, lines) = run(&mut f, "discombobulate");
    assert!(matches!(outcome, DispatchOutcome::NoMatch));
    assert!(lines.is_empty());
}

// =============================================================================
// Named captures
// =============================================================================

#[test]
fn capture_verbs_sweep_the_whole_line() {
    let mut f = fixture();
    f.catalog
        .add_verb(
            NewVerb::system(Owner::Object(f.room), "trade", "(say \"trading \" item)")
                .with_pattern("offer {item} to {person}"),
        )
        .unwrap();

    let (outcome, lines) = run(&mut f, "offer lantern to guard");
    assert!(matches!(outcome, DispatchOutcome::Matched { ref verb, .. } if verb == "trade"));
    assert_eq!(lines, ["trading lantern"]);
}

#[test]
fn capture_sweep_runs_only_after_names_fail() {
    let mut f = fixture();
    f.catalog
        .add_verb(
            NewVerb::system(Owner::Object(f.room), "trade", "(say \"captured\")")
                .with_pattern("offer {item} to {person}"),
        )
        .unwrap();
    f.catalog
        .add_verb(NewVerb::system(Owner::SYSTEM, "offer", "(say \"by name\")"))
        .unwrap();

    let (_, lines) = run(&mut f, "offer lantern to guard");
    assert_eq!(lines, ["by name"]);
}

// =============================================================================
// Movement
// =============================================================================

fn add_go_verb(catalog: &mut Catalog) {
    catalog
        .add_verb(
            NewVerb::system(Owner::SYSTEM, "go", "(say \"you go \" (nth tokens 1))")
                .with_pattern("*"),
        )
        .unwrap();
}

#[test]
fn direction_shorthand_rewrites_to_go() {
    let mut f = fixture();
    add_go_verb(&mut f.catalog);
    f.world
        .set_property(
            f.room,
            "exits",
            Value::List(["north", "up"].into_iter().map(Value::from).collect()),
        )
        .unwrap();

    let (outcome, lines) = run(&mut f, "n");
    assert!(matches!(outcome, DispatchOutcome::Matched { ref verb, .. } if verb == "go"));
    assert_eq!(lines, ["you go north"]);

    let (_, lines) = run(&mut f, "up");
    assert_eq!(lines, ["you go up"]);
}

#[test]
fn movement_requires_a_matching_exit() {
    let mut f = fixture();
    add_go_verb(&mut f.catalog);
    f.world
        .set_property(
            f.room,
            "exits",
            Value::List([Value::from("north")].into_iter().collect()),
        )
        .unwrap();

    let (outcome, _) = run(&mut f, "south");
    assert!(matches!(outcome, DispatchOutcome::NoMatch));
}

#[test]
fn movement_is_gated_on_having_a_location() {
    let mut f = fixture();
    add_go_verb(&mut f.catalog);
    // A freshly spawned actor floats nowhere; there is nothing to leave.
    let adrift = {
        let class = f.world.register_class("ghost", None);
        f.world.spawn(class).unwrap()
    };
    let mut notifier = BufferNotifier::new();
    let outcome = Dispatcher::new()
        .dispatch(&mut f.world, &f.catalog, &mut notifier, adrift, "n")
        .unwrap();
    assert!(matches!(outcome, DispatchOutcome::NoMatch));
}
