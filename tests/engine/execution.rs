//! Handler execution through a full command: world mutation, nested
//! calls, typed functions, and fault containment.

use thistle_engine::{
    Catalog, DispatchOutcome, Dispatcher, NewFunction, NewVerb, Owner, Provenance,
};
use thistle_foundation::{ObjectId, Type, Value};
use thistle_world::{BufferNotifier, World};

struct Fixture {
    world: World,
    catalog: Catalog,
    notifier: BufferNotifier,
    actor: ObjectId,
}

fn fixture() -> Fixture {
    let mut world = World::new(11);
    let room_class = world.register_class("room", None);
    let player_class = world.register_class("player", None);
    let room = world.spawn(room_class).unwrap();
    let actor = world.spawn(player_class).unwrap();
    world.move_object(actor, room).unwrap();
    Fixture {
        world,
        catalog: Catalog::new(),
        notifier: BufferNotifier::new(),
        actor,
    }
}

fn run(f: &mut Fixture, input: &str) -> DispatchOutcome {
    Dispatcher::new()
        .dispatch(&mut f.world, &f.catalog, &mut f.notifier, f.actor, input)
        .unwrap()
}

#[test]
fn verbs_mutate_the_world() {
    let mut f = fixture();
    f.catalog
        .add_verb(NewVerb::system(
            Owner::SYSTEM,
            "meditate",
            "(set! me \"calm\" true)",
        ))
        .unwrap();
    run(&mut f, "meditate");
    assert_eq!(
        f.world.get_property(f.actor, "calm").unwrap(),
        Value::Bool(true)
    );
}

#[test]
fn missing_properties_read_as_nil() {
    let mut f = fixture();
    f.catalog
        .add_verb(NewVerb::system(
            Owner::SYSTEM,
            "check",
            "(if (get me \"title\") (say \"titled\") (say \"untitled\"))",
        ))
        .unwrap();
    run(&mut f, "check");
    assert_eq!(f.notifier.lines_for(f.actor), vec!["untitled"]);
}

#[test]
fn verbs_call_typed_functions() {
    let mut f = fixture();
    f.catalog.add_function(NewFunction {
        owner: Owner::SYSTEM,
        name: "double".to_string(),
        params: vec![("amount".to_string(), Type::Int)],
        returns: Type::Int,
        body: "(* amount 2)".to_string(),
        provenance: Provenance::System,
    });
    f.catalog
        .add_verb(NewVerb::system(
            Owner::SYSTEM,
            "score",
            "(say (str (call \"system\" \"double\" 21)))",
        ))
        .unwrap();
    run(&mut f, "score");
    assert_eq!(f.notifier.lines_for(f.actor), vec!["42"]);
}

#[test]
fn bad_function_arguments_are_contained() {
    let mut f = fixture();
    f.catalog.add_function(NewFunction {
        owner: Owner::SYSTEM,
        name: "double".to_string(),
        params: vec![("amount".to_string(), Type::Int)],
        returns: Type::Int,
        body: "(* amount 2)".to_string(),
        provenance: Provenance::System,
    });
    f.catalog
        .add_verb(NewVerb::system(
            Owner::SYSTEM,
            "score",
            "(say (str (call \"system\" \"double\" \"lots\")))",
        ))
        .unwrap();
    // The type mismatch is contained at the call site: the actor hears
    // about it and the outer verb keeps running with a nil result.
    let outcome = run(&mut f, "score");
    assert!(matches!(outcome, DispatchOutcome::Matched { .. }));
    let lines = f.notifier.lines_for(f.actor);
    assert!(lines[0].contains("Script error"));
}

#[test]
fn admin_verbs_run_from_top_level_input_only() {
    let mut f = fixture();
    f.catalog
        .add_verb(NewVerb::system(Owner::SYSTEM, "@wipe", "(say \"wiped\")"))
        .unwrap();
    f.catalog
        .add_verb(NewVerb::system(
            Owner::SYSTEM,
            "sneak",
            "(call \"system\" \"@wipe\")",
        ))
        .unwrap();

    run(&mut f, "@wipe");
    assert_eq!(f.notifier.lines_for(f.actor), vec!["wiped"]);

    let mut f = fixture();
    f.catalog
        .add_verb(NewVerb::system(Owner::SYSTEM, "@wipe", "(say \"wiped\")"))
        .unwrap();
    f.catalog
        .add_verb(NewVerb::system(
            Owner::SYSTEM,
            "sneak",
            "(call \"system\" \"@wipe\")",
        ))
        .unwrap();
    run(&mut f, "sneak");
    let lines = f.notifier.lines_for(f.actor);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("Script error"));
}

#[test]
fn created_objects_join_the_actor_location() {
    let mut f = fixture();
    f.world.register_class("token", None);
    f.catalog
        .add_verb(NewVerb::system(
            Owner::SYSTEM,
            "conjure",
            "(move! (create! \"token\") here)",
        ))
        .unwrap();
    let before = f.world.object_count();
    run(&mut f, "conjure");
    assert_eq!(f.world.object_count(), before + 1);
    let here = f.world.location_of(f.actor).unwrap();
    assert_eq!(f.world.contents_of(here).len(), 2);
}

#[test]
fn handler_faults_surface_from_dispatch() {
    let mut f = fixture();
    f.catalog
        .add_verb(NewVerb::system(Owner::SYSTEM, "glitch", "(+ 1 missing)"))
        .unwrap();
    let err = Dispatcher::new()
        .dispatch(&mut f.world, &f.catalog, &mut f.notifier, f.actor, "glitch")
        .unwrap_err();
    assert!(format!("{err}").contains("glitch"));
}

#[test]
fn random_range_is_deterministic_per_seed() {
    let mut a = fixture();
    let mut b = fixture();
    for f in [&mut a, &mut b] {
        f.catalog
            .add_verb(NewVerb::system(
                Owner::SYSTEM,
                "roll",
                "(say (str (random 1 6)))",
            ))
            .unwrap();
        run(f, "roll");
    }
    assert_eq!(
        a.notifier.lines_for(a.actor),
        b.notifier.lines_for(b.actor)
    );
}
