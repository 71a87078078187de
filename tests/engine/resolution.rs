//! Verb resolution across the inheritance chain.

use thistle_engine::{Catalog, DefinitionSource, NewVerb, Owner, Resolver};
use thistle_foundation::ObjectId;
use thistle_world::World;

struct Fixture {
    world: World,
    catalog: Catalog,
    sword: ObjectId,
}

/// A three-level chain: thing -> weapon -> sword instance, plus system
/// verbs on object #0.
fn fixture() -> Fixture {
    let mut world = World::new(1);
    let thing = world.register_class("thing", None);
    let weapon = world.register_class("weapon", Some(thing));
    let sword = world.spawn(weapon).unwrap();

    let mut catalog = Catalog::new();
    catalog
        .add_verb(NewVerb::system(Owner::Class(thing), "examine", "\"generic\""))
        .unwrap();
    catalog
        .add_verb(NewVerb::system(Owner::Class(weapon), "wield", "\"weapon\""))
        .unwrap();
    catalog
        .add_verb(NewVerb::system(Owner::SYSTEM, "examine", "\"system\""))
        .unwrap();
    catalog
        .add_verb(NewVerb::system(Owner::SYSTEM, "help", "\"system help\""))
        .unwrap();

    Fixture {
        world,
        catalog,
        sword,
    }
}

fn tokens(input: &str) -> Vec<String> {
    input.split_whitespace().map(str::to_string).collect()
}

#[test]
fn class_verb_is_visible_on_instances() {
    let f = fixture();
    let resolver = Resolver::new(&f.world, &f.catalog);
    let hit = resolver.resolve_verb(f.sword, &tokens("wield")).unwrap();
    assert_eq!(hit.verb.body, "\"weapon\"");
}

#[test]
fn nearest_definition_shadows_the_rest() {
    let f = fixture();
    let resolver = Resolver::new(&f.world, &f.catalog);
    // "examine" exists on thing and on the system object; the class copy
    // is nearer.
    let hit = resolver.resolve_verb(f.sword, &tokens("examine")).unwrap();
    assert_eq!(hit.verb.body, "\"generic\"");
    assert!(matches!(hit.source, DefinitionSource::Class(_)));
}

#[test]
fn instance_verb_shadows_its_class() {
    let mut f = fixture();
    f.catalog
        .add_verb(NewVerb::user(
            Owner::Object(f.sword),
            "examine",
            "\"this one\"",
        ))
        .unwrap();
    let resolver = Resolver::new(&f.world, &f.catalog);
    let hit = resolver.resolve_verb(f.sword, &tokens("examine")).unwrap();
    assert_eq!(hit.source, DefinitionSource::Instance);
}

#[test]
fn system_verbs_are_merged_last() {
    let f = fixture();
    let resolver = Resolver::new(&f.world, &f.catalog);
    let hit = resolver.resolve_verb(f.sword, &tokens("help")).unwrap();
    assert_eq!(hit.source, DefinitionSource::System);
}

#[test]
fn aliases_resolve_like_names() {
    let mut f = fixture();
    f.catalog
        .add_verb(
            NewVerb::system(Owner::Object(f.sword), "sharpen", "\"shing\"").with_aliases("hone"),
        )
        .unwrap();
    let resolver = Resolver::new(&f.world, &f.catalog);
    let hit = resolver.resolve_verb(f.sword, &tokens("hone")).unwrap();
    assert_eq!(hit.verb.name, "sharpen");
}

#[test]
fn name_hit_with_pattern_miss_fails_outright() {
    let mut f = fixture();
    f.catalog
        .add_verb(
            NewVerb::system(Owner::Object(f.sword), "throw", "\"whoosh\"")
                .with_pattern("* at *"),
        )
        .unwrap();
    let resolver = Resolver::new(&f.world, &f.catalog);
    assert!(resolver.resolve_verb(f.sword, &tokens("throw sword at orc")).is_some());
    // The pattern rejects this shape; no fallback to another candidate.
    assert!(resolver.resolve_verb(f.sword, &tokens("throw sword")).is_none());
}

#[test]
fn wildcard_patterns_are_scanned_when_no_name_matches() {
    let mut f = fixture();
    f.catalog
        .add_verb(
            NewVerb::system(Owner::Object(f.sword), "offer", "\"deal\"")
                .with_pattern("give * to *"),
        )
        .unwrap();
    let resolver = Resolver::new(&f.world, &f.catalog);
    let hit = resolver
        .resolve_verb(f.sword, &tokens("give gold to guard"))
        .unwrap();
    assert_eq!(hit.verb.name, "offer");
}

#[test]
fn case_is_ignored_throughout() {
    let f = fixture();
    let resolver = Resolver::new(&f.world, &f.catalog);
    assert!(resolver.resolve_verb(f.sword, &tokens("WIELD")).is_some());
    assert!(resolver.resolve_verb(f.sword, &tokens("Examine")).is_some());
}
