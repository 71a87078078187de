//! Top-level command dispatch.
//!
//! One line of player input walks a fixed candidate order until something
//! claims it:
//!
//! 1. objects at the actor's location (excluding the actor),
//! 2. the location itself,
//! 3. the actor,
//! 4. the system object,
//! 5. a sweep of named-capture verbs across all of the above, matched
//!    against the whole input line,
//! 6. movement shorthand, when the input is a single direction token and
//!    the location lists it as an exit.
//!
//! Nothing claiming the input is not an error; the session decides what to
//! tell the player about it.

use thistle_foundation::{ObjectId, Result, Value};
use thistle_script::Limits;
use thistle_world::{Notifier, World};

use crate::catalog::Catalog;
use crate::context::{ExecutionContext, Target};
use crate::exec::Executor;
use crate::record::Verb;
use crate::resolve::Resolver;

/// What became of one line of input.
#[derive(Debug)]
pub enum DispatchOutcome {
    /// A verb claimed the input and ran.
    Matched {
        /// The name of the verb that ran.
        verb: String,
        /// The handler body's result value.
        result: Value,
    },
    /// No candidate claimed the input.
    NoMatch,
}

/// A resolution hit with everything cloned out of the catalog, so the
/// world can be borrowed mutably while the handler runs.
struct Hit {
    verb: Verb,
    target: Target,
    vars: Vec<(String, String)>,
    /// The tokens the handler sees; movement rewrites these.
    tokens: Vec<String>,
}

/// Routes raw input lines to handlers.
#[derive(Debug, Default, Clone, Copy)]
pub struct Dispatcher {
    limits: Limits,
}

impl Dispatcher {
    /// Creates a dispatcher with default evaluation limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a dispatcher with explicit evaluation limits.
    #[must_use]
    pub const fn with_limits(limits: Limits) -> Self {
        Self { limits }
    }

    /// Dispatches one line of input on behalf of an actor.
    ///
    /// Returns the outcome; handler faults propagate as errors for the
    /// session layer to render.
    pub fn dispatch(
        &self,
        world: &mut World,
        catalog: &Catalog,
        notifier: &mut dyn Notifier,
        actor: ObjectId,
        input: &str,
    ) -> Result<DispatchOutcome> {
        let tokens: Vec<String> = input.split_whitespace().map(str::to_string).collect();
        if tokens.is_empty() {
            return Ok(DispatchOutcome::NoMatch);
        }
        let here = world.location_of(actor);

        let hit = find_hit(world, catalog, actor, here, &tokens)
            .or_else(|| movement_hit(world, catalog, here, &tokens));
        let Some(hit) = hit else {
            return Ok(DispatchOutcome::NoMatch);
        };

        let context = ExecutionContext::builder(actor)
            .target(hit.target)
            .here(here)
            .tokens(hit.tokens)
            .variables(hit.vars)
            .build();
        let mut executor = Executor::with_limits(world, catalog, notifier, actor, self.limits);
        let result = executor.run_verb(&hit.verb, &context)?;
        Ok(DispatchOutcome::Matched {
            verb: hit.verb.name,
            result,
        })
    }
}

/// Orders the candidate objects for one dispatch.
fn candidates(world: &World, actor: ObjectId, here: Option<ObjectId>) -> Vec<ObjectId> {
    let mut out = Vec::new();
    if let Some(location) = here {
        out.extend(
            world
                .contents_of(location)
                .into_iter()
                .filter(|&id| id != actor),
        );
        out.push(location);
    }
    out.push(actor);
    out.push(ObjectId::SYSTEM);
    out
}

fn find_hit(
    world: &World,
    catalog: &Catalog,
    actor: ObjectId,
    here: Option<ObjectId>,
    tokens: &[String],
) -> Option<Hit> {
    let resolver = Resolver::new(world, catalog);
    let order = candidates(world, actor, here);

    for &candidate in &order {
        if let Some(hit) = resolver.resolve_verb(candidate, tokens) {
            return Some(Hit {
                verb: hit.verb.clone(),
                target: Target::Object(candidate),
                vars: hit.vars,
                tokens: tokens.to_vec(),
            });
        }
    }

    // Last resort: named-capture verbs get one pass over the whole line.
    let input = tokens.join(" ");
    for &candidate in &order {
        for (verb, _, pattern) in resolver.capture_verbs(candidate) {
            if let Some(vars) = pattern.matches(&input, tokens) {
                return Some(Hit {
                    verb: verb.clone(),
                    target: Target::Object(candidate),
                    vars,
                    tokens: tokens.to_vec(),
                });
            }
        }
    }
    None
}

/// Handles single-token movement input.
///
/// The token must name a direction (short or long form) listed in the
/// location's `exits` property; the hit rewrites the command to
/// `go <direction>` against the system object.
fn movement_hit(
    world: &World,
    catalog: &Catalog,
    here: Option<ObjectId>,
    tokens: &[String],
) -> Option<Hit> {
    let [token] = tokens else {
        return None;
    };
    let direction = expand_direction(token)?;
    let location = here?;
    if !exit_exists(world, location, direction) {
        return None;
    }
    let go_tokens = vec!["go".to_string(), direction.to_string()];
    let resolver = Resolver::new(world, catalog);
    let hit = resolver.resolve_verb(ObjectId::SYSTEM, &go_tokens)?;
    Some(Hit {
        verb: hit.verb.clone(),
        target: Target::Object(ObjectId::SYSTEM),
        vars: hit.vars,
        tokens: go_tokens,
    })
}

fn exit_exists(world: &World, location: ObjectId, direction: &str) -> bool {
    let Ok(Value::List(exits)) = world.get_property(location, "exits") else {
        return false;
    };
    exits.iter().any(|exit| {
        exit.as_str()
            .is_some_and(|name| name.eq_ignore_ascii_case(direction))
    })
}

/// Expands a direction token to its full name.
fn expand_direction(token: &str) -> Option<&'static str> {
    let full = match token.to_ascii_lowercase().as_str() {
        "n" | "north" => "north",
        "s" | "south" => "south",
        "e" | "east" => "east",
        "w" | "west" => "west",
        "ne" | "northeast" => "northeast",
        "nw" | "northwest" => "northwest",
        "se" | "southeast" => "southeast",
        "sw" | "southwest" => "southwest",
        "u" | "up" => "up",
        "d" | "down" => "down",
        _ => return None,
    };
    Some(full)
}
