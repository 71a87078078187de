//! Handler lookup across the inheritance chain.
//!
//! Resolution walks a fixed shadowing order: definitions on the object
//! itself, then its class chain nearest ancestor first, then (optionally)
//! the global system object. The first definition for a given name wins;
//! anything behind it is shadowed.
//!
//! A failed resolution is not an error. Callers get `None` and decide what
//! that means: the dispatcher moves to the next candidate object, a nested
//! call quietly yields nil.

use std::collections::HashMap;
use std::collections::HashSet;

use thistle_foundation::{ClassId, ObjectId};
use thistle_world::World;

use crate::catalog::Catalog;
use crate::pattern::Pattern;
use crate::record::{DefinitionSource, Function, Owner, Verb};

/// A verb resolution hit.
#[derive(Debug)]
pub struct MatchResult<'a> {
    /// The matched verb record.
    pub verb: &'a Verb,
    /// Where in the chain the verb was found.
    pub source: DefinitionSource,
    /// Variables captured by the verb's pattern, if any.
    pub vars: Vec<(String, String)>,
}

/// Read-only handler lookup over a world and catalog.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    world: &'a World,
    catalog: &'a Catalog,
}

impl<'a> Resolver<'a> {
    /// Creates a resolver over the given world and catalog.
    #[must_use]
    pub const fn new(world: &'a World, catalog: &'a Catalog) -> Self {
        Self { world, catalog }
    }

    /// Collects the verbs visible on an object, shadowing applied.
    ///
    /// Order: instance verbs, then each class in the chain nearest ancestor
    /// first, then the system object's verbs when `include_system` is set.
    /// Later definitions with a name already seen (case-insensitively) are
    /// dropped.
    #[must_use]
    pub fn verbs_on_object(
        &self,
        object: ObjectId,
        include_system: bool,
    ) -> Vec<(&'a Verb, DefinitionSource)> {
        let mut out: Vec<(&'a Verb, DefinitionSource)> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        let mut merge = |verbs: Vec<&'a Verb>, source: DefinitionSource| {
            for verb in dedup_owner_verbs(verbs) {
                if seen.insert(verb.name.to_lowercase()) {
                    out.push((verb, source));
                }
            }
        };

        merge(
            self.catalog.verbs_for(Owner::Object(object)),
            DefinitionSource::Instance,
        );
        if let Some(instance) = self.world.object(object) {
            for class in self.world.inheritance_chain(instance.class).iter().rev() {
                merge(
                    self.catalog.verbs_for(Owner::Class(*class)),
                    DefinitionSource::Class(*class),
                );
            }
        }
        if include_system && object != ObjectId::SYSTEM {
            merge(
                self.catalog.verbs_for(Owner::SYSTEM),
                DefinitionSource::System,
            );
        }
        out
    }

    /// Collects the verbs visible from a class, shadowing applied.
    ///
    /// Used when a nested call names a class with no live instance: the
    /// handler still runs, with no target. Order matches
    /// [`verbs_on_object`] minus the instance layer.
    ///
    /// [`verbs_on_object`]: Self::verbs_on_object
    #[must_use]
    pub fn verbs_on_class(&self, class: ClassId) -> Vec<(&'a Verb, DefinitionSource)> {
        let mut out: Vec<(&'a Verb, DefinitionSource)> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut merge = |verbs: Vec<&'a Verb>, source: DefinitionSource| {
            for verb in dedup_owner_verbs(verbs) {
                if seen.insert(verb.name.to_lowercase()) {
                    out.push((verb, source));
                }
            }
        };
        for ancestor in self.world.inheritance_chain(class).iter().rev() {
            merge(
                self.catalog.verbs_for(Owner::Class(*ancestor)),
                DefinitionSource::Class(*ancestor),
            );
        }
        merge(
            self.catalog.verbs_for(Owner::SYSTEM),
            DefinitionSource::System,
        );
        out
    }

    /// Resolves a function by name starting from a class.
    #[must_use]
    pub fn resolve_function_on_class(
        &self,
        class: ClassId,
        name: &str,
    ) -> Option<(&'a Function, DefinitionSource)> {
        for ancestor in self.world.inheritance_chain(class).iter().rev() {
            let hit = self
                .catalog
                .functions_for(Owner::Class(*ancestor))
                .into_iter()
                .find(|f| f.matches_name(name));
            if let Some(function) = hit {
                return Some((function, DefinitionSource::Class(*ancestor)));
            }
        }
        self.catalog
            .functions_for(Owner::SYSTEM)
            .into_iter()
            .find(|f| f.matches_name(name))
            .map(|f| (f, DefinitionSource::System))
    }

    /// Resolves a tokenized command against an object's visible verbs.
    ///
    /// The first token is tried as a verb name, then as an alias. When the
    /// matched verb declares a pattern, the pattern must also accept the
    /// input; a name hit with a pattern miss fails the whole lookup rather
    /// than falling through to a worse candidate. If no name matches and
    /// the command has more than one token, the remaining verbs are scanned
    /// by pattern alone.
    #[must_use]
    pub fn resolve_verb(&self, object: ObjectId, tokens: &[String]) -> Option<MatchResult<'a>> {
        let word = tokens.first()?;
        let input = tokens.join(" ");
        let candidates = self.verbs_on_object(object, true);

        let matchers: [fn(&Verb, &str) -> bool; 2] = [Verb::matches_name, Verb::matches_alias];
        for matcher in matchers {
            if let Some(&(verb, source)) = candidates.iter().find(|(v, _)| matcher(v, word)) {
                return check_pattern(verb, source, &input, &tokens[1..]);
            }
        }

        // No name hit. A multi-word command may still be claimed by a verb
        // on the strength of its wildcard pattern alone. Bare `*` is
        // excluded (it means "any arguments after my name" and is
        // meaningless without the name), and so are named captures, which
        // get their own last-resort sweep in the dispatcher.
        if tokens.len() > 1 {
            for (verb, source) in candidates {
                let Some(pattern) = compiled_pattern(verb) else {
                    continue;
                };
                if !matches!(pattern, Pattern::Wildcard(_)) {
                    continue;
                }
                if let Some(vars) = pattern.matches(&input, tokens) {
                    return Some(MatchResult { verb, source, vars });
                }
            }
        }
        None
    }

    /// Collects the named-capture verbs visible on an object.
    ///
    /// The dispatcher's last-resort sweep runs these against the whole
    /// input line after positional resolution has failed everywhere.
    #[must_use]
    pub fn capture_verbs(&self, object: ObjectId) -> Vec<(&'a Verb, DefinitionSource, Pattern)> {
        self.verbs_on_object(object, true)
            .into_iter()
            .filter_map(|(verb, source)| {
                let pattern = compiled_pattern(verb)?;
                pattern.is_capture().then_some((verb, source, pattern))
            })
            .collect()
    }

    /// Resolves a function by name across the inheritance chain.
    #[must_use]
    pub fn resolve_function(
        &self,
        object: ObjectId,
        name: &str,
    ) -> Option<(&'a Function, DefinitionSource)> {
        let find = |owner: Owner, source: DefinitionSource| {
            self.catalog
                .functions_for(owner)
                .into_iter()
                .find(|f| f.matches_name(name))
                .map(|f| (f, source))
        };

        if let Some(hit) = find(Owner::Object(object), DefinitionSource::Instance) {
            return Some(hit);
        }
        if let Some(instance) = self.world.object(object) {
            for class in self.world.inheritance_chain(instance.class).iter().rev() {
                if let Some(hit) = find(Owner::Class(*class), DefinitionSource::Class(*class)) {
                    return Some(hit);
                }
            }
        }
        if object != ObjectId::SYSTEM {
            return find(Owner::SYSTEM, DefinitionSource::System);
        }
        None
    }
}

/// Applies a resolved verb's pattern to the input, if it has one.
fn check_pattern<'a>(
    verb: &'a Verb,
    source: DefinitionSource,
    input: &str,
    remaining: &[String],
) -> Option<MatchResult<'a>> {
    match compiled_pattern(verb) {
        Some(pattern) => {
            let vars = pattern.matches(input, remaining)?;
            Some(MatchResult { verb, source, vars })
        }
        None => Some(MatchResult {
            verb,
            source,
            vars: Vec::new(),
        }),
    }
}

/// Compiles a verb's stored pattern, if it has one.
///
/// Patterns were validated on catalog insert, so a compile failure here
/// means the record was tampered with; it is treated as no pattern.
fn compiled_pattern(verb: &Verb) -> Option<Pattern> {
    let source = verb.pattern.as_deref()?;
    match Pattern::compile(source) {
        Ok(pattern) => Some(pattern),
        Err(err) => {
            tracing::warn!(verb = %verb.name, %err, "stored pattern failed to compile");
            None
        }
    }
}

/// Collapses duplicate names within a single owner's verb list.
///
/// When one owner carries several verbs with the same name, the first one
/// with a non-empty body wins; if all are bodyless, the first wins. The
/// collision is logged so the definition files can be fixed.
fn dedup_owner_verbs(verbs: Vec<&Verb>) -> Vec<&Verb> {
    let mut groups: HashMap<String, Vec<&Verb>> = HashMap::new();
    let mut order: Vec<String> = Vec::new();
    for verb in verbs {
        let key = verb.name.to_lowercase();
        if !groups.contains_key(&key) {
            order.push(key.clone());
        }
        groups.entry(key).or_default().push(verb);
    }
    order
        .into_iter()
        .map(|key| {
            let group = &groups[&key];
            if group.len() > 1 {
                tracing::warn!(
                    name = %group[0].name,
                    count = group.len(),
                    "duplicate verb definitions on one owner"
                );
            }
            group
                .iter()
                .copied()
                .find(|v| v.has_body())
                .unwrap_or(group[0])
        })
        .collect()
}
