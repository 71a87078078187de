//! Bounded handler execution.
//!
//! The [`Executor`] owns the mutable world for the duration of one
//! top-level command. It implements [`ScriptHost`], so handler bodies run
//! against it directly; nested `call` forms re-enter it with a depth
//! budget.
//!
//! Fault containment happens at call boundaries. An error inside a nested
//! handler never unwinds the caller: the actor is told about it and the
//! call yields nil. A handler that fails to *resolve* is quieter still,
//! yielding nil with no message at all.

use thistle_foundation::{ClassId, Error, ErrorKind, ObjectId, Result, ScriptLimit, Type, Value};
use thistle_script::{Interpreter, Limits, ScriptHost};
use thistle_world::{Notifier, World};

use crate::catalog::Catalog;
use crate::context::{ExecutionContext, Target};
use crate::record::{Function, Verb};
use crate::resolve::Resolver;

/// Maximum nested handler invocations below the top-level verb.
pub const MAX_CALL_DEPTH: u32 = 8;

/// What a nested call reference resolved to.
enum CalleeRoot {
    Object(ObjectId),
    Class(ClassId),
}

/// The handler a nested call found, cloned out of the catalog.
enum Callee {
    Function(Function),
    Verb(Verb),
}

/// Runs handler bodies for a single actor's command.
pub struct Executor<'a> {
    world: &'a mut World,
    catalog: &'a Catalog,
    notifier: &'a mut dyn Notifier,
    actor: ObjectId,
    call_depth: u32,
    limits: Limits,
}

impl<'a> Executor<'a> {
    /// Creates an executor with default evaluation limits.
    pub fn new(
        world: &'a mut World,
        catalog: &'a Catalog,
        notifier: &'a mut dyn Notifier,
        actor: ObjectId,
    ) -> Self {
        Self::with_limits(world, catalog, notifier, actor, Limits::default())
    }

    /// Creates an executor with explicit evaluation limits.
    pub fn with_limits(
        world: &'a mut World,
        catalog: &'a Catalog,
        notifier: &'a mut dyn Notifier,
        actor: ObjectId,
        limits: Limits,
    ) -> Self {
        Self {
            world,
            catalog,
            notifier,
            actor,
            call_depth: 0,
            limits,
        }
    }

    /// The actor this executor runs commands for.
    #[must_use]
    pub const fn actor(&self) -> ObjectId {
        self.actor
    }

    /// Runs a verb body in the given context.
    ///
    /// A bodyless verb is a declared-but-unwritten handler: the actor gets
    /// a placeholder message and the result is nil.
    pub fn run_verb(&mut self, verb: &Verb, context: &ExecutionContext) -> Result<Value> {
        if !verb.has_body() {
            let line = format!("Nothing happens; \"{}\" is not implemented yet.", verb.name);
            self.notifier.notify(self.actor, &line);
            return Ok(Value::Nil);
        }
        self.eval_body(&verb.name, &verb.body, context)
    }

    /// Runs a function with pre-checked arguments.
    ///
    /// Arity and per-parameter types are enforced before the body runs.
    /// The declared return type is advisory: a mismatch is logged and the
    /// value is returned anyway.
    pub fn call_function(
        &mut self,
        function: &Function,
        args: Vec<Value>,
        target: Target,
    ) -> Result<Value> {
        if args.len() != function.params.len() {
            return Err(Error::arity_mismatch(
                &function.name,
                function.params.len(),
                args.len(),
            ));
        }
        let mut params = Vec::with_capacity(args.len());
        for ((name, declared), value) in function.params.iter().zip(args) {
            if !declared.accepts(&value) {
                return Err(Error::type_mismatch(
                    name,
                    declared.clone(),
                    Type::of(&value),
                ));
            }
            params.push((name.clone(), value));
        }
        if !function.has_body() {
            return Ok(Value::Nil);
        }

        let context = ExecutionContext::builder(self.actor)
            .target(target)
            .here(self.world.location_of(self.actor))
            .params(params)
            .build();
        let result = self.eval_body(&function.name, &function.body, &context)?;
        if !function.returns.accepts(&result) {
            tracing::warn!(
                function = %function.name,
                declared = %function.returns,
                actual = %Type::of(&result),
                "return value does not match declared type"
            );
        }
        Ok(result)
    }

    /// Runs free-standing script source in the given context.
    ///
    /// The loader uses this for auxiliary script files; `name` labels
    /// faults the way a verb name would.
    pub fn run_script(
        &mut self,
        name: &str,
        source: &str,
        context: &ExecutionContext,
    ) -> Result<Value> {
        self.eval_body(name, source, context)
    }

    fn eval_body(&mut self, name: &str, body: &str, context: &ExecutionContext) -> Result<Value> {
        let mut env = context.bind();
        let limits = self.limits;
        let name = name.to_string();
        let mut interp = Interpreter::with_limits(self, limits);
        interp.eval_source(body, &mut env).map_err(|err| match err.kind {
            ErrorKind::LimitExceeded(_) => err,
            _ => Error::execution_fault(name, err.to_string()),
        })
    }

    fn invoke_nested(&mut self, target: Value, name: &str, args: Vec<Value>) -> Result<Value> {
        if self.call_depth >= MAX_CALL_DEPTH {
            return Err(Error::limit_exceeded(ScriptLimit::MaxCallDepth {
                limit: MAX_CALL_DEPTH,
            }));
        }
        let root = self.resolve_reference(&target)?;
        let Some((callee, run_target)) = self.resolve_callee(&root, name) else {
            // Resolution failure is an empty result, not a fault.
            return Ok(Value::Nil);
        };
        self.call_depth += 1;
        let result = self.run_callee(callee, run_target, args);
        self.call_depth -= 1;
        result
    }

    /// Resolves a symbolic call target to an object or class root.
    ///
    /// Accepts an object value directly, or a string: `"me"`, `"here"`,
    /// `"system"`, `"#42"`, `"$ClassName"`, or a free-text object name
    /// searched near the actor.
    fn resolve_reference(&self, target: &Value) -> Result<CalleeRoot> {
        match target {
            Value::Object(id) => {
                if self.world.exists(*id) {
                    Ok(CalleeRoot::Object(*id))
                } else {
                    Err(Error::reference_failure(id.to_string()))
                }
            }
            Value::Str(text) => self.resolve_str_reference(text),
            other => Err(Error::reference_failure(format!("{other}"))),
        }
    }

    fn resolve_str_reference(&self, text: &str) -> Result<CalleeRoot> {
        match text {
            "me" => return Ok(CalleeRoot::Object(self.actor)),
            "system" => return Ok(CalleeRoot::Object(ObjectId::SYSTEM)),
            "here" => {
                return self
                    .world
                    .location_of(self.actor)
                    .map(CalleeRoot::Object)
                    .ok_or_else(|| Error::reference_failure("here"));
            }
            _ => {}
        }
        if let Some(raw) = text.strip_prefix('#') {
            let id = raw
                .parse::<u64>()
                .map(ObjectId::new)
                .map_err(|_| Error::reference_failure(text))?;
            return if self.world.exists(id) {
                Ok(CalleeRoot::Object(id))
            } else {
                Err(Error::reference_failure(text))
            };
        }
        if let Some(class_name) = text.strip_prefix('$') {
            let class = self
                .world
                .find_class(class_name)
                .ok_or_else(|| Error::reference_failure(text))?;
            // Prefer a live instance; a class with none still hosts
            // handlers, they just run with no target.
            return Ok(match self.world.find_instance_of(class) {
                Some(id) => CalleeRoot::Object(id),
                None => CalleeRoot::Class(class),
            });
        }
        self.world
            .find_by_name(text, self.world.location_of(self.actor))
            .map(CalleeRoot::Object)
            .ok_or_else(|| Error::reference_failure(text))
    }

    fn resolve_callee(&self, root: &CalleeRoot, name: &str) -> Option<(Callee, Target)> {
        let resolver = Resolver::new(self.world, self.catalog);
        match *root {
            CalleeRoot::Object(id) => {
                if let Some((function, _)) = resolver.resolve_function(id, name) {
                    return Some((Callee::Function(function.clone()), Target::Object(id)));
                }
                resolver
                    .verbs_on_object(id, true)
                    .into_iter()
                    .find(|(v, _)| v.matches_name(name) || v.matches_alias(name))
                    .map(|(v, _)| (Callee::Verb(v.clone()), Target::Object(id)))
            }
            CalleeRoot::Class(class) => {
                if let Some((function, _)) = resolver.resolve_function_on_class(class, name) {
                    return Some((Callee::Function(function.clone()), Target::Missing));
                }
                resolver
                    .verbs_on_class(class)
                    .into_iter()
                    .find(|(v, _)| v.matches_name(name) || v.matches_alias(name))
                    .map(|(v, _)| (Callee::Verb(v.clone()), Target::Missing))
            }
        }
    }

    fn run_callee(&mut self, callee: Callee, target: Target, args: Vec<Value>) -> Result<Value> {
        match callee {
            Callee::Function(function) => self.call_function(&function, args, target),
            Callee::Verb(verb) => {
                if verb.is_admin() {
                    return Err(Error::privilege_violation(&verb.name));
                }
                let context = ExecutionContext::builder(self.actor)
                    .target(target)
                    .here(self.world.location_of(self.actor))
                    .tokens(vec![verb.name.clone()])
                    .params(vec![(
                        "args".to_string(),
                        Value::List(args.into_iter().collect()),
                    )])
                    .build();
                self.run_verb(&verb, &context)
            }
        }
    }
}

impl ScriptHost for Executor<'_> {
    fn get_property(&mut self, object: ObjectId, name: &str) -> Result<Value> {
        self.world.get_property(object, name)
    }

    fn set_property(&mut self, object: ObjectId, name: &str, value: Value) -> Result<()> {
        self.world.set_property(object, name, value)
    }

    fn location_of(&mut self, object: ObjectId) -> Result<Value> {
        Ok(self
            .world
            .location_of(object)
            .map_or(Value::Nil, Value::Object))
    }

    fn contents_of(&mut self, object: ObjectId) -> Result<Value> {
        Ok(Value::List(
            self.world
                .contents_of(object)
                .into_iter()
                .map(Value::Object)
                .collect(),
        ))
    }

    fn name_of(&mut self, object: ObjectId) -> Result<String> {
        Ok(self.world.name_of(object))
    }

    fn move_object(&mut self, object: ObjectId, dest: ObjectId) -> Result<()> {
        self.world.move_object(object, dest)
    }

    fn create_object(&mut self, class_name: &str) -> Result<ObjectId> {
        let class = self
            .world
            .find_class(class_name)
            .ok_or_else(|| Error::reference_failure(format!("${class_name}")))?;
        self.world.spawn(class)
    }

    fn notify(&mut self, actor: ObjectId, line: &str) -> Result<()> {
        self.notifier.notify(actor, line);
        Ok(())
    }

    fn call_handler(&mut self, target: Value, verb: &str, args: Vec<Value>) -> Result<Value> {
        match self.invoke_nested(target, verb, args) {
            Ok(value) => Ok(value),
            Err(err) => {
                let line = format!("Script error: {err}");
                self.notifier.notify(self.actor, &line);
                Ok(Value::Nil)
            }
        }
    }

    fn random_range(&mut self, low: i64, high: i64) -> Result<i64> {
        Ok(self.world.random_range(low, high))
    }
}
