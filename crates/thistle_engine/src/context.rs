//! Call-scoped execution context.
//!
//! Every handler invocation gets a fresh context naming who acted, what was
//! acted on, where it happened, and what the input carried. [`bind`] turns
//! the context into the root scope a handler body evaluates in.
//!
//! [`bind`]: ExecutionContext::bind

use thistle_foundation::{ObjectId, Value};
use thistle_script::Env;

/// The object a handler runs against.
///
/// Resolution can succeed without a concrete target (a system verb matched
/// by pattern alone, say). That is an ordinary state, not an error, so it
/// gets its own variant instead of a placeholder object id.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Target {
    /// The handler runs against this object; `this` binds to it.
    Object(ObjectId),
    /// No concrete target; `this` binds to nil.
    Missing,
}

impl Target {
    /// Returns the object id, if there is one.
    #[must_use]
    pub const fn object(self) -> Option<ObjectId> {
        match self {
            Self::Object(id) => Some(id),
            Self::Missing => None,
        }
    }

    /// The value `this` binds to.
    #[must_use]
    pub fn to_value(self) -> Value {
        match self {
            Self::Object(id) => Value::Object(id),
            Self::Missing => Value::Nil,
        }
    }
}

impl From<ObjectId> for Target {
    fn from(id: ObjectId) -> Self {
        Self::Object(id)
    }
}

/// The environment a single handler invocation runs in.
#[derive(Clone, Debug)]
pub struct ExecutionContext {
    /// The object that initiated the action.
    pub actor: ObjectId,
    /// The object the handler is attached to, if any.
    pub target: Target,
    /// The actor's location at dispatch time.
    pub here: Option<ObjectId>,
    /// The tokenized input that triggered the handler.
    pub tokens: Vec<String>,
    /// Variables captured by the verb's pattern.
    pub variables: Vec<(String, String)>,
    /// Typed function arguments, already arity- and type-checked.
    pub params: Vec<(String, Value)>,
}

impl ExecutionContext {
    /// Starts building a context for the given actor.
    #[must_use]
    pub fn builder(actor: ObjectId) -> ContextBuilder {
        ContextBuilder {
            context: Self {
                actor,
                target: Target::Missing,
                here: None,
                tokens: Vec::new(),
                variables: Vec::new(),
                params: Vec::new(),
            },
        }
    }

    /// Builds the root scope for a handler body.
    ///
    /// Binds `this`, `me`, `here`, `system`, and `tokens`, then the
    /// pattern captures as strings, then the typed parameters. Parameters
    /// bind last and shadow a capture with the same name.
    #[must_use]
    pub fn bind(&self) -> Env {
        let mut env = Env::new();
        env.define("this", self.target.to_value());
        env.define("me", Value::Object(self.actor));
        env.define(
            "here",
            self.here.map_or(Value::Nil, Value::Object),
        );
        env.define("system", Value::Object(ObjectId::SYSTEM));
        env.define(
            "tokens",
            Value::List(self.tokens.iter().map(|t| Value::from(t.as_str())).collect()),
        );
        for (name, text) in &self.variables {
            env.define(name.clone(), Value::from(text.as_str()));
        }
        for (name, value) in &self.params {
            env.define(name.clone(), value.clone());
        }
        env
    }
}

/// Builder for [`ExecutionContext`].
#[derive(Clone, Debug)]
pub struct ContextBuilder {
    context: ExecutionContext,
}

impl ContextBuilder {
    /// Sets the target object.
    #[must_use]
    pub fn target(mut self, target: impl Into<Target>) -> Self {
        self.context.target = target.into();
        self
    }

    /// Sets the actor's location.
    #[must_use]
    pub fn here(mut self, here: Option<ObjectId>) -> Self {
        self.context.here = here;
        self
    }

    /// Sets the tokenized input.
    #[must_use]
    pub fn tokens(mut self, tokens: Vec<String>) -> Self {
        self.context.tokens = tokens;
        self
    }

    /// Sets the pattern-captured variables.
    #[must_use]
    pub fn variables(mut self, variables: Vec<(String, String)>) -> Self {
        self.context.variables = variables;
        self
    }

    /// Sets the typed function parameters.
    #[must_use]
    pub fn params(mut self, params: Vec<(String, Value)>) -> Self {
        self.context.params = params;
        self
    }

    /// Finishes the build.
    #[must_use]
    pub fn build(self) -> ExecutionContext {
        self.context
    }
}
