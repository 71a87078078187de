//! Tree-walking interpreter for handler bodies.
//!
//! Evaluation is bounded: every node evaluated counts against a step
//! budget, and expression nesting is depth-limited. Either limit firing
//! aborts the body with a limit error instead of letting a runaway script
//! hold its serving thread.

use thistle_foundation::{Error, ErrorKind, ObjectId, Result, ScriptLimit, Value};

use crate::ast::Ast;
use crate::env::Env;
use crate::host::ScriptHost;
use crate::native;
use crate::parser::Parser;

/// Evaluation limits.
#[derive(Copy, Clone, Debug)]
pub struct Limits {
    /// Maximum nodes evaluated per body.
    pub max_steps: u64,
    /// Maximum expression nesting depth.
    pub max_depth: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_steps: 100_000,
            max_depth: 64,
        }
    }
}

/// Tree-walking interpreter bound to a [`ScriptHost`].
pub struct Interpreter<'h> {
    host: &'h mut dyn ScriptHost,
    limits: Limits,
    steps: u64,
}

impl<'h> Interpreter<'h> {
    /// Creates an interpreter with default limits.
    pub fn new(host: &'h mut dyn ScriptHost) -> Self {
        Self::with_limits(host, Limits::default())
    }

    /// Creates an interpreter with explicit limits.
    pub fn with_limits(host: &'h mut dyn ScriptHost, limits: Limits) -> Self {
        Self {
            host,
            limits,
            steps: 0,
        }
    }

    /// Parses and evaluates source text as an implicit `do` block.
    pub fn eval_source(&mut self, source: &str, env: &mut Env) -> Result<Value> {
        let forms = Parser::parse_all(source)?;
        let mut result = Value::Nil;
        for form in &forms {
            result = self.eval(form, env)?;
        }
        Ok(result)
    }

    /// Evaluates a single form.
    pub fn eval(&mut self, ast: &Ast, env: &mut Env) -> Result<Value> {
        self.eval_at(ast, env, 0)
    }

    fn eval_at(&mut self, ast: &Ast, env: &mut Env, depth: u32) -> Result<Value> {
        self.steps += 1;
        if self.steps > self.limits.max_steps {
            return Err(Error::limit_exceeded(ScriptLimit::MaxSteps {
                limit: self.limits.max_steps,
            }));
        }
        if depth > self.limits.max_depth {
            return Err(Error::limit_exceeded(ScriptLimit::MaxDepth {
                limit: self.limits.max_depth,
            }));
        }

        match ast {
            Ast::Nil(_) => Ok(Value::Nil),
            Ast::Bool(b, _) => Ok(Value::Bool(*b)),
            Ast::Int(n, _) => Ok(Value::Int(*n)),
            Ast::Float(n, _) => Ok(Value::Float(*n)),
            Ast::Str(s, _) => Ok(Value::from(s.as_str())),
            // Keywords evaluate to their name, so `:name` works wherever a
            // property key string is expected.
            Ast::Keyword(k, _) => Ok(Value::from(k.as_str())),
            Ast::Object(n, _) => Ok(Value::Object(ObjectId::new(*n))),
            Ast::Symbol(name, _) => env
                .lookup(name)
                .ok_or_else(|| Error::undefined_symbol(name.clone())),
            Ast::Vector(items, _) => {
                let mut out = im::Vector::new();
                for item in items {
                    out.push_back(self.eval_at(item, env, depth + 1)?);
                }
                Ok(Value::List(out))
            }
            Ast::Map(_, span) => Err(Error::new(ErrorKind::ParseError {
                message: "map literals are only valid in definition files".to_string(),
                line: span.line,
                column: span.column,
            })),
            Ast::List(items, span) => {
                let Some(head) = items.first() else {
                    return Ok(Value::Nil);
                };
                let Some(name) = head.as_symbol() else {
                    return Err(Error::new(ErrorKind::ParseError {
                        message: "expected a symbol in call position".to_string(),
                        line: span.line,
                        column: span.column,
                    }));
                };
                self.eval_call(name, &items[1..], env, depth)
            }
        }
    }

    fn eval_call(&mut self, name: &str, args: &[Ast], env: &mut Env, depth: u32) -> Result<Value> {
        // Special forms first; they control their own evaluation order.
        match name {
            "if" => return self.form_if(args, env, depth),
            "when" => return self.form_when(args, env, depth),
            "do" => return self.form_do(args, env, depth),
            "let" => return self.form_let(args, env, depth),
            "and" => return self.form_and(args, env, depth),
            "or" => return self.form_or(args, env, depth),
            _ => {}
        }

        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval_at(arg, env, depth + 1)?);
        }

        if let Some(func) = native::lookup(name) {
            return func(&values);
        }
        self.host_call(name, values, env)
    }

    // --- Special forms ---

    fn form_if(&mut self, args: &[Ast], env: &mut Env, depth: u32) -> Result<Value> {
        if args.len() < 2 || args.len() > 3 {
            return Err(Error::arity_mismatch("if", 2, args.len()));
        }
        if self.eval_at(&args[0], env, depth + 1)?.is_truthy() {
            self.eval_at(&args[1], env, depth + 1)
        } else if let Some(else_branch) = args.get(2) {
            self.eval_at(else_branch, env, depth + 1)
        } else {
            Ok(Value::Nil)
        }
    }

    fn form_when(&mut self, args: &[Ast], env: &mut Env, depth: u32) -> Result<Value> {
        let Some((cond, body)) = args.split_first() else {
            return Err(Error::arity_mismatch("when", 1, 0));
        };
        if self.eval_at(cond, env, depth + 1)?.is_truthy() {
            self.form_do(body, env, depth)
        } else {
            Ok(Value::Nil)
        }
    }

    fn form_do(&mut self, args: &[Ast], env: &mut Env, depth: u32) -> Result<Value> {
        let mut result = Value::Nil;
        for form in args {
            result = self.eval_at(form, env, depth + 1)?;
        }
        Ok(result)
    }

    fn form_let(&mut self, args: &[Ast], env: &mut Env, depth: u32) -> Result<Value> {
        let Some((bindings, body)) = args.split_first() else {
            return Err(Error::arity_mismatch("let", 2, args.len()));
        };
        let Some(pairs) = bindings.as_vector() else {
            return Err(Error::new(ErrorKind::ParseError {
                message: "let expects a binding vector".to_string(),
                line: bindings.span().line,
                column: bindings.span().column,
            }));
        };
        if pairs.len() % 2 != 0 {
            return Err(Error::new(ErrorKind::ParseError {
                message: "let binding vector must pair names with values".to_string(),
                line: bindings.span().line,
                column: bindings.span().column,
            }));
        }
        env.push();
        let result = (|| {
            for pair in pairs.chunks(2) {
                let Some(name) = pair[0].as_symbol() else {
                    return Err(Error::new(ErrorKind::ParseError {
                        message: "let binding name must be a symbol".to_string(),
                        line: pair[0].span().line,
                        column: pair[0].span().column,
                    }));
                };
                let value = self.eval_at(&pair[1], env, depth + 1)?;
                env.define(name, value);
            }
            self.form_do(body, env, depth)
        })();
        env.pop();
        result
    }

    fn form_and(&mut self, args: &[Ast], env: &mut Env, depth: u32) -> Result<Value> {
        let mut result = Value::Bool(true);
        for form in args {
            result = self.eval_at(form, env, depth + 1)?;
            if !result.is_truthy() {
                return Ok(result);
            }
        }
        Ok(result)
    }

    fn form_or(&mut self, args: &[Ast], env: &mut Env, depth: u32) -> Result<Value> {
        for form in args {
            let result = self.eval_at(form, env, depth + 1)?;
            if result.is_truthy() {
                return Ok(result);
            }
        }
        Ok(Value::Nil)
    }

    // --- Host builtins ---

    fn host_call(&mut self, name: &str, mut args: Vec<Value>, env: &Env) -> Result<Value> {
        match name {
            "say" => {
                let actor = env
                    .lookup("me")
                    .and_then(|v| v.as_object())
                    .ok_or_else(|| Error::reference_failure("me"))?;
                let line = join_text(&args);
                self.host.notify(actor, &line)?;
                Ok(Value::Nil)
            }
            "tell" => {
                if args.is_empty() {
                    return Err(Error::arity_mismatch("tell", 2, 0));
                }
                let target = want_object("tell", &args[0])?;
                let line = join_text(&args[1..]);
                self.host.notify(target, &line)?;
                Ok(Value::Nil)
            }
            "get" => {
                want_exact("get", &args, 2)?;
                let object = want_object("get", &args[0])?;
                let prop = want_str("get", &args[1])?;
                self.host.get_property(object, &prop)
            }
            "set!" => {
                want_exact("set!", &args, 3)?;
                let object = want_object("set!", &args[0])?;
                let prop = want_str("set!", &args[1])?;
                let value = args.pop().unwrap_or(Value::Nil);
                self.host.set_property(object, &prop, value)?;
                Ok(Value::Nil)
            }
            "name" => {
                want_exact("name", &args, 1)?;
                let object = want_object("name", &args[0])?;
                self.host.name_of(object).map(Value::from)
            }
            "location" => {
                want_exact("location", &args, 1)?;
                let object = want_object("location", &args[0])?;
                self.host.location_of(object)
            }
            "contents" => {
                want_exact("contents", &args, 1)?;
                let object = want_object("contents", &args[0])?;
                self.host.contents_of(object)
            }
            "move!" => {
                want_exact("move!", &args, 2)?;
                let object = want_object("move!", &args[0])?;
                let dest = want_object("move!", &args[1])?;
                self.host.move_object(object, dest)?;
                Ok(Value::Nil)
            }
            "create!" => {
                want_exact("create!", &args, 1)?;
                let class = want_str("create!", &args[0])?;
                self.host.create_object(&class).map(Value::Object)
            }
            "call" => {
                if args.len() < 2 {
                    return Err(Error::arity_mismatch("call", 2, args.len()));
                }
                let rest = args.split_off(2);
                let verb = want_str("call", &args[1])?;
                let target = args.swap_remove(0);
                self.host.call_handler(target, &verb, rest)
            }
            "random" => {
                want_exact("random", &args, 2)?;
                let low = want_int("random", &args[0])?;
                let high = want_int("random", &args[1])?;
                self.host.random_range(low, high).map(Value::Int)
            }
            _ => Err(Error::undefined_symbol(name)),
        }
    }
}

fn join_text(args: &[Value]) -> String {
    args.iter()
        .filter(|v| !v.is_nil())
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("")
}

fn want_exact(name: &str, args: &[Value], expected: usize) -> Result<()> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(Error::arity_mismatch(name, expected, args.len()))
    }
}

fn want_object(name: &str, value: &Value) -> Result<ObjectId> {
    value
        .as_object()
        .ok_or_else(|| Error::reference_failure(format!("{name}: {value} is not an object")))
}

fn want_str(name: &str, value: &Value) -> Result<String> {
    value
        .as_str()
        .map(ToString::to_string)
        .ok_or_else(|| Error::reference_failure(format!("{name}: {value} is not a string")))
}

fn want_int(name: &str, value: &Value) -> Result<i64> {
    value
        .as_int()
        .ok_or_else(|| Error::reference_failure(format!("{name}: {value} is not an integer")))
}
