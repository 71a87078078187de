//! Definition-file loading.
//!
//! A source tree has three subdirectories, loaded in a fixed order:
//!
//! - `resources/` - classes and starting objects,
//! - `handlers/` - verb and function definitions,
//! - `scripts/` - auxiliary scripts evaluated once at load, with the
//!   system object as the actor.
//!
//! All three hold `.th` files in the script dialect. Loading is additive
//! and idempotent: a definition whose owner already carries a handler
//! with the same name is skipped, as is an object whose name already
//! exists. The reload coordinator gets "reload" semantics by purging
//! system-authored handlers first and then calling back in here.
//!
//! One bad file does not abort a load; it is logged, counted, and the
//! rest of the tree still loads.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use thistle_engine::{
    Catalog, ExecutionContext, Executor, NewFunction, NewVerb, Owner, Provenance, Target,
};
use thistle_foundation::{Error, ErrorKind, ObjectId, Result, Type, Value};
use thistle_script::{Ast, Parser};
use thistle_world::{Notifier, World};

/// The three kinds of source files, each in its own subdirectory.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SourceCategory {
    /// Verb and function definitions under `handlers/`.
    Handlers,
    /// Class and object definitions under `resources/`.
    Resources,
    /// Auxiliary scripts under `scripts/`.
    Scripts,
}

impl SourceCategory {
    /// All categories, in load order.
    pub const ALL: [Self; 3] = [Self::Resources, Self::Handlers, Self::Scripts];

    /// The subdirectory this category loads from.
    #[must_use]
    pub const fn dir(self) -> &'static str {
        match self {
            Self::Handlers => "handlers",
            Self::Resources => "resources",
            Self::Scripts => "scripts",
        }
    }

    /// Classifies a changed path by the subdirectory it sits under.
    #[must_use]
    pub fn of_path(root: &Path, path: &Path) -> Option<Self> {
        let relative = path.strip_prefix(root).ok()?;
        let first = relative.components().next()?;
        let dir = first.as_os_str().to_str()?;
        Self::ALL.into_iter().find(|c| c.dir() == dir)
    }
}

impl fmt::Display for SourceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir())
    }
}

/// Counts of what one load pass did.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Verbs inserted.
    pub verbs: usize,
    /// Functions inserted.
    pub functions: usize,
    /// Classes registered.
    pub classes: usize,
    /// Objects created.
    pub objects: usize,
    /// Auxiliary scripts evaluated.
    pub scripts: usize,
    /// Definitions skipped because they already existed.
    pub skipped: usize,
    /// Files or forms that failed to load.
    pub errors: usize,
}

impl LoadSummary {
    /// Folds another summary into this one.
    pub fn absorb(&mut self, other: Self) {
        self.verbs += other.verbs;
        self.functions += other.functions;
        self.classes += other.classes;
        self.objects += other.objects;
        self.scripts += other.scripts;
        self.skipped += other.skipped;
        self.errors += other.errors;
    }
}

impl fmt::Display for LoadSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} verb(s), {} function(s), {} class(es), {} object(s), {} script(s); {} skipped, {} error(s)",
            self.verbs,
            self.functions,
            self.classes,
            self.objects,
            self.scripts,
            self.skipped,
            self.errors
        )
    }
}

/// Loads `.th` definition files from a source tree.
#[derive(Clone, Debug)]
pub struct SourceLoader {
    root: PathBuf,
}

impl SourceLoader {
    /// Creates a loader rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The source tree root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Loads every category in order.
    pub fn load_all(
        &self,
        world: &mut World,
        catalog: &mut Catalog,
        notifier: &mut dyn Notifier,
    ) -> Result<LoadSummary> {
        let mut summary = LoadSummary::default();
        for category in SourceCategory::ALL {
            summary.absorb(self.load_category(category, world, catalog, notifier)?);
        }
        Ok(summary)
    }

    /// Loads one category's files in sorted order.
    ///
    /// A missing subdirectory is an empty category, not an error.
    pub fn load_category(
        &self,
        category: SourceCategory,
        world: &mut World,
        catalog: &mut Catalog,
        notifier: &mut dyn Notifier,
    ) -> Result<LoadSummary> {
        let dir = self.root.join(category.dir());
        let mut summary = LoadSummary::default();
        if !dir.is_dir() {
            return Ok(summary);
        }
        for path in source_files(&dir)? {
            let source = fs::read_to_string(&path)?;
            let file_result = match category {
                SourceCategory::Handlers => load_handler_file(&source, world, catalog),
                SourceCategory::Resources => load_resource_file(&source, world),
                SourceCategory::Scripts => {
                    run_script_file(&path, &source, world, catalog, notifier)
                }
            };
            match file_result {
                Ok(file_summary) => summary.absorb(file_summary),
                Err(err) => {
                    tracing::error!(path = %path.display(), %err, "failed to load source file");
                    summary.errors += 1;
                }
            }
        }
        Ok(summary)
    }
}

/// Collects the `.th` files directly under a directory, sorted by name.
fn source_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "th"))
        .collect();
    files.sort();
    Ok(files)
}

fn form_error(ast: &Ast, message: impl Into<String>) -> Error {
    let span = ast.span();
    Error::new(ErrorKind::ParseError {
        message: message.into(),
        line: span.line,
        column: span.column,
    })
}

/// Splits a definition form's arguments into keyword options and body forms.
///
/// Options are `:keyword value` pairs; the body starts at the first form
/// that is not part of such a pair.
fn split_options(args: &[Ast]) -> (Vec<(&str, &Ast)>, &[Ast]) {
    let mut options = Vec::new();
    let mut i = 0;
    loop {
        let Some(key) = args.get(i).and_then(Ast::as_keyword) else {
            break;
        };
        let Some(value) = args.get(i + 1) else {
            break;
        };
        options.push((key, value));
        i += 2;
    }
    (options, &args[i..])
}

/// Slices the verbatim body text out of the source, first form to last.
fn body_text(source: &str, body: &[Ast]) -> String {
    let Some(first) = body.first() else {
        return String::new();
    };
    let span = body
        .iter()
        .fold(first.span(), |acc, form| acc.merge(form.span()));
    span.slice(source).to_string()
}

/// Resolves the `:on` / `:system` options to a handler owner.
fn resolve_owner(
    form: &Ast,
    options: &[(&str, &Ast)],
    world: &World,
) -> Result<Owner> {
    let mut on: Option<&str> = None;
    for (key, value) in options {
        match *key {
            "system" => {
                if matches!(value, Ast::Bool(true, _)) {
                    return Ok(Owner::SYSTEM);
                }
            }
            "on" => {
                on = Some(
                    value
                        .as_str()
                        .ok_or_else(|| form_error(value, ":on expects a name string"))?,
                );
            }
            _ => {}
        }
    }
    let Some(name) = on else {
        return Ok(Owner::SYSTEM);
    };
    if let Some(class) = world.find_class(name) {
        return Ok(Owner::Class(class));
    }
    if let Some(object) = world.find_by_name(name, None) {
        return Ok(Owner::Object(object));
    }
    Err(form_error(form, format!("unknown owner \"{name}\"")))
}

fn load_handler_file(
    source: &str,
    world: &mut World,
    catalog: &mut Catalog,
) -> Result<LoadSummary> {
    let mut summary = LoadSummary::default();
    for form in Parser::parse_all(source)? {
        let result = load_handler_form(source, &form, world, catalog, &mut summary);
        if let Err(err) = result {
            tracing::error!(%err, "bad handler definition");
            summary.errors += 1;
        }
    }
    Ok(summary)
}

fn load_handler_form(
    source: &str,
    form: &Ast,
    world: &World,
    catalog: &mut Catalog,
    summary: &mut LoadSummary,
) -> Result<()> {
    let items = form
        .as_list()
        .ok_or_else(|| form_error(form, "expected a definition form"))?;
    let head = items
        .first()
        .and_then(Ast::as_symbol)
        .ok_or_else(|| form_error(form, "expected `verb` or `function`"))?;
    let name = items
        .get(1)
        .and_then(Ast::as_str)
        .ok_or_else(|| form_error(form, "definition needs a name string"))?;
    let (options, body) = split_options(&items[2..]);
    let owner = resolve_owner(form, &options, world)?;
    let body = body_text(source, body);

    match head {
        "verb" => {
            if catalog.has_verb(owner, name) {
                summary.skipped += 1;
                return Ok(());
            }
            let mut new = NewVerb {
                owner,
                name: name.to_string(),
                aliases: Vec::new(),
                pattern: None,
                body,
                provenance: Provenance::System,
            };
            for (key, value) in &options {
                match *key {
                    "aliases" => new.aliases = parse_aliases(value)?,
                    "pattern" => {
                        new.pattern = Some(
                            value
                                .as_str()
                                .ok_or_else(|| form_error(value, ":pattern expects a string"))?
                                .to_string(),
                        );
                    }
                    _ => {}
                }
            }
            catalog.add_verb(new)?;
            summary.verbs += 1;
        }
        "function" => {
            if catalog.has_function(owner, name) {
                summary.skipped += 1;
                return Ok(());
            }
            let mut new = NewFunction {
                owner,
                name: name.to_string(),
                params: Vec::new(),
                returns: Type::Any,
                body,
                provenance: Provenance::System,
            };
            for (key, value) in &options {
                match *key {
                    "params" => new.params = parse_params(value)?,
                    "returns" => new.returns = parse_type(value)?,
                    _ => {}
                }
            }
            catalog.add_function(new);
            summary.functions += 1;
        }
        other => {
            return Err(form_error(
                form,
                format!("unknown definition kind `{other}`"),
            ));
        }
    }
    Ok(())
}

fn parse_aliases(value: &Ast) -> Result<Vec<String>> {
    let items = value
        .as_vector()
        .ok_or_else(|| form_error(value, ":aliases expects a vector of strings"))?;
    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| form_error(item, "alias must be a string"))
        })
        .collect()
}

/// Parses `:params [[amount int] [label string]]`.
fn parse_params(value: &Ast) -> Result<Vec<(String, Type)>> {
    let entries = value
        .as_vector()
        .ok_or_else(|| form_error(value, ":params expects a vector"))?;
    entries
        .iter()
        .map(|entry| {
            let pair = entry
                .as_vector()
                .ok_or_else(|| form_error(entry, "parameter must be [name type]"))?;
            let [name, ty] = pair else {
                return Err(form_error(entry, "parameter must be [name type]"));
            };
            let name = name
                .as_symbol()
                .ok_or_else(|| form_error(name, "parameter name must be a symbol"))?;
            Ok((name.to_string(), parse_type(ty)?))
        })
        .collect()
}

fn parse_type(value: &Ast) -> Result<Type> {
    let name = value
        .as_symbol()
        .or_else(|| value.as_str())
        .ok_or_else(|| form_error(value, "expected a type name"))?;
    Type::parse(name).ok_or_else(|| form_error(value, format!("unknown type `{name}`")))
}

fn load_resource_file(source: &str, world: &mut World) -> Result<LoadSummary> {
    let mut summary = LoadSummary::default();
    for form in Parser::parse_all(source)? {
        let result = load_resource_form(&form, world, &mut summary);
        if let Err(err) = result {
            tracing::error!(%err, "bad resource definition");
            summary.errors += 1;
        }
    }
    Ok(summary)
}

fn load_resource_form(form: &Ast, world: &mut World, summary: &mut LoadSummary) -> Result<()> {
    let items = form
        .as_list()
        .ok_or_else(|| form_error(form, "expected a definition form"))?;
    let head = items
        .first()
        .and_then(Ast::as_symbol)
        .ok_or_else(|| form_error(form, "expected `class` or `object`"))?;
    let name = items
        .get(1)
        .and_then(Ast::as_str)
        .ok_or_else(|| form_error(form, "definition needs a name string"))?;
    let (options, _) = split_options(&items[2..]);

    match head {
        "class" => {
            let mut parent = None;
            for (key, value) in &options {
                if *key == "parent" {
                    let parent_name = value
                        .as_str()
                        .ok_or_else(|| form_error(value, ":parent expects a name string"))?;
                    parent = Some(world.find_class(parent_name).ok_or_else(|| {
                        form_error(value, format!("unknown parent class \"{parent_name}\""))
                    })?);
                }
            }
            if world.find_class(name).is_some() {
                summary.skipped += 1;
            } else {
                world.register_class(name, parent);
                summary.classes += 1;
            }
        }
        "object" => {
            if world.find_by_name(name, None).is_some() {
                summary.skipped += 1;
                return Ok(());
            }
            let class_name = options
                .iter()
                .find(|(key, _)| *key == "class")
                .and_then(|(_, value)| value.as_str())
                .ok_or_else(|| form_error(form, "object needs a :class"))?;
            let class = world
                .find_class(class_name)
                .ok_or_else(|| form_error(form, format!("unknown class \"{class_name}\"")))?;
            // Resolve every option before touching the world, so a bad
            // form leaves no half-built object behind.
            let mut props: Vec<(String, Value)> = Vec::new();
            let mut location = None;
            for (key, value) in &options {
                match *key {
                    "props" => collect_props(value, &mut props)?,
                    "exits" => props.push(("exits".to_string(), literal_value(value)?)),
                    "location" => {
                        let location_name = value.as_str().ok_or_else(|| {
                            form_error(value, ":location expects a name string")
                        })?;
                        location =
                            Some(world.find_by_name(location_name, None).ok_or_else(|| {
                                form_error(
                                    value,
                                    format!("unknown location \"{location_name}\""),
                                )
                            })?);
                    }
                    _ => {}
                }
            }
            let id = world.spawn(class)?;
            world.set_property(id, "name", Value::from(name))?;
            for (prop, value) in props {
                world.set_property(id, &prop, value)?;
            }
            if let Some(location) = location {
                world.move_object(id, location)?;
            }
            summary.objects += 1;
        }
        other => {
            return Err(form_error(form, format!("unknown resource kind `{other}`")));
        }
    }
    Ok(())
}

fn collect_props(value: &Ast, out: &mut Vec<(String, Value)>) -> Result<()> {
    let Ast::Map(entries, _) = value else {
        return Err(form_error(value, ":props expects a map"));
    };
    for (key, val) in entries {
        let prop = key
            .as_str()
            .or_else(|| key.as_keyword())
            .ok_or_else(|| form_error(key, "property key must be a string or keyword"))?;
        out.push((prop.to_string(), literal_value(val)?));
    }
    Ok(())
}

/// Converts a literal AST node to a value.
///
/// Definition files carry data, not code, so only literals are allowed
/// here; a list form in property position is rejected.
fn literal_value(ast: &Ast) -> Result<Value> {
    match ast {
        Ast::Nil(_) => Ok(Value::Nil),
        Ast::Bool(b, _) => Ok(Value::Bool(*b)),
        Ast::Int(n, _) => Ok(Value::Int(*n)),
        Ast::Float(n, _) => Ok(Value::Float(*n)),
        Ast::Str(s, _) | Ast::Keyword(s, _) => Ok(Value::from(s.as_str())),
        Ast::Object(n, _) => Ok(Value::Object(ObjectId::new(*n))),
        Ast::Vector(items, _) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(literal_value(item)?);
            }
            Ok(Value::List(out.into_iter().collect()))
        }
        _ => Err(form_error(ast, "expected a literal value")),
    }
}

fn run_script_file(
    path: &Path,
    source: &str,
    world: &mut World,
    catalog: &Catalog,
    notifier: &mut dyn Notifier,
) -> Result<LoadSummary> {
    let label = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("script");
    let context = ExecutionContext::builder(ObjectId::SYSTEM)
        .target(Target::Object(ObjectId::SYSTEM))
        .build();
    let mut executor = Executor::new(world, catalog, notifier, ObjectId::SYSTEM);
    executor.run_script(label, source, &context)?;
    Ok(LoadSummary {
        scripts: 1,
        ..LoadSummary::default()
    })
}
