//! Thistle CLI entry point.

use std::env;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use thistle_engine::Catalog;
use thistle_foundation::{Error, ObjectId, Result, Value};
use thistle_reload::{ReloadCoordinator, SharedState, SourceLoader};
use thistle_runtime::{ConsoleNotifier, Repl, Session, Snapshot, serialize};
use thistle_world::{Permissions, World};
use tracing_subscriber::EnvFilter;

/// CLI configuration parsed from arguments.
struct CliConfig {
    seed: u64,
    source: Option<PathBuf>,
    snapshot: Option<PathBuf>,
    no_watch: bool,
    show_help: bool,
    show_version: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            source: None,
            snapshot: None,
            no_watch: false,
            show_help: false,
            show_version: false,
        }
    }
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError: {e}\x1b[0m");
            ExitCode::FAILURE
        }
    }
}

fn parse_args(args: Vec<String>) -> Result<CliConfig> {
    let mut config = CliConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => config.show_help = true,
            "-V" | "--version" => config.show_version = true,
            "--no-watch" => config.no_watch = true,
            "--seed" => {
                i += 1;
                if i >= args.len() {
                    return Err(Error::internal("--seed requires a value"));
                }
                config.seed = args[i]
                    .parse()
                    .map_err(|_| Error::internal(format!("invalid --seed value: {}", args[i])))?;
            }
            "--source" => {
                i += 1;
                if i >= args.len() {
                    return Err(Error::internal("--source requires a directory"));
                }
                config.source = Some(PathBuf::from(&args[i]));
            }
            "--snapshot" => {
                i += 1;
                if i >= args.len() {
                    return Err(Error::internal("--snapshot requires a file path"));
                }
                config.snapshot = Some(PathBuf::from(&args[i]));
            }
            arg => {
                return Err(Error::internal(format!("unknown option: {arg}")));
            }
        }
        i += 1;
    }

    Ok(config)
}

/// Privilege flags read from object properties.
struct FlagPermissions {
    shared: Arc<SharedState>,
}

impl Permissions for FlagPermissions {
    fn has_flag(&self, actor: ObjectId, flag: &str) -> bool {
        let world = self.shared.world.lock();
        matches!(world.get_property(actor, flag), Ok(Value::Bool(true)))
    }
}

fn run(args: Vec<String>) -> Result<()> {
    let config = parse_args(args)?;

    if config.show_help {
        print_help();
        return Ok(());
    }

    if config.show_version {
        println!("thistle {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let mut world = World::new(config.seed);
    let mut catalog = Catalog::new();

    // Read the source tree before anyone connects; load-time script
    // output goes to an unconnected console.
    let loader = config.source.clone().map(SourceLoader::new);
    if let Some(loader) = &loader {
        let mut notifier = ConsoleNotifier::default();
        let summary = loader.load_all(&mut world, &mut catalog, &mut notifier)?;
        tracing::info!(root = %loader.root().display(), %summary, "source tree loaded");
        println!("loaded: {summary}");
    }

    if let Some(path) = &config.snapshot {
        if path.exists() {
            let restored = serialize::load_from_file(path)?.restore(&mut catalog)?;
            println!("restored {restored} handler(s) from {}", path.display());
        }
    }

    let actor = find_or_create_player(&mut world)?;
    let shared = SharedState::new(
        world,
        catalog,
        Box::new(ConsoleNotifier::new(vec![actor])),
    );

    let coordinator = match loader {
        Some(loader) => {
            let permissions = Arc::new(FlagPermissions {
                shared: Arc::clone(&shared),
            });
            let mut coordinator = ReloadCoordinator::new(loader, Arc::clone(&shared), permissions);
            if !config.no_watch {
                coordinator.watch()?;
            }
            Some(coordinator)
        }
        None => None,
    };

    let session = Session::new(Arc::clone(&shared), actor);
    let mut repl = Repl::new(session)?;
    if let Some(coordinator) = coordinator {
        repl = repl.with_coordinator(coordinator);
    }
    repl.run()?;

    // Autosave user-authored handlers on the way out.
    if let Some(path) = &config.snapshot {
        let snapshot = Snapshot::capture(&shared.catalog.lock());
        serialize::save_to_file(&snapshot, path)?;
        println!("saved snapshot to {}", path.display());
    }

    Ok(())
}

/// Finds the object named "player", spawning one if the source tree did
/// not define it.
fn find_or_create_player(world: &mut World) -> Result<ObjectId> {
    if let Some(found) = world.find_by_name("player", None) {
        return Ok(found);
    }
    let class = world
        .find_class("player")
        .unwrap_or_else(|| world.register_class("player", None));
    let actor = world.spawn(class)?;
    world.set_property(actor, "name", Value::from("player"))?;
    world.set_property(actor, "wizard", Value::Bool(true))?;
    Ok(actor)
}

fn print_help() {
    println!(
        "\x1b[1mThistle\x1b[0m - Multi-user world server core

\x1b[1mUSAGE:\x1b[0m
    thistle [OPTIONS]

\x1b[1mOPTIONS:\x1b[0m
    -h, --help         Print help information
    -V, --version      Print version information
    --seed N           Seed the world's random number generator
    --source DIR       Load world definitions from DIR and watch it
    --no-watch         Load --source once, without hot reload
    --snapshot FILE    Restore user handlers from FILE, autosave on exit

\x1b[1mEXAMPLES:\x1b[0m
    thistle                                Start with an empty world
    thistle --source world/                Load world/ and watch for edits
    thistle --source world/ --no-watch     Load world/ once
    thistle --snapshot mine.msgpack        Keep user handlers across runs

\x1b[1mDIRECTIVES:\x1b[0m
    :help                List in-session directives
    Ctrl+D               Exit

For more information, visit https://github.com/thistle-mud/thistle"
    );
}
