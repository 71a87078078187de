//! The interactive command loop.
//!
//! Input lines are ordinary world commands unless they start with `:`,
//! which marks a runtime directive (reload, snapshot save/load, quit).

use std::io::{self, Write};

use thistle_foundation::{Error, Result, Value};
use thistle_reload::ReloadCoordinator;

use crate::editor::{LineEditor, ReadResult, RustylineEditor};
use crate::serialize::{self, Snapshot};
use crate::session::Session;

/// The interactive REPL.
pub struct Repl<E: LineEditor = RustylineEditor> {
    editor: E,
    session: Session,
    coordinator: Option<ReloadCoordinator>,
    show_banner: bool,
    prompt: String,
}

impl Repl<RustylineEditor> {
    /// Creates a REPL with the default rustyline editor.
    ///
    /// # Errors
    ///
    /// Returns an error if the editor fails to initialize.
    pub fn new(session: Session) -> Result<Self> {
        let editor = RustylineEditor::new()?;
        Ok(Self::with_editor(editor, session))
    }
}

impl<E: LineEditor> Repl<E> {
    /// Creates a REPL with the given editor.
    pub fn with_editor(editor: E, session: Session) -> Self {
        Self {
            editor,
            session,
            coordinator: None,
            show_banner: true,
            prompt: "> ".to_string(),
        }
    }

    /// Attaches a reload coordinator, enabling the `:reload` family of
    /// directives.
    #[must_use]
    pub fn with_coordinator(mut self, coordinator: ReloadCoordinator) -> Self {
        self.coordinator = Some(coordinator);
        self
    }

    /// Disables the welcome banner.
    #[must_use]
    pub const fn without_banner(mut self) -> Self {
        self.show_banner = false;
        self
    }

    /// Returns a reference to the session.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Runs the loop until `:quit` or EOF.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input fails fatally. Command and
    /// directive errors are printed and the loop continues.
    pub fn run(&mut self) -> Result<()> {
        if self.show_banner {
            self.print_banner();
        }

        loop {
            let prompt = self.prompt.clone();
            match self.editor.read_line(&prompt)? {
                ReadResult::Line(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    self.editor.add_history(trimmed);
                    match self.handle_line(trimmed) {
                        Ok(true) => {}
                        Ok(false) => break,
                        Err(e) => print_error(&e),
                    }
                }
                ReadResult::Interrupted => {
                    println!();
                }
                ReadResult::Eof => break,
            }
        }

        println!("\nGoodbye!");
        Ok(())
    }

    /// Handles one line. Returns `Ok(false)` to exit the loop.
    fn handle_line(&mut self, line: &str) -> Result<bool> {
        if let Some(directive) = line.strip_prefix(':') {
            return self.handle_directive(directive);
        }
        let outcome = self.session.execute(line)?;
        if let thistle_engine::DispatchOutcome::Matched { result, .. } = outcome {
            if result != Value::Nil {
                println!("=> {result}");
            }
        }
        Ok(true)
    }

    fn handle_directive(&mut self, directive: &str) -> Result<bool> {
        let mut words = directive.split_whitespace();
        let command = words.next().unwrap_or("");
        let argument = words.next();

        match command {
            "quit" | "q" => return Ok(false),
            "help" | "h" => print_help(),
            "reload" => {
                let summary = self.require_coordinator()?.reload_all()?;
                println!("reloaded: {summary}");
            }
            "force-reload" => {
                let summary = self.require_coordinator()?.force_reload()?;
                println!("force reloaded: {summary}");
            }
            "watch" => {
                let coordinator = self.require_coordinator()?;
                match argument {
                    Some("on") => {
                        coordinator.enable();
                        println!("watching for source changes");
                    }
                    Some("off") => {
                        coordinator.disable();
                        println!("no longer watching");
                    }
                    _ => return Err(Error::internal(":watch takes `on` or `off`")),
                }
            }
            "save" => {
                let Some(path) = argument else {
                    return Err(Error::internal(":save takes a file path"));
                };
                let snapshot = {
                    let catalog = self.session.shared().catalog.lock();
                    Snapshot::capture(&catalog)
                };
                serialize::save_to_file(&snapshot, path)?;
                println!(
                    "saved {} verb(s), {} function(s) to {path}",
                    snapshot.verbs.len(),
                    snapshot.functions.len()
                );
            }
            "load" => {
                let Some(path) = argument else {
                    return Err(Error::internal(":load takes a file path"));
                };
                let snapshot = serialize::load_from_file(path)?;
                let restored = {
                    let mut catalog = self.session.shared().catalog.lock();
                    snapshot.restore(&mut catalog)?
                };
                println!("restored {restored} handler(s) from {path}");
            }
            other => {
                return Err(Error::internal(format!(
                    "unknown directive :{other} (try :help)"
                )));
            }
        }
        Ok(true)
    }

    fn require_coordinator(&self) -> Result<&ReloadCoordinator> {
        self.coordinator
            .as_ref()
            .ok_or_else(|| Error::internal("no source tree attached; reload unavailable"))
    }

    #[allow(clippy::unused_self)]
    fn print_banner(&self) {
        println!("\x1b[1;36mThistle\x1b[0m v{}", env!("CARGO_PKG_VERSION"));
        println!("Type commands to act in the world. :help lists directives.\n");
        let _ = io::stdout().flush();
    }
}

fn print_error(error: &Error) {
    eprintln!("\x1b[31mError: {error}\x1b[0m");
}

fn print_help() {
    println!(
        "\x1b[1mDIRECTIVES:\x1b[0m
    :help                Show this message
    :quit                Exit (Ctrl+D also works)
    :reload              Re-read the source tree, keeping user handlers
    :force-reload        Re-read the source tree from scratch
    :watch on|off        Toggle automatic reload on file changes
    :save PATH           Save user-authored handlers to a snapshot file
    :load PATH           Restore handlers from a snapshot file

Anything else is a world command, e.g. `look` or `go north`."
    );
}
