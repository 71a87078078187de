//! Interactive runtime for Thistle.
//!
//! This crate provides:
//! - [`Session`] - One actor's command connection to the shared world
//! - [`Repl`] - The interactive command loop and its `:` directives
//! - [`Snapshot`] - `MessagePack` persistence for user-authored handlers

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod editor;
pub mod repl;
pub mod serialize;
pub mod session;

pub use editor::{LineEditor, ReadResult, RustylineEditor};
pub use repl::Repl;
pub use serialize::Snapshot;
pub use session::{ConsoleNotifier, Session};
