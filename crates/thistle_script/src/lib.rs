//! The embedded script dialect for Thistle handler bodies.
//!
//! Handler bodies are s-expressions evaluated by a tree-walking
//! interpreter. The interpreter is sandboxed: it has no ambient access to
//! the world or to I/O. Everything a script can observe or mutate goes
//! through the [`ScriptHost`] trait, which the engine implements, and
//! evaluation is bounded by step and depth limits so a runaway body is cut
//! off rather than blocking its serving thread.
//!
//! This crate provides:
//! - [`Lexer`] / [`Parser`] - Source text to [`Ast`]
//! - [`Interpreter`] - Bounded evaluation against a [`ScriptHost`]
//! - [`Env`] - Lexically scoped variable bindings

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod ast;
pub mod env;
pub mod host;
pub mod interp;
pub mod lexer;
pub mod native;
pub mod parser;
pub mod span;
pub mod token;

pub use ast::Ast;
pub use env::Env;
pub use host::{NullHost, ScriptHost};
pub use interp::{Interpreter, Limits};
pub use lexer::Lexer;
pub use parser::Parser;
pub use span::Span;
pub use token::{Token, TokenKind};
