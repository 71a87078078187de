//! Verb/function resolution and execution for Thistle.
//!
//! This crate is the hard core of the server:
//! - [`Catalog`] - Stored verb and function records with provenance
//! - [`Pattern`] - Wildcard and named-capture argument patterns
//! - [`Resolver`] - Handler lookup across the inheritance chain
//! - [`ExecutionContext`] - Call-scoped environment construction
//! - [`Executor`] - Bounded script execution and nested invocation
//! - [`Dispatcher`] - Top-level command dispatch across candidate objects

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod catalog;
pub mod context;
pub mod dispatch;
pub mod exec;
pub mod pattern;
pub mod record;
pub mod resolve;

pub use catalog::Catalog;
pub use context::{ContextBuilder, ExecutionContext, Target};
pub use dispatch::{DispatchOutcome, Dispatcher};
pub use exec::{Executor, MAX_CALL_DEPTH};
pub use pattern::Pattern;
pub use record::{DefinitionSource, Function, NewFunction, NewVerb, Owner, Provenance, Verb};
pub use resolve::{MatchResult, Resolver};
