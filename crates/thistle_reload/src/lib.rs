//! Source loading and hot reload for Thistle.
//!
//! This crate provides:
//! - [`SourceLoader`] - Parses `.th` definition files into the world and
//!   catalog
//! - [`ReloadCoordinator`] - Watches the source tree and reloads changed
//!   categories behind a debounce window
//! - [`SharedState`] - The world/catalog/notifier bundle the runtime and
//!   the coordinator share

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod coordinator;
pub mod loader;

pub use coordinator::{ReloadConfig, ReloadCoordinator, ReloadPhase, SharedState};
pub use loader::{LoadSummary, SourceCategory, SourceLoader};
