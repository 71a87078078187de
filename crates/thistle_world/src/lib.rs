//! Object and class storage for Thistle.
//!
//! This crate provides:
//! - [`World`] - The in-memory object and class store
//! - [`ObjectClass`] / [`ObjectInstance`] - Stored records
//! - [`Notifier`] / [`Permissions`] - Collaborator traits for session
//!   output and privilege checks

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod class;
pub mod collab;
pub mod object;
pub mod world;

pub use class::ObjectClass;
pub use collab::{BufferNotifier, Notifier, Permissions};
pub use object::ObjectInstance;
pub use world::World;
