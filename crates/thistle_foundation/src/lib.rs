//! Core types for the Thistle virtual environment server.
//!
//! This crate provides:
//! - [`ObjectId`], [`ClassId`], [`HandlerId`] - Identifier newtypes
//! - [`Value`] - The runtime value type shared by properties and scripts
//! - [`Type`] - Type descriptors for function parameter validation
//! - [`Error`] - Rich error types with context

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod id;
pub mod types;
pub mod value;

pub use error::{Error, ErrorContext, ErrorKind, ScriptLimit};
pub use id::{ClassId, HandlerId, ObjectId};
pub use types::Type;
pub use value::Value;

/// Result type used throughout Thistle.
pub type Result<T> = std::result::Result<T, Error>;
