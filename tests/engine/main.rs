//! Cross-layer tests for the verb engine.
//!
//! World and catalog are exercised together: resolution through
//! inheritance chains, free-text dispatch, and handler execution.

mod dispatch;
mod execution;
mod resolution;
