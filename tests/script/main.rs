//! Integration tests for the script dialect.
//!
//! Pure evaluation against [`thistle_script::NullHost`]; world-backed
//! behavior is covered by the engine tests.

mod eval;
mod limits;
