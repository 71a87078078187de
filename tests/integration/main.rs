//! Whole-stack tests: source tree to session and back.

mod persistence;
mod sessions;
