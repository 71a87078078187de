//! Tests for source loading and hot reload.

mod coordination;
mod loading;
