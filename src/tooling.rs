//! Tooling
//!
//! Command-line surface over the engine: argument parsing, command dispatch
//! and text/JSON formatting.

pub mod cli;
pub mod format;

pub use cli::{Cli, CliContext, Commands};
