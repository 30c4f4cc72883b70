//! FusBuddy360 Interface
//!
//! Responsibilities:
//! - CLI: render, chat, config commands
//! - REPL: terminal front-end for a palette session

pub mod cli;
pub mod repl;

#[cfg(test)]
mod cli_tests;

pub use cli::{CliError, OutputFormat, run_cli};
pub use repl::{ReplInput, parse_input, run_chat};
