//! CLI layer for mamaria.
//!
//! Provides the command-line interface using clap, with commands for
//! evaluating single cases, batches of cases, and writing prompt templates.

pub mod commands;
pub mod output;
pub mod parser;

pub use commands::{CommandOutput, execute};
pub use output::OutputFormat;
pub use parser::{AgentArgs, Cli, Commands};
