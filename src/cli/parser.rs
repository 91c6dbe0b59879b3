//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// mamaria: multimodal case evaluation driven by a Think-Act-Observe loop.
///
/// Plans image and text analysis steps with an LLM, accumulates
/// confidence, and writes a final evaluation or asks for clarification.
#[derive(Parser, Debug)]
#[command(name = "mamaria")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output (debug logging on stderr).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json, ndjson).
    #[arg(
        long,
        default_value = "text",
        global = true,
        value_parser = ["text", "json", "ndjson"]
    )]
    pub format: String,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate one case from a text query and/or an image.
    ///
    /// Requires an OpenAI-compatible API key.
    #[command(after_help = r#"Examples:
  mamaria evaluate "Lump in the left breast for two weeks"
  mamaria evaluate --image scans/left-cc.png
  mamaria evaluate "Follow-up of a known cyst" --image scan.jpg --meta age=52
  mamaria --format json evaluate "Nipple discharge" | jq '.status'
  OPENAI_API_KEY=sk-... mamaria evaluate "breast pain" --max-iterations 5
"#)]
    Evaluate {
        /// Free-text description of the case.
        query: Option<String>,

        /// Path to the case image.
        #[arg(short, long)]
        image: Option<PathBuf>,

        /// Metadata passed to the final evaluation (repeatable).
        /// Values are parsed as JSON when possible.
        #[arg(short, long = "meta", value_name = "KEY=VALUE")]
        meta: Vec<String>,

        /// Agent overrides.
        #[command(flatten)]
        agent: AgentArgs,
    },

    /// Evaluate every case in a JSON file, then print the session history.
    ///
    /// The file holds an array of objects such as
    /// `{"query": "...", "image": "scan.png", "age": 52}`.
    #[command(after_help = r#"Examples:
  mamaria batch cases.json
  mamaria --format ndjson batch cases.json > results.ndjson
"#)]
    Batch {
        /// Path to the JSON case file.
        file: PathBuf,

        /// Agent overrides.
        #[command(flatten)]
        agent: AgentArgs,
    },

    /// Write the default prompt templates for customization.
    ///
    /// Existing files are never overwritten.
    #[command(after_help = r#"Examples:
  mamaria init-prompts
  mamaria init-prompts --dir ./prompts
"#)]
    InitPrompts {
        /// Target directory (default: ~/.config/mamaria/prompts).
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
}

/// Agent configuration overrides shared by the evaluation commands.
///
/// Unset flags fall back to `MAMARIA_*` environment variables, then to
/// built-in defaults.
#[derive(Args, Debug, Clone, Default)]
pub struct AgentArgs {
    /// Maximum Think-Act-Observe iterations per case.
    #[arg(long)]
    pub max_iterations: Option<usize>,

    /// Model for the planning step.
    #[arg(long)]
    pub planner_model: Option<String>,

    /// Vision model for image analysis.
    #[arg(long)]
    pub vision_model: Option<String>,

    /// Model for text analysis.
    #[arg(long)]
    pub text_model: Option<String>,

    /// Model for the final evaluation.
    #[arg(long)]
    pub evaluator_model: Option<String>,

    /// Directory containing prompt template files.
    #[arg(long)]
    pub prompt_dir: Option<PathBuf>,
}
