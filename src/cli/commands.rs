//! CLI command implementations.
//!
//! Contains the business logic for each CLI command.

#![allow(clippy::uninlined_format_args)]
#![allow(clippy::format_push_string)]

use std::path::{Path, PathBuf};

use crate::agent::{AgentConfig, LlmProvider, Orchestrator, PromptSet, create_provider};
use crate::cli::output::{OutputFormat, format_case_result, format_history, history_summaries};
use crate::cli::parser::{AgentArgs, Cli, Commands};
use crate::core::{CaseInput, CaseResult};
use crate::error::{CommandError, Result};

/// Rendered command output plus whether the command fully succeeded.
///
/// An evaluation that ends with status `error` still renders its result,
/// but the process should exit non-zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Text to print on stdout.
    pub text: String,
    /// `false` when at least one evaluation ended in error.
    pub success: bool,
}

impl CommandOutput {
    fn ok(text: String) -> Self {
        Self {
            text,
            success: true,
        }
    }
}

/// Executes the CLI command.
///
/// # Errors
///
/// Returns an error if argument validation, configuration, or output
/// formatting fails.
pub fn execute(cli: &Cli) -> Result<CommandOutput> {
    let format = OutputFormat::parse(&cli.format);

    match &cli.command {
        Commands::Evaluate {
            query,
            image,
            meta,
            agent,
        } => {
            let input = build_case_input(query.as_deref(), image.as_deref(), meta)?;
            cmd_evaluate(input, agent, format)
        }
        Commands::Batch { file, agent } => cmd_batch(file, agent, format),
        Commands::InitPrompts { dir } => {
            cmd_init_prompts(dir.as_deref(), format).map(CommandOutput::ok)
        }
    }
}

/// Builds and validates a case from command-line arguments.
///
/// Runs before any configuration is read so that an empty case fails
/// without needing an API key.
fn build_case_input(
    query: Option<&str>,
    image: Option<&Path>,
    meta: &[String],
) -> Result<CaseInput> {
    let mut input = CaseInput::new(query.unwrap_or_default());
    if let Some(path) = image {
        input = input.with_image(path.to_string_lossy());
    }
    for pair in meta {
        let (key, value) = parse_meta(pair)?;
        input = input.with_metadata(key, value);
    }

    if !input.is_evaluable() {
        return Err(CommandError::InvalidArgument(
            "nothing to evaluate: provide a QUERY, --image, or both".to_string(),
        )
        .into());
    }
    Ok(input)
}

/// Parses a `KEY=VALUE` pair. Values that parse as JSON keep their type;
/// anything else is taken as a string.
fn parse_meta(pair: &str) -> Result<(String, serde_json::Value)> {
    let (key, raw) = pair.split_once('=').ok_or_else(|| {
        CommandError::InvalidArgument(format!("metadata must be KEY=VALUE, got '{pair}'"))
    })?;
    let key = key.trim();
    if key.is_empty() {
        return Err(CommandError::InvalidArgument(format!("metadata key is empty in '{pair}'")).into());
    }
    if matches!(key, "query" | "image" | "image_ref" | "username") {
        return Err(CommandError::InvalidArgument(format!(
            "'{key}' is reserved; use the positional QUERY or --image"
        ))
        .into());
    }

    let value = serde_json::from_str(raw.trim())
        .unwrap_or_else(|_| serde_json::Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

/// Builds the orchestrator from environment plus CLI overrides.
fn build_orchestrator(args: &AgentArgs) -> Result<Orchestrator> {
    let mut builder = AgentConfig::builder();
    if let Some(n) = args.max_iterations {
        builder = builder.max_iterations(n);
    }
    if let Some(ref model) = args.planner_model {
        builder = builder.planner_model(model);
    }
    if let Some(ref model) = args.vision_model {
        builder = builder.vision_model(model);
    }
    if let Some(ref model) = args.text_model {
        builder = builder.text_model(model);
    }
    if let Some(ref model) = args.evaluator_model {
        builder = builder.evaluator_model(model);
    }
    if let Some(ref dir) = args.prompt_dir {
        builder = builder.prompt_dir(dir);
    }

    let config = builder.from_env().build().map_err(|e| {
        CommandError::ExecutionFailed(format!("Agent configuration error: {e}"))
    })?;

    let provider = create_provider(&config).map_err(|e| {
        CommandError::ExecutionFailed(format!("Provider creation failed: {e}"))
    })?;

    tracing::debug!(
        provider = provider.name(),
        planner = %config.planner_model,
        vision = %config.vision_model,
        max_iterations = config.max_iterations,
        "orchestrator configured"
    );

    Ok(Orchestrator::new(provider, config))
}

fn build_runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| {
            CommandError::ExecutionFailed(format!("Failed to create async runtime: {e}")).into()
        })
}

/// Runs one evaluation session.
fn cmd_evaluate(input: CaseInput, args: &AgentArgs, format: OutputFormat) -> Result<CommandOutput> {
    let orchestrator = build_orchestrator(args)?;
    let rt = build_runtime()?;

    let result = rt.block_on(orchestrator.evaluate(input));
    let success = result.is_completed();

    Ok(CommandOutput {
        text: format_case_result(&result, format)?,
        success,
    })
}

/// Evaluates every case in a JSON file with one orchestrator, then
/// appends the history summary.
fn cmd_batch(file: &Path, args: &AgentArgs, format: OutputFormat) -> Result<CommandOutput> {
    let cases = read_cases(file)?;
    let orchestrator = build_orchestrator(args)?;
    let rt = build_runtime()?;

    let total = cases.len();
    let results: Vec<CaseResult> = rt.block_on(async {
        let mut results = Vec::with_capacity(total);
        for (i, case) in cases.into_iter().enumerate() {
            tracing::info!(case = i + 1, total, "evaluating batch case");
            results.push(orchestrator.evaluate(case).await);
        }
        results
    });

    let success = results.iter().all(CaseResult::is_completed);
    let history = orchestrator.history();

    let text = match format {
        OutputFormat::Text => {
            let mut out = String::new();
            for (i, result) in results.iter().enumerate() {
                out.push_str(&format!("=== Case {}/{} ===\n", i + 1, total));
                out.push_str(&format_case_result(result, format)?);
                out.push('\n');
            }
            out.push_str(&format_history(&history, format)?);
            out
        }
        OutputFormat::Json => {
            let json = serde_json::json!({
                "results": results,
                "history": history_summaries(&history),
            });
            format.to_json(&json)?
        }
        OutputFormat::Ndjson => {
            let mut out = String::new();
            for result in &results {
                out.push_str(&format_case_result(result, format)?);
                out.push('\n');
            }
            out.push_str(&format_history(&history, format)?);
            out
        }
    };

    Ok(CommandOutput { text, success })
}

/// Reads a JSON array of cases, rejecting any case with nothing to evaluate
/// before the first API call.
fn read_cases(file: &Path) -> Result<Vec<CaseInput>> {
    let content = std::fs::read_to_string(file).map_err(|e| {
        CommandError::InvalidArgument(format!("cannot read {}: {e}", file.display()))
    })?;
    let cases: Vec<CaseInput> = serde_json::from_str(&content).map_err(|e| {
        CommandError::InvalidArgument(format!(
            "{} is not a JSON array of cases: {e}",
            file.display()
        ))
    })?;

    if cases.is_empty() {
        return Err(CommandError::InvalidArgument(format!("{} contains no cases", file.display())).into());
    }
    if let Some(pos) = cases.iter().position(|c| !c.is_evaluable()) {
        return Err(CommandError::InvalidArgument(format!(
            "case {} has neither a query nor an image",
            pos + 1
        ))
        .into());
    }
    Ok(cases)
}

/// Writes default prompt templates to a directory.
fn cmd_init_prompts(dir: Option<&Path>, format: OutputFormat) -> Result<String> {
    let target_dir = dir
        .map(PathBuf::from)
        .or_else(PromptSet::default_dir)
        .ok_or_else(|| {
            CommandError::ExecutionFailed(
                "Could not determine home directory for default prompt path".to_string(),
            )
        })?;

    let written = PromptSet::write_defaults(&target_dir).map_err(|e| {
        CommandError::ExecutionFailed(format!("Failed to write prompt templates: {e}"))
    })?;

    match format {
        OutputFormat::Text => {
            if written.is_empty() {
                return Ok(format!(
                    "All prompt templates already exist in: {}\n",
                    target_dir.display()
                ));
            }
            let mut output = format!(
                "Wrote {} prompt template(s) to: {}\n",
                written.len(),
                target_dir.display()
            );
            for path in &written {
                output.push_str(&format!(
                    "  {}\n",
                    path.file_name()
                        .and_then(|n| n.to_str())
                        .unwrap_or("unknown")
                ));
            }
            output.push_str("\nEdit these files and pass --prompt-dir to use them.\n");
            Ok(output)
        }
        OutputFormat::Json | OutputFormat::Ndjson => {
            let json = serde_json::json!({
                "directory": target_dir.to_string_lossy(),
                "written": written.iter().map(|p| p.to_string_lossy().into_owned()).collect::<Vec<_>>(),
                "count": written.len()
            });
            Ok(format.to_json(&json)?)
        }
    }
}
