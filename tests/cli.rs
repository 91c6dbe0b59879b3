//! Command-line behavior that needs no model service.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn mamaria() -> Command {
    let mut cmd = Command::cargo_bin("mamaria").unwrap_or_else(|_| unreachable!());
    cmd.env_remove("OPENAI_API_KEY")
        .env_remove("MAMARIA_API_KEY")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_commands() {
    mamaria()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("evaluate"))
        .stdout(predicate::str::contains("batch"))
        .stdout(predicate::str::contains("init-prompts"));
}

#[test]
fn test_evaluate_without_query_or_image_fails_before_config() {
    mamaria()
        .arg("evaluate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing to evaluate"));
}

#[test]
fn test_evaluate_without_api_key_reports_it() {
    mamaria()
        .args(["evaluate", "breast pain"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("API key not configured"));
}

#[test]
fn test_evaluate_rejects_malformed_meta() {
    mamaria()
        .args(["evaluate", "breast pain", "--meta", "age"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("KEY=VALUE"));
}

#[test]
fn test_batch_rejects_invalid_file() {
    let dir = TempDir::new().unwrap_or_else(|_| unreachable!());
    let path = dir.path().join("cases.json");
    std::fs::write(&path, "not json").unwrap_or_else(|_| unreachable!());

    mamaria()
        .arg("batch")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a JSON array of cases"));
}

#[test]
fn test_init_prompts_writes_templates_once() {
    let dir = TempDir::new().unwrap_or_else(|_| unreachable!());

    mamaria()
        .args(["init-prompts", "--dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 4 prompt template(s)"));

    for name in ["planner.md", "image.md", "text.md", "evaluator.md"] {
        assert!(dir.path().join(name).is_file(), "{name} missing");
    }

    mamaria()
        .args(["--format", "json", "init-prompts", "--dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"count\": 0"));
}
