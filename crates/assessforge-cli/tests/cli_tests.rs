//! CLI integration tests using assert_cmd.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn assessforge() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("assessforge").unwrap()
}

/// Command isolated from any user or working-directory config.
fn isolated(dir: &TempDir) -> Command {
    let mut cmd = assessforge();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env_remove("ASSESSFORGE_OUTPUT_DIR");
    cmd
}

fn repo_file(relative: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../..")
        .join(relative)
}

fn files_with_extension(dir: &Path, ext: &str) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.extension().is_some_and(|e| e == ext))
        .collect()
}

#[test]
fn validate_valid_definition() {
    assessforge()
        .arg("validate")
        .arg("--definition")
        .arg("../../definitions/rust-basics.toml")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Assessment: rust-basics (2 sections, 5 items)",
        ))
        .stdout(predicate::str::contains("All definitions valid"));
}

#[test]
fn validate_directory() {
    assessforge()
        .arg("validate")
        .arg("--definition")
        .arg("../../definitions")
        .assert()
        .success()
        .stdout(predicate::str::contains("rust-basics"))
        .stdout(predicate::str::contains("timed-checkpoint"))
        .stdout(predicate::str::contains("course-survey"))
        .stdout(predicate::str::contains("item has no max_score"))
        .stdout(predicate::str::contains("2 warning(s) found"));
}

#[test]
fn validate_nonexistent_file() {
    assessforge()
        .arg("validate")
        .arg("--definition")
        .arg("nonexistent.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn validate_unresolvable_definition_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(
        &path,
        r#"
[assessment]
ident = "broken"

[[assessment.sections]]
sectionref = "missing"
"#,
    )
    .unwrap();

    assessforge()
        .arg("validate")
        .arg("--definition")
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "unresolved section reference: missing",
        ))
        .stderr(predicate::str::contains("cannot be delivered"));
}

#[test]
fn inspect_shows_structure() {
    assessforge()
        .arg("inspect")
        .arg("--definition")
        .arg("../../definitions/rust-basics.toml")
        .assert()
        .success()
        .stdout(predicate::str::contains("Rust Basics (rust-basics)"))
        .stdout(predicate::str::contains("Duration limit: 1200s"))
        .stdout(predicate::str::contains("hints off"))
        .stdout(predicate::str::contains("ownership"))
        .stdout(predicate::str::contains("patterns"))
        .stdout(predicate::str::contains("fb-perfect [variable_test] Excellent"));
}

#[test]
fn score_writes_all_formats() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out");

    isolated(&dir)
        .arg("score")
        .arg("--definition")
        .arg(repo_file("definitions/rust-basics.toml"))
        .arg("--responses")
        .arg(repo_file("responses/rust-basics-pass.toml"))
        .arg("--format")
        .arg("all")
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Score: 6 / 9 (PASSED)"))
        .stdout(predicate::str::contains(
            "Feedback: Passed: Solid grasp of the basics.",
        ))
        .stdout(predicate::str::contains("5 accepted, 0 rejected"));

    assert_eq!(files_with_extension(&out, "json").len(), 1);
    assert_eq!(files_with_extension(&out, "html").len(), 1);
    assert_eq!(files_with_extension(&out, "md").len(), 1);
}

#[test]
fn score_rejects_late_responses() {
    let dir = TempDir::new().unwrap();

    isolated(&dir)
        .arg("score")
        .arg("--definition")
        .arg(repo_file("definitions/timed-checkpoint.toml"))
        .arg("--responses")
        .arg(repo_file("responses/timed-checkpoint-late.toml"))
        .arg("--output")
        .arg(dir.path().join("out"))
        .assert()
        .success()
        .stdout(predicate::str::contains("2 accepted, 1 rejected"))
        .stdout(predicate::str::contains("Score: 1 / 4 (PASSED)"))
        .stdout(predicate::str::contains("Duration: 75.0s"));
}

#[test]
fn strict_config_fails_on_rejections() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("strict.toml");
    std::fs::write(&config, "strict = true\nformat = \"json\"\n").unwrap();

    isolated(&dir)
        .arg("score")
        .arg("--definition")
        .arg(repo_file("definitions/timed-checkpoint.toml"))
        .arg("--responses")
        .arg(repo_file("responses/timed-checkpoint-late.toml"))
        .arg("--output")
        .arg(dir.path().join("out"))
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("strict mode"));
}

#[test]
fn output_dir_from_environment() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("from-env");

    isolated(&dir)
        .env("ASSESSFORGE_OUTPUT_DIR", &out)
        .arg("score")
        .arg("--definition")
        .arg(repo_file("definitions/rust-basics.toml"))
        .arg("--responses")
        .arg(repo_file("responses/rust-basics-pass.toml"))
        .assert()
        .success();

    assert_eq!(files_with_extension(&out, "json").len(), 1);
}

#[test]
fn render_saved_report() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out");

    isolated(&dir)
        .arg("score")
        .arg("--definition")
        .arg(repo_file("definitions/rust-basics.toml"))
        .arg("--responses")
        .arg(repo_file("responses/rust-basics-pass.toml"))
        .arg("--output")
        .arg(&out)
        .assert()
        .success();

    let report = files_with_extension(&out, "json").remove(0);

    isolated(&dir)
        .arg("render")
        .arg("--report")
        .arg(&report)
        .arg("--format")
        .arg("markdown")
        .assert()
        .success()
        .stdout(predicate::str::contains("## Rust Basics (rust-basics)"))
        .stdout(predicate::str::contains("| ownership | 4 | 5 |"));
}

#[test]
fn render_unknown_format_fails() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out");

    isolated(&dir)
        .arg("score")
        .arg("--definition")
        .arg(repo_file("definitions/rust-basics.toml"))
        .arg("--responses")
        .arg(repo_file("responses/rust-basics-pass.toml"))
        .arg("--output")
        .arg(&out)
        .assert()
        .success();

    isolated(&dir)
        .arg("render")
        .arg("--report")
        .arg(files_with_extension(&out, "json").remove(0))
        .arg("--format")
        .arg("sarif")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format: sarif"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    isolated(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created assessforge.toml"))
        .stdout(predicate::str::contains("Created definitions/example.toml"))
        .stdout(predicate::str::contains("Created responses/example.toml"));

    assert!(dir.path().join("assessforge.toml").exists());
    assert!(dir.path().join("definitions/example.toml").exists());
    assert!(dir.path().join("responses/example.toml").exists());
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    isolated(&dir).arg("init").assert().success();

    isolated(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn init_output_scores_with_local_config() {
    let dir = TempDir::new().unwrap();

    isolated(&dir).arg("init").assert().success();

    isolated(&dir)
        .arg("score")
        .arg("--definition")
        .arg("definitions/example.toml")
        .arg("--responses")
        .arg("responses/example.toml")
        .assert()
        .success()
        .stdout(predicate::str::contains("Score: 2.5 / 3 (PASSED)"))
        .stdout(predicate::str::contains("Feedback: Passed: Well done."));

    let results = dir.path().join("assessforge-results");
    assert_eq!(files_with_extension(&results, "json").len(), 1);
}
