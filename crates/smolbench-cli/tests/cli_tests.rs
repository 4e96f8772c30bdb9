//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn smolbench() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("smolbench").unwrap()
}

const MIXED_DATASET: &str = concat!(
    "{\"question\": \"2+2?\", \"choices\": [\"3\", \"4\", \"5\", \"6\"], \"answer\": 1}\n",
    "{\"question\": \"Flat earth?\", \"choices\": [\"Yes\", \"No\"], \"gold_index\": 1}\n",
    "{\"question\": \"Speed?\", \"answer\": \"60\", \"equation\": \"120/2\"}\n",
    "{\"unrecognizable\": true}\n",
);

#[test]
fn help_lists_subcommands() {
    smolbench()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("list-models"))
        .stdout(predicate::str::contains("init"));
}

#[test]
fn validate_classifies_local_dataset() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mixed.jsonl");
    std::fs::write(&path, MIXED_DATASET).unwrap();

    smolbench()
        .arg("validate")
        .arg("--dataset")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("4 examples"))
        .stdout(predicate::str::contains("multiple_choice: 1"))
        .stdout(predicate::str::contains("truthfulqa: 1"))
        .stdout(predicate::str::contains("mathqa: 1"))
        .stdout(predicate::str::contains("1 example(s) would be skipped"));
}

#[test]
fn validate_clean_dataset_reports_all_classified() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("clean.jsonl");
    std::fs::write(
        &path,
        "{\"question\": \"Q\", \"choices\": [\"a\", \"b\"], \"answer\": 0}\n",
    )
    .unwrap();

    smolbench()
        .arg("validate")
        .arg("--dataset")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("All examples classified."));
}

#[test]
fn validate_missing_file_fails() {
    smolbench()
        .arg("validate")
        .arg("--dataset")
        .arg("./nonexistent.jsonl")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn validate_malformed_line_reports_line_number() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.jsonl");
    std::fs::write(&path, "{\"question\": \"ok\"}\nnot json\n").unwrap();

    smolbench()
        .arg("validate")
        .arg("--dataset")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 2"));
}

#[test]
fn validate_rejects_malformed_reference() {
    smolbench()
        .arg("validate")
        .arg("--dataset")
        .arg("repo:")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid dataset reference"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    smolbench()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created smolbench.toml"))
        .stdout(predicate::str::contains("Created datasets/demo.jsonl"));

    assert!(dir.path().join("smolbench.toml").exists());
    assert!(dir.path().join("datasets/demo.jsonl").exists());
}

#[test]
fn init_demo_dataset_validates_cleanly() {
    let dir = TempDir::new().unwrap();

    smolbench().current_dir(dir.path()).arg("init").assert().success();

    smolbench()
        .current_dir(dir.path())
        .arg("validate")
        .arg("--dataset")
        .arg("./datasets/demo.jsonl")
        .assert()
        .success()
        .stdout(predicate::str::contains("5 examples"))
        .stdout(predicate::str::contains("All examples classified."));
}

#[test]
fn init_is_idempotent() {
    let dir = TempDir::new().unwrap();

    smolbench().current_dir(dir.path()).arg("init").assert().success();
    smolbench()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn run_against_dead_backend_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("one.jsonl");
    std::fs::write(
        &path,
        "{\"question\": \"Q\", \"choices\": [\"a\", \"b\"], \"answer\": 0}\n",
    )
    .unwrap();

    smolbench()
        .arg("run")
        .arg("--dataset")
        .arg(&path)
        .arg("--base-url")
        .arg("http://127.0.0.1:1")
        .assert()
        .failure()
        .stderr(predicate::str::contains("model unavailable"));
}
