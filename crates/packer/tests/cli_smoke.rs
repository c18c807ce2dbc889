use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn packer() -> Command {
    let mut cmd = Command::cargo_bin("packer").expect("binary exists");
    cmd.env_remove("PACKER_STRATEGY")
        .env_remove("PACKER_ON_ERROR")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_displays_usage() {
    packer()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn packs_example_file() {
    let expected = fs::read_to_string(fixture("example_output.txt")).unwrap();
    packer()
        .args(["pack", "--no-config"])
        .arg(fixture("example_input.txt"))
        .assert()
        .success()
        .stdout(expected);
}

#[test]
fn reads_packages_from_stdin() {
    packer()
        .args(["pack", "--no-config", "-"])
        .write_stdin("10 : (1,5,€5) (2,5,€6) (3,6,€20)\n0 : (1,1,€1)\n")
        .assert()
        .success()
        .stdout("3\n-\n");
}

#[test]
fn malformed_line_aborts_by_default() {
    packer()
        .args(["pack", "--no-config"])
        .arg(fixture("malformed_input.txt"))
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("line 2"));
}

#[test]
fn malformed_line_can_be_skipped() {
    packer()
        .args(["pack", "--no-config", "--on-error", "skip"])
        .arg(fixture("malformed_input.txt"))
        .assert()
        .success()
        .stdout("4\n-\n");
}

#[test]
fn env_override_selects_policy() {
    packer()
        .env("PACKER_ON_ERROR", "skip")
        .args(["pack", "--no-config"])
        .arg(fixture("malformed_input.txt"))
        .assert()
        .success()
        .stdout("4\n-\n");
}

#[test]
fn json_format_reports_totals() {
    packer()
        .args(["pack", "--no-config", "--format", "json", "--parallel"])
        .arg(fixture("example_input.txt"))
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total_value\": \"148.00\""))
        .stdout(predicate::str::contains("\"strategy\": \"dynamic\""));
}

#[test]
fn missing_input_file_fails() {
    packer()
        .args(["pack", "--no-config", "does-not-exist.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read input file"));
}

#[test]
fn prints_completions() {
    packer()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("packer"));
}
