//! CLI help output specs.

use assert_cmd::Command;

fn workbot() -> Command {
    Command::cargo_bin("workbot").unwrap()
}

#[test]
fn help_shows_usage_and_subcommands() {
    let assert = workbot().arg("--help").assert().success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    assert!(stdout.contains("Usage:"));
    for subcommand in ["init", "add", "run", "cancel"] {
        assert!(stdout.contains(subcommand), "missing {subcommand}");
    }
}

#[test]
fn run_help_documents_the_window_flags() {
    let assert = workbot().args(["run", "--help"]).assert().success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    assert!(stdout.contains("--start-date"));
    assert!(stdout.contains("--work-type"));
    assert!(stdout.contains("--zone"));
}

#[test]
fn a_bad_work_type_is_rejected_at_the_parser() {
    workbot()
        .args(["add", "/testZone/x", "--work-type", "ONTRunVideo"])
        .assert()
        .failure();
}
