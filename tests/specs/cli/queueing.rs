//! Black-box specs for queueing jobs through the CLI.

use assert_cmd::Command;
use std::path::Path;

const RUN: &str = "/testZone/home/irods/expt1/run_folder";

fn workbot(database: &Path) -> Command {
    let mut cmd = Command::cargo_bin("workbot").unwrap();
    cmd.env("WORKBOT_DATABASE", database);
    cmd
}

#[test]
fn init_then_add_queues_one_job() {
    let dir = tempfile::tempdir().unwrap();
    let database = dir.path().join("workbot.db");

    workbot(&database).arg("init").assert().success();

    let assert = workbot(&database)
        .args([
            "add",
            RUN,
            "--work-type",
            "ONTRunData",
            "--experiment-name",
            "experiment_01",
            "--instrument-slot",
            "1",
        ])
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    assert!(stdout.contains("queued job"));

    // The same dataset cannot be queued twice while work is unfinished.
    let assert = workbot(&database)
        .args(["add", RUN, "--work-type", "ONTRunData"])
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    assert!(stdout.contains("already queued"));
}

#[test]
fn add_without_a_database_fails() {
    let mut cmd = Command::cargo_bin("workbot").unwrap();
    cmd.env_remove("WORKBOT_DATABASE");
    cmd.args(["add", RUN, "--work-type", "ONTRunData"])
        .assert()
        .failure();
}

#[test]
fn a_slot_without_an_experiment_name_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let database = dir.path().join("workbot.db");
    workbot(&database).arg("init").assert().success();

    workbot(&database)
        .args([
            "add",
            RUN,
            "--work-type",
            "ONTRunData",
            "--instrument-slot",
            "1",
        ])
        .assert()
        .failure();
}
