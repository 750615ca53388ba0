//! CLI smoke tests for the server binary.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_lists_flags() {
    Command::cargo_bin("haven_api_server")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--port"))
        .stdout(predicate::str::contains("--database-url"));
}

#[test]
fn rejects_unknown_flag() {
    Command::cargo_bin("haven_api_server")
        .unwrap()
        .arg("--no-such-flag")
        .assert()
        .failure();
}
