//! Smoke tests to verify command wiring

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_help_lists_commands() {
    let mut cmd = Command::cargo_bin("subway").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("migrate"));
}

#[test]
fn test_version() {
    let mut cmd = Command::cargo_bin("subway").unwrap();
    cmd.arg("--version");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_serve_help() {
    let mut cmd = Command::cargo_bin("subway").unwrap();
    cmd.arg("serve").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--in-memory"))
        .stdout(predicate::str::contains("--database-url"));
}

#[test]
fn test_migrate_without_database_url_fails() {
    let home = std::env::temp_dir().join("subway-smoke-home");
    let mut cmd = Command::cargo_bin("subway").unwrap();
    cmd.arg("migrate")
        .env_remove("DATABASE_URL")
        .env("HOME", &home)
        .current_dir(std::env::temp_dir());

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("DATABASE_URL not set"));
}

#[test]
fn test_unknown_command_fails() {
    let mut cmd = Command::cargo_bin("subway").unwrap();
    cmd.arg("frobnicate");

    cmd.assert().failure();
}
