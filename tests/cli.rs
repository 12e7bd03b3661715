use assert_cmd::Command;
use predicates::prelude::*;

fn cmd() -> Command {
    let mut cmd = Command::cargo_bin("registry-spray-rs").expect("binary builds");
    cmd.arg("--no-color");
    cmd
}

#[test]
fn setup_error_is_reported_once() {
    let assert = cmd()
        .args(["-t", "127.0.0.1:1", "-u", "admin"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("[-]"))
        .stderr(predicate::str::contains("passwords are required").not());
    let out = String::from_utf8_lossy(&assert.get_output().stdout).into_owned();
    assert_eq!(out.matches("passwords are required").count(), 1);
}

#[test]
fn huge_timeout_is_rejected_without_panicking() {
    cmd()
        .args(["-t", "127.0.0.1:1", "-T", "1e20"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("timeout too large"))
        .stderr(predicate::str::contains("panicked").not());
}

#[test]
fn oversized_worker_count_is_rejected() {
    cmd()
        .args(["-t", "127.0.0.1:1", "--workers", "4611686018427387903"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("workers must be between 1 and 1024"));
}
