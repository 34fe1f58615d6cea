//! Smoke tests for command wiring and the local session commands

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// `atelier` with its home pointed at `home` and a neutral environment
fn atelier(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("atelier").unwrap();
    cmd.current_dir(home.path())
        .env("ATELIER_HOME", home.path())
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("NODE_ENV");
    cmd
}

fn write_credentials(home: &TempDir, username: &str) {
    let json = format!(
        r#"{{"token":"tok_test","user":{{"id":"u1","username":"{username}","email":null,"displayName":null}},"savedAt":"2026-01-01T00:00:00Z"}}"#
    );
    std::fs::write(home.path().join("credentials.json"), json).unwrap();
}

// === Help ===

#[test]
fn test_help_lists_commands() {
    let home = TempDir::new().unwrap();
    atelier(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("logout"))
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("migrate"));
}

#[test]
fn test_serve_help() {
    let home = TempDir::new().unwrap();
    atelier(&home)
        .args(["serve", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--cors-permissive"))
        .stdout(predicate::str::contains("--migrate"));
}

#[test]
fn test_login_help() {
    let home = TempDir::new().unwrap();
    atelier(&home)
        .args(["login", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--token"));
}

#[test]
fn test_logout_takes_no_flags() {
    let home = TempDir::new().unwrap();
    atelier(&home).args(["logout", "--all"]).assert().failure();
}

// === Logout ===

#[test]
fn test_logout_when_not_logged_in() {
    let home = TempDir::new().unwrap();

    atelier(&home)
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("You are not logged in."));

    assert!(!home.path().join("credentials.json").exists());
}

#[test]
fn test_logout_when_logged_in() {
    let home = TempDir::new().unwrap();
    write_credentials(&home, "ada");

    atelier(&home)
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged out ada."));

    assert!(!home.path().join("credentials.json").exists());

    // Second logout is a no-op with the distinct message
    atelier(&home)
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("You are not logged in."));
}

// === Whoami ===

#[test]
fn test_whoami() {
    let home = TempDir::new().unwrap();

    atelier(&home)
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("You are not logged in."));

    write_credentials(&home, "grace");

    atelier(&home)
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("grace"));
}

// === Completions ===

#[test]
fn test_completions_bash() {
    let home = TempDir::new().unwrap();
    atelier(&home)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("atelier"));
}

// === Configuration ===

#[test]
fn test_login_server_comes_from_home_env_file() {
    let home = TempDir::new().unwrap();
    // Port 9 (discard) refuses connections, so login fails at the request
    std::fs::write(
        home.path().join(".env"),
        "ATELIER_SERVER_URL=http://127.0.0.1:9\n",
    )
    .unwrap();

    atelier(&home)
        .env_remove("ATELIER_SERVER_URL")
        .env_remove("HTTP_PROXY")
        .env_remove("http_proxy")
        .env_remove("ALL_PROXY")
        .env_remove("all_proxy")
        .args(["login", "--token", "tok_test"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to reach http://127.0.0.1:9"));

    assert!(!home.path().join("credentials.json").exists());
}

#[test]
fn test_env_file_in_home_is_loaded_once() {
    let home = TempDir::new().unwrap();
    std::fs::write(home.path().join(".env"), "NODE_ENV=test\n").unwrap();

    // The working directory is the home, so both lookups find the same file
    atelier(&home)
        .env("RUST_LOG", "info")
        .arg("whoami")
        .assert()
        .success()
        .stderr(predicate::str::contains("Loaded configuration from").count(1))
        .stderr(predicate::str::contains(".env,").not());
}

// === Serve ===

#[test]
fn test_serve_refuses_permissive_cors_in_production() {
    let home = TempDir::new().unwrap();

    atelier(&home)
        .env("NODE_ENV", "production")
        .args(["serve", "--cors-permissive"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not allowed when NODE_ENV=production"));
}
