//! Integration tests for the `wgdash` CLI binary.
//!
//! Argument parsing, help output and error exit codes run without a
//! server; request paths run against a wiremock wgrest.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `wgdash` binary with env isolation.
///
/// Clears all `WGDASH_*` env vars and points the config file into `home`
/// so tests never touch the user's real configuration or tokens.
fn wgdash_cmd(home: &TempDir) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("wgdash");
    cmd.env("WGDASH_CONFIG", home.path().join("config.toml"))
        .env("NO_COLOR", "1")
        .env_remove("WGDASH_PROFILE")
        .env_remove("WGDASH_URL")
        .env_remove("WGDASH_TOKEN")
        .env_remove("WGDASH_OUTPUT")
        .env_remove("WGDASH_INSECURE")
        .env_remove("WGDASH_TIMEOUT");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Run the command off the async runtime so the mock server keeps serving.
async fn run(mut cmd: assert_cmd::Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let home = TempDir::new().unwrap();
    let output = wgdash_cmd(&home).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    let home = TempDir::new().unwrap();
    wgdash_cmd(&home).arg("--help").assert().success().stdout(
        predicate::str::contains("wgrest")
            .and(predicate::str::contains("devices"))
            .and(predicate::str::contains("peers")),
    );
}

#[test]
fn test_version_flag() {
    let home = TempDir::new().unwrap();
    wgdash_cmd(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("wgdash"));
}

#[test]
fn test_completions_bash() {
    let home = TempDir::new().unwrap();
    wgdash_cmd(&home)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_config_path_honours_env() {
    let home = TempDir::new().unwrap();
    wgdash_cmd(&home)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

// ── Errors without a server ─────────────────────────────────────────

#[test]
fn test_missing_config_is_usage_error() {
    let home = TempDir::new().unwrap();
    wgdash_cmd(&home)
        .args(["devices", "list"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No wgrest server configured"));
}

#[test]
fn test_unknown_view_exits_not_found() {
    let home = TempDir::new().unwrap();
    // Nothing listens on port 9; the route never reaches the network.
    wgdash_cmd(&home)
        .args(["open", "/nowhere", "--url", "http://127.0.0.1:9"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("/nowhere"));
}

#[test]
fn test_bad_sort_rejected_before_request() {
    let home = TempDir::new().unwrap();
    wgdash_cmd(&home)
        .args([
            "peers",
            "list",
            "wg0",
            "--sort",
            "size",
            "--url",
            "http://127.0.0.1:9",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("last_handshake_time"));
}

#[test]
fn test_delete_requires_yes_when_not_interactive() {
    let home = TempDir::new().unwrap();
    wgdash_cmd(&home)
        .args(["devices", "delete", "wg0", "--url", "http://127.0.0.1:9"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--yes"));
}

// ── Against a mock server ───────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_devices_list_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/devices/"))
        .and(header("Authorization", "Bearer t0k"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "name": "wg0", "listen_port": 51820, "running": true, "peers_count": 3 }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    let mut cmd = wgdash_cmd(&home);
    cmd.args(["devices", "list", "-o", "json", "--token", "t0k", "--url"])
        .arg(server.uri());
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let devices: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(devices[0]["name"], "wg0");
    assert_eq!(devices[0]["peers_count"], 3);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_token_without_terminal_exits_auth() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({ "code": "unauthorized", "message": "invalid token" })),
        )
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    let mut cmd = wgdash_cmd(&home);
    cmd.args(["devices", "list", "--token", "stale", "--url"])
        .arg(server.uri());
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(3), "{}", combined_output(&output));
    assert!(
        String::from_utf8_lossy(&output.stderr).contains("access token"),
        "{}",
        combined_output(&output)
    );
}
