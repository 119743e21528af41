//! Integration tests for the `roster` CLI binary.
//!
//! Argument parsing, help output, shell completions and error handling run
//! without any server; the users commands run against a wiremock endpoint.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `roster` binary with env isolation.
///
/// Clears all `ROSTER_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn roster_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("roster");
    cmd.env("HOME", "/tmp/roster-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/roster-cli-test-nonexistent")
        .env_remove("ROSTER_URL")
        .env_remove("ROSTER_OUTPUT")
        .env_remove("ROSTER_TIMEOUT")
        .env_remove("ROSTER_PLACES_KEY")
        .env_remove("ROSTER_API__URL")
        .env_remove("ROSTER_PLACES__API_KEY")
        .env_remove("RUST_LOG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn user_json(id: u64, name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "username": name.to_lowercase(),
        "email": format!("{}@example.com", name.to_lowercase()),
        "phone": "1-770-736-8031",
        "website": "hildegard.org",
        "address": { "street": "Kulas Light", "suite": "Apt. 556", "city": "Gwenborough", "zipcode": "92998-3874" },
        "company": { "name": "Romaguera-Crona" }
    })
}

async fn users_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([user_json(1, "Leanne"), user_json(2, "Ervin")])),
        )
        .mount(&server)
        .await;
    server
}

/// Run the binary off the async runtime so the mock server keeps serving.
async fn run(args: Vec<String>) -> std::process::Output {
    tokio::task::spawn_blocking(move || roster_cmd().args(args).output().unwrap())
        .await
        .unwrap()
}

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_owned()).collect()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = roster_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    roster_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("JSON collection endpoint")
            .and(predicate::str::contains("users"))
            .and(predicate::str::contains("places"))
            .and(predicate::str::contains("config")),
    );
}

#[test]
fn test_short_help_flag() {
    roster_cmd().arg("-h").assert().success().stdout(
        predicate::str::contains("Manage a remote users collection")
            .and(predicate::str::contains("JSON collection endpoint").not()),
    );
}

#[test]
fn test_version_flag() {
    roster_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("roster"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    roster_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    roster_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path() {
    roster_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("roster").and(predicate::str::contains("config.toml")));
}

#[test]
fn test_config_show_no_config() {
    roster_cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("jsonplaceholder.typicode.com"));
}

#[test]
fn test_config_show_redacts_key() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("roster")).unwrap();
    std::fs::write(
        dir.path().join("roster").join("config.toml"),
        "[places]\napi_key = \"AIza-very-secret\"\n",
    )
    .unwrap();

    roster_cmd()
        .env("XDG_CONFIG_HOME", dir.path())
        .args(["config", "show", "-o", "json"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("\"api_key\": \"********\"")
                .and(predicate::str::contains("AIza-very-secret").not()),
        );
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = roster_cmd().arg("foobar").output().unwrap();
    assert!(!output.status.success(), "Expected failure for invalid subcommand");
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_invalid_output_format() {
    let output = roster_cmd()
        .args(["--output", "invalid", "users", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("possible values"), "unexpected output:\n{text}");
}

#[test]
fn test_invalid_url() {
    roster_cmd()
        .args(["--url", "not a url", "users", "list"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid URL"));
}

#[test]
fn test_unreachable_server_exits_with_connection_code() {
    roster_cmd()
        .args(["--url", "http://127.0.0.1:1/users", "users", "list"])
        .assert()
        .code(7)
        .stderr(predicate::str::contains("Could not reach"));
}

#[test]
fn test_create_validates_before_sending() {
    // Nothing listens on port 1, so reaching the network would exit 7.
    roster_cmd()
        .args([
            "--url",
            "http://127.0.0.1:1/users",
            "users",
            "create",
            "--name",
            "Kurtis",
            "--username",
            "kurtis",
            "--email",
            "not-an-email",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Email is invalid"));
}

// ── Users against a mock server ─────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_users_list_plain() {
    let server = users_server().await;
    let url = format!("{}/users", server.uri());

    let output = run(args(&["--url", &url, "-o", "plain", "users", "list"])).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "1\n2");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_users_list_json() {
    let server = users_server().await;
    let url = format!("{}/users", server.uri());

    let output = run(args(&["--url", &url, "-o", "json", "users", "list"])).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed[1]["name"], "Ervin");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_users_get_missing_exits_not_found() {
    let server = users_server().await;
    let url = format!("{}/users", server.uri());

    let output = run(args(&["--url", &url, "users", "get", "42"])).await;

    assert_eq!(output.status.code(), Some(4));
    assert!(String::from_utf8_lossy(&output.stderr).contains("not found"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_users_delete() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/users/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    let url = format!("{}/users", server.uri());

    let output = run(args(&["--url", &url, "users", "delete", "1"])).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(String::from_utf8_lossy(&output.stderr).contains("User 1 deleted"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_users_update_overlays_current_record() {
    let server = users_server().await;
    Mock::given(method("PUT"))
        .and(path("/users/2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json(2, "Ervin Howell")))
        .expect(1)
        .mount(&server)
        .await;
    let url = format!("{}/users", server.uri());

    let output = run(args(&[
        "--url",
        &url,
        "-o",
        "json",
        "users",
        "update",
        "2",
        "--name",
        "Ervin Howell",
    ]))
    .await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["name"], "Ervin Howell");

    let requests = server.received_requests().await.unwrap();
    let put = requests.iter().find(|r| r.method.as_str() == "PUT").unwrap();
    let body: serde_json::Value = serde_json::from_slice(&put.body).unwrap();
    assert_eq!(body["name"], "Ervin Howell");
    assert_eq!(body["email"], "ervin@example.com");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_server_error_exits_with_remote_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let url = format!("{}/users", server.uri());

    let output = run(args(&["--url", &url, "users", "list"])).await;

    assert_eq!(output.status.code(), Some(5));
    assert!(String::from_utf8_lossy(&output.stderr).contains("HTTP 503"));
}

// ── Places ──────────────────────────────────────────────────────────

#[test]
fn test_places_script_plain() {
    let output = roster_cmd()
        .args(["places", "script", "--key", "abc", "-o", "plain"])
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", combined_output(&output));
    let src = String::from_utf8_lossy(&output.stdout);
    assert!(
        src.starts_with(
            "https://maps.googleapis.com/maps/api/js?key=abc&libraries=places&loading=async&callback=roster_cb_"
        ),
        "unexpected src: {src}"
    );
}

#[test]
fn test_places_script_table_is_html() {
    roster_cmd()
        .args(["places", "script", "--key", "abc"])
        .assert()
        .success()
        .stdout(
            predicate::str::starts_with("<script src=\"https://maps.googleapis.com")
                .and(predicate::str::contains("&amp;libraries=places"))
                .and(predicate::str::contains(" defer></script>")),
        );
}

#[test]
fn test_places_script_without_key() {
    roster_cmd()
        .args(["places", "script"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No maps API key"));
}
