//! End-to-end CLI tests for the pgn-downloader binary.

// `Command::cargo_bin` is deprecated in newer assert_cmd releases in favor of
// the `cargo_bin!` macro; keep the function form for toolchain compatibility.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds a command isolated from the user's config and log settings.
fn command(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("pgn-downloader").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env_remove("RUST_LOG")
        .arg("--no-progress");
    cmd
}

async fn mount_listing(server: &MockServer, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path("/files.html"))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_archive(server: &MockServer, suffix_regex: &str, status: u16, expect: u64) {
    Mock::given(method("GET"))
        .and(path_regex(suffix_regex))
        .respond_with(ResponseTemplate::new(status).set_body_bytes(b"PK\x03\x04".to_vec()))
        .expect(expect)
        .mount(server)
        .await;
}

fn host_of(server: &MockServer) -> String {
    format!("{}/", server.uri())
}

/// Test that --help displays usage information and exits with code 0.
#[test]
fn test_binary_help_displays_usage() {
    let mut cmd = Command::cargo_bin("pgn-downloader").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Mirror the archive files"));
}

/// Test that --version displays version and exits with code 0.
#[test]
fn test_binary_version_displays_version() {
    let mut cmd = Command::cargo_bin("pgn-downloader").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("pgn-downloader"));
}

/// Test that invalid flags cause non-zero exit.
#[test]
fn test_binary_invalid_flag_returns_error() {
    let mut cmd = Command::cargo_bin("pgn-downloader").unwrap();
    cmd.arg("--invalid-flag")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[tokio::test]
async fn test_binary_full_run_then_rerun_skips() {
    let mock_server = MockServer::start().await;
    mount_listing(
        &mock_server,
        200,
        r#"<a href="openings/OwenDefense.zip">Owen</a><a href="index.html">home</a>"#,
    )
    .await;
    mount_archive(&mock_server, r"/openings/OwenDefense\.zip$", 200, 1).await;

    let config_home = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();

    command(&config_home)
        .arg("--host")
        .arg(host_of(&mock_server))
        .arg("--output-dir")
        .arg(output.path())
        .assert()
        .success()
        .stdout(predicate::str::starts_with("1\n"))
        .stdout(predicate::str::contains("Wrote"))
        .stdout(predicate::str::contains("-openings-OwenDefense.zip"))
        .stdout(predicate::str::ends_with("Complete.\n"));

    let written = output.path().join("-openings-OwenDefense.zip");
    assert_eq!(std::fs::read(&written).unwrap(), b"PK\x03\x04");

    command(&config_home)
        .arg("--host")
        .arg(host_of(&mock_server))
        .arg("--output-dir")
        .arg(output.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Already downloaded"))
        .stdout(predicate::str::contains("Wrote").not());
}

#[tokio::test]
async fn test_binary_listing_failure_prints_status_and_downloads_nothing() {
    let mock_server = MockServer::start().await;
    mount_listing(&mock_server, 404, "not found").await;
    mount_archive(&mock_server, r"\.zip$", 200, 0).await;

    let config_home = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();

    let assert = command(&config_home)
        .arg("--host")
        .arg(host_of(&mock_server))
        .arg("--output-dir")
        .arg(output.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("404"));
    assert_eq!(assert.get_output().status.code(), Some(1));

    assert_eq!(std::fs::read_dir(output.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_binary_dry_run_lists_targets_without_downloading() {
    let mock_server = MockServer::start().await;
    mount_listing(&mock_server, 200, r#"<a href="players/Carlsen.zip">Carlsen</a>"#).await;
    mount_archive(&mock_server, r"\.zip$", 200, 0).await;

    let config_home = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();

    command(&config_home)
        .arg("--host")
        .arg(host_of(&mock_server))
        .arg("--output-dir")
        .arg(output.path())
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("//players/Carlsen.zip -> "))
        .stdout(predicate::str::contains("-players-Carlsen.zip"));
}

#[tokio::test]
async fn test_binary_continue_on_error_exits_partial() {
    let mock_server = MockServer::start().await;
    mount_listing(
        &mock_server,
        200,
        r#"<a href="ok.zip">ok</a><a href="gone.zip">gone</a>"#,
    )
    .await;
    mount_archive(&mock_server, r"/ok\.zip$", 200, 1).await;
    mount_archive(&mock_server, r"/gone\.zip$", 410, 1).await;

    let config_home = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();

    let assert = command(&config_home)
        .arg("--host")
        .arg(host_of(&mock_server))
        .arg("--output-dir")
        .arg(output.path())
        .arg("--continue-on-error")
        .assert()
        .failure()
        .stderr(predicate::str::contains("1 of 2 archives failed"));
    assert_eq!(assert.get_output().status.code(), Some(2));
}

#[tokio::test]
async fn test_binary_missing_output_dir_fails() {
    let mock_server = MockServer::start().await;
    mount_listing(&mock_server, 200, r#"<a href="a.zip">a</a>"#).await;
    mount_archive(&mock_server, r"\.zip$", 200, 0).await;

    let config_home = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();

    command(&config_home)
        .arg("--host")
        .arg(host_of(&mock_server))
        .arg("--output-dir")
        .arg(output.path().join("database"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_binary_host_without_trailing_slash_is_rejected() {
    let config_home = TempDir::new().unwrap();

    command(&config_home)
        .arg("--host")
        .arg("https://example.test")
        .arg("--dry-run")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("must end with '/'"));
}

#[test]
fn test_binary_config_file_unknown_key_fails() {
    let config_home = TempDir::new().unwrap();
    let config = config_home.path().join("custom.toml");
    std::fs::write(&config, "concurrency = 3\n").unwrap();

    command(&config_home)
        .arg("--config")
        .arg(&config)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to parse config file"));
}

#[tokio::test]
async fn test_binary_reads_default_config_file() {
    let mock_server = MockServer::start().await;
    mount_listing(&mock_server, 200, r#"<a href="a.pgn">a</a><a href="b.zip">b</a>"#).await;
    mount_archive(&mock_server, r"\.zip$", 200, 0).await;

    let config_home = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let config_dir = config_home.path().join("pgn-downloader");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("config.toml"),
        format!(
            "host = \"{}\"\nmarker = \".pgn\"\noutput_dir = \"{}\"\n",
            host_of(&mock_server),
            output.path().display()
        ),
    )
    .unwrap();

    command(&config_home)
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("-a.pgn"))
        .stdout(predicate::str::contains("b.zip").not());
}
