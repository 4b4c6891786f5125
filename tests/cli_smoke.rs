//! Behavioural smoke tests for the CLI entrypoint.

#[path = "common/test_constants.rs"]
mod test_constants;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use test_constants::TEST_TOKEN;

const NOVA_ENV: [&str; 5] = [
    "NOVA_ENDPOINT",
    "NOVA_AUTH_TOKEN",
    "NOVA_POLL_INTERVAL_SECS",
    "NOVA_WAIT_TIMEOUT_SECS",
    "NOVA_REQUEST_TIMEOUT_SECS",
];

fn nova_wait() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("nova-wait");
    for name in NOVA_ENV {
        cmd.env_remove(name);
    }
    cmd.env_remove("NOVA_CONFIG_PATH");
    cmd
}

#[test]
fn help_lists_subcommands() {
    nova_wait()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("status").and(predicate::str::contains("deleted")));
}

#[test]
fn status_without_target_is_a_usage_error() {
    nova_wait()
        .args(["status", "server", "srv-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--target"));
}

#[test]
fn missing_configuration_exits_with_failure() {
    nova_wait()
        .args(["deleted", "server", "srv-1"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("configuration error"));
}

#[tokio::test(flavor = "multi_thread")]
async fn status_prints_snapshot_once_active() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/servers/srv-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "server": { "id": "srv-1", "name": "builder", "status": "ACTIVE" }
        })))
        .mount(&server)
        .await;
    let mut cmd = nova_wait();
    cmd.env("NOVA_ENDPOINT", server.uri())
        .env("NOVA_AUTH_TOKEN", TEST_TOKEN)
        .args(["status", "server", "srv-1", "--target", "active"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"status\": \"ACTIVE\""));
}

#[tokio::test(flavor = "multi_thread")]
async fn status_timeout_uses_distinct_exit_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/os-volumes/vol-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "volume": { "id": "vol-1", "status": "creating", "size": 1 }
        })))
        .mount(&server)
        .await;
    let mut cmd = nova_wait();
    cmd.env("NOVA_ENDPOINT", server.uri())
        .env("NOVA_AUTH_TOKEN", TEST_TOKEN)
        .args([
            "status",
            "volume",
            "vol-1",
            "--target",
            "available",
            "--interval",
            "1",
            "--timeout",
            "1",
        ]);

    cmd.assert()
        .code(2)
        .stderr(predicate::str::contains("vol-1").and(predicate::str::contains("creating")));
}

#[tokio::test(flavor = "multi_thread")]
async fn deleted_succeeds_when_resource_is_gone() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/images/img-1"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let mut cmd = nova_wait();
    cmd.env("NOVA_ENDPOINT", server.uri())
        .env("NOVA_AUTH_TOKEN", TEST_TOKEN)
        .args(["deleted", "image", "img-1"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("image img-1 deleted"));
}
