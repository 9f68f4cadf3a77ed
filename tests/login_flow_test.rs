// ABOUTME: End-to-end login flows against the mock authenticator: silent, interactive, MFA, failures
// ABOUTME: Exercises the worker, session store, handoff, and the submit_mfa_code tool together
//
// SPDX-License-Identifier: MIT OR Apache-2.0

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;

use common::{credentials, harness, sample_bundle, seed_tokens, wait_for_state, MockAuthenticator};
use garmin_mcp_server::auth::state::AuthState;
use garmin_mcp_server::auth::tokens::TokenStore;
use garmin_mcp_server::errors::{AuthFailure, StateError};
use garmin_mcp_server::jsonrpc::JsonRpcRequest;
use garmin_mcp_server::mcp::protocol;
use serde_json::json;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

fn tool_call(name: &str, arguments: serde_json::Value) -> JsonRpcRequest {
    JsonRpcRequest {
        jsonrpc: "2.0".into(),
        method: "tools/call".into(),
        params: Some(json!({"name": name, "arguments": arguments})),
        id: Some(json!(1)),
    }
}

#[tokio::test]
async fn silent_login_from_persisted_tokens() {
    let tmp = tempfile::tempdir().unwrap();
    seed_tokens(tmp.path(), &sample_bundle());

    let h = harness(
        tmp.path(),
        MockAuthenticator {
            silent_ok: true,
            ..MockAuthenticator::default()
        },
        None,
        REQUEST_TIMEOUT,
    );
    h.worker.spawn().unwrap().await.unwrap();

    assert_eq!(h.store.state(), AuthState::Authenticated);
    assert!(h.store.client().is_some());
}

#[tokio::test]
async fn persistence_failure_after_silent_login_is_terminal() {
    let tmp = tempfile::tempdir().unwrap();
    seed_tokens(tmp.path(), &sample_bundle());
    // Re-saving the refreshed bundle will fail: the base64 path is a directory.
    std::fs::remove_file(tmp.path().join("tokens.b64")).unwrap();
    std::fs::create_dir(tmp.path().join("tokens.b64")).unwrap();

    // Interactive login (with MFA) is fully configured; it must not be used.
    let h = harness(
        tmp.path(),
        MockAuthenticator {
            silent_ok: true,
            require_mfa: true,
            accepted_code: Some("123456".into()),
            ..MockAuthenticator::default()
        },
        Some(credentials()),
        REQUEST_TIMEOUT,
    );
    h.worker.spawn().unwrap().await.unwrap();

    assert!(matches!(
        h.store.state(),
        AuthState::Failed(AuthFailure::TokenPersistence(_))
    ));
    assert!(!h.handoff.is_pending(), "no MFA code may be demanded");
}

#[tokio::test]
async fn interactive_login_without_mfa_persists_tokens() {
    let tmp = tempfile::tempdir().unwrap();

    let h = harness(
        tmp.path(),
        MockAuthenticator::default(),
        Some(credentials()),
        REQUEST_TIMEOUT,
    );
    h.worker.spawn().unwrap().await.unwrap();

    assert_eq!(h.store.state(), AuthState::Authenticated);
    // The fresh bundle is persisted for the next process's silent login.
    let store = TokenStore::new(
        tmp.path().join("tokens"),
        tmp.path().join("tokens.b64"),
    );
    let persisted = store.load().unwrap();
    assert_eq!(persisted.oauth1.oauth_token, "oauth1-token");
    assert_eq!(persisted.oauth2.access_token, "access-token");
}

#[tokio::test]
async fn mfa_login_completes_via_submit_tool() {
    let tmp = tempfile::tempdir().unwrap();

    let h = harness(
        tmp.path(),
        MockAuthenticator {
            require_mfa: true,
            accepted_code: Some("123456".into()),
            ..MockAuthenticator::default()
        },
        Some(credentials()),
        REQUEST_TIMEOUT,
    );
    let handle = h.worker.spawn().unwrap();

    wait_for_state(&h.store, |s| *s == AuthState::AwaitingMfa).await;

    // A data tool at this point names the way out.
    let response = protocol::handle(&h.resources, tool_call("list_activities", json!({})))
        .await
        .unwrap();
    let result = response.result.unwrap();
    assert_eq!(result["isError"], true);
    assert!(result["content"][0]["text"]
        .as_str()
        .unwrap()
        .contains("submit_mfa_code"));

    let response = protocol::handle(
        &h.resources,
        tool_call("submit_mfa_code", json!({"code": "123456"})),
    )
    .await
    .unwrap();
    let result = response.result.unwrap();
    assert_eq!(result["isError"], false);
    assert_eq!(
        result["content"][0]["text"],
        "MFA code entered successfully."
    );

    handle.await.unwrap();
    assert_eq!(h.store.state(), AuthState::Authenticated);
}

#[tokio::test]
async fn wrong_mfa_code_fails_the_login() {
    let tmp = tempfile::tempdir().unwrap();

    let h = harness(
        tmp.path(),
        MockAuthenticator {
            require_mfa: true,
            accepted_code: Some("123456".into()),
            ..MockAuthenticator::default()
        },
        Some(credentials()),
        REQUEST_TIMEOUT,
    );
    let handle = h.worker.spawn().unwrap();

    wait_for_state(&h.store, |s| *s == AuthState::AwaitingMfa).await;

    let response = protocol::handle(
        &h.resources,
        tool_call("submit_mfa_code", json!({"code": "000000"})),
    )
    .await
    .unwrap();
    let result = response.result.unwrap();
    assert_eq!(result["isError"], true);
    assert!(result["content"][0]["text"]
        .as_str()
        .unwrap()
        .contains("Failed to complete login"));

    handle.await.unwrap();
    assert!(matches!(
        h.store.state(),
        AuthState::Failed(AuthFailure::CredentialsRejected(_))
    ));
}

#[tokio::test]
async fn missing_credentials_is_a_terminal_failure() {
    let tmp = tempfile::tempdir().unwrap();

    let h = harness(tmp.path(), MockAuthenticator::default(), None, REQUEST_TIMEOUT);
    h.worker.spawn().unwrap().await.unwrap();

    assert_eq!(
        h.store.state(),
        AuthState::Failed(AuthFailure::MissingCredentials)
    );
    // Data tools report the terminal failure, not a retry hint.
    let response = protocol::handle(&h.resources, tool_call("get_sleep", json!({})))
        .await
        .unwrap();
    let result = response.result.unwrap();
    assert_eq!(result["isError"], true);
    assert!(result["content"][0]["text"]
        .as_str()
        .unwrap()
        .contains("login failed"));
}

#[tokio::test]
async fn mfa_timeout_fails_the_login() {
    let tmp = tempfile::tempdir().unwrap();

    let h = harness(
        tmp.path(),
        MockAuthenticator {
            require_mfa: true,
            accepted_code: Some("123456".into()),
            ..MockAuthenticator::default()
        },
        Some(credentials()),
        Duration::from_millis(50),
    );
    h.worker.spawn().unwrap().await.unwrap();

    assert_eq!(h.store.state(), AuthState::Failed(AuthFailure::MfaTimeout));

    // A submit after the deadline is rejected in-band, never silently eaten.
    let response = protocol::handle(
        &h.resources,
        tool_call("submit_mfa_code", json!({"code": "123456"})),
    )
    .await
    .unwrap();
    let result = response.result.unwrap();
    assert_eq!(result["isError"], true);
    assert!(result["content"][0]["text"]
        .as_str()
        .unwrap()
        .contains("No MFA request is pending"));
}

#[tokio::test]
async fn second_spawn_is_rejected() {
    let tmp = tempfile::tempdir().unwrap();

    let h = harness(tmp.path(), MockAuthenticator::default(), None, REQUEST_TIMEOUT);
    let handle = h.worker.spawn().unwrap();
    assert!(matches!(
        h.worker.spawn(),
        Err(StateError::LoginAlreadyRunning)
    ));
    handle.await.unwrap();
}

#[tokio::test]
async fn auth_status_reflects_each_phase() {
    let tmp = tempfile::tempdir().unwrap();

    let h = harness(
        tmp.path(),
        MockAuthenticator {
            require_mfa: true,
            accepted_code: Some("123456".into()),
            ..MockAuthenticator::default()
        },
        Some(credentials()),
        REQUEST_TIMEOUT,
    );
    let handle = h.worker.spawn().unwrap();
    wait_for_state(&h.store, |s| *s == AuthState::AwaitingMfa).await;

    let response = protocol::handle(&h.resources, tool_call("get_auth_status", json!({})))
        .await
        .unwrap();
    let text = response.result.unwrap()["content"][0]["text"]
        .as_str()
        .unwrap()
        .to_owned();
    assert!(text.contains("waiting for an MFA code"));

    h.handoff.submit("123456".into()).unwrap();
    handle.await.unwrap();

    let response = protocol::handle(&h.resources, tool_call("get_auth_status", json!({})))
        .await
        .unwrap();
    let text = response.result.unwrap()["content"][0]["text"]
        .as_str()
        .unwrap()
        .to_owned();
    assert!(text.contains("Logged in"));
}
