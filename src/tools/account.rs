// ABOUTME: Account tools: auth status inspection and the interactive MFA code submission
// ABOUTME: The only tools that work before authentication completes
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Account tools.
//!
//! `get_auth_status` reports the live auth state without blocking.
//! `submit_mfa_code` deposits a code into the MFA handoff, then waits a
//! short bounded interval for the login to reach a terminal state so the
//! caller learns the outcome in the same response when it arrives quickly.

use crate::auth::state::AuthState;
use crate::errors::StateError;
use crate::mcp::schema::{ToolResponse, ToolSchema};
use crate::mcp::server::ServerResources;
use crate::tools::object_schema;
use serde_json::Value;
use tracing::info;

pub(crate) fn descriptors() -> Vec<ToolSchema> {
    vec![
        ToolSchema {
            name: "get_auth_status".into(),
            description: "Check the current Garmin Connect login status. Reports whether \
                          login is complete, still in progress, waiting for an MFA code, \
                          or has failed."
                .into(),
            input_schema: object_schema(&[]),
        },
        ToolSchema {
            name: "submit_mfa_code".into(),
            description: "Submit the multi-factor authentication code Garmin sent to the \
                          user. Call this when get_auth_status or another tool reports \
                          that login is waiting for an MFA code."
                .into(),
            input_schema: object_schema(&[(
                "code",
                "The MFA code from the user's email or authenticator app",
                true,
            )]),
        },
    ]
}

pub(crate) fn get_auth_status(resources: &ServerResources) -> ToolResponse {
    let message = match resources.store.state() {
        AuthState::Unauthenticated => "Login has not started yet.".to_owned(),
        AuthState::Pending => "Login is in progress.".to_owned(),
        AuthState::AwaitingMfa => {
            "Login is waiting for an MFA code. Ask the user for the code and call \
             submit_mfa_code with it."
                .to_owned()
        }
        AuthState::Authenticated => "Logged in to Garmin Connect.".to_owned(),
        AuthState::Failed(reason) => {
            format!("Login failed: {reason}. Restart the server to try again.")
        }
    };
    ToolResponse::text(message)
}

pub(crate) async fn submit_mfa_code(resources: &ServerResources, args: &Value) -> ToolResponse {
    let code = match crate::tools::require_str(args, "code") {
        Ok(code) => code.trim().to_owned(),
        Err(response) => return response,
    };

    match resources.handoff.submit(code) {
        Ok(()) => {}
        Err(StateError::NoMfaRequestPending) => {
            return ToolResponse::error(
                "No MFA request is pending. Either login is not waiting for a code, \
                 or another submission already consumed this request.",
            );
        }
        Err(e) => return ToolResponse::error(format!("Could not submit MFA code: {e}")),
    }
    info!("MFA code accepted; waiting briefly for the login outcome");

    // The worker resumes the handshake now; give it a short window to reach
    // a terminal state so the caller sees the outcome in this response.
    match resources
        .store
        .wait_for_terminal(resources.config.mfa_submit_wait)
        .await
    {
        Some(AuthState::Authenticated) => ToolResponse::text("MFA code entered successfully."),
        Some(AuthState::Failed(reason)) => {
            ToolResponse::error(format!("Failed to complete login: {reason}"))
        }
        // wait_for_terminal only yields terminal states.
        Some(_) | None => ToolResponse::text(
            "MFA code submitted; login is still completing. Call get_auth_status to check.",
        ),
    }
}
