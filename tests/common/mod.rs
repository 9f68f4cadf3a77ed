// ABOUTME: Shared integration-test fixtures: mock authenticator and a full server harness
// ABOUTME: The mock stands in for Garmin SSO at the GarminAuthenticator seam
//
// SPDX-License-Identifier: MIT OR Apache-2.0

// Each integration test binary compiles this module separately and uses a
// different subset of it.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use garmin_mcp_server::auth::handoff::MfaHandoff;
use garmin_mcp_server::auth::session::SessionStore;
use garmin_mcp_server::auth::tokens::{OAuth1Token, OAuth2Token, TokenBundle, TokenStore};
use garmin_mcp_server::auth::worker::LoginWorker;
use garmin_mcp_server::config::{Credentials, ServerConfig};
use garmin_mcp_server::errors::{AuthError, AuthResult};
use garmin_mcp_server::mcp::server::ServerResources;
use garmin_mcp_server::providers::sso::{GarminAuthenticator, MfaCodeSource};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// A token bundle good for an hour.
pub fn sample_bundle() -> TokenBundle {
    TokenBundle {
        oauth1: OAuth1Token {
            oauth_token: "oauth1-token".into(),
            oauth_token_secret: "oauth1-secret".into(),
            mfa_token: None,
            domain: "garmin.com".into(),
        },
        oauth2: OAuth2Token {
            access_token: "access-token".into(),
            refresh_token: "refresh-token".into(),
            token_type: "Bearer".into(),
            expires_at: Utc::now().timestamp() + 3600,
            refresh_token_expires_at: None,
            scope: None,
        },
    }
}

pub fn credentials() -> Credentials {
    Credentials {
        email: "athlete@example.com".into(),
        password: "hunter2".into(),
    }
}

/// Scripted stand-in for Garmin SSO.
#[derive(Default)]
pub struct MockAuthenticator {
    /// Accept the persisted bundle for silent login.
    pub silent_ok: bool,
    /// Demand an MFA code during interactive login.
    pub require_mfa: bool,
    /// The one code the mock accepts; any other is rejected.
    pub accepted_code: Option<String>,
    /// Reject the email/password outright.
    pub reject_credentials: bool,
}

#[async_trait]
impl GarminAuthenticator for MockAuthenticator {
    async fn login_with_tokens(&self, bundle: TokenBundle) -> AuthResult<TokenBundle> {
        if self.silent_ok {
            Ok(bundle)
        } else {
            Err(AuthError::SilentLoginUnavailable(
                "mock rejects persisted tokens".into(),
            ))
        }
    }

    async fn login_with_credentials(
        &self,
        _credentials: &Credentials,
        mfa: &dyn MfaCodeSource,
    ) -> AuthResult<TokenBundle> {
        if self.reject_credentials {
            return Err(AuthError::CredentialsRejected("bad password".into()));
        }
        if self.require_mfa {
            let code = mfa.obtain_code().await?;
            match &self.accepted_code {
                Some(accepted) if *accepted == code => {}
                _ => return Err(AuthError::CredentialsRejected("bad MFA code".into())),
            }
        }
        Ok(sample_bundle())
    }
}

/// Everything a login-flow test needs, wired the way the binary wires it.
pub struct Harness {
    pub store: Arc<SessionStore>,
    pub handoff: Arc<MfaHandoff>,
    pub worker: Arc<LoginWorker>,
    pub resources: ServerResources,
}

/// Build a harness over a temp directory, with a short MFA request timeout
/// unless the test overrides it.
pub fn harness(
    dir: &Path,
    authenticator: MockAuthenticator,
    creds: Option<Credentials>,
    mfa_request_timeout: Duration,
) -> Harness {
    let tokenstore_dir = dir.join("tokens");
    let tokenstore_base64 = dir.join("tokens.b64");

    let store = Arc::new(SessionStore::new());
    let handoff = Arc::new(MfaHandoff::new(mfa_request_timeout));
    let tokens = TokenStore::new(&tokenstore_dir, &tokenstore_base64);

    let worker = Arc::new(LoginWorker::new(
        Arc::clone(&store),
        Arc::clone(&handoff),
        Arc::new(authenticator),
        tokens,
        creds.clone(),
    ));

    let config = ServerConfig {
        credentials: creds,
        tokenstore_dir,
        tokenstore_base64,
        mfa_request_timeout,
        mfa_submit_wait: Duration::from_secs(2),
    };
    let resources = ServerResources::new(Arc::clone(&store), Arc::clone(&handoff), config);

    Harness {
        store,
        handoff,
        worker,
        resources,
    }
}

/// Persist a bundle where the harness's token store will find it.
pub fn seed_tokens(dir: &Path, bundle: &TokenBundle) {
    let store = TokenStore::new(dir.join("tokens"), dir.join("tokens.b64"));
    store.save(bundle).expect("seeding tokens");
}

/// Block (bounded) until the store's state satisfies `pred`.
pub async fn wait_for_state<F>(store: &SessionStore, pred: F)
where
    F: FnMut(&garmin_mcp_server::auth::state::AuthState) -> bool,
{
    let mut rx = store.subscribe();
    tokio::time::timeout(Duration::from_secs(5), rx.wait_for(pred))
        .await
        .expect("state not reached in time")
        .expect("state channel closed");
}
