// ABOUTME: Background login worker: silent token login, interactive fallback, MFA suspension
// ABOUTME: Runs exactly once per process; every failure funnels into the terminal Failed state
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Login Worker
//!
//! Performs the authentication handshake exactly once per process lifetime,
//! on a background task, never blocking the component that started it.
//!
//! Flow: silent login from the persisted token bundle; on any silent-login
//! failure, interactive login with the configured credentials, wiring the
//! MFA handoff in as the code source. While the handshake waits for a code
//! the worker's task is suspended in the handoff and the foreground keeps
//! serving tool calls, including the `submit_mfa_code` call that releases
//! it. On success the refreshed bundle is persisted in both storage forms
//! and the store is authenticated; on any unrecoverable error the store
//! moves to `Failed` and stays there until the process restarts.

use crate::auth::handoff::MfaHandoff;
use crate::auth::session::SessionStore;
use crate::auth::state::AuthState;
use crate::auth::tokens::TokenStore;
use crate::config::Credentials;
use crate::errors::{AuthError, AuthResult, StateError};
use crate::providers::connect::ConnectClient;
use crate::providers::sso::{GarminAuthenticator, MfaCodeSource};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Background worker owning the one login attempt this process gets.
pub struct LoginWorker {
    store: Arc<SessionStore>,
    handoff: Arc<MfaHandoff>,
    authenticator: Arc<dyn GarminAuthenticator>,
    tokens: TokenStore,
    credentials: Option<Credentials>,
    started: AtomicBool,
}

impl LoginWorker {
    /// Assemble a worker; nothing runs until [`LoginWorker::spawn`].
    pub fn new(
        store: Arc<SessionStore>,
        handoff: Arc<MfaHandoff>,
        authenticator: Arc<dyn GarminAuthenticator>,
        tokens: TokenStore,
        credentials: Option<Credentials>,
    ) -> Self {
        Self {
            store,
            handoff,
            authenticator,
            tokens,
            credentials,
            started: AtomicBool::new(false),
        }
    }

    /// Start the handshake in the background and return immediately.
    ///
    /// At most one spawn per worker: a second call is
    /// [`StateError::LoginAlreadyRunning`], closing the door on a duplicate
    /// attempt silently overwriting an outstanding MFA request.
    pub fn spawn(self: &Arc<Self>) -> Result<tokio::task::JoinHandle<()>, StateError> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(StateError::LoginAlreadyRunning);
        }
        let worker = Arc::clone(self);
        Ok(tokio::spawn(async move { worker.run().await }))
    }

    async fn run(&self) {
        if let Err(err) = self.login().await {
            error!(%err, "login attempt failed; restart the process to retry");
            let failed = AuthState::Failed(err.failure());
            if let Err(state_err) = self.store.transition(failed) {
                // Already terminal; nothing more to record.
                warn!(%state_err, "could not record login failure");
            }
        }
    }

    async fn login(&self) -> AuthResult<()> {
        self.set_state(AuthState::Pending)?;

        match self.silent_login().await {
            Ok(()) => return Ok(()),
            // The handshake itself succeeded here; persisting or finishing
            // failed. Falling back would demand credentials or an MFA code
            // the user should not need, so the attempt ends.
            Err(err @ (AuthError::TokenPersistence(_) | AuthError::State(_))) => {
                return Err(err);
            }
            Err(err) => {
                info!(%err, "silent login unavailable; falling back to interactive login");
            }
        }

        let credentials = self
            .credentials
            .as_ref()
            .ok_or(AuthError::MissingCredentials)?;

        let source = HandoffCodeSource {
            store: &self.store,
            handoff: &self.handoff,
        };
        let bundle = self
            .authenticator
            .login_with_credentials(credentials, &source)
            .await?;

        self.tokens.save(&bundle)?;
        self.finish(&bundle)
    }

    /// Token-based login without user interaction.
    async fn silent_login(&self) -> AuthResult<()> {
        info!(
            dir = %self.tokens.dir().display(),
            "trying silent login from persisted token bundle"
        );
        let persisted = self.tokens.load()?;
        let refreshed = self.authenticator.login_with_tokens(persisted).await?;
        // Keep the stored bundle current with whatever the refresh produced.
        self.tokens.save(&refreshed)?;
        self.finish(&refreshed)
    }

    fn finish(&self, bundle: &crate::auth::tokens::TokenBundle) -> AuthResult<()> {
        let client = ConnectClient::new(bundle)
            .map_err(|e| AuthError::Transport(e.to_string()))?;
        self.store.authenticate(Arc::new(client))?;
        info!("login complete; Garmin Connect client ready");
        Ok(())
    }

    fn set_state(&self, state: AuthState) -> AuthResult<()> {
        self.store.transition(state).map_err(AuthError::from)
    }
}

/// Adapter making the handoff usable as the handshake's MFA code source.
///
/// Publishes `AwaitingMfa` before opening the request so the tool gate can
/// tell callers to submit a code, and returns to `Pending` once one arrives.
struct HandoffCodeSource<'a> {
    store: &'a SessionStore,
    handoff: &'a MfaHandoff,
}

#[async_trait]
impl MfaCodeSource for HandoffCodeSource<'_> {
    async fn obtain_code(&self) -> AuthResult<String> {
        self.store.transition(AuthState::AwaitingMfa)?;
        let pending = self.handoff.begin()?;
        info!("waiting for an MFA code via the submit_mfa_code tool");

        let code = pending.wait().await?;

        self.store.transition(AuthState::Pending)?;
        info!("MFA code received; resuming the login handshake");
        Ok(code)
    }
}
