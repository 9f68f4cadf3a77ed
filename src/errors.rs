// ABOUTME: Central error taxonomy for authentication, state machine misuse, and provider calls
// ABOUTME: AuthError funnels into terminal Failed state; StateError surfaces caller misuse; ProviderError stays per-call
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Error Handling
//!
//! Three error families with distinct propagation policies:
//!
//! - [`AuthError`]: anything that ends a login attempt. These funnel into the
//!   terminal `Failed` auth state and are never retried automatically.
//! - [`StateError`]: caller or programmer misuse of the auth state machine
//!   (invalid transition, duplicate MFA request, submit with nothing pending).
//!   Surfaced immediately, never retried.
//! - [`ProviderError`]: a single Garmin Connect data call failing. Local to
//!   that call; never touches the auth state.

use crate::auth::state::AuthState;
use thiserror::Error;

/// Errors raised while running the login handshake.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No usable persisted token bundle, or the bundle was rejected.
    #[error("silent login unavailable: {0}")]
    SilentLoginUnavailable(String),

    /// Garmin Connect rejected the email/password or the MFA code.
    #[error("Garmin Connect rejected the login: {0}")]
    CredentialsRejected(String),

    /// The bounded wait for an interactively submitted MFA code expired.
    #[error("timed out waiting for an MFA code")]
    MfaTimeout,

    /// Interactive login was needed but no credentials are configured.
    #[error("GARMIN_EMAIL / GARMIN_PASSWORD are not configured; interactive login unavailable")]
    MissingCredentials,

    /// Network or protocol failure during the handshake.
    #[error("transport failure during login: {0}")]
    Transport(String),

    /// Writing the token bundle to disk failed; this fails the whole attempt.
    #[error("failed to persist token bundle: {0}")]
    TokenPersistence(String),

    /// State machine misuse detected mid-handshake.
    #[error(transparent)]
    State(#[from] StateError),
}

impl AuthError {
    /// The terminal failure reason recorded in `AuthState::Failed`.
    pub fn failure(&self) -> AuthFailure {
        match self {
            Self::MfaTimeout => AuthFailure::MfaTimeout,
            Self::CredentialsRejected(m) => AuthFailure::CredentialsRejected(m.clone()),
            Self::MissingCredentials => AuthFailure::MissingCredentials,
            Self::SilentLoginUnavailable(m) | Self::Transport(m) => {
                AuthFailure::Transport(m.clone())
            }
            Self::TokenPersistence(m) => AuthFailure::TokenPersistence(m.clone()),
            Self::State(e) => AuthFailure::Internal(e.to_string()),
        }
    }
}

/// Why a login attempt ended in the terminal `Failed` state.
///
/// Cheap to clone so it can live inside [`AuthState`] snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthFailure {
    /// No MFA code arrived within the request timeout.
    MfaTimeout,
    /// Garmin Connect rejected the credentials or the MFA code.
    CredentialsRejected(String),
    /// No credentials configured and no usable token bundle.
    MissingCredentials,
    /// Network or protocol failure.
    Transport(String),
    /// Token persistence failed after an otherwise successful handshake.
    TokenPersistence(String),
    /// Invariant violation; indicates a bug rather than an external condition.
    Internal(String),
}

impl std::fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MfaTimeout => write!(f, "timed out waiting for an MFA code"),
            Self::CredentialsRejected(m) => write!(f, "login rejected: {m}"),
            Self::MissingCredentials => write!(f, "no credentials configured"),
            Self::Transport(m) => write!(f, "transport failure: {m}"),
            Self::TokenPersistence(m) => write!(f, "token persistence failed: {m}"),
            Self::Internal(m) => write!(f, "internal error: {m}"),
        }
    }
}

/// Misuse of the auth state machine or the MFA handoff.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    /// A transition outside the monotonic state order was attempted.
    #[error("invalid auth state transition: {from} -> {to}")]
    InvalidTransition {
        /// State the store was in.
        from: AuthState,
        /// State the caller asked for.
        to: AuthState,
    },

    /// A second MFA request was opened while one is still outstanding.
    #[error("an MFA request is already outstanding")]
    DuplicateMfaRequest,

    /// `submit_mfa_code` was called with no request outstanding, or another
    /// submitter won the race for the single deposited code.
    #[error("no MFA request is pending")]
    NoMfaRequestPending,

    /// A second login worker was spawned in the same process.
    #[error("a login attempt is already running")]
    LoginAlreadyRunning,
}

/// A single Garmin Connect data call failing.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Request-level failure (connect, TLS, non-auth HTTP error).
    #[error("Garmin Connect request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Garmin Connect no longer accepts the session token.
    #[error("Garmin Connect session is no longer authorized")]
    AuthExpired,

    /// The requested resource does not exist.
    #[error("{resource} not found")]
    NotFound {
        /// Human-readable name of the missing resource.
        resource: String,
    },

    /// The response body did not match the expected shape.
    #[error("failed to decode Garmin Connect response: {0}")]
    Decode(String),
}

/// Result alias for login-handshake operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Result alias for Garmin Connect data calls.
pub type ProviderResult<T> = Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_error_maps_to_failure_reason() {
        assert_eq!(AuthError::MfaTimeout.failure(), AuthFailure::MfaTimeout);
        assert_eq!(
            AuthError::MissingCredentials.failure(),
            AuthFailure::MissingCredentials
        );
        assert!(matches!(
            AuthError::CredentialsRejected("bad password".into()).failure(),
            AuthFailure::CredentialsRejected(_)
        ));
    }

    #[test]
    fn state_error_converts_to_internal_failure() {
        let err: AuthError = StateError::DuplicateMfaRequest.into();
        assert!(matches!(err.failure(), AuthFailure::Internal(_)));
    }
}
