// ABOUTME: Environment configuration read once at startup; credentials, token paths, MFA timeouts
// ABOUTME: Loads .env when present; values are never revisited after process start
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Environment-based configuration.
//!
//! Everything is read once at startup from the process environment (with an
//! optional `.env` file): Garmin credentials, the two token-storage
//! locations, and the two MFA wait bounds. Nothing is revisited later.

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default token directory under the home directory.
const DEFAULT_TOKENSTORE: &str = ".garminconnect";
/// Default base64 bundle file under the home directory.
const DEFAULT_TOKENSTORE_BASE64: &str = ".garminconnect_base64";
/// How long the login worker waits for an interactively submitted MFA code.
const DEFAULT_MFA_REQUEST_TIMEOUT_SECS: u64 = 1800;
/// How long `submit_mfa_code` waits for the login to reach a terminal state.
const DEFAULT_MFA_SUBMIT_WAIT_SECS: u64 = 30;

/// Garmin Connect account credentials for interactive login.
#[derive(Clone)]
pub struct Credentials {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Server configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Credentials for interactive login; absent means silent login only.
    pub credentials: Option<Credentials>,
    /// Directory holding `oauth1_token.json` / `oauth2_token.json`.
    pub tokenstore_dir: PathBuf,
    /// File holding the base64-encoded combined bundle.
    pub tokenstore_base64: PathBuf,
    /// Bound on the worker's wait for an MFA code.
    pub mfa_request_timeout: Duration,
    /// Bound on `submit_mfa_code`'s wait for a terminal state.
    pub mfa_submit_wait: Duration,
}

impl ServerConfig {
    /// Load configuration from the environment, honoring a `.env` file in the
    /// working directory when present.
    pub fn from_env() -> Result<Self> {
        // Missing .env is the common case, not an error.
        let _ = dotenvy::dotenv();

        let credentials = match (env::var("GARMIN_EMAIL"), env::var("GARMIN_PASSWORD")) {
            (Ok(email), Ok(password)) if !email.is_empty() && !password.is_empty() => {
                Some(Credentials { email, password })
            }
            _ => None,
        };

        let tokenstore_dir = env::var("GARMINTOKENS")
            .map_or_else(|_| default_home_path(DEFAULT_TOKENSTORE), expand_tilde);
        let tokenstore_base64 = env::var("GARMINTOKENS_BASE64").map_or_else(
            |_| default_home_path(DEFAULT_TOKENSTORE_BASE64),
            expand_tilde,
        );

        let mfa_request_timeout = duration_from_env(
            "GARMIN_MFA_TIMEOUT_SECS",
            DEFAULT_MFA_REQUEST_TIMEOUT_SECS,
        )?;
        let mfa_submit_wait =
            duration_from_env("GARMIN_MFA_SUBMIT_WAIT_SECS", DEFAULT_MFA_SUBMIT_WAIT_SECS)?;

        Ok(Self {
            credentials,
            tokenstore_dir,
            tokenstore_base64,
            mfa_request_timeout,
            mfa_submit_wait,
        })
    }

    /// One-line startup summary, safe to log.
    pub fn summary(&self) -> String {
        format!(
            "tokenstore: {}, base64 bundle: {}, credentials: {}, mfa timeout: {}s, submit wait: {}s",
            self.tokenstore_dir.display(),
            self.tokenstore_base64.display(),
            if self.credentials.is_some() {
                "configured"
            } else {
                "absent (silent login only)"
            },
            self.mfa_request_timeout.as_secs(),
            self.mfa_submit_wait.as_secs(),
        )
    }
}

fn duration_from_env(var: &str, default_secs: u64) -> Result<Duration> {
    match env::var(var) {
        Ok(raw) => {
            let secs: u64 = raw
                .parse()
                .with_context(|| format!("{var} must be a number of seconds, got {raw:?}"))?;
            Ok(Duration::from_secs(secs))
        }
        Err(_) => Ok(Duration::from_secs(default_secs)),
    }
}

fn default_home_path(name: &str) -> PathBuf {
    dirs::home_dir().map_or_else(|| PathBuf::from(name), |home| home.join(name))
}

fn expand_tilde(raw: String) -> PathBuf {
    match (raw.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(raw),
    }
}
