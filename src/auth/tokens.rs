// ABOUTME: Persistence for the Garmin OAuth token bundle in both storage forms
// ABOUTME: Directory of oauth1/oauth2 JSON files plus a base64-encoded single-file bundle
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Token bundle persistence.
//!
//! Garmin logins yield an OAuth1 token (long-lived, used to mint OAuth2
//! tokens) and an OAuth2 bearer token (used for data calls). Both are
//! persisted two ways for operator convenience, matching the two storage
//! forms the token directory convention uses: individual JSON files under a
//! directory, and one base64-encoded JSON bundle in a single file.

use crate::errors::{AuthError, AuthResult};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

const OAUTH1_FILE: &str = "oauth1_token.json";
const OAUTH2_FILE: &str = "oauth2_token.json";

/// Long-lived OAuth1 token from the SSO ticket exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuth1Token {
    /// OAuth1 token value.
    pub oauth_token: String,
    /// OAuth1 token secret.
    pub oauth_token_secret: String,
    /// Set when the account used MFA during the handshake.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mfa_token: Option<String>,
    /// Garmin domain the token was issued for.
    pub domain: String,
}

/// Short-lived OAuth2 bearer token used for Connect API data calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuth2Token {
    /// Bearer access token.
    pub access_token: String,
    /// Refresh token for minting a new access token.
    pub refresh_token: String,
    /// Token type, `Bearer`.
    pub token_type: String,
    /// Unix timestamp at which `access_token` expires.
    pub expires_at: i64,
    /// Unix timestamp at which `refresh_token` expires.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token_expires_at: Option<i64>,
    /// Granted scopes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl OAuth2Token {
    /// Whether the access token has expired.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.expires_at
    }
}

/// The full credential bundle a successful handshake produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBundle {
    /// OAuth1 half of the bundle.
    pub oauth1: OAuth1Token,
    /// OAuth2 half of the bundle.
    pub oauth2: OAuth2Token,
}

/// Loads and saves the token bundle at the configured locations.
pub struct TokenStore {
    dir: PathBuf,
    base64_file: PathBuf,
}

impl TokenStore {
    /// A store writing the directory form to `dir` and the encoded form to `base64_file`.
    pub fn new(dir: impl Into<PathBuf>, base64_file: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            base64_file: base64_file.into(),
        }
    }

    /// Token directory path.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load a bundle, preferring the directory form and falling back to the
    /// base64 file. Absence of both means silent login is unavailable.
    pub fn load(&self) -> AuthResult<TokenBundle> {
        match self.load_dir() {
            Ok(bundle) => Ok(bundle),
            Err(dir_err) => self.load_base64().map_err(|b64_err| {
                AuthError::SilentLoginUnavailable(format!("{dir_err}; {b64_err}"))
            }),
        }
    }

    fn load_dir(&self) -> Result<TokenBundle, String> {
        let oauth1 = read_json(&self.dir.join(OAUTH1_FILE))?;
        let oauth2 = read_json(&self.dir.join(OAUTH2_FILE))?;
        Ok(TokenBundle { oauth1, oauth2 })
    }

    fn load_base64(&self) -> Result<TokenBundle, String> {
        let encoded = std::fs::read_to_string(&self.base64_file)
            .map_err(|e| format!("{}: {e}", self.base64_file.display()))?;
        let raw = BASE64
            .decode(encoded.trim())
            .map_err(|e| format!("{}: invalid base64: {e}", self.base64_file.display()))?;
        serde_json::from_slice(&raw)
            .map_err(|e| format!("{}: invalid bundle: {e}", self.base64_file.display()))
    }

    /// Persist the bundle in both forms. Any write failure fails the login
    /// attempt that produced the bundle.
    pub fn save(&self, bundle: &TokenBundle) -> AuthResult<()> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| AuthError::TokenPersistence(format!("{}: {e}", self.dir.display())))?;
        write_json(&self.dir.join(OAUTH1_FILE), &bundle.oauth1)?;
        write_json(&self.dir.join(OAUTH2_FILE), &bundle.oauth2)?;

        let raw = serde_json::to_vec(bundle)
            .map_err(|e| AuthError::TokenPersistence(e.to_string()))?;
        std::fs::write(&self.base64_file, BASE64.encode(raw)).map_err(|e| {
            AuthError::TokenPersistence(format!("{}: {e}", self.base64_file.display()))
        })?;

        info!(
            dir = %self.dir.display(),
            file = %self.base64_file.display(),
            "token bundle persisted in directory and base64 forms"
        );
        Ok(())
    }
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, String> {
    let raw = std::fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))?;
    serde_json::from_str(&raw).map_err(|e| format!("{}: {e}", path.display()))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> AuthResult<()> {
    let raw = serde_json::to_string_pretty(value)
        .map_err(|e| AuthError::TokenPersistence(e.to_string()))?;
    std::fs::write(path, raw)
        .map_err(|e| AuthError::TokenPersistence(format!("{}: {e}", path.display())))
}
