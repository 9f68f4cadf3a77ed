// ABOUTME: Garmin SSO login handshake: credential POST, MFA challenge, ticket and token exchange
// ABOUTME: GarminAuthenticator is the seam the login worker drives; tests substitute a mock
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Login Handshake
//!
//! [`GarminAuthenticator`] is the external-collaborator seam: the login
//! worker drives it without knowing whether it is talking to Garmin's SSO or
//! a test double. [`MfaCodeSource`] is the inverse seam: when the handshake
//! hits an MFA challenge it asks the source for a code and suspends until
//! one arrives or the source gives up.
//!
//! [`SsoAuthenticator`] is the production implementation of the Garmin SSO
//! form flow: seed the session cookies, fetch the CSRF token, post the
//! credentials, post the MFA code when challenged, extract the service
//! ticket, then trade it for the OAuth1/OAuth2 token bundle on the Connect
//! API.

use crate::auth::tokens::{OAuth1Token, OAuth2Token, TokenBundle};
use crate::config::Credentials;
use crate::errors::{AuthError, AuthResult};
use async_trait::async_trait;
use chrono::Utc;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use std::sync::OnceLock;
use tracing::{debug, info};
use url::Url;

const SSO_BASE: &str = "https://sso.garmin.com/sso";
const API_BASE: &str = "https://connectapi.garmin.com";
const SSO_ORIGIN: &str = "https://sso.garmin.com";
const EMBED_SERVICE: &str = "https://connect.garmin.com/modern";

/// Supplies an MFA code when the handshake is challenged.
///
/// The production source is the worker's handoff adapter, which publishes
/// `AwaitingMfa` and suspends until `submit_mfa_code` deposits a code.
#[async_trait]
pub trait MfaCodeSource: Send + Sync {
    /// Block (bounded) until a code is available.
    async fn obtain_code(&self) -> AuthResult<String>;
}

/// The authentication handshake against Garmin Connect.
#[async_trait]
pub trait GarminAuthenticator: Send + Sync {
    /// Silent login: validate or refresh a persisted token bundle without
    /// user interaction.
    async fn login_with_tokens(&self, bundle: TokenBundle) -> AuthResult<TokenBundle>;

    /// Interactive login with credentials; consults `mfa` when Garmin
    /// challenges for a code.
    async fn login_with_credentials(
        &self,
        credentials: &Credentials,
        mfa: &dyn MfaCodeSource,
    ) -> AuthResult<TokenBundle>;
}

/// Production SSO implementation.
pub struct SsoAuthenticator {
    http: Client,
    sso_base: String,
    api_base: String,
}

/// OAuth2 exchange response body.
#[derive(Debug, Deserialize)]
struct OAuth2Exchange {
    access_token: String,
    refresh_token: String,
    token_type: String,
    expires_in: i64,
    refresh_token_expires_in: Option<i64>,
    scope: Option<String>,
}

impl OAuth2Exchange {
    fn into_token(self) -> OAuth2Token {
        let now = Utc::now().timestamp();
        OAuth2Token {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            token_type: self.token_type,
            expires_at: now + self.expires_in,
            refresh_token_expires_at: self.refresh_token_expires_in.map(|s| now + s),
            scope: self.scope,
        }
    }
}

fn csrf_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        #[allow(clippy::unwrap_used)] // literal pattern, validated by tests
        Regex::new(r#"name="_csrf"\s+value="([^"]+)""#).unwrap()
    })
}

fn title_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        #[allow(clippy::unwrap_used)] // literal pattern, validated by tests
        Regex::new(r"<title>([^<]*)</title>").unwrap()
    })
}

fn ticket_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        #[allow(clippy::unwrap_used)] // literal pattern, validated by tests
        Regex::new(r#"embed\?ticket=([^"]+)""#).unwrap()
    })
}

impl SsoAuthenticator {
    /// Authenticator against the production Garmin endpoints.
    pub fn new() -> AuthResult<Self> {
        Self::with_endpoints(SSO_BASE, API_BASE)
    }

    /// Authenticator against custom endpoints.
    pub fn with_endpoints(sso_base: &str, api_base: &str) -> AuthResult<Self> {
        let http = Client::builder()
            .cookie_store(true)
            .user_agent("com.garmin.android.apps.connectmobile")
            .build()
            .map_err(|e| AuthError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            sso_base: sso_base.trim_end_matches('/').to_owned(),
            api_base: api_base.trim_end_matches('/').to_owned(),
        })
    }

    async fn get_text(&self, url: Url) -> AuthResult<String> {
        self.http
            .get(url)
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?
            .text()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))
    }

    fn signin_url(&self) -> AuthResult<Url> {
        Url::parse_with_params(
            &format!("{}/signin", self.sso_base),
            &[
                ("service", EMBED_SERVICE),
                ("source", EMBED_SERVICE),
                ("redirectAfterAccountLoginUrl", EMBED_SERVICE),
                ("redirectAfterAccountCreationUrl", EMBED_SERVICE),
                ("gauthHost", SSO_ORIGIN),
                ("id", "gauth-widget"),
                ("embedWidget", "true"),
            ],
        )
        .map_err(|e| AuthError::Transport(e.to_string()))
    }

    /// Post the credentials; returns the resulting page body.
    async fn post_credentials(
        &self,
        url: Url,
        credentials: &Credentials,
        csrf: &str,
    ) -> AuthResult<String> {
        let response = self
            .http
            .post(url)
            .header("referer", format!("{}/signin", self.sso_base))
            .form(&[
                ("username", credentials.email.as_str()),
                ("password", credentials.password.as_str()),
                ("embed", "true"),
                ("_csrf", csrf),
            ])
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED
            || response.status() == reqwest::StatusCode::FORBIDDEN
        {
            return Err(AuthError::CredentialsRejected(
                "invalid email or password".into(),
            ));
        }
        response
            .text()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))
    }

    /// Post the MFA code the source produced; returns the resulting page body.
    async fn post_mfa_code(&self, page: &str, mfa: &dyn MfaCodeSource) -> AuthResult<String> {
        let csrf = extract_csrf(page)?;
        let code = mfa.obtain_code().await?;
        info!("submitting MFA code to Garmin SSO");

        let url = Url::parse(&format!(
            "{}/verifyMFA/loginEnterMfaCode",
            self.sso_base
        ))
        .map_err(|e| AuthError::Transport(e.to_string()))?;

        let response = self
            .http
            .post(url)
            .header("referer", format!("{}/signin", self.sso_base))
            .form(&[
                ("mfa-code", code.as_str()),
                ("embed", "true"),
                ("_csrf", csrf.as_str()),
                ("fromPage", "setupEnterMfaCode"),
            ])
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        response
            .text()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))
    }

    /// Trade the SSO service ticket for the OAuth1 token.
    async fn fetch_oauth1(&self, ticket: &str) -> AuthResult<OAuth1Token> {
        let url = Url::parse_with_params(
            &format!("{}/oauth-service/oauth/preauthorized", self.api_base),
            &[
                ("ticket", ticket),
                ("login-url", &format!("{}/embed", self.sso_base)),
                ("accepts-mfa-tokens", "true"),
            ],
        )
        .map_err(|e| AuthError::Transport(e.to_string()))?;

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;
        if !response.status().is_success() {
            return Err(AuthError::CredentialsRejected(format!(
                "OAuth1 preauthorization failed with status {}",
                response.status()
            )));
        }
        response
            .json()
            .await
            .map_err(|e| AuthError::Transport(format!("invalid OAuth1 response: {e}")))
    }

    /// Trade the OAuth1 token for an OAuth2 bearer token.
    async fn exchange(&self, oauth1: &OAuth1Token) -> AuthResult<OAuth2Token> {
        let url = Url::parse(&format!(
            "{}/oauth-service/oauth/exchange/user/2.0",
            self.api_base
        ))
        .map_err(|e| AuthError::Transport(e.to_string()))?;

        let mut form = vec![
            ("oauth_token", oauth1.oauth_token.as_str()),
            ("oauth_token_secret", oauth1.oauth_token_secret.as_str()),
        ];
        if let Some(mfa_token) = &oauth1.mfa_token {
            form.push(("mfa_token", mfa_token.as_str()));
        }

        let response = self
            .http
            .post(url)
            .form(&form)
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED
            || response.status() == reqwest::StatusCode::FORBIDDEN
        {
            return Err(AuthError::SilentLoginUnavailable(
                "OAuth1 token no longer accepted for exchange".into(),
            ));
        }
        if !response.status().is_success() {
            return Err(AuthError::Transport(format!(
                "token exchange failed with status {}",
                response.status()
            )));
        }

        let exchange: OAuth2Exchange = response
            .json()
            .await
            .map_err(|e| AuthError::Transport(format!("invalid OAuth2 response: {e}")))?;
        Ok(exchange.into_token())
    }
}

#[async_trait]
impl GarminAuthenticator for SsoAuthenticator {
    async fn login_with_tokens(&self, bundle: TokenBundle) -> AuthResult<TokenBundle> {
        if !bundle.oauth2.is_expired() {
            debug!("persisted OAuth2 token still valid; no refresh needed");
            return Ok(bundle);
        }
        info!("persisted OAuth2 token expired; exchanging OAuth1 token for a new one");
        let oauth2 = self.exchange(&bundle.oauth1).await?;
        Ok(TokenBundle {
            oauth1: bundle.oauth1,
            oauth2,
        })
    }

    async fn login_with_credentials(
        &self,
        credentials: &Credentials,
        mfa: &dyn MfaCodeSource,
    ) -> AuthResult<TokenBundle> {
        // Seed the gauth widget cookies before touching the signin form.
        let embed_url = Url::parse_with_params(
            &format!("{}/embed", self.sso_base),
            &[("id", "gauth-widget"), ("embedWidget", "true"), ("gauthHost", SSO_ORIGIN)],
        )
        .map_err(|e| AuthError::Transport(e.to_string()))?;
        self.get_text(embed_url).await?;

        let signin_url = self.signin_url()?;
        let signin_page = self.get_text(signin_url.clone()).await?;
        let csrf = extract_csrf(&signin_page)?;

        info!("posting credentials to Garmin SSO");
        let mut page = self
            .post_credentials(signin_url, credentials, &csrf)
            .await?;

        if page_title(&page).is_some_and(|t| t.contains("MFA")) {
            info!("Garmin SSO requires a multi-factor code");
            page = self.post_mfa_code(&page, mfa).await?;
        }

        let ticket = extract_ticket(&page)?;
        debug!("SSO service ticket obtained");

        let oauth1 = self.fetch_oauth1(&ticket).await?;
        let oauth2 = self.exchange(&oauth1).await?;
        Ok(TokenBundle { oauth1, oauth2 })
    }
}

fn page_title(page: &str) -> Option<&str> {
    title_re()
        .captures(page)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

fn extract_csrf(page: &str) -> AuthResult<String> {
    csrf_re()
        .captures(page)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_owned())
        .ok_or_else(|| AuthError::Transport("no CSRF token in SSO response".into()))
}

fn extract_ticket(page: &str) -> AuthResult<String> {
    ticket_re()
        .captures(page)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_owned())
        .ok_or_else(|| {
            AuthError::CredentialsRejected(
                "no service ticket in SSO response; email, password, or MFA code rejected".into(),
            )
        })
}
