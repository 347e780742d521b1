// ABOUTME: Wire-level OAuth2 client for the Fitbit authorization server
// ABOUTME: Builds authorize URLs and performs code and refresh token exchanges
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use crate::config::FitbitConfig;
use crate::errors::{RelayError, RelayResult};
use crate::oauth::pkce::PkceParams;
use crate::store::Credential;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

/// Request timeout for token-endpoint calls; exchanges should be fast
const OAUTH_TIMEOUT_SECS: u64 = 15;

/// Connect timeout for token-endpoint calls
const OAUTH_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Fitbit token endpoint response for both exchange and refresh grants
#[derive(Debug, Deserialize)]
pub struct FitbitTokenResponse {
    /// The access token
    pub access_token: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
    /// Refresh token; present on exchange, optional on refresh (Fitbit
    /// usually rotates, but the old token is kept when it does not)
    pub refresh_token: Option<String>,
    /// Fitbit user ID
    pub user_id: Option<String>,
    /// Space-separated list of granted scopes
    pub scope: Option<String>,
}

/// Fitbit error payload: `{"errors": [{"errorType": ..., "message": ...}]}`
#[derive(Debug, Deserialize)]
struct FitbitErrorBody {
    errors: Option<Vec<FitbitErrorDetail>>,
}

#[derive(Debug, Deserialize)]
struct FitbitErrorDetail {
    message: Option<String>,
}

/// Extract the first upstream-reported error message from a token-endpoint
/// failure body
fn first_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<FitbitErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.errors)
        .and_then(|errors| errors.into_iter().next())
        .and_then(|detail| detail.message)
}

/// OAuth2 client for the Fitbit authorization server
pub struct FitbitOAuthClient {
    config: FitbitConfig,
    client: Client,
}

impl FitbitOAuthClient {
    /// Create a new client with timeouts tuned for token exchanges
    #[must_use]
    pub fn new(config: FitbitConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(OAUTH_TIMEOUT_SECS))
            .connect_timeout(std::time::Duration::from_secs(OAUTH_CONNECT_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { config, client }
    }

    /// The configured Fitbit settings
    #[must_use]
    pub fn config(&self) -> &FitbitConfig {
        &self.config
    }

    /// Build the authorization URL embedding the PKCE challenge and CSRF
    /// state
    ///
    /// # Errors
    /// Returns `Config` if the configured authorization URL is malformed
    pub fn authorization_url(&self, state: &str, pkce: &PkceParams) -> RelayResult<String> {
        let mut url = Url::parse(&self.config.auth_url)
            .map_err(|e| RelayError::Config(format!("invalid auth URL: {e}")))?;

        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("scope", &self.config.scope_string())
            .append_pair("code_challenge", &pkce.code_challenge)
            .append_pair("code_challenge_method", &pkce.code_challenge_method)
            .append_pair("state", state);

        Ok(url.to_string())
    }

    /// Exchange an authorization code for tokens
    ///
    /// # Errors
    /// Returns `ExchangeFailed` carrying the upstream's first reported error
    /// message when the exchange is rejected
    pub async fn exchange_code(&self, code: &str, verifier: &str) -> RelayResult<Credential> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("code_verifier", verifier),
            ("client_id", self.config.client_id.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ];

        let response = self
            .client
            .post(&self.config.token_url)
            .header("Authorization", self.basic_auth_header())
            .form(&params)
            .send()
            .await
            .map_err(|e| RelayError::ExchangeFailed(format!("request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RelayError::ExchangeFailed(format!("unreadable response: {e}")))?;

        if !status.is_success() {
            let reason = first_error_message(&body)
                .unwrap_or_else(|| "token_exchange_failed".into());
            warn!(status = %status, "Fitbit code exchange rejected: {reason}");
            return Err(RelayError::ExchangeFailed(reason));
        }

        let token: FitbitTokenResponse = serde_json::from_str(&body)
            .map_err(|e| RelayError::ExchangeFailed(format!("malformed token response: {e}")))?;

        let refresh_token = token.refresh_token.ok_or_else(|| {
            RelayError::ExchangeFailed("token response missing refresh_token".into())
        })?;

        debug!(user_id = ?token.user_id, "Fitbit code exchange succeeded");

        Ok(Credential {
            access_token: token.access_token,
            refresh_token,
            expires_at: Utc::now() + Duration::seconds(token.expires_in),
            user_id: token.user_id,
        })
    }

    /// Exchange a refresh token for a new access token
    ///
    /// # Errors
    /// Returns `RefreshFailed` when the upstream rejects the refresh token
    /// and `UpstreamUnreachable` on transport failure
    pub async fn refresh(&self, refresh_token: &str) -> RelayResult<FitbitTokenResponse> {
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.config.client_id.as_str()),
        ];

        let response = self
            .client
            .post(&self.config.token_url)
            .header("Authorization", self.basic_auth_header())
            .form(&params)
            .send()
            .await
            .map_err(|e| RelayError::UpstreamUnreachable(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RelayError::UpstreamUnreachable(e.to_string()))?;

        if !status.is_success() {
            let reason = first_error_message(&body).unwrap_or_else(|| "unspecified".into());
            warn!(status = %status, "Fitbit token refresh rejected: {reason}");
            return Err(RelayError::RefreshFailed);
        }

        serde_json::from_str(&body)
            .map_err(|e| RelayError::UpstreamUnreachable(format!("malformed token response: {e}")))
    }

    /// Client credentials as an HTTP Basic header, as the Fitbit token
    /// endpoint requires
    fn basic_auth_header(&self) -> String {
        let credentials = format!("{}:{}", self.config.client_id, self.config.client_secret);
        format!("Basic {}", STANDARD.encode(credentials))
    }
}
