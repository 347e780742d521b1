// ABOUTME: Fitbit OAuth client configuration sourced from the environment
// ABOUTME: Carries client credentials, redirect URI, scopes, and endpoint URLs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::env;

/// Default Fitbit authorization endpoint
const DEFAULT_AUTH_URL: &str = "https://www.fitbit.com/oauth2/authorize";

/// Default Fitbit token endpoint
const DEFAULT_TOKEN_URL: &str = "https://api.fitbit.com/oauth2/token";

/// Default Fitbit Web API base
const DEFAULT_API_BASE: &str = "https://api.fitbit.com";

/// Scopes covering activity, profile, and social/friends data
const DEFAULT_SCOPES: &[&str] = &["activity", "profile", "social"];

/// Fitbit OAuth client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitbitConfig {
    /// OAuth client ID from the Fitbit developer console
    pub client_id: String,
    /// OAuth client secret; never leaves this process
    pub client_secret: String,
    /// Redirect URI registered with the Fitbit app
    pub redirect_uri: String,
    /// OAuth scopes to request
    pub scopes: Vec<String>,
    /// Authorization endpoint URL
    pub auth_url: String,
    /// Token endpoint URL
    pub token_url: String,
    /// Data API base URL
    pub api_base: String,
    /// Public mode only: long-lived refresh token seed from deployment config
    pub public_refresh_token: Option<String>,
}

impl FitbitConfig {
    /// Load Fitbit OAuth configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if `FITBIT_CLIENT_ID` or `FITBIT_CLIENT_SECRET` is
    /// missing
    pub fn from_env(base_url: &str) -> Result<Self> {
        let client_id = env::var("FITBIT_CLIENT_ID").context("FITBIT_CLIENT_ID is not set")?;
        let client_secret =
            env::var("FITBIT_CLIENT_SECRET").context("FITBIT_CLIENT_SECRET is not set")?;

        let redirect_uri = env::var("REDIRECT_URI").unwrap_or_else(|_| {
            format!("{}/auth/callback", base_url.trim_end_matches('/'))
        });

        let public_refresh_token = env::var("FITBIT_PUBLIC_REFRESH_TOKEN")
            .ok()
            .filter(|t| !t.is_empty());

        Ok(Self {
            client_id,
            client_secret,
            redirect_uri,
            scopes: DEFAULT_SCOPES.iter().map(ToString::to_string).collect(),
            auth_url: env::var("FITBIT_AUTH_URL").unwrap_or_else(|_| DEFAULT_AUTH_URL.into()),
            token_url: env::var("FITBIT_TOKEN_URL").unwrap_or_else(|_| DEFAULT_TOKEN_URL.into()),
            api_base: env::var("FITBIT_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.into()),
            public_refresh_token,
        })
    }

    /// Space-separated scope string for the authorize URL
    #[must_use]
    pub fn scope_string(&self) -> String {
        self.scopes.join(" ")
    }

    /// SHA256 fingerprint of the client secret (first 8 hex chars) so
    /// deployments can compare secrets without logging actual values
    #[must_use]
    pub fn secret_fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.client_secret.as_bytes());
        let result = hasher.finalize();
        format!("{result:x}").chars().take(8).collect()
    }
}
