// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Handles ports, origins, relay mode, and cache tuning from env vars
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Environment-based configuration management for production deployment

use crate::config::oauth::FitbitConfig;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Default HTTP port when neither `HTTP_PORT` nor `PORT` is set
const DEFAULT_HTTP_PORT: u16 = 3000;

/// Default TTL for the public-mode response cache
const DEFAULT_PUBLIC_CACHE_TTL_SECS: u64 = 300;

/// Credential lifecycle strategy for the deployment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RelayMode {
    /// Every visitor authorizes their own Fitbit account, keyed by a
    /// session cookie
    #[default]
    Session,
    /// A single shared Fitbit account serves all visitors
    Public,
}

impl RelayMode {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "public" | "shared" => Self::Public,
            _ => Self::Session,
        }
    }

    /// Check if this deployment serves the shared public account
    #[must_use]
    pub fn is_public(self) -> bool {
        matches!(self, Self::Public)
    }
}

impl std::fmt::Display for RelayMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Session => write!(f, "session"),
            Self::Public => write!(f, "public"),
        }
    }
}

/// Response cache tuning
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for public-mode profile and leaderboard responses
    pub public_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            public_ttl: Duration::from_secs(DEFAULT_PUBLIC_CACHE_TTL_SECS),
        }
    }
}

/// Server configuration loaded from the environment
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen port
    pub http_port: u16,
    /// Externally visible base URL of this relay (for the OAuth redirect URI)
    pub base_url: String,
    /// Frontend origin for CORS and post-auth redirects
    pub frontend_origin: String,
    /// Credential lifecycle strategy
    pub mode: RelayMode,
    /// Fitbit OAuth client configuration
    pub fitbit: FitbitConfig,
    /// Response cache tuning
    pub cache: CacheConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required Fitbit credentials are missing
    pub fn from_env() -> Result<Self> {
        let http_port = env::var("HTTP_PORT")
            .or_else(|_| env::var("PORT"))
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_HTTP_PORT);

        let base_url =
            env::var("BASE_URL").unwrap_or_else(|_| format!("http://localhost:{http_port}"));

        let frontend_origin =
            env::var("FRONTEND_ORIGIN").unwrap_or_else(|_| "http://localhost:3000".into());

        let mode = env::var("RELAY_MODE")
            .map(|m| RelayMode::from_str_or_default(&m))
            .unwrap_or_default();

        let public_ttl = env::var("PUBLIC_CACHE_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map_or_else(
                || Duration::from_secs(DEFAULT_PUBLIC_CACHE_TTL_SECS),
                Duration::from_secs,
            );

        Ok(Self {
            http_port,
            base_url: base_url.trim_end_matches('/').to_owned(),
            frontend_origin: frontend_origin.trim_end_matches('/').to_owned(),
            mode,
            fitbit: FitbitConfig::from_env(&base_url)?,
            cache: CacheConfig { public_ttl },
        })
    }

    /// Whether the externally visible URL is served over TLS; controls
    /// cross-site cookie attributes
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https")
    }

    /// One-line configuration summary safe for logging (no secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "mode={} port={} base_url={} frontend={} client_id={} secret_sha256={} cache_ttl={}s",
            self.mode,
            self.http_port,
            self.base_url,
            self.frontend_origin,
            self.fitbit.client_id,
            self.fitbit.secret_fingerprint(),
            self.cache.public_ttl.as_secs(),
        )
    }
}
