// ABOUTME: Unified error taxonomy for the relay with HTTP status mapping
// ABOUTME: Renders JSON error bodies and forwards mirrored upstream failures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Unified Error Handling
//!
//! Every failure the relay can surface is a variant of [`RelayError`], so
//! handling in the routes and the token lifecycle is exhaustive and
//! statically checkable. The enum maps onto HTTP statuses via
//! [`RelayError::http_status`] and renders as a `{"error": "..."}` JSON body,
//! except for mirrored upstream failures which forward the upstream payload
//! unchanged.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Result type alias for relay operations
pub type RelayResult<T> = Result<T, RelayError>;

/// All failure conditions surfaced by the relay core
#[derive(Debug, Error)]
pub enum RelayError {
    /// Callback arrived without a code, or with a state that does not match
    /// the most recently issued pending authorization
    #[error("invalid callback: {0}")]
    InvalidCallback(String),

    /// Upstream rejected the authorization-code exchange
    #[error("token exchange failed: {0}")]
    ExchangeFailed(String),

    /// No credential exists for the calling session
    #[error("Not authenticated")]
    Unauthenticated,

    /// Upstream rejected the stored refresh token; the stale credential is
    /// left in place and only an explicit logout clears it
    #[error("Token refresh failed")]
    RefreshFailed,

    /// Public mode: the shared account was never authorized and no refresh
    /// token seed is configured
    #[error("Shared account not configured; complete one-time setup via /auth/fitbit")]
    NotConfigured,

    /// Malformed request parameter
    #[error("{0}")]
    InvalidInput(String),

    /// Parameters parse individually but make no sense together
    #[error("{0}")]
    InvalidRange(String),

    /// Data API call failed with an HTTP status; the status and body are
    /// mirrored back to the caller
    #[error("upstream returned status {status}")]
    Upstream {
        /// Upstream HTTP status code
        status: u16,
        /// Upstream response body, forwarded as-is
        body: serde_json::Value,
    },

    /// Upstream could not be reached (transport failure or timeout)
    #[error("upstream unreachable: {0}")]
    UpstreamUnreachable(String),

    /// Internal misconfiguration (e.g. an unparseable authorize URL)
    #[error("configuration error: {0}")]
    Config(String),
}

impl RelayError {
    /// HTTP status code for this error
    #[must_use]
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::InvalidCallback(_) | Self::InvalidInput(_) | Self::InvalidRange(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Unauthenticated | Self::RefreshFailed => StatusCode::UNAUTHORIZED,
            Self::NotConfigured | Self::UpstreamUnreachable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::ExchangeFailed(_) => StatusCode::BAD_GATEWAY,
            Self::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.http_status();
        match self {
            Self::Upstream { body, .. } => (status, Json(body)).into_response(),
            other => (status, Json(json!({ "error": other.to_string() }))).into_response(),
        }
    }
}
