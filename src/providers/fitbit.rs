// ABOUTME: Fitbit Web API client for the read-only relay endpoints
// ABOUTME: Bearer-authenticated GETs that mirror upstream payloads verbatim
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Fitbit data API integration.
//!
//! The relay's contract is to mirror Fitbit's response shapes byte-for-byte,
//! so payloads stay as [`serde_json::Value`] rather than being normalized
//! into local models. Upstream HTTP failures carry the upstream status and
//! body back to the caller; transport failures surface as a generic
//! upstream-error condition.
//!
//! # API Documentation
//! - [Fitbit Web API](https://dev.fitbit.com/build/reference/web-api/)

use crate::errors::{RelayError, RelayResult};
use chrono::NaiveDate;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::warn;

/// Request timeout for data API calls
const API_TIMEOUT_SECS: u64 = 30;

/// Connect timeout for data API calls
const API_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Fitbit Web API client
pub struct FitbitApiClient {
    api_base: String,
    client: Client,
}

impl FitbitApiClient {
    /// Create a new client against the given API base URL
    #[must_use]
    pub fn new(api_base: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(API_TIMEOUT_SECS))
            .connect_timeout(std::time::Duration::from_secs(API_CONNECT_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            api_base: api_base.into(),
            client,
        }
    }

    /// Profile of the authorized user
    ///
    /// # Errors
    /// `Upstream` with the mirrored status on an HTTP failure,
    /// `UpstreamUnreachable` on transport failure
    pub async fn profile(&self, access_token: &str) -> RelayResult<Value> {
        self.get_json(
            format!("{}/1/user/-/profile.json", self.api_base),
            access_token,
        )
        .await
    }

    /// Friends leaderboard: ranked entries plus an `included` side table of
    /// person records referenced by id
    ///
    /// # Errors
    /// `Upstream` with the mirrored status on an HTTP failure,
    /// `UpstreamUnreachable` on transport failure
    pub async fn friends_leaderboard(&self, access_token: &str) -> RelayResult<Value> {
        self.get_json(
            format!("{}/1.1/user/-/leaderboard/friends.json", self.api_base),
            access_token,
        )
        .await
    }

    /// Per-day step series over an inclusive date range
    ///
    /// # Errors
    /// `Upstream` with the mirrored status on an HTTP failure,
    /// `UpstreamUnreachable` on transport failure
    pub async fn steps_range(
        &self,
        access_token: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RelayResult<Value> {
        self.get_json(
            format!(
                "{}/1/user/-/activities/steps/date/{}/{}.json",
                self.api_base,
                start.format("%Y-%m-%d"),
                end.format("%Y-%m-%d"),
            ),
            access_token,
        )
        .await
    }

    async fn get_json(&self, url: String, access_token: &str) -> RelayResult<Value> {
        let response = self
            .client
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| RelayError::UpstreamUnreachable(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| RelayError::UpstreamUnreachable(format!("invalid payload: {e}")))
        } else {
            warn!(%status, url, "Fitbit API call failed");
            let body = response
                .json::<Value>()
                .await
                .unwrap_or_else(|_| json!({ "error": "Fitbit API error" }));
            Err(RelayError::Upstream {
                status: status.as_u16(),
                body,
            })
        }
    }
}
