// ABOUTME: Read-only relay endpoints for profile, leaderboard, and steps
// ABOUTME: Validates input before any token work; public mode adds caching
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Relay routes
//!
//! Each endpoint validates its input first (a request that will fail anyway
//! must not waste a refresh cycle), obtains a valid access token from the
//! OAuth manager, calls Fitbit, and forwards the payload unchanged. Public
//! mode serves profile and leaderboard through the response cache; steps is
//! parameterized per request and never cached.

use crate::errors::{RelayError, RelayResult};
use crate::routes::session_owner;
use crate::server::ServerResources;
use crate::store::OwnerId;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::NaiveDate;
use regex::Regex;
use serde::Deserialize;
use std::sync::{Arc, OnceLock};

/// Cache key for the public profile response
const CACHE_KEY_PROFILE: &str = "profile";

/// Cache key for the public leaderboard response
const CACHE_KEY_LEADERBOARD: &str = "leaderboard";

/// Query parameters for the steps endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepsParams {
    /// Inclusive range start, `yyyy-MM-dd`
    pub start_date: Option<String>,
    /// Inclusive range end, `yyyy-MM-dd`
    pub end_date: Option<String>,
}

/// Session-mode relay routes, cookie-authenticated
pub struct ApiRoutes;

impl ApiRoutes {
    /// Create the session-mode relay routes
    #[must_use]
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/profile", get(Self::handle_profile))
            .route("/api/leaderboard", get(Self::handle_leaderboard))
            .route("/api/steps", get(Self::handle_steps))
            .with_state(resources)
    }

    async fn handle_profile(
        State(resources): State<Arc<ServerResources>>,
        jar: CookieJar,
    ) -> Result<Response, RelayError> {
        let owner = session_owner(&jar).ok_or(RelayError::Unauthenticated)?;
        let token = resources.oauth.valid_token(&owner).await?;
        let data = resources.api.profile(&token).await?;
        Ok(Json(data).into_response())
    }

    async fn handle_leaderboard(
        State(resources): State<Arc<ServerResources>>,
        jar: CookieJar,
    ) -> Result<Response, RelayError> {
        let owner = session_owner(&jar).ok_or(RelayError::Unauthenticated)?;
        let token = resources.oauth.valid_token(&owner).await?;
        let data = resources.api.friends_leaderboard(&token).await?;
        Ok(Json(data).into_response())
    }

    async fn handle_steps(
        State(resources): State<Arc<ServerResources>>,
        jar: CookieJar,
        Query(params): Query<StepsParams>,
    ) -> Result<Response, RelayError> {
        let (start, end) =
            parse_step_dates(params.start_date.as_deref(), params.end_date.as_deref())?;
        let owner = session_owner(&jar).ok_or(RelayError::Unauthenticated)?;
        let token = resources.oauth.valid_token(&owner).await?;
        let data = resources.api.steps_range(&token, start, end).await?;
        Ok(Json(data).into_response())
    }
}

/// Public-mode relay routes, unauthenticated, served from the shared slot
pub struct PublicApiRoutes;

impl PublicApiRoutes {
    /// Create the public-mode relay routes
    #[must_use]
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/public/profile", get(Self::handle_profile))
            .route("/api/public/leaderboard", get(Self::handle_leaderboard))
            .route("/api/public/steps", get(Self::handle_steps))
            .with_state(resources)
    }

    async fn handle_profile(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Response, RelayError> {
        let ttl = resources.config.cache.public_ttl;
        let upstream = resources.clone();
        let data = resources
            .cache
            .get_or_fetch(CACHE_KEY_PROFILE, ttl, move || async move {
                let token = upstream.oauth.valid_token(&OwnerId::Public).await?;
                upstream.api.profile(&token).await
            })
            .await?;
        Ok(Json(data).into_response())
    }

    async fn handle_leaderboard(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Response, RelayError> {
        let ttl = resources.config.cache.public_ttl;
        let upstream = resources.clone();
        let data = resources
            .cache
            .get_or_fetch(CACHE_KEY_LEADERBOARD, ttl, move || async move {
                let token = upstream.oauth.valid_token(&OwnerId::Public).await?;
                upstream.api.friends_leaderboard(&token).await
            })
            .await?;
        Ok(Json(data).into_response())
    }

    async fn handle_steps(
        State(resources): State<Arc<ServerResources>>,
        Query(params): Query<StepsParams>,
    ) -> Result<Response, RelayError> {
        let (start, end) =
            parse_step_dates(params.start_date.as_deref(), params.end_date.as_deref())?;
        let token = resources.oauth.valid_token(&OwnerId::Public).await?;
        let data = resources.api.steps_range(&token, start, end).await?;
        Ok(Json(data).into_response())
    }
}

/// Validate and parse the steps date range before any token work
///
/// # Errors
/// `InvalidInput` for a missing or malformed date, `InvalidRange` when the
/// start is chronologically after the end
pub fn parse_step_dates(
    start: Option<&str>,
    end: Option<&str>,
) -> RelayResult<(NaiveDate, NaiveDate)> {
    let start = parse_date(start)?;
    let end = parse_date(end)?;
    if start > end {
        return Err(RelayError::InvalidRange(
            "startDate must be before or equal to endDate".into(),
        ));
    }
    Ok((start, end))
}

#[allow(clippy::expect_used)] // Safe: pattern is a compile-time literal
fn date_literal() -> &'static Regex {
    static DATE_LITERAL: OnceLock<Regex> = OnceLock::new();
    DATE_LITERAL.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date pattern"))
}

fn parse_date(value: Option<&str>) -> RelayResult<NaiveDate> {
    let value = value
        .filter(|v| !v.is_empty())
        .ok_or_else(invalid_date_error)?;

    // chrono alone accepts unpadded fields; the upstream path segment must be
    // the literal yyyy-MM-dd
    if !date_literal().is_match(value) {
        return Err(invalid_date_error());
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| invalid_date_error())
}

fn invalid_date_error() -> RelayError {
    RelayError::InvalidInput("Invalid startDate or endDate; use yyyy-MM-dd".into())
}
