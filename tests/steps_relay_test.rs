// ABOUTME: HTTP-level tests for the session-mode relay endpoints
// ABOUTME: Date validation order, auth gating, and upstream passthrough
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use chrono::{Duration, Utc};
use common::{get_json, spawn_fitbit, test_config, token_response, MockFitbit};
use fitbit_relay::config::RelayMode;
use fitbit_relay::server::{RelayServer, ServerResources};
use fitbit_relay::store::{Credential, OwnerId, TokenStore};
use http::StatusCode;
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;

fn session_server(upstream: &MockFitbit) -> Arc<ServerResources> {
    let config = test_config(RelayMode::Session, &upstream.base_url);
    Arc::new(ServerResources::new(config))
}

async fn authorize_session(resources: &Arc<ServerResources>, sid: &str) {
    resources
        .token_store
        .put(
            OwnerId::Session(sid.into()),
            Credential {
                access_token: "at-live".into(),
                refresh_token: "rt-live".into(),
                expires_at: Utc::now() + Duration::hours(1),
                user_id: Some("ABC123".into()),
            },
        )
        .await;
}

#[tokio::test]
async fn test_malformed_dates_rejected_before_any_upstream_call() {
    let upstream = spawn_fitbit(200, token_response("at", Some("rt"), 28800), json!({})).await;
    let resources = session_server(&upstream);
    authorize_session(&resources, "sid-1").await;
    let server = RelayServer::new(resources);

    for uri in [
        "/api/steps",
        "/api/steps?startDate=2025-01-01",
        "/api/steps?endDate=2025-01-07",
        "/api/steps?startDate=01-01-2025&endDate=2025-01-07",
        "/api/steps?startDate=2025-1-1&endDate=2025-01-07",
        "/api/steps?startDate=2025-02-30&endDate=2025-03-01",
    ] {
        let (status, body) = get_json(server.router(), uri, Some("sid=sid-1")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "uri: {uri}");
        assert_eq!(
            body["error"], "Invalid startDate or endDate; use yyyy-MM-dd",
            "uri: {uri}"
        );
    }

    // Zero upstream traffic: validation failed before any token work
    assert_eq!(upstream.token_calls.load(Ordering::SeqCst), 0);
    assert_eq!(upstream.api_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_reversed_range_is_rejected() {
    let upstream = spawn_fitbit(200, token_response("at", Some("rt"), 28800), json!({})).await;
    let resources = session_server(&upstream);
    authorize_session(&resources, "sid-1").await;
    let server = RelayServer::new(resources);

    let (status, body) = get_json(
        server.router(),
        "/api/steps?startDate=2025-01-07&endDate=2025-01-01",
        Some("sid=sid-1"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "startDate must be before or equal to endDate");
    assert_eq!(upstream.api_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_valid_range_requires_a_session() {
    let upstream = spawn_fitbit(200, token_response("at", Some("rt"), 28800), json!({})).await;
    let resources = session_server(&upstream);
    let server = RelayServer::new(resources);

    let (status, body) = get_json(
        server.router(),
        "/api/steps?startDate=2025-01-01&endDate=2025-01-07",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Not authenticated");
}

#[tokio::test]
async fn test_valid_request_forwards_upstream_series() {
    let series = json!({
        "activities-steps": [
            {"dateTime": "2025-01-01", "value": "9500"},
            {"dateTime": "2025-01-02", "value": "12040"}
        ]
    });
    let upstream = spawn_fitbit(
        200,
        token_response("at", Some("rt"), 28800),
        series.clone(),
    )
    .await;
    let resources = session_server(&upstream);
    authorize_session(&resources, "sid-1").await;
    let server = RelayServer::new(resources);

    let (status, body) = get_json(
        server.router(),
        "/api/steps?startDate=2025-01-01&endDate=2025-01-02",
        Some("sid=sid-1"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, series);
    assert_eq!(upstream.api_calls.load(Ordering::SeqCst), 1);
    // Live token: no refresh was needed
    assert_eq!(upstream.token_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_profile_and_leaderboard_require_a_session() {
    let upstream = spawn_fitbit(200, token_response("at", Some("rt"), 28800), json!({})).await;
    let resources = session_server(&upstream);
    let server = RelayServer::new(resources);

    for uri in ["/api/profile", "/api/leaderboard"] {
        let (status, body) = get_json(server.router(), uri, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "uri: {uri}");
        assert_eq!(body["error"], "Not authenticated");
    }
}

#[tokio::test]
async fn test_profile_passthrough_mirrors_upstream_shape() {
    let profile = json!({
        "user": {
            "displayName": "Test User",
            "avatar150": "https://example.com/avatar.png",
            "averageDailySteps": 8400
        }
    });
    let upstream = spawn_fitbit(
        200,
        token_response("at", Some("rt"), 28800),
        profile.clone(),
    )
    .await;
    let resources = session_server(&upstream);
    authorize_session(&resources, "sid-1").await;
    let server = RelayServer::new(resources);

    let (status, body) = get_json(server.router(), "/api/profile", Some("sid=sid-1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, profile);
}

#[tokio::test]
async fn test_health_is_always_ok() {
    let upstream = spawn_fitbit(200, token_response("at", Some("rt"), 28800), json!({})).await;
    let resources = session_server(&upstream);
    let server = RelayServer::new(resources);

    let (status, body) = get_json(server.router(), "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}
