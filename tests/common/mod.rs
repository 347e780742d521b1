// ABOUTME: Shared helpers for integration tests
// ABOUTME: Spawns a throwaway mock Fitbit upstream and builds test configs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(dead_code)]

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use fitbit_relay::config::{environment::CacheConfig, FitbitConfig, RelayMode, ServerConfig};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

/// A disposable local server playing the Fitbit authorization server and
/// data API, with call counters
pub struct MockFitbit {
    pub base_url: String,
    pub token_calls: Arc<AtomicUsize>,
    pub api_calls: Arc<AtomicUsize>,
}

#[derive(Clone)]
struct MockState {
    token_status: StatusCode,
    token_body: Value,
    api_status: StatusCode,
    api_body: Value,
    token_calls: Arc<AtomicUsize>,
    api_calls: Arc<AtomicUsize>,
}

async fn token_handler(State(state): State<MockState>) -> (StatusCode, Json<Value>) {
    state.token_calls.fetch_add(1, Ordering::SeqCst);
    (state.token_status, Json(state.token_body.clone()))
}

async fn api_handler(State(state): State<MockState>) -> (StatusCode, Json<Value>) {
    state.api_calls.fetch_add(1, Ordering::SeqCst);
    (state.api_status, Json(state.api_body.clone()))
}

/// Spawn the mock upstream on an ephemeral port with a healthy data API
pub async fn spawn_fitbit(token_status: u16, token_body: Value, api_body: Value) -> MockFitbit {
    spawn_fitbit_with(token_status, token_body, 200, api_body).await
}

/// Spawn the mock upstream with explicit statuses for both endpoints
pub async fn spawn_fitbit_with(
    token_status: u16,
    token_body: Value,
    api_status: u16,
    api_body: Value,
) -> MockFitbit {
    let token_calls = Arc::new(AtomicUsize::new(0));
    let api_calls = Arc::new(AtomicUsize::new(0));

    let state = MockState {
        token_status: StatusCode::from_u16(token_status).unwrap(),
        token_body,
        api_status: StatusCode::from_u16(api_status).unwrap(),
        api_body,
        token_calls: token_calls.clone(),
        api_calls: api_calls.clone(),
    };

    let router = Router::new()
        .route("/oauth2/token", post(token_handler))
        .route("/1/user/-/profile.json", get(api_handler))
        .route("/1.1/user/-/leaderboard/friends.json", get(api_handler))
        .route(
            "/1/user/-/activities/steps/date/:start/:end",
            get(api_handler),
        )
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    MockFitbit {
        base_url: format!("http://{addr}"),
        token_calls,
        api_calls,
    }
}

/// A successful Fitbit token-endpoint payload
pub fn token_response(access: &str, refresh: Option<&str>, expires_in: i64) -> Value {
    let mut body = serde_json::json!({
        "access_token": access,
        "expires_in": expires_in,
        "scope": "activity profile social",
        "token_type": "Bearer",
        "user_id": "ABC123",
    });
    if let Some(refresh) = refresh {
        body["refresh_token"] = Value::String(refresh.to_owned());
    }
    body
}

/// Relay configuration pointed at the mock upstream
pub fn test_config(mode: RelayMode, upstream_base: &str) -> ServerConfig {
    ServerConfig {
        http_port: 0,
        base_url: "http://localhost:3000".into(),
        frontend_origin: "https://user.github.io/fitbit-high-score".into(),
        mode,
        fitbit: FitbitConfig {
            client_id: "test-client".into(),
            client_secret: "test-secret".into(),
            redirect_uri: "http://localhost:3000/auth/callback".into(),
            scopes: vec!["activity".into(), "profile".into(), "social".into()],
            auth_url: format!("{upstream_base}/oauth2/authorize"),
            token_url: format!("{upstream_base}/oauth2/token"),
            api_base: upstream_base.to_owned(),
            public_refresh_token: None,
        },
        cache: CacheConfig {
            public_ttl: Duration::from_secs(300),
        },
    }
}

/// Drive a GET through the router and decode the JSON response
pub async fn get_json(
    router: Router,
    uri: &str,
    cookie: Option<&str>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().uri(uri).method("GET");
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }

    let response = router
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}
