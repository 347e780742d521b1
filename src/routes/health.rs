// ABOUTME: Health check route handler for uptime monitoring
// ABOUTME: Always returns 200 so keep-warm pings keep the instance alive
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Health check route
//!
//! The hosting platform's uptime pinger polls this endpoint to keep the
//! instance warm; the refresh token is then only spent when the access token
//! actually expires, not on every cold start.

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

/// Health routes implementation
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create the health check route
    #[must_use]
    pub fn routes() -> Router {
        async fn health_handler() -> Json<Value> {
            Json(json!({ "status": "ok" }))
        }

        Router::new().route("/health", get(health_handler))
    }
}
