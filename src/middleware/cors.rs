// ABOUTME: CORS middleware configuration for the static frontend
// ABOUTME: Pins the allowed origin and permits credentialed requests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use crate::config::ServerConfig;
use http::{header::HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Configure CORS for the relay
///
/// The frontend is a static site on a different origin (e.g. GitHub Pages)
/// and authenticates with the session cookie, so the configured
/// `FRONTEND_ORIGIN` is allowed with credentials. A `"*"` origin disables
/// credentials — browsers reject credentialed wildcard responses.
pub fn setup_cors(config: &ServerConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([HeaderName::from_static("content-type")]);

    if config.frontend_origin == "*" {
        return layer.allow_origin(AllowOrigin::any());
    }

    match HeaderValue::from_str(&config.frontend_origin) {
        Ok(origin) => layer
            .allow_origin(AllowOrigin::exact(origin))
            .allow_credentials(true),
        Err(_) => layer.allow_origin(AllowOrigin::any()),
    }
}
