// ABOUTME: HTTP route modules for the auth, relay, and health surfaces
// ABOUTME: Shared session-cookie helpers live here
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Route handlers, grouped the way the deployment mounts them: the auth
//! flow, the session-mode and public-mode relay endpoints, and the health
//! check used by keep-warm pings.

use crate::store::OwnerId;
use axum_extra::extract::cookie::CookieJar;

/// Session-mode relay endpoints (`/api/*`)
pub mod api;

/// Authorization flow endpoints (`/auth/*`)
pub mod auth;

/// Health check endpoint
pub mod health;

pub use api::{ApiRoutes, PublicApiRoutes};
pub use auth::AuthRoutes;
pub use health::HealthRoutes;

/// Name of the opaque session cookie
pub(crate) const SESSION_COOKIE: &str = "sid";

/// Resolve the calling session's owner identity from the cookie jar
pub(crate) fn session_owner(jar: &CookieJar) -> Option<OwnerId> {
    jar.get(SESSION_COOKIE)
        .map(|cookie| OwnerId::Session(cookie.value().to_owned()))
}
