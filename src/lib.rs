// ABOUTME: Main library entry point for the Fitbit relay backend
// ABOUTME: Exposes the OAuth broker, token store, response cache, and HTTP routes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![deny(unsafe_code)]

//! # Fitbit Relay
//!
//! An OAuth2/PKCE token broker and read-only API relay that sits between a
//! public static frontend and the Fitbit Web API. Client secrets never reach
//! the browser: the relay drives the authorization-code flow, refreshes
//! access tokens transparently, and re-exposes a narrow set of read-only
//! endpoints (profile, friends leaderboard, steps over a date range).
//!
//! ## Deployment modes
//!
//! - **Session mode**: every visitor authorizes their own Fitbit account;
//!   credentials are keyed by an opaque session cookie.
//! - **Public mode**: a single shared Fitbit account is authorized once by
//!   the operator; all visitors read through the same credential, shielded
//!   by a short-TTL response cache.
//!
//! ## Architecture
//!
//! - **`oauth`**: PKCE generation, the token-endpoint client, and the
//!   authorize/callback/refresh lifecycle manager
//! - **`store`**: credential storage keyed by session or the public slot
//! - **`providers`**: the Fitbit data API client used by the relay routes
//! - **`cache`**: response memoization for the public-mode endpoints
//! - **`routes`**: axum routers for the auth, API, and health surfaces
//! - **`config`**: environment-only configuration management

/// Response memoization for cacheable public-mode endpoints
pub mod cache;

/// Environment-only configuration management
pub mod config;

/// Unified error taxonomy with HTTP response mapping
pub mod errors;

/// Production logging and structured output
pub mod logging;

/// HTTP middleware (CORS for the frontend origin)
pub mod middleware;

/// OAuth2 PKCE flow: generator, token-endpoint client, lifecycle manager
pub mod oauth;

/// Fitbit data API client used by the relay endpoints
pub mod providers;

/// `HTTP` routes for the auth, relay, and health surfaces
pub mod routes;

/// Server assembly: shared resources and the axum service
pub mod server;

/// Credential storage keyed by session or the shared public slot
pub mod store;
