// ABOUTME: OAuth module organizing the PKCE flow against the Fitbit authorization server
// ABOUTME: Centralizes verifier generation, token exchanges, and credential lifecycle
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # OAuth Management Module
//!
//! The full authorization-code-with-PKCE lifecycle: [`pkce`] generates the
//! verifier/challenge/state material, [`client`] speaks to the Fitbit token
//! endpoint, and [`manager`] ties both to the token store — issuing redirect
//! URLs, validating callbacks, and refreshing expired access tokens.

/// Wire-level client for the Fitbit authorization and token endpoints
pub mod client;

/// Authorize/callback/refresh lifecycle against the token store
pub mod manager;

/// PKCE verifier/challenge and CSRF state generation
pub mod pkce;

pub use client::FitbitOAuthClient;
pub use manager::OAuthManager;
pub use pkce::PkceParams;
