// ABOUTME: Configuration module organizing environment and OAuth provider settings
// ABOUTME: Everything is sourced from environment variables; no config files
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Environment-only configuration management

/// Server-wide environment configuration
pub mod environment;

/// Fitbit OAuth client configuration
pub mod oauth;

pub use environment::{RelayMode, ServerConfig};
pub use oauth::FitbitConfig;
