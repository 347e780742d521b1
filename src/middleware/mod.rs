// ABOUTME: HTTP middleware for the relay service
// ABOUTME: Currently CORS configuration for the static frontend origin
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

/// CORS configuration for the frontend origin
pub mod cors;

pub use cors::setup_cors;
