// ABOUTME: Upstream data API clients used by the relay endpoints
// ABOUTME: Currently Fitbit only; the relay mirrors upstream response shapes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

/// Fitbit Web API client
pub mod fitbit;

pub use fitbit::FitbitApiClient;
