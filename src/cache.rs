// ABOUTME: In-memory response memoization for the public-mode relay endpoints
// ABOUTME: Serves entries younger than a TTL and refills synchronously on miss
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Response Cache
//!
//! Shields the upstream API from every visitor of a public-mode deployment.
//! One entry per cacheable endpoint, overwrite-on-refresh, no eviction —
//! memory is bounded by construction. Concurrent misses may both invoke the
//! fetch and converge on the same entry (no stampede lock).

use crate::errors::RelayResult;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

/// Cached payload with its fetch timestamp
#[derive(Debug, Clone)]
struct CacheEntry {
    data: Value,
    fetched_at: Instant,
}

/// Keyed response memoization with per-call TTL
#[derive(Default)]
pub struct ResponseCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl ResponseCache {
    /// Create an empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached payload if younger than `ttl`; otherwise invoke
    /// `fetch`, store the result with the current timestamp, and return it
    ///
    /// Fetch failures are propagated and not cached; an older entry remains
    /// until a later fetch succeeds.
    ///
    /// # Errors
    /// Whatever `fetch` returns on a cache miss
    pub async fn get_or_fetch<F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        fetch: F,
    ) -> RelayResult<Value>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = RelayResult<Value>>,
    {
        if let Some(entry) = self.entries.read().await.get(key) {
            if entry.fetched_at.elapsed() < ttl {
                debug!(key, "cache hit");
                return Ok(entry.data.clone());
            }
        }

        debug!(key, "cache miss; fetching upstream");
        let data = fetch().await?;

        self.entries.write().await.insert(
            key.to_owned(),
            CacheEntry {
                data: data.clone(),
                fetched_at: Instant::now(),
            },
        );

        Ok(data)
    }
}
