// ABOUTME: Credential storage keyed by browser session or the shared public slot
// ABOUTME: Trait seam plus an in-memory implementation behind an async RwLock
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Token Store
//!
//! Credentials live behind the [`TokenStore`] trait so the OAuth lifecycle
//! is testable without real HTTP session middleware. Owners are independent;
//! a `put` replaces the whole credential atomically and there is no
//! cross-owner visibility.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Identity a credential is stored against
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OwnerId {
    /// Opaque session identifier carried by the `sid` cookie
    Session(String),
    /// The single shared slot used by public-mode deployments
    Public,
}

impl std::fmt::Display for OwnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // Session ids are capability-like; log only a prefix
            Self::Session(id) => write!(f, "session:{}", &id[..id.len().min(8)]),
            Self::Public => write!(f, "public"),
        }
    }
}

/// A stored Fitbit OAuth credential
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    /// Short-lived bearer token for the data API
    pub access_token: String,
    /// Long-lived token used to mint new access tokens
    pub refresh_token: String,
    /// Wall-clock instant after which the access token is invalid
    pub expires_at: DateTime<Utc>,
    /// Fitbit user id from the token response, when present
    pub user_id: Option<String>,
}

impl Credential {
    /// Check if the access token must be treated as invalid
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// Storage seam for credentials, keyed by [`OwnerId`]
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Current credential for the owner, if any
    async fn get(&self, owner: &OwnerId) -> Option<Credential>;

    /// Replace the owner's credential atomically
    async fn put(&self, owner: OwnerId, credential: Credential);

    /// Remove the owner's credential (session-mode logout)
    async fn clear(&self, owner: &OwnerId);
}

/// In-memory token store; credentials live for the process lifetime
#[derive(Default)]
pub struct InMemoryTokenStore {
    entries: RwLock<HashMap<OwnerId, Credential>>,
}

impl InMemoryTokenStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn get(&self, owner: &OwnerId) -> Option<Credential> {
        self.entries.read().await.get(owner).cloned()
    }

    async fn put(&self, owner: OwnerId, credential: Credential) {
        self.entries.write().await.insert(owner, credential);
    }

    async fn clear(&self, owner: &OwnerId) {
        self.entries.write().await.remove(owner);
    }
}
