// ABOUTME: OAuth lifecycle manager driving authorize, callback, and refresh
// ABOUTME: Owns the per-owner pending-authorization slots and the token store
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # OAuth Manager
//!
//! One authorization attempt walks `begin_authorization` →
//! `handle_callback`; afterwards `valid_token` serves the access token,
//! refreshing transparently once it expires. Pending authorizations are a
//! single slot per owner: issuing a new one overwrites the old, and a
//! callback consumes the slot exactly once.

use crate::errors::{RelayError, RelayResult};
use crate::oauth::client::FitbitOAuthClient;
use crate::oauth::pkce::{self, PkceParams};
use crate::store::{Credential, OwnerId, TokenStore};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Unconsumed pending authorizations expire after this many minutes
const PENDING_TTL_MINUTES: i64 = 10;

/// Verifier and CSRF state awaiting the matching callback
#[derive(Debug, Clone)]
struct PendingAuthorization {
    verifier: String,
    state: String,
    created_at: DateTime<Utc>,
}

impl PendingAuthorization {
    fn is_expired(&self) -> bool {
        Utc::now() - self.created_at > Duration::minutes(PENDING_TTL_MINUTES)
    }
}

/// Central OAuth lifecycle manager
pub struct OAuthManager {
    store: Arc<dyn TokenStore>,
    client: FitbitOAuthClient,
    pending: RwLock<HashMap<OwnerId, PendingAuthorization>>,
}

impl OAuthManager {
    /// Create a new manager over the given store and token-endpoint client
    #[must_use]
    pub fn new(store: Arc<dyn TokenStore>, client: FitbitOAuthClient) -> Self {
        Self {
            store,
            client,
            pending: RwLock::new(HashMap::new()),
        }
    }

    /// The underlying token store
    #[must_use]
    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    /// Start an authorization attempt for the owner and return the redirect
    /// target
    ///
    /// Overwrites any prior pending authorization for this owner; only the
    /// latest issued state is accepted by the callback.
    ///
    /// # Errors
    /// Returns `Config` if the authorize URL cannot be built
    pub async fn begin_authorization(&self, owner: OwnerId) -> RelayResult<String> {
        let params = PkceParams::generate();
        let state = pkce::generate_state();
        let url = self.client.authorization_url(&state, &params)?;

        let mut slots = self.pending.write().await;
        slots.retain(|_, slot| !slot.is_expired());
        slots.insert(
            owner.clone(),
            PendingAuthorization {
                verifier: params.code_verifier,
                state,
                created_at: Utc::now(),
            },
        );
        drop(slots);

        debug!(%owner, "authorization started");
        Ok(url)
    }

    /// Validate the callback, exchange the code, and store the credential
    ///
    /// The pending slot is consumed only on a state match; a mismatched
    /// callback leaves the latest issued state valid.
    ///
    /// # Errors
    /// `InvalidCallback` for a missing code or state problems,
    /// `ExchangeFailed` when the upstream rejects the exchange
    pub async fn handle_callback(
        &self,
        owner: &OwnerId,
        code: Option<&str>,
        state: Option<&str>,
    ) -> RelayResult<Credential> {
        let code = code
            .filter(|c| !c.is_empty())
            .ok_or_else(|| RelayError::InvalidCallback("missing authorization code".into()))?;
        let state = state
            .filter(|s| !s.is_empty())
            .ok_or_else(|| RelayError::InvalidCallback("missing state".into()))?;

        let pending = self.consume_pending(owner, state).await?;

        let credential = self.client.exchange_code(code, &pending.verifier).await?;
        self.store.put(owner.clone(), credential.clone()).await;

        info!(%owner, user_id = ?credential.user_id, "authorization completed");
        Ok(credential)
    }

    /// Return a currently valid access token for the owner, refreshing if
    /// the stored one has expired
    ///
    /// The unexpired path performs no network call. A failed refresh leaves
    /// the stale credential in place so subsequent calls keep retrying;
    /// only an explicit logout clears it.
    ///
    /// # Errors
    /// `Unauthenticated`/`NotConfigured` when no credential exists,
    /// `RefreshFailed` when the upstream rejects the refresh token
    pub async fn valid_token(&self, owner: &OwnerId) -> RelayResult<String> {
        let current = self.store.get(owner).await.ok_or_else(|| match owner {
            OwnerId::Public => RelayError::NotConfigured,
            OwnerId::Session(_) => RelayError::Unauthenticated,
        })?;

        if !current.is_expired() {
            return Ok(current.access_token);
        }

        debug!(%owner, "access token expired; refreshing");
        let refreshed = self.client.refresh(&current.refresh_token).await?;

        let next = Credential {
            access_token: refreshed.access_token,
            // Fitbit rotates refresh tokens; keep the old one if it did not
            refresh_token: refreshed
                .refresh_token
                .unwrap_or_else(|| current.refresh_token.clone()),
            expires_at: Utc::now() + Duration::seconds(refreshed.expires_in),
            user_id: refreshed.user_id.or(current.user_id),
        };
        self.store.put(owner.clone(), next.clone()).await;

        info!(%owner, "access token refreshed");
        Ok(next.access_token)
    }

    /// Public-mode bootstrap: install the deployment-configured refresh
    /// token as an already-expired credential so the first relay call
    /// refreshes it
    pub async fn seed_public_refresh_token(&self, refresh_token: &str) {
        let credential = Credential {
            access_token: String::new(),
            refresh_token: refresh_token.to_owned(),
            expires_at: Utc::now(),
            user_id: None,
        };
        self.store.put(OwnerId::Public, credential).await;
        info!("public credential seeded from deployment configuration");
    }

    /// Atomically check the state against the owner's slot and consume it on
    /// a match
    async fn consume_pending(
        &self,
        owner: &OwnerId,
        state: &str,
    ) -> RelayResult<PendingAuthorization> {
        let mut slots = self.pending.write().await;

        let (expired, state_matches) = match slots.get(owner) {
            Some(slot) => (slot.is_expired(), slot.state == state),
            None => (false, false),
        };

        if expired {
            slots.remove(owner);
        } else if state_matches {
            if let Some(slot) = slots.remove(owner) {
                return Ok(slot);
            }
        }

        warn!(%owner, "callback state did not match any pending authorization");
        Err(RelayError::InvalidCallback("state mismatch".into()))
    }
}
