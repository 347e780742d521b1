// ABOUTME: Token refresh lifecycle tests: fast path, refresh, failure handling
// ABOUTME: Verifies refresh-token retention and stale-credential semantics
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use chrono::{Duration, Utc};
use common::{spawn_fitbit, test_config, token_response};
use fitbit_relay::config::RelayMode;
use fitbit_relay::errors::RelayError;
use fitbit_relay::oauth::{FitbitOAuthClient, OAuthManager};
use fitbit_relay::store::{Credential, InMemoryTokenStore, OwnerId, TokenStore};
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;

fn manager_for(config: &fitbit_relay::config::ServerConfig) -> (OAuthManager, Arc<dyn TokenStore>) {
    let store: Arc<dyn TokenStore> = Arc::new(InMemoryTokenStore::new());
    let manager = OAuthManager::new(store.clone(), FitbitOAuthClient::new(config.fitbit.clone()));
    (manager, store)
}

fn credential(access: &str, refresh: &str, expires_in_secs: i64) -> Credential {
    Credential {
        access_token: access.into(),
        refresh_token: refresh.into(),
        expires_at: Utc::now() + Duration::seconds(expires_in_secs),
        user_id: Some("ABC123".into()),
    }
}

#[tokio::test]
async fn test_unexpired_token_is_served_without_network() {
    let upstream = spawn_fitbit(200, token_response("at-new", Some("rt-new"), 28800), json!({})).await;
    let config = test_config(RelayMode::Session, &upstream.base_url);
    let (manager, store) = manager_for(&config);
    let owner = OwnerId::Session("sid-1".into());

    store
        .put(owner.clone(), credential("at-live", "rt-live", 3600))
        .await;

    let token = manager.valid_token(&owner).await.unwrap();
    assert_eq!(token, "at-live");
    assert_eq!(upstream.token_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_expired_token_triggers_exactly_one_refresh() {
    let upstream = spawn_fitbit(200, token_response("at-new", Some("rt-new"), 28800), json!({})).await;
    let config = test_config(RelayMode::Session, &upstream.base_url);
    let (manager, store) = manager_for(&config);
    let owner = OwnerId::Session("sid-1".into());

    store
        .put(owner.clone(), credential("at-old", "rt-old", -60))
        .await;

    let token = manager.valid_token(&owner).await.unwrap();
    assert_eq!(token, "at-new");
    assert_eq!(upstream.token_calls.load(Ordering::SeqCst), 1);

    // The refreshed credential replaced the old one in place
    let stored = store.get(&owner).await.unwrap();
    assert_eq!(stored.access_token, "at-new");
    assert_eq!(stored.refresh_token, "rt-new");
    assert!(!stored.is_expired());

    // The next call rides the refreshed token; still one refresh total
    let token = manager.valid_token(&owner).await.unwrap();
    assert_eq!(token, "at-new");
    assert_eq!(upstream.token_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_refresh_keeps_old_refresh_token_when_not_rotated() {
    // Token response without a refresh_token field
    let upstream = spawn_fitbit(200, token_response("at-new", None, 28800), json!({})).await;
    let config = test_config(RelayMode::Session, &upstream.base_url);
    let (manager, store) = manager_for(&config);
    let owner = OwnerId::Session("sid-1".into());

    store
        .put(owner.clone(), credential("at-old", "rt-keep", -60))
        .await;

    manager.valid_token(&owner).await.unwrap();
    let stored = store.get(&owner).await.unwrap();
    assert_eq!(stored.refresh_token, "rt-keep");
}

#[tokio::test]
async fn test_failed_refresh_leaves_stale_credential_in_place() {
    let upstream = spawn_fitbit(
        401,
        json!({
            "errors": [{"errorType": "invalid_grant", "message": "Refresh token invalid"}],
            "success": false
        }),
        json!({}),
    )
    .await;
    let config = test_config(RelayMode::Session, &upstream.base_url);
    let (manager, store) = manager_for(&config);
    let owner = OwnerId::Session("sid-1".into());

    store
        .put(owner.clone(), credential("at-stale", "rt-revoked", -60))
        .await;

    let result = manager.valid_token(&owner).await;
    assert!(matches!(result, Err(RelayError::RefreshFailed)));

    // Stale credential untouched; a later call retries the refresh
    let stored = store.get(&owner).await.expect("credential not cleared");
    assert_eq!(stored.access_token, "at-stale");
    assert_eq!(stored.refresh_token, "rt-revoked");

    assert!(matches!(
        manager.valid_token(&owner).await,
        Err(RelayError::RefreshFailed)
    ));
    assert_eq!(upstream.token_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_missing_credential_distinguishes_owner_kind() {
    let upstream = spawn_fitbit(200, token_response("at", Some("rt"), 28800), json!({})).await;
    let config = test_config(RelayMode::Session, &upstream.base_url);
    let (manager, _) = manager_for(&config);

    assert!(matches!(
        manager
            .valid_token(&OwnerId::Session("nobody".into()))
            .await,
        Err(RelayError::Unauthenticated)
    ));
    assert!(matches!(
        manager.valid_token(&OwnerId::Public).await,
        Err(RelayError::NotConfigured)
    ));
    assert_eq!(upstream.token_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_seeded_public_credential_refreshes_on_first_use() {
    let upstream = spawn_fitbit(200, token_response("at-pub", Some("rt-pub-2"), 28800), json!({})).await;
    let config = test_config(RelayMode::Public, &upstream.base_url);
    let (manager, store) = manager_for(&config);

    manager.seed_public_refresh_token("rt-seed").await;

    // The seed is installed pre-expired, so the first use refreshes
    let token = manager.valid_token(&OwnerId::Public).await.unwrap();
    assert_eq!(token, "at-pub");
    assert_eq!(upstream.token_calls.load(Ordering::SeqCst), 1);

    let stored = store.get(&OwnerId::Public).await.unwrap();
    assert_eq!(stored.refresh_token, "rt-pub-2");
}
