// ABOUTME: Server assembly: shared resources bundle and the axum service
// ABOUTME: Builds the mode-dependent router with trace, timeout, and CORS layers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Server assembly
//!
//! [`ServerResources`] bundles everything the route handlers share: the
//! configuration, the token store, the OAuth manager, the Fitbit API client,
//! and the response cache. [`RelayServer`] mounts the routers for the
//! configured deployment mode and serves them.

use crate::cache::ResponseCache;
use crate::config::{RelayMode, ServerConfig};
use crate::middleware::setup_cors;
use crate::oauth::{FitbitOAuthClient, OAuthManager};
use crate::providers::FitbitApiClient;
use crate::routes::{ApiRoutes, AuthRoutes, HealthRoutes, PublicApiRoutes};
use crate::store::{InMemoryTokenStore, TokenStore};
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Whole-request timeout applied to every route
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Shared state for all route handlers
pub struct ServerResources {
    /// Deployment configuration
    pub config: ServerConfig,
    /// Credential storage
    pub token_store: Arc<dyn TokenStore>,
    /// OAuth lifecycle manager
    pub oauth: OAuthManager,
    /// Fitbit data API client
    pub api: FitbitApiClient,
    /// Response cache for the public-mode endpoints
    pub cache: ResponseCache,
}

impl ServerResources {
    /// Assemble resources from configuration with in-memory storage
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        let token_store: Arc<dyn TokenStore> = Arc::new(InMemoryTokenStore::new());
        let oauth = OAuthManager::new(
            token_store.clone(),
            FitbitOAuthClient::new(config.fitbit.clone()),
        );
        let api = FitbitApiClient::new(config.fitbit.api_base.clone());

        Self {
            config,
            token_store,
            oauth,
            api,
            cache: ResponseCache::new(),
        }
    }

    /// One-time startup work: install the public refresh-token seed when the
    /// deployment provides one
    pub async fn bootstrap(&self) {
        if !self.config.mode.is_public() {
            return;
        }

        if let Some(token) = self.config.fitbit.public_refresh_token.clone() {
            self.oauth.seed_public_refresh_token(&token).await;
        } else {
            warn!(
                "public mode without FITBIT_PUBLIC_REFRESH_TOKEN; \
                 /api/public/* returns 503 until setup via /auth/fitbit"
            );
        }
    }
}

/// The relay HTTP service
pub struct RelayServer {
    resources: Arc<ServerResources>,
}

impl RelayServer {
    /// Create a server over the shared resources
    #[must_use]
    pub fn new(resources: Arc<ServerResources>) -> Self {
        Self { resources }
    }

    /// Build the router for the configured deployment mode
    #[must_use]
    pub fn router(&self) -> Router {
        let mut router = Router::new()
            .merge(HealthRoutes::routes())
            .merge(AuthRoutes::routes(self.resources.clone()));

        router = match self.resources.config.mode {
            RelayMode::Session => router.merge(ApiRoutes::routes(self.resources.clone())),
            RelayMode::Public => router.merge(PublicApiRoutes::routes(self.resources.clone())),
        };

        router
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(Duration::from_secs(REQUEST_TIMEOUT_SECS)))
            .layer(setup_cors(&self.resources.config))
    }

    /// Bind and serve until the process is stopped
    ///
    /// # Errors
    /// Returns an error if the listener cannot bind or the server fails
    pub async fn run(self, port: u16) -> Result<()> {
        let listener = TcpListener::bind(format!("0.0.0.0:{port}")).await?;
        info!(
            mode = %self.resources.config.mode,
            port,
            "relay listening"
        );
        axum::serve(listener, self.router()).await?;
        Ok(())
    }
}
