// ABOUTME: Server binary wiring configuration, logging, and the relay service
// ABOUTME: Loads everything from the environment; clap only overrides the port
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Fitbit Relay Server Binary
//!
//! Starts the OAuth token broker and read-only API relay. All configuration
//! comes from environment variables; see `ServerConfig::from_env`.

use anyhow::Result;
use clap::Parser;
use fitbit_relay::{
    config::{RelayMode, ServerConfig},
    logging,
    server::{RelayServer, ServerResources},
};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "fitbit-relay")]
#[command(about = "Fitbit OAuth token broker and read-only API relay")]
struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }

    logging::init_from_env()?;

    info!("Starting Fitbit relay");
    info!("{}", config.summary());

    let port = config.http_port;
    let resources = Arc::new(ServerResources::new(config));
    resources.bootstrap().await;

    display_available_endpoints(&resources.config);

    RelayServer::new(resources).run(port).await
}

/// Display the mounted endpoints for the configured mode
fn display_available_endpoints(config: &ServerConfig) {
    let base = &config.base_url;

    info!("=== Available Endpoints ===");
    info!("Authorization:");
    info!("   Start OAuth flow:  GET  {base}/auth/fitbit");
    info!("   OAuth callback:    GET  {base}/auth/callback");

    match config.mode {
        RelayMode::Session => {
            info!("   Logout:            POST {base}/auth/logout");
            info!("Relay (cookie-authenticated):");
            info!("   Profile:           GET  {base}/api/profile");
            info!("   Leaderboard:       GET  {base}/api/leaderboard");
            info!("   Steps:             GET  {base}/api/steps?startDate=&endDate=");
        }
        RelayMode::Public => {
            info!("Relay (shared account):");
            info!("   Profile:           GET  {base}/api/public/profile");
            info!("   Leaderboard:       GET  {base}/api/public/leaderboard");
            info!("   Steps:             GET  {base}/api/public/steps?startDate=&endDate=");
        }
    }

    info!("Monitoring:");
    info!("   Health check:      GET  {base}/health");
    info!("=== End of Endpoint List ===");
}
