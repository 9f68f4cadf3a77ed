// ABOUTME: Binary entry point: load config, spawn the login worker, serve MCP over stdio
// ABOUTME: The worker and the server run concurrently; login never blocks the protocol
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Garmin Connect MCP server binary.

use anyhow::{Context, Result};
use clap::Parser;
use garmin_mcp_server::auth::handoff::MfaHandoff;
use garmin_mcp_server::auth::session::SessionStore;
use garmin_mcp_server::auth::tokens::TokenStore;
use garmin_mcp_server::auth::worker::LoginWorker;
use garmin_mcp_server::config::ServerConfig;
use garmin_mcp_server::logging;
use garmin_mcp_server::mcp::server::{ServerResources, StdioServer};
use garmin_mcp_server::providers::sso::SsoAuthenticator;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "garmin-mcp-server",
    about = "MCP server exposing Garmin Connect fitness data over stdio",
    version
)]
struct Args {}

#[tokio::main]
async fn main() -> Result<()> {
    let Args {} = Args::parse();
    logging::init()?;

    let config = ServerConfig::from_env().context("loading configuration")?;
    info!("starting garmin-mcp-server: {}", config.summary());

    let store = Arc::new(SessionStore::new());
    let handoff = Arc::new(MfaHandoff::new(config.mfa_request_timeout));
    let tokens = TokenStore::new(&config.tokenstore_dir, &config.tokenstore_base64);
    let authenticator = Arc::new(SsoAuthenticator::new().context("building SSO client")?);

    let worker = Arc::new(LoginWorker::new(
        Arc::clone(&store),
        Arc::clone(&handoff),
        authenticator,
        tokens,
        config.credentials.clone(),
    ));
    // The handle is intentionally detached; the worker reports its outcome
    // through the session store.
    let _login_task = worker.spawn().context("spawning login worker")?;

    let resources = ServerResources::new(store, handoff, config);
    StdioServer::new(resources).run().await
}
