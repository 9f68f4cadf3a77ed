// ABOUTME: Shared server resources and the newline-delimited JSON-RPC loop over stdio
// ABOUTME: Requests are handled concurrently so a slow tool call never blocks the next read
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Stdio Server
//!
//! Reads one JSON-RPC request per line from stdin and writes one response per
//! line to stdout. Each request is handled on its own task and responses are
//! funneled through a single writer, so a tool call that waits (such as
//! `submit_mfa_code` waiting for the login outcome) never stalls
//! `get_auth_status` or `ping` behind it. stdout carries protocol frames
//! only; all logging goes to stderr.

use crate::auth::handoff::MfaHandoff;
use crate::auth::session::SessionStore;
use crate::config::ServerConfig;
use crate::jsonrpc::{error_codes, JsonRpcRequest, JsonRpcResponse};
use crate::mcp::protocol;
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Shared state every request handler sees.
#[derive(Clone)]
pub struct ServerResources {
    /// Auth state and client handle owner.
    pub store: Arc<SessionStore>,
    /// MFA code rendezvous.
    pub handoff: Arc<MfaHandoff>,
    /// Startup configuration.
    pub config: Arc<ServerConfig>,
}

impl ServerResources {
    /// Bundle the shared state for the request handlers.
    pub fn new(store: Arc<SessionStore>, handoff: Arc<MfaHandoff>, config: ServerConfig) -> Self {
        Self {
            store,
            handoff,
            config: Arc::new(config),
        }
    }

    #[cfg(test)]
    pub(crate) fn for_tests(store: Arc<SessionStore>) -> Self {
        use std::time::Duration;
        Self::new(
            store,
            Arc::new(MfaHandoff::new(Duration::from_secs(5))),
            ServerConfig {
                credentials: None,
                tokenstore_dir: std::path::PathBuf::from("/tmp/garmin-tokens-test"),
                tokenstore_base64: std::path::PathBuf::from("/tmp/garmin-tokens-test.b64"),
                mfa_request_timeout: Duration::from_secs(5),
                mfa_submit_wait: Duration::from_millis(100),
            },
        )
    }
}

/// The MCP server loop over stdin/stdout.
pub struct StdioServer {
    resources: ServerResources,
}

impl StdioServer {
    /// Build the server around its shared resources.
    pub fn new(resources: ServerResources) -> Self {
        Self { resources }
    }

    /// Serve until stdin closes.
    pub async fn run(self) -> Result<()> {
        info!("MCP server listening on stdio");

        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<String>();
        let writer = tokio::spawn(async move {
            let mut stdout = tokio::io::stdout();
            while let Some(line) = out_rx.recv().await {
                if stdout.write_all(line.as_bytes()).await.is_err()
                    || stdout.write_all(b"\n").await.is_err()
                    || stdout.flush().await.is_err()
                {
                    // Client hung up; drain silently until the readers stop.
                    break;
                }
            }
        });

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await.context("reading stdin")? {
            let line = line.trim().to_owned();
            if line.is_empty() {
                continue;
            }
            let resources = self.resources.clone();
            let out_tx = out_tx.clone();
            tokio::spawn(async move {
                if let Some(response) = Self::process_line(&resources, &line).await {
                    match serde_json::to_string(&response) {
                        Ok(serialized) => {
                            let _ = out_tx.send(serialized);
                        }
                        Err(e) => warn!(%e, "failed to serialize response"),
                    }
                }
            });
        }

        info!("stdin closed; shutting down");
        drop(out_tx);
        let _ = writer.await;
        Ok(())
    }

    async fn process_line(resources: &ServerResources, line: &str) -> Option<JsonRpcResponse> {
        match serde_json::from_str::<JsonRpcRequest>(line) {
            Ok(request) => protocol::handle(resources, request).await,
            Err(e) => {
                debug!(%e, "unparseable request line");
                Some(JsonRpcResponse::error(
                    None,
                    error_codes::PARSE_ERROR,
                    format!("Parse error: {e}"),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn bad_json_yields_parse_error() {
        let resources = ServerResources::for_tests(Arc::new(SessionStore::new()));
        let response = StdioServer::process_line(&resources, "{not json")
            .await
            .unwrap();
        assert_eq!(response.error.unwrap().code, error_codes::PARSE_ERROR);
        assert!(response.id.is_none());
    }

    #[tokio::test]
    async fn valid_request_is_routed() {
        let resources = ServerResources::for_tests(Arc::new(SessionStore::new()));
        let line = json!({"jsonrpc": "2.0", "method": "ping", "id": 1}).to_string();
        let response = StdioServer::process_line(&resources, &line).await.unwrap();
        assert!(response.error.is_none());
        assert_eq!(response.id, Some(json!(1)));
    }
}
