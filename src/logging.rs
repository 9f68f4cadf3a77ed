// ABOUTME: Tracing subscriber setup with EnvFilter, writing to stderr
// ABOUTME: Stdout is reserved for the MCP protocol stream and must stay clean
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Structured logging setup.
//!
//! The stdio transport owns stdout, so every log line goes to stderr. The
//! filter comes from `RUST_LOG`, defaulting to `info` for this crate.

use anyhow::Result;
use tracing_subscriber::{fmt, EnvFilter};

/// Default directive applied when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "garmin_mcp_server=info";

/// Initialize the global tracing subscriber.
///
/// # Errors
/// Returns an error if a subscriber is already installed.
pub fn init() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing subscriber: {e}"))?;

    Ok(())
}
