// ABOUTME: MCP protocol layer: schema types, method handlers, and the stdio server loop
// ABOUTME: Speaks newline-delimited JSON-RPC 2.0 on stdin/stdout; logs only to stderr
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model Context Protocol layer.

/// Protocol method handlers.
pub mod protocol;

/// Protocol schema types.
pub mod schema;

/// Shared resources and the stdio server loop.
pub mod server;
