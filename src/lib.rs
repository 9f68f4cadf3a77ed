// ABOUTME: Garmin Connect MCP server library: auth state machine, MFA handoff, data tools
// ABOUTME: The binary wires these modules together; everything testable lives here
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Garmin Connect MCP Server
//!
//! An MCP server exposing Garmin Connect fitness data as tools, built around
//! one hard problem: Garmin's login may demand an MFA code mid-handshake, and
//! the only way to get one is from the user, through a tool call on the very
//! server that is blocked logging in.
//!
//! The resolution is a background login worker plus a race-free rendezvous:
//! the worker suspends in [`auth::handoff`] while the foreground keeps
//! serving requests, including the `submit_mfa_code` call that wakes it.
//! The [`auth::session`] store owns the single authoritative auth state;
//! data tools pass a non-blocking gate against it and get either the live
//! client or an actionable error.

/// Authentication core: state machine, session store, MFA handoff, worker, tokens.
pub mod auth;

/// Environment-based configuration.
pub mod config;

/// Error taxonomy: auth, state misuse, and provider errors.
pub mod errors;

/// JSON-RPC 2.0 shapes for the stdio transport.
pub mod jsonrpc;

/// Structured logging setup (stderr only).
pub mod logging;

/// MCP protocol layer: schema, handlers, stdio loop.
pub mod mcp;

/// Garmin Connect collaborators: SSO handshake and data client.
pub mod providers;

/// The tools the server advertises.
pub mod tools;
