// ABOUTME: Authentication core: state machine, session store, MFA handoff, login worker, tokens
// ABOUTME: Everything concurrency-sensitive in this crate lives here
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authentication core.
//!
//! The login worker runs the handshake in the background; the session store
//! owns the single live [`state::AuthState`] and the client handle; the MFA
//! handoff is the race-free rendezvous between the worker's wait for a code
//! and the interactive `submit_mfa_code` tool.

/// Race-free MFA code rendezvous.
pub mod handoff;

/// Thread-safe state/handle owner with change notification.
pub mod session;

/// The auth state machine and its transition rules.
pub mod state;

/// Token bundle persistence in directory and base64 forms.
pub mod tokens;

/// Background login worker.
pub mod worker;
