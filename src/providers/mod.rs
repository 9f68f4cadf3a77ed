// ABOUTME: External Garmin collaborators: the login handshake and the data API client
// ABOUTME: The authenticator trait is the seam tests replace with a mock
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Garmin Connect collaborators: the SSO handshake and the data client.

/// Authenticated Connect API data client.
pub mod connect;

/// SSO login handshake and the authenticator/MFA-source seams.
pub mod sso;
