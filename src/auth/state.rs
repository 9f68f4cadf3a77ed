// ABOUTME: Authentication state machine with monotonic transition rules
// ABOUTME: Terminal states (Authenticated, Failed) admit no further transitions
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authentication lifecycle states.
//!
//! Exactly one [`AuthState`] is live per process, owned by the
//! [`SessionStore`](crate::auth::session::SessionStore). The transition
//! relation is monotonic:
//!
//! ```text
//! Unauthenticated -> Pending -> { AwaitingMfa -> Pending | Authenticated | Failed }
//!                            |  Authenticated
//!                            |  Failed
//! ```
//!
//! There is no path out of `Authenticated` or `Failed`; a stuck or failed
//! login is abandoned by restarting the process.

use crate::errors::AuthFailure;

/// Where the login handshake currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// Process start; no login attempt has begun.
    Unauthenticated,
    /// The login worker is running the handshake.
    Pending,
    /// The handshake is suspended waiting for an interactively submitted code.
    AwaitingMfa,
    /// Handshake complete; the client handle is set. Terminal.
    Authenticated,
    /// Handshake failed; no automatic retry. Terminal.
    Failed(AuthFailure),
}

impl AuthState {
    /// Whether no further transition is possible.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Authenticated | Self::Failed(_))
    }

    /// Whether `next` is reachable from `self` in one step.
    pub fn can_transition(&self, next: &Self) -> bool {
        match (self, next) {
            (Self::Unauthenticated, Self::Pending)
            | (
                Self::Pending,
                Self::AwaitingMfa | Self::Authenticated | Self::Failed(_),
            )
            | (
                Self::AwaitingMfa,
                Self::Pending | Self::Authenticated | Self::Failed(_),
            ) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "unauthenticated"),
            Self::Pending => write!(f, "pending"),
            Self::AwaitingMfa => write!(f, "awaiting-mfa"),
            Self::Authenticated => write!(f, "authenticated"),
            Self::Failed(reason) => write!(f, "failed ({reason})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_transitions_are_allowed() {
        assert!(AuthState::Unauthenticated.can_transition(&AuthState::Pending));
        assert!(AuthState::Pending.can_transition(&AuthState::AwaitingMfa));
        assert!(AuthState::Pending.can_transition(&AuthState::Authenticated));
        assert!(AuthState::AwaitingMfa.can_transition(&AuthState::Pending));
        assert!(AuthState::AwaitingMfa.can_transition(&AuthState::Authenticated));
    }

    #[test]
    fn failure_is_reachable_from_active_states() {
        let failed = AuthState::Failed(AuthFailure::MfaTimeout);
        assert!(AuthState::Pending.can_transition(&failed));
        assert!(AuthState::AwaitingMfa.can_transition(&failed));
        assert!(!AuthState::Unauthenticated.can_transition(&failed));
    }

    #[test]
    fn terminal_states_admit_no_transitions() {
        let failed = AuthState::Failed(AuthFailure::MissingCredentials);
        for next in [
            AuthState::Unauthenticated,
            AuthState::Pending,
            AuthState::AwaitingMfa,
            AuthState::Authenticated,
            failed.clone(),
        ] {
            assert!(!AuthState::Authenticated.can_transition(&next));
            assert!(!failed.can_transition(&next));
        }
    }

    #[test]
    fn no_skipping_pending() {
        assert!(!AuthState::Unauthenticated.can_transition(&AuthState::Authenticated));
        assert!(!AuthState::Unauthenticated.can_transition(&AuthState::AwaitingMfa));
    }

    #[test]
    fn no_self_transitions() {
        assert!(!AuthState::Pending.can_transition(&AuthState::Pending));
        assert!(!AuthState::AwaitingMfa.can_transition(&AuthState::AwaitingMfa));
    }
}
