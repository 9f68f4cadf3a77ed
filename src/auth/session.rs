// ABOUTME: Thread-safe owner of the live AuthState and the Garmin client handle
// ABOUTME: Watch channel lets waiters wake on state change instead of polling
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Session Store
//!
//! The single mutable shared resource in the process: the `(AuthState,
//! client handle)` pair. All mutation happens under one lock, held only for
//! the duration of a read or write, never across an await. Observers
//! subscribe to a watch channel and wake immediately on a transition.
//!
//! Invariant: the client handle is `Some` iff the state is `Authenticated`,
//! and both are set in the same critical section, so a caller that observes
//! `Authenticated` is guaranteed the handle is already present.

use crate::auth::state::AuthState;
use crate::errors::StateError;
use crate::providers::connect::ConnectClient;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tracing::info;

struct Session {
    state: AuthState,
    client: Option<std::sync::Arc<ConnectClient>>,
}

/// Thread-safe store for the authentication state and client handle.
pub struct SessionStore {
    inner: Mutex<Session>,
    notify: watch::Sender<AuthState>,
}

impl SessionStore {
    /// Create a store in the `Unauthenticated` state with no handle.
    pub fn new() -> Self {
        let (notify, _) = watch::channel(AuthState::Unauthenticated);
        Self {
            inner: Mutex::new(Session {
                state: AuthState::Unauthenticated,
                client: None,
            }),
            notify,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        // A poisoned lock means a panicked writer; the state itself is still
        // a valid enum value, so recover the guard rather than propagate.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Non-blocking snapshot of the current state.
    pub fn state(&self) -> AuthState {
        self.lock().state.clone()
    }

    /// The client handle, present only while `Authenticated`.
    pub fn client(&self) -> Option<std::sync::Arc<ConnectClient>> {
        self.lock().client.clone()
    }

    /// Move to `next`, validating the monotonic transition order.
    pub fn transition(&self, next: AuthState) -> Result<(), StateError> {
        let mut session = self.lock();
        if !session.state.can_transition(&next) {
            return Err(StateError::InvalidTransition {
                from: session.state.clone(),
                to: next,
            });
        }
        info!(from = %session.state, to = %next, "auth state transition");
        session.state = next.clone();
        // Notify while still holding the lock so observers see transitions
        // in the same total order the store applied them.
        let _ = self.notify.send(next);
        Ok(())
    }

    /// Set the client handle and move to `Authenticated` in one critical section.
    pub fn authenticate(
        &self,
        client: std::sync::Arc<ConnectClient>,
    ) -> Result<(), StateError> {
        let mut session = self.lock();
        if !session.state.can_transition(&AuthState::Authenticated) {
            return Err(StateError::InvalidTransition {
                from: session.state.clone(),
                to: AuthState::Authenticated,
            });
        }
        info!(from = %session.state, "auth state transition to authenticated; client handle set");
        session.client = Some(client);
        session.state = AuthState::Authenticated;
        let _ = self.notify.send(AuthState::Authenticated);
        Ok(())
    }

    /// Subscribe to state changes. The receiver initially holds the state as
    /// of subscription time, so a terminal state reached earlier is not missed.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.notify.subscribe()
    }

    /// Block up to `timeout` for a terminal state; `None` when it expires.
    pub async fn wait_for_terminal(&self, timeout: Duration) -> Option<AuthState> {
        let mut rx = self.subscribe();
        // The Ref returned by wait_for borrows rx; keep it in a local that
        // drops before rx does.
        let outcome = tokio::time::timeout(timeout, rx.wait_for(AuthState::is_terminal)).await;
        match outcome {
            Ok(Ok(state)) => Some(state.clone()),
            // Channel closed (store dropped) or timeout: either way no
            // terminal state was observed in time.
            Ok(Err(_)) | Err(_) => None,
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AuthFailure;

    #[test]
    fn starts_unauthenticated_without_handle() {
        let store = SessionStore::new();
        assert_eq!(store.state(), AuthState::Unauthenticated);
        assert!(store.client().is_none());
    }

    #[test]
    fn rejects_invalid_transition() {
        let store = SessionStore::new();
        let err = store
            .transition(AuthState::AwaitingMfa)
            .expect_err("must reject skipping pending");
        assert!(matches!(err, StateError::InvalidTransition { .. }));
        assert_eq!(store.state(), AuthState::Unauthenticated);
    }

    #[test]
    fn failed_is_terminal() {
        let store = SessionStore::new();
        store.transition(AuthState::Pending).unwrap();
        store
            .transition(AuthState::Failed(AuthFailure::MfaTimeout))
            .unwrap();
        assert!(store.transition(AuthState::Pending).is_err());
        assert_eq!(store.state(), AuthState::Failed(AuthFailure::MfaTimeout));
    }

    #[tokio::test]
    async fn wait_for_terminal_wakes_on_transition() {
        let store = std::sync::Arc::new(SessionStore::new());
        store.transition(AuthState::Pending).unwrap();

        let waiter = {
            let store = store.clone();
            tokio::spawn(async move {
                store.wait_for_terminal(Duration::from_secs(5)).await
            })
        };
        tokio::task::yield_now().await;
        store
            .transition(AuthState::Failed(AuthFailure::MissingCredentials))
            .unwrap();

        let observed = waiter.await.unwrap();
        assert_eq!(
            observed,
            Some(AuthState::Failed(AuthFailure::MissingCredentials))
        );
    }

    #[tokio::test]
    async fn wait_for_terminal_returns_an_already_terminal_state() {
        let store = SessionStore::new();
        store.transition(AuthState::Pending).unwrap();
        store.transition(AuthState::Authenticated).unwrap();
        let observed = store.wait_for_terminal(Duration::from_millis(20)).await;
        assert_eq!(observed, Some(AuthState::Authenticated));
    }

    #[tokio::test]
    async fn wait_for_terminal_times_out() {
        let store = SessionStore::new();
        store.transition(AuthState::Pending).unwrap();
        let observed = store.wait_for_terminal(Duration::from_millis(20)).await;
        assert!(observed.is_none());
    }
}
