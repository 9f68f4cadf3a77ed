// ABOUTME: Race-free rendezvous between the login worker's wait for an MFA code and submit_mfa_code
// ABOUTME: Mutex-guarded oneshot slot; deposit and flag-clear are one atomic take, no poll loops
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # MFA Handoff Channel
//!
//! The synchronization primitive connecting the login worker's blocking wait
//! for an MFA code to the interactive `submit_mfa_code` tool call.
//!
//! The worker calls [`MfaHandoff::begin`] to open a request and then awaits
//! [`PendingMfa::wait`] with a bounded timeout. The interactive side calls
//! [`MfaHandoff::submit`], which atomically takes the single deposit slot:
//! exactly one submitter can win while a request is outstanding, every other
//! concurrent submitter observes [`StateError::NoMfaRequestPending`], and a
//! stale submit after the worker timed out fails the same way because the
//! receiver is already gone.

use crate::errors::{AuthError, AuthResult, StateError};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::debug;

type CodeSlot = Option<oneshot::Sender<String>>;

/// Rendezvous object for the single outstanding MFA request.
pub struct MfaHandoff {
    slot: Mutex<CodeSlot>,
    request_timeout: Duration,
}

impl MfaHandoff {
    /// Create a handoff whose [`PendingMfa::wait`] gives up after `request_timeout`.
    pub fn new(request_timeout: Duration) -> Self {
        Self {
            slot: Mutex::new(None),
            request_timeout,
        }
    }

    fn lock(&self) -> MutexGuard<'_, CodeSlot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether a request is currently outstanding.
    pub fn is_pending(&self) -> bool {
        self.lock().is_some()
    }

    /// Open an MFA request. At most one may be outstanding; a second `begin`
    /// while one is live is a caller error, not a silent overwrite.
    pub fn begin(&self) -> Result<PendingMfa<'_>, StateError> {
        let mut slot = self.lock();
        if slot.is_some() {
            return Err(StateError::DuplicateMfaRequest);
        }
        let (tx, rx) = oneshot::channel();
        *slot = Some(tx);
        debug!("MFA request opened");
        Ok(PendingMfa { handoff: self, rx })
    }

    /// Deposit a code for the outstanding request.
    ///
    /// The take of the sender is the consume: it clears the "code wanted"
    /// flag and hands the code over in one step under the slot lock, so a
    /// concurrent submitter or a stale flag can never double-deliver.
    pub fn submit(&self, code: String) -> Result<(), StateError> {
        let tx = self
            .lock()
            .take()
            .ok_or(StateError::NoMfaRequestPending)?;
        // Send fails only if the worker's wait already timed out and dropped
        // the receiver; to the submitter that is the same "nothing pending".
        tx.send(code).map_err(|_| StateError::NoMfaRequestPending)?;
        debug!("MFA code deposited");
        Ok(())
    }
}

/// An outstanding MFA request held by the login worker.
///
/// Dropping it (on timeout or any worker error) clears the slot, so late
/// submitters are rejected instead of depositing into the void.
pub struct PendingMfa<'a> {
    handoff: &'a MfaHandoff,
    rx: oneshot::Receiver<String>,
}

impl PendingMfa<'_> {
    /// Block up to the handoff's request timeout for a deposited code.
    pub async fn wait(mut self) -> AuthResult<String> {
        match tokio::time::timeout(self.handoff.request_timeout, &mut self.rx).await {
            Ok(Ok(code)) => Ok(code),
            // Sender dropped without a code (process shutdown) or timeout.
            Ok(Err(_)) | Err(_) => Err(AuthError::MfaTimeout),
        }
    }
}

impl Drop for PendingMfa<'_> {
    fn drop(&mut self) {
        self.handoff.lock().take();
    }
}
