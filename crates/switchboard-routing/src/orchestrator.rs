//! The transfer state machine.
//!
//! Phases: `Idle → Announcing → Waiting → Transferring → {Resolved,
//! Failed}`. Commit is a check-and-set of `transfer_in_flight` inside
//! one lock scope with no await points, so two near-simultaneous
//! selection events cannot both commit. The grace wait is cancellable
//! only by call disconnect, not by further caller input.

use crate::registry::DepartmentEntry;
use crate::session::{CallInfo, SpeechOutlet};
use crate::state::{CallState, TransferPhase};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use switchboard_transfer::{TransferEndpoint, TransferRequest};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Delay between announcing a transfer and executing it, giving the
/// announcement time to be heard.
pub const DEFAULT_GRACE_INTERVAL: Duration = Duration::from_secs(6);

/// Spoken after a failed submission; the call then continues.
pub const TRANSFER_APOLOGY: &str =
    "I'm sorry, I couldn't transfer your call. Is there something else I can help with?";

/// Builds the hold announcement for a committed department.
pub fn announcement(department: &DepartmentEntry) -> String {
    format!(
        "Transferring you to our {} department in a moment. Please hold.",
        department.display_name
    )
}

/// How a selection event was ultimately handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// The transfer request landed; the telephony layer takes over.
    Completed { department: String },
    /// Submission failed; the caller was apologized to and may retry.
    Failed { department: String },
    /// Another transfer was already in flight; this event was dropped.
    DroppedDuplicate,
    /// The call disconnected before the transfer executed.
    Cancelled,
}

/// Sequences committed selections and owns the call state exclusively.
pub struct TransferOrchestrator {
    call: CallInfo,
    state: Mutex<CallState>,
    speech: Arc<dyn SpeechOutlet>,
    endpoint: Arc<dyn TransferEndpoint>,
    grace_interval: Duration,
    disconnect: watch::Receiver<bool>,
}

impl TransferOrchestrator {
    pub fn new(
        call: CallInfo,
        speech: Arc<dyn SpeechOutlet>,
        endpoint: Arc<dyn TransferEndpoint>,
        grace_interval: Duration,
        disconnect: watch::Receiver<bool>,
    ) -> Self {
        Self {
            call,
            state: Mutex::new(CallState::new()),
            speech,
            endpoint,
            grace_interval,
            disconnect,
        }
    }

    pub fn phase(&self) -> TransferPhase {
        self.lock_state().phase
    }

    pub fn transfer_in_flight(&self) -> bool {
        self.lock_state().transfer_in_flight
    }

    pub fn selected_department(&self) -> Option<String> {
        self.lock_state().selected_department.clone()
    }

    /// Runs one selection through commit → announce → grace wait →
    /// submit. At most one attempt is in flight per call; later
    /// selections are dropped until the attempt resolves.
    pub async fn route_selection(&self, department: &DepartmentEntry) -> SelectionOutcome {
        if !self.try_commit(department) {
            debug!(
                department = %department.display_name,
                "selection dropped, transfer already in flight"
            );
            return SelectionOutcome::DroppedDuplicate;
        }

        info!(
            department = %department.display_name,
            participant = %self.call.participant_identity,
            room = %self.call.room_name,
            "transfer committed"
        );
        self.speech.say(&announcement(department)).await;

        self.set_phase(TransferPhase::Waiting);
        if !self.grace_elapsed().await {
            info!(
                department = %department.display_name,
                "call disconnected during grace wait, transfer abandoned"
            );
            self.resolve_attempt(TransferPhase::Idle);
            return SelectionOutcome::Cancelled;
        }

        self.set_phase(TransferPhase::Transferring);
        let request = TransferRequest {
            participant_identity: self.call.participant_identity.clone(),
            room_name: self.call.room_name.clone(),
            transfer_to: department.transfer_to.clone(),
            play_dialtone: true,
        };

        match self.endpoint.submit(&request).await {
            Ok(()) => {
                self.resolve_attempt(TransferPhase::Resolved);
                info!(department = %department.display_name, "transfer resolved");
                SelectionOutcome::Completed {
                    department: department.display_name.clone(),
                }
            }
            Err(e) => {
                warn!(
                    department = %department.display_name,
                    error = %e,
                    "transfer submission failed"
                );
                self.resolve_attempt(TransferPhase::Failed);
                self.speech.say(TRANSFER_APOLOGY).await;
                self.return_to_idle();
                SelectionOutcome::Failed {
                    department: department.display_name.clone(),
                }
            }
        }
    }

    /// Commits a selection unless a transfer is already in flight.
    ///
    /// Check and set share one lock scope with no await points.
    fn try_commit(&self, department: &DepartmentEntry) -> bool {
        let mut state = self.lock_state();
        if state.transfer_in_flight {
            return false;
        }
        state.transfer_in_flight = true;
        state.selected_department = Some(department.display_name.clone());
        state.phase = TransferPhase::Announcing;
        true
    }

    /// Waits out the grace interval. Only call disconnect cuts it short.
    async fn grace_elapsed(&self) -> bool {
        let mut disconnect = self.disconnect.clone();
        tokio::select! {
            _ = tokio::time::sleep(self.grace_interval) => true,
            _ = disconnected(&mut disconnect) => false,
        }
    }

    fn set_phase(&self, phase: TransferPhase) {
        self.lock_state().phase = phase;
    }

    /// Ready for a new selection, unless one already committed while the
    /// apology was being spoken.
    fn return_to_idle(&self) {
        let mut state = self.lock_state();
        if !state.transfer_in_flight {
            state.phase = TransferPhase::Idle;
        }
    }

    fn resolve_attempt(&self, phase: TransferPhase) {
        let mut state = self.lock_state();
        state.transfer_in_flight = false;
        state.phase = phase;
    }

    fn lock_state(&self) -> MutexGuard<'_, CallState> {
        self.state.lock().expect("call state lock poisoned")
    }
}

/// Resolves when the call disconnects. A dropped sender means teardown
/// is already underway and counts as disconnected.
async fn disconnected(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            return;
        }
    }
}
