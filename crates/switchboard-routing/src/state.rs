//! Mutable per-call state.

/// Observable position of the transfer state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferPhase {
    /// No transfer committed for the current selection attempt.
    Idle,
    /// Speaking the hold announcement for a committed department.
    Announcing,
    /// Holding for the grace interval before executing the transfer.
    Waiting,
    /// The transfer request is being submitted.
    Transferring,
    /// The request landed; the telephony layer performs the handoff.
    Resolved,
    /// Submission failed; the caller may select again.
    Failed,
}

impl TransferPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Announcing => "announcing",
            Self::Waiting => "waiting",
            Self::Transferring => "transferring",
            Self::Resolved => "resolved",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for TransferPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State for one active call.
///
/// Owned by the orchestrator behind a brief `std::sync::Mutex`; the
/// selection producers never mutate it directly.
#[derive(Debug)]
pub struct CallState {
    /// Last department committed to. Never cleared once set.
    pub selected_department: Option<String>,
    /// True from commit until the attempt resolves. The single
    /// serialization point between the voice and DTMF producers.
    pub transfer_in_flight: bool,
    pub phase: TransferPhase,
}

impl CallState {
    pub fn new() -> Self {
        Self {
            selected_department: None,
            transfer_in_flight: false,
            phase: TransferPhase::Idle,
        }
    }
}

impl Default for CallState {
    fn default() -> Self {
        Self::new()
    }
}
