//! Collaborator boundary: the telephony session and the dialog runtime.
//!
//! The core never talks to either system directly. The runtime delivers
//! [`SessionEvent`]s into the per-call task and consumes speech through
//! [`SpeechOutlet`].

use async_trait::async_trait;
use tokio::sync::oneshot;

/// Identity of the active telephony session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallInfo {
    pub room_name: String,
    pub participant_identity: String,
}

impl CallInfo {
    pub fn new(room_name: impl Into<String>, participant_identity: impl Into<String>) -> Self {
        Self {
            room_name: room_name.into(),
            participant_identity: participant_identity.into(),
        }
    }
}

/// Outbound speech surface of the dialog runtime.
#[async_trait]
pub trait SpeechOutlet: Send + Sync {
    /// Speaks a reply to the caller. Delivery is the runtime's concern;
    /// routing decisions never depend on whether an utterance landed.
    async fn say(&self, text: &str);

    /// Cancels any in-progress spoken output. Must be a no-op when
    /// nothing is in progress.
    async fn interrupt(&self);
}

/// Events raised by the telephony session and dialog runtime.
#[derive(Debug)]
pub enum SessionEvent {
    /// A touch-tone was detected for the given participant.
    Dtmf {
        digit: String,
        participant_identity: String,
    },
    /// The runtime invoked a department-selection intent. The short
    /// confirmation string is sent back through `reply`; the runtime
    /// phrases its spoken response from it.
    Intent {
        token: String,
        reply: oneshot::Sender<String>,
    },
    /// The call ended.
    Disconnected,
}
