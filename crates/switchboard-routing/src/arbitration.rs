//! Input arbitration: two selection producers, one commit step.
//!
//! The voice-intent and DTMF producers both funnel through
//! [`TransferOrchestrator::route_selection`], whose in-flight
//! check-and-set serializes them: simultaneous selections yield exactly
//! one committed transfer and the later event is dropped.

use crate::orchestrator::{SelectionOutcome, TransferOrchestrator};
use crate::registry::DepartmentRegistry;
use crate::session::SpeechOutlet;
use std::sync::Arc;
use tracing::{debug, info};

/// Spoken when a tone does not match any department.
pub const REPROMPT: &str = "I'm sorry, please choose one of the options I mentioned earlier.";

/// Funnels both selection producers into the orchestrator.
pub struct InputArbiter {
    registry: Arc<DepartmentRegistry>,
    orchestrator: Arc<TransferOrchestrator>,
    speech: Arc<dyn SpeechOutlet>,
}

impl InputArbiter {
    pub fn new(
        registry: Arc<DepartmentRegistry>,
        orchestrator: Arc<TransferOrchestrator>,
        speech: Arc<dyn SpeechOutlet>,
    ) -> Self {
        Self {
            registry,
            orchestrator,
            speech,
        }
    }

    pub fn registry(&self) -> &DepartmentRegistry {
        &self.registry
    }

    /// DTMF producer. Interrupts any in-progress spoken output first so
    /// the caller's selection is not talked over, then resolves the
    /// digit. An unknown digit re-prompts without touching call state.
    pub async fn handle_dtmf(&self, digit: &str, participant_identity: &str) {
        self.speech.interrupt().await;
        debug!(digit, participant = participant_identity, "dtmf received");

        match self.registry.resolve(digit) {
            Some(department) => {
                self.orchestrator.route_selection(department).await;
            }
            None => {
                info!(digit, "unknown dtmf selection, re-prompting");
                self.speech.say(REPROMPT).await;
            }
        }
    }

    /// Voice-intent producer. The dialog runtime invokes a department
    /// intent and phrases its spoken reply from the returned string.
    pub async fn handle_intent(&self, token: &str) -> String {
        let Some(department) = self.registry.resolve(token) else {
            // The advertised intents exactly match the registry; an
            // unresolved token still fails closed.
            info!(token, "intent token did not resolve, re-prompting");
            return REPROMPT.to_string();
        };

        match self.orchestrator.route_selection(department).await {
            SelectionOutcome::Completed { department } => {
                format!("Transferring to {} department.", department)
            }
            SelectionOutcome::Failed { .. } => "I wasn't able to complete the transfer.".to_string(),
            SelectionOutcome::DroppedDuplicate => "A transfer is already in progress.".to_string(),
            SelectionOutcome::Cancelled => {
                "The call ended before the transfer completed.".to_string()
            }
        }
    }
}
