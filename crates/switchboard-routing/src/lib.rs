//! Per-call control core for the Switchboard call-routing assistant.
//!
//! Arbitrates between two concurrent selection producers — spoken intent
//! and DTMF digits — sequences a committed transfer through a spoken
//! announcement and a grace delay, and submits it to the transfer client
//! exactly once per committed selection. A failed submission is
//! recoverable: the caller hears an apology and may select again.
//!
//! External collaborators (the dialog/voice runtime and the telephony
//! session transport) are reached only through the narrow interfaces in
//! [`session`].

pub mod arbitration;
pub mod orchestrator;
pub mod registry;
pub mod session;
pub mod state;

pub use arbitration::{InputArbiter, REPROMPT};
pub use orchestrator::{
    announcement, SelectionOutcome, TransferOrchestrator, DEFAULT_GRACE_INTERVAL,
    TRANSFER_APOLOGY,
};
pub use registry::{DepartmentEntry, DepartmentRegistry, IntentDescriptor, RegistryError};
pub use session::{CallInfo, SessionEvent, SpeechOutlet};
pub use state::{CallState, TransferPhase};
