use crate::config::ControlPlaneConfig;
use crate::error::TransferError;
use async_trait::async_trait;
use livekit_api::services::sip::{SIPClient, TransferSIPParticipantOptions};
use std::fmt;
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

/// A single transfer attempt against the control plane.
///
/// Built per committed selection and not retained after submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub participant_identity: String,
    pub room_name: String,
    pub transfer_to: String,
    /// Play a dial tone to the caller while the handoff is in progress.
    pub play_dialtone: bool,
}

/// The orchestrator-facing transfer surface.
///
/// Implementations do not deduplicate requests; the caller's in-flight
/// discipline is the only guard against double submission.
#[async_trait]
pub trait TransferEndpoint: Send + Sync {
    /// Issues exactly one transfer request to the control plane.
    async fn submit(&self, request: &TransferRequest) -> Result<(), TransferError>;

    /// Releases the underlying connection. Submissions after close fail
    /// with [`TransferError::Closed`]. Safe to call when nothing was
    /// ever opened.
    async fn close(&self);
}

#[derive(Default)]
struct HandleSlot {
    opened: Option<Arc<SIPClient>>,
    closed: bool,
}

/// Call-scoped client for the LiveKit SIP participant-transfer API.
///
/// The service client is opened on the first submission and released
/// exactly once at call teardown.
pub struct TransferClient {
    config: ControlPlaneConfig,
    slot: RwLock<HandleSlot>,
}

impl TransferClient {
    pub fn new(config: ControlPlaneConfig) -> Self {
        Self {
            config,
            slot: RwLock::new(HandleSlot::default()),
        }
    }

    /// Returns the open service client, opening it on first use.
    ///
    /// Lock scopes here are brief and never span an await.
    fn handle(&self) -> Result<Arc<SIPClient>, TransferError> {
        {
            let slot = self.slot.read().expect("transfer client lock poisoned");
            if slot.closed {
                return Err(TransferError::Closed);
            }
            if let Some(client) = &slot.opened {
                return Ok(client.clone());
            }
        }

        let mut slot = self.slot.write().expect("transfer client lock poisoned");
        if slot.closed {
            return Err(TransferError::Closed);
        }
        if let Some(client) = &slot.opened {
            return Ok(client.clone());
        }

        debug!(url = %self.config.url, "opening SIP service client");
        let client = Arc::new(SIPClient::with_api_key(
            &self.config.url,
            &self.config.api_key,
            &self.config.api_secret,
        ));
        slot.opened = Some(client.clone());
        Ok(client)
    }

    /// True once the underlying service client has been opened and not
    /// yet released.
    pub fn is_open(&self) -> bool {
        let slot = self.slot.read().expect("transfer client lock poisoned");
        slot.opened.is_some()
    }
}

impl fmt::Debug for TransferClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = self.slot.read().expect("transfer client lock poisoned");
        f.debug_struct("TransferClient")
            .field("config", &self.config)
            .field("opened", &slot.opened.is_some())
            .field("closed", &slot.closed)
            .finish()
    }
}

#[async_trait]
impl TransferEndpoint for TransferClient {
    async fn submit(&self, request: &TransferRequest) -> Result<(), TransferError> {
        let client = self.handle()?;

        info!(
            participant = %request.participant_identity,
            room = %request.room_name,
            transfer_to = %request.transfer_to,
            "submitting SIP participant transfer"
        );

        client
            .transfer_sip_participant(
                request.room_name.clone(),
                request.participant_identity.clone(),
                request.transfer_to.clone(),
                TransferSIPParticipantOptions {
                    play_dialtone: Some(request.play_dialtone),
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| TransferError::Submission(e.to_string()))?;

        info!(
            participant = %request.participant_identity,
            transfer_to = %request.transfer_to,
            "transfer submitted"
        );
        Ok(())
    }

    async fn close(&self) {
        let mut slot = self.slot.write().expect("transfer client lock poisoned");
        if slot.closed {
            return;
        }
        slot.closed = true;
        if slot.opened.take().is_some() {
            debug!("SIP service client released");
        }
    }
}
