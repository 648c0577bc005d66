//! Per-call worker: greeting, event dispatch, teardown.
//!
//! Calls arrive from the hosting session runtime as [`IncomingCall`]
//! jobs. Each call runs on its own task; within a call, every tone
//! event dispatches as an independent task and the orchestrator's
//! in-flight discipline serializes them.

use std::sync::Arc;
use std::time::Duration;
use switchboard_routing::{
    CallInfo, DepartmentRegistry, InputArbiter, SessionEvent, SpeechOutlet, TransferOrchestrator,
};
use switchboard_transfer::{ControlPlaneConfig, TransferClient, TransferEndpoint};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

/// A call handed to the worker by the hosting session runtime.
pub struct IncomingCall {
    pub info: CallInfo,
    pub speech: Arc<dyn SpeechOutlet>,
    pub events: mpsc::Receiver<SessionEvent>,
}

/// Builds the greeting spoken when a call connects.
pub fn greeting(registry: &DepartmentRegistry) -> String {
    format!(
        "Hi, thanks for calling! {} You can also just tell me which department you need.",
        registry.menu_prompt()
    )
}

/// Runs one call to completion: greet, dispatch selection events, tear
/// down when the session ends.
///
/// The transfer endpoint is call-scoped and closed exactly once, after
/// the event stream ends. Teardown also signals the disconnect watch,
/// which unblocks any grace wait still in progress.
pub async fn run_call(
    call: IncomingCall,
    registry: Arc<DepartmentRegistry>,
    endpoint: Arc<dyn TransferEndpoint>,
    grace_interval: Duration,
) {
    let IncomingCall {
        info,
        speech,
        mut events,
    } = call;

    let (disconnect_tx, disconnect_rx) = watch::channel(false);
    let orchestrator = Arc::new(TransferOrchestrator::new(
        info.clone(),
        speech.clone(),
        endpoint.clone(),
        grace_interval,
        disconnect_rx,
    ));
    let arbiter = Arc::new(InputArbiter::new(
        registry.clone(),
        orchestrator,
        speech.clone(),
    ));

    info!(
        room = %info.room_name,
        participant = %info.participant_identity,
        "call connected"
    );
    speech.say(&greeting(&registry)).await;

    while let Some(event) = events.recv().await {
        match event {
            SessionEvent::Dtmf {
                digit,
                participant_identity,
            } => {
                let arbiter = arbiter.clone();
                tokio::spawn(async move {
                    arbiter.handle_dtmf(&digit, &participant_identity).await;
                });
            }
            SessionEvent::Intent { token, reply } => {
                let arbiter = arbiter.clone();
                tokio::spawn(async move {
                    let confirmation = arbiter.handle_intent(&token).await;
                    // The runtime may have dropped its side already.
                    let _ = reply.send(confirmation);
                });
            }
            SessionEvent::Disconnected => {
                debug!(room = %info.room_name, "disconnect event received");
                break;
            }
        }
    }

    let _ = disconnect_tx.send(true);
    endpoint.close().await;
    info!(room = %info.room_name, "call torn down");
}

/// Accepts calls from the hosting session runtime and runs each on its
/// own task.
pub struct Worker {
    registry: Arc<DepartmentRegistry>,
    control_plane: ControlPlaneConfig,
    grace_interval: Duration,
}

impl Worker {
    pub fn new(
        registry: Arc<DepartmentRegistry>,
        control_plane: ControlPlaneConfig,
        grace_interval: Duration,
    ) -> Self {
        Self {
            registry,
            control_plane,
            grace_interval,
        }
    }

    /// Runs until the dispatch channel closes.
    pub async fn run(self, mut calls: mpsc::Receiver<IncomingCall>) {
        info!(
            departments = self.registry.entries().len(),
            "worker ready, awaiting calls"
        );

        while let Some(call) = calls.recv().await {
            let endpoint: Arc<dyn TransferEndpoint> =
                Arc::new(TransferClient::new(self.control_plane.clone()));
            tokio::spawn(run_call(
                call,
                self.registry.clone(),
                endpoint,
                self.grace_interval,
            ));
        }

        info!("call dispatch channel closed, worker stopping");
    }
}
