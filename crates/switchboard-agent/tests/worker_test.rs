//! Full call lifecycle through `run_call`: greeting, event dispatch,
//! transfer execution, and teardown, with the dialog runtime and the
//! transfer control plane mocked out.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use switchboard_agent::worker::{greeting, run_call, IncomingCall};
use switchboard_routing::{
    CallInfo, DepartmentEntry, DepartmentRegistry, SessionEvent, SpeechOutlet,
};
use switchboard_transfer::{TransferEndpoint, TransferError, TransferRequest};
use tokio::sync::{mpsc, oneshot};

const GRACE: Duration = Duration::from_secs(6);

#[derive(Default)]
struct RecordingSpeech {
    utterances: Mutex<Vec<String>>,
}

impl RecordingSpeech {
    fn utterances(&self) -> Vec<String> {
        self.utterances
            .lock()
            .expect("utterances lock poisoned")
            .clone()
    }
}

#[async_trait]
impl SpeechOutlet for RecordingSpeech {
    async fn say(&self, text: &str) {
        self.utterances
            .lock()
            .expect("utterances lock poisoned")
            .push(text.to_string());
    }

    async fn interrupt(&self) {}
}

#[derive(Default)]
struct RecordingEndpoint {
    submissions: Mutex<Vec<TransferRequest>>,
    closed: AtomicBool,
}

impl RecordingEndpoint {
    fn submissions(&self) -> Vec<TransferRequest> {
        self.submissions
            .lock()
            .expect("submissions lock poisoned")
            .clone()
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TransferEndpoint for RecordingEndpoint {
    async fn submit(&self, request: &TransferRequest) -> Result<(), TransferError> {
        self.submissions
            .lock()
            .expect("submissions lock poisoned")
            .push(request.clone());
        Ok(())
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

fn standard_registry() -> Arc<DepartmentRegistry> {
    Arc::new(
        DepartmentRegistry::from_entries(vec![
            DepartmentEntry::new("Billing", "+15550000001", "1"),
            DepartmentEntry::new("Tech Support", "+15550000002", "2"),
            DepartmentEntry::new("Customer Service", "+15550000003", "3"),
        ])
        .expect("valid registry"),
    )
}

struct RunningCall {
    events: mpsc::Sender<SessionEvent>,
    speech: Arc<RecordingSpeech>,
    endpoint: Arc<RecordingEndpoint>,
    registry: Arc<DepartmentRegistry>,
    task: tokio::task::JoinHandle<()>,
}

fn start_call() -> RunningCall {
    let registry = standard_registry();
    let speech = Arc::new(RecordingSpeech::default());
    let endpoint = Arc::new(RecordingEndpoint::default());
    let (events, events_rx) = mpsc::channel(8);

    let call = IncomingCall {
        info: CallInfo::new("room-7", "caller-7"),
        speech: speech.clone(),
        events: events_rx,
    };
    let task = tokio::spawn(run_call(call, registry.clone(), endpoint.clone(), GRACE));

    RunningCall {
        events,
        speech,
        endpoint,
        registry,
        task,
    }
}

// ---------------------------------------------------------------------------
// Test: the caller is greeted with the menu when the call connects
// ---------------------------------------------------------------------------
#[tokio::test(start_paused = true)]
async fn caller_is_greeted_on_connect() {
    let call = start_call();

    call.events
        .send(SessionEvent::Disconnected)
        .await
        .expect("send disconnect");
    call.task.await.expect("call task");

    let utterances = call.speech.utterances();
    assert_eq!(utterances, vec![greeting(&call.registry)]);
    assert!(utterances[0].contains("press 1 for Billing"));
    assert!(call.endpoint.is_closed());
}

// ---------------------------------------------------------------------------
// Test: DTMF event → transfer submitted, endpoint closed at teardown
// ---------------------------------------------------------------------------
#[tokio::test(start_paused = true)]
async fn dtmf_event_executes_transfer() {
    let call = start_call();

    call.events
        .send(SessionEvent::Dtmf {
            digit: "2".to_string(),
            participant_identity: "caller-7".to_string(),
        })
        .await
        .expect("send dtmf");

    // Let the grace interval elapse before the call ends.
    tokio::time::sleep(GRACE + Duration::from_secs(1)).await;

    call.events
        .send(SessionEvent::Disconnected)
        .await
        .expect("send disconnect");
    call.task.await.expect("call task");

    let submissions = call.endpoint.submissions();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].transfer_to, "+15550000002");
    assert_eq!(submissions[0].room_name, "room-7");
    assert_eq!(submissions[0].participant_identity, "caller-7");
    assert!(call.endpoint.is_closed());
}

// ---------------------------------------------------------------------------
// Test: intent invocation replies with a confirmation string
// ---------------------------------------------------------------------------
#[tokio::test(start_paused = true)]
async fn intent_event_replies_with_confirmation() {
    let call = start_call();

    let (reply_tx, reply_rx) = oneshot::channel();
    call.events
        .send(SessionEvent::Intent {
            token: "billing".to_string(),
            reply: reply_tx,
        })
        .await
        .expect("send intent");

    let confirmation = reply_rx.await.expect("confirmation reply");
    assert_eq!(confirmation, "Transferring to Billing department.");

    call.events
        .send(SessionEvent::Disconnected)
        .await
        .expect("send disconnect");
    call.task.await.expect("call task");

    let submissions = call.endpoint.submissions();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].transfer_to, "+15550000001");
}

// ---------------------------------------------------------------------------
// Test: disconnect during the grace wait → no submission, endpoint closed
// ---------------------------------------------------------------------------
#[tokio::test(start_paused = true)]
async fn disconnect_during_grace_closes_without_submission() {
    let call = start_call();

    call.events
        .send(SessionEvent::Dtmf {
            digit: "2".to_string(),
            participant_identity: "caller-7".to_string(),
        })
        .await
        .expect("send dtmf");

    tokio::time::sleep(Duration::from_secs(1)).await;

    call.events
        .send(SessionEvent::Disconnected)
        .await
        .expect("send disconnect");
    call.task.await.expect("call task");

    assert!(
        call.endpoint.submissions().is_empty(),
        "no transfer may be submitted once the call has disconnected"
    );
    assert!(call.endpoint.is_closed());
}

// ---------------------------------------------------------------------------
// Test: the event source closing behaves like a disconnect
// ---------------------------------------------------------------------------
#[tokio::test(start_paused = true)]
async fn closed_event_source_tears_down() {
    let call = start_call();

    drop(call.events);
    call.task.await.expect("call task");

    assert!(call.endpoint.is_closed());
}
