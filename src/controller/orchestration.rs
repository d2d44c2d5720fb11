use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::events::{Notice, Pose, PresentationEvent};
use crate::client::{
    ClassificationResult, RequestClient, RequestError, RequestKind, RequestPayload, ResponseBody,
};
use crate::mapper::{AnimationCommand, ResponseMapper};
use crate::session::{ChatTurn, SessionConfig, SessionState, SessionStats, Speaker, Transcript};
use crate::signal::Signal;

/// Token identifying one issued request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRequest {
    pub id: u64,
    pub kind: RequestKind,
}

/// How a diagnose request ended
#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosisOutcome {
    /// Result mapped and sent to the presentation layer
    Applied(AnimationCommand),
    /// Request failed, a notice was shown
    Failed(RequestError),
    /// A newer request or a reset replaced this one; nothing was applied
    Superseded,
}

/// How a chat message ended; each variant carries the appended agent turn
#[derive(Debug, Clone, PartialEq)]
pub enum ChatOutcome {
    Replied(ChatTurn),
    Failed { error: RequestError, apology: ChatTurn },
}

/// Mutable session data, only touched under the controller lock
#[derive(Debug, Default)]
struct ControllerState {
    state: SessionState,
    pose: Option<Pose>,
    live_classify: Option<PendingRequest>,
    last_diagnosis: Option<ClassificationResult>,
    transcript: Transcript,
    diagnoses_requested: usize,
    diagnoses_applied: usize,
    diagnoses_failed: usize,
    diagnoses_superseded: usize,
    chat_messages_sent: usize,
    chat_messages_failed: usize,
}

struct Shared {
    config: SessionConfig,
    client: Arc<dyn RequestClient>,
    mapper: ResponseMapper,
    started_at: DateTime<Utc>,
    next_request_id: AtomicU64,
    inner: Mutex<ControllerState>,
    events: mpsc::Sender<PresentationEvent>,
}

/// Coordinates placement, diagnosis and chat for one session
///
/// Intents return as soon as their request is issued. Each request resolves
/// on its own task; the returned handle can be awaited for the outcome, but
/// the session is updated whether or not anyone awaits it.
#[derive(Clone)]
pub struct OrchestrationController {
    shared: Arc<Shared>,
}

impl OrchestrationController {
    /// Create a controller and the receiver for its presentation events
    pub fn new(
        config: SessionConfig,
        client: Arc<dyn RequestClient>,
        mapper: ResponseMapper,
    ) -> (Self, mpsc::Receiver<PresentationEvent>) {
        info!("Creating session: {}", config.session_id);

        let (events, events_rx) = mpsc::channel(config.event_buffer.max(1));
        let shared = Shared {
            config,
            client,
            mapper,
            started_at: Utc::now(),
            next_request_id: AtomicU64::new(1),
            inner: Mutex::new(ControllerState::default()),
            events,
        };

        (
            Self {
                shared: Arc::new(shared),
            },
            events_rx,
        )
    }

    pub fn config(&self) -> &SessionConfig {
        &self.shared.config
    }

    /// Host detected a placement; only the first one is honored
    pub async fn on_object_placement_detected(&self, pose: Pose) -> bool {
        let mut inner = self.shared.inner.lock().await;

        if let Err(e) = inner.state.place_object() {
            debug!("Ignoring placement: {}", e);
            return false;
        }

        info!("Object placed at {:?}", pose.position);
        inner.pose = Some(pose);
        self.shared.emit(PresentationEvent::RevealAffordances);
        true
    }

    /// Start classifying `signal`; `None` if diagnosis is not allowed now
    ///
    /// The signal is fitted to the configured length before it is sent.
    pub async fn on_diagnose_requested(
        &self,
        signal: Signal,
    ) -> Option<JoinHandle<DiagnosisOutcome>> {
        let signal_length = self.shared.config.signal_length;
        let signal = match signal.fit_to(signal_length) {
            Ok(signal) => signal,
            Err(e) => {
                warn!(
                    "Ignoring diagnose request, cannot fit signal to {}: {}",
                    signal_length, e
                );
                return None;
            }
        };

        let pending = {
            let mut inner = self.shared.inner.lock().await;

            if let Err(e) = inner.state.request_diagnosis() {
                debug!("Ignoring diagnose request: {}", e);
                return None;
            }

            let pending = self.shared.issue(RequestKind::Classify);
            if let Some(previous) = inner.live_classify.replace(pending) {
                info!("Diagnosis request {} supersedes {}", pending.id, previous.id);
            }
            inner.diagnoses_requested += 1;
            pending
        };

        info!(
            "Diagnosis request {} issued ({} samples)",
            pending.id,
            signal.len()
        );

        let shared = Arc::clone(&self.shared);
        Some(tokio::spawn(async move {
            let result = shared.send(RequestPayload::Classify(signal)).await;
            shared.resolve_diagnosis(pending, result).await
        }))
    }

    /// Send a chat message; `None` if `text` is blank
    ///
    /// The user turn is in the transcript before this returns.
    pub async fn on_chat_submitted(&self, text: &str) -> Option<JoinHandle<ChatOutcome>> {
        let message = text.trim();
        let Some(turn) = ChatTurn::new(Speaker::User, message) else {
            debug!("Ignoring blank chat message");
            return None;
        };

        let pending = self.shared.issue(RequestKind::Chat);
        {
            let mut inner = self.shared.inner.lock().await;
            inner.transcript.append(turn.clone());
            inner.chat_messages_sent += 1;
            self.shared.emit(PresentationEvent::TranscriptAppended(turn));
        }

        info!("Chat request {} issued", pending.id);

        let shared = Arc::clone(&self.shared);
        let message = message.to_string();
        Some(tokio::spawn(async move {
            let result = shared.send(RequestPayload::Chat(message)).await;
            shared.resolve_chat(pending, result).await
        }))
    }

    /// Return to `Empty`; an in-flight diagnosis will be discarded
    pub async fn on_reset(&self) {
        let mut inner = self.shared.inner.lock().await;

        if let Some(pending) = inner.live_classify.take() {
            info!("Reset invalidates diagnosis request {}", pending.id);
        }
        inner.state.reset();
        inner.pose = None;
        inner.last_diagnosis = None;

        info!("Session reset: {}", self.shared.config.session_id);
        self.shared.emit(PresentationEvent::SessionReset);
    }

    pub async fn state(&self) -> SessionState {
        self.shared.inner.lock().await.state
    }

    pub async fn pose(&self) -> Option<Pose> {
        self.shared.inner.lock().await.pose
    }

    pub async fn last_diagnosis(&self) -> Option<ClassificationResult> {
        self.shared.inner.lock().await.last_diagnosis.clone()
    }

    pub async fn transcript(&self) -> Vec<ChatTurn> {
        self.shared.inner.lock().await.transcript.turns().to_vec()
    }

    pub async fn stats(&self) -> SessionStats {
        let inner = self.shared.inner.lock().await;

        SessionStats {
            session_id: self.shared.config.session_id.clone(),
            started_at: self.shared.started_at,
            state: inner.state,
            diagnoses_requested: inner.diagnoses_requested,
            diagnoses_applied: inner.diagnoses_applied,
            diagnoses_failed: inner.diagnoses_failed,
            diagnoses_superseded: inner.diagnoses_superseded,
            chat_messages_sent: inner.chat_messages_sent,
            chat_messages_failed: inner.chat_messages_failed,
            transcript_len: inner.transcript.len(),
        }
    }
}

impl Shared {
    fn issue(&self, kind: RequestKind) -> PendingRequest {
        PendingRequest {
            id: self.next_request_id.fetch_add(1, Ordering::SeqCst),
            kind,
        }
    }

    /// Never waits: the session state stays authoritative when a host lags
    fn emit(&self, event: PresentationEvent) {
        match self.events.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(event)) => {
                warn!("Presentation queue full, dropping {:?}", event);
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!("Presentation receiver dropped, event discarded");
            }
        }
    }

    /// One bounded request; expiry is a transport failure
    async fn send(&self, payload: RequestPayload) -> Result<ResponseBody, RequestError> {
        let timeout = self.config.request_timeout;
        let kind = payload.kind();

        match tokio::time::timeout(timeout, self.client.send(payload)).await {
            Ok(result) => result,
            Err(_) => Err(RequestError::Transport(format!(
                "{:?} request timed out after {:?}",
                kind, timeout
            ))),
        }
    }

    async fn resolve_diagnosis(
        &self,
        pending: PendingRequest,
        result: Result<ResponseBody, RequestError>,
    ) -> DiagnosisOutcome {
        let mut inner = self.inner.lock().await;

        if inner.live_classify != Some(pending) {
            info!("Discarding superseded diagnosis request {}", pending.id);
            inner.diagnoses_superseded += 1;
            return DiagnosisOutcome::Superseded;
        }
        inner.live_classify = None;

        let result = result.and_then(|body| match body {
            ResponseBody::Classification(classification) => Ok(classification),
            other => Err(RequestError::Decode(format!(
                "expected classification, got {:?}",
                other
            ))),
        });

        if let Err(e) = inner.state.diagnosis_resolved(result.is_ok()) {
            warn!("Diagnosis {} resolved out of order: {}", pending.id, e);
        }

        match result {
            Ok(classification) => {
                let command = self.mapper.map_diagnosis(&classification);
                info!(
                    "Diagnosis {} applied: {} -> {:?}",
                    pending.id, classification.label, command.clip
                );

                inner.diagnoses_applied += 1;
                inner.last_diagnosis = Some(classification.clone());
                self.emit(PresentationEvent::DiagnosisAvailable(classification));
                self.emit(PresentationEvent::Animate(command.clone()));
                DiagnosisOutcome::Applied(command)
            }
            Err(e) => {
                error!("Diagnosis request {} failed: {}", pending.id, e);
                inner.diagnoses_failed += 1;

                if let Some(command) = self.mapper.map_diagnosis_failure() {
                    self.emit(PresentationEvent::Animate(command));
                }
                if let Some(notice) = Notice::from_error(&e) {
                    self.emit(PresentationEvent::Notice(notice));
                }
                DiagnosisOutcome::Failed(e)
            }
        }
    }

    async fn resolve_chat(
        &self,
        pending: PendingRequest,
        result: Result<ResponseBody, RequestError>,
    ) -> ChatOutcome {
        let reply = result.and_then(|body| match body {
            ResponseBody::ChatReply(reply) => ChatTurn::new(Speaker::Agent, reply)
                .ok_or_else(|| RequestError::Decode("empty chat reply".to_string())),
            other => Err(RequestError::Decode(format!(
                "expected chat reply, got {:?}",
                other
            ))),
        });

        let mut inner = self.inner.lock().await;

        let outcome = match reply {
            Ok(turn) => {
                debug!("Chat request {} answered", pending.id);
                ChatOutcome::Replied(turn)
            }
            Err(error) => {
                error!("Chat request {} failed: {}", pending.id, error);
                inner.chat_messages_failed += 1;
                ChatOutcome::Failed {
                    error,
                    apology: self.mapper.map_chat_failure(),
                }
            }
        };

        let turn = match &outcome {
            ChatOutcome::Replied(turn) => turn.clone(),
            ChatOutcome::Failed { apology, .. } => apology.clone(),
        };
        inner.transcript.append(turn.clone());
        self.emit(PresentationEvent::TranscriptAppended(turn));

        outcome
    }
}
