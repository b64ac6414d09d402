//! Fire-and-forget motivational messages for tracker mutations.
//!
//! Each dispatch takes the next sequence number. A reply is published only if
//! no newer dispatch has started since, so a slow reply cannot overwrite the
//! message for a later action.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;

use crate::services::assistant::{Assistant, MotivationMessage};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    PageLoad,
    MedicationTaken,
    StatusSaved,
    MoodLogged,
    MoodCleared,
}

impl EventKind {
    pub fn tag(self) -> &'static str {
        match self {
            EventKind::PageLoad => "PAGE_LOAD",
            EventKind::MedicationTaken => "MEDICATION_TAKEN",
            EventKind::StatusSaved => "STATUS_SAVED",
            EventKind::MoodLogged => "MOOD_LOGGED",
            EventKind::MoodCleared => "MOOD_CLEARED",
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MotivatorEvent {
    pub kind: EventKind,
    pub context: String,
}

impl MotivatorEvent {
    pub fn new(kind: EventKind, context: impl Into<String>) -> Self {
        Self {
            kind,
            context: context.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MotivatorState {
    /// True while the latest dispatch is awaiting its reply
    pub pending: bool,
    pub seq: u64,
    pub message: Option<MotivationMessage>,
}

#[derive(Clone)]
pub struct Motivator {
    assistant: Assistant,
    next_seq: Arc<AtomicU64>,
    state: Arc<RwLock<MotivatorState>>,
    ws_tx: Option<broadcast::Sender<String>>,
}

impl Motivator {
    pub fn new(assistant: Assistant, ws_tx: Option<broadcast::Sender<String>>) -> Self {
        Self {
            assistant,
            next_seq: Arc::new(AtomicU64::new(0)),
            state: Arc::new(RwLock::new(MotivatorState::default())),
            ws_tx,
        }
    }

    pub async fn snapshot(&self) -> MotivatorState {
        self.state.read().await.clone()
    }

    pub fn latest_seq(&self) -> u64 {
        self.next_seq.load(Ordering::SeqCst)
    }

    /// Starts a request for `event` and returns without waiting for it. The
    /// handle is only useful to tests; callers normally drop it.
    pub async fn notify(&self, event: MotivatorEvent) -> JoinHandle<()> {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut state = self.state.write().await;
            state.pending = true;
            // An overlapping dispatch may already have stored a later number
            state.seq = state.seq.max(seq);
        }
        tracing::debug!(seq, event = event.kind.tag(), "Dispatching motivational message");

        let this = self.clone();
        tokio::spawn(async move {
            let message = this
                .assistant
                .motivate(event.kind.tag(), Some(event.context.as_str()))
                .await;
            this.publish(seq, message).await;
        })
    }

    /// Stores and broadcasts `message` if `seq` is still the latest dispatch.
    /// Returns false when the reply was stale and dropped.
    pub async fn publish(&self, seq: u64, message: MotivationMessage) -> bool {
        if seq != self.latest_seq() {
            tracing::debug!(seq, latest = self.latest_seq(), "Discarding stale motivational message");
            return false;
        }

        let mut state = self.state.write().await;
        // A newer dispatch may have started while waiting for the lock
        if seq != self.latest_seq() {
            return false;
        }
        state.pending = false;
        state.seq = seq;
        state.message = Some(message.clone());
        drop(state);

        if let Some(tx) = self.ws_tx.as_ref() {
            let payload = serde_json::json!({
                "type": "motivation",
                "seq": seq,
                "message": message.message,
                "emoji": message.emoji,
            });
            let _ = tx.send(payload.to_string());
        }
        true
    }
}
