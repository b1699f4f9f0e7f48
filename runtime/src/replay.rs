use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use provenance_core::{PromptOptions, SessionError, SessionEvent};
use serde::{Deserialize, Serialize};

use crate::bus::EventBus;
use crate::session::{AgentSession, Subscription};

/// A recorded provider response: the events it streamed and, optionally,
/// the failure it ended with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    #[serde(default)]
    pub events: Vec<SessionEvent>,
    /// Provider failure reported after all events were streamed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl Transcript {
    pub fn new(events: Vec<SessionEvent>) -> Self {
        Self {
            events,
            failure: None,
        }
    }

    pub fn failing(events: Vec<SessionEvent>, message: impl Into<String>) -> Self {
        Self {
            events,
            failure: Some(message.into()),
        }
    }

    /// Accepts either `{"events": [...], "failure": "..."}` or a bare array
    /// of events.
    pub fn from_json(raw: &str) -> Result<Self, SessionError> {
        let parsed = if raw.trim_start().starts_with('[') {
            serde_json::from_str::<Vec<SessionEvent>>(raw).map(Self::new)
        } else {
            serde_json::from_str::<Self>(raw)
        };
        parsed.map_err(|e| SessionError::Transcript(e.to_string()))
    }

    pub fn from_path(path: &Path) -> Result<Self, SessionError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| SessionError::Transcript(format!("{}: {e}", path.display())))?;
        Self::from_json(&raw)
    }
}

/// Deterministic session that streams a recorded transcript on every prompt.
#[derive(Debug, Default)]
pub struct ScriptedSession {
    bus: EventBus,
    transcript: Transcript,
    disposed: AtomicBool,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedSession {
    pub fn new(transcript: Transcript) -> Self {
        Self {
            transcript,
            ..Self::default()
        }
    }

    /// Handle to the session's event fan-out, e.g. to emit out-of-turn events.
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    /// Prompts received so far, in order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn ensure_live(&self) -> Result<(), SessionError> {
        if self.is_disposed() {
            return Err(SessionError::Disposed);
        }
        Ok(())
    }
}

#[async_trait]
impl AgentSession for ScriptedSession {
    fn subscribe(&self) -> Result<Subscription, SessionError> {
        self.ensure_live()?;
        Ok(self.bus.subscribe())
    }

    async fn prompt(&self, text: &str, options: &PromptOptions) -> Result<(), SessionError> {
        self.ensure_live()?;
        self.prompts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(text.to_string());
        tracing::debug!(
            attachments = options.attachments.len(),
            events = self.transcript.events.len(),
            "replaying transcript"
        );

        for event in &self.transcript.events {
            self.bus.emit(event);
            // Let the subscriber run between events as it would against a
            // live provider stream.
            tokio::task::yield_now().await;
        }

        match &self.transcript.failure {
            Some(message) => Err(SessionError::provider(message.clone())),
            None => Ok(()),
        }
    }

    fn dispose(&self) {
        if !self.disposed.swap(true, Ordering::SeqCst) {
            self.bus.close_all();
        }
    }
}
