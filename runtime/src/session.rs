use async_trait::async_trait;
use provenance_core::{PromptOptions, SessionError, SessionEvent};
use tokio::sync::mpsc;

/// A conversational agent session that streams events while answering.
///
/// The session is owned by the caller and outlives individual turns; turn
/// capture subscribes and prompts but never disposes it.
#[async_trait]
pub trait AgentSession: Send + Sync {
    /// Attach a new event subscriber. Fails with `SessionError::Disposed`
    /// once the session has been disposed.
    fn subscribe(&self) -> Result<Subscription, SessionError>;

    /// Send a prompt and resolve once the response has settled.
    async fn prompt(&self, text: &str, options: &PromptOptions) -> Result<(), SessionError>;

    fn dispose(&self);
}

type DetachFn = Box<dyn FnOnce() + Send + 'static>;

/// Scoped event subscription. Dropping it detaches the subscriber.
///
/// Detachment runs exactly once, whichever of `detach`, `close` or `Drop`
/// gets there first.
pub struct Subscription {
    receiver: mpsc::UnboundedReceiver<SessionEvent>,
    detach: Option<DetachFn>,
}

impl Subscription {
    pub fn new(
        receiver: mpsc::UnboundedReceiver<SessionEvent>,
        detach: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            receiver,
            detach: Some(Box::new(detach)),
        }
    }

    /// Next delivered event, or `None` once the sender side is gone.
    pub async fn recv(&mut self) -> Option<SessionEvent> {
        self.receiver.recv().await
    }

    pub fn is_attached(&self) -> bool {
        self.detach.is_some()
    }

    pub fn detach(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }

    /// Detach, then hand back events that were delivered before detaching
    /// but not yet received.
    pub fn close(mut self) -> Vec<SessionEvent> {
        self.detach();
        let mut pending = Vec::new();
        while let Ok(event) = self.receiver.try_recv() {
            pending.push(event);
        }
        pending
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("attached", &self.is_attached())
            .finish()
    }
}
