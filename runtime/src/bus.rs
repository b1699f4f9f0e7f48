use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use provenance_core::SessionEvent;
use tokio::sync::mpsc;

use crate::session::Subscription;

#[derive(Debug, Default)]
struct Subscribers {
    next_id: u64,
    senders: BTreeMap<u64, mpsc::UnboundedSender<SessionEvent>>,
}

/// Fan-out of session events to the currently attached subscribers.
///
/// Session implementations embed one of these and emit into it while a
/// prompt is running.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    inner: Arc<Mutex<Subscribers>>,
}

fn lock(inner: &Mutex<Subscribers>) -> MutexGuard<'_, Subscribers> {
    inner.lock().unwrap_or_else(|e| e.into_inner())
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = {
            let mut subscribers = lock(&self.inner);
            let id = subscribers.next_id;
            subscribers.next_id += 1;
            subscribers.senders.insert(id, tx);
            id
        };

        // Weak so a forgotten subscription never keeps the bus alive.
        let bus = Arc::downgrade(&self.inner);
        Subscription::new(rx, move || {
            if let Some(inner) = bus.upgrade() {
                lock(&inner).senders.remove(&id);
            }
        })
    }

    /// Deliver an event to every attached subscriber. Returns how many
    /// received it.
    pub fn emit(&self, event: &SessionEvent) -> usize {
        let mut subscribers = lock(&self.inner);
        subscribers
            .senders
            .retain(|_, sender| sender.send(event.clone()).is_ok());
        subscribers.senders.len()
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.inner).senders.len()
    }

    /// Drop every subscriber; their receivers observe end-of-stream.
    pub fn close_all(&self) {
        lock(&self.inner).senders.clear();
    }
}
