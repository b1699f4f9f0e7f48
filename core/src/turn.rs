use std::collections::BTreeSet;

use serde::Serialize;
use uuid::Uuid;

use crate::events::SessionEvent;

/// Finalized result of one captured turn. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnCapture {
    turn_id: Uuid,
    text: String,
    used_capabilities: BTreeSet<String>,
    event_count: usize,
}

impl TurnCapture {
    /// Builds a capture directly, e.g. for verifying text produced elsewhere.
    /// The text is trimmed the same way a finalized turn is.
    pub fn new<I, S>(text: &str, used_capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            turn_id: Uuid::now_v7(),
            text: text.trim().to_string(),
            used_capabilities: used_capabilities.into_iter().map(Into::into).collect(),
            event_count: 0,
        }
    }

    pub fn turn_id(&self) -> Uuid {
        self.turn_id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn used_capabilities(&self) -> &BTreeSet<String> {
        &self.used_capabilities
    }

    /// Number of events applied during the turn, ignored kinds included
    pub fn event_count(&self) -> usize {
        self.event_count
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

/// Mutable state of one in-flight turn.
///
/// Owned exclusively by the capture call for that turn and never shared
/// across turns.
#[derive(Debug)]
pub struct TurnAccumulator {
    turn_id: Uuid,
    buffer: String,
    used_capabilities: BTreeSet<String>,
    event_count: usize,
}

impl TurnAccumulator {
    pub fn new(turn_id: Uuid) -> Self {
        Self {
            turn_id,
            buffer: String::new(),
            used_capabilities: BTreeSet::new(),
            event_count: 0,
        }
    }

    pub fn turn_id(&self) -> Uuid {
        self.turn_id
    }

    /// Applies one event. Returns `true` if it changed the accumulated state.
    pub fn apply(&mut self, event: &SessionEvent) -> bool {
        self.event_count += 1;
        match event {
            SessionEvent::TextDelta { delta } => {
                self.buffer.push_str(delta);
                !delta.is_empty()
            }
            SessionEvent::ToolExecutionStart { tool_name } => {
                self.used_capabilities.insert(tool_name.clone())
            }
            SessionEvent::Other => false,
        }
    }

    /// Untrimmed text accumulated so far
    pub fn pending_text(&self) -> &str {
        &self.buffer
    }

    pub fn finish(self) -> TurnCapture {
        TurnCapture {
            turn_id: self.turn_id,
            text: self.buffer.trim().to_string(),
            used_capabilities: self.used_capabilities,
            event_count: self.event_count,
        }
    }
}
