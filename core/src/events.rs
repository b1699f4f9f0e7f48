use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single event emitted by an agent session while it produces a response.
///
/// event kinds beyond text fragments and tool starts exist (message
/// boundaries, usage, thinking deltas); they all deserialize to `Other`
/// and carry no meaning for a captured turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Incremental piece of the assistant's text
    TextDelta { delta: String },
    /// A tool (local or fallback capability) started executing
    ToolExecutionStart { tool_name: String },
    #[serde(other)]
    Other,
}

impl SessionEvent {
    pub fn text(delta: impl Into<String>) -> Self {
        Self::TextDelta {
            delta: delta.into(),
        }
    }

    pub fn tool_start(tool_name: impl Into<String>) -> Self {
        Self::ToolExecutionStart {
            tool_name: tool_name.into(),
        }
    }

    /// Stable name of the event kind, used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TextDelta { .. } => "text_delta",
            Self::ToolExecutionStart { .. } => "tool_execution_start",
            Self::Other => "other",
        }
    }
}

/// Media attached to a prompt. The payload is opaque to the core; loading
/// and MIME detection belong to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaAttachment {
    pub mime_type: String,
    /// Base64-encoded payload
    pub data: String,
}

/// Named options forwarded with a prompt. Absent or unrecognized options
/// have no effect on capture or verification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromptOptions {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<MediaAttachment>,
    /// Provider-specific options the core passes through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PromptOptions {
    pub fn with_attachment(mut self, attachment: MediaAttachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    pub fn with_option(mut self, name: impl Into<String>, value: Value) -> Self {
        self.extra.insert(name.into(), value);
        self
    }
}
