//! Shared types for capturing an agent turn and judging its provenance.

pub mod error;
pub mod events;
pub mod turn;
pub mod verdict;

pub use error::{CaptureError, SessionError};
pub use events::{MediaAttachment, PromptOptions, SessionEvent};
pub use turn::{TurnAccumulator, TurnCapture};
pub use verdict::{PolicyVerdict, Rejection};
