//! Turn capture over agent session event streams, and verification of the
//! captured turn against the native-source policy.
//!
//! A turn is captured with [`capture`], which subscribes to the session for
//! exactly the duration of one prompt. Policy-sensitive turns are then passed
//! to [`verify`] (or [`verify_with`] for a custom [`NativeSourcePolicy`]).

pub mod bus;
pub mod capture;
pub mod config;
pub mod policy;
pub mod replay;
pub mod session;

pub use bus::EventBus;
pub use capture::{capture, run_policy_turn};
pub use config::NativeSourcePolicy;
pub use policy::{cited_sources, verify, verify_with};
pub use replay::{ScriptedSession, Transcript};
pub use session::{AgentSession, Subscription};
