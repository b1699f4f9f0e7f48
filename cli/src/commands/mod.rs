pub mod replay;
pub mod verify;

use clap::Args;
use provenance_runtime::NativeSourcePolicy;

/// Policy knobs shared by every command that verifies a turn.
///
/// Flags layer over the policy read from the environment
/// (PROVENANCE_UNAVAILABLE_SENTINEL, PROVENANCE_EXTRA_FALLBACK_PHRASES).
#[derive(Args, Clone, Debug, Default)]
pub struct PolicyArgs {
    /// Token a responder emits when the native capability is unavailable
    #[arg(long)]
    pub unavailable_sentinel: Option<String>,

    /// Extra fallback phrase to reject (repeatable or comma-separated)
    #[arg(long = "fallback-phrase", value_delimiter = ',')]
    pub fallback_phrases: Vec<String>,
}

impl PolicyArgs {
    pub fn to_policy(&self) -> NativeSourcePolicy {
        self.layer_over(NativeSourcePolicy::from_env())
    }

    fn layer_over(&self, mut policy: NativeSourcePolicy) -> NativeSourcePolicy {
        if let Some(sentinel) = &self.unavailable_sentinel {
            policy = policy.with_sentinel(sentinel);
        }
        policy.with_extra_phrases(&self.fallback_phrases)
    }
}
