pub const DEFAULT_UNAVAILABLE_SENTINEL: &str = "NATIVE_WEB_SEARCH_UNAVAILABLE";
pub const UNAVAILABLE_SENTINEL_ENV: &str = "PROVENANCE_UNAVAILABLE_SENTINEL";
pub const EXTRA_FALLBACK_PHRASES_ENV: &str = "PROVENANCE_EXTRA_FALLBACK_PHRASES";

/// Phrases a responder uses when it answered without the native capability.
/// Matched case-insensitively as substrings. English only; paraphrased
/// disclaimers slip through.
pub const DEFAULT_FALLBACK_PHRASES: &[&str] = &[
    "don't have native",
    "do not have native",
    "no native web search",
    "without native web search",
    "native web search is not available",
    "native web search isn't available",
    "native search is unavailable",
    "don't have access to the internet",
    "do not have access to the internet",
    "can't access the internet",
    "cannot access the internet",
    "unable to browse",
    "using curl",
    "using wget",
    "using bash",
    "via the shell",
    "shell command",
    "command-line tool",
    "command line tool",
];

/// The native-source policy: what counts as a disclaimer of native access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeSourcePolicy {
    /// Exact, case-sensitive token a responder emits when the native
    /// capability is unavailable
    pub unavailable_sentinel: String,
    /// Lowercase phrases checked in order; the first hit is reported
    pub fallback_phrases: Vec<String>,
}

impl Default for NativeSourcePolicy {
    fn default() -> Self {
        Self {
            unavailable_sentinel: DEFAULT_UNAVAILABLE_SENTINEL.to_string(),
            fallback_phrases: DEFAULT_FALLBACK_PHRASES
                .iter()
                .map(|phrase| (*phrase).to_string())
                .collect(),
        }
    }
}

impl NativeSourcePolicy {
    /// Defaults, adjusted by `PROVENANCE_UNAVAILABLE_SENTINEL` and
    /// `PROVENANCE_EXTRA_FALLBACK_PHRASES` (comma-separated).
    pub fn from_env() -> Self {
        Self::from_raw(
            std::env::var(UNAVAILABLE_SENTINEL_ENV).ok(),
            std::env::var(EXTRA_FALLBACK_PHRASES_ENV).ok(),
        )
    }

    fn from_raw(sentinel: Option<String>, extra_phrases: Option<String>) -> Self {
        let mut policy = Self::default();
        if let Some(sentinel) = sentinel {
            policy = policy.with_sentinel(&sentinel);
        }
        if let Some(raw) = extra_phrases {
            policy = policy.with_extra_phrases(raw.split(','));
        }
        policy
    }

    /// Blank sentinels are ignored.
    pub fn with_sentinel(mut self, sentinel: &str) -> Self {
        let sentinel = sentinel.trim();
        if !sentinel.is_empty() {
            self.unavailable_sentinel = sentinel.to_string();
        }
        self
    }

    pub fn with_extra_phrases<I, S>(mut self, phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for phrase in phrases {
            let normalized = normalize_phrase(phrase.as_ref());
            if !normalized.is_empty() && !self.fallback_phrases.contains(&normalized) {
                self.fallback_phrases.push(normalized);
            }
        }
        self
    }
}

/// Lowercase and fold typographic apostrophes so "don’t" matches "don't".
pub(crate) fn normalize_phrase(raw: &str) -> String {
    raw.trim().to_lowercase().replace('\u{2019}', "'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_env_values_override_sentinel_and_append_phrases() {
        let policy = NativeSourcePolicy::from_raw(
            Some("  NO_SEARCH  ".to_string()),
            Some("Via Terminal, , used python ".to_string()),
        );
        assert_eq!(policy.unavailable_sentinel, "NO_SEARCH");
        let tail = &policy.fallback_phrases[DEFAULT_FALLBACK_PHRASES.len()..];
        assert_eq!(tail, ["via terminal", "used python"]);
    }

    #[test]
    fn from_env_reads_the_documented_variables() {
        let expected = NativeSourcePolicy::from_raw(
            std::env::var(UNAVAILABLE_SENTINEL_ENV).ok(),
            std::env::var(EXTRA_FALLBACK_PHRASES_ENV).ok(),
        );
        assert_eq!(NativeSourcePolicy::from_env(), expected);
    }

    #[test]
    fn blank_or_missing_env_values_keep_defaults() {
        assert_eq!(
            NativeSourcePolicy::from_raw(Some("   ".to_string()), Some(",,".to_string())),
            NativeSourcePolicy::default()
        );
        assert_eq!(
            NativeSourcePolicy::from_raw(None, None),
            NativeSourcePolicy::default()
        );
    }

    #[test]
    fn duplicate_extra_phrases_are_not_added_twice() {
        let policy = NativeSourcePolicy::default().with_extra_phrases(["USING CURL", "using curl"]);
        assert_eq!(policy.fallback_phrases.len(), DEFAULT_FALLBACK_PHRASES.len());
    }

    #[test]
    fn typographic_apostrophes_are_folded() {
        assert_eq!(normalize_phrase("Don\u{2019}t Have Native"), "don't have native");
    }
}
