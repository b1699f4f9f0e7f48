use std::sync::LazyLock;

use provenance_core::{PolicyVerdict, Rejection, TurnCapture};
use regex::Regex;
use url::Url;

use crate::config::{NativeSourcePolicy, normalize_phrase};

type PolicyCheck = fn(&NativeSourcePolicy, &TurnCapture) -> Option<Rejection>;

/// Checks run in this order and the first rejection wins. Structural
/// signals come before heuristic ones.
pub const POLICY_RULES: &[(&str, PolicyCheck)] = &[
    ("local_tools", check_local_tools),
    ("unavailable_sentinel", check_unavailable_sentinel),
    ("fallback_language", check_fallback_language),
    ("source_evidence", check_source_evidence),
];

static DEFAULT_POLICY: LazyLock<NativeSourcePolicy> = LazyLock::new(NativeSourcePolicy::default);

static URL_CANDIDATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bhttps?://[^\s<>"'`]+"#).expect("url candidate regex must compile")
});

/// Trailing characters that end a sentence or markup around a URL rather
/// than belong to it.
const URL_TRAILING_PUNCTUATION: [char; 11] =
    ['.', ',', ';', ':', '!', '?', ')', ']', '}', '*', '_'];

/// Verify a captured turn against the default native-source policy.
pub fn verify(capture: &TurnCapture) -> PolicyVerdict {
    verify_with(&DEFAULT_POLICY, capture)
}

/// Verify a captured turn against an explicit policy. Pure and deterministic.
pub fn verify_with(policy: &NativeSourcePolicy, capture: &TurnCapture) -> PolicyVerdict {
    for &(rule, check) in POLICY_RULES {
        if let Some(rejection) = check(policy, capture) {
            tracing::warn!(
                turn_id = %capture.turn_id(),
                rule,
                code = rejection.code(),
                "turn rejected by native-source policy"
            );
            return PolicyVerdict::Rejected(rejection);
        }
    }

    tracing::debug!(turn_id = %capture.turn_id(), "turn accepted by native-source policy");
    PolicyVerdict::Accepted {
        text: capture.text().to_string(),
    }
}

/// Well-formed http(s) URLs cited in `text`, in order of appearance.
pub fn cited_sources(text: &str) -> Vec<Url> {
    URL_CANDIDATE_RE
        .find_iter(text)
        .filter_map(|candidate| parse_source(candidate.as_str()))
        .collect()
}

fn parse_source(candidate: &str) -> Option<Url> {
    let trimmed = candidate.trim_end_matches(URL_TRAILING_PUNCTUATION);
    let url = Url::parse(trimmed).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    url.host_str().filter(|host| !host.is_empty())?;
    Some(url)
}

fn check_local_tools(_policy: &NativeSourcePolicy, capture: &TurnCapture) -> Option<Rejection> {
    if capture.used_capabilities().is_empty() {
        return None;
    }
    Some(Rejection::LocalToolsUsed {
        tools: capture.used_capabilities().iter().cloned().collect(),
    })
}

fn check_unavailable_sentinel(
    policy: &NativeSourcePolicy,
    capture: &TurnCapture,
) -> Option<Rejection> {
    let sentinel = policy.unavailable_sentinel.as_str();
    if sentinel.is_empty() || !capture.text().contains(sentinel) {
        return None;
    }
    Some(Rejection::CapabilityReportedUnavailable {
        sentinel: sentinel.to_string(),
    })
}

fn check_fallback_language(
    policy: &NativeSourcePolicy,
    capture: &TurnCapture,
) -> Option<Rejection> {
    let haystack = normalize_phrase(capture.text());
    policy
        .fallback_phrases
        .iter()
        .map(|phrase| normalize_phrase(phrase))
        .find(|phrase| !phrase.is_empty() && haystack.contains(phrase.as_str()))
        .map(|phrase| Rejection::FallbackLanguageDetected { phrase })
}

fn check_source_evidence(_policy: &NativeSourcePolicy, capture: &TurnCapture) -> Option<Rejection> {
    let cited = URL_CANDIDATE_RE
        .find_iter(capture.text())
        .any(|candidate| parse_source(candidate.as_str()).is_some());
    (!cited).then_some(Rejection::NoSourcesCited)
}
