use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

use crate::error::codes;

/// Why a turn failed the native-source policy.
///
/// Rejections are expected outcomes, not defects. Each carries enough
/// context to diagnose the turn without re-running it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("local tools were used instead of the native capability: {}", .tools.join(", "))]
    LocalToolsUsed { tools: Vec<String> },
    #[error("the response reported the native capability as unavailable ({sentinel})")]
    CapabilityReportedUnavailable { sentinel: String },
    #[error("the response contains fallback language: \"{phrase}\"")]
    FallbackLanguageDetected { phrase: String },
    #[error("the response cites no http(s) sources")]
    NoSourcesCited,
}

impl Rejection {
    /// Machine-readable rejection code (e.g. "local_tools_used")
    pub fn code(&self) -> &'static str {
        match self {
            Self::LocalToolsUsed { .. } => codes::LOCAL_TOOLS_USED,
            Self::CapabilityReportedUnavailable { .. } => codes::CAPABILITY_REPORTED_UNAVAILABLE,
            Self::FallbackLanguageDetected { .. } => codes::FALLBACK_LANGUAGE_DETECTED,
            Self::NoSourcesCited => codes::NO_SOURCES_CITED,
        }
    }

    /// Hint about what a compliant turn looks like
    pub fn docs_hint(&self) -> &'static str {
        match self {
            Self::LocalToolsUsed { .. } => {
                "Disable local tools for this turn so only the provider's native capability can run."
            }
            Self::CapabilityReportedUnavailable { .. } => {
                "Use a model/provider combination that exposes the native capability."
            }
            Self::FallbackLanguageDetected { .. } => {
                "The responder disclaimed native access; treat the answer as unverified and re-run the turn."
            }
            Self::NoSourcesCited => "Ask for an answer that cites at least one http(s) source URL.",
        }
    }

    fn context(&self) -> Option<(&'static str, Value)> {
        match self {
            Self::LocalToolsUsed { tools } => Some(("tools", json!(tools))),
            Self::CapabilityReportedUnavailable { sentinel } => {
                Some(("sentinel", json!(sentinel)))
            }
            Self::FallbackLanguageDetected { phrase } => Some(("phrase", json!(phrase))),
            Self::NoSourcesCited => None,
        }
    }
}

/// Accept/reject decision for one captured turn. There is no partial state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyVerdict {
    Accepted { text: String },
    Rejected(Rejection),
}

impl PolicyVerdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Rejected(rejection) => Some(rejection),
            Self::Accepted { .. } => None,
        }
    }

    /// Structured form of the verdict, designed for agents as much as humans.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Accepted { text } => json!({
                "status": "accepted",
                "text": text,
            }),
            Self::Rejected(rejection) => {
                let mut payload = json!({
                    "status": "rejected",
                    "error": rejection.code(),
                    "message": rejection.to_string(),
                    "docs_hint": rejection.docs_hint(),
                });
                if let Some((key, value)) = rejection.context() {
                    payload[key] = value;
                }
                payload
            }
        }
    }
}

impl Serialize for PolicyVerdict {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_verdict_carries_code_message_and_context() {
        let verdict = PolicyVerdict::Rejected(Rejection::LocalToolsUsed {
            tools: vec!["bash".to_string(), "read".to_string()],
        });
        let value = verdict.to_value();
        assert_eq!(value["status"], "rejected");
        assert_eq!(value["error"], "local_tools_used");
        assert_eq!(value["tools"], json!(["bash", "read"]));
        assert!(
            value["message"]
                .as_str()
                .unwrap()
                .contains("bash, read")
        );
    }

    #[test]
    fn no_sources_rejection_has_no_context_field() {
        let value = PolicyVerdict::Rejected(Rejection::NoSourcesCited).to_value();
        assert_eq!(value["error"], "no_sources_cited");
        assert_eq!(value.as_object().unwrap().len(), 4);
    }

    #[test]
    fn accepted_verdict_serializes_text() {
        let verdict = PolicyVerdict::Accepted {
            text: "ok https://a.example".to_string(),
        };
        assert!(verdict.is_accepted());
        assert!(verdict.rejection().is_none());
        assert_eq!(
            serde_json::to_value(&verdict).unwrap(),
            json!({ "status": "accepted", "text": "ok https://a.example" })
        );
    }
}
