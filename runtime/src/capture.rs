use provenance_core::{
    CaptureError, PolicyVerdict, PromptOptions, SessionEvent, TurnAccumulator, TurnCapture,
};
use uuid::Uuid;

use crate::config::NativeSourcePolicy;
use crate::policy::verify_with;
use crate::session::AgentSession;

/// Run one prompt against `session` and capture what it streamed.
///
/// The event subscription lives exactly as long as this call: it is
/// detached once the prompt settles, and also when the returned future is
/// dropped before completion. On provider failure the partial turn is
/// discarded and the error is returned unchanged.
pub async fn capture<S>(
    session: &S,
    prompt: &str,
    options: &PromptOptions,
) -> Result<TurnCapture, CaptureError>
where
    S: AgentSession + ?Sized,
{
    let mut turn = TurnAccumulator::new(Uuid::now_v7());
    let turn_id = turn.turn_id();
    let mut subscription = session.subscribe()?;
    tracing::debug!(%turn_id, "subscribed to session events");

    let settled = {
        let prompt_future = session.prompt(prompt, options);
        tokio::pin!(prompt_future);
        loop {
            tokio::select! {
                biased;
                Some(event) = subscription.recv() => record(&mut turn, &event),
                result = &mut prompt_future => break result,
            }
        }
    };

    // Events already delivered when the prompt settled still belong to
    // this turn; anything later never reaches it.
    for event in subscription.close() {
        record(&mut turn, &event);
    }

    if let Err(err) = settled {
        tracing::error!(%turn_id, error = %err, "prompt failed; discarding partial turn");
        return Err(err.into());
    }

    let capture = turn.finish();
    tracing::info!(
        %turn_id,
        text_len = capture.text().len(),
        tools = capture.used_capabilities().len(),
        events = capture.event_count(),
        "turn captured"
    );
    Ok(capture)
}

/// Capture a policy-sensitive turn and verify it.
///
/// A rejected verdict is a hard stop for the turn; nothing here retries or
/// substitutes another answer.
pub async fn run_policy_turn<S>(
    session: &S,
    prompt: &str,
    options: &PromptOptions,
    policy: &NativeSourcePolicy,
) -> Result<PolicyVerdict, CaptureError>
where
    S: AgentSession + ?Sized,
{
    let capture = capture(session, prompt, options).await?;
    Ok(verify_with(policy, &capture))
}

fn record(turn: &mut TurnAccumulator, event: &SessionEvent) {
    let changed = turn.apply(event);
    match event {
        SessionEvent::ToolExecutionStart { tool_name } => {
            tracing::debug!(
                turn_id = %turn.turn_id(),
                tool = %tool_name,
                first_use = changed,
                "tool execution started"
            );
        }
        SessionEvent::Other => {
            tracing::trace!(turn_id = %turn.turn_id(), "ignoring session event");
        }
        SessionEvent::TextDelta { .. } => {}
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use provenance_core::{Rejection, SessionError};

    use super::*;
    use crate::bus::EventBus;
    use crate::replay::{ScriptedSession, Transcript};
    use crate::session::Subscription;

    /// Streams its events, then never settles.
    struct StallingSession {
        bus: EventBus,
        events: Vec<SessionEvent>,
    }

    #[async_trait]
    impl AgentSession for StallingSession {
        fn subscribe(&self) -> Result<Subscription, SessionError> {
            Ok(self.bus.subscribe())
        }

        async fn prompt(&self, _text: &str, _options: &PromptOptions) -> Result<(), SessionError> {
            for event in &self.events {
                self.bus.emit(event);
            }
            std::future::pending::<()>().await;
            Ok(())
        }

        fn dispose(&self) {}
    }

    fn scripted(events: Vec<SessionEvent>) -> ScriptedSession {
        ScriptedSession::new(Transcript::new(events))
    }

    async fn capture_default(session: &ScriptedSession) -> Result<TurnCapture, CaptureError> {
        capture(session, "What's the weather in NYC?", &PromptOptions::default()).await
    }

    #[tokio::test]
    async fn text_is_arrival_order_concatenation_trimmed() {
        let cases: Vec<Vec<&str>> = vec![
            vec!["Sunny"],
            vec!["  Sun", "ny, ", "72°F.  "],
            vec!["\n", "a", " ", "b", "\t"],
            vec!["", "x", ""],
            vec!["   "],
        ];
        for deltas in cases {
            let mut events = Vec::new();
            for (idx, delta) in deltas.iter().enumerate() {
                events.push(SessionEvent::text(*delta));
                if idx % 2 == 0 {
                    events.push(SessionEvent::tool_start("web_search"));
                }
                events.push(SessionEvent::Other);
            }

            let session = scripted(events);
            let captured = capture_default(&session).await.unwrap();
            assert_eq!(captured.text(), deltas.concat().trim(), "deltas: {deltas:?}");
        }
    }

    #[tokio::test]
    async fn repeated_tool_starts_are_tracked_once() {
        let session = scripted(vec![
            SessionEvent::tool_start("bash"),
            SessionEvent::text("checking"),
            SessionEvent::tool_start("bash"),
            SessionEvent::tool_start("bash"),
        ]);
        let captured = capture_default(&session).await.unwrap();
        assert_eq!(
            captured.used_capabilities().iter().collect::<Vec<_>>(),
            vec!["bash"]
        );
    }

    #[tokio::test]
    async fn no_events_yield_empty_capture() {
        let session = scripted(Vec::new());
        let captured = capture_default(&session).await.unwrap();
        assert_eq!(captured.text(), "");
        assert!(captured.used_capabilities().is_empty());
    }

    #[tokio::test]
    async fn subscription_is_released_after_success() {
        let session = scripted(vec![SessionEvent::text("Sunny")]);
        let captured = capture_default(&session).await.unwrap();
        assert_eq!(session.bus().subscriber_count(), 0);

        let delivered = session.bus().emit(&SessionEvent::text(" and windy"));
        assert_eq!(delivered, 0);
        assert_eq!(captured.text(), "Sunny");
    }

    #[tokio::test]
    async fn provider_failure_propagates_and_releases_subscription() {
        let session = ScriptedSession::new(Transcript::failing(
            vec![SessionEvent::text("Sunny, ")],
            "stream reset by provider",
        ));
        let err = capture_default(&session)
            .await
            .expect_err("provider failure should propagate");

        assert_eq!(
            err,
            CaptureError::Session(SessionError::provider("stream reset by provider"))
        );
        assert_eq!(session.bus().subscriber_count(), 0);
    }

    #[tokio::test]
    async fn disposed_session_fails_immediately() {
        let session = scripted(vec![SessionEvent::text("never")]);
        session.dispose();

        let err = capture_default(&session)
            .await
            .expect_err("disposed session must not be captured");
        assert_eq!(err, CaptureError::Session(SessionError::Disposed));
        assert_eq!(err.code(), "session_disposed");
    }

    #[tokio::test]
    async fn dropped_capture_future_releases_subscription() {
        let session = StallingSession {
            bus: EventBus::new(),
            events: vec![SessionEvent::text("partial")],
        };

        let outcome = tokio::time::timeout(
            Duration::from_millis(50),
            capture(&session, "weather?", &PromptOptions::default()),
        )
        .await;

        assert!(outcome.is_err(), "stalled prompt should time out");
        assert_eq!(session.bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn consecutive_turns_do_not_share_state() {
        let session = scripted(vec![
            SessionEvent::text("Rain. https://weather.example/sea"),
            SessionEvent::tool_start("web_fetch"),
        ]);
        let first = capture_default(&session).await.unwrap();
        let second = capture_default(&session).await.unwrap();

        assert_eq!(first.text(), second.text());
        assert_eq!(first.used_capabilities(), second.used_capabilities());
        assert_ne!(first.turn_id(), second.turn_id());
        assert_eq!(session.prompts().len(), 2);
        assert_eq!(session.bus().subscriber_count(), 0);
    }

    #[tokio::test]
    async fn policy_turn_accepts_sourced_native_answer() {
        let session = scripted(vec![
            SessionEvent::text("Sunny, 72°F. "),
            SessionEvent::Other,
            SessionEvent::text("Source: https://weather.example/nyc"),
        ]);
        let verdict = run_policy_turn(
            &session,
            "weather?",
            &PromptOptions::default(),
            &NativeSourcePolicy::default(),
        )
        .await
        .unwrap();

        assert_eq!(
            verdict,
            PolicyVerdict::Accepted {
                text: "Sunny, 72°F. Source: https://weather.example/nyc".to_string()
            }
        );
    }

    #[tokio::test]
    async fn policy_turn_rejects_fallback_tool_use() {
        let session = scripted(vec![
            SessionEvent::tool_start("bash"),
            SessionEvent::text("Sunny. Source: https://weather.example/nyc"),
        ]);
        let verdict = run_policy_turn(
            &session,
            "weather?",
            &PromptOptions::default(),
            &NativeSourcePolicy::default(),
        )
        .await
        .unwrap();

        assert_eq!(
            verdict,
            PolicyVerdict::Rejected(Rejection::LocalToolsUsed {
                tools: vec!["bash".to_string()]
            })
        );
    }

    #[tokio::test]
    async fn capture_works_through_trait_objects() {
        let session: Box<dyn AgentSession> = Box::new(scripted(vec![SessionEvent::text(" ok ")]));
        let captured = capture(session.as_ref(), "hi", &PromptOptions::default())
            .await
            .unwrap();
        assert_eq!(captured.text(), "ok");
    }
}
