use std::path::PathBuf;

use clap::Args;
use serde_json::json;

use provenance_core::{CaptureError, PromptOptions, TurnCapture};
use provenance_runtime::{
    AgentSession, ScriptedSession, Transcript, capture, cited_sources, verify_with,
};

use super::PolicyArgs;
use crate::util::{EXIT_ACCEPTED, print_json, report_error, verdict_exit_code};

#[derive(Args, Clone, Debug)]
pub struct ReplayArgs {
    /// Recorded transcript: {"events": [...], "failure": "..."} or a bare event array
    #[arg(long)]
    pub transcript: PathBuf,

    /// Prompt text sent to the session
    #[arg(long)]
    pub prompt: String,

    /// Prompt options as a JSON object (e.g. '{"attachments": []}')
    #[arg(long)]
    pub options: Option<String>,

    /// Capture the turn only, without policy verification
    #[arg(long)]
    pub skip_verify: bool,

    #[command(flatten)]
    pub policy: PolicyArgs,
}

pub async fn run(args: ReplayArgs) -> i32 {
    let options = match args.options.as_deref() {
        Some(raw) => match serde_json::from_str::<PromptOptions>(raw) {
            Ok(options) => options,
            Err(e) => {
                return report_error(
                    "cli_error",
                    &format!("Invalid JSON in --options: {e}"),
                    Some("Pass a JSON object, e.g. --options '{\"attachments\": []}'"),
                );
            }
        },
        None => PromptOptions::default(),
    };

    let transcript = match Transcript::from_path(&args.transcript) {
        Ok(transcript) => transcript,
        Err(e) => {
            return report_error(
                e.code(),
                &e.to_string(),
                Some("Transcripts are JSON: {\"events\": [{\"type\": \"text_delta\", \"delta\": \"...\"}]}"),
            );
        }
    };

    tracing::debug!(
        path = %args.transcript.display(),
        events = transcript.events.len(),
        "loaded transcript"
    );

    let session = ScriptedSession::new(transcript);
    let captured = match capture_and_dispose(&session, &args.prompt, &options).await {
        Ok(captured) => captured,
        Err(e) => return report_error(e.code(), &e.to_string(), None),
    };

    let sources: Vec<String> = cited_sources(captured.text())
        .iter()
        .map(ToString::to_string)
        .collect();
    let mut output = json!({
        "capture": captured,
        "sources": sources,
    });

    if args.skip_verify {
        print_json(&output);
        return EXIT_ACCEPTED;
    }

    let verdict = verify_with(&args.policy.to_policy(), &captured);
    output["verdict"] = verdict.to_value();
    print_json(&output);
    verdict_exit_code(&verdict)
}

/// One captured turn; the session is disposed afterwards whatever the outcome.
async fn capture_and_dispose<S>(
    session: &S,
    prompt: &str,
    options: &PromptOptions,
) -> Result<TurnCapture, CaptureError>
where
    S: AgentSession + ?Sized,
{
    let outcome = capture(session, prompt, options).await;
    session.dispose();
    outcome
}
