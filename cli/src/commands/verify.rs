use std::path::PathBuf;

use clap::Args;
use serde_json::json;

use provenance_core::TurnCapture;
use provenance_runtime::{cited_sources, verify_with};

use super::PolicyArgs;
use crate::util::{print_json, report_error, verdict_exit_code};

#[derive(Args, Clone, Debug)]
pub struct VerifyArgs {
    /// Response text to verify
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    pub text: Option<String>,

    /// Read the response text from a file
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Tool that ran during the turn (repeatable)
    #[arg(long = "tool")]
    pub tools: Vec<String>,

    #[command(flatten)]
    pub policy: PolicyArgs,
}

pub fn run(args: VerifyArgs) -> i32 {
    let text = match (args.text, args.file.as_ref()) {
        (Some(text), _) => text,
        (None, Some(path)) => match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                return report_error(
                    "cli_error",
                    &format!("Failed to read {}: {e}", path.display()),
                    None,
                );
            }
        },
        (None, None) => {
            return report_error(
                "cli_error",
                "Nothing to verify",
                Some("Pass --text or --file"),
            );
        }
    };

    let captured = TurnCapture::new(&text, args.tools);
    let verdict = verify_with(&args.policy.to_policy(), &captured);
    let sources: Vec<String> = cited_sources(captured.text())
        .iter()
        .map(ToString::to_string)
        .collect();

    print_json(&json!({
        "verdict": verdict.to_value(),
        "sources": sources,
    }));
    verdict_exit_code(&verdict)
}
