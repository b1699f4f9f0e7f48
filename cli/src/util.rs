use serde_json::{Value, json};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use provenance_core::PolicyVerdict;

pub const EXIT_ACCEPTED: i32 = 0;
pub const EXIT_ERROR: i32 = 1;
pub const EXIT_REJECTED: i32 = 2;

/// JSON logs on stderr; stdout carries only the command's result.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "provenance_runtime=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr),
        )
        .try_init();
}

pub fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(rendered) => println!("{rendered}"),
        Err(_) => println!("{value}"),
    }
}

pub fn error_payload(error: &str, message: &str, docs_hint: Option<&str>) -> Value {
    let mut err = json!({
        "error": error,
        "message": message
    });
    if let Some(hint) = docs_hint {
        err["docs_hint"] = json!(hint);
    }
    err
}

/// Print a structured error on stderr and return the error exit code.
pub fn report_error(error: &str, message: &str, docs_hint: Option<&str>) -> i32 {
    let err = error_payload(error, message, docs_hint);
    match serde_json::to_string_pretty(&err) {
        Ok(rendered) => eprintln!("{rendered}"),
        Err(_) => eprintln!("{err}"),
    }
    EXIT_ERROR
}

pub fn verdict_exit_code(verdict: &PolicyVerdict) -> i32 {
    if verdict.is_accepted() {
        EXIT_ACCEPTED
    } else {
        EXIT_REJECTED
    }
}
