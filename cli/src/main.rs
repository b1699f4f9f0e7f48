use clap::{Parser, Subcommand};

mod commands;
mod util;

use commands::replay::ReplayArgs;
use commands::verify::VerifyArgs;

#[derive(Parser)]
#[command(
    name = "provenance",
    version,
    about = "Provenance gate: capture agent turns and verify they came from native, sourced capabilities"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a recorded transcript as one captured turn, then verify it
    Replay(ReplayArgs),
    /// Verify a response text directly, without a session
    Verify(VerifyArgs),
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    util::init_tracing();
    let cli = Cli::parse();

    let code = match cli.command {
        Commands::Replay(args) => commands::replay::run(args).await,
        Commands::Verify(args) => commands::verify::run(args),
    };
    std::process::exit(code);
}
