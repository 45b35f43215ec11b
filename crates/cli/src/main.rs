//! kmsctl - manage KMS encrypted secrets held in S3
//!
//! A command-line interface for listing, retrieving, uploading and editing
//! files stored in S3 with server-side KMS encryption.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use kmsctl::commands::{self, Cli};
use kmsctl::exit_code::ExitCode;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logs go to stderr, records to stdout
    let filter = if cli.global.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let exit_code = tokio::select! {
        code = commands::execute(cli) => code,
        _ = tokio::signal::ctrl_c() => ExitCode::Interrupted,
    };

    std::process::exit(exit_code.as_i32());
}
