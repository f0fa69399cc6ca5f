//! imgscout CLI tool
//!
//! Command-line interface for searching an image provider, filtering
//! candidates by resolution, and saving the accepted results.

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match imgscout::cli::main().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        },
    }
}
