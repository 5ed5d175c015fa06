//! Ghidra bundler - builds a Ghidra.app bundle and .dmg for macOS.

use anyhow::Context;
use std::process;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Run CLI and get exit code
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            1
        }
    };

    process::exit(exit_code);
}

async fn run() -> anyhow::Result<i32> {
    ghidra_bundler::cli::run()
        .await
        .context("bundle assembly failed")
}
