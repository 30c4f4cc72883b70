//! FusBuddy360 CLI Entry Point
//!
//! This binary provides the command-line interface for FusBuddy360.

use std::process;

#[tokio::main]
async fn main() {
    if let Err(e) = fusbuddy_interface::run_cli().await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
