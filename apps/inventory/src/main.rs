//! # Stockroom Headless Entry Point
//!
//! Opens storage the same way the desktop shell does and prints what it
//! finds.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  $ STOCKROOM_DATA_DIR=/srv/stock stockroom                              │
//! │                                                                         │
//! │  Name                             Code               Quantity          │
//! │  Drill                            004                      15          │
//! │  1 item(s)                                                              │
//! │                                                                         │
//! │  14:03:59 16-10-2026  Server       Added Drill (code 004) ...           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Startup Sequence
//! 1. Initialize tracing (logging)
//! 2. Read settings from the environment
//! 3. Open the record store (or flat files)
//! 4. Print items and recent activity

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    // The actual setup is in lib.rs for better testability
    match stockroom_app::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("stockroom: {}", e);
            ExitCode::FAILURE
        }
    }
}
