//! # Clipcanvas CLI Architecture
//!
//! The binary is intentionally thin: the CLI lives in `src/cli/`, while this
//! file only invokes `cli::run()` and handles process termination.
//!
//! ## Workspace Structure
//!
//! - `crates/clipcanvasapp/`: core library, UI agnostic
//! - `crates/clipcanvas/`: this CLI, one client of the library
//!
//! ## Layering
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (crates/clipcanvas/src/cli/)                     │
//! │  - clap argument parsing (setup.rs)                         │
//! │  - Context wiring + dispatch (commands.rs, handlers.rs)     │
//! │  - Terminal and JSON rendering (render.rs)                  │
//! │  - Last position per collection (state.rs)                  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (crates/clipcanvasapp/src/api.rs)                │
//! │  - 1-based display indexes                                  │
//! │  - Structured results, collection events                    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The CLI is responsible for **all** user-facing concerns: argument parsing,
//! reading the system clipboard, rendering, and exit codes. Library
//! diagnostics come through `tracing`; `-v` turns them up on stderr.
//!
//! ## Testing Approach
//!
//! - **Library**: unit tests next to each module plus on-disk integration tests.
//! - **CLI**: rendering unit tests in `render.rs`, end-to-end runs of the real
//!   binary in `tests/` with `CLIPCANVAS_DATA` pointing at a temp directory.

mod cli;
mod clipboard;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
