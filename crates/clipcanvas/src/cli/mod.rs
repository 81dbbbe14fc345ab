//! # CLI Behavior
//!
//! This is **one possible UI client** for clipcanvas, not the application itself.
//! The CLI is the only place that knows about terminal I/O, exit codes, and output formatting.
//!
//! For the overall architecture, see the crate-level documentation in [`crate`].
//!
//! ## A Session Per Invocation
//!
//! Every run opens the collection, puts the cursor back where the previous run
//! left it (see `state`), executes one command, and remembers the new position.
//! So `clipcanvas back` twice walks two canvases into the past.
//!
//! ### Naked Execution (`clipcanvas`)
//!
//! Running `clipcanvas` with no arguments lists the collection.
//!
//! ### Paste Sources
//!
//! `clipcanvas paste` reads the system clipboard. Explicit sources override it:
//!
//! - `--text "..."`: the given text
//! - `--file PATH` (repeatable): files, as if copied in a file manager
//! - `--stdin`: piped input; PNG bytes become an image, anything else text
//!
//! ## Module Structure
//!
//! - `commands`: context setup, dispatch, position bookkeeping
//! - `handlers`: one function per command, API calls only
//! - `render`: terminal and JSON output
//! - `setup`: argument parsing via clap
//! - `state`: last opened canvas per collection

mod commands;
mod handlers;
mod render;
pub mod setup;
mod state;

pub use commands::run;
