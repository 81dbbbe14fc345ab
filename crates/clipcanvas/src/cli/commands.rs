//! # CLI Layer
//!
//! The CLI layer is the **only** place in the codebase that:
//! - Knows about terminal I/O (stdout, stderr)
//! - Handles argument parsing
//! - Formats output for human consumption
//!
//! ## Responsibilities
//!
//! 1. **Argument Parsing**: shell arguments into typed commands via clap
//! 2. **Context Setup**: data directory, config and collection via `init`
//! 3. **Dispatch**: route the command to its handler
//! 4. **Events**: collection notices (reload tips, vanished folder) go to stderr
//! 5. **Bookkeeping**: remember where the cursor ended up for the next run

use super::handlers::dispatch;
use super::render::render_event;
use super::setup::{Cli, Commands};
use super::state::CliState;
use anyhow::Result;
use clap::Parser;
use clipcanvasapp::events::drain;
use clipcanvasapp::init::initialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Naked clipcanvas lists the collection
    let command = cli.command.clone().unwrap_or(Commands::List);

    let mut ctx = initialize(cli.collection.clone())?;
    let collection = ctx.api.collection().path().to_path_buf();

    let mut state = CliState::load(&ctx.data_dir);
    ctx.api.restore_position(state.position(&collection));

    let events = ctx.api.subscribe();
    let outcome = dispatch(&mut ctx.api, &ctx.config, &command, cli.output);
    for event in drain(&events) {
        if let Some(notice) = render_event(&event) {
            eprintln!("{}", notice);
        }
    }
    let output = outcome?;
    print!("{}", output);

    let position = ctx
        .api
        .collection()
        .current_item()
        .map(|item| item.associated().path().to_path_buf());
    debug!(?position, "remembering position");
    state.remember(&collection, position.as_deref());
    state.save(&ctx.data_dir)
}
