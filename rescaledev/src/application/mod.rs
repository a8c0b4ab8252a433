pub mod handlers;

use crate::presentation::cli::{Cli, Commands};
use clap::Parser;
use rescale_core::error::Result;

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Rescale {
            inputs,
            scale,
            poll_ms,
            json,
            quiet,
        } => handlers::handle_rescale(inputs, scale, poll_ms, json, quiet),
        Commands::Inspect { path, json } => handlers::handle_inspect(path, json),
    }
}
