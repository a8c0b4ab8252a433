use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "rescaledev CLI", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rescale OBJ/STL models into `<name>_scaled.<ext>` next to each source
    Rescale {
        /// model files, or directories to search for .obj/.stl files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// factor applied to every coordinate
        #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
        scale: f64,

        /// progress poll cadence in milliseconds
        #[arg(long = "poll-ms", default_value_t = 50)]
        poll_ms: u64,

        /// print one JSON report per job instead of a summary line
        #[arg(long)]
        json: bool,

        /// no progress bar
        #[arg(long)]
        quiet: bool,
    },

    /// Show how a model file would be handled, without writing anything
    Inspect {
        path: PathBuf,

        #[arg(long)]
        json: bool,
    },
}
