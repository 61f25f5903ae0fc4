use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "rastro",
    about = "Issue tracker miner",
    long_about = "Mirrors issues from remote trackers through pluggable backends",
    version,
    next_line_help = false,
    term_width = 80
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalFlags,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Parser, Debug)]
pub struct GlobalFlags {
    /// Verbose output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Quiet mode
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Backends directory (defaults to the user config directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub backends_dir: Option<PathBuf>,

    /// Fail on broken backend packages instead of skipping them
    #[arg(long, global = true)]
    pub strict: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the available backends
    List,

    /// Mirror issues from a tracker with the given backend
    Run {
        /// Backend name, as published by `list`
        backend: String,

        /// Tracker base url
        #[arg(short = 'u', long)]
        url: Option<String>,

        /// Seconds to wait between requests
        #[arg(short = 'd', long, default_value_t = 1)]
        delay: u64,

        /// Bearer token for authenticated trackers
        #[arg(short = 't', long)]
        token: Option<String>,
    },

    /// Show configuration paths and backend catalogue details
    Info,
}
