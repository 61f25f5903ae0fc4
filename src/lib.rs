pub mod backends;
pub mod cli;
pub mod config;
pub mod error;
pub mod parsers;
pub mod storage;
pub mod types;
pub mod ui;
pub mod utils;

use clap::Parser;
use std::process::exit;

/// Run rastro CLI entrypoint.
pub fn run_cli() {
    let args = cli::args::Cli::parse();
    ui::set_quiet(args.global.quiet);
    ui::set_verbose(args.global.verbose);

    if let Err(e) = cli::dispatcher::dispatch(&args) {
        ui::error(&format!("{e}"));
        exit(1);
    }
}
