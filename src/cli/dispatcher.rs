//! Command dispatcher
//!
//! Routes CLI commands to their appropriate handlers.

use crate::backends::{BackendManager, BackendRegistry};
use crate::cli::args::{Cli, Command};
use crate::config::{self, Config};
use crate::error::{RastroError, Result};
use crate::ui;
use crate::utils::paths;

/// Dispatch the parsed CLI command to the appropriate handler
pub fn dispatch(args: &Cli) -> Result<()> {
    match &args.command {
        Some(Command::List) | None => handle_list(args),

        Some(Command::Run {
            backend,
            url,
            delay,
            token,
        }) => handle_run(args, backend, url.clone(), *delay, token.clone()),

        Some(Command::Info) => handle_info(args),
    }
}

fn build_manager(args: &Cli) -> Result<BackendManager> {
    let dir = match &args.global.backends_dir {
        Some(dir) => dir.clone(),
        None => paths::backends_dir()?,
    };
    BackendManager::with_registry(BackendRegistry::default(), dir, args.global.strict)
}

fn handle_list(args: &Cli) -> Result<()> {
    let manager = build_manager(args)?;

    ui::header("Available backends");
    if manager.backends().is_empty() {
        ui::info("No backends found.");
        return Ok(());
    }
    for name in manager.backends() {
        println!("  {name}");
    }
    Ok(())
}

fn handle_run(
    args: &Cli,
    backend: &str,
    url: Option<String>,
    delay: u64,
    token: Option<String>,
) -> Result<()> {
    let manager = build_manager(args)?;

    if !config::init(Config {
        url,
        delay,
        auth_token: token,
        backends_dir: args.global.backends_dir.clone(),
    }) {
        return Err(RastroError::ConfigError(
            "configuration was already initialized".to_string(),
        ));
    }

    let backend = manager.get(backend)?;
    backend.run()
}

fn handle_info(args: &Cli) -> Result<()> {
    let manager = build_manager(args)?;

    ui::header("rastro");
    ui::keyval("version", env!("CARGO_PKG_VERSION"));
    ui::keyval("config dir", &paths::config_dir()?.display().to_string());
    ui::keyval("backends dir", &manager.path().display().to_string());
    ui::keyval("backends", &manager.backends().join(", "));
    ui::keyval("strict", if manager.strict() { "yes" } else { "no" });
    Ok(())
}
