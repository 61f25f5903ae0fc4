//! Process-wide runtime configuration.
//!
//! Backends are constructed with zero arguments, so the settings they need at
//! `run()` time (tracker URL, fetch delay, credentials) live here, set exactly
//! once by the CLI before any backend runs. The `OnceLock` makes the
//! initialization phase explicit: configuration is written once, then only
//! read.

use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Base URL of the tracker to mirror.
    pub url: Option<String>,
    /// Seconds to wait between consecutive remote requests.
    pub delay: u64,
    /// Bearer token for trackers that require authentication.
    pub auth_token: Option<String>,
    /// Root directory scanned for backend manifest packages.
    pub backends_dir: Option<PathBuf>,
}

impl Config {
    pub fn delay_duration(&self) -> Duration {
        Duration::from_secs(self.delay)
    }
}

static CONFIG: OnceLock<Config> = OnceLock::new();

/// Install the runtime configuration. Returns false if it was already set.
pub fn init(config: Config) -> bool {
    CONFIG.set(config).is_ok()
}

/// The active configuration, defaulting to empty when never initialized
/// (library consumers driving backends directly).
pub fn get() -> &'static Config {
    CONFIG.get_or_init(Config::default)
}
