use crate::error::{RastroError, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

pub fn config_dir() -> Result<PathBuf> {
    let proj = ProjectDirs::from("sh", "rastro", "rastro")
        .ok_or_else(|| RastroError::Other("Could not determine config directory".to_string()))?;
    Ok(proj.config_dir().to_path_buf())
}

/// Default root scanned for backend manifest packages.
pub fn backends_dir() -> Result<PathBuf> {
    Ok(config_dir()?.join("backends"))
}
