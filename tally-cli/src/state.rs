use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// State directory: `$TALLY_HOME`, else `~/.tally`.
pub fn tally_home() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os("TALLY_HOME").filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".tally"))
}

pub fn ensure_tally_home() -> Result<PathBuf> {
    let dir = tally_home()?;
    ensure_dir(&dir)?;
    Ok(dir)
}

/// Where the key-value store keeps `category_corrections.json`.
pub fn store_dir(home: &Path) -> PathBuf {
    home.join("store")
}

/// Default asset directory when `[assets].dir` is not set.
pub fn default_assets_dir(home: &Path) -> PathBuf {
    home.join("assets")
}

fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))
}
