use crate::config::Config;
use anyhow::{anyhow, Result};
use std::path::PathBuf;

pub fn run(path: Option<PathBuf>, force: bool) -> Result<PathBuf> {
    let path = match path {
        Some(p) => p,
        None => Config::default_path()
            .ok_or_else(|| anyhow!("Failed to determine project directories"))?,
    };
    if path.exists() && !force {
        anyhow::bail!("{} already exists; use --force to overwrite", path.display());
    }
    Config::default().save(&path)?;
    println!("Wrote default config to {}", path.display());
    Ok(path)
}
