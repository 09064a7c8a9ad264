use crate::reference::Backend;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: Backend,
    #[serde(default = "default_samtools")]
    pub samtools: String,
    #[serde(default = "default_docker")]
    pub docker: String,
    #[serde(default = "default_image")]
    pub image: String,
    #[serde(default = "default_lookup_timeout")]
    pub lookup_timeout_secs: u64,
    #[serde(default = "default_threads")]
    pub threads: usize,
}

fn default_samtools() -> String {
    "samtools".to_string()
}

fn default_docker() -> String {
    "docker".to_string()
}

fn default_image() -> String {
    "quay.io/biocontainers/samtools:1.21--h50ea8bc_0".to_string()
}

fn default_lookup_timeout() -> u64 {
    30
}

fn default_threads() -> usize {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            samtools: default_samtools(),
            docker: default_docker(),
            image: default_image(),
            lookup_timeout_secs: default_lookup_timeout(),
            threads: default_threads(),
        }
    }
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("org", "indel-converter", "indel-converter")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load the config from the platform config directory. A missing or
    /// unreadable file there just means defaults.
    pub fn load() -> Self {
        if let Some(config_path) = Self::default_path() {
            if config_path.exists() {
                match Self::from_file(&config_path) {
                    Ok(config) => return config,
                    Err(e) => log::warn!("Ignoring {}: {:#}", config_path.display(), e),
                }
            }
        }
        Config::default()
    }

    /// Load an explicitly requested config file; errors are fatal here.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).with_context(|| format!("Failed to write config {}", path.display()))?;
        Ok(())
    }
}
