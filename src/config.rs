// src/config.rs

//! Global configuration
//!
//! Satchel reads a single TOML file, by default
//! `$XDG_CONFIG_HOME/satchel/config.toml`. Every key has a default so a
//! missing file is not an error; a malformed file is.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const OBS_BASE_URL: &str = "https://download.opensuse.org/repositories/";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Whether newly added repositories are probed when the command line
    /// leaves probing unspecified.
    pub probe_on_add: bool,

    /// Where the built-in repository manager persists its repository list.
    pub repos_file: PathBuf,

    /// Directory holding trusted keys, scanned before remote operations.
    pub keyring_dir: PathBuf,

    /// Base URL `obs:` URIs expand against.
    pub obs_base_url: String,

    /// Platform appended to `obs:` URIs that name only a project.
    pub obs_platform: String,

    /// Architecture reported by `system-architecture`.
    pub arch: String,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("/var/lib"))
            .join("satchel");
        Self {
            probe_on_add: false,
            repos_file: data_dir.join("repos.toml"),
            keyring_dir: data_dir.join("keyring"),
            obs_base_url: OBS_BASE_URL.to_string(),
            obs_platform: "standard".to_string(),
            arch: std::env::consts::ARCH.to_string(),
        }
    }
}

impl Config {
    /// Path of the default configuration file.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("/etc"))
            .join("satchel")
            .join("config.toml")
    }

    /// Load configuration from `path`, or from the default location when
    /// none is given. A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::default_path);
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path).map_err(Error::ConfigRead)?;
        let config = toml::from_str(&raw)?;
        Ok(config)
    }
}
