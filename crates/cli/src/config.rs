//! Configuration management for the CLI
//!
//! Sources, later ones winning:
//! - `~/.config/compose-sizer/config.json` (optional)
//! - `COMPOSE_SIZER_*` environment variables

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sizer_lib::observability::LogFormat;
use sizer_lib::ProbeConfig;
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "COMPOSE_SIZER";

/// CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Mount point of the cgroup filesystem
    #[serde(default = "default_cgroup_root")]
    pub cgroup_root: PathBuf,

    /// Mount point of procfs
    #[serde(default = "default_proc_root")]
    pub proc_root: PathBuf,

    /// Container runtime CLI queried on Docker Desktop hosts
    #[serde(default = "default_runtime_bin")]
    pub runtime_bin: String,

    /// Host memory query used on macOS when the runtime is unavailable
    #[serde(default = "default_sysctl_bin")]
    pub sysctl_bin: String,

    /// Smallest host memory, in GB, a plan is produced for
    #[serde(default = "default_min_ram_gb")]
    pub min_ram_gb: i64,

    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_cgroup_root() -> PathBuf {
    ProbeConfig::default().cgroup_root
}

fn default_proc_root() -> PathBuf {
    ProbeConfig::default().proc_root
}

fn default_runtime_bin() -> String {
    ProbeConfig::default().runtime_bin
}

fn default_sysctl_bin() -> String {
    ProbeConfig::default().sysctl_bin
}

fn default_min_ram_gb() -> i64 {
    8
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cgroup_root: default_cgroup_root(),
            proc_root: default_proc_root(),
            runtime_bin: default_runtime_bin(),
            sysctl_bin: default_sysctl_bin(),
            min_ram_gb: default_min_ram_gb(),
            log_format: LogFormat::default(),
        }
    }
}

impl Config {
    /// Load from the user config file and environment
    pub fn load() -> Result<Self> {
        let path = Self::config_path().ok();
        Self::load_from(path.as_deref())
    }

    /// Load from an optional config file and environment
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(false));
        }

        builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }

    /// Locations handed to the resource probe
    pub fn probe_config(&self) -> ProbeConfig {
        ProbeConfig {
            cgroup_root: self.cgroup_root.clone(),
            proc_root: self.proc_root.clone(),
            runtime_bin: self.runtime_bin.clone(),
            sysctl_bin: self.sysctl_bin.clone(),
        }
    }

    /// Get the configuration file path
    fn config_path() -> Result<PathBuf> {
        let home = dirs_next::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".config").join("compose-sizer").join("config.json"))
    }
}
