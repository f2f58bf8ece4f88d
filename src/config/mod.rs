//! Configuration
//!
//! Layered configuration: built-in defaults, the global file under the XDG
//! config home, the vault file, then `NOTETREE__*` environment variables.

pub mod facade;
pub mod merge;
pub mod paths;
pub mod sources;

pub use facade::ConfigLoader;
pub use paths::xdg_root as xdg;

use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the per-vault configuration file
pub const VAULT_CONFIG_FILE: &str = "notetree.toml";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotetreeConfig {
    #[serde(default)]
    pub vault: VaultConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_vault_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_max_depth() -> usize {
    1
}

/// Vault location and layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Store root; relative paths resolve against the directory the config was loaded for
    #[serde(default = "default_vault_root")]
    pub root: PathBuf,

    /// How deep file enumeration descends below the root (1 = flat vault)
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl VaultConfig {
    /// Resolve the store root against `base`
    pub fn resolve_root(&self, base: &Path) -> PathBuf {
        if self.root.is_absolute() {
            self.root.clone()
        } else {
            base.join(&self.root)
        }
    }
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            root: default_vault_root(),
            max_depth: default_max_depth(),
        }
    }
}

fn default_max_concurrent_io() -> usize {
    16
}

/// File store behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Upper bound on concurrent file reads/writes in bulk operations
    #[serde(default = "default_max_concurrent_io")]
    pub max_concurrent_io: usize,

    /// Write `parent`/`children` into note front matter
    #[serde(default)]
    pub write_hierarchy: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_concurrent_io: default_max_concurrent_io(),
            write_hierarchy: false,
        }
    }
}
