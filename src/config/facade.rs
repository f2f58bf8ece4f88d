//! ConfigLoader facade delegating to merge service.

use super::merge::service::MergeService;
use super::NotetreeConfig;
use config::ConfigError;
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a vault from files and environment.
    pub fn load(vault_root: &Path) -> Result<NotetreeConfig, ConfigError> {
        MergeService::load(vault_root)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Result<NotetreeConfig, ConfigError> {
        MergeService::load_from_file(path)
    }

    /// Create default configuration.
    pub fn default() -> NotetreeConfig {
        NotetreeConfig::default()
    }
}
