//! Vault file source: `<vault>/notetree.toml`

use crate::config::VAULT_CONFIG_FILE;
use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File};
use std::path::Path;

/// Add the vault config file (optional).
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    vault_root: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let path = vault_root.join(VAULT_CONFIG_FILE);
    Ok(builder.add_source(File::from(path).required(false)))
}
