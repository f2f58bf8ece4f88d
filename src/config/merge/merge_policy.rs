//! Built-in defaults applied below every other source.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

/// Start a builder seeded with the defaults.
pub(crate) fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("vault.root", ".")?
        .set_default("vault.max_depth", 1_i64)?
        .set_default("store.max_concurrent_io", 16_i64)?
        .set_default("store.write_hierarchy", false)?
        .set_default("logging.level", "info")
}
