//! Configuration loading
//!
//! Handles loading configuration from embedded defaults, files, and environment.

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use credkit_core::StoreConfig;

/// Embedded default configuration (compiled into binary)
pub const DEFAULT_CONFIG: &str = include_str!("../config/default.toml");

/// Load configuration from files and environment
pub fn load_config() -> Result<StoreConfig> {
    load_config_from(std::env::var("CREDKIT_CONFIG").ok().as_deref())
}

/// Load configuration, layering an explicit file over the defaults
pub fn load_config_from(path: Option<&str>) -> Result<StoreConfig> {
    let mut builder = Config::builder()
        // 1. Embedded defaults (always available)
        .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
        // 2. Local overrides (optional)
        .add_source(File::with_name("config/local").required(false));

    if let Some(path) = path {
        builder = builder.add_source(File::with_name(path).required(true));
    }

    let config = builder
        // 3. Environment variables (highest priority)
        .add_source(
            Environment::with_prefix("CREDKIT")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()
        .context("Failed to build configuration")?;

    let store: StoreConfig = config
        .try_deserialize()
        .context("Failed to deserialize configuration")?;
    store.validate().context("Invalid configuration")?;
    Ok(store)
}
