//! Effective configuration: defaults, then an optional JSON file, then
//! environment overrides.

use std::env;

use anyhow::{Context, Result};
use rdv_engine::EngineConfig;
use tracing::debug;

pub const TICK_SECONDS_VAR: &str = "RDV_TICK_SECONDS";
pub const DEFAULT_DURATION_VAR: &str = "RDV_DEFAULT_DURATION";

pub fn load(path: Option<&str>) -> Result<EngineConfig> {
    let mut config = match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path))?;
            EngineConfig::from_json(&raw)
                .with_context(|| format!("Invalid config file: {}", path))?
        }
        None => EngineConfig::default(),
    };

    if let Ok(raw) = env::var(TICK_SECONDS_VAR) {
        config.tick_seconds = raw
            .parse()
            .with_context(|| format!("{} must be a whole number of seconds", TICK_SECONDS_VAR))?;
    }
    if let Ok(raw) = env::var(DEFAULT_DURATION_VAR) {
        config.default_duration_minutes = raw
            .parse()
            .with_context(|| format!("{} must be a whole number of minutes", DEFAULT_DURATION_VAR))?;
    }

    config.validate().context("Invalid configuration")?;
    debug!(?config, "configuration loaded");
    Ok(config)
}
