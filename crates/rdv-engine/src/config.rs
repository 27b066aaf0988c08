//! Engine configuration shared by the CLI and the WASM bindings.

use serde::{Deserialize, Serialize};

use crate::availability::DEFAULT_START_TIMES;
use crate::error::{RdvError, Result};
use crate::time::{Interval, TimeOfDay};

/// Tunables for a host application. Every field has a default, so `{}` is a
/// complete configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// How often the host should call `WaitingRoom::tick`. The engine never
    /// schedules anything itself.
    pub tick_seconds: u64,
    /// Duration used when a booking form leaves it blank.
    pub default_duration_minutes: u32,
    /// Start times offered for new bookings.
    pub start_times: Vec<TimeOfDay>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_seconds: 60,
            default_duration_minutes: 30,
            start_times: DEFAULT_START_TIMES.to_vec(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig =
            serde_json::from_str(json).map_err(|e| RdvError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tick_seconds == 0 {
            return Err(RdvError::InvalidConfig(
                "tick_seconds must be positive".to_string(),
            ));
        }
        if self.default_duration_minutes == 0 {
            return Err(RdvError::InvalidConfig(
                "default_duration_minutes must be positive".to_string(),
            ));
        }
        for start in &self.start_times {
            Interval::from_duration(*start, self.default_duration_minutes).map_err(|e| {
                RdvError::InvalidConfig(format!("start time {}: {}", start, e))
            })?;
        }
        Ok(())
    }
}
