//! Optional JSON configuration layered over built-in defaults.
//!
//! Every section is independently optional; an empty file, or no file
//! at all, yields the same defaults the engine ships with.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use windward_core::reconcile::ReconcileConfig;
use windward_core::regime::CycleRules;
use windward_core::registry::RegistryConfig;
use windward_core::GaugeConfig;

use crate::error::CliError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WindwardConfig {
    pub registry: RegistryConfig,
    pub reconcile: ReconcileConfig,
    pub cycle_rules: CycleRules,
    pub gauge: GaugeConfig,
}

impl WindwardConfig {
    /// Load from an optional file path; `None` means defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, CliError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let body = fs::read_to_string(path).map_err(|err| {
            CliError::Command(format!("cannot read config '{}': {err}", path.display()))
        })?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_path_yields_defaults() {
        let config = WindwardConfig::load(None).expect("defaults");
        assert_eq!(config.reconcile.lookback_days, 7);
        assert_eq!(config.gauge.max_streak, 10);
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_sections() {
        let config: WindwardConfig =
            serde_json::from_str(r#"{"reconcile":{"lookback_days":14}}"#).expect("parse");
        assert_eq!(config.reconcile.lookback_days, 14);
        assert_eq!(config.reconcile.cache_ttl_secs, 600);
        assert!(!config.cycle_rules.active_markers.is_empty());
    }
}
