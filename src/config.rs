//! @ai:module:intent Configuration structs for metrics tracking and monitoring
//! @ai:module:layer infrastructure
//! @ai:module:public_api AppConfig, PathConfig, ThresholdConfig, AbConfig
//! @ai:module:stateless true

use crate::pricing::PricingTable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// @ai:intent Main configuration for promptver
/// @ai:effects pure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub paths: PathConfig,
    #[serde(default)]
    pub thresholds: ThresholdConfig,
    #[serde(default)]
    pub ab: AbConfig,
    #[serde(default)]
    pub pricing: PricingTable,
}

/// @ai:intent Path configuration for the metric store
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl PathConfig {
    /// @ai:intent Location of the append-only metric record file
    /// @ai:effects pure
    pub fn records_file(&self) -> PathBuf {
        self.data_dir.join("metrics.jsonl")
    }
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// @ai:intent Signed fractional regression thresholds per metric
/// @ai:effects pure
///
/// Positive values flag increases (cost, latency: more is worse), negative
/// values flag decreases (quality: less is worse).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdConfig {
    #[serde(flatten)]
    pub metrics: BTreeMap<String, f64>,
}

impl ThresholdConfig {
    /// @ai:intent Look up a metric's configured threshold
    /// @ai:effects pure
    pub fn get(&self, metric: &str) -> Option<f64> {
        self.metrics.get(metric).copied()
    }

    /// @ai:intent Iterate configured (metric, threshold) pairs in name order
    /// @ai:effects pure
    pub fn iter(&self) -> impl Iterator<Item = (&String, &f64)> {
        self.metrics.iter()
    }
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        let mut metrics = BTreeMap::new();
        metrics.insert("cost".to_string(), 0.20);
        metrics.insert("latency".to_string(), 0.30);
        metrics.insert("quality".to_string(), -0.10);
        metrics.insert("error_rate".to_string(), 0.05);
        Self { metrics }
    }
}

/// @ai:intent A/B testing configuration
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbConfig {
    #[serde(default = "default_min_samples")]
    pub min_samples: usize,
    #[serde(default = "default_z_threshold")]
    pub z_threshold: f64,
}

impl Default for AbConfig {
    fn default() -> Self {
        Self {
            min_samples: default_min_samples(),
            z_threshold: default_z_threshold(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".promptver")
}

fn default_min_samples() -> usize {
    5
}

fn default_z_threshold() -> f64 {
    crate::analysis::significance::DEFAULT_Z_THRESHOLD
}

impl AppConfig {
    /// @ai:intent Load configuration from a TOML file
    /// @ai:pre path exists and is readable
    /// @ai:effects fs:read
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// @ai:intent Save configuration to a TOML file
    /// @ai:effects fs:write
    pub fn save(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
