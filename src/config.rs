use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;

use crate::slicing::slice::ResourceKind;

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    pub capacity: CapacityConfig,
    pub telemetry: TelemetryConfig,
    pub predictor: PredictorConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CapacityConfig {
    pub cpu_units: f64,
    pub memory_mb: f64,
    pub bandwidth_mbps: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetryConfig {
    pub collection_interval_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PredictorConfig {
    pub enabled: bool,
    pub model_path: String,
}

impl Default for CapacityConfig {
    fn default() -> Self {
        Self {
            cpu_units: 100.0,
            memory_mb: 1_024_000.0,
            bandwidth_mbps: 10_000.0,
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            collection_interval_seconds: 5,
        }
    }
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            model_path: "models/demand_net.bin".to_string(),
        }
    }
}

impl CapacityConfig {
    pub fn as_totals(&self) -> HashMap<ResourceKind, f64> {
        HashMap::from([
            (ResourceKind::Cpu, self.cpu_units),
            (ResourceKind::Memory, self.memory_mb),
            (ResourceKind::Bandwidth, self.bandwidth_mbps),
        ])
    }
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
