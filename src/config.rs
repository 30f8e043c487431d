use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::lookup::EndpointConfig;
use crate::paths::DEFAULT_PERCENTILE;
use crate::plausibility::Thresholds;
use crate::utils::ip_utils::AddressPolicy;

/// Top-level configuration that mirrors the YAML file.
///
/// Every section is optional; missing sections and keys take the defaults
/// the checker has always used.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub reduction: ReductionConfig,
    pub filter: FilterConfig,
    pub plausibility: Thresholds,
    pub cache: CacheConfig,
    pub services: ServicesConfig,
}

/// Logging and runtime settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,
    /// Log a progress line every N records (0 disables it)
    pub progress_interval: usize,
    /// Worker threads for the reduction stage (0 = one per core)
    pub threads: usize,
}

/// Percentile used to reduce each path's samples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReductionConfig {
    pub percentile: f64,
}

/// Which addresses count as private when selecting paths
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub address_policy: AddressPolicy,
}

/// Stage checkpoint settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub dir: PathBuf,
}

/// Remote services used by the checker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicesConfig {
    pub geohints: EndpointConfig,
    pub probes: EndpointConfig,
    pub measurements: EndpointConfig,
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.general.log_level.trim().is_empty() {
            return Err(ValidationError::InvalidGeneral(
                "log_level cannot be empty".to_string(),
            ));
        }

        let p = self.reduction.percentile;
        if !(0.0..=100.0).contains(&p) {
            return Err(ValidationError::InvalidReduction(format!(
                "percentile must be within [0, 100], got {}",
                p
            )));
        }

        let t = &self.plausibility;
        if !(t.max_distance_km > 0.0) || !(t.max_rtt_ms > 0.0) {
            return Err(ValidationError::InvalidPlausibility(format!(
                "thresholds must be positive (max_distance_km = {}, max_rtt_ms = {})",
                t.max_distance_km, t.max_rtt_ms
            )));
        }

        if self.cache.enabled && self.cache.dir.as_os_str().is_empty() {
            return Err(ValidationError::InvalidCache(
                "cache dir cannot be empty while caching is enabled".to_string(),
            ));
        }

        for (name, endpoint) in [
            ("geohints", &self.services.geohints),
            ("probes", &self.services.probes),
            ("measurements", &self.services.measurements),
        ] {
            if endpoint.url.trim().is_empty() {
                return Err(ValidationError::InvalidService(format!(
                    "{} url cannot be empty",
                    name
                )));
            }
            if endpoint.timeout.is_zero() {
                return Err(ValidationError::InvalidService(format!(
                    "{} timeout must be greater than zero",
                    name
                )));
            }
        }

        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid general configuration: {0}")]
    InvalidGeneral(String),
    #[error("Invalid reduction configuration: {0}")]
    InvalidReduction(String),
    #[error("Invalid plausibility configuration: {0}")]
    InvalidPlausibility(String),
    #[error("Invalid cache configuration: {0}")]
    InvalidCache(String),
    #[error("Invalid service configuration: {0}")]
    InvalidService(String),
}

/// Default implementations
impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            progress_interval: 2500,
            threads: 0,
        }
    }
}

impl Default for ReductionConfig {
    fn default() -> Self {
        Self {
            percentile: DEFAULT_PERCENTILE,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: PathBuf::from(".hopcheck-cache"),
        }
    }
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            geohints: EndpointConfig::openipmap(),
            probes: EndpointConfig::atlas_probes(),
            measurements: EndpointConfig::atlas_measurements(),
        }
    }
}
