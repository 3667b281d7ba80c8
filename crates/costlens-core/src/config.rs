//! Analytics configuration
//!
//! Every heuristic threshold lives here instead of being hardcoded in the
//! analytics, so behavior stays testable and tunable from
//! `~/.config/costlens/config.toml` without code changes.
//!
//! The defaults reproduce the dashboard's historical cutoffs verbatim.
//! They are not a validated policy.

use crate::error::CoreError;
use costlens_types::AnomalyMethod;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Longest trailing anomaly window accepted, in days
pub const MAX_WINDOW_SIZE: usize = 366;

/// File name looked up inside the platform config directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Complete configuration passed into [`crate::analytics::AnalyticsReport::compute`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub anomaly: AnomalyConfig,
    pub forecast: ForecastConfig,
    pub resources: ResourceConfig,
    pub savings: SavingsConfig,
    pub digest: DigestConfig,
}

/// Anomaly detection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyConfig {
    pub method: AnomalyMethod,
    /// Trailing window length in days (both methods)
    pub window_size: usize,
    /// Sigma method: flag when |cost - mean| > multiplier * std_dev
    pub sigma_multiplier: f64,
    /// Percentage method: flag when the increase over the mean exceeds this
    pub percent_threshold: f64,
    /// Percentage method: trailing means at or below this are ignored
    pub min_baseline: f64,
    /// Services listed as context for each anomaly
    pub top_contributors: usize,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            method: AnomalyMethod::Sigma,
            window_size: 7,
            sigma_multiplier: 2.0,
            percent_threshold: 30.0,
            min_baseline: 0.1,
            top_contributors: 3,
        }
    }
}

impl AnomalyConfig {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.window_size == 0 || self.window_size > MAX_WINDOW_SIZE {
            return Err(CoreError::invalid_config(format!(
                "anomaly.window_size must be between 1 and {}, got {}",
                MAX_WINDOW_SIZE, self.window_size
            )));
        }
        if !self.sigma_multiplier.is_finite() || self.sigma_multiplier <= 0.0 {
            return Err(CoreError::invalid_config(format!(
                "anomaly.sigma_multiplier must be a positive number, got {}",
                self.sigma_multiplier
            )));
        }
        if !self.percent_threshold.is_finite() || self.percent_threshold < 0.0 {
            return Err(CoreError::invalid_config(format!(
                "anomaly.percent_threshold must be >= 0, got {}",
                self.percent_threshold
            )));
        }
        if !self.min_baseline.is_finite() || self.min_baseline < 0.0 {
            return Err(CoreError::invalid_config(format!(
                "anomaly.min_baseline must be >= 0, got {}",
                self.min_baseline
            )));
        }
        if self.top_contributors == 0 {
            return Err(CoreError::invalid_config(
                "anomaly.top_contributors must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Forecast settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Most recent periods averaged into the flat projection
    pub lookback_periods: usize,
    /// Periods to project when the caller does not specify a horizon
    pub horizon: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            lookback_periods: 3,
            horizon: 3,
        }
    }
}

impl ForecastConfig {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.lookback_periods == 0 {
            return Err(CoreError::invalid_config(
                "forecast.lookback_periods must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Resource profiling thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceConfig {
    /// Idle candidate: total cost strictly below this
    pub idle_max_cost: f64,
    /// Idle candidate: occurrences strictly below this
    pub idle_max_occurrences: usize,
    /// Idle candidate: observed duration strictly above this many days
    pub idle_min_duration_days: u32,
    /// Resources kept by `top_expensive`
    pub top_expensive: usize,
    /// Resources kept by `idle_candidates`
    pub top_idle: usize,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            idle_max_cost: 5.0,
            idle_max_occurrences: 5,
            idle_min_duration_days: 10,
            top_expensive: 5,
            top_idle: 3,
        }
    }
}

impl ResourceConfig {
    pub fn validate(&self) -> Result<(), CoreError> {
        if !self.idle_max_cost.is_finite() || self.idle_max_cost < 0.0 {
            return Err(CoreError::invalid_config(format!(
                "resources.idle_max_cost must be >= 0, got {}",
                self.idle_max_cost
            )));
        }
        Ok(())
    }
}

/// Cost-savings heuristics, all in USD
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SavingsConfig {
    /// Accumulated compute instance cost worth reviewing
    pub high_cost_instance: f64,
    /// Right-sizing: compute line items above this are accumulated per instance
    pub rightsizing_line_item: f64,
    /// Right-sizing: accumulated cost above which an instance is flagged
    pub rightsizing_total: f64,
    /// Right-sizing: instance type prefixes considered general purpose
    pub rightsizing_families: Vec<String>,
    /// Volume review: `vol-` line items above this are accumulated per volume
    pub volume_line_item: f64,
    /// Single data-transfer-out line item considered high
    pub data_transfer_out: f64,
    /// Single block-storage line item considered high
    pub block_storage: f64,
    /// Single standard-tier object storage line item worth tiering
    pub storage_tiering: f64,
}

impl Default for SavingsConfig {
    fn default() -> Self {
        Self {
            high_cost_instance: 500.0,
            rightsizing_line_item: 100.0,
            rightsizing_total: 200.0,
            rightsizing_families: vec!["m5".to_string(), "t3".to_string()],
            volume_line_item: 50.0,
            data_transfer_out: 50.0,
            block_storage: 100.0,
            storage_tiering: 20.0,
        }
    }
}

impl SavingsConfig {
    pub fn validate(&self) -> Result<(), CoreError> {
        let thresholds = [
            ("savings.high_cost_instance", self.high_cost_instance),
            ("savings.rightsizing_line_item", self.rightsizing_line_item),
            ("savings.rightsizing_total", self.rightsizing_total),
            ("savings.volume_line_item", self.volume_line_item),
            ("savings.data_transfer_out", self.data_transfer_out),
            ("savings.block_storage", self.block_storage),
            ("savings.storage_tiering", self.storage_tiering),
        ];
        for (name, value) in thresholds {
            if !value.is_finite() || value < 0.0 {
                return Err(CoreError::invalid_config(format!(
                    "{} must be >= 0, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Digest (LLM prompt summary) settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DigestConfig {
    /// Rows beyond this are ignored and the digest is marked truncated
    pub max_rows: usize,
    pub top_services: usize,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            max_rows: 50_000,
            top_services: 5,
        }
    }
}

impl DigestConfig {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.max_rows == 0 {
            return Err(CoreError::invalid_config("digest.max_rows must be at least 1"));
        }
        Ok(())
    }
}

impl AnalyticsConfig {
    /// Check every section, failing on the first out-of-range value
    pub fn validate(&self) -> Result<(), CoreError> {
        self.anomaly.validate()?;
        self.forecast.validate()?;
        self.resources.validate()?;
        self.savings.validate()?;
        self.digest.validate()
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str, path: &Path) -> Result<Self, CoreError> {
        let config: Self = toml::from_str(content).map_err(|e| CoreError::TomlParse {
            path: path.to_path_buf(),
            message: e.message().to_string(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load an explicitly requested config file. Missing or invalid files are errors.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CoreError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                CoreError::FileRead {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;
        let config = Self::from_toml_str(&content, path)?;
        tracing::debug!(path = %path.display(), "Loaded analytics config");
        Ok(config)
    }

    /// Load `<dir>/config.toml`, returning defaults when it is absent or broken.
    pub fn load_or_default(dir: &Path) -> Self {
        let path = dir.join(CONFIG_FILE_NAME);
        if !path.exists() {
            return Self::default();
        }
        match Self::load(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring config file, using defaults");
                Self::default()
            }
        }
    }

    /// Persist to `<dir>/config.toml`
    pub fn save(&self, dir: &Path) -> Result<PathBuf, CoreError> {
        std::fs::create_dir_all(dir).map_err(|e| CoreError::FileWrite {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = dir.join(CONFIG_FILE_NAME);
        std::fs::write(&path, self.to_toml_string()).map_err(|e| CoreError::FileWrite {
            path: path.clone(),
            source: e,
        })?;
        Ok(path)
    }

    /// Pretty TOML rendering (used by `costlens config`)
    pub fn to_toml_string(&self) -> String {
        // Plain structs of scalars always serialize
        toml::to_string_pretty(self).unwrap_or_default()
    }
}

/// Platform config directory for costlens (e.g. `~/.config/costlens`)
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("costlens"))
}
