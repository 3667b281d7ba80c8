use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::series::ServiceCost;

/// Direction of a flagged deviation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnomalyKind {
    /// Observed cost above the trailing mean
    Spike,
    /// Observed cost at or below the trailing mean
    Drop,
}

impl AnomalyKind {
    /// Human label ("Cost Spike" / "Cost Drop")
    pub fn label(&self) -> &'static str {
        match self {
            Self::Spike => "Cost Spike",
            Self::Drop => "Cost Drop",
        }
    }

    /// Icon representation for terminal display
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Spike => "▲",
            Self::Drop => "▼",
        }
    }
}

impl fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Detection algorithm.
///
/// The two methods are not equivalent and are never blended: `Sigma` is
/// the default, `Percentage` must be selected explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnomalyMethod {
    /// |cost - mean| > k * population std-dev of the trailing window
    #[default]
    Sigma,
    /// Increase over the trailing mean above a percent threshold (spikes only)
    Percentage,
}

impl AnomalyMethod {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sigma => "sigma",
            Self::Percentage => "percentage",
        }
    }
}

impl fmt::Display for AnomalyMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AnomalyMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sigma" | "stddev" | "zscore" => Ok(Self::Sigma),
            "percentage" | "percent" | "pct" => Ok(Self::Percentage),
            other => Err(format!(
                "unknown anomaly method '{}' (expected: sigma, percentage)",
                other
            )),
        }
    }
}

/// One flagged day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyRecord {
    pub date: NaiveDate,
    /// Total cost observed that day
    pub cost: f64,
    /// Mean of the trailing window
    pub mean: f64,
    /// Population std-dev of the trailing window (sigma method only)
    pub std_dev: Option<f64>,
    /// |cost - mean|
    pub deviation: f64,
    /// (cost - mean) / mean * 100, or 0 when the mean is 0
    pub deviation_pct: f64,
    /// (cost - mean) / std_dev (sigma method only)
    pub z_score: Option<f64>,
    pub kind: AnomalyKind,
    pub method: AnomalyMethod,
    /// Highest-cost services of the day, cost descending
    pub top_services: Vec<ServiceCost>,
}

impl AnomalyRecord {
    /// Format deviation as percentage with sign
    pub fn format_deviation(&self) -> String {
        let sign = if self.deviation_pct >= 0.0 { "+" } else { "" };
        format!("{}{:.0}%", sign, self.deviation_pct)
    }

    /// "Service: $12.34" entries joined with ", "
    pub fn format_contributors(&self) -> String {
        self.top_services
            .iter()
            .map(|s| format!("{}: ${:.2}", s.name, s.cost))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
