//! Anomaly detection for unusual spikes/drops in daily spend
//!
//! Compares each day against a trailing window of the days that precede it
//! in the daily series. Days absent from the series (no cost-bearing
//! records) are skipped, not treated as zero.

use crate::analytics::aggregation::{daily_service_ledgers, CostLedger};
use crate::config::AnomalyConfig;
use crate::error::CoreError;
use chrono::NaiveDate;
use costlens_types::{AnomalyKind, AnomalyMethod, AnomalyRecord, BillingRecord};

/// Standard deviations at or below this fraction of the mean are rounding noise
const FLAT_WINDOW_TOLERANCE: f64 = 1e-9;

/// Statistical summary of a trailing window
#[derive(Debug, Clone, Copy)]
struct Statistics {
    mean: f64,
    std_dev: f64,
}

impl Statistics {
    /// Mean and population standard deviation (divides by `n`, not `n - 1`)
    ///
    /// A window of equal costs reports exactly zero deviation even when the
    /// cost is not representable in binary (e.g. `0.1`).
    fn compute(values: &[f64]) -> Option<Self> {
        let first = *values.first()?;
        if values.iter().all(|&v| v == first) {
            return Some(Self {
                mean: first,
                std_dev: 0.0,
            });
        }

        let count = values.len() as f64;
        let mean = values.iter().sum::<f64>() / count;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count;
        let mut std_dev = variance.sqrt();
        if std_dev <= FLAT_WINDOW_TOLERANCE * mean.abs().max(1.0) {
            std_dev = 0.0;
        }

        Some(Self { mean, std_dev })
    }

    fn z_score(&self, value: f64) -> f64 {
        if self.std_dev == 0.0 {
            return 0.0;
        }
        (value - self.mean) / self.std_dev
    }

    fn deviation_pct(&self, value: f64) -> f64 {
        if self.mean == 0.0 {
            return 0.0;
        }
        ((value - self.mean) / self.mean) * 100.0
    }
}

/// Detect anomalous days in a record set
///
/// # Algorithm (sigma, default)
/// - Aggregate to daily totals
/// - For each day `i >= window_size`, take the `window_size` preceding days
/// - Flag if `std_dev > 0` and `|cost - mean| > sigma_multiplier * std_dev`
/// - Spike when `cost > mean`, drop otherwise
///
/// # Algorithm (percentage)
/// - Same trailing window, flag when `mean > min_baseline` and the increase
///   over the mean exceeds `percent_threshold` percent. Drops are ignored.
///
/// # Requirements
/// - At least `window_size + 1` days of data, otherwise returns an empty vec
///
/// # Errors
/// `CoreError::InvalidConfig` when the configuration is out of range.
///
/// # Returns
/// One record per flagged day, chronological
pub fn detect_anomalies(
    records: &[BillingRecord],
    config: &AnomalyConfig,
) -> Result<Vec<AnomalyRecord>, CoreError> {
    config.validate()?;

    let days: Vec<(NaiveDate, CostLedger)> = daily_service_ledgers(records).into_iter().collect();
    let window = config.window_size;
    let required = window.saturating_add(1);

    if days.len() < required {
        tracing::debug!(
            days = days.len(),
            required,
            "Insufficient data for anomaly detection"
        );
        return Ok(Vec::new());
    }

    let totals: Vec<f64> = days.iter().map(|(_, ledger)| ledger.total()).collect();
    let mut anomalies = Vec::new();

    for i in window..days.len() {
        let Some(stats) = Statistics::compute(&totals[i - window..i]) else {
            continue;
        };
        let cost = totals[i];

        let flagged = match config.method {
            AnomalyMethod::Sigma => {
                // A flat window can never flag: avoids dividing by zero
                stats.std_dev > 0.0
                    && (cost - stats.mean).abs() > config.sigma_multiplier * stats.std_dev
            }
            AnomalyMethod::Percentage => {
                stats.mean > config.min_baseline
                    && stats.deviation_pct(cost) > config.percent_threshold
            }
        };

        if !flagged {
            continue;
        }

        let (date, ledger) = &days[i];
        let (std_dev, z_score) = match config.method {
            AnomalyMethod::Sigma => (Some(stats.std_dev), Some(stats.z_score(cost))),
            AnomalyMethod::Percentage => (None, None),
        };

        anomalies.push(AnomalyRecord {
            date: *date,
            cost,
            mean: stats.mean,
            std_dev,
            deviation: (cost - stats.mean).abs(),
            deviation_pct: stats.deviation_pct(cost),
            z_score,
            kind: if cost > stats.mean {
                AnomalyKind::Spike
            } else {
                AnomalyKind::Drop
            },
            method: config.method,
            top_services: ledger.top(config.top_contributors),
        });
    }

    tracing::debug!(
        method = %config.method,
        days = days.len(),
        flagged = anomalies.len(),
        "Anomaly detection complete"
    );

    Ok(anomalies)
}
