//! Flat moving-average cost forecast
//!
//! Projects the mean of the most recent periods forward unchanged. This is
//! deliberately not a regression or seasonal model: every projected period
//! carries exactly the trailing average.

use crate::analytics::aggregation::monthly_costs;
use crate::config::ForecastConfig;
use crate::error::CoreError;
use costlens_types::{BillingRecord, CostSeries, ForecastPoint, Granularity};
use serde::Serialize;

/// Historical series followed by the projected periods
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    pub granularity: Granularity,
    /// Historical points first, then `horizon` projected points
    pub points: Vec<ForecastPoint>,
    /// Trailing average used for every projected point (None without history)
    pub average: Option<f64>,
    /// Number of historical periods the average was computed from
    pub lookback_used: usize,
}

impl Forecast {
    pub fn historical(&self) -> impl Iterator<Item = &ForecastPoint> {
        self.points.iter().filter(|p| !p.is_forecast)
    }

    pub fn projected(&self) -> impl Iterator<Item = &ForecastPoint> {
        self.points.iter().filter(|p| p.is_forecast)
    }

    /// Sum of every projected period
    pub fn projected_total(&self) -> f64 {
        self.projected().map(|p| p.cost).sum()
    }

    /// True when no projection could be made
    pub fn is_unavailable(&self) -> bool {
        self.average.is_none()
    }
}

/// Forecast `horizon` periods past the end of `history`
///
/// # Algorithm
/// - `L = min(lookback_periods, history.len())`
/// - `L == 0`: history returned unchanged, no projection
/// - otherwise average the last `L` costs and emit it for each following
///   period, stepping one calendar month (monthly) or day (daily) at a time
///
/// # Errors
/// `CoreError::InvalidConfig` when `lookback_periods` is 0.
pub fn forecast_from_series(
    history: &CostSeries,
    horizon: usize,
    config: &ForecastConfig,
) -> Result<Forecast, CoreError> {
    config.validate()?;

    let granularity = history.granularity;
    let mut points: Vec<ForecastPoint> = history
        .points
        .iter()
        .map(|p| ForecastPoint::historical(p.period.clone(), p.cost))
        .collect();

    let lookback = config.lookback_periods.min(history.len());
    let Some(last) = history.last().filter(|_| lookback > 0) else {
        return Ok(Forecast {
            granularity,
            points,
            average: None,
            lookback_used: 0,
        });
    };

    let recent = &history.points[history.len() - lookback..];
    let average = recent.iter().map(|p| p.cost).sum::<f64>() / lookback as f64;

    let mut period_start = last.date;
    for _ in 0..horizon {
        let Some(next) = granularity.next_period(period_start) else {
            tracing::warn!(last = %period_start, "Forecast horizon exceeds representable dates");
            break;
        };
        period_start = next;
        points.push(ForecastPoint::forecast(
            granularity.period_key(period_start),
            average,
        ));
    }

    Ok(Forecast {
        granularity,
        points,
        average: Some(average),
        lookback_used: lookback,
    })
}

/// Aggregate records by month, then forecast `horizon` months ahead
pub fn forecast_costs(
    records: &[BillingRecord],
    horizon: usize,
    config: &ForecastConfig,
) -> Result<Forecast, CoreError> {
    forecast_from_series(&monthly_costs(records), horizon, config)
}
