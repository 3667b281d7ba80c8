use serde::{Deserialize, Serialize};

/// One point of a forecast chart.
///
/// Historical points carry the aggregated cost; synthetic points carry the
/// trailing average verbatim (flat projection, no trend).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// Period label ("YYYY-MM" for monthly forecasts)
    pub period: String,
    pub cost: f64,
    pub is_forecast: bool,
}

impl ForecastPoint {
    pub fn historical(period: impl Into<String>, cost: f64) -> Self {
        Self {
            period: period.into(),
            cost,
            is_forecast: false,
        }
    }

    pub fn forecast(period: impl Into<String>, cost: f64) -> Self {
        Self {
            period: period.into(),
            cost,
            is_forecast: true,
        }
    }
}
