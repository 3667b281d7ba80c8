//! Cost time series and breakdown shapes shared by the aggregator,
//! the forecaster and the CLI renderers.

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Bucket size for time series aggregation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// One bucket per calendar day, keyed `YYYY-MM-DD`
    Daily,
    /// One bucket per calendar month, keyed `YYYY-MM`
    Monthly,
}

impl Granularity {
    /// First day of the bucket containing `date`
    pub fn period_start(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Self::Daily => date,
            // Day 1 exists in every month
            Self::Monthly => date.with_day(1).unwrap_or(date),
        }
    }

    /// Period key for a date ("2024-03-15" daily, "2024-03" monthly)
    pub fn period_key(&self, date: NaiveDate) -> String {
        match self {
            Self::Daily => date.format("%Y-%m-%d").to_string(),
            Self::Monthly => date.format("%Y-%m").to_string(),
        }
    }

    /// Start of the bucket following the one that starts at `start`
    ///
    /// Returns `None` only at the end of chrono's representable range.
    pub fn next_period(&self, start: NaiveDate) -> Option<NaiveDate> {
        match self {
            Self::Daily => start.checked_add_days(Days::new(1)),
            Self::Monthly => self.period_start(start).checked_add_months(Months::new(1)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Monthly => "monthly",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "daily" | "day" | "d" => Ok(Self::Daily),
            "monthly" | "month" | "m" => Ok(Self::Monthly),
            other => Err(format!(
                "unknown granularity '{}' (expected: daily, monthly)",
                other
            )),
        }
    }
}

/// One aggregated bucket of a cost series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostPoint {
    /// Period key ("YYYY-MM-DD" or "YYYY-MM")
    pub period: String,
    /// First calendar day of the period
    pub date: NaiveDate,
    /// Total cost accumulated in the period
    pub cost: f64,
}

/// Chronologically sorted cost series.
///
/// Periods are unique. Periods with no qualifying records are absent,
/// never zero-filled: consumers must handle gaps themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostSeries {
    pub granularity: Granularity,
    pub points: Vec<CostPoint>,
}

impl CostSeries {
    pub fn empty(granularity: Granularity) -> Self {
        Self {
            granularity,
            points: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Sum of every bucket
    pub fn total(&self) -> f64 {
        self.points.iter().map(|p| p.cost).sum()
    }

    pub fn last(&self) -> Option<&CostPoint> {
        self.points.last()
    }

    /// Bucket for a given period key
    pub fn get(&self, period: &str) -> Option<&CostPoint> {
        self.points.iter().find(|p| p.period == period)
    }
}

/// Total cost attributed to one service (or region) name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceCost {
    pub name: String,
    pub cost: f64,
}

impl ServiceCost {
    pub fn new(name: impl Into<String>, cost: f64) -> Self {
        Self {
            name: name.into(),
            cost,
        }
    }
}
