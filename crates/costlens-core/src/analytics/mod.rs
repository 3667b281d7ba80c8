//! Cost analytics over a normalized billing snapshot
//!
//! Provides period series, service/region breakdowns, anomaly detection,
//! flat-average forecasting, resource profiling, savings heuristics and a
//! prompt-sized digest. Every analytic is a pure function of the record set
//! plus its configuration section; none depends on another's output.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::config::AnalyticsConfig;
use crate::error::CoreError;
use costlens_types::{
    AnomalyRecord, BillingRecord, CostDigest, CostSeries, ResourceProfile, SavingsOpportunity,
    ServiceCost,
};

pub mod aggregation;
pub mod anomalies;
pub mod digest;
pub mod forecasting;
pub mod resources;
pub mod savings;


pub use aggregation::{
    aggregate_costs, daily_costs, daily_service_ledgers, monthly_costs, region_breakdown,
    service_breakdown, top_n, total_cost, CostLedger,
};
pub use anomalies::detect_anomalies;
pub use digest::build_digest;
pub use forecasting::{forecast_costs, forecast_from_series, Forecast};
pub use resources::{idle_candidates, profile_resources, top_expensive};
pub use savings::find_savings_opportunities;

/// Inclusive usage-date window applied before analysis
///
/// Either bound may be open. Undated records are dropped as soon as any
/// bound is set, since they cannot be placed inside the window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct DateRange {
    pub since: Option<NaiveDate>,
    pub until: Option<NaiveDate>,
}

impl DateRange {
    /// Unbounded range (keeps everything, including undated records)
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new(since: Option<NaiveDate>, until: Option<NaiveDate>) -> Self {
        Self { since, until }
    }

    pub fn is_unbounded(&self) -> bool {
        self.since.is_none() && self.until.is_none()
    }

    pub fn contains(&self, record: &BillingRecord) -> bool {
        if self.is_unbounded() {
            return true;
        }
        let Some(date) = record.usage_date else {
            return false;
        };
        self.since.is_none_or(|since| date >= since) && self.until.is_none_or(|until| date <= until)
    }

    /// Records inside the range, cloned into a new snapshot
    pub fn filter(&self, records: &[BillingRecord]) -> Vec<BillingRecord> {
        records.iter().filter(|r| self.contains(r)).cloned().collect()
    }

    /// Display label
    pub fn display(&self) -> String {
        match (self.since, self.until) {
            (None, None) => "All dates".to_string(),
            (Some(s), None) => format!("Since {}", s),
            (None, Some(u)) => format!("Until {}", u),
            (Some(s), Some(u)) => format!("{} to {}", s, u),
        }
    }
}

/// Every analytic computed over one snapshot
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsReport {
    pub record_count: usize,
    pub total_cost: f64,
    pub daily: CostSeries,
    pub monthly: CostSeries,
    /// Discovery order
    pub services: Vec<ServiceCost>,
    /// Discovery order
    pub regions: Vec<ServiceCost>,
    pub anomalies: Vec<AnomalyRecord>,
    pub forecast: Forecast,
    /// Discovery order
    pub resources: Vec<ResourceProfile>,
    pub savings: Vec<SavingsOpportunity>,
    pub digest: CostDigest,
    /// Timestamp of computation
    pub computed_at: DateTime<Utc>,
}

impl AnalyticsReport {
    /// Compute every analytic (sync)
    ///
    /// The configuration is validated once up front so that no partial
    /// report is ever built from an out-of-range setting.
    ///
    /// # Performance
    /// Each analytic is a single pass plus a sort; 100k rows stays well
    /// under a second.
    pub fn compute(records: &[BillingRecord], config: &AnalyticsConfig) -> Result<Self, CoreError> {
        config.validate()?;

        let monthly = monthly_costs(records);
        let forecast = forecast_from_series(&monthly, config.forecast.horizon, &config.forecast)?;

        let report = Self {
            record_count: records.len(),
            total_cost: total_cost(records),
            daily: daily_costs(records),
            monthly,
            services: service_breakdown(records),
            regions: region_breakdown(records),
            anomalies: detect_anomalies(records, &config.anomaly)?,
            forecast,
            resources: profile_resources(records, &config.resources)?,
            savings: find_savings_opportunities(records, &config.savings)?,
            digest: build_digest(records, &config.digest, &config.resources)?,
            computed_at: Utc::now(),
        };

        tracing::debug!(
            records = report.record_count,
            days = report.daily.len(),
            anomalies = report.anomalies.len(),
            resources = report.resources.len(),
            "Analytics report computed"
        );

        Ok(report)
    }

    /// Compute over the records inside `range` only
    pub fn compute_in_range(
        records: &[BillingRecord],
        range: DateRange,
        config: &AnalyticsConfig,
    ) -> Result<Self, CoreError> {
        if range.is_unbounded() {
            return Self::compute(records, config);
        }
        Self::compute(&range.filter(records), config)
    }
}
