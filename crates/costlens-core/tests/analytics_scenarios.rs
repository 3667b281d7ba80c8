//! End-to-end analytics over a CUR-style fixture
//!
//! Run with:
//! ```bash
//! cargo test --test analytics_scenarios
//! ```

use chrono::NaiveDate;
use costlens_core::analytics::{
    detect_anomalies, idle_candidates, region_breakdown, service_breakdown, top_expensive, top_n,
    AnalyticsReport, DateRange,
};
use costlens_core::config::{AnalyticsConfig, AnomalyConfig};
use costlens_core::load_billing_csv;
use costlens_types::{AnomalyKind, BillingRecord, OpportunityKind};
use std::path::PathBuf;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/cur_sample.csv")
}

fn fixture_records() -> Vec<BillingRecord> {
    load_billing_csv(&fixture_path())
        .expect("fixture should load")
        .records
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_fixture_totals() {
    let report = AnalyticsReport::compute(&fixture_records(), &AnalyticsConfig::default()).unwrap();

    assert_eq!(report.record_count, 35);
    assert!((report.total_cost - 1101.0).abs() < 1e-6);
    // The undated support charge only counts toward the grand total
    assert!((report.daily.total() - 1097.0).abs() < 1e-6);
    assert_eq!(report.daily.len(), 17);

    let months: Vec<_> = report
        .monthly
        .points
        .iter()
        .map(|p| (p.period.as_str(), p.cost))
        .collect();
    assert_eq!(months, vec![("2024-01", 977.0), ("2024-02", 120.0)]);
}

#[test]
fn test_fixture_breakdowns() {
    let records = fixture_records();

    let services = service_breakdown(&records);
    let top = top_n(&services, 2);
    assert_eq!(top[0].name, "Compute Instance");
    assert_eq!(top[0].cost, 887.0);
    assert_eq!(top[1].name, "Storage");

    let regions = region_breakdown(&records);
    let names: Vec<_> = regions.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["us-east-1", "eu-west-1", "Unknown Region"]);
    assert_eq!(regions[2].cost, 4.0);
}

#[test]
fn test_fixture_spike_detected_with_contributors() {
    let anomalies = detect_anomalies(&fixture_records(), &AnomalyConfig::default()).unwrap();

    assert_eq!(anomalies.len(), 1);
    let spike = &anomalies[0];
    assert_eq!(spike.date, date(2024, 1, 15));
    assert_eq!(spike.kind, AnomalyKind::Spike);
    assert_eq!(spike.cost, 675.0);

    let names: Vec<_> = spike.top_services.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Compute Instance", "Data Transfer"]);
}

#[test]
fn test_fixture_forecast() {
    let report = AnalyticsReport::compute(&fixture_records(), &AnalyticsConfig::default()).unwrap();
    let forecast = &report.forecast;

    assert_eq!(forecast.lookback_used, 2);
    assert_eq!(forecast.average, Some(548.5));
    let projected: Vec<_> = forecast.projected().map(|p| p.period.as_str()).collect();
    assert_eq!(projected, vec!["2024-03", "2024-04", "2024-05"]);
}

#[test]
fn test_fixture_resources() {
    let report = AnalyticsReport::compute(&fixture_records(), &AnalyticsConfig::default()).unwrap();

    let top: Vec<_> = top_expensive(&report.resources, 3)
        .into_iter()
        .map(|p| p.resource_id)
        .collect();
    assert_eq!(top, vec!["i-0batch", "i-0web", "vol-0data"]);

    let idle = idle_candidates(&report.resources, 3);
    assert_eq!(idle.len(), 1);
    assert_eq!(idle[0].resource_id, "eipalloc-1");
    assert_eq!(idle[0].duration_days, 21);
    assert_eq!(idle[0].occurrences, 2);

    let web = report
        .resources
        .iter()
        .find(|p| p.resource_id == "i-0web")
        .unwrap();
    assert_eq!(web.first_seen, Some(date(2024, 1, 1)));
    assert_eq!(web.last_seen, Some(date(2024, 1, 14)));
    assert_eq!(web.duration_days, 14);
}

#[test]
fn test_fixture_savings() {
    let report = AnalyticsReport::compute(&fixture_records(), &AnalyticsConfig::default()).unwrap();

    let kinds: Vec<_> = report.savings.iter().map(|o| o.kind).collect();
    assert_eq!(
        kinds,
        vec![
            OpportunityKind::HighCostInstance,
            OpportunityKind::HighCostVolume,
            OpportunityKind::HighDataTransferOut,
            OpportunityKind::HighBlockStorage,
        ]
    );
    assert_eq!(report.savings[0].resource_id.as_deref(), Some("i-0batch"));
    assert!(report.savings[0].issue.contains("p3.2xlarge"));
    assert_eq!(report.savings[1].resource_id.as_deref(), Some("vol-0data"));
    assert_eq!(report.savings[1].cost, 120.0);
    assert_eq!(report.savings[3].region, "eu-west-1");
}

#[test]
fn test_fixture_digest() {
    let report = AnalyticsReport::compute(&fixture_records(), &AnalyticsConfig::default()).unwrap();
    let digest = &report.digest;

    assert_eq!(digest.rows_considered, 35);
    assert!(!digest.data_truncated);
    assert_eq!(digest.top_services.len(), 5);
    assert_eq!(digest.top_resources[0].resource_id, "i-0batch");
    assert_eq!(digest.idle_resources.len(), 1);
}

#[test]
fn test_february_only_range() {
    let range = DateRange::new(Some(date(2024, 2, 1)), None);
    let report =
        AnalyticsReport::compute_in_range(&fixture_records(), range, &AnalyticsConfig::default())
            .unwrap();

    assert_eq!(report.record_count, 2);
    assert_eq!(report.total_cost, 120.0);
    assert!(report.anomalies.is_empty());
}
