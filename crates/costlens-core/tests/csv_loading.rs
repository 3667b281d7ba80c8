//! Billing CSV loading and config resolution against real files
//!
//! Run with:
//! ```bash
//! cargo test --test csv_loading
//! ```

use costlens_core::config::{AnalyticsConfig, CONFIG_FILE_NAME};
use costlens_core::error::CoreError;
use costlens_core::parsers::{load_billing_csv, parse_billing_csv, BillingCsvParser};
use costlens_core::LoadReport;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/cur_sample.csv")
}

#[test]
fn test_fixture_load_report() {
    let data = load_billing_csv(&fixture_path()).unwrap();

    assert_eq!(data.report.rows_read, 35);
    assert_eq!(data.report.rows_skipped, 0);
    assert_eq!(data.report.rows_without_cost, 1);
    assert_eq!(data.report.rows_without_date, 1);
    assert_eq!(data.report.rows_loaded(), 35);
    assert!(!data.report.has_errors());

    let batch = data
        .records
        .iter()
        .find(|r| r.resource_id.as_deref() == Some("i-0batch"))
        .unwrap();
    assert_eq!(batch.instance_type.as_deref(), Some("p3.2xlarge"));
    assert_eq!(
        batch.product_name.as_deref(),
        Some("Amazon Elastic Compute Cloud")
    );
}

#[test]
fn test_header_punctuation_and_case_are_ignored() {
    let csv = "\
LINEITEM_USAGESTARTDATE,Line Item: Unblended Cost,Product-Region,Product.ServiceCode
01/15/2024,2.5,ap-south-1,AmazonRDS
2024-01-16 08:30:00,1.25,,AmazonRDS
";
    let data = parse_billing_csv(csv.as_bytes()).unwrap();
    assert_eq!(data.records.len(), 2);

    let first = &data.records[0];
    assert_eq!(
        first.usage_date,
        chrono::NaiveDate::from_ymd_opt(2024, 1, 15)
    );
    assert_eq!(first.unblended_cost, 2.5);
    assert_eq!(first.region, "ap-south-1");
    assert_eq!(first.service, "AmazonRDS");

    assert_eq!(data.records[1].region, "Unknown Region");
}

#[test]
fn test_ragged_rows_are_tolerated() {
    let csv = "\
lineItem/UsageStartDate,lineItem/UnblendedCost,product/region
2024-01-01,1.0
2024-01-02,2.0,us-east-1,extra
";
    let data = parse_billing_csv(csv.as_bytes()).unwrap();
    assert_eq!(data.records.len(), 2);
    assert_eq!(data.records[0].region, "Unknown Region");
    assert_eq!(data.records[1].region, "us-east-1");
}

#[test]
fn test_missing_file_is_reported() {
    let err = load_billing_csv(&PathBuf::from("/nonexistent/billing.csv")).unwrap_err();
    assert!(matches!(err, CoreError::FileNotFound { .. }));

    let mut report = LoadReport::new();
    let records = BillingCsvParser::new()
        .parse_graceful(&PathBuf::from("/nonexistent/billing.csv"), &mut report);
    assert!(records.is_empty());
    assert!(report.has_errors());
}

#[test]
fn test_config_file_round_trip_on_disk() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        "[anomaly]\nsigma_multiplier = 3.0\n\n[digest]\nmax_rows = 10\n",
    )
    .unwrap();

    let config = AnalyticsConfig::load(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
    assert_eq!(config.anomaly.sigma_multiplier, 3.0);
    assert_eq!(config.anomaly.window_size, 7);
    assert_eq!(config.digest.max_rows, 10);

    let saved = config.save(&dir.path().join("copy")).unwrap();
    let reloaded = AnalyticsConfig::load(&saved).unwrap();
    assert_eq!(reloaded, config);
}
