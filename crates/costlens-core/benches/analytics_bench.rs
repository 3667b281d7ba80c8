//! Performance benchmarks for the analytics module
//!
//! Targets:
//! - daily_costs(100k rows) → <50ms
//! - detect_anomalies(365 days) → <20ms
//! - profile_resources(100k rows) → <100ms
//! - AnalyticsReport::compute(100k rows) → <500ms

use chrono::{Days, NaiveDate};
use costlens_core::analytics::{
    daily_costs, detect_anomalies, forecast_costs, monthly_costs, profile_resources,
    service_breakdown, AnalyticsReport,
};
use costlens_core::config::{AnalyticsConfig, AnomalyConfig, ForecastConfig, ResourceConfig};
use costlens_core::parsers::parse_billing_csv;
use costlens_types::BillingRecord;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

const SERVICES: [&str; 5] = [
    "Compute Instance",
    "Storage",
    "Data Transfer",
    "Database Instance",
    "API Request",
];

/// Generate billing records spread over `days` days
fn generate_test_records(count: usize, days: usize) -> Vec<BillingRecord> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    (0..count)
        .map(|i| {
            let date = start.checked_add_days(Days::new((i % days) as u64));
            BillingRecord::new(date, 0.01 + (i % 97) as f64 * 0.37)
                .with_service(SERVICES[i % SERVICES.len()])
                .with_region(if i % 2 == 0 { "us-east-1" } else { "eu-west-1" })
                .with_resource(format!("res-{}", i % 2000))
                .with_usage_type(format!("USE1-Usage-{}", i % 7))
        })
        .collect()
}

/// Render records as a CUR-style CSV document
fn generate_test_csv(count: usize, days: usize) -> String {
    let mut out = String::from(
        "lineItem/UsageStartDate,lineItem/UnblendedCost,product/ProductFamily,lineItem/ResourceId,product/region\n",
    );
    for record in generate_test_records(count, days) {
        let date = record
            .usage_date
            .map(|d| d.format("%Y-%m-%dT00:00:00Z").to_string())
            .unwrap_or_default();
        out.push_str(&format!(
            "{},{:.6},{},{},{}\n",
            date,
            record.unblended_cost,
            record.service,
            record.resource_id.unwrap_or_default(),
            record.region
        ));
    }
    out
}

/// Benchmark 1: CSV parsing
fn parse_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_billing_csv");

    for count in [1_000, 10_000] {
        let csv = generate_test_csv(count, 90);
        group.bench_with_input(BenchmarkId::new("rows", count), &csv, |b, csv| {
            b.iter(|| {
                black_box(parse_billing_csv(csv.as_bytes()).unwrap());
            });
        });
    }

    group.finish();
}

/// Benchmark 2: period and service aggregation
fn aggregation_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregation");

    for count in [1_000, 100_000] {
        let records = generate_test_records(count, 365);
        group.bench_with_input(BenchmarkId::new("daily", count), &records, |b, records| {
            b.iter(|| black_box(daily_costs(records)));
        });
        group.bench_with_input(BenchmarkId::new("monthly", count), &records, |b, records| {
            b.iter(|| black_box(monthly_costs(records)));
        });
        group.bench_with_input(BenchmarkId::new("services", count), &records, |b, records| {
            b.iter(|| black_box(service_breakdown(records)));
        });
    }

    group.finish();
}

/// Benchmark 3: anomaly detection with varying day counts
fn anomalies_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("detect_anomalies");
    let config = AnomalyConfig::default();

    for days in [30, 90, 365] {
        let records = generate_test_records(days * 20, days);
        group.bench_with_input(BenchmarkId::new("days", days), &records, |b, records| {
            b.iter(|| black_box(detect_anomalies(records, &config).unwrap()));
        });
    }

    group.finish();
}

/// Benchmark 4: forecast and resource profiling
fn forecast_and_resources_benchmark(c: &mut Criterion) {
    let records = generate_test_records(100_000, 365);

    c.bench_function("forecast_costs_100k", |b| {
        b.iter(|| black_box(forecast_costs(&records, 3, &ForecastConfig::default()).unwrap()));
    });

    c.bench_function("profile_resources_100k", |b| {
        b.iter(|| black_box(profile_resources(&records, &ResourceConfig::default()).unwrap()));
    });
}

/// Benchmark 5: full report (end-to-end)
fn report_benchmark(c: &mut Criterion) {
    let records = generate_test_records(100_000, 365);
    let config = AnalyticsConfig::default();

    c.bench_function("analytics_report_100k", |b| {
        b.iter(|| black_box(AnalyticsReport::compute(&records, &config).unwrap()));
    });
}

criterion_group!(
    benches,
    parse_benchmark,
    aggregation_benchmark,
    anomalies_benchmark,
    forecast_and_resources_benchmark,
    report_benchmark
);
criterion_main!(benches);
