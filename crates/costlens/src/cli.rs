//! CLI helpers: date filters and table/JSON formatters
//!
//! Every formatter renders either a comfy-table (human) or pretty JSON.

use anyhow::{Context, Result};
use chrono::{Months, NaiveDate};
use comfy_table::{Cell, CellAlignment, Color, ContentArrangement, Row, Table};
use costlens_core::analytics::{AnalyticsReport, DateRange, Forecast};
use costlens_core::LoadReport;
use costlens_types::{
    AnomalyKind, AnomalyRecord, BillingRecord, CostSeries, ResourceProfile, SavingsOpportunity,
    ServiceCost,
};
use serde::Serialize;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug)]
pub enum CliError {
    NoData {
        path: String,
        rows: usize,
    },
    Core(costlens_core::error::CoreError),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::NoData { path, rows } => {
                write!(
                    f,
                    "No billable rows in '{}' ({} rows read, date filters applied)",
                    path, rows
                )
            }
            CliError::Core(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CliError {}

impl From<costlens_core::error::CoreError> for CliError {
    fn from(e: costlens_core::error::CoreError) -> Self {
        CliError::Core(e)
    }
}

// ============================================================================
// Date Filter
// ============================================================================

/// Date bound for `--since` / `--until`
///
/// Relative forms count back from the latest usage date in the export, not
/// from today, so old exports stay analyzable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFilter {
    Days(u32),
    Months(u32),
    Years(u32),
    On(NaiveDate),
}

impl DateFilter {
    /// Parse from string: "7d", "30d", "3m", "1y", "YYYY-MM-DD"
    pub fn parse(s: &str) -> Result<Self> {
        if let Some(stripped) = s.strip_suffix('d') {
            let days = stripped
                .parse::<u32>()
                .context("Invalid days format (expected: 7d)")?;
            return Ok(DateFilter::Days(days));
        }

        if let Some(stripped) = s.strip_suffix('m') {
            let months = stripped
                .parse::<u32>()
                .context("Invalid months format (expected: 3m)")?;
            return Ok(DateFilter::Months(months));
        }

        if let Some(stripped) = s.strip_suffix('y') {
            let years = stripped
                .parse::<u32>()
                .context("Invalid years format (expected: 1y)")?;
            return Ok(DateFilter::Years(years));
        }

        let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").context("Invalid date format")?;
        Ok(DateFilter::On(date))
    }

    /// Resolve to a calendar date relative to `anchor`
    pub fn resolve(&self, anchor: NaiveDate) -> NaiveDate {
        let back = match self {
            DateFilter::Days(d) => anchor.checked_sub_days(chrono::Days::new(*d as u64)),
            DateFilter::Months(m) => anchor.checked_sub_months(Months::new(*m)),
            DateFilter::Years(y) => anchor.checked_sub_months(Months::new(y.saturating_mul(12))),
            DateFilter::On(date) => return *date,
        };
        back.unwrap_or(NaiveDate::MIN)
    }
}

/// Build the analysis range from optional `--since` / `--until` arguments
pub fn resolve_range(
    since: Option<&str>,
    until: Option<&str>,
    records: &[BillingRecord],
) -> Result<DateRange> {
    if since.is_none() && until.is_none() {
        return Ok(DateRange::all());
    }

    let anchor = records
        .iter()
        .filter_map(|r| r.usage_date)
        .max()
        .unwrap_or(NaiveDate::MAX);

    let since = since
        .map(DateFilter::parse)
        .transpose()
        .context("Invalid --since filter")?
        .map(|f| f.resolve(anchor));
    let until = until
        .map(DateFilter::parse)
        .transpose()
        .context("Invalid --until filter")?
        .map(|f| f.resolve(anchor));

    Ok(DateRange::new(since, until))
}

// ============================================================================
// Formatters
// ============================================================================

fn to_json<T: Serialize + ?Sized>(value: &T, fallback: &str) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| fallback.to_string())
}

fn new_table(headers: &[&str], no_color: bool) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    // Apply colors only if enabled
    if no_color {
        table.set_header(headers.to_vec());
    } else {
        table.set_header(
            headers
                .iter()
                .map(|h| Cell::new(h).fg(Color::Cyan))
                .collect::<Vec<_>>(),
        );
    }
    table
}

fn money_cell(cost: f64) -> Cell {
    Cell::new(format_cost(cost)).set_alignment(CellAlignment::Right)
}

/// Overall summary (human or JSON)
pub fn format_summary(report: &AnalyticsReport, json: bool) -> String {
    if json {
        return to_json(report, "{}");
    }

    let mut lines = vec![];
    lines.push(format!("Total cost:       {}", format_cost(report.total_cost)));
    lines.push(format!("Rows:             {}", report.record_count));
    match (report.daily.points.first(), report.daily.last()) {
        (Some(first), Some(last)) => lines.push(format!(
            "Usage dates:      {} to {} ({} days with spend)",
            first.period,
            last.period,
            report.daily.len()
        )),
        _ => lines.push("Usage dates:      -".to_string()),
    }
    lines.push(format!("Months:           {}", report.monthly.len()));
    lines.push(format!("Services:         {}", report.services.len()));
    lines.push(format!("Regions:          {}", report.regions.len()));
    lines.push(format!("Resources:        {}", report.resources.len()));
    lines.push(format!(
        "Idle candidates:  {}",
        report.resources.iter().filter(|p| p.idle_candidate).count()
    ));
    lines.push(format!("Anomalies:        {}", report.anomalies.len()));
    lines.push(format!("Savings findings: {}", report.savings.len()));

    if let Some(next) = report.forecast.projected().next() {
        lines.push(format!(
            "Next period:      {} (forecast {})",
            format_cost(next.cost),
            next.period
        ));
    }

    if !report.digest.top_services.is_empty() {
        lines.push(String::new());
        lines.push("Top services:".to_string());
        for service in &report.digest.top_services {
            lines.push(format!(
                "  {}: {} ({:.1}%)",
                service.name,
                format_cost(service.cost),
                share(service.cost, report.total_cost)
            ));
        }
    }

    lines.join("\n")
}

/// Cost series as table (human) or JSON
pub fn format_series(series: &CostSeries, json: bool, no_color: bool) -> String {
    if json {
        return to_json(series, "{}");
    }

    if series.is_empty() {
        return "No dated costs found.".to_string();
    }

    let label = match series.granularity {
        costlens_types::Granularity::Daily => "Date",
        costlens_types::Granularity::Monthly => "Month",
    };
    let mut table = new_table(&[label, "Cost"], no_color);
    for point in &series.points {
        table.add_row(Row::from(vec![Cell::new(&point.period), money_cell(point.cost)]));
    }
    table.add_row(Row::from(vec![Cell::new("Total"), money_cell(series.total())]));

    table.to_string()
}

/// Service or region breakdown as table (human) or JSON
pub fn format_breakdown(
    label: &str,
    items: &[ServiceCost],
    total: f64,
    json: bool,
    no_color: bool,
) -> String {
    if json {
        return to_json(items, "[]");
    }

    if items.is_empty() {
        return "No costs found.".to_string();
    }

    let mut table = new_table(&[label, "Cost", "Share"], no_color);
    for item in items {
        table.add_row(Row::from(vec![
            Cell::new(truncate(&item.name, 40)),
            money_cell(item.cost),
            Cell::new(format!("{:.1}%", share(item.cost, total)))
                .set_alignment(CellAlignment::Right),
        ]));
    }

    table.to_string()
}

/// Anomalies as table (human) or JSON
pub fn format_anomalies(anomalies: &[AnomalyRecord], json: bool, no_color: bool) -> String {
    if json {
        return to_json(anomalies, "[]");
    }

    if anomalies.is_empty() {
        return "No anomalies detected.".to_string();
    }

    let mut table = new_table(
        &["Date", "Type", "Cost", "Mean", "Deviation", "Top Services"],
        no_color,
    );
    for anomaly in anomalies {
        let kind = Cell::new(format!("{} {}", anomaly.kind.icon(), anomaly.kind.label()));
        let kind = if no_color {
            kind
        } else {
            kind.fg(match anomaly.kind {
                AnomalyKind::Spike => Color::Red,
                AnomalyKind::Drop => Color::Yellow,
            })
        };

        table.add_row(Row::from(vec![
            Cell::new(anomaly.date.format("%Y-%m-%d")),
            kind,
            money_cell(anomaly.cost),
            money_cell(anomaly.mean),
            Cell::new(anomaly.format_deviation()).set_alignment(CellAlignment::Right),
            Cell::new(anomaly.format_contributors()),
        ]));
    }

    table.to_string()
}

/// Forecast as table (human) or JSON
pub fn format_forecast(forecast: &Forecast, json: bool, no_color: bool) -> String {
    if json {
        return to_json(forecast, "{}");
    }

    if forecast.is_unavailable() {
        return "Not enough history to forecast.".to_string();
    }

    let mut table = new_table(&["Period", "Cost", ""], no_color);
    for point in &forecast.points {
        let marker = if point.is_forecast { "forecast" } else { "" };
        let marker = if no_color || !point.is_forecast {
            Cell::new(marker)
        } else {
            Cell::new(marker).fg(Color::DarkGrey)
        };
        table.add_row(Row::from(vec![
            Cell::new(&point.period),
            money_cell(point.cost),
            marker,
        ]));
    }

    let mut out = table.to_string();
    out.push_str(&format!(
        "\n\nAverage of last {} periods: {}",
        forecast.lookback_used,
        format_cost(forecast.average.unwrap_or_default())
    ));
    out
}

/// Resource profiles as table (human) or JSON
pub fn format_resources(profiles: &[ResourceProfile], json: bool, no_color: bool) -> String {
    if json {
        return to_json(profiles, "[]");
    }

    if profiles.is_empty() {
        return "No resources found.".to_string();
    }

    let mut table = new_table(
        &["Resource", "Service", "Cost", "Avg/Item", "Seen", "Days", "Usage Types", "Idle"],
        no_color,
    );
    for profile in profiles {
        let idle = if profile.idle_candidate { "yes" } else { "" };
        let idle = if no_color || !profile.idle_candidate {
            Cell::new(idle)
        } else {
            Cell::new(idle).fg(Color::Yellow)
        };
        table.add_row(Row::from(vec![
            Cell::new(shorten_resource(&profile.resource_id)),
            Cell::new(truncate(&profile.service, 24)),
            money_cell(profile.total_cost),
            money_cell(profile.cost_per_occurrence()),
            Cell::new(profile.occurrences),
            Cell::new(profile.duration_days),
            Cell::new(truncate(&profile.usage_types_display(), 40)),
            idle,
        ]));
    }

    table.to_string()
}

/// Savings opportunities as table (human) or JSON
pub fn format_savings(opportunities: &[SavingsOpportunity], json: bool, no_color: bool) -> String {
    if json {
        return to_json(opportunities, "[]");
    }

    if opportunities.is_empty() {
        return "No savings opportunities found.".to_string();
    }

    let mut table = new_table(&["Finding", "Resource", "Region", "Cost", "Suggestion"], no_color);
    for opportunity in opportunities {
        table.add_row(Row::from(vec![
            Cell::new(opportunity.kind.label()),
            Cell::new(
                opportunity
                    .resource_id
                    .as_deref()
                    .map(shorten_resource)
                    .unwrap_or_else(|| "-".to_string()),
            ),
            Cell::new(&opportunity.region),
            money_cell(opportunity.cost),
            Cell::new(&opportunity.suggestion),
        ]));
    }

    table.to_string()
}

/// Load warnings for stderr, one per line
///
/// Row-level counters are reported even when the CSV itself decoded cleanly.
pub fn format_load_warnings(report: &LoadReport) -> Option<String> {
    if !report.has_errors() && report.rows_without_cost == 0 && report.rows_without_date == 0 {
        return None;
    }

    let header = if report.has_errors() {
        let (warnings, errors, fatal) = report.error_count();
        format!(
            "Warnings: {} warning(s), {} error(s), {} fatal",
            warnings, errors, fatal
        )
    } else {
        "Warnings:".to_string()
    };

    let mut lines = vec![header];
    for error in &report.errors {
        lines.push(format!("  - {}: {}", error.source, error.message));
        if let Some(suggestion) = &error.suggestion {
            lines.push(format!("    {}", suggestion));
        }
    }
    if report.rows_without_cost > 0 {
        lines.push(format!(
            "  - {} rows had no usable cost",
            report.rows_without_cost
        ));
    }
    if report.rows_without_date > 0 {
        lines.push(format!(
            "  - {} rows had no usage date (excluded from trends)",
            report.rows_without_date
        ));
    }
    Some(lines.join("\n"))
}

// ============================================================================
// Utilities
// ============================================================================

pub fn format_cost(cost: f64) -> String {
    if cost >= 1_000_000.0 {
        format!("${:.2}M", cost / 1_000_000.0)
    } else {
        format!("${:.2}", cost)
    }
}

fn share(cost: f64, total: f64) -> f64 {
    if total > 0.0 {
        cost / total * 100.0
    } else {
        0.0
    }
}

fn truncate(s: &str, max: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max {
        s.to_string()
    } else {
        s.chars().take(max - 1).collect::<String>() + "…"
    }
}

/// Keep the final ARN segment (`arn:aws:s3:::bucket` → `bucket`)
fn shorten_resource(id: &str) -> String {
    if id.starts_with("arn:") {
        let tail = id.rsplit([':', '/']).next().unwrap_or(id);
        if !tail.is_empty() {
            return tail.to_string();
        }
    }
    truncate(id, 32)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use costlens_core::config::AnalyticsConfig;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_records() -> Vec<BillingRecord> {
        vec![
            BillingRecord::new(Some(date(2024, 3, 1)), 12.0)
                .with_service("Compute Instance")
                .with_resource("i-0abc"),
            BillingRecord::new(Some(date(2024, 3, 20)), 3.0)
                .with_service("Storage")
                .with_resource("arn:aws:s3:::my-logs"),
            BillingRecord::new(Some(date(2024, 4, 2)), 5.0).with_service("Compute Instance"),
        ]
    }

    #[test]
    fn test_date_filter_parse() {
        assert_eq!(DateFilter::parse("7d").unwrap(), DateFilter::Days(7));
        assert_eq!(DateFilter::parse("3m").unwrap(), DateFilter::Months(3));
        assert_eq!(DateFilter::parse("1y").unwrap(), DateFilter::Years(1));
        assert_eq!(
            DateFilter::parse("2025-06-15").unwrap(),
            DateFilter::On(date(2025, 6, 15))
        );
        assert!(DateFilter::parse("invalid").is_err());
    }

    #[test]
    fn test_date_filter_resolves_against_anchor() {
        let anchor = date(2024, 3, 31);
        assert_eq!(DateFilter::Days(30).resolve(anchor), date(2024, 3, 1));
        assert_eq!(DateFilter::Months(1).resolve(anchor), date(2024, 2, 29));
        assert_eq!(DateFilter::Years(1).resolve(anchor), date(2023, 3, 31));
        assert_eq!(
            DateFilter::On(date(2020, 1, 1)).resolve(anchor),
            date(2020, 1, 1)
        );
    }

    #[test]
    fn test_resolve_range_uses_latest_usage_date() {
        let records = sample_records();
        let range = resolve_range(Some("2d"), None, &records).unwrap();
        assert_eq!(range.since, Some(date(2024, 3, 31)));
        assert_eq!(range.until, None);

        assert!(resolve_range(None, None, &records).unwrap().is_unbounded());
        assert!(resolve_range(Some("soon"), None, &records).is_err());
    }

    #[test]
    fn test_truncate_unicode() {
        assert_eq!(truncate("hello world", 20), "hello world");
        assert_eq!(truncate("hello world", 5), "hell…");
        assert_eq!(truncate("café", 3), "ca…");
    }

    #[test]
    fn test_shorten_resource() {
        assert_eq!(shorten_resource("arn:aws:s3:::my-logs"), "my-logs");
        assert_eq!(
            shorten_resource("arn:aws:lambda:us-east-1:123:function/resize"),
            "resize"
        );
        assert_eq!(shorten_resource("i-0abc"), "i-0abc");
    }

    #[test]
    fn test_format_cost() {
        assert_eq!(format_cost(12.345), "$12.35");
        assert_eq!(format_cost(2_500_000.0), "$2.50M");
    }

    #[test]
    fn test_format_series_table_and_json() {
        let series = costlens_core::analytics::monthly_costs(&sample_records());

        let table = format_series(&series, false, true);
        assert!(table.contains("2024-03"));
        assert!(table.contains("$15.00"));
        assert!(table.contains("Total"));

        let json = format_series(&series, true, true);
        assert!(json.starts_with('{'));
        assert!(json.contains("\"monthly\""));
    }

    #[test]
    fn test_format_empty_outputs() {
        assert!(format_anomalies(&[], false, true).contains("No anomalies"));
        assert_eq!(format_savings(&[], true, true), "[]");
        assert!(format_resources(&[], false, false).contains("No resources"));
    }

    #[test]
    fn test_format_summary_and_resources() {
        let report =
            AnalyticsReport::compute(&sample_records(), &AnalyticsConfig::default()).unwrap();

        let summary = format_summary(&report, false);
        assert!(summary.contains("Total cost:       $20.00"));
        assert!(summary.contains("2024-03-01 to 2024-04-02"));
        assert!(summary.contains("Compute Instance: $17.00 (85.0%)"));

        let resources = format_resources(&report.resources, false, true);
        assert!(resources.contains("i-0abc"));
        assert!(resources.contains("my-logs"));
        assert!(resources.contains("Avg/Item"));

        let json = format_summary(&report, true);
        assert!(json.contains("\"record_count\": 3"));
    }

    #[test]
    fn test_format_resources_shows_average_per_line_item() {
        let mut records = sample_records();
        records.push(
            BillingRecord::new(Some(date(2024, 3, 5)), 2.0)
                .with_service("Compute Instance")
                .with_resource("i-0abc"),
        );
        let profiles = costlens_core::analytics::profile_resources(
            &records,
            &AnalyticsConfig::default().resources,
        )
        .unwrap();
        let abc = profiles.iter().find(|p| p.resource_id == "i-0abc").unwrap();
        assert_eq!(abc.occurrences, 2);
        assert_eq!(abc.cost_per_occurrence(), 7.0);

        let table = format_resources(&profiles, false, true);
        assert!(table.contains("$14.00"));
        assert!(table.contains("$7.00"));
    }

    #[test]
    fn test_format_load_warnings() {
        let mut report = LoadReport::new();
        assert!(format_load_warnings(&report).is_none());

        report.add_warning("billing.csv line 4", "found record with 2 fields");
        let text = format_load_warnings(&report).unwrap();
        assert!(text.contains("billing.csv line 4"));
        assert!(text.starts_with("Warnings: 1 warning(s), 0 error(s), 0 fatal"));
    }

    #[test]
    fn test_format_load_warnings_for_clean_csv_with_bad_costs() {
        let report = LoadReport {
            rows_read: 10,
            rows_without_cost: 2,
            ..LoadReport::default()
        };
        assert!(!report.has_errors());

        let text = format_load_warnings(&report).unwrap();
        assert!(text.contains("2 rows had no usable cost"));
        assert!(!text.contains("usage date"));

        let report = LoadReport {
            rows_read: 10,
            rows_without_date: 1,
            ..LoadReport::default()
        };
        let text = format_load_warnings(&report).unwrap();
        assert!(text.contains("1 rows had no usage date"));
    }
}
