//! Export functionality for cost series, forecasts, anomalies and reports
//!
//! Provides simple, testable export with proper error handling.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::analytics::{AnalyticsReport, Forecast};
use costlens_types::{AnomalyRecord, CostSeries};

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}

fn csv_writer(path: &Path) -> Result<csv::Writer<File>> {
    ensure_parent_dir(path)?;
    csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))
}

/// Export a cost series to CSV
///
/// CSV columns: Period, Cost (USD)
/// Rows in chronological order
///
/// # Errors
/// Returns error if file creation or write operations fail
///
/// # Examples
///
/// ```no_run
/// use costlens_core::analytics::daily_costs;
/// use costlens_core::export::export_series_to_csv;
/// use std::path::Path;
///
/// let series = daily_costs(&[]);
/// export_series_to_csv(&series, Path::new("daily.csv")).unwrap();
/// ```
pub fn export_series_to_csv(series: &CostSeries, path: &Path) -> Result<()> {
    let mut writer = csv_writer(path)?;

    writer
        .write_record(["Period", "Cost (USD)"])
        .context("Failed to write CSV header")?;

    for point in &series.points {
        let cost = format!("{:.2}", point.cost);
        writer
            .write_record([point.period.as_str(), cost.as_str()])
            .with_context(|| format!("Failed to write row for period {}", point.period))?;
    }

    writer.flush().context("Failed to flush CSV writer")?;

    Ok(())
}

/// Export a forecast to CSV
///
/// CSV columns: Period, Cost (USD), Forecast
/// Historical rows first, then projected rows
pub fn export_forecast_to_csv(forecast: &Forecast, path: &Path) -> Result<()> {
    let mut writer = csv_writer(path)?;

    writer
        .write_record(["Period", "Cost (USD)", "Forecast"])
        .context("Failed to write CSV header")?;

    for point in &forecast.points {
        let cost = format!("{:.2}", point.cost);
        writer
            .write_record([
                point.period.as_str(),
                cost.as_str(),
                if point.is_forecast { "true" } else { "false" },
            ])
            .with_context(|| format!("Failed to write row for period {}", point.period))?;
    }

    writer.flush().context("Failed to flush CSV writer")?;

    Ok(())
}

/// Export anomalies to CSV
///
/// CSV columns: Date, Type, Cost (USD), Mean (USD), Deviation (USD),
/// Deviation (%), Z-Score, Top Services
pub fn export_anomalies_to_csv(anomalies: &[AnomalyRecord], path: &Path) -> Result<()> {
    let mut writer = csv_writer(path)?;

    writer
        .write_record([
            "Date",
            "Type",
            "Cost (USD)",
            "Mean (USD)",
            "Deviation (USD)",
            "Deviation (%)",
            "Z-Score",
            "Top Services",
        ])
        .context("Failed to write CSV header")?;

    for anomaly in anomalies {
        let z_score = anomaly
            .z_score
            .map(|z| format!("{:.2}", z))
            .unwrap_or_default();

        writer
            .write_record([
                anomaly.date.format("%Y-%m-%d").to_string(),
                anomaly.kind.label().to_string(),
                format!("{:.2}", anomaly.cost),
                format!("{:.2}", anomaly.mean),
                format!("{:.2}", anomaly.deviation),
                format!("{:.1}", anomaly.deviation_pct),
                z_score,
                anomaly.format_contributors(),
            ])
            .with_context(|| format!("Failed to write row for anomaly on {}", anomaly.date))?;
    }

    writer.flush().context("Failed to flush CSV writer")?;

    Ok(())
}

/// Export a full analytics report to pretty-printed JSON
///
/// # Errors
/// Returns error if serialization or file write fails
pub fn export_report_to_json(report: &AnalyticsReport, path: &Path) -> Result<()> {
    ensure_parent_dir(path)?;

    let json =
        serde_json::to_string_pretty(report).context("Failed to serialize report to JSON")?;

    std::fs::write(path, json)
        .with_context(|| format!("Failed to write JSON file: {}", path.display()))?;

    Ok(())
}

/// Export a full analytics report to a Markdown summary
///
/// Generates a human-readable report with:
/// - Summary totals
/// - Monthly costs and forecast
/// - Top services
/// - Anomalies and savings opportunities
pub fn export_report_to_markdown(report: &AnalyticsReport, path: &Path) -> Result<()> {
    ensure_parent_dir(path)?;

    let file = File::create(path)
        .with_context(|| format!("Failed to create Markdown file: {}", path.display()))?;

    let mut writer = BufWriter::new(file);

    writeln!(writer, "# AWS Cost Report")?;
    writeln!(writer)?;
    writeln!(
        writer,
        "**Generated**: {}",
        report.computed_at.format("%Y-%m-%d %H:%M UTC")
    )?;
    writeln!(writer)?;

    writeln!(writer, "## Summary")?;
    writeln!(writer)?;
    writeln!(writer, "| Metric | Value |")?;
    writeln!(writer, "|--------|-------|")?;
    writeln!(writer, "| Total Cost | ${:.2} |", report.total_cost)?;
    writeln!(writer, "| Rows | {} |", report.record_count)?;
    writeln!(writer, "| Days | {} |", report.daily.len())?;
    writeln!(writer, "| Services | {} |", report.services.len())?;
    writeln!(writer, "| Resources | {} |", report.resources.len())?;
    writeln!(writer, "| Anomalies | {} |", report.anomalies.len())?;
    writeln!(writer)?;

    if !report.forecast.points.is_empty() {
        writeln!(writer, "## Monthly Costs")?;
        writeln!(writer)?;
        writeln!(writer, "| Month | Cost | |")?;
        writeln!(writer, "|-------|------|-|")?;
        for point in &report.forecast.points {
            writeln!(
                writer,
                "| {} | ${:.2} | {} |",
                point.period,
                point.cost,
                if point.is_forecast { "forecast" } else { "" }
            )?;
        }
        writeln!(writer)?;
    }

    if !report.digest.top_services.is_empty() {
        writeln!(writer, "## Top Services")?;
        writeln!(writer)?;
        writeln!(writer, "| Service | Cost |")?;
        writeln!(writer, "|---------|------|")?;
        for service in &report.digest.top_services {
            writeln!(writer, "| {} | ${:.2} |", service.name, service.cost)?;
        }
        writeln!(writer)?;
    }

    if !report.anomalies.is_empty() {
        writeln!(writer, "## Anomalies")?;
        writeln!(writer)?;
        writeln!(writer, "| Date | Type | Cost | Mean | Top Services |")?;
        writeln!(writer, "|------|------|------|------|--------------|")?;
        for anomaly in &report.anomalies {
            writeln!(
                writer,
                "| {} | {} | ${:.2} | ${:.2} | {} |",
                anomaly.date,
                anomaly.kind.label(),
                anomaly.cost,
                anomaly.mean,
                anomaly.format_contributors()
            )?;
        }
        writeln!(writer)?;
    }

    if !report.savings.is_empty() {
        writeln!(writer, "## Savings Opportunities")?;
        writeln!(writer)?;
        for opportunity in &report.savings {
            writeln!(
                writer,
                "- **{}** (${:.2}): {} {}",
                opportunity.kind.label(),
                opportunity.cost,
                opportunity.issue,
                opportunity.suggestion
            )?;
        }
        writeln!(writer)?;
    }

    writer.flush().context("Failed to flush Markdown writer")?;

    Ok(())
}
