//! costlens - AWS billing CSV cost dashboard for the terminal

mod cli;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use costlens_core::analytics::{
    aggregate_costs, detect_anomalies, find_savings_opportunities, forecast_from_series,
    idle_candidates, monthly_costs, profile_resources, region_breakdown, service_breakdown,
    top_expensive, top_n, total_cost, AnalyticsReport,
};
use costlens_core::config::{default_config_dir, AnalyticsConfig};
use costlens_core::export;
use costlens_core::BillingCsvParser;
use costlens_types::{AnomalyMethod, BillingRecord, Granularity};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(
    name = "costlens",
    version,
    about = "AWS billing CSV cost dashboard",
    long_about = "Analyze AWS Cost and Usage Report CSV exports from the terminal.\n\
                  \n\
                  Aggregates spend by day, month, service and region, flags anomalous\n\
                  days, projects a flat-average forecast, profiles resources and lists\n\
                  heuristic savings opportunities.\n\
                  \n\
                  Examples:\n\
                    costlens summary cur.csv                      # Overview\n\
                    costlens trend cur.csv --granularity monthly  # Monthly totals\n\
                    costlens anomalies cur.csv --sigma 3          # Stricter detector\n\
                    costlens forecast cur.csv --months 6          # Six-month projection\n\
                    costlens resources cur.csv --idle             # Idle candidates only\n\
                    costlens --since 30d services cur.csv         # Last 30 days of data\n\
                    costlens export cur.csv --kind report -o out/report.json\n\
                    costlens config                               # Effective config\n\
                  \n\
                  Environment Variables:\n\
                    COSTLENS_CONFIG                  # Config file (default: <config dir>/costlens/config.toml)\n\
                    COSTLENS_FORMAT                  # Force output format: json|table\n\
                    COSTLENS_NO_COLOR                # Disable ANSI colors (log-friendly)\n\
                    COSTLENS_MAX_ROWS                # Read at most this many CSV data rows\n\
                    COSTLENS_LOG                     # Log filter, e.g. debug or costlens_core=trace"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Config file path (must exist and parse)
    #[arg(long, global = true, env = "COSTLENS_CONFIG")]
    config: Option<PathBuf>,

    /// Force output format (json|table)
    #[arg(long, global = true, env = "COSTLENS_FORMAT", value_parser = ["json", "table"])]
    format: Option<String>,

    /// Disable ANSI colors (log-friendly)
    #[arg(long, global = true, env = "COSTLENS_NO_COLOR")]
    no_color: bool,

    /// Only usage on or after: 7d, 30d, 3m, 1y (relative to the latest usage date) or YYYY-MM-DD
    #[arg(long, global = true)]
    since: Option<String>,

    /// Only usage on or before: same forms as --since
    #[arg(long, global = true)]
    until: Option<String>,

    /// Stop reading the CSV after this many data rows
    #[arg(long, global = true, env = "COSTLENS_MAX_ROWS")]
    max_rows: Option<usize>,
}

#[derive(Subcommand)]
enum Command {
    /// Print a cost overview
    Summary {
        /// Billing CSV export
        csv: PathBuf,
    },
    /// Show cost per day or per month
    Trend {
        csv: PathBuf,
        /// daily or monthly
        #[arg(long, short = 'g', default_value = "daily")]
        granularity: Granularity,
    },
    /// Show cost per service
    Services {
        csv: PathBuf,
        /// Max rows
        #[arg(long, short = 'n', default_value = "10")]
        top: usize,
    },
    /// Show cost per region
    Regions {
        csv: PathBuf,
        /// Max rows
        #[arg(long, short = 'n', default_value = "10")]
        top: usize,
    },
    /// Detect anomalous spend days
    Anomalies {
        csv: PathBuf,
        /// sigma or percentage
        #[arg(long)]
        method: Option<AnomalyMethod>,
        /// Trailing window in days
        #[arg(long)]
        window: Option<usize>,
        /// Sigma multiplier (sigma method)
        #[arg(long)]
        sigma: Option<f64>,
        /// Percent increase over the trailing mean (percentage method)
        #[arg(long)]
        threshold: Option<f64>,
    },
    /// Project monthly cost forward
    Forecast {
        csv: PathBuf,
        /// Months to project
        #[arg(long, short = 'm')]
        months: Option<usize>,
    },
    /// Profile resources by cost
    Resources {
        csv: PathBuf,
        /// Show idle candidates only
        #[arg(long)]
        idle: bool,
        /// Max rows
        #[arg(long, short = 'n')]
        top: Option<usize>,
    },
    /// List heuristic savings opportunities
    Savings { csv: PathBuf },
    /// Write an analytic to a file
    Export {
        csv: PathBuf,
        /// What to export
        #[arg(long, short = 'k', value_enum, default_value = "report")]
        kind: ExportKind,
        /// Destination file
        #[arg(long, short = 'o')]
        output: PathBuf,
    },
    /// Print the effective configuration as TOML
    Config {
        /// Also write it to the user config directory
        #[arg(long)]
        write: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportKind {
    /// Daily series (CSV)
    Daily,
    /// Monthly series (CSV)
    Monthly,
    /// Anomalies (CSV)
    Anomalies,
    /// Historical + projected months (CSV)
    Forecast,
    /// Full report (JSON)
    Report,
    /// Full report (Markdown)
    Markdown,
}

/// Output flags shared by every command
#[derive(Clone, Copy)]
struct Output {
    json: bool,
    no_color: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing();

    let mut config = resolve_config(cli.config.as_deref())?;
    let output = Output {
        json: cli.format.as_deref() == Some("json"),
        no_color: cli.no_color,
    };
    let selection = Selection {
        since: cli.since.as_deref(),
        until: cli.until.as_deref(),
        max_rows: cli.max_rows,
    };

    match cli.command {
        Command::Summary { csv } => {
            let records = load_records(&csv, selection, output)?;
            let report = AnalyticsReport::compute(&records, &config)?;
            println!("{}", cli::format_summary(&report, output.json));
        }
        Command::Trend { csv, granularity } => {
            let records = load_records(&csv, selection, output)?;
            let series = aggregate_costs(&records, granularity);
            println!("{}", cli::format_series(&series, output.json, output.no_color));
        }
        Command::Services { csv, top } => {
            let records = load_records(&csv, selection, output)?;
            let services = top_n(&service_breakdown(&records), top);
            println!(
                "{}",
                cli::format_breakdown(
                    "Service",
                    &services,
                    total_cost(&records),
                    output.json,
                    output.no_color
                )
            );
        }
        Command::Regions { csv, top } => {
            let records = load_records(&csv, selection, output)?;
            let regions = top_n(&region_breakdown(&records), top);
            println!(
                "{}",
                cli::format_breakdown(
                    "Region",
                    &regions,
                    total_cost(&records),
                    output.json,
                    output.no_color
                )
            );
        }
        Command::Anomalies {
            csv,
            method,
            window,
            sigma,
            threshold,
        } => {
            if let Some(method) = method {
                config.anomaly.method = method;
            }
            if let Some(window) = window {
                config.anomaly.window_size = window;
            }
            if let Some(sigma) = sigma {
                config.anomaly.sigma_multiplier = sigma;
            }
            if let Some(threshold) = threshold {
                config.anomaly.percent_threshold = threshold;
            }

            let records = load_records(&csv, selection, output)?;
            let anomalies = detect_anomalies(&records, &config.anomaly)?;
            println!(
                "{}",
                cli::format_anomalies(&anomalies, output.json, output.no_color)
            );
        }
        Command::Forecast { csv, months } => {
            let records = load_records(&csv, selection, output)?;
            let horizon = months.unwrap_or(config.forecast.horizon);
            let forecast =
                forecast_from_series(&monthly_costs(&records), horizon, &config.forecast)?;
            println!(
                "{}",
                cli::format_forecast(&forecast, output.json, output.no_color)
            );
        }
        Command::Resources { csv, idle, top } => {
            let records = load_records(&csv, selection, output)?;
            let profiles = profile_resources(&records, &config.resources)?;
            let shown = if idle {
                idle_candidates(&profiles, top.unwrap_or(config.resources.top_idle))
            } else {
                top_expensive(&profiles, top.unwrap_or(config.resources.top_expensive))
            };
            println!(
                "{}",
                cli::format_resources(&shown, output.json, output.no_color)
            );
        }
        Command::Savings { csv } => {
            let records = load_records(&csv, selection, output)?;
            let opportunities = find_savings_opportunities(&records, &config.savings)?;
            println!(
                "{}",
                cli::format_savings(&opportunities, output.json, output.no_color)
            );
        }
        Command::Export { csv, kind, output: path } => {
            let records = load_records(&csv, selection, output)?;
            run_export(&records, &config, kind, &path)?;
            if !output.json {
                eprintln!("✓ Exported to {}", path.display());
            }
        }
        Command::Config { write } => {
            print!("{}", config.to_toml_string());
            if write {
                let dir = default_config_dir().context("Could not determine config directory")?;
                let path = config.save(&dir)?;
                eprintln!("✓ Written to {}", path.display());
            }
        }
    }

    Ok(())
}

/// Logs go to stderr so stdout stays machine-readable
fn init_tracing() {
    let filter = EnvFilter::try_from_env("COSTLENS_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

/// Explicit path must load; the user config dir falls back to defaults
fn resolve_config(explicit: Option<&Path>) -> Result<AnalyticsConfig> {
    if let Some(path) = explicit {
        return AnalyticsConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()));
    }

    Ok(default_config_dir()
        .map(|dir| AnalyticsConfig::load_or_default(&dir))
        .unwrap_or_default())
}

/// Which part of the CSV the user asked for
#[derive(Debug, Clone, Copy)]
struct Selection<'a> {
    since: Option<&'a str>,
    until: Option<&'a str>,
    max_rows: Option<usize>,
}

fn load_records(
    path: &Path,
    selection: Selection<'_>,
    output: Output,
) -> Result<Vec<BillingRecord>> {
    let parser = match selection.max_rows {
        Some(max_rows) => BillingCsvParser::new().with_max_rows(max_rows),
        None => BillingCsvParser::new(),
    };
    let data = parser
        .parse(path)
        .map_err(cli::CliError::from)
        .with_context(|| format!("Failed to load billing CSV: {}", path.display()))?;

    if data.report.has_fatal_errors() {
        let warnings = cli::format_load_warnings(&data.report).unwrap_or_default();
        anyhow::bail!("Cannot analyze {}\n{}", path.display(), warnings);
    }

    if !output.json {
        if let Some(warnings) = cli::format_load_warnings(&data.report) {
            eprintln!("{}\n", warnings);
        }
    }

    let range = cli::resolve_range(selection.since, selection.until, &data.records)?;
    let records = if range.is_unbounded() {
        data.records
    } else {
        tracing::debug!(range = %range.display(), "Applying date filter");
        range.filter(&data.records)
    };

    if !records.iter().any(BillingRecord::has_cost) {
        return Err(cli::CliError::NoData {
            path: path.display().to_string(),
            rows: data.report.rows_read,
        }
        .into());
    }

    Ok(records)
}

fn run_export(
    records: &[BillingRecord],
    config: &AnalyticsConfig,
    kind: ExportKind,
    path: &Path,
) -> Result<()> {
    match kind {
        ExportKind::Daily => {
            export::export_series_to_csv(&aggregate_costs(records, Granularity::Daily), path)
        }
        ExportKind::Monthly => {
            export::export_series_to_csv(&aggregate_costs(records, Granularity::Monthly), path)
        }
        ExportKind::Anomalies => {
            export::export_anomalies_to_csv(&detect_anomalies(records, &config.anomaly)?, path)
        }
        ExportKind::Forecast => {
            let forecast = forecast_from_series(
                &monthly_costs(records),
                config.forecast.horizon,
                &config.forecast,
            )?;
            export::export_forecast_to_csv(&forecast, path)
        }
        ExportKind::Report => {
            export::export_report_to_json(&AnalyticsReport::compute(records, config)?, path)
        }
        ExportKind::Markdown => {
            export::export_report_to_markdown(&AnalyticsReport::compute(records, config)?, path)
        }
    }
}
