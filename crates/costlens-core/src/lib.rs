//! costlens-core - Core library for costlens
//!
//! Provides the billing CSV loader, cost analytics, configuration and
//! export for AWS cost and usage exports.

pub mod analytics;
pub mod config;
pub mod error;
pub mod export;
pub mod parsers;

pub use analytics::{AnalyticsReport, DateRange, Forecast};
pub use config::AnalyticsConfig;
pub use error::{CoreError, LoadError, LoadReport};
pub use export::{
    export_anomalies_to_csv, export_forecast_to_csv, export_report_to_json,
    export_report_to_markdown, export_series_to_csv,
};
pub use parsers::{load_billing_csv, parse_billing_csv, BillingCsvParser, BillingData};
