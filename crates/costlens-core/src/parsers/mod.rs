//! Parsers for AWS billing exports

pub mod billing_csv;
pub mod normalize;

pub use billing_csv::{load_billing_csv, parse_billing_csv, BillingCsvParser, BillingData};
pub use normalize::{
    normalize_row, parse_cost, parse_usage_date, sanitize_header, ColumnMap, Field,
};
