//! Billing CSV parser with graceful degradation on malformed rows

use crate::error::{CoreError, LoadError, LoadReport};
use crate::parsers::normalize::{ColumnMap, Field};
use costlens_types::BillingRecord;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

/// Records plus the report of what was skipped while reading them
#[derive(Debug, Default)]
pub struct BillingData {
    pub records: Vec<BillingRecord>,
    pub report: LoadReport,
}

/// Row-level problems recorded individually before only counting them
const MAX_REPORTED_ERRORS: usize = 100;

/// Parser for AWS Cost and Usage Report CSV exports
#[derive(Debug, Default)]
pub struct BillingCsvParser {
    /// Stop after this many data rows
    max_rows: Option<usize>,
}

impl BillingCsvParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = Some(max_rows);
        self
    }

    /// Parse a CSV file from disk
    pub fn parse(&self, path: &Path) -> Result<BillingData, CoreError> {
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CoreError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                CoreError::FileRead {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;

        self.parse_reader(file, &path.display().to_string())
    }

    /// Parse CSV content from any reader. `origin` names the input in errors.
    ///
    /// Rows the CSV reader cannot decode are skipped and recorded in the
    /// report; malformed values inside decodable rows fall back as
    /// described on [`BillingRecord`].
    pub fn parse_reader<R: Read>(&self, reader: R, origin: &str) -> Result<BillingData, CoreError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| CoreError::CsvParse {
                origin: origin.to_string(),
                message: e.to_string(),
                source: e,
            })?
            .clone();

        if headers.iter().all(|h| h.trim().is_empty()) {
            return Err(CoreError::MissingHeader {
                origin: origin.to_string(),
            });
        }

        let columns = ColumnMap::from_headers(headers.iter());
        let mut data = BillingData::default();

        if !columns.has(Field::UnblendedCost) {
            data.report.add_error(
                LoadError::fatal(origin, "No unblended cost column found")
                    .with_suggestion("Expected a header such as lineItem/UnblendedCost"),
            );
        }
        if !columns.has(Field::UsageStartDate) {
            data.report.add_warning(
                origin,
                "No usage start date column found; time series will be empty",
            );
        }

        for (index, result) in csv_reader.records().enumerate() {
            if self.max_rows.is_some_and(|max| index >= max) {
                break;
            }
            data.report.rows_read += 1;

            let row = match result {
                Ok(row) => row,
                Err(e) => {
                    data.report.rows_skipped += 1;
                    // +2: header line, 1-based numbering
                    let line = index + 2;
                    warn!(origin, line, error = %e, "Skipping unreadable CSV row");
                    if data.report.errors.len() < MAX_REPORTED_ERRORS {
                        data.report
                            .add_warning(format!("{} line {}", origin, line), e.to_string());
                    }
                    continue;
                }
            };

            let record = columns.record(|i| row.get(i));
            if record.usage_date.is_none() {
                data.report.rows_without_date += 1;
            }
            if !record.has_cost() {
                data.report.rows_without_cost += 1;
            }
            data.records.push(record);
        }

        debug!(
            origin,
            rows = data.report.rows_read,
            skipped = data.report.rows_skipped,
            "Parsed billing CSV"
        );

        Ok(data)
    }

    /// Parse with graceful degradation, recording errors in LoadReport
    pub fn parse_graceful(&self, path: &Path, report: &mut LoadReport) -> Vec<BillingRecord> {
        match self.parse(path) {
            Ok(data) => {
                report.merge(data.report);
                data.records
            }
            Err(e) => {
                report.add_error(LoadError::from_core_error("billing", &e));
                Vec::new()
            }
        }
    }
}

/// Load a billing CSV with default parser settings
pub fn load_billing_csv(path: &Path) -> Result<BillingData, CoreError> {
    BillingCsvParser::new().parse(path)
}

/// Parse billing CSV content from any reader with default parser settings
pub fn parse_billing_csv<R: Read>(reader: R) -> Result<BillingData, CoreError> {
    BillingCsvParser::new().parse_reader(reader, "<input>")
}
