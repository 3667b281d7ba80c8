//! Error types for costlens-core
//!
//! Provides a comprehensive error hierarchy with thiserror for graceful degradation.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for costlens operations
#[derive(Error, Debug)]
pub enum CoreError {
    // ===================
    // IO Errors
    // ===================
    #[error("Failed to read file: {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    // ===================
    // Parse Errors
    // ===================
    #[error("Failed to read CSV from {origin}: {message}")]
    CsvParse {
        origin: String,
        message: String,
        #[source]
        source: csv::Error,
    },

    #[error("CSV from {origin} has no header row")]
    MissingHeader { origin: String },

    #[error("Failed to parse TOML in {path}: {message}")]
    TomlParse {
        path: PathBuf,
        message: String,
        #[source]
        source: toml::de::Error,
    },

    // ===================
    // Config Errors
    // ===================
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl CoreError {
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}

/// Severity level for errors during load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Non-critical, can continue with degraded functionality
    Warning,
    /// Significant but not fatal
    Error,
    /// Cannot continue
    Fatal,
}

/// Individual error entry in load report
#[derive(Debug, Clone)]
pub struct LoadError {
    pub source: String,
    pub message: String,
    pub severity: ErrorSeverity,
    /// Actionable suggestion for user (optional)
    pub suggestion: Option<String>,
}

impl LoadError {
    pub fn warning(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            message: message.into(),
            severity: ErrorSeverity::Warning,
            suggestion: None,
        }
    }

    pub fn error(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            message: message.into(),
            severity: ErrorSeverity::Error,
            suggestion: None,
        }
    }

    pub fn fatal(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            message: message.into(),
            severity: ErrorSeverity::Fatal,
            suggestion: None,
        }
    }

    /// Add an actionable suggestion to this error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Create user-friendly error from CoreError with context-aware suggestions
    pub fn from_core_error(source: impl Into<String>, error: &CoreError) -> Self {
        let source = source.into();
        let (message, suggestion) = match error {
            CoreError::FileNotFound { path } => (
                format!("File not found: {}", path.display()),
                Some(format!("Check if file exists: ls {}", path.display())),
            ),
            CoreError::FileRead { path, .. } => (
                format!("Cannot read file: {}", path.display()),
                Some(format!("Check permissions: chmod +r {}", path.display())),
            ),
            CoreError::MissingHeader { origin } => (
                format!("No header row in {}", origin),
                Some("Export the Cost and Usage Report with column headers".to_string()),
            ),
            CoreError::TomlParse { path, message, .. } => (
                format!("Invalid TOML in {}: {}", path.display(), message),
                Some("Compare against the defaults: costlens config".to_string()),
            ),
            _ => (error.to_string(), None),
        };

        Self {
            source,
            message,
            severity: ErrorSeverity::Error,
            suggestion,
        }
    }
}

/// Report of problems encountered while loading a billing CSV
///
/// Enables graceful degradation by tracking skipped rows
/// instead of failing completely on any malformed line.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub errors: Vec<LoadError>,
    /// Data rows read (header excluded)
    pub rows_read: usize,
    /// Rows the CSV reader could not decode at all
    pub rows_skipped: usize,
    /// Decoded rows whose usage date could not be parsed
    pub rows_without_date: usize,
    /// Decoded rows whose cost was missing, unparsable or not positive
    pub rows_without_cost: usize,
}

impl LoadReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, error: LoadError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, source: impl Into<String>, message: impl Into<String>) {
        self.errors.push(LoadError::warning(source, message));
    }

    /// Returns true if there are any fatal errors
    pub fn has_fatal_errors(&self) -> bool {
        self.errors
            .iter()
            .any(|e| e.severity == ErrorSeverity::Fatal)
    }

    /// Returns true if there are any errors (including warnings)
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns only warnings
    pub fn warnings(&self) -> impl Iterator<Item = &LoadError> {
        self.errors
            .iter()
            .filter(|e| e.severity == ErrorSeverity::Warning)
    }

    /// Returns count by severity
    pub fn error_count(&self) -> (usize, usize, usize) {
        let count = |severity| self.errors.iter().filter(|e| e.severity == severity).count();
        (
            count(ErrorSeverity::Warning),
            count(ErrorSeverity::Error),
            count(ErrorSeverity::Fatal),
        )
    }

    /// Rows that made it into the record set
    pub fn rows_loaded(&self) -> usize {
        self.rows_read - self.rows_skipped
    }

    /// Merge another report into this one
    pub fn merge(&mut self, other: LoadReport) {
        self.errors.extend(other.errors);
        self.rows_read += other.rows_read;
        self.rows_skipped += other.rows_skipped;
        self.rows_without_date += other.rows_without_date;
        self.rows_without_cost += other.rows_without_cost;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_report_severity_counting() {
        let mut report = LoadReport::new();
        report.add_warning("row 3", "Unequal field count");
        report.add_error(LoadError::error("row 9", "Invalid UTF-8"));
        report.add_error(LoadError::fatal("billing.csv", "No header row"));

        let (warnings, errors, fatal) = report.error_count();
        assert_eq!(warnings, 1);
        assert_eq!(errors, 1);
        assert_eq!(fatal, 1);
        assert!(report.has_fatal_errors());
    }

    #[test]
    fn test_load_report_merge() {
        let mut report1 = LoadReport::new();
        report1.rows_read = 10;
        report1.rows_skipped = 1;

        let mut report2 = LoadReport::new();
        report2.rows_read = 20;
        report2.rows_without_cost = 4;
        report2.add_warning("row 2", "warning");

        report1.merge(report2);

        assert_eq!(report1.rows_read, 30);
        assert_eq!(report1.rows_loaded(), 29);
        assert_eq!(report1.rows_without_cost, 4);
        assert_eq!(report1.errors.len(), 1);
    }

    #[test]
    fn test_invalid_config_message() {
        let err = CoreError::invalid_config("window_size must be at least 1");
        assert_eq!(
            err.to_string(),
            "Invalid configuration: window_size must be at least 1"
        );
    }

    #[test]
    fn test_suggestion_for_missing_file() {
        let err = CoreError::FileNotFound {
            path: PathBuf::from("/tmp/cur.csv"),
        };
        let load_error = LoadError::from_core_error("loader", &err);
        assert_eq!(load_error.severity, ErrorSeverity::Error);
        assert!(load_error.suggestion.unwrap().contains("/tmp/cur.csv"));
    }
}
