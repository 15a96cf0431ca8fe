//! Report error types.

use thiserror::Error;

/// Errors that can occur while preparing a report.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    /// Unrecognized report period.
    #[error("Invalid report period: {0} (expected week, month or year)")]
    InvalidPeriod(String),
}
