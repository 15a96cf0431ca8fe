//! Group expense reports.
//!
//! This module provides pure business logic for the reports shown next to
//! the balances:
//! - Expense trend (daily totals since a period start)
//! - Category breakdown (top categories plus "Other")
//! - Group expense report (summary, member rows, recent expenses and payments)

pub mod error;
pub mod service;
pub mod types;


pub use error::ReportError;
pub use service::{
    DEFAULT_TOP_CATEGORIES, OTHER_CATEGORY, ReportService, UNCATEGORIZED, UNKNOWN_MEMBER,
};
pub use types::*;
