//! Core business logic for Tabsplit.
//!
//! This crate contains the group expense-splitting logic with ZERO web or
//! database dependencies. Data arrives through the [`summary::GroupDataSource`]
//! seam; everything else is calculation.
//!
//! # Modules
//!
//! - `balance` - Equal-split balance engine and its domain types
//! - `reports` - Expense trends, category breakdowns and group reports
//! - `summary` - Cached summary loading over a pluggable data source

pub mod balance;
pub mod reports;
pub mod summary;
