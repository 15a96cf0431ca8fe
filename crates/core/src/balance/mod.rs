//! Group balance computation.
//!
//! This module turns a member roster, a set of shared expenses and a set of
//! payments into per-member owed/paid/net figures:
//! - Domain types for members, expenses, payments and summaries
//! - Exact equal-split allocation of expense costs
//! - The balance engine

pub mod allocation;
pub mod engine;
pub mod types;

#[cfg(test)]
mod engine_props;

pub use allocation::AllocationUtil;
pub use engine::{BalanceEngine, DEFAULT_SHARE_SCALE, compute_summary};
pub use types::{
    BalanceStatus, Expense, Member, MemberBalance, MemberRole, Payment, Summary, Unattributed,
};
