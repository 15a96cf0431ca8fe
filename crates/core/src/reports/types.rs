//! Report data types.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tabsplit_shared::types::{ExpenseId, MemberId, PaymentId};

use super::error::ReportError;
use crate::balance::{Expense, Member, MemberRole, Payment, Summary};

/// Time window a report covers, ending now.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportPeriod {
    /// The last seven days.
    #[default]
    Week,
    /// The current calendar month.
    Month,
    /// The current calendar year.
    Year,
}

impl ReportPeriod {
    /// First instant covered by the period, relative to `now` (UTC).
    #[must_use]
    pub fn start(self, now: DateTime<Utc>) -> DateTime<Utc> {
        let first_day = match self {
            Self::Week => return now - Duration::days(7),
            Self::Month => NaiveDate::from_ymd_opt(now.year(), now.month(), 1),
            Self::Year => NaiveDate::from_ymd_opt(now.year(), 1, 1),
        };

        first_day
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map_or(now, |dt| dt.and_utc())
    }
}

impl std::fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Week => write!(f, "week"),
            Self::Month => write!(f, "month"),
            Self::Year => write!(f, "year"),
        }
    }
}

impl std::str::FromStr for ReportPeriod {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            _ => Err(ReportError::InvalidPeriod(s.to_string())),
        }
    }
}

/// Expense total for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTotal {
    /// UTC calendar day.
    pub date: NaiveDate,
    /// Sum of expense costs recorded that day.
    pub amount: Decimal,
}

/// Share of total spending for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryShare {
    /// Category name (the expense label).
    pub name: String,
    /// Total spent in the category.
    pub value: Decimal,
    /// Percentage of all spending, one decimal place.
    pub percent: Decimal,
}

/// Headline totals of a group report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportTotals {
    /// Sum of all expense costs.
    pub total_expenses: Decimal,
    /// Sum of all payments.
    pub total_payments: Decimal,
    /// Expenses not yet covered by payments.
    pub remaining_amount: Decimal,
    /// Number of roster members.
    pub member_count: usize,
}

/// One member's line in a group report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberReportRow {
    /// Member ID.
    pub member_id: MemberId,
    /// Display name.
    pub name: String,
    /// Role within the group.
    pub role: MemberRole,
    /// Amount owed.
    pub owed: Decimal,
    /// Amount paid.
    pub paid: Decimal,
    /// Net balance.
    pub net: Decimal,
}

/// One expense line in a group report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseReportRow {
    /// Expense ID.
    pub id: ExpenseId,
    /// When the expense was recorded.
    pub date: DateTime<Utc>,
    /// What was bought.
    pub item: String,
    /// Expense cost.
    pub amount: Decimal,
    /// Name of the member who logged it.
    pub created_by: String,
}

/// One payment line in a group report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentReportRow {
    /// Payment ID.
    pub id: PaymentId,
    /// When the payment was made.
    pub date: DateTime<Utc>,
    /// Amount paid.
    pub amount: Decimal,
    /// Payment method.
    pub method: Option<String>,
    /// Name of the paying member.
    pub member: String,
}

/// Expense report for one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupReport {
    /// Group name.
    pub group: String,
    /// Generation timestamp.
    pub generated_at: DateTime<Utc>,
    /// Who requested the report.
    pub generated_by: Option<String>,
    /// Period covered by the expense and payment rows.
    pub period: ReportPeriod,
    /// First instant of the period.
    pub period_start: DateTime<Utc>,
    /// All-time totals.
    pub summary: ReportTotals,
    /// Member balances, in roster order.
    pub members: Vec<MemberReportRow>,
    /// Expenses within the period, newest first.
    pub expenses: Vec<ExpenseReportRow>,
    /// Payments within the period, newest first.
    pub payments: Vec<PaymentReportRow>,
}

/// Everything needed to assemble a [`GroupReport`].
#[derive(Debug, Clone, Copy)]
pub struct GroupReportInput<'a> {
    /// Group name.
    pub group_name: &'a str,
    /// Who requested the report.
    pub generated_by: Option<&'a str>,
    /// Period covered by the rows.
    pub period: ReportPeriod,
    /// Generation timestamp; the period ends here.
    pub now: DateTime<Utc>,
    /// Group roster.
    pub members: &'a [Member],
    /// Group expenses.
    pub expenses: &'a [Expense],
    /// Group payments.
    pub payments: &'a [Payment],
    /// Summary computed over the same data.
    pub summary: &'a Summary,
}
