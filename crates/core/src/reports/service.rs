//! Report generation service.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use tabsplit_shared::types::MemberId;

use super::types::{
    CategoryShare, DailyTotal, ExpenseReportRow, GroupReport, GroupReportInput, MemberReportRow,
    PaymentReportRow, ReportTotals,
};
use crate::balance::{Expense, Member, MemberBalance};

/// Number of categories listed before the rest is merged.
pub const DEFAULT_TOP_CATEGORIES: usize = 10;

/// Name of the bucket holding categories beyond the top N.
pub const OTHER_CATEGORY: &str = "Other";

/// Category of expenses without a label.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Name shown when a creator or payer is not on the roster.
pub const UNKNOWN_MEMBER: &str = "Unknown";

/// Service for generating group reports.
pub struct ReportService;

impl ReportService {
    /// Sums expense costs per UTC calendar day, from `since` onwards.
    ///
    /// Days without expenses are omitted; the result is sorted by date.
    #[must_use]
    pub fn expense_trend(expenses: &[Expense], since: DateTime<Utc>) -> Vec<DailyTotal> {
        let mut daily: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();

        for expense in expenses.iter().filter(|e| e.created_at >= since) {
            *daily.entry(expense.created_at.date_naive()).or_default() += expense.total_cost;
        }

        daily
            .into_iter()
            .map(|(date, amount)| DailyTotal { date, amount })
            .collect()
    }

    /// Breaks spending down by expense label.
    ///
    /// Categories are sorted by value (largest first, ties by name). When
    /// there are more than `top_n`, the remainder is merged into a trailing
    /// [`OTHER_CATEGORY`] entry.
    #[must_use]
    pub fn category_breakdown(expenses: &[Expense], top_n: usize) -> Vec<CategoryShare> {
        let mut totals: BTreeMap<String, Decimal> = BTreeMap::new();
        for expense in expenses {
            *totals.entry(Self::category_of(expense)).or_default() += expense.total_cost;
        }

        let total: Decimal = totals.values().copied().sum();

        let mut categories: Vec<(String, Decimal)> = totals.into_iter().collect();
        categories.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let rest = if categories.len() > top_n {
            categories.split_off(top_n)
        } else {
            Vec::new()
        };

        let mut result: Vec<CategoryShare> = categories
            .into_iter()
            .map(|(name, value)| CategoryShare {
                name,
                value,
                percent: Self::percent_of(value, total),
            })
            .collect();

        if !rest.is_empty() {
            let value: Decimal = rest.iter().map(|(_, v)| *v).sum();
            result.push(CategoryShare {
                name: OTHER_CATEGORY.to_string(),
                value,
                percent: Self::percent_of(value, total),
            });
        }

        result
    }

    /// Assembles the group expense report.
    ///
    /// Totals and member balances cover all history; expense and payment rows
    /// are limited to the report period.
    #[must_use]
    pub fn group_report(input: GroupReportInput<'_>) -> GroupReport {
        let period_start = input.period.start(input.now);
        let names: HashMap<&MemberId, &str> = input
            .members
            .iter()
            .map(|m| (&m.id, m.display_name.as_str()))
            .collect();
        let name_of = |id: Option<&MemberId>| {
            id.and_then(|id| names.get(id).copied())
                .unwrap_or(UNKNOWN_MEMBER)
                .to_string()
        };

        let members = input
            .members
            .iter()
            .map(|member| Self::member_row(member, input.summary.balance(&member.id)))
            .collect();

        let mut expenses: Vec<ExpenseReportRow> = input
            .expenses
            .iter()
            .filter(|e| e.created_at >= period_start)
            .map(|e| ExpenseReportRow {
                id: e.id.clone(),
                date: e.created_at,
                item: Self::category_of(e),
                amount: e.total_cost,
                created_by: name_of(e.created_by.as_ref()),
            })
            .collect();
        expenses.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));

        let mut payments: Vec<PaymentReportRow> = input
            .payments
            .iter()
            .filter(|p| p.paid_at >= period_start)
            .map(|p| PaymentReportRow {
                id: p.id.clone(),
                date: p.paid_at,
                amount: p.amount,
                method: p.method.clone(),
                member: name_of(Some(&p.member_id)),
            })
            .collect();
        payments.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));

        GroupReport {
            group: input.group_name.to_string(),
            generated_at: input.now,
            generated_by: input.generated_by.map(str::to_string),
            period: input.period,
            period_start,
            summary: ReportTotals {
                total_expenses: input.summary.total_expenses,
                total_payments: input.summary.total_payments,
                remaining_amount: input.summary.remaining_amount,
                member_count: input.summary.member_count,
            },
            members,
            expenses,
            payments,
        }
    }

    fn member_row(member: &Member, balance: Option<&MemberBalance>) -> MemberReportRow {
        let balance = balance.copied().unwrap_or_default();
        MemberReportRow {
            member_id: member.id.clone(),
            name: member.display_name.clone(),
            role: member.role,
            owed: balance.owed,
            paid: balance.paid,
            net: balance.net,
        }
    }

    fn category_of(expense: &Expense) -> String {
        match expense.label.as_deref().map(str::trim) {
            Some(label) if !label.is_empty() => label.to_string(),
            _ => UNCATEGORIZED.to_string(),
        }
    }

    fn percent_of(value: Decimal, total: Decimal) -> Decimal {
        if total.is_zero() {
            Decimal::ZERO
        } else {
            (value / total * Decimal::ONE_HUNDRED).round_dp(1)
        }
    }
}
