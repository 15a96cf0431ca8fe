//! Property-based tests for the balance engine.
//!
//! - Conservation of expenses and payments
//! - Idempotence and input-order independence
//! - Fair split within one unit

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use tabsplit_shared::config::MAX_SHARE_SCALE;

use super::engine::BalanceEngine;
use super::types::{Expense, Member, Payment};

/// Ids drawn from a pool larger than the roster, so some never resolve.
fn member_id() -> impl Strategy<Value = String> {
    (0usize..8).prop_map(|i| format!("m{i}"))
}

/// Strategy for a roster of 0 to 5 members (`m0`..`m4`).
fn roster() -> impl Strategy<Value = Vec<Member>> {
    (0usize..=5).prop_map(|n| {
        (0..n)
            .map(|i| Member::new(format!("m{i}"), format!("Member {i}")))
            .collect()
    })
}

/// Strategy for non-negative amounts: mostly everyday values with 0 to 2
/// decimal places, sometimes values of up to 26 digits at up to 16 places.
fn amount() -> impl Strategy<Value = Decimal> {
    prop_oneof![
        3 => (0i64..100_000_000i64, 0u32..=2)
            .prop_map(|(units, scale)| Decimal::new(units, scale)),
        1 => (0i128..100_000_000_000_000_000_000_000_000i128, 0u32..=MAX_SHARE_SCALE)
            .prop_map(|(units, scale)| Decimal::from_i128_with_scale(units, scale)),
    ]
}

fn expenses() -> impl Strategy<Value = Vec<Expense>> {
    prop::collection::vec(
        (amount(), prop::option::of(prop::collection::vec(member_id(), 0..5))),
        0..12,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (cost, participants))| {
                let mut expense = Expense::new(
                    format!("e{i}"),
                    cost,
                    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
                );
                expense.participant_ids =
                    participants.map(|p| p.into_iter().map(Into::into).collect());
                expense
            })
            .collect()
    })
}

fn payments() -> impl Strategy<Value = Vec<Payment>> {
    prop::collection::vec((member_id(), amount()), 0..12).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (member, amount))| {
                Payment::new(
                    format!("p{i}"),
                    member,
                    amount,
                    Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap(),
                )
            })
            .collect()
    })
}

fn share_scale() -> impl Strategy<Value = u32> {
    0u32..=MAX_SHARE_SCALE
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Totals are exact sums of the inputs, and everything counted in a
    /// total is either attributed to a member or reported as unattributed.
    #[test]
    fn prop_conservation(
        members in roster(),
        expenses in expenses(),
        payments in payments(),
        scale in share_scale(),
    ) {
        let summary = BalanceEngine::new(scale).compute_summary(&members, &expenses, &payments);

        let expected_expenses: Decimal = expenses.iter().map(|e| e.total_cost).sum();
        let expected_payments: Decimal = payments.iter().map(|p| p.amount).sum();

        prop_assert_eq!(summary.total_expenses, expected_expenses);
        prop_assert_eq!(summary.total_payments, expected_payments);
        prop_assert_eq!(
            summary.owed_total() + summary.unattributed.expenses,
            summary.total_expenses
        );
        prop_assert_eq!(
            summary.paid_total() + summary.unattributed.payments,
            summary.total_payments
        );
        prop_assert_eq!(
            summary.remaining_amount,
            summary.total_expenses - summary.total_payments
        );
        for balance in summary.balances.values() {
            prop_assert_eq!(balance.net, balance.paid - balance.owed);
        }
    }

    /// When every participant and payer is on the roster, nothing is lost.
    #[test]
    fn prop_resolved_inputs_conserve_exactly(
        costs in prop::collection::vec(amount(), 0..10),
        paid in prop::collection::vec(amount(), 0..10),
        roster_size in 1usize..=5,
        scale in share_scale(),
    ) {
        let members: Vec<Member> = (0..roster_size)
            .map(|i| Member::new(format!("m{i}"), format!("Member {i}")))
            .collect();
        let at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let expenses: Vec<Expense> = costs
            .iter()
            .enumerate()
            .map(|(i, cost)| Expense::new(format!("e{i}"), *cost, at))
            .collect();
        let payments: Vec<Payment> = paid
            .iter()
            .enumerate()
            .map(|(i, amount)| {
                Payment::new(format!("p{i}"), format!("m{}", i % roster_size), *amount, at)
            })
            .collect();

        let summary = BalanceEngine::new(scale).compute_summary(&members, &expenses, &payments);

        prop_assert_eq!(summary.owed_total(), summary.total_expenses);
        prop_assert_eq!(summary.paid_total(), summary.total_payments);
        prop_assert!(summary.unattributed.expenses.is_zero());
        prop_assert!(summary.unattributed.payments.is_zero());
    }

    /// Same inputs, same output.
    #[test]
    fn prop_idempotent(
        members in roster(),
        expenses in expenses(),
        payments in payments(),
    ) {
        let engine = BalanceEngine::default();
        let first = engine.compute_summary(&members, &expenses, &payments);
        let second = engine.compute_summary(&members, &expenses, &payments);
        prop_assert_eq!(first, second);
    }

    /// Reordering the roster, expenses, payments or participant lists does
    /// not change the result.
    #[test]
    fn prop_order_independent(
        members in roster(),
        expenses in expenses(),
        payments in payments(),
        scale in share_scale(),
    ) {
        let engine = BalanceEngine::new(scale);
        let forward = engine.compute_summary(&members, &expenses, &payments);

        let mut members_rev = members.clone();
        members_rev.reverse();
        let mut expenses_rev = expenses.clone();
        expenses_rev.reverse();
        for expense in &mut expenses_rev {
            if let Some(ids) = expense.participant_ids.as_mut() {
                ids.reverse();
            }
        }
        let mut payments_rev = payments.clone();
        payments_rev.reverse();

        let backward = engine.compute_summary(&members_rev, &expenses_rev, &payments_rev);
        prop_assert_eq!(forward, backward);
    }

    /// Participants of a single expense owe amounts at most one unit apart.
    #[test]
    fn prop_single_expense_split_is_fair(
        cost in amount(),
        roster_size in 1usize..=5,
        scale in share_scale(),
    ) {
        let members: Vec<Member> = (0..roster_size)
            .map(|i| Member::new(format!("m{i}"), format!("Member {i}")))
            .collect();
        let expenses = vec![Expense::new(
            "e0",
            cost,
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        )];

        let summary = BalanceEngine::new(scale).compute_summary(&members, &expenses, &[]);

        let owed: Vec<Decimal> = summary.balances.values().map(|b| b.owed).collect();
        // Precision drops below the share scale when a large cost leaves no room.
        let unit = Decimal::new(1, owed.iter().map(Decimal::scale).max().unwrap_or(0));
        let max = owed.iter().copied().max().unwrap_or_default();
        let min = owed.iter().copied().min().unwrap_or_default();
        prop_assert!(max - min <= unit, "shares {:?} differ by more than {}", owed, unit);
        prop_assert_eq!(owed.iter().copied().sum::<Decimal>(), cost);
    }
}
