//! Balance computation over a group's expenses and payments.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use tabsplit_shared::config::EngineConfig;
use tabsplit_shared::types::MemberId;
use tracing::{debug, trace, warn};

use super::allocation::AllocationUtil;
use super::types::{Expense, Member, MemberBalance, Payment, Summary, Unattributed};

/// Default number of decimal places carried by each share.
pub const DEFAULT_SHARE_SCALE: u32 = 8;

/// Largest scale a `Decimal` can hold.
const MAX_DECIMAL_SCALE: u32 = 28;

/// Computes per-member balances from a roster, expenses and payments.
///
/// The engine holds no state besides its precision setting; it never mutates
/// its inputs and never fails. Malformed input degrades to a partial summary:
/// - expenses without participants are shared by the whole roster
/// - shares of participants missing from the roster go to `unattributed`
/// - payments from members missing from the roster go to `unattributed`
/// - with an empty roster, costs and payments still count toward the totals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceEngine {
    share_scale: u32,
}

impl BalanceEngine {
    /// Creates an engine carrying shares at `share_scale` decimal places.
    ///
    /// The scale is raised per expense when the cost itself is more precise,
    /// so a cost is never rounded. Values above 28 are clamped.
    #[must_use]
    pub const fn new(share_scale: u32) -> Self {
        let share_scale = if share_scale > MAX_DECIMAL_SCALE {
            MAX_DECIMAL_SCALE
        } else {
            share_scale
        };
        Self { share_scale }
    }

    /// Creates an engine from configuration.
    #[must_use]
    pub const fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.share_scale)
    }

    /// Decimal places carried by each share.
    #[must_use]
    pub const fn share_scale(&self) -> u32 {
        self.share_scale
    }

    /// Computes totals and balances for one group.
    ///
    /// Input order is irrelevant: participants are split in id order and the
    /// balance map is ordered, so equal inputs always give equal output.
    ///
    /// A record that would push any total, balance or difference past the
    /// range of `Decimal` is skipped whole (logged at `warn`), so the
    /// conservation sums still hold over the records that were counted.
    #[must_use]
    pub fn compute_summary(
        &self,
        members: &[Member],
        expenses: &[Expense],
        payments: &[Payment],
    ) -> Summary {
        let mut ledger = Ledger::new(members);
        let roster = ledger.roster();

        for expense in expenses {
            let participants = Self::effective_participants(expense, &roster);
            let scale = self.share_scale.max(expense.total_cost.scale());
            let shares =
                AllocationUtil::allocate_equal(expense.total_cost, participants.len(), scale);

            if ledger.add_expense(expense, &participants, &shares).is_none() {
                warn!(
                    expense = %expense.id,
                    total_cost = %expense.total_cost,
                    "expense skipped: amounts overflow"
                );
            }
        }

        for payment in payments {
            if ledger.add_payment(payment).is_none() {
                warn!(
                    payment = %payment.id,
                    amount = %payment.amount,
                    "payment skipped: amounts overflow"
                );
            }
        }

        let summary = ledger.into_summary();

        if !summary.unattributed.expenses.is_zero() || !summary.unattributed.payments.is_zero() {
            debug!(
                unattributed_expenses = %summary.unattributed.expenses,
                unattributed_payments = %summary.unattributed.payments,
                "summary has amounts not attributed to any member"
            );
        }

        summary
    }

    /// Participants sharing an expense, de-duplicated and ordered by id.
    ///
    /// An absent or empty participant list means the whole roster.
    fn effective_participants<'a>(
        expense: &'a Expense,
        roster: &BTreeSet<&'a MemberId>,
    ) -> BTreeSet<&'a MemberId> {
        match expense.participant_ids.as_deref() {
            Some(ids) if !ids.is_empty() => ids.iter().collect(),
            _ => roster.clone(),
        }
    }
}

/// Running sums of one computation.
///
/// Every add checks all affected sums and differences before committing, so
/// a record is either counted everywhere or nowhere.
struct Ledger<'a> {
    owed: BTreeMap<&'a MemberId, Decimal>,
    paid: BTreeMap<&'a MemberId, Decimal>,
    total_expenses: Decimal,
    total_payments: Decimal,
    unattributed: Unattributed,
}

impl<'a> Ledger<'a> {
    fn new(members: &'a [Member]) -> Self {
        let owed: BTreeMap<&MemberId, Decimal> =
            members.iter().map(|m| (&m.id, Decimal::ZERO)).collect();
        Self {
            paid: owed.clone(),
            owed,
            total_expenses: Decimal::ZERO,
            total_payments: Decimal::ZERO,
            unattributed: Unattributed::default(),
        }
    }

    fn roster(&self) -> BTreeSet<&'a MemberId> {
        self.owed.keys().copied().collect()
    }

    fn owed_of(&self, member: &MemberId) -> Decimal {
        self.owed.get(member).copied().unwrap_or_default()
    }

    fn paid_of(&self, member: &MemberId) -> Decimal {
        self.paid.get(member).copied().unwrap_or_default()
    }

    /// Counts one expense, or returns `None` leaving the ledger untouched.
    fn add_expense(
        &mut self,
        expense: &Expense,
        participants: &BTreeSet<&MemberId>,
        shares: &[Decimal],
    ) -> Option<()> {
        let total_expenses = self.total_expenses.checked_add(expense.total_cost)?;
        total_expenses.checked_sub(self.total_payments)?;

        let mut unattributed = self.unattributed.expenses;
        let mut owed_updates = Vec::with_capacity(participants.len());

        if participants.is_empty() {
            trace!(expense = %expense.id, "expense has no participants to split between");
            unattributed = unattributed.checked_add(expense.total_cost)?;
        }

        for (participant, share) in participants.iter().zip(shares) {
            if self.owed.contains_key(*participant) {
                let owed = self.owed_of(participant).checked_add(*share)?;
                self.paid_of(participant).checked_sub(owed)?;
                owed_updates.push((*participant, owed));
            } else {
                trace!(
                    expense = %expense.id,
                    participant = %participant,
                    "participant not on roster"
                );
                unattributed = unattributed.checked_add(*share)?;
            }
        }

        for (participant, owed) in owed_updates {
            if let Some(entry) = self.owed.get_mut(participant) {
                *entry = owed;
            }
        }
        self.unattributed.expenses = unattributed;
        self.total_expenses = total_expenses;
        Some(())
    }

    /// Counts one payment, or returns `None` leaving the ledger untouched.
    fn add_payment(&mut self, payment: &Payment) -> Option<()> {
        let total_payments = self.total_payments.checked_add(payment.amount)?;
        self.total_expenses.checked_sub(total_payments)?;

        if let Some(current) = self.paid.get(&payment.member_id).copied() {
            let paid = current.checked_add(payment.amount)?;
            paid.checked_sub(self.owed_of(&payment.member_id))?;
            if let Some(entry) = self.paid.get_mut(&payment.member_id) {
                *entry = paid;
            }
        } else {
            trace!(
                payment = %payment.id,
                member = %payment.member_id,
                "payment from member not on roster"
            );
            self.unattributed.payments =
                self.unattributed.payments.checked_add(payment.amount)?;
        }

        self.total_payments = total_payments;
        Some(())
    }

    fn into_summary(self) -> Summary {
        let balances: BTreeMap<MemberId, MemberBalance> = self
            .owed
            .iter()
            .map(|(id, owed)| ((*id).clone(), MemberBalance::new(*owed, self.paid_of(id))))
            .collect();

        Summary {
            total_expenses: self.total_expenses,
            total_payments: self.total_payments,
            member_count: balances.len(),
            // Checked representable on every add.
            remaining_amount: self.total_expenses.saturating_sub(self.total_payments),
            balances,
            unattributed: self.unattributed,
        }
    }
}

impl Default for BalanceEngine {
    fn default() -> Self {
        Self::new(DEFAULT_SHARE_SCALE)
    }
}

/// Computes a summary with the default engine.
#[must_use]
pub fn compute_summary(members: &[Member], expenses: &[Expense], payments: &[Payment]) -> Summary {
    BalanceEngine::default().compute_summary(members, expenses, payments)
}
