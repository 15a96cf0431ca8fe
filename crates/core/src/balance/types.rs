//! Balance engine input and output types.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use tabsplit_shared::types::{ExpenseId, MemberId, PaymentId};

/// Role of a member within a group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    /// Group creator.
    Owner,
    /// Member with management rights.
    Admin,
    /// Regular member.
    #[default]
    Member,
}

/// A person eligible to owe and pay within a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Stable member identifier.
    pub id: MemberId,
    /// Name shown in reports.
    pub display_name: String,
    /// Role within the group.
    #[serde(default)]
    pub role: MemberRole,
}

impl Member {
    /// Creates a regular member.
    #[must_use]
    pub fn new(id: impl Into<MemberId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            role: MemberRole::Member,
        }
    }

    /// Sets the member's role.
    #[must_use]
    pub const fn with_role(mut self, role: MemberRole) -> Self {
        self.role = role;
        self
    }
}

/// A shared cost split between participants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    /// Expense identifier.
    pub id: ExpenseId,
    /// Total cost of the expense.
    #[serde(alias = "total_price")]
    pub total_cost: Decimal,
    /// Members sharing the cost. `None` or empty means the whole roster.
    #[serde(default, alias = "participants")]
    pub participant_ids: Option<Vec<MemberId>>,
    /// When the expense was recorded.
    pub created_at: DateTime<Utc>,
    /// What was bought (e.g. the food item); used as the report category.
    #[serde(default, alias = "food_item")]
    pub label: Option<String>,
    /// Member who logged the expense.
    #[serde(default)]
    pub created_by: Option<MemberId>,
}

impl Expense {
    /// Creates an expense shared by the whole roster.
    #[must_use]
    pub fn new(id: impl Into<ExpenseId>, total_cost: Decimal, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            total_cost,
            participant_ids: None,
            created_at,
            label: None,
            created_by: None,
        }
    }

    /// Restricts the expense to the given participants.
    #[must_use]
    pub fn with_participants<I, M>(mut self, participants: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<MemberId>,
    {
        self.participant_ids = Some(participants.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the expense label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets the member who logged the expense.
    #[must_use]
    pub fn with_creator(mut self, creator: impl Into<MemberId>) -> Self {
        self.created_by = Some(creator.into());
        self
    }
}

/// Money a member contributed toward their share.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    /// Payment identifier.
    pub id: PaymentId,
    /// Paying member.
    #[serde(alias = "user_id")]
    pub member_id: MemberId,
    /// Amount paid.
    pub amount: Decimal,
    /// When the payment was made.
    #[serde(alias = "payment_date")]
    pub paid_at: DateTime<Utc>,
    /// Payment method (cash, transfer, ...).
    #[serde(default, alias = "payment_method")]
    pub method: Option<String>,
}

impl Payment {
    /// Creates a payment.
    #[must_use]
    pub fn new(
        id: impl Into<PaymentId>,
        member_id: impl Into<MemberId>,
        amount: Decimal,
        paid_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            member_id: member_id.into(),
            amount,
            paid_at,
            method: None,
        }
    }

    /// Sets the payment method.
    #[must_use]
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }
}

/// Whether a member is ahead, behind, or settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceStatus {
    /// Paid more than owed (`net > 0`).
    Creditor,
    /// Paid less than owed (`net < 0`).
    Debtor,
    /// Fully settled (`net == 0`).
    Settled,
}

/// Per-member ledger figures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberBalance {
    /// Sum of the member's expense shares.
    pub owed: Decimal,
    /// Sum of the member's payments.
    pub paid: Decimal,
    /// `paid - owed`.
    pub net: Decimal,
}

impl MemberBalance {
    /// Builds a balance, deriving `net`.
    ///
    /// `net` saturates at the `Decimal` bounds. The engine only builds
    /// balances whose `net` is representable.
    #[must_use]
    pub fn new(owed: Decimal, paid: Decimal) -> Self {
        Self {
            owed,
            paid,
            net: paid.saturating_sub(owed),
        }
    }

    /// Sign of `net` as a status.
    #[must_use]
    pub fn status(&self) -> BalanceStatus {
        match self.net.cmp(&Decimal::ZERO) {
            std::cmp::Ordering::Greater => BalanceStatus::Creditor,
            std::cmp::Ordering::Less => BalanceStatus::Debtor,
            std::cmp::Ordering::Equal => BalanceStatus::Settled,
        }
    }
}

/// Amounts counted in the totals but not attributed to any roster member.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unattributed {
    /// Expense shares of participants missing from the roster, plus costs of
    /// expenses that had nobody to split between.
    pub expenses: Decimal,
    /// Payments from members missing from the roster.
    pub payments: Decimal,
}

/// Group-level totals and per-member balances.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Sum of all expense costs.
    pub total_expenses: Decimal,
    /// Sum of all payments.
    pub total_payments: Decimal,
    /// Number of distinct roster members.
    pub member_count: usize,
    /// `total_expenses - total_payments`.
    pub remaining_amount: Decimal,
    /// Balance of every roster member, keyed by member id.
    pub balances: BTreeMap<MemberId, MemberBalance>,
    /// Portion of the totals not attributed to any member.
    pub unattributed: Unattributed,
}

impl Summary {
    /// The all-zero summary shown when data cannot be loaded.
    #[must_use]
    pub fn zero() -> Self {
        Self::default()
    }

    /// Returns the balance of a member, if they are on the roster.
    #[must_use]
    pub fn balance(&self, member_id: &MemberId) -> Option<&MemberBalance> {
        self.balances.get(member_id)
    }

    /// Sum of `owed` across all balances.
    #[must_use]
    pub fn owed_total(&self) -> Decimal {
        self.balances.values().map(|b| b.owed).sum()
    }

    /// Sum of `paid` across all balances.
    #[must_use]
    pub fn paid_total(&self) -> Decimal {
        self.balances.values().map(|b| b.paid).sum()
    }

    /// Copy of the summary with every amount rounded for display.
    ///
    /// Uses Banker's Rounding. Rounded figures no longer satisfy the
    /// conservation sums exactly; keep the unrounded summary for arithmetic.
    #[must_use]
    pub fn rounded(&self, decimal_places: u32) -> Self {
        let round = |v: Decimal| {
            v.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointNearestEven)
        };

        Self {
            total_expenses: round(self.total_expenses),
            total_payments: round(self.total_payments),
            member_count: self.member_count,
            remaining_amount: round(self.remaining_amount),
            balances: self
                .balances
                .iter()
                .map(|(id, b)| {
                    (
                        id.clone(),
                        MemberBalance {
                            owed: round(b.owed),
                            paid: round(b.paid),
                            net: round(b.net),
                        },
                    )
                })
                .collect(),
            unattributed: Unattributed {
                expenses: round(self.unattributed.expenses),
                payments: round(self.unattributed.payments),
            },
        }
    }
}
