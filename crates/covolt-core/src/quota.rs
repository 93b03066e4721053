//! Per-member override quota ledgers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{GroupId, UserId};
use crate::month::MonthKey;

/// One member's override ledger for one group and one month.
///
/// Records are keyed by `(user, group, month)`. A new month reads as an
/// absent record and therefore a full budget; nothing ever decrements the
/// counter, including cancellation of the overriding booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaRecord {
    /// The member the budget belongs to.
    pub user_id: UserId,
    /// The group the budget applies in.
    pub group_id: GroupId,
    /// The month bucket.
    pub month: MonthKey,
    /// Overrides consumed so far this month.
    pub overrides_used: u32,
    /// The budget in force when the record was created.
    pub max_overrides: u32,
}

impl QuotaRecord {
    /// Create a fresh ledger with nothing consumed.
    #[must_use]
    pub const fn new(user_id: UserId, group_id: GroupId, month: MonthKey, max_overrides: u32) -> Self {
        Self {
            user_id,
            group_id,
            month,
            overrides_used: 0,
            max_overrides,
        }
    }

    /// Consume one override if budget remains.
    ///
    /// Returns `false` without changing the record when the budget is
    /// exhausted.
    pub fn try_charge(&mut self) -> bool {
        if self.overrides_used >= self.max_overrides {
            return false;
        }
        self.overrides_used += 1;
        true
    }

    /// Overrides still available this month.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.max_overrides.saturating_sub(self.overrides_used)
    }

    /// Read-only summary of the ledger.
    #[must_use]
    pub fn status(&self) -> QuotaStatus {
        QuotaStatus {
            overrides_used: self.overrides_used,
            overrides_remaining: self.remaining(),
            max_overrides_per_month: self.max_overrides,
            month: self.month,
            next_reset: self.month.next_reset(),
        }
    }
}

/// Read-only summary of a member's override budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaStatus {
    /// Overrides consumed this month.
    pub overrides_used: u32,
    /// Overrides still available this month.
    pub overrides_remaining: u32,
    /// Configured monthly budget.
    pub max_overrides_per_month: u32,
    /// The month the figures apply to.
    pub month: MonthKey,
    /// When the budget lapses and a fresh one begins.
    pub next_reset: DateTime<Utc>,
}

impl QuotaStatus {
    /// Status for a member with no ledger record yet this month.
    #[must_use]
    pub fn fresh(month: MonthKey, max_overrides: u32) -> Self {
        Self {
            overrides_used: 0,
            overrides_remaining: max_overrides,
            max_overrides_per_month: max_overrides,
            month,
            next_reset: month.next_reset(),
        }
    }
}
