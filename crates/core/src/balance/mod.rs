//! Per-account, per-period balance arithmetic.
//!
//! One `PeriodBalance` row exists per (account, period). Rows are created
//! lazily, updated transactionally on each posting, and never written
//! directly by users.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tessera_shared::types::{AccountId, FiscalPeriodId};

/// Normal balance side of an account.
///
/// - Debit-normal (Asset, Expense): balance grows with debits
/// - Credit-normal (Liability, Equity, Revenue): balance grows with credits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NormalBalance {
    /// Debit-normal accounts (Asset, Expense).
    Debit,
    /// Credit-normal accounts (Liability, Equity, Revenue).
    Credit,
}

impl NormalBalance {
    /// Calculates the signed balance change for a debit/credit pair.
    #[must_use]
    pub fn balance_change(self, debit: Decimal, credit: Decimal) -> Decimal {
        match self {
            Self::Debit => debit - credit,
            Self::Credit => credit - debit,
        }
    }
}

/// Account balance for one fiscal period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodBalance {
    /// The account.
    pub account_id: AccountId,
    /// The fiscal period.
    pub period_id: FiscalPeriodId,
    /// Opening balance, inherited from the prior period's closing.
    pub opening: Decimal,
    /// Total debits posted in the period.
    pub debit_total: Decimal,
    /// Total credits posted in the period.
    pub credit_total: Decimal,
    /// Monotonically increasing version, bumped per applied posting.
    pub version: i64,
}

impl PeriodBalance {
    /// Creates a fresh balance row with the given opening balance.
    #[must_use]
    pub fn open_with(account_id: AccountId, period_id: FiscalPeriodId, opening: Decimal) -> Self {
        Self {
            account_id,
            period_id,
            opening,
            debit_total: Decimal::ZERO,
            credit_total: Decimal::ZERO,
            version: 0,
        }
    }

    /// Applies one posting's debit/credit to the row and bumps the version.
    pub fn apply(&mut self, debit: Decimal, credit: Decimal) {
        self.debit_total += debit;
        self.credit_total += credit;
        self.version += 1;
    }

    /// Closing balance under the account's sign convention:
    /// opening + debit - credit for debit-normal, mirrored for credit-normal.
    #[must_use]
    pub fn closing(&self, normal: NormalBalance) -> Decimal {
        self.opening + normal.balance_change(self.debit_total, self.credit_total)
    }

    /// Net period movement (excludes the opening balance).
    #[must_use]
    pub fn movement(&self, normal: NormalBalance) -> Decimal {
        normal.balance_change(self.debit_total, self.credit_total)
    }
}

/// Accumulated debit/credit delta for one account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostingDelta {
    /// The account.
    pub account_id: AccountId,
    /// Summed debit amount.
    pub debit: Decimal,
    /// Summed credit amount.
    pub credit: Decimal,
}

/// Groups journal line amounts into one delta per account.
///
/// An entry may carry several lines against the same account; balance
/// application wants one row touch per account. Output is sorted by
/// account id for deterministic application order.
#[must_use]
pub fn aggregate_deltas<I>(lines: I) -> Vec<PostingDelta>
where
    I: IntoIterator<Item = (AccountId, Decimal, Decimal)>,
{
    let mut map: std::collections::HashMap<AccountId, (Decimal, Decimal)> =
        std::collections::HashMap::new();

    for (account_id, debit, credit) in lines {
        let entry = map.entry(account_id).or_insert((Decimal::ZERO, Decimal::ZERO));
        entry.0 += debit;
        entry.1 += credit;
    }

    let mut deltas: Vec<PostingDelta> = map
        .into_iter()
        .map(|(account_id, (debit, credit))| PostingDelta {
            account_id,
            debit,
            credit,
        })
        .collect();

    deltas.sort_by_key(|d| d.account_id);
    deltas
}
