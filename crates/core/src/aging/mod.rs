//! Aging of open subledger balances.
//!
//! Open document balances are classified by days past due into fixed
//! buckets and rolled up per counterparty. Bucket sums always equal the
//! counterparty's total outstanding balance since every open balance
//! lands in exactly one bucket.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tessera_shared::types::PartyId;

use crate::subledger::SubledgerDocument;

/// Age classification of an open balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgingBucket {
    /// Not yet due (age <= 0 days).
    Current,
    /// 1 to 30 days past due.
    Days1To30,
    /// 31 to 60 days past due.
    Days31To60,
    /// 61 to 90 days past due.
    Days61To90,
    /// More than 90 days past due.
    Over90,
}

impl AgingBucket {
    /// All buckets in ascending age order.
    pub const ALL: [Self; 5] = [
        Self::Current,
        Self::Days1To30,
        Self::Days31To60,
        Self::Days61To90,
        Self::Over90,
    ];

    /// Classifies an age in days. A document due today or in the future
    /// is Current.
    #[must_use]
    pub fn for_age(age_days: i64) -> Self {
        match age_days {
            i64::MIN..=0 => Self::Current,
            1..=30 => Self::Days1To30,
            31..=60 => Self::Days31To60,
            61..=90 => Self::Days61To90,
            _ => Self::Over90,
        }
    }
}

/// Outstanding balance split across the aging buckets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgingBreakdown {
    /// Not yet due.
    pub current: Decimal,
    /// 1 to 30 days past due.
    pub days_1_30: Decimal,
    /// 31 to 60 days past due.
    pub days_31_60: Decimal,
    /// 61 to 90 days past due.
    pub days_61_90: Decimal,
    /// More than 90 days past due.
    pub over_90: Decimal,
}

impl AgingBreakdown {
    /// Adds an amount to the given bucket.
    pub fn add(&mut self, bucket: AgingBucket, amount: Decimal) {
        match bucket {
            AgingBucket::Current => self.current += amount,
            AgingBucket::Days1To30 => self.days_1_30 += amount,
            AgingBucket::Days31To60 => self.days_31_60 += amount,
            AgingBucket::Days61To90 => self.days_61_90 += amount,
            AgingBucket::Over90 => self.over_90 += amount,
        }
    }

    /// Sum of all buckets.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.current + self.days_1_30 + self.days_31_60 + self.days_61_90 + self.over_90
    }
}

/// Aging rollup for one counterparty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartyAging {
    /// The counterparty.
    pub party_id: PartyId,
    /// Per-bucket amounts.
    pub breakdown: AgingBreakdown,
    /// Total outstanding balance.
    pub total_outstanding: Decimal,
}

/// Aging report for an organization at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgingReport {
    /// The report date.
    pub as_of: NaiveDate,
    /// Per-counterparty rollups, ordered by party id.
    pub parties: Vec<PartyAging>,
    /// Overall per-bucket amounts across all counterparties.
    pub totals: AgingBreakdown,
}

/// Computes the aging report over the given documents.
///
/// Only documents with a positive balance due and an open status
/// contribute. Each contributes its full balance due to exactly one
/// bucket, so per-party bucket sums equal the party's outstanding total.
#[must_use]
pub fn compute_aging<'a, I>(documents: I, as_of: NaiveDate) -> AgingReport
where
    I: IntoIterator<Item = &'a SubledgerDocument>,
{
    let mut parties: BTreeMap<PartyId, AgingBreakdown> = BTreeMap::new();
    let mut totals = AgingBreakdown::default();

    for doc in documents {
        let balance = doc.balance_due();
        if !doc.status.is_open() || balance <= Decimal::ZERO {
            continue;
        }
        let bucket = AgingBucket::for_age(doc.age_days(as_of));
        parties.entry(doc.party_id).or_default().add(bucket, balance);
        totals.add(bucket, balance);
    }

    let parties = parties
        .into_iter()
        .map(|(party_id, breakdown)| {
            let total_outstanding = breakdown.total();
            PartyAging {
                party_id,
                breakdown,
                total_outstanding,
            }
        })
        .collect();

    AgingReport {
        as_of,
        parties,
        totals,
    }
}
