//! Fiscal year and period types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tessera_shared::types::{FiscalPeriodId, FiscalYearId, OrganizationId};

use super::error::FiscalError;

/// Fiscal year definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FiscalYear {
    /// Unique identifier.
    pub id: FiscalYearId,
    /// Organization this fiscal year belongs to.
    pub organization_id: OrganizationId,
    /// Year name (e.g., "FY2026").
    pub name: String,
    /// Start date of the fiscal year.
    pub start_date: NaiveDate,
    /// End date of the fiscal year.
    pub end_date: NaiveDate,
    /// True once every period in the year has been closed.
    pub is_closed: bool,
}

/// Status of a fiscal period.
///
/// Transitions are strictly one-way: Open -> Closed -> Locked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodStatus {
    /// Period accepts postings.
    Open,
    /// Period is closed; balances are frozen, no new postings.
    Closed,
    /// Period is locked; additionally forbids reversals and adjustments
    /// targeting it.
    Locked,
}

impl PeriodStatus {
    /// Returns true if journal entries may be posted into this period.
    #[must_use]
    pub fn allows_posting(self) -> bool {
        matches!(self, Self::Open)
    }

    /// Returns true if reversals/adjustments targeting the period are allowed.
    #[must_use]
    pub fn allows_adjustments(self) -> bool {
        !matches!(self, Self::Locked)
    }

    /// Validates a status transition.
    ///
    /// # Errors
    ///
    /// Returns `FiscalError::InvalidStatusTransition` for anything other
    /// than Open -> Closed or Closed -> Locked.
    pub fn validate_transition(self, to: Self) -> Result<(), FiscalError> {
        match (self, to) {
            (Self::Open, Self::Closed) | (Self::Closed, Self::Locked) => Ok(()),
            (from, to) => Err(FiscalError::InvalidStatusTransition { from, to }),
        }
    }
}

/// A fiscal period within a fiscal year.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FiscalPeriod {
    /// Unique identifier.
    pub id: FiscalPeriodId,
    /// Fiscal year this period belongs to.
    pub fiscal_year_id: FiscalYearId,
    /// Sequence number within the year (1-12 for monthly).
    pub sequence: i32,
    /// Period name (e.g., "January 2026").
    pub name: String,
    /// Start date of the period.
    pub start_date: NaiveDate,
    /// End date of the period.
    pub end_date: NaiveDate,
    /// Current status.
    pub status: PeriodStatus,
}

impl FiscalPeriod {
    /// Returns true if transactions can be posted to this period.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == PeriodStatus::Open
    }

    /// Returns true if the given date falls within this period.
    #[must_use]
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }
}
