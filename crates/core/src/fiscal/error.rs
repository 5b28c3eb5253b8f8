//! Fiscal year and period error types.

use tessera_shared::types::{FiscalPeriodId, FiscalYearId};
use thiserror::Error;

use super::types::PeriodStatus;

/// Errors that can occur during fiscal year and period operations.
#[derive(Debug, Error)]
pub enum FiscalError {
    /// Start date must be before end date.
    #[error("Start date must be before end date")]
    InvalidDateRange,

    /// Fiscal year overlaps with an existing year.
    #[error("Fiscal year overlaps with existing year: {0}")]
    OverlappingYear(String),

    /// Fiscal year not found.
    #[error("Fiscal year not found: {0}")]
    YearNotFound(FiscalYearId),

    /// Fiscal period not found.
    #[error("Fiscal period not found: {0}")]
    PeriodNotFound(FiscalPeriodId),

    /// No fiscal period exists for the given date.
    #[error("No fiscal period found for date {0}")]
    NoPeriodForDate(chrono::NaiveDate),

    /// Periods within a year must be contiguous and non-overlapping.
    #[error("Periods {first} and {second} are not contiguous")]
    PeriodsNotContiguous {
        /// Sequence number of the earlier period.
        first: i32,
        /// Sequence number of the later period.
        second: i32,
    },

    /// Cannot close a period while draft entries are dated inside it.
    #[error("Cannot close period: {0} draft journal entries outstanding")]
    DraftEntriesOutstanding(usize),

    /// Cannot close a period while earlier periods are still open.
    #[error("Cannot close period: earlier periods must be closed first")]
    EarlierPeriodsOpen,

    /// Invalid status transition.
    #[error("Invalid period status transition from {from:?} to {to:?}")]
    InvalidStatusTransition {
        /// Current status.
        from: PeriodStatus,
        /// Target status.
        to: PeriodStatus,
    },
}

impl FiscalError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidDateRange => "INVALID_DATE_RANGE",
            Self::OverlappingYear(_) => "OVERLAPPING_FISCAL_YEAR",
            Self::YearNotFound(_) => "FISCAL_YEAR_NOT_FOUND",
            Self::PeriodNotFound(_) => "FISCAL_PERIOD_NOT_FOUND",
            Self::NoPeriodForDate(_) => "NO_PERIOD_FOR_DATE",
            Self::PeriodsNotContiguous { .. } => "PERIODS_NOT_CONTIGUOUS",
            Self::DraftEntriesOutstanding(_) => "DRAFT_ENTRIES_OUTSTANDING",
            Self::EarlierPeriodsOpen => "EARLIER_PERIODS_OPEN",
            Self::InvalidStatusTransition { .. } => "INVALID_STATUS_TRANSITION",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(FiscalError::InvalidDateRange.error_code(), "INVALID_DATE_RANGE");
        assert_eq!(
            FiscalError::EarlierPeriodsOpen.error_code(),
            "EARLIER_PERIODS_OPEN"
        );
        assert_eq!(
            FiscalError::InvalidStatusTransition {
                from: PeriodStatus::Locked,
                to: PeriodStatus::Open,
            }
            .error_code(),
            "INVALID_STATUS_TRANSITION"
        );
    }
}
