//! Journal error types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tessera_shared::types::{AccountId, Currency, JournalEntryId};
use thiserror::Error;

use super::types::JournalStatus;

/// Errors that can occur during journal operations.
#[derive(Debug, Error)]
pub enum JournalError {
    // ========== Validation Errors ==========
    /// Journal entry must have at least 2 lines.
    #[error("Journal entry must have at least 2 lines")]
    InsufficientLines,

    /// Entry is not balanced (debits != credits).
    #[error("Journal entry is not balanced. Debit: {debit}, Credit: {credit}")]
    UnbalancedEntry {
        /// Total debit amount.
        debit: Decimal,
        /// Total credit amount.
        credit: Decimal,
    },

    /// A line must carry a debit or a credit.
    #[error("Journal line amount cannot be zero")]
    ZeroAmount,

    /// Line amounts cannot be negative.
    #[error("Journal line amount cannot be negative")]
    NegativeAmount,

    /// A line carries both a debit and a credit.
    #[error("Journal line must specify either debit or credit, not both")]
    BothDebitAndCredit,

    /// Line currency does not match the entry currency.
    #[error("Line currency {found} does not match entry currency {expected}")]
    CurrencyMismatch {
        /// The entry currency.
        expected: Currency,
        /// The offending line currency.
        found: Currency,
    },

    // ========== Account Errors ==========
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Account is inactive and cannot be posted to.
    #[error("Account {0} is inactive")]
    AccountInactive(AccountId),

    /// Group accounts never receive postings.
    #[error("Account {0} is a group account and cannot be posted to")]
    GroupAccountPosting(AccountId),

    // ========== Period Errors ==========
    /// Posting into a non-Open period.
    #[error("Fiscal period is not open for posting")]
    PeriodClosed,

    /// The target period is locked against reversals and adjustments.
    #[error("Fiscal period is locked")]
    PeriodLocked,

    /// No fiscal period exists for the entry date.
    #[error("No fiscal period found for date {0}")]
    NoPeriodForDate(NaiveDate),

    // ========== State Errors ==========
    /// Illegal journal status change.
    #[error("Invalid journal status transition from {from:?} to {to:?}")]
    InvalidStateTransition {
        /// Current status.
        from: JournalStatus,
        /// Target status.
        to: JournalStatus,
    },

    /// Journal entry not found.
    #[error("Journal entry not found: {0}")]
    EntryNotFound(JournalEntryId),

    // ========== Concurrency Errors ==========
    /// Concurrent modification detected.
    #[error("Concurrent modification detected, please retry")]
    ConcurrentModification,

    // ========== Internal Errors ==========
    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl JournalError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientLines => "INSUFFICIENT_LINES",
            Self::UnbalancedEntry { .. } => "UNBALANCED_ENTRY",
            Self::ZeroAmount => "ZERO_AMOUNT",
            Self::NegativeAmount => "NEGATIVE_AMOUNT",
            Self::BothDebitAndCredit => "BOTH_DEBIT_AND_CREDIT",
            Self::CurrencyMismatch { .. } => "CURRENCY_MISMATCH",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::AccountInactive(_) => "ACCOUNT_INACTIVE",
            Self::GroupAccountPosting(_) => "GROUP_ACCOUNT_POSTING",
            Self::PeriodClosed => "PERIOD_CLOSED",
            Self::PeriodLocked => "PERIOD_LOCKED",
            Self::NoPeriodForDate(_) => "NO_PERIOD_FOR_DATE",
            Self::InvalidStateTransition { .. } => "INVALID_STATE_TRANSITION",
            Self::EntryNotFound(_) => "ENTRY_NOT_FOUND",
            Self::ConcurrentModification => "CONCURRENT_MODIFICATION",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns true if this error is retryable.
    ///
    /// Validation errors never are; transient contention is.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrentModification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            JournalError::UnbalancedEntry {
                debit: dec!(100),
                credit: dec!(50),
            }
            .error_code(),
            "UNBALANCED_ENTRY"
        );
        assert_eq!(JournalError::PeriodClosed.error_code(), "PERIOD_CLOSED");
        assert_eq!(
            JournalError::InvalidStateTransition {
                from: JournalStatus::Draft,
                to: JournalStatus::Reversed,
            }
            .error_code(),
            "INVALID_STATE_TRANSITION"
        );
    }

    #[test]
    fn test_retryable_errors() {
        assert!(JournalError::ConcurrentModification.is_retryable());
        assert!(!JournalError::InsufficientLines.is_retryable());
        assert!(!JournalError::PeriodClosed.is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = JournalError::UnbalancedEntry {
            debit: dec!(100.00),
            credit: dec!(50.00),
        };
        assert_eq!(
            err.to_string(),
            "Journal entry is not balanced. Debit: 100.00, Credit: 50.00"
        );
    }
}
