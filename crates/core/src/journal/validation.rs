//! Journal entry validation service.
//!
//! Pure business logic with no storage dependencies. Account resolution is
//! injected as a closure so the rules can run against any backing store.

use rust_decimal::Decimal;
use tessera_shared::types::AccountId;

use super::error::JournalError;
use super::types::{CreateJournalInput, EntryTotals, JournalLineInput, JournalStatus};
use crate::fiscal::PeriodStatus;

/// Information about an account needed for line validation.
#[derive(Debug, Clone)]
pub struct LineAccountInfo {
    /// The account ID.
    pub id: AccountId,
    /// Whether the account is active.
    pub is_active: bool,
    /// Whether the account is a group (non-posting) account.
    pub is_group: bool,
    /// The account's currency.
    pub currency: tessera_shared::types::Currency,
}

/// Journal validation service.
///
/// This service contains pure business logic with no database dependencies.
pub struct JournalService;

impl JournalService {
    /// Validate a journal entry before persisting.
    ///
    /// Checks, in order:
    /// 1. At least 2 lines
    /// 2. Each line carries exactly one nonzero side, non-negative
    /// 3. Each line's currency matches the entry currency
    /// 4. Each account exists, is active, and is not a group account
    /// 5. Total debits equal total credits, exactly
    ///
    /// # Errors
    ///
    /// Returns `JournalError` if validation fails.
    pub fn validate_entry<A>(
        input: &CreateJournalInput,
        account_lookup: A,
    ) -> Result<EntryTotals, JournalError>
    where
        A: Fn(AccountId) -> Option<LineAccountInfo>,
    {
        if input.lines.len() < 2 {
            return Err(JournalError::InsufficientLines);
        }

        for line in &input.lines {
            Self::validate_line_shape(line)?;

            let account =
                account_lookup(line.account_id).ok_or(JournalError::AccountNotFound(line.account_id))?;
            if !account.is_active {
                return Err(JournalError::AccountInactive(account.id));
            }
            if account.is_group {
                return Err(JournalError::GroupAccountPosting(account.id));
            }
            if account.currency != input.currency {
                return Err(JournalError::CurrencyMismatch {
                    expected: input.currency,
                    found: account.currency,
                });
            }
        }

        let totals = Self::calculate_totals(&input.lines);
        if !totals.is_balanced {
            return Err(JournalError::UnbalancedEntry {
                debit: totals.total_debit,
                credit: totals.total_credit,
            });
        }

        Ok(totals)
    }

    /// Validate the debit/credit shape of a single line.
    ///
    /// Exactly one of debit/credit must be nonzero, and neither may be
    /// negative.
    ///
    /// # Errors
    ///
    /// Returns the specific `JournalError` for the violated rule.
    pub fn validate_line_shape(line: &JournalLineInput) -> Result<(), JournalError> {
        if line.debit < Decimal::ZERO || line.credit < Decimal::ZERO {
            return Err(JournalError::NegativeAmount);
        }
        match (line.debit.is_zero(), line.credit.is_zero()) {
            (true, true) => Err(JournalError::ZeroAmount),
            (false, false) => Err(JournalError::BothDebitAndCredit),
            _ => Ok(()),
        }
    }

    /// Calculate entry totals from line inputs.
    #[must_use]
    pub fn calculate_totals(lines: &[JournalLineInput]) -> EntryTotals {
        let total_debit: Decimal = lines.iter().map(|l| l.debit).sum();
        let total_credit: Decimal = lines.iter().map(|l| l.credit).sum();
        EntryTotals::new(total_debit, total_credit)
    }

    /// Validate that an entry may be posted into the given period.
    ///
    /// # Errors
    ///
    /// Returns `JournalError::PeriodClosed` unless the period is Open.
    pub fn validate_period_open(status: PeriodStatus) -> Result<(), JournalError> {
        if status.allows_posting() {
            Ok(())
        } else {
            Err(JournalError::PeriodClosed)
        }
    }

    /// Validate that a posted entry may be reversed.
    ///
    /// The entry must be Posted and its own period must not be Locked
    /// (locking a period forbids reversals targeting it).
    ///
    /// # Errors
    ///
    /// Returns `JournalError::InvalidStateTransition` or
    /// `JournalError::PeriodLocked`.
    pub fn validate_reverse(
        status: JournalStatus,
        period_status: PeriodStatus,
    ) -> Result<(), JournalError> {
        status.validate_transition(JournalStatus::Reversed)?;
        if !period_status.allows_adjustments() {
            return Err(JournalError::PeriodLocked);
        }
        Ok(())
    }

    /// Validate that a draft entry may be cancelled.
    ///
    /// # Errors
    ///
    /// Returns `JournalError::InvalidStateTransition` unless Draft.
    pub fn validate_cancel(status: JournalStatus) -> Result<(), JournalError> {
        status.validate_transition(JournalStatus::Cancelled)
    }
}
