//! Mapping from domain errors to the boundary `AppError` taxonomy.
//!
//! Repositories surface `AppError` so callers get one error shape with
//! stable status/code semantics; the originating domain message is kept
//! verbatim.

use tessera_core::coa::CoaError;
use tessera_core::fiscal::FiscalError;
use tessera_core::journal::JournalError;
use tessera_core::reconciliation::ReconciliationError;
use tessera_core::reports::ReportError;
use tessera_core::subledger::SubledgerError;
use tessera_shared::error::AppError;

pub(crate) fn coa(err: CoaError) -> AppError {
    let message = err.to_string();
    match err {
        CoaError::AccountNotFound(_) | CoaError::ParentNotFound(_) => AppError::NotFound(message),
        CoaError::DuplicateCode(_) => AppError::Conflict(message),
        CoaError::ImmutableField(_)
        | CoaError::AccountInUse(_)
        | CoaError::SystemAccount(_) => AppError::BusinessRule(message),
        _ => AppError::Validation(message),
    }
}

pub(crate) fn fiscal(err: FiscalError) -> AppError {
    let message = err.to_string();
    match err {
        FiscalError::YearNotFound(_)
        | FiscalError::PeriodNotFound(_)
        | FiscalError::NoPeriodForDate(_) => AppError::NotFound(message),
        FiscalError::OverlappingYear(_) => AppError::Conflict(message),
        FiscalError::DraftEntriesOutstanding(_)
        | FiscalError::EarlierPeriodsOpen
        | FiscalError::InvalidStatusTransition { .. } => AppError::BusinessRule(message),
        _ => AppError::Validation(message),
    }
}

pub(crate) fn journal(err: JournalError) -> AppError {
    let message = err.to_string();
    match err {
        JournalError::EntryNotFound(_)
        | JournalError::AccountNotFound(_)
        | JournalError::NoPeriodForDate(_) => AppError::NotFound(message),
        JournalError::PeriodClosed
        | JournalError::PeriodLocked
        | JournalError::InvalidStateTransition { .. } => AppError::BusinessRule(message),
        JournalError::ConcurrentModification => AppError::Conflict(message),
        JournalError::Internal(_) => AppError::Internal(message),
        _ => AppError::Validation(message),
    }
}

pub(crate) fn subledger(err: SubledgerError) -> AppError {
    let message = err.to_string();
    match err {
        SubledgerError::DocumentNotFound(_) => AppError::NotFound(message),
        SubledgerError::OverAllocation { .. }
        | SubledgerError::AllocationExceedsBalance { .. }
        | SubledgerError::InvalidStateTransition { .. }
        | SubledgerError::DocumentNotPosted(_) => AppError::BusinessRule(message),
        SubledgerError::Journal(inner) => journal(inner),
        _ => AppError::Validation(message),
    }
}

pub(crate) fn reconciliation(err: ReconciliationError) -> AppError {
    let message = err.to_string();
    match err {
        ReconciliationError::BankAccountNotFound(_)
        | ReconciliationError::TransactionNotFound(_)
        | ReconciliationError::ReconciliationNotFound(_) => AppError::NotFound(message),
        ReconciliationError::NonZeroDifference(_)
        | ReconciliationError::AlreadyCompleted
        | ReconciliationError::AlreadyReconciled(_) => AppError::BusinessRule(message),
        ReconciliationError::WrongBankAccount(_) => AppError::Validation(message),
    }
}

pub(crate) fn report(err: &ReportError) -> AppError {
    AppError::Integrity(err.to_string())
}
