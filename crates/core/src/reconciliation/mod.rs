//! Bank statement reconciliation.
//!
//! A reconciliation snapshots a statement balance and an opening balance,
//! then clears a selected set of bank transactions against them. It can
//! only complete when the difference is exactly zero; completed records
//! are immutable.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tessera_shared::types::{
    AccountId, BankAccountId, BankTransactionId, Currency, OrganizationId, ReconciliationId,
};

/// A bank account mirrored to a GL cash account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankAccount {
    /// Unique identifier.
    pub id: BankAccountId,
    /// The organization this bank account belongs to.
    pub organization_id: OrganizationId,
    /// Display name.
    pub name: String,
    /// The GL cash account this bank account mirrors.
    pub gl_account_id: AccountId,
    /// Account currency.
    pub currency: Currency,
    /// Running balance across all recorded transactions.
    pub current_balance: Decimal,
}

/// Direction of a bank transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BankTransactionKind {
    /// Money in.
    Deposit,
    /// Money out.
    Withdrawal,
    /// Transfer from another account (money in).
    TransferIn,
    /// Transfer to another account (money out).
    TransferOut,
}

impl BankTransactionKind {
    /// Returns true for inflows.
    #[must_use]
    pub fn is_inflow(self) -> bool {
        matches!(self, Self::Deposit | Self::TransferIn)
    }
}

/// A single bank transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankTransaction {
    /// Unique identifier.
    pub id: BankTransactionId,
    /// The bank account.
    pub bank_account_id: BankAccountId,
    /// Transaction date.
    pub date: NaiveDate,
    /// Direction.
    pub kind: BankTransactionKind,
    /// Unsigned amount (always positive).
    pub amount: Decimal,
    /// Description from the bank feed or manual entry.
    pub description: String,
    /// Set once the transaction has been cleared by a reconciliation.
    pub reconciled: bool,
    /// The reconciliation that cleared this transaction.
    pub reconciliation_id: Option<ReconciliationId>,
}

impl BankTransaction {
    /// Signed amount: positive for inflows, negative for outflows.
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        if self.kind.is_inflow() {
            self.amount
        } else {
            -self.amount
        }
    }
}

/// Reconciliation lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconciliationStatus {
    /// Transactions are being selected; difference may be nonzero.
    InProgress,
    /// Difference reached zero and the record was sealed (terminal).
    Completed,
}

/// A reconciliation of a bank account against one statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reconciliation {
    /// Unique identifier.
    pub id: ReconciliationId,
    /// The bank account being reconciled.
    pub bank_account_id: BankAccountId,
    /// Statement date.
    pub statement_date: NaiveDate,
    /// Closing balance printed on the statement.
    pub statement_balance: Decimal,
    /// Reconciled balance at the start of the statement window.
    pub opening_balance: Decimal,
    /// Transactions selected for clearing.
    pub selected: Vec<BankTransactionId>,
    /// Lifecycle state.
    pub status: ReconciliationStatus,
    /// Set when the record is sealed.
    pub completed_at: Option<DateTime<Utc>>,
}

impl Reconciliation {
    /// Difference between the statement balance and the cleared
    /// position: statement - (opening + net movement of the selected
    /// transactions). Zero means the statement is fully explained.
    #[must_use]
    pub fn difference(&self, selected: &[&BankTransaction]) -> Decimal {
        let net: Decimal = selected.iter().map(|t| t.signed_amount()).sum();
        self.statement_balance - (self.opening_balance + net)
    }
}

/// Reconciliation errors.
#[derive(Debug, thiserror::Error)]
pub enum ReconciliationError {
    /// Bank account not found.
    #[error("bank account not found: {0}")]
    BankAccountNotFound(BankAccountId),

    /// Transaction not found.
    #[error("bank transaction not found: {0}")]
    TransactionNotFound(BankTransactionId),

    /// Reconciliation not found.
    #[error("reconciliation not found: {0}")]
    ReconciliationNotFound(ReconciliationId),

    /// A selected transaction belongs to a different bank account.
    #[error("transaction {0} belongs to a different bank account")]
    WrongBankAccount(BankTransactionId),

    /// A selected transaction was already cleared by an earlier
    /// reconciliation.
    #[error("transaction {0} is already reconciled")]
    AlreadyReconciled(BankTransactionId),

    /// Completion requires an exactly zero difference.
    #[error("cannot complete reconciliation with nonzero difference {0}")]
    NonZeroDifference(Decimal),

    /// Completed reconciliations are immutable.
    #[error("reconciliation is already completed")]
    AlreadyCompleted,
}

impl ReconciliationError {
    /// Machine-readable error code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::BankAccountNotFound(_) => "BANK_ACCOUNT_NOT_FOUND",
            Self::TransactionNotFound(_) => "BANK_TRANSACTION_NOT_FOUND",
            Self::ReconciliationNotFound(_) => "RECONCILIATION_NOT_FOUND",
            Self::WrongBankAccount(_) => "WRONG_BANK_ACCOUNT",
            Self::AlreadyReconciled(_) => "ALREADY_RECONCILED",
            Self::NonZeroDifference(_) => "NON_ZERO_DIFFERENCE",
            Self::AlreadyCompleted => "RECONCILIATION_COMPLETED",
        }
    }
}

/// Validation for reconciliation operations.
pub struct ReconciliationService;

impl ReconciliationService {
    /// Validates a transaction selection: every transaction must belong
    /// to the reconciled account and must not already be cleared.
    ///
    /// # Errors
    ///
    /// Returns the first violating transaction.
    pub fn validate_selection(
        bank_account_id: BankAccountId,
        selected: &[&BankTransaction],
    ) -> Result<(), ReconciliationError> {
        for txn in selected {
            if txn.bank_account_id != bank_account_id {
                return Err(ReconciliationError::WrongBankAccount(txn.id));
            }
            if txn.reconciled {
                return Err(ReconciliationError::AlreadyReconciled(txn.id));
            }
        }
        Ok(())
    }

    /// Validates completion. The server-side difference is authoritative;
    /// a client-computed difference is never trusted.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyCompleted` for a sealed record and
    /// `NonZeroDifference` when the statement is not fully explained.
    pub fn validate_complete(
        reconciliation: &Reconciliation,
        selected: &[&BankTransaction],
    ) -> Result<(), ReconciliationError> {
        if reconciliation.status == ReconciliationStatus::Completed {
            return Err(ReconciliationError::AlreadyCompleted);
        }
        let difference = reconciliation.difference(selected);
        if difference != Decimal::ZERO {
            return Err(ReconciliationError::NonZeroDifference(difference));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn txn(
        bank_account_id: BankAccountId,
        kind: BankTransactionKind,
        amount: Decimal,
    ) -> BankTransaction {
        BankTransaction {
            id: BankTransactionId::new(),
            bank_account_id,
            date: NaiveDate::from_ymd_opt(2025, 3, 15).unwrap(),
            kind,
            amount,
            description: "txn".into(),
            reconciled: false,
            reconciliation_id: None,
        }
    }

    fn reconciliation(
        bank_account_id: BankAccountId,
        opening: Decimal,
        statement: Decimal,
    ) -> Reconciliation {
        Reconciliation {
            id: ReconciliationId::new(),
            bank_account_id,
            statement_date: NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
            statement_balance: statement,
            opening_balance: opening,
            selected: vec![],
            status: ReconciliationStatus::InProgress,
            completed_at: None,
        }
    }

    #[test]
    fn test_signed_amounts() {
        let account = BankAccountId::new();
        assert_eq!(txn(account, BankTransactionKind::Deposit, dec!(100)).signed_amount(), dec!(100));
        assert_eq!(txn(account, BankTransactionKind::Withdrawal, dec!(40)).signed_amount(), dec!(-40));
        assert_eq!(txn(account, BankTransactionKind::TransferIn, dec!(25)).signed_amount(), dec!(25));
        assert_eq!(txn(account, BankTransactionKind::TransferOut, dec!(25)).signed_amount(), dec!(-25));
    }

    #[test]
    fn test_zero_difference_completes() {
        let account = BankAccountId::new();
        let rec = reconciliation(account, dec!(1000), dec!(1500));
        let a = txn(account, BankTransactionKind::Deposit, dec!(700));
        let b = txn(account, BankTransactionKind::Withdrawal, dec!(200));
        let selected = vec![&a, &b];

        assert_eq!(rec.difference(&selected), Decimal::ZERO);
        assert!(ReconciliationService::validate_complete(&rec, &selected).is_ok());
    }

    #[test]
    fn test_nonzero_difference_rejects_completion() {
        let account = BankAccountId::new();
        let rec = reconciliation(account, dec!(1000), dec!(1500));
        let a = txn(account, BankTransactionKind::Deposit, dec!(400));
        let selected = vec![&a];

        assert_eq!(rec.difference(&selected), dec!(100));
        let err = ReconciliationService::validate_complete(&rec, &selected).unwrap_err();
        assert!(matches!(err, ReconciliationError::NonZeroDifference(d) if d == dec!(100)));
    }

    #[test]
    fn test_completed_record_is_sealed() {
        let account = BankAccountId::new();
        let mut rec = reconciliation(account, dec!(0), dec!(0));
        rec.status = ReconciliationStatus::Completed;

        let err = ReconciliationService::validate_complete(&rec, &[]).unwrap_err();
        assert!(matches!(err, ReconciliationError::AlreadyCompleted));
    }

    #[test]
    fn test_selection_rejects_foreign_and_cleared_transactions() {
        let account = BankAccountId::new();
        let other = BankAccountId::new();

        let foreign = txn(other, BankTransactionKind::Deposit, dec!(10));
        let err = ReconciliationService::validate_selection(account, &[&foreign]).unwrap_err();
        assert!(matches!(err, ReconciliationError::WrongBankAccount(_)));

        let mut cleared = txn(account, BankTransactionKind::Deposit, dec!(10));
        cleared.reconciled = true;
        let err = ReconciliationService::validate_selection(account, &[&cleared]).unwrap_err();
        assert!(matches!(err, ReconciliationError::AlreadyReconciled(_)));
    }
}
