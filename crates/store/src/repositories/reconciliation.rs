//! Bank account and reconciliation repository.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use tessera_core::reconciliation::{
    BankAccount, BankTransaction, BankTransactionKind, Reconciliation, ReconciliationError,
    ReconciliationService, ReconciliationStatus,
};
use tessera_shared::error::AppResult;
use tessera_shared::types::{
    AccountId, BankAccountId, BankTransactionId, Currency, OrganizationId, ReconciliationId,
};

use crate::convert;
use crate::tables::{LedgerStore, Tables};

/// Repository for bank accounts, transactions, and reconciliations.
#[derive(Debug, Clone)]
pub struct ReconciliationRepository {
    store: LedgerStore,
}

impl ReconciliationRepository {
    /// Creates a new repository handle.
    #[must_use]
    pub fn new(store: LedgerStore) -> Self {
        Self { store }
    }

    /// Creates a bank account mirrored to a GL cash account.
    pub fn create_bank_account(
        &self,
        organization_id: OrganizationId,
        name: &str,
        gl_account_id: AccountId,
        currency: Currency,
        opening_balance: Decimal,
    ) -> AppResult<BankAccount> {
        let mut tables = self.store.write()?;
        let account = BankAccount {
            id: BankAccountId::new(),
            organization_id,
            name: name.to_string(),
            gl_account_id,
            currency,
            current_balance: opening_balance,
        };
        tables.bank_accounts.insert(account.id, account.clone());
        Ok(account)
    }

    /// Records a bank transaction and moves the running balance.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown bank account.
    pub fn record_transaction(
        &self,
        bank_account_id: BankAccountId,
        date: NaiveDate,
        kind: BankTransactionKind,
        amount: Decimal,
        description: &str,
    ) -> AppResult<BankTransaction> {
        let mut tables = self.store.write()?;

        let txn = BankTransaction {
            id: BankTransactionId::new(),
            bank_account_id,
            date,
            kind,
            amount,
            description: description.to_string(),
            reconciled: false,
            reconciliation_id: None,
        };
        let account = tables.bank_accounts.get_mut(&bank_account_id).ok_or_else(|| {
            convert::reconciliation(ReconciliationError::BankAccountNotFound(bank_account_id))
        })?;
        account.current_balance += txn.signed_amount();
        tables.bank_transactions.insert(txn.id, txn.clone());
        Ok(txn)
    }

    /// Starts a reconciliation against one statement with an initial
    /// transaction selection.
    ///
    /// # Errors
    ///
    /// Returns a validation error when a selected transaction belongs to
    /// another account or is already cleared.
    pub fn start(
        &self,
        bank_account_id: BankAccountId,
        statement_date: NaiveDate,
        statement_balance: Decimal,
        opening_balance: Decimal,
        selected: Vec<BankTransactionId>,
    ) -> AppResult<Reconciliation> {
        let mut tables = self.store.write()?;

        if !tables.bank_accounts.contains_key(&bank_account_id) {
            return Err(convert::reconciliation(
                ReconciliationError::BankAccountNotFound(bank_account_id),
            ));
        }
        let transactions = Self::resolve(&tables, &selected)?;
        ReconciliationService::validate_selection(bank_account_id, &transactions)
            .map_err(convert::reconciliation)?;

        let rec = Reconciliation {
            id: ReconciliationId::new(),
            bank_account_id,
            statement_date,
            statement_balance,
            opening_balance,
            selected,
            status: ReconciliationStatus::InProgress,
            completed_at: None,
        };
        tracing::info!(reconciliation_id = %rec.id, "reconciliation started");
        tables.reconciliations.insert(rec.id, rec.clone());
        Ok(rec)
    }

    /// Replaces the selected transaction set of an in-progress
    /// reconciliation.
    ///
    /// # Errors
    ///
    /// Returns `BusinessRule` for a completed record.
    pub fn select(
        &self,
        id: ReconciliationId,
        selected: Vec<BankTransactionId>,
    ) -> AppResult<Reconciliation> {
        let mut tables = self.store.write()?;

        let rec = Self::get_in(&tables, id)?.clone();
        if rec.status == ReconciliationStatus::Completed {
            return Err(convert::reconciliation(ReconciliationError::AlreadyCompleted));
        }
        let transactions = Self::resolve(&tables, &selected)?;
        ReconciliationService::validate_selection(rec.bank_account_id, &transactions)
            .map_err(convert::reconciliation)?;

        let entry = tables.reconciliations.get_mut(&id).ok_or_else(|| {
            convert::reconciliation(ReconciliationError::ReconciliationNotFound(id))
        })?;
        entry.selected = selected;
        Ok(entry.clone())
    }

    /// The current difference: statement balance minus opening plus net
    /// selected movement. The server-side value is authoritative.
    pub fn difference(&self, id: ReconciliationId) -> AppResult<Decimal> {
        let tables = self.store.read()?;
        let rec = Self::get_in(&tables, id)?;
        let transactions = Self::resolve(&tables, &rec.selected)?;
        Ok(rec.difference(&transactions))
    }

    /// Completes a reconciliation. Permitted only at an exactly zero
    /// difference; on success the selected transactions are marked
    /// reconciled and the record is sealed. Runs under the write guard,
    /// so no transaction import for the account can interleave.
    ///
    /// # Errors
    ///
    /// Returns `BusinessRule` for a nonzero difference or an already
    /// completed record.
    pub fn complete(&self, id: ReconciliationId) -> AppResult<Reconciliation> {
        let mut tables = self.store.write()?;

        let rec = Self::get_in(&tables, id)?.clone();
        let transactions = Self::resolve(&tables, &rec.selected)?;
        ReconciliationService::validate_complete(&rec, &transactions)
            .map_err(convert::reconciliation)?;

        for txn_id in &rec.selected {
            if let Some(txn) = tables.bank_transactions.get_mut(txn_id) {
                txn.reconciled = true;
                txn.reconciliation_id = Some(id);
            }
        }
        let entry = tables.reconciliations.get_mut(&id).ok_or_else(|| {
            convert::reconciliation(ReconciliationError::ReconciliationNotFound(id))
        })?;
        entry.status = ReconciliationStatus::Completed;
        entry.completed_at = Some(Utc::now());

        tracing::info!(
            reconciliation_id = %id,
            cleared = entry.selected.len(),
            "reconciliation completed"
        );
        Ok(entry.clone())
    }

    fn get_in(tables: &Tables, id: ReconciliationId) -> AppResult<&Reconciliation> {
        tables.reconciliations.get(&id).ok_or_else(|| {
            convert::reconciliation(ReconciliationError::ReconciliationNotFound(id))
        })
    }

    fn resolve<'t>(
        tables: &'t Tables,
        ids: &[BankTransactionId],
    ) -> AppResult<Vec<&'t BankTransaction>> {
        ids.iter()
            .map(|txn_id| {
                tables.bank_transactions.get(txn_id).ok_or_else(|| {
                    convert::reconciliation(ReconciliationError::TransactionNotFound(*txn_id))
                })
            })
            .collect()
    }
}
