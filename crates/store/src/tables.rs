//! The ledger's shared state and its locking discipline.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tessera_core::coa::Account;
use tessera_core::fiscal::{FiscalPeriod, FiscalYear};
use tessera_core::journal::JournalEntry;
use tessera_core::balance::PeriodBalance;
use tessera_core::reconciliation::{BankAccount, BankTransaction, Reconciliation};
use tessera_core::subledger::{Allocation, ControlAccounts, SubledgerDocument};
use tessera_shared::config::LedgerConfig;
use tessera_shared::error::{AppError, AppResult};
use tessera_shared::types::{
    AccountId, BankAccountId, BankTransactionId, DocumentId, FiscalPeriodId, FiscalYearId,
    JournalEntryId, OrganizationId, ReconciliationId,
};

/// All ledger tables. Guarded by a single lock; see [`LedgerStore`].
#[derive(Debug, Default)]
pub(crate) struct Tables {
    /// Chart of accounts.
    pub accounts: HashMap<AccountId, Account>,
    /// Fiscal years.
    pub fiscal_years: HashMap<FiscalYearId, FiscalYear>,
    /// Fiscal periods.
    pub periods: HashMap<FiscalPeriodId, FiscalPeriod>,
    /// Journal entries with their lines.
    pub entries: HashMap<JournalEntryId, JournalEntry>,
    /// Per-account, per-period balance rows, created lazily.
    pub balances: HashMap<(AccountId, FiscalPeriodId), PeriodBalance>,
    /// Subledger documents.
    pub documents: HashMap<DocumentId, SubledgerDocument>,
    /// Payment/receipt allocations.
    pub allocations: Vec<Allocation>,
    /// Bank accounts.
    pub bank_accounts: HashMap<BankAccountId, BankAccount>,
    /// Bank transactions.
    pub bank_transactions: HashMap<BankTransactionId, BankTransaction>,
    /// Bank reconciliations.
    pub reconciliations: HashMap<ReconciliationId, Reconciliation>,
    /// Next journal number per organization.
    pub journal_sequences: HashMap<OrganizationId, i64>,
    /// GL control accounts per organization, set during chart setup.
    pub control_accounts: HashMap<OrganizationId, ControlAccounts>,
}

/// Handle to the shared ledger state.
///
/// Cloning is cheap; clones share the same tables. A write guard spans a
/// whole mutating operation, which serializes concurrent posts touching
/// the same balance rows and makes period close a barrier: a close holds
/// the guard while it quiesces, snapshots closings, and seeds the next
/// period, so no late post can interleave.
#[derive(Debug, Clone, Default)]
pub struct LedgerStore {
    inner: Arc<RwLock<Tables>>,
    config: Arc<LedgerConfig>,
}

impl LedgerStore {
    /// Creates an empty store with the given ledger configuration.
    #[must_use]
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Tables::default())),
            config: Arc::new(config),
        }
    }

    /// The ledger configuration this store was created with.
    #[must_use]
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Acquires a read snapshot.
    pub(crate) fn read(&self) -> AppResult<RwLockReadGuard<'_, Tables>> {
        self.inner
            .read()
            .map_err(|_| AppError::Internal("ledger lock poisoned".to_string()))
    }

    /// Acquires the write guard that backs a mutating transaction.
    pub(crate) fn write(&self) -> AppResult<RwLockWriteGuard<'_, Tables>> {
        self.inner
            .write()
            .map_err(|_| AppError::Internal("ledger lock poisoned".to_string()))
    }
}

impl Tables {
    /// Allocates the next journal sequence number for an organization.
    pub fn next_journal_sequence(&mut self, organization_id: OrganizationId) -> i64 {
        let next = self.journal_sequences.entry(organization_id).or_insert(0);
        *next += 1;
        *next
    }

    /// All periods of an organization ordered by start date.
    pub fn periods_for_org(&self, organization_id: OrganizationId) -> Vec<&FiscalPeriod> {
        let mut periods: Vec<&FiscalPeriod> = self
            .periods
            .values()
            .filter(|p| {
                self.fiscal_years
                    .get(&p.fiscal_year_id)
                    .is_some_and(|y| y.organization_id == organization_id)
            })
            .collect();
        periods.sort_by_key(|p| p.start_date);
        periods
    }

    /// Finds the period containing `date` for an organization.
    pub fn period_for_date(
        &self,
        organization_id: OrganizationId,
        date: chrono::NaiveDate,
    ) -> Option<&FiscalPeriod> {
        self.periods_for_org(organization_id)
            .into_iter()
            .find(|p| p.contains_date(date))
    }

    /// Resolves the opening balance for an account in a period.
    ///
    /// Walks earlier periods newest-first for a balance row and takes its
    /// closing; falls back to the account's own opening balance when the
    /// account has no history at all.
    pub fn opening_for(
        &self,
        account: &Account,
        period: &FiscalPeriod,
    ) -> rust_decimal::Decimal {
        let normal = account.account_type.normal_balance();
        let earlier = self
            .periods_for_org(account.organization_id)
            .into_iter()
            .filter(|p| p.start_date < period.start_date)
            .rev()
            .find_map(|p| self.balances.get(&(account.id, p.id)));
        match earlier {
            Some(row) => row.closing(normal),
            None => account.opening_balance,
        }
    }
}
