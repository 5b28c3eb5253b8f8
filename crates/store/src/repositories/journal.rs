//! Journal entry repository: create, post, reverse, cancel.

use chrono::{NaiveDate, Utc};
use tessera_core::balance::{PeriodBalance, aggregate_deltas};
use tessera_core::journal::{
    CreateJournalInput, JournalEntry, JournalError, JournalLine, JournalService, JournalStatus,
    LineAccountInfo, build_reversal, format_journal_number,
};
use tessera_shared::error::AppResult;
use tessera_shared::types::{JournalEntryId, JournalLineId, OrganizationId};

use crate::convert;
use crate::tables::{LedgerStore, Tables};

/// Repository for journal entry lifecycle operations.
#[derive(Debug, Clone)]
pub struct JournalRepository {
    store: LedgerStore,
}

impl JournalRepository {
    /// Creates a new repository handle.
    #[must_use]
    pub fn new(store: LedgerStore) -> Self {
        Self { store }
    }

    /// Creates a draft journal entry.
    ///
    /// Validates line shape, account references, currency agreement, and
    /// exact debit/credit balance; assigns the next sequential journal
    /// number for the organization. The entry has no balance effect until
    /// posted.
    ///
    /// # Errors
    ///
    /// Returns a validation error for any violated entry rule and
    /// `BusinessRule` when the entry date falls in a non-open period.
    pub fn create(&self, input: CreateJournalInput) -> AppResult<JournalEntry> {
        let mut tables = self.store.write()?;
        let prefix = self.store.config().journal_number_prefix.clone();
        let id = Self::create_in(&mut tables, &prefix, input)?;
        Ok(tables.entries[&id].clone())
    }

    /// Fetches an entry by id within an organization.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when absent or owned by another organization.
    pub fn get(
        &self,
        organization_id: OrganizationId,
        id: JournalEntryId,
    ) -> AppResult<JournalEntry> {
        let tables = self.store.read()?;
        Self::get_in(&tables, organization_id, id).cloned()
    }

    /// Lists an organization's entries ordered by journal number.
    pub fn list(&self, organization_id: OrganizationId) -> AppResult<Vec<JournalEntry>> {
        let tables = self.store.read()?;
        let mut entries: Vec<JournalEntry> = tables
            .entries
            .values()
            .filter(|e| e.organization_id == organization_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| a.journal_number.cmp(&b.journal_number));
        Ok(entries)
    }

    /// Posts a draft entry, applying its lines to the balance rows.
    ///
    /// Runs atomically under the write guard: the status flip and every
    /// balance delta land together or not at all. Posting an entry that
    /// is already Posted is a no-op returning the entry unchanged, so a
    /// retried post never double-applies.
    ///
    /// # Errors
    ///
    /// Returns `BusinessRule` when the entry is cancelled/reversed or its
    /// period is no longer open.
    pub fn post(
        &self,
        organization_id: OrganizationId,
        id: JournalEntryId,
    ) -> AppResult<JournalEntry> {
        let mut tables = self.store.write()?;
        Self::post_in(&mut tables, organization_id, id)
    }

    /// Reverses a posted entry: creates and posts a counter-entry with
    /// every line's debit and credit swapped, then links the pair. Both
    /// sides happen in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `BusinessRule` unless the original is Posted and its
    /// period is not Locked, or when `reversal_date` falls in a non-open
    /// period.
    pub fn reverse(
        &self,
        organization_id: OrganizationId,
        id: JournalEntryId,
        reversal_date: NaiveDate,
    ) -> AppResult<JournalEntry> {
        let mut tables = self.store.write()?;

        let original = Self::get_in(&tables, organization_id, id)?.clone();
        let period_status = tables
            .periods
            .get(&original.period_id)
            .map_or(tessera_core::fiscal::PeriodStatus::Locked, |p| p.status);
        JournalService::validate_reverse(original.status, period_status)
            .map_err(convert::journal)?;

        let prefix = self.store.config().journal_number_prefix.clone();
        let reversal_input = build_reversal(&original, reversal_date);
        let reversal_id = Self::create_in(&mut tables, &prefix, reversal_input)?;
        if let Some(reversal) = tables.entries.get_mut(&reversal_id) {
            reversal.reversal_of = Some(original.id);
        }
        let reversal = Self::post_in(&mut tables, organization_id, reversal_id)?;

        if let Some(entry) = tables.entries.get_mut(&id) {
            entry.status = JournalStatus::Reversed;
            entry.reversed_by = Some(reversal_id);
            entry.updated_at = Utc::now();
        }

        tracing::info!(
            entry_id = %id,
            reversal_id = %reversal_id,
            "journal entry reversed"
        );
        Ok(reversal)
    }

    /// Cancels a draft entry.
    ///
    /// # Errors
    ///
    /// Returns `BusinessRule` unless the entry is Draft.
    pub fn cancel(
        &self,
        organization_id: OrganizationId,
        id: JournalEntryId,
    ) -> AppResult<JournalEntry> {
        let mut tables = self.store.write()?;

        let status = Self::get_in(&tables, organization_id, id)?.status;
        JournalService::validate_cancel(status).map_err(convert::journal)?;

        let entry = tables
            .entries
            .get_mut(&id)
            .ok_or_else(|| convert::journal(JournalError::EntryNotFound(id)))?;
        entry.status = JournalStatus::Cancelled;
        entry.updated_at = Utc::now();
        Ok(entry.clone())
    }

    pub(crate) fn get_in<'t>(
        tables: &'t Tables,
        organization_id: OrganizationId,
        id: JournalEntryId,
    ) -> AppResult<&'t JournalEntry> {
        tables
            .entries
            .get(&id)
            .filter(|e| e.organization_id == organization_id)
            .ok_or_else(|| convert::journal(JournalError::EntryNotFound(id)))
    }

    /// Creates a draft entry under an already-held write guard.
    pub(crate) fn create_in(
        tables: &mut Tables,
        journal_number_prefix: &str,
        input: CreateJournalInput,
    ) -> AppResult<JournalEntryId> {
        let organization_id = input.organization_id;

        let period = tables
            .period_for_date(organization_id, input.entry_date)
            .cloned()
            .ok_or_else(|| convert::journal(JournalError::NoPeriodForDate(input.entry_date)))?;
        JournalService::validate_period_open(period.status).map_err(convert::journal)?;

        let totals = JournalService::validate_entry(&input, |account_id| {
            tables
                .accounts
                .get(&account_id)
                .filter(|a| a.organization_id == organization_id)
                .map(|a| LineAccountInfo {
                    id: a.id,
                    is_active: a.is_active,
                    is_group: a.is_group,
                    currency: a.currency,
                })
        })
        .map_err(convert::journal)?;

        let sequence = tables.next_journal_sequence(organization_id);
        let id = JournalEntryId::new();
        let now = Utc::now();
        let lines: Vec<JournalLine> = input
            .lines
            .into_iter()
            .enumerate()
            .map(|(index, line)| JournalLine {
                id: JournalLineId::new(),
                journal_id: id,
                line_number: i32::try_from(index + 1).unwrap_or(i32::MAX),
                account_id: line.account_id,
                debit: line.debit,
                credit: line.credit,
                currency: input.currency,
                description: line.description,
                tags: line.tags,
            })
            .collect();

        let entry = JournalEntry {
            id,
            organization_id,
            journal_number: format_journal_number(journal_number_prefix, sequence),
            journal_type: input.journal_type,
            entry_date: input.entry_date,
            period_id: period.id,
            description: input.description,
            currency: input.currency,
            source: input.source,
            status: JournalStatus::Draft,
            total_debit: totals.total_debit,
            total_credit: totals.total_credit,
            reversal_of: None,
            reversed_by: None,
            created_at: now,
            updated_at: now,
            lines,
        };

        tracing::info!(
            entry_id = %entry.id,
            journal_number = %entry.journal_number,
            total = %entry.total_debit,
            "journal entry drafted"
        );
        tables.entries.insert(id, entry);
        Ok(id)
    }

    /// Posts an entry under an already-held write guard.
    pub(crate) fn post_in(
        tables: &mut Tables,
        organization_id: OrganizationId,
        id: JournalEntryId,
    ) -> AppResult<JournalEntry> {
        let entry = Self::get_in(tables, organization_id, id)?.clone();

        // Post-guard: an entry that already reached Posted is never
        // re-applied.
        if entry.status == JournalStatus::Posted {
            return Ok(entry);
        }
        entry
            .status
            .validate_transition(JournalStatus::Posted)
            .map_err(convert::journal)?;

        let period = tables
            .periods
            .get(&entry.period_id)
            .cloned()
            .ok_or_else(|| {
                convert::journal(JournalError::Internal(format!(
                    "period missing for entry {id}"
                )))
            })?;
        JournalService::validate_period_open(period.status).map_err(convert::journal)?;

        let deltas = aggregate_deltas(
            entry
                .lines
                .iter()
                .map(|l| (l.account_id, l.debit, l.credit)),
        );
        for delta in deltas {
            let account = tables.accounts.get(&delta.account_id).cloned().ok_or_else(|| {
                convert::journal(JournalError::AccountNotFound(delta.account_id))
            })?;
            let opening = match tables.balances.get(&(delta.account_id, period.id)) {
                Some(row) => row.opening,
                None => tables.opening_for(&account, &period),
            };
            let row = tables
                .balances
                .entry((delta.account_id, period.id))
                .or_insert_with(|| PeriodBalance::open_with(delta.account_id, period.id, opening));
            row.apply(delta.debit, delta.credit);
        }

        let posted = {
            let entry = tables
                .entries
                .get_mut(&id)
                .ok_or_else(|| convert::journal(JournalError::EntryNotFound(id)))?;
            entry.status = JournalStatus::Posted;
            entry.updated_at = Utc::now();
            entry.clone()
        };

        tracing::info!(
            entry_id = %id,
            journal_number = %posted.journal_number,
            "journal entry posted"
        );
        Ok(posted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{AccountRepository, FiscalRepository};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use tessera_core::coa::{AccountSubtype, CreateAccountInput};
    use tessera_core::journal::{JournalLineInput, JournalType};
    use tessera_shared::config::LedgerConfig;
    use tessera_shared::types::{AccountId, Currency};

    struct Fixture {
        store: LedgerStore,
        org: OrganizationId,
        cash: AccountId,
        revenue: AccountId,
        period_id: tessera_shared::types::FiscalPeriodId,
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn fixture() -> Fixture {
        let store = LedgerStore::new(LedgerConfig::default());
        let org = OrganizationId::new();

        let accounts = AccountRepository::new(store.clone());
        let make = |code: &str, subtype: AccountSubtype| {
            accounts
                .create(CreateAccountInput {
                    organization_id: org,
                    code: code.to_string(),
                    name: code.to_string(),
                    subtype,
                    parent_id: None,
                    is_group: false,
                    is_system: false,
                    currency: Currency::Usd,
                    opening_balance: Decimal::ZERO,
                    opening_balance_date: None,
                })
                .unwrap()
                .id
        };
        let cash = make("1000", AccountSubtype::Cash);
        let revenue = make("4000", AccountSubtype::SalesRevenue);

        let fiscal = FiscalRepository::new(store.clone());
        let (_, periods) = fiscal
            .create_year(org, "FY 2025", date(2025, 1, 1), date(2025, 12, 31))
            .unwrap();

        Fixture {
            store,
            org,
            cash,
            revenue,
            period_id: periods[2].id,
        }
    }

    fn cash_sale(f: &Fixture, amount: Decimal) -> CreateJournalInput {
        CreateJournalInput {
            organization_id: f.org,
            journal_type: JournalType::Manual,
            entry_date: date(2025, 3, 15),
            description: "Cash sale".to_string(),
            currency: Currency::Usd,
            source: None,
            lines: vec![
                JournalLineInput::debit(f.cash, amount),
                JournalLineInput::credit(f.revenue, amount),
            ],
        }
    }

    #[test]
    fn test_create_assigns_sequential_numbers() {
        let f = fixture();
        let journal = JournalRepository::new(f.store.clone());

        let first = journal.create(cash_sale(&f, dec!(100))).unwrap();
        let second = journal.create(cash_sale(&f, dec!(200))).unwrap();
        assert_eq!(first.journal_number, "JE-000001");
        assert_eq!(second.journal_number, "JE-000002");
        assert_eq!(first.status, JournalStatus::Draft);
        assert_eq!(first.period_id, f.period_id);
    }

    #[test]
    fn test_unbalanced_entry_rejected() {
        let f = fixture();
        let journal = JournalRepository::new(f.store.clone());

        let mut input = cash_sale(&f, dec!(100));
        input.lines[1] = JournalLineInput::credit(f.revenue, dec!(90));
        let err = journal.create(input).unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_post_applies_balances() {
        let f = fixture();
        let journal = JournalRepository::new(f.store.clone());

        let entry = journal.create(cash_sale(&f, dec!(1000))).unwrap();
        let posted = journal.post(f.org, entry.id).unwrap();
        assert_eq!(posted.status, JournalStatus::Posted);

        let tables = f.store.read().unwrap();
        let cash_row = &tables.balances[&(f.cash, f.period_id)];
        assert_eq!(cash_row.debit_total, dec!(1000));
        assert_eq!(cash_row.credit_total, Decimal::ZERO);
        let revenue_row = &tables.balances[&(f.revenue, f.period_id)];
        assert_eq!(revenue_row.credit_total, dec!(1000));
    }

    #[test]
    fn test_post_is_idempotent() {
        let f = fixture();
        let journal = JournalRepository::new(f.store.clone());

        let entry = journal.create(cash_sale(&f, dec!(500))).unwrap();
        journal.post(f.org, entry.id).unwrap();
        journal.post(f.org, entry.id).unwrap();

        let tables = f.store.read().unwrap();
        let cash_row = &tables.balances[&(f.cash, f.period_id)];
        assert_eq!(cash_row.debit_total, dec!(500));
        assert_eq!(cash_row.version, 1);
    }

    #[test]
    fn test_create_into_closed_period_rejected() {
        let f = fixture();
        let journal = JournalRepository::new(f.store.clone());
        let fiscal = FiscalRepository::new(f.store.clone());

        let (_, periods) = {
            let tables = f.store.read().unwrap();
            let year_id = tables.periods[&f.period_id].fiscal_year_id;
            drop(tables);
            fiscal.get_year(f.org, year_id).unwrap()
        };
        fiscal.close_period(f.org, periods[0].id).unwrap();
        fiscal.close_period(f.org, periods[1].id).unwrap();
        fiscal.close_period(f.org, periods[2].id).unwrap();

        let err = journal.create(cash_sale(&f, dec!(100))).unwrap_err();
        assert_eq!(err.status_code(), 422);
    }

    #[test]
    fn test_reversal_nets_to_zero() {
        let f = fixture();
        let journal = JournalRepository::new(f.store.clone());

        let entry = journal.create(cash_sale(&f, dec!(750))).unwrap();
        journal.post(f.org, entry.id).unwrap();
        let reversal = journal.reverse(f.org, entry.id, date(2025, 3, 20)).unwrap();

        assert_eq!(reversal.status, JournalStatus::Posted);
        assert_eq!(reversal.reversal_of, Some(entry.id));

        let original = journal.get(f.org, entry.id).unwrap();
        assert_eq!(original.status, JournalStatus::Reversed);
        assert_eq!(original.reversed_by, Some(reversal.id));

        let tables = f.store.read().unwrap();
        let cash_row = &tables.balances[&(f.cash, f.period_id)];
        assert_eq!(cash_row.debit_total, dec!(750));
        assert_eq!(cash_row.credit_total, dec!(750));
        assert_eq!(
            cash_row.closing(tessera_core::balance::NormalBalance::Debit),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_reverse_draft_rejected() {
        let f = fixture();
        let journal = JournalRepository::new(f.store.clone());

        let entry = journal.create(cash_sale(&f, dec!(100))).unwrap();
        let err = journal.reverse(f.org, entry.id, date(2025, 3, 20)).unwrap_err();
        assert_eq!(err.status_code(), 422);
    }

    #[test]
    fn test_cancel_draft_and_only_draft() {
        let f = fixture();
        let journal = JournalRepository::new(f.store.clone());

        let entry = journal.create(cash_sale(&f, dec!(100))).unwrap();
        let cancelled = journal.cancel(f.org, entry.id).unwrap();
        assert_eq!(cancelled.status, JournalStatus::Cancelled);

        let entry = journal.create(cash_sale(&f, dec!(100))).unwrap();
        journal.post(f.org, entry.id).unwrap();
        assert!(journal.cancel(f.org, entry.id).is_err());
    }

    #[test]
    fn test_cross_org_entry_is_not_found() {
        let f = fixture();
        let journal = JournalRepository::new(f.store.clone());

        let entry = journal.create(cash_sale(&f, dec!(100))).unwrap();
        let err = journal.post(OrganizationId::new(), entry.id).unwrap_err();
        assert_eq!(err.status_code(), 404);
    }
}
