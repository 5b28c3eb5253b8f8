//! Fiscal year and period repository.

use chrono::NaiveDate;
use tessera_core::balance::PeriodBalance;
use tessera_core::fiscal::{
    self, FiscalError, FiscalPeriod, FiscalYear, PeriodStatus,
};
use tessera_core::journal::JournalStatus;
use tessera_shared::error::{AppError, AppResult};
use tessera_shared::types::{FiscalPeriodId, FiscalYearId, OrganizationId};

use crate::convert;
use crate::tables::{LedgerStore, Tables};

/// Repository for fiscal year and period lifecycle operations.
#[derive(Debug, Clone)]
pub struct FiscalRepository {
    store: LedgerStore,
}

impl FiscalRepository {
    /// Creates a new repository handle.
    #[must_use]
    pub fn new(store: LedgerStore) -> Self {
        Self { store }
    }

    /// Creates a fiscal year with one open period per calendar month.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an inverted date range and a
    /// conflict when the range overlaps an existing year.
    pub fn create_year(
        &self,
        organization_id: OrganizationId,
        name: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> AppResult<(FiscalYear, Vec<FiscalPeriod>)> {
        let mut tables = self.store.write()?;

        fiscal::validate_date_range(start_date, end_date).map_err(convert::fiscal)?;
        let overlapping = tables
            .fiscal_years
            .values()
            .find(|y| {
                y.organization_id == organization_id
                    && fiscal::date_ranges_overlap(y.start_date, y.end_date, start_date, end_date)
            })
            .map(|y| y.name.clone());
        if let Some(existing) = overlapping {
            return Err(convert::fiscal(FiscalError::OverlappingYear(existing)));
        }

        let year = FiscalYear {
            id: FiscalYearId::new(),
            organization_id,
            name: name.to_string(),
            start_date,
            end_date,
            is_closed: false,
        };

        let periods: Vec<FiscalPeriod> = fiscal::monthly_period_ranges(start_date, end_date)
            .into_iter()
            .enumerate()
            .map(|(index, (period_start, period_end))| FiscalPeriod {
                id: FiscalPeriodId::new(),
                fiscal_year_id: year.id,
                sequence: i32::try_from(index + 1).unwrap_or(i32::MAX),
                name: period_start.format("%b %Y").to_string(),
                start_date: period_start,
                end_date: period_end,
                status: PeriodStatus::Open,
            })
            .collect();
        fiscal::validate_contiguous(&periods).map_err(convert::fiscal)?;

        tracing::info!(
            fiscal_year_id = %year.id,
            periods = periods.len(),
            "fiscal year created"
        );
        tables.fiscal_years.insert(year.id, year.clone());
        for period in &periods {
            tables.periods.insert(period.id, period.clone());
        }
        Ok((year, periods))
    }

    /// Fetches a fiscal year with its periods ordered by sequence.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when absent or owned by another organization.
    pub fn get_year(
        &self,
        organization_id: OrganizationId,
        id: FiscalYearId,
    ) -> AppResult<(FiscalYear, Vec<FiscalPeriod>)> {
        let tables = self.store.read()?;
        let year = tables
            .fiscal_years
            .get(&id)
            .filter(|y| y.organization_id == organization_id)
            .cloned()
            .ok_or_else(|| convert::fiscal(FiscalError::YearNotFound(id)))?;

        let mut periods: Vec<FiscalPeriod> = tables
            .periods
            .values()
            .filter(|p| p.fiscal_year_id == id)
            .cloned()
            .collect();
        periods.sort_by_key(|p| p.sequence);
        Ok((year, periods))
    }

    /// Finds the period containing `date`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when no period covers the date.
    pub fn find_period_for_date(
        &self,
        organization_id: OrganizationId,
        date: NaiveDate,
    ) -> AppResult<FiscalPeriod> {
        let tables = self.store.read()?;
        tables
            .period_for_date(organization_id, date)
            .cloned()
            .ok_or_else(|| convert::fiscal(FiscalError::NoPeriodForDate(date)))
    }

    /// Closes a period.
    ///
    /// Runs as a barrier: the write guard held here is the same one every
    /// `create`/`post` needs, so the period is quiesced while closings
    /// are snapshotted and the next period's openings are seeded.
    ///
    /// # Errors
    ///
    /// Returns `BusinessRule` when drafts are outstanding, earlier
    /// periods are still open, or the period is not Open.
    pub fn close_period(
        &self,
        organization_id: OrganizationId,
        period_id: FiscalPeriodId,
    ) -> AppResult<FiscalPeriod> {
        let mut tables = self.store.write()?;

        let period = Self::get_period_in(&tables, organization_id, period_id)?.clone();
        let outstanding_drafts = tables
            .entries
            .values()
            .filter(|e| e.period_id == period_id && e.status == JournalStatus::Draft)
            .count();
        let earlier_periods_open = tables.periods.values().any(|p| {
            p.fiscal_year_id == period.fiscal_year_id
                && p.sequence < period.sequence
                && p.status == PeriodStatus::Open
        });
        fiscal::validate_close(period.status, outstanding_drafts, earlier_periods_open)
            .map_err(convert::fiscal)?;

        Self::seed_next_period_openings(&mut tables, organization_id, &period);

        let closed = {
            let entry = tables
                .periods
                .get_mut(&period_id)
                .ok_or_else(|| convert::fiscal(FiscalError::PeriodNotFound(period_id)))?;
            entry.status = PeriodStatus::Closed;
            entry.clone()
        };

        let all_closed = tables
            .periods
            .values()
            .filter(|p| p.fiscal_year_id == period.fiscal_year_id)
            .all(|p| p.status != PeriodStatus::Open);
        if all_closed && let Some(year) = tables.fiscal_years.get_mut(&period.fiscal_year_id) {
            year.is_closed = true;
        }

        tracing::info!(period_id = %period_id, "period closed");
        Ok(closed)
    }

    /// Locks a closed period, forbidding reversals dated into it.
    ///
    /// # Errors
    ///
    /// Returns `BusinessRule` unless the period is Closed.
    pub fn lock_period(
        &self,
        organization_id: OrganizationId,
        period_id: FiscalPeriodId,
    ) -> AppResult<FiscalPeriod> {
        let mut tables = self.store.write()?;

        let status = Self::get_period_in(&tables, organization_id, period_id)?.status;
        status
            .validate_transition(PeriodStatus::Locked)
            .map_err(convert::fiscal)?;

        let entry = tables
            .periods
            .get_mut(&period_id)
            .ok_or_else(|| convert::fiscal(FiscalError::PeriodNotFound(period_id)))?;
        entry.status = PeriodStatus::Locked;
        tracing::info!(period_id = %period_id, "period locked");
        Ok(entry.clone())
    }

    fn get_period_in<'t>(
        tables: &'t Tables,
        organization_id: OrganizationId,
        period_id: FiscalPeriodId,
    ) -> AppResult<&'t FiscalPeriod> {
        let period = tables
            .periods
            .get(&period_id)
            .ok_or_else(|| convert::fiscal(FiscalError::PeriodNotFound(period_id)))?;
        let owned = tables
            .fiscal_years
            .get(&period.fiscal_year_id)
            .is_some_and(|y| y.organization_id == organization_id);
        if owned {
            Ok(period)
        } else {
            Err(AppError::NotFound(format!(
                "fiscal period not found: {period_id}"
            )))
        }
    }

    /// Seeds the following period's opening balances from this period's
    /// closings for every posting account of the organization.
    fn seed_next_period_openings(
        tables: &mut Tables,
        organization_id: OrganizationId,
        period: &FiscalPeriod,
    ) {
        let next_period = tables
            .periods_for_org(organization_id)
            .into_iter()
            .find(|p| p.start_date > period.end_date)
            .cloned();
        let Some(next_period) = next_period else {
            return;
        };

        let accounts: Vec<_> = tables
            .accounts
            .values()
            .filter(|a| a.organization_id == organization_id && !a.is_group)
            .cloned()
            .collect();
        for account in accounts {
            let closing = match tables.balances.get(&(account.id, period.id)) {
                Some(row) => row.closing(account.account_type.normal_balance()),
                None => tables.opening_for(&account, period),
            };
            tables
                .balances
                .entry((account.id, next_period.id))
                .and_modify(|row| row.opening = closing)
                .or_insert_with(|| PeriodBalance::open_with(account.id, next_period.id, closing));
        }
    }
}
