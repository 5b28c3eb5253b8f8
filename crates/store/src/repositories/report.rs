//! Read-only report derivation over a consistent snapshot.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tessera_core::fiscal::{FiscalError, FiscalPeriod};
use tessera_core::reports::{
    AccountBalanceView, BalanceSheet, CashFlowStatement, IncomeStatement, ReportService,
    TrialBalance,
};
use tessera_shared::error::AppResult;
use tessera_shared::types::{AccountId, FiscalPeriodId, OrganizationId};

use crate::convert;
use crate::tables::{LedgerStore, Tables};

/// An account's balance for one period, with the closing resolved.
#[derive(Debug, Clone)]
pub struct BalanceSummary {
    /// Opening balance, inherited from the prior period's closing.
    pub opening: Decimal,
    /// Period debit total.
    pub debit: Decimal,
    /// Period credit total.
    pub credit: Decimal,
    /// Closing balance in the account's sign convention.
    pub closing: Decimal,
    /// Row version (posting count).
    pub version: i64,
}

/// Repository for financial reports and balance reads.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    store: LedgerStore,
}

impl ReportRepository {
    /// Creates a new repository handle.
    #[must_use]
    pub fn new(store: LedgerStore) -> Self {
        Self { store }
    }

    /// Returns an account's balance for a period. When no row exists yet
    /// the opening is inherited from the prior period's closing and the
    /// totals are zero.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown account or period.
    pub fn get_balance(
        &self,
        organization_id: OrganizationId,
        account_id: AccountId,
        period_id: FiscalPeriodId,
    ) -> AppResult<BalanceSummary> {
        let tables = self.store.read()?;

        let account = tables
            .accounts
            .get(&account_id)
            .filter(|a| a.organization_id == organization_id)
            .ok_or_else(|| {
                tessera_shared::error::AppError::NotFound(format!(
                    "account not found: {account_id}"
                ))
            })?;
        let period = Self::period_in(&tables, organization_id, period_id)?;

        let normal = account.account_type.normal_balance();
        Ok(match tables.balances.get(&(account_id, period_id)) {
            Some(row) => BalanceSummary {
                opening: row.opening,
                debit: row.debit_total,
                credit: row.credit_total,
                closing: row.closing(normal),
                version: row.version,
            },
            None => {
                let opening = tables.opening_for(account, period);
                BalanceSummary {
                    opening,
                    debit: Decimal::ZERO,
                    credit: Decimal::ZERO,
                    closing: opening,
                    version: 0,
                }
            }
        })
    }

    /// Builds the trial balance for a period.
    ///
    /// A column mismatch is an internal invariant violation; it is logged
    /// as an alert and the report is returned as computed, never
    /// adjusted.
    pub fn trial_balance(
        &self,
        organization_id: OrganizationId,
        period_id: FiscalPeriodId,
    ) -> AppResult<TrialBalance> {
        let tables = self.store.read()?;
        let period = Self::period_in(&tables, organization_id, period_id)?.clone();

        let views = Self::views(&tables, organization_id, &period);
        let report = ReportService::trial_balance(period_id, &views);
        if let Err(err) = ReportService::check_trial_balance(&report) {
            tracing::error!(%period_id, error = %err, "ledger integrity alert");
        }
        Ok(report)
    }

    /// Verifies ledger integrity for a period: trial balance columns must
    /// agree.
    ///
    /// # Errors
    ///
    /// Returns `Integrity` when the invariant is broken.
    pub fn integrity_check(
        &self,
        organization_id: OrganizationId,
        period_id: FiscalPeriodId,
    ) -> AppResult<()> {
        let report = self.trial_balance(organization_id, period_id)?;
        ReportService::check_trial_balance(&report).map_err(|e| convert::report(&e))
    }

    /// Builds the profit and loss statement for a period.
    pub fn income_statement(
        &self,
        organization_id: OrganizationId,
        period_id: FiscalPeriodId,
    ) -> AppResult<IncomeStatement> {
        let tables = self.store.read()?;
        let period = Self::period_in(&tables, organization_id, period_id)?.clone();
        let views = Self::views(&tables, organization_id, &period);
        Ok(ReportService::income_statement(period_id, &views))
    }

    /// Builds the balance sheet at a date, using cumulative closings
    /// through the period containing (or last preceding) the date.
    ///
    /// A false `balanced` flag is logged as an integrity alert and
    /// returned as-is.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the date precedes every period.
    pub fn balance_sheet(
        &self,
        organization_id: OrganizationId,
        as_of: NaiveDate,
    ) -> AppResult<BalanceSheet> {
        let tables = self.store.read()?;
        let period = tables
            .periods_for_org(organization_id)
            .into_iter()
            .filter(|p| p.start_date <= as_of)
            .next_back()
            .cloned()
            .ok_or_else(|| convert::fiscal(FiscalError::NoPeriodForDate(as_of)))?;

        let views = Self::views(&tables, organization_id, &period);
        let report = ReportService::balance_sheet(as_of, &views);
        if !report.balanced {
            tracing::error!(
                %as_of,
                assets = %report.assets.total,
                "balance sheet does not balance, ledger integrity alert"
            );
        }
        Ok(report)
    }

    /// Builds the cash flow statement for a period (indirect method).
    pub fn cash_flow(
        &self,
        organization_id: OrganizationId,
        period_id: FiscalPeriodId,
    ) -> AppResult<CashFlowStatement> {
        let tables = self.store.read()?;
        let period = Self::period_in(&tables, organization_id, period_id)?.clone();
        let views = Self::views(&tables, organization_id, &period);
        Ok(ReportService::cash_flow(period_id, &views))
    }

    fn period_in<'t>(
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
            Err(convert::fiscal(FiscalError::PeriodNotFound(period_id)))
        }
    }

    /// One balance view per posting account, with openings inherited for
    /// accounts that have no row in the period yet.
    fn views(
        tables: &Tables,
        organization_id: OrganizationId,
        period: &FiscalPeriod,
    ) -> Vec<AccountBalanceView> {
        tables
            .accounts
            .values()
            .filter(|a| a.organization_id == organization_id && !a.is_group)
            .map(|account| {
                let row = tables.balances.get(&(account.id, period.id));
                let opening = row.map_or_else(
                    || tables.opening_for(account, period),
                    |row| row.opening,
                );
                AccountBalanceView {
                    account_id: account.id,
                    code: account.code.clone(),
                    name: account.name.clone(),
                    account_type: account.account_type,
                    subtype: account.subtype,
                    opening,
                    debit: row.map_or(Decimal::ZERO, |r| r.debit_total),
                    credit: row.map_or(Decimal::ZERO, |r| r.credit_total),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{AccountRepository, FiscalRepository, JournalRepository};
    use rust_decimal_macros::dec;
    use tessera_core::coa::{AccountSubtype, CreateAccountInput};
    use tessera_core::journal::{CreateJournalInput, JournalLineInput, JournalType};
    use tessera_shared::config::LedgerConfig;
    use tessera_shared::types::Currency;

    struct Fixture {
        store: LedgerStore,
        org: OrganizationId,
        cash: AccountId,
        revenue: AccountId,
        equity: AccountId,
        periods: Vec<FiscalPeriod>,
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn fixture() -> Fixture {
        let store = LedgerStore::new(LedgerConfig::default());
        let org = OrganizationId::new();

        let accounts = AccountRepository::new(store.clone());
        let make = |code: &str, subtype: AccountSubtype, opening: Decimal| {
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
                    opening_balance: opening,
                    opening_balance_date: Some(date(2025, 1, 1)),
                })
                .unwrap()
                .id
        };
        let cash = make("1000", AccountSubtype::Cash, dec!(1000));
        let revenue = make("4000", AccountSubtype::SalesRevenue, Decimal::ZERO);
        let equity = make("3000", AccountSubtype::Equity, dec!(1000));

        let (_, periods) = FiscalRepository::new(store.clone())
            .create_year(org, "FY 2025", date(2025, 1, 1), date(2025, 12, 31))
            .unwrap();

        Fixture {
            store,
            org,
            cash,
            revenue,
            equity,
            periods,
        }
    }

    fn post_cash_sale(f: &Fixture, entry_date: NaiveDate, amount: Decimal) {
        let journal = JournalRepository::new(f.store.clone());
        let entry = journal
            .create(CreateJournalInput {
                organization_id: f.org,
                journal_type: JournalType::Manual,
                entry_date,
                description: "Cash sale".to_string(),
                currency: Currency::Usd,
                source: None,
                lines: vec![
                    JournalLineInput::debit(f.cash, amount),
                    JournalLineInput::credit(f.revenue, amount),
                ],
            })
            .unwrap();
        journal.post(f.org, entry.id).unwrap();
    }

    #[test]
    fn test_trial_balance_for_cash_sale() {
        let f = fixture();
        post_cash_sale(&f, date(2025, 1, 15), dec!(1000));

        let reports = ReportRepository::new(f.store.clone());
        let tb = reports.trial_balance(f.org, f.periods[0].id).unwrap();

        assert_eq!(tb.total_debit, dec!(1000));
        assert_eq!(tb.total_credit, dec!(1000));
        assert!(tb.is_balanced());

        let cash_row = tb.rows.iter().find(|r| r.account_id == f.cash).unwrap();
        assert_eq!(cash_row.debit, dec!(1000));
        assert_eq!(cash_row.closing, dec!(2000));
        let revenue_row = tb.rows.iter().find(|r| r.account_id == f.revenue).unwrap();
        assert_eq!(revenue_row.credit, dec!(1000));
        assert!(reports.integrity_check(f.org, f.periods[0].id).is_ok());
    }

    #[test]
    fn test_get_balance_inherits_opening_across_periods() {
        let f = fixture();
        post_cash_sale(&f, date(2025, 1, 15), dec!(500));

        let reports = ReportRepository::new(f.store.clone());
        // February has no row: opening must carry January's closing.
        let feb = reports.get_balance(f.org, f.cash, f.periods[1].id).unwrap();
        assert_eq!(feb.opening, dec!(1500));
        assert_eq!(feb.debit, Decimal::ZERO);
        assert_eq!(feb.closing, dec!(1500));
        assert_eq!(feb.version, 0);
    }

    #[test]
    fn test_balance_sheet_balances_after_postings() {
        let f = fixture();
        post_cash_sale(&f, date(2025, 1, 15), dec!(300));

        let reports = ReportRepository::new(f.store.clone());
        let sheet = reports.balance_sheet(f.org, date(2025, 1, 31)).unwrap();

        assert_eq!(sheet.assets.total, dec!(1300));
        assert_eq!(sheet.liabilities.total, Decimal::ZERO);
        assert_eq!(sheet.equity.total, dec!(1000));
        assert_eq!(sheet.current_earnings, dec!(300));
        assert!(sheet.balanced);
        assert!(
            sheet
                .equity
                .lines
                .iter()
                .any(|l| l.account_id == f.equity && l.amount == dec!(1000))
        );
    }

    #[test]
    fn test_income_statement_reports_period_movement_only() {
        let f = fixture();
        post_cash_sale(&f, date(2025, 1, 15), dec!(400));
        post_cash_sale(&f, date(2025, 2, 10), dec!(250));

        let fiscal = FiscalRepository::new(f.store.clone());
        fiscal.close_period(f.org, f.periods[0].id).unwrap();

        let reports = ReportRepository::new(f.store.clone());
        let feb = reports.income_statement(f.org, f.periods[1].id).unwrap();
        assert_eq!(feb.revenue.total, dec!(250));
        assert_eq!(feb.net_income, dec!(250));
    }

    #[test]
    fn test_cash_flow_reconciles_after_period_close() {
        let f = fixture();
        post_cash_sale(&f, date(2025, 1, 15), dec!(400));
        FiscalRepository::new(f.store.clone())
            .close_period(f.org, f.periods[0].id)
            .unwrap();
        post_cash_sale(&f, date(2025, 2, 10), dec!(250));

        let reports = ReportRepository::new(f.store.clone());
        let cf = reports.cash_flow(f.org, f.periods[1].id).unwrap();
        assert_eq!(cf.net_income, dec!(250));
        assert_eq!(cf.net_cash_flow, dec!(250));
        assert_eq!(cf.cash_at_beginning, dec!(1400));
        assert_eq!(cf.cash_at_end, dec!(1650));
    }
}
