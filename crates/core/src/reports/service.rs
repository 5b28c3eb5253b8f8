//! Report derivation logic.

use rust_decimal::Decimal;
use tessera_shared::types::FiscalPeriodId;

use super::error::ReportError;
use super::types::{
    AccountBalanceView, BalanceSheet, CashFlowStatement, IncomeStatement, ReportLine,
    ReportSection, TrialBalance, TrialBalanceRow,
};
use crate::coa::{AccountSubtype, AccountType};

/// Derives financial reports from balance views.
pub struct ReportService;

impl ReportService {
    /// Builds the trial balance for a period. One row per account,
    /// ordered by code; accounts with no activity and a zero balance are
    /// skipped.
    #[must_use]
    pub fn trial_balance(period_id: FiscalPeriodId, views: &[AccountBalanceView]) -> TrialBalance {
        let mut rows: Vec<TrialBalanceRow> = views
            .iter()
            .filter(|v| {
                v.opening != Decimal::ZERO
                    || v.debit != Decimal::ZERO
                    || v.credit != Decimal::ZERO
            })
            .map(|v| TrialBalanceRow {
                account_id: v.account_id,
                code: v.code.clone(),
                name: v.name.clone(),
                opening: v.opening,
                debit: v.debit,
                credit: v.credit,
                closing: v.closing(),
            })
            .collect();
        rows.sort_by(|a, b| a.code.cmp(&b.code));

        let total_debit = rows.iter().map(|r| r.debit).sum();
        let total_credit = rows.iter().map(|r| r.credit).sum();
        TrialBalance {
            period_id,
            rows,
            total_debit,
            total_credit,
        }
    }

    /// Verifies the trial balance column invariant.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::TrialBalanceOutOfBalance` when the columns
    /// disagree. This is an internal invariant violation.
    pub fn check_trial_balance(report: &TrialBalance) -> Result<(), ReportError> {
        if report.is_balanced() {
            Ok(())
        } else {
            Err(ReportError::TrialBalanceOutOfBalance {
                total_debit: report.total_debit,
                total_credit: report.total_credit,
            })
        }
    }

    /// Builds the profit and loss statement from the period's own
    /// movement. Opening balances are deliberately excluded so a P&L for
    /// March reports March only.
    #[must_use]
    pub fn income_statement(
        period_id: FiscalPeriodId,
        views: &[AccountBalanceView],
    ) -> IncomeStatement {
        let section = |subtypes: &[AccountSubtype]| {
            ReportSection::from_lines(
                views
                    .iter()
                    .filter(|v| subtypes.contains(&v.subtype) && v.movement() != Decimal::ZERO)
                    .map(|v| ReportLine {
                        account_id: v.account_id,
                        code: v.code.clone(),
                        name: v.name.clone(),
                        amount: v.movement(),
                    })
                    .collect(),
            )
        };

        let revenue = section(&[AccountSubtype::SalesRevenue]);
        let cost_of_goods_sold = section(&[AccountSubtype::CostOfGoodsSold]);
        let operating_expenses = section(&[AccountSubtype::OperatingExpense]);
        let other_income = section(&[AccountSubtype::OtherIncome]);
        let other_expenses = section(&[AccountSubtype::OtherExpense]);

        let gross_profit = revenue.total - cost_of_goods_sold.total;
        let net_income = gross_profit - operating_expenses.total + other_income.total
            - other_expenses.total;

        IncomeStatement {
            period_id,
            revenue,
            cost_of_goods_sold,
            gross_profit,
            operating_expenses,
            other_income,
            other_expenses,
            net_income,
        }
    }

    /// Builds the balance sheet from cumulative closing balances.
    ///
    /// Net income not yet closed to retained earnings is reported as
    /// current earnings on the equity side; with it, assets must equal
    /// liabilities plus equity for any correctly posted ledger.
    #[must_use]
    pub fn balance_sheet(as_of: chrono::NaiveDate, views: &[AccountBalanceView]) -> BalanceSheet {
        let section = |account_type: AccountType| {
            ReportSection::from_lines(
                views
                    .iter()
                    .filter(|v| v.account_type == account_type && v.closing() != Decimal::ZERO)
                    .map(|v| ReportLine {
                        account_id: v.account_id,
                        code: v.code.clone(),
                        name: v.name.clone(),
                        amount: v.closing(),
                    })
                    .collect(),
            )
        };

        let assets = section(AccountType::Asset);
        let liabilities = section(AccountType::Liability);
        let equity = section(AccountType::Equity);

        let revenue_to_date: Decimal = views
            .iter()
            .filter(|v| v.account_type == AccountType::Revenue)
            .map(AccountBalanceView::closing)
            .sum();
        let expense_to_date: Decimal = views
            .iter()
            .filter(|v| v.account_type == AccountType::Expense)
            .map(AccountBalanceView::closing)
            .sum();
        let current_earnings = revenue_to_date - expense_to_date;

        let balanced = assets.total == liabilities.total + equity.total + current_earnings;

        BalanceSheet {
            as_of,
            assets,
            liabilities,
            equity,
            current_earnings,
            balanced,
        }
    }

    /// Verifies the balance sheet equation.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::BalanceSheetOutOfBalance` when assets do not
    /// equal liabilities plus equity. The report itself is still returned
    /// as computed; the numbers are never adjusted to force agreement.
    pub fn check_balance_sheet(report: &BalanceSheet) -> Result<(), ReportError> {
        if report.balanced {
            Ok(())
        } else {
            Err(ReportError::BalanceSheetOutOfBalance {
                total_assets: report.assets.total,
                total_liabilities_and_equity: report.liabilities.total
                    + report.equity.total
                    + report.current_earnings,
            })
        }
    }

    /// Builds the cash flow statement for a period using the indirect
    /// method: start from net income, adjust for working capital
    /// movement, then net investing and financing activity.
    #[must_use]
    pub fn cash_flow(period_id: FiscalPeriodId, views: &[AccountBalanceView]) -> CashFlowStatement {
        let movement_of = |subtype: AccountSubtype| -> Decimal {
            views
                .iter()
                .filter(|v| v.subtype == subtype)
                .map(AccountBalanceView::movement)
                .sum()
        };

        let revenue_movement: Decimal = views
            .iter()
            .filter(|v| v.account_type == AccountType::Revenue)
            .map(AccountBalanceView::movement)
            .sum();
        let expense_movement: Decimal = views
            .iter()
            .filter(|v| v.account_type == AccountType::Expense)
            .map(AccountBalanceView::movement)
            .sum();
        let net_income = revenue_movement - expense_movement;

        // Working capital: asset growth consumes cash, liability growth
        // frees it.
        let adjustments = [
            (AccountSubtype::AccountsReceivable, "Change in receivables", Decimal::NEGATIVE_ONE),
            (AccountSubtype::OtherCurrentAsset, "Change in other current assets", Decimal::NEGATIVE_ONE),
            (AccountSubtype::AccountsPayable, "Change in payables", Decimal::ONE),
            (AccountSubtype::OtherCurrentLiability, "Change in other current liabilities", Decimal::ONE),
        ];
        let mut operating_adjustments = Vec::new();
        let mut adjustment_total = Decimal::ZERO;
        for (subtype, label, sign) in adjustments {
            let amount = sign * movement_of(subtype);
            if amount != Decimal::ZERO {
                // Synthetic lines: no single account backs them, so the
                // first account of the subtype lends its id for linking.
                if let Some(view) = views.iter().find(|v| v.subtype == subtype) {
                    operating_adjustments.push(ReportLine {
                        account_id: view.account_id,
                        code: view.code.clone(),
                        name: label.to_string(),
                        amount,
                    });
                }
                adjustment_total += amount;
            }
        }

        let net_operating = net_income + adjustment_total;
        let net_investing = -movement_of(AccountSubtype::FixedAsset);
        let net_financing =
            movement_of(AccountSubtype::LongTermLiability) + movement_of(AccountSubtype::Equity);
        let net_cash_flow = net_operating + net_investing + net_financing;

        let cash_at_beginning: Decimal = views
            .iter()
            .filter(|v| v.subtype == AccountSubtype::Cash)
            .map(|v| v.opening)
            .sum();

        CashFlowStatement {
            period_id,
            net_income,
            operating_adjustments,
            net_operating,
            net_investing,
            net_financing,
            net_cash_flow,
            cash_at_beginning,
            cash_at_end: cash_at_beginning + net_cash_flow,
        }
    }
}
