//! Report output types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tessera_shared::types::{AccountId, FiscalPeriodId};

use crate::coa::{AccountSubtype, AccountType};

/// Flattened (account, balance) view the report functions consume.
///
/// `opening`, `debit` and `credit` come from the balance row for the
/// reporting window; `opening` already carries everything posted before
/// the window.
#[derive(Debug, Clone)]
pub struct AccountBalanceView {
    /// The account.
    pub account_id: AccountId,
    /// Account code, used for row ordering.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account type.
    pub account_type: AccountType,
    /// Account subtype for sectioning.
    pub subtype: AccountSubtype,
    /// Opening balance in the account's sign convention.
    pub opening: Decimal,
    /// Debit total in the window.
    pub debit: Decimal,
    /// Credit total in the window.
    pub credit: Decimal,
}

impl AccountBalanceView {
    /// Signed net movement in the window, per the account's normal
    /// balance.
    #[must_use]
    pub fn movement(&self) -> Decimal {
        self.account_type
            .normal_balance()
            .balance_change(self.debit, self.credit)
    }

    /// Closing balance: opening plus the signed movement.
    #[must_use]
    pub fn closing(&self) -> Decimal {
        self.opening + self.movement()
    }
}

/// One trial balance row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialBalanceRow {
    /// The account.
    pub account_id: AccountId,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Opening balance (signed per the account's convention).
    pub opening: Decimal,
    /// Period debit total.
    pub debit: Decimal,
    /// Period credit total.
    pub credit: Decimal,
    /// Closing balance.
    pub closing: Decimal,
}

/// Trial balance for one period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialBalance {
    /// The period reported on.
    pub period_id: FiscalPeriodId,
    /// One row per account with activity or balance, ordered by code.
    pub rows: Vec<TrialBalanceRow>,
    /// Sum of the debit column.
    pub total_debit: Decimal,
    /// Sum of the credit column.
    pub total_credit: Decimal,
}

impl TrialBalance {
    /// The fundamental ledger invariant: debit column equals credit
    /// column.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.total_debit == self.total_credit
    }
}

/// A single amount line in a report section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportLine {
    /// The account.
    pub account_id: AccountId,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Amount in the account's sign convention.
    pub amount: Decimal,
}

/// A titled group of report lines with a total.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportSection {
    /// Lines, ordered by account code.
    pub lines: Vec<ReportLine>,
    /// Sum of the line amounts.
    pub total: Decimal,
}

impl ReportSection {
    /// Builds a section from lines, computing the total.
    #[must_use]
    pub fn from_lines(mut lines: Vec<ReportLine>) -> Self {
        lines.sort_by(|a, b| a.code.cmp(&b.code));
        let total = lines.iter().map(|l| l.amount).sum();
        Self { lines, total }
    }
}

/// Profit and loss statement for one period (movement only, not
/// cumulative).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeStatement {
    /// The period reported on.
    pub period_id: FiscalPeriodId,
    /// Sales revenue.
    pub revenue: ReportSection,
    /// Cost of goods sold.
    pub cost_of_goods_sold: ReportSection,
    /// Gross profit: revenue minus COGS.
    pub gross_profit: Decimal,
    /// Operating expenses.
    pub operating_expenses: ReportSection,
    /// Interest and other non-operating income.
    pub other_income: ReportSection,
    /// Interest and other non-operating expenses.
    pub other_expenses: ReportSection,
    /// Bottom line.
    pub net_income: Decimal,
}

/// Balance sheet at a point in time (cumulative closing balances).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceSheet {
    /// The report date.
    pub as_of: NaiveDate,
    /// Asset accounts.
    pub assets: ReportSection,
    /// Liability accounts.
    pub liabilities: ReportSection,
    /// Equity accounts. Current earnings are reported separately and
    /// count toward the equation.
    pub equity: ReportSection,
    /// Net income not yet closed to equity, shown inside the equity
    /// section.
    pub current_earnings: Decimal,
    /// True when assets equal liabilities plus equity. False signals a
    /// ledger integrity defect, never a user error.
    pub balanced: bool,
}

/// Cash flow statement for one period, indirect method.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashFlowStatement {
    /// The period reported on.
    pub period_id: FiscalPeriodId,
    /// Starting point: the period's net income.
    pub net_income: Decimal,
    /// Working capital adjustments (AR, AP, other current items).
    pub operating_adjustments: Vec<ReportLine>,
    /// Net cash from operating activities.
    pub net_operating: Decimal,
    /// Net cash from investing activities (fixed asset movement).
    pub net_investing: Decimal,
    /// Net cash from financing activities (long-term debt and equity
    /// movement).
    pub net_financing: Decimal,
    /// Sum of the three activity sections.
    pub net_cash_flow: Decimal,
    /// Cash balance at the start of the period.
    pub cash_at_beginning: Decimal,
    /// Cash balance at the end: beginning plus net cash flow.
    pub cash_at_end: Decimal,
}
