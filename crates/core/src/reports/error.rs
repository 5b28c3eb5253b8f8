//! Report errors.

use rust_decimal::Decimal;

/// Integrity failures detected while deriving reports.
///
/// These are never user-correctable. They indicate the posted ledger
/// itself violates a fundamental invariant and must be surfaced as a
/// system alert, not a validation message.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// Trial balance columns disagree.
    #[error("trial balance out of balance: debit {total_debit} != credit {total_credit}")]
    TrialBalanceOutOfBalance {
        /// Sum of the debit column.
        total_debit: Decimal,
        /// Sum of the credit column.
        total_credit: Decimal,
    },

    /// Balance sheet equation does not hold.
    #[error(
        "balance sheet out of balance: assets {total_assets} != liabilities + equity {total_liabilities_and_equity}"
    )]
    BalanceSheetOutOfBalance {
        /// Total assets.
        total_assets: Decimal,
        /// Total liabilities plus equity.
        total_liabilities_and_equity: Decimal,
    },
}

impl ReportError {
    /// Machine-readable error code. Both variants are integrity alerts.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        "LEDGER_INTEGRITY_ERROR"
    }
}
