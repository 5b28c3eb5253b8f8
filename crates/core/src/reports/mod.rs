//! Financial report derivation.
//!
//! Reports are pure functions over account balance views. The store
//! assembles the views from balance rows under a read snapshot; nothing
//! here mutates ledger state.

mod error;
mod service;
mod types;

pub use error::ReportError;
pub use service::ReportService;
pub use types::{
    AccountBalanceView, BalanceSheet, CashFlowStatement, IncomeStatement, ReportLine,
    ReportSection, TrialBalance, TrialBalanceRow,
};
