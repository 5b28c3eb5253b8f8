//! Repository layer over the shared ledger tables.

pub mod account;
pub mod fiscal;
pub mod journal;
pub mod reconciliation;
pub mod report;
pub mod subledger;

pub use account::AccountRepository;
pub use fiscal::FiscalRepository;
pub use journal::JournalRepository;
pub use reconciliation::ReconciliationRepository;
pub use report::{BalanceSummary, ReportRepository};
pub use subledger::{CreateDocumentInput, SubledgerRepository};
