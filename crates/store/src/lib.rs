//! Transactional store and repositories for the Tessera ledger.
//!
//! State lives in a single set of tables behind one `RwLock`. A write
//! guard is a transaction: every mutating operation validates first,
//! then mutates, all under one guard, so an operation either applies
//! completely or not at all. Read-only operations (reports, lookups)
//! take a read guard and see a consistent snapshot.

mod convert;
pub mod repositories;
mod tables;

pub use repositories::{
    AccountRepository, BalanceSummary, CreateDocumentInput, FiscalRepository, JournalRepository,
    ReconciliationRepository, ReportRepository, SubledgerRepository,
};
pub use tables::LedgerStore;
