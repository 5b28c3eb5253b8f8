//! AR/AP subledger documents and their posting into the general ledger.
//!
//! Business documents (invoices, bills, credit notes, receipts, payments)
//! live here. Posting turns a document into exactly one balanced journal
//! entry; allocations link payments and receipts to the documents they
//! settle.

mod allocation;
mod error;
mod posting;
mod types;

pub use allocation::{AllocationRequest, AllocationService};
pub use error::SubledgerError;
pub use posting::{ControlAccounts, PostingService};
pub use types::{
    Allocation, DocumentKind, DocumentLine, DocumentStatus, SubledgerDocument,
};
