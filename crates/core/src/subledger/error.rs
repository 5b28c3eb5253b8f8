//! Subledger error types.

use rust_decimal::Decimal;
use tessera_shared::types::DocumentId;

use super::types::{DocumentKind, DocumentStatus};
use crate::journal::JournalError;

/// Errors from subledger posting and allocation.
#[derive(Debug, thiserror::Error)]
pub enum SubledgerError {
    /// Document not found.
    #[error("document not found: {0}")]
    DocumentNotFound(DocumentId),

    /// Invoice, bill, or credit note has no line items.
    #[error("document has no line items")]
    EmptyDocument,

    /// A line or settlement amount must be strictly positive.
    #[error("amount must be positive")]
    NonPositiveAmount,

    /// Operation requires a different document kind.
    #[error("operation not valid for {found:?} documents, expected {expected:?}")]
    WrongDocumentKind {
        /// The kind the operation requires.
        expected: DocumentKind,
        /// The kind the document actually has.
        found: DocumentKind,
    },

    /// Settlement targets must be posted before allocation.
    #[error("document is not posted: {0}")]
    DocumentNotPosted(DocumentId),

    /// Illegal document status change.
    #[error("invalid document status transition from {from:?} to {to:?}")]
    InvalidStateTransition {
        /// Current status.
        from: DocumentStatus,
        /// Requested status.
        to: DocumentStatus,
    },

    /// Allocations exceed the payment's unallocated amount.
    #[error("allocation total {requested} exceeds available amount {available}")]
    OverAllocation {
        /// Sum of requested allocation amounts.
        requested: Decimal,
        /// Unallocated amount remaining on the payment.
        available: Decimal,
    },

    /// A single allocation exceeds the target document's balance due.
    #[error("allocation {amount} exceeds balance due {balance_due} on document {document_id}")]
    AllocationExceedsBalance {
        /// The target document.
        document_id: DocumentId,
        /// Requested allocation amount.
        amount: Decimal,
        /// The document's outstanding balance.
        balance_due: Decimal,
    },

    /// Settlement currency must match the target document's currency.
    #[error("currency mismatch: payment is {payment}, document is {document}")]
    CurrencyMismatch {
        /// The payment's currency.
        payment: tessera_shared::types::Currency,
        /// The target document's currency.
        document: tessera_shared::types::Currency,
    },

    /// Journal generation for the document failed.
    #[error(transparent)]
    Journal(#[from] JournalError),
}

impl SubledgerError {
    /// Machine-readable error code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::DocumentNotFound(_) => "DOCUMENT_NOT_FOUND",
            Self::EmptyDocument => "EMPTY_DOCUMENT",
            Self::NonPositiveAmount => "NON_POSITIVE_AMOUNT",
            Self::WrongDocumentKind { .. } => "WRONG_DOCUMENT_KIND",
            Self::DocumentNotPosted(_) => "DOCUMENT_NOT_POSTED",
            Self::InvalidStateTransition { .. } => "INVALID_STATE_TRANSITION",
            Self::OverAllocation { .. } => "OVER_ALLOCATION",
            Self::AllocationExceedsBalance { .. } => "ALLOCATION_EXCEEDS_BALANCE",
            Self::CurrencyMismatch { .. } => "CURRENCY_MISMATCH",
            Self::Journal(e) => e.error_code(),
        }
    }
}
