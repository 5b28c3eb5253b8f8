//! Subledger document domain types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tessera_shared::types::{
    AccountId, Currency, DocumentId, JournalEntryId, OrganizationId, PartyId,
};

use super::error::SubledgerError;

/// Kind of subledger document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Sales invoice (AR, money owed to us).
    Invoice,
    /// Purchase bill (AP, money we owe).
    Bill,
    /// Credit note reducing an invoice's receivable.
    CreditNote,
    /// Customer receipt (AR settlement).
    Receipt,
    /// Supplier payment (AP settlement).
    Payment,
}

impl DocumentKind {
    /// Returns true for documents that settle other documents.
    #[must_use]
    pub fn is_settlement(self) -> bool {
        matches!(self, Self::Receipt | Self::Payment)
    }

    /// Returns true for documents carrying revenue/expense line items.
    #[must_use]
    pub fn has_line_items(self) -> bool {
        matches!(self, Self::Invoice | Self::Bill | Self::CreditNote)
    }
}

/// Subledger document status.
///
/// Draft -> Posted, then settlement moves the document through
/// PartiallyPaid/Overdue to Paid. Cancelled is only reachable from Draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    /// Being edited; no ledger effect.
    Draft,
    /// Journal entry generated, full balance outstanding.
    Posted,
    /// Some, but not all, of the balance settled.
    PartiallyPaid,
    /// Open balance past the due date.
    Overdue,
    /// Balance due reached zero (terminal).
    Paid,
    /// Discarded before posting (terminal).
    Cancelled,
}

impl DocumentStatus {
    /// Returns true while the document still carries an open balance.
    #[must_use]
    pub fn is_open(self) -> bool {
        matches!(self, Self::Posted | Self::PartiallyPaid | Self::Overdue)
    }

    /// Returns true if this is a terminal status.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Paid | Self::Cancelled)
    }

    /// Validates a status transition.
    ///
    /// # Errors
    ///
    /// Returns `SubledgerError::InvalidStateTransition` for any transition
    /// outside the state machine.
    pub fn validate_transition(self, to: Self) -> Result<(), SubledgerError> {
        let allowed = match (self, to) {
            (Self::Draft, Self::Posted | Self::Cancelled) => true,
            (Self::Posted, Self::PartiallyPaid | Self::Paid | Self::Overdue) => true,
            (Self::PartiallyPaid, Self::Paid | Self::Overdue) => true,
            (Self::Overdue, Self::PartiallyPaid | Self::Paid) => true,
            _ => false,
        };
        if allowed {
            Ok(())
        } else {
            Err(SubledgerError::InvalidStateTransition { from: self, to })
        }
    }
}

/// A single line item on an invoice, bill, or credit note.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentLine {
    /// Revenue or expense account the line posts against.
    pub account_id: AccountId,
    /// Line description.
    pub description: String,
    /// Net line amount, excluding tax.
    pub amount: Decimal,
    /// Tax charged on the line.
    pub tax_amount: Decimal,
}

impl DocumentLine {
    /// Gross amount of the line (net plus tax).
    #[must_use]
    pub fn gross(&self) -> Decimal {
        self.amount + self.tax_amount
    }
}

/// An AR/AP business document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubledgerDocument {
    /// Unique identifier.
    pub id: DocumentId,
    /// The organization this document belongs to.
    pub organization_id: OrganizationId,
    /// Document kind.
    pub kind: DocumentKind,
    /// The counterparty (customer or supplier).
    pub party_id: PartyId,
    /// Human-readable document number.
    pub document_number: String,
    /// Document date (determines the posting period).
    pub document_date: NaiveDate,
    /// Due date for settlement.
    pub due_date: NaiveDate,
    /// Document currency.
    pub currency: Currency,
    /// Line items (empty for receipts and payments).
    pub lines: Vec<DocumentLine>,
    /// Gross total of the document.
    pub total: Decimal,
    /// Amount settled so far. For receipts and payments this is the
    /// amount already allocated to target documents.
    pub paid_amount: Decimal,
    /// Current status.
    pub status: DocumentStatus,
    /// The journal entry generated at posting time.
    pub journal_entry_id: Option<JournalEntryId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl SubledgerDocument {
    /// Outstanding balance: total minus what has been settled/allocated.
    #[must_use]
    pub fn balance_due(&self) -> Decimal {
        self.total - self.paid_amount
    }

    /// Days past due at `as_of`. Zero or negative means not yet due.
    #[must_use]
    pub fn age_days(&self, as_of: NaiveDate) -> i64 {
        (as_of - self.due_date).num_days()
    }
}

/// Link between a settlement document and a document it settles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Allocation {
    /// The receipt or payment.
    pub payment_id: DocumentId,
    /// The settled invoice or bill.
    pub document_id: DocumentId,
    /// Amount allocated.
    pub amount: Decimal,
    /// When the allocation was made.
    pub allocated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_draft_transitions() {
        assert!(DocumentStatus::Draft.validate_transition(DocumentStatus::Posted).is_ok());
        assert!(DocumentStatus::Draft.validate_transition(DocumentStatus::Cancelled).is_ok());
        assert!(DocumentStatus::Draft.validate_transition(DocumentStatus::Paid).is_err());
    }

    #[test]
    fn test_terminal_statuses_reject_everything() {
        for terminal in [DocumentStatus::Paid, DocumentStatus::Cancelled] {
            for to in [
                DocumentStatus::Draft,
                DocumentStatus::Posted,
                DocumentStatus::PartiallyPaid,
                DocumentStatus::Overdue,
                DocumentStatus::Cancelled,
            ] {
                assert!(terminal.validate_transition(to).is_err());
            }
        }
    }

    #[test]
    fn test_overdue_can_still_settle() {
        assert!(
            DocumentStatus::Overdue
                .validate_transition(DocumentStatus::PartiallyPaid)
                .is_ok()
        );
        assert!(DocumentStatus::Overdue.validate_transition(DocumentStatus::Paid).is_ok());
    }

    #[test]
    fn test_document_line_gross() {
        let line = DocumentLine {
            account_id: AccountId::new(),
            description: "Consulting".into(),
            amount: dec!(100),
            tax_amount: dec!(10),
        };
        assert_eq!(line.gross(), dec!(110));
    }
}
