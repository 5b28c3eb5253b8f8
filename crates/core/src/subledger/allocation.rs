//! Payment/receipt allocation against open documents.

use std::collections::HashMap;

use rust_decimal::Decimal;

use super::error::SubledgerError;
use super::types::{DocumentStatus, SubledgerDocument};
use tessera_shared::types::DocumentId;

/// One requested allocation from a settlement document.
#[derive(Debug, Clone)]
pub struct AllocationRequest {
    /// The invoice or bill to settle.
    pub document_id: DocumentId,
    /// Amount to allocate.
    pub amount: Decimal,
}

/// Validates and applies allocations.
pub struct AllocationService;

impl AllocationService {
    /// Validates a set of allocations from `payment` against `targets`.
    ///
    /// Targets must be given in the same order as the requests. Checks,
    /// before any mutation:
    /// - the payment is a posted settlement document
    /// - every amount is positive
    /// - the sum does not exceed the payment's unallocated amount
    /// - the total requested per target, across duplicate requests, does
    ///   not exceed that target's balance due
    /// - currencies match
    ///
    /// # Errors
    ///
    /// Returns the first violated rule; nothing is mutated on error.
    pub fn validate(
        payment: &SubledgerDocument,
        requests: &[AllocationRequest],
        targets: &[&SubledgerDocument],
    ) -> Result<(), SubledgerError> {
        if !payment.kind.is_settlement() {
            return Err(SubledgerError::WrongDocumentKind {
                expected: super::types::DocumentKind::Receipt,
                found: payment.kind,
            });
        }
        if !payment.status.is_open() {
            return Err(SubledgerError::DocumentNotPosted(payment.id));
        }

        let requested: Decimal = requests.iter().map(|r| r.amount).sum();
        let available = payment.balance_due();
        if requested > available {
            return Err(SubledgerError::OverAllocation {
                requested,
                available,
            });
        }

        // A document may appear in several requests; the cap applies to
        // the combined amount, not each request alone.
        let mut requested_per_target: HashMap<DocumentId, Decimal> = HashMap::new();
        for (request, target) in requests.iter().zip(targets) {
            if request.amount <= Decimal::ZERO {
                return Err(SubledgerError::NonPositiveAmount);
            }
            if !target.status.is_open() {
                return Err(SubledgerError::DocumentNotPosted(target.id));
            }
            if target.currency != payment.currency {
                return Err(SubledgerError::CurrencyMismatch {
                    payment: payment.currency,
                    document: target.currency,
                });
            }
            let combined = requested_per_target
                .entry(target.id)
                .or_insert(Decimal::ZERO);
            *combined += request.amount;
            if *combined > target.balance_due() {
                return Err(SubledgerError::AllocationExceedsBalance {
                    document_id: target.id,
                    amount: *combined,
                    balance_due: target.balance_due(),
                });
            }
        }

        Ok(())
    }

    /// Applies a settled amount to a document: bumps the paid amount and
    /// rolls the status forward (Paid when the balance due reaches zero,
    /// otherwise PartiallyPaid).
    ///
    /// # Errors
    ///
    /// Returns `InvalidStateTransition` when the document is not open and
    /// `AllocationExceedsBalance` when the amount would push the paid
    /// amount past the document total.
    pub fn apply_settlement(
        doc: &mut SubledgerDocument,
        amount: Decimal,
    ) -> Result<(), SubledgerError> {
        if amount > doc.balance_due() {
            return Err(SubledgerError::AllocationExceedsBalance {
                document_id: doc.id,
                amount,
                balance_due: doc.balance_due(),
            });
        }
        let next = if doc.balance_due() - amount == Decimal::ZERO {
            DocumentStatus::Paid
        } else {
            DocumentStatus::PartiallyPaid
        };
        if !doc.status.is_open() {
            return Err(SubledgerError::InvalidStateTransition {
                from: doc.status,
                to: next,
            });
        }
        if doc.status != next {
            doc.status.validate_transition(next)?;
        }
        doc.paid_amount += amount;
        doc.status = next;
        Ok(())
    }

    /// Flags an open document as overdue when it is past due at `as_of`.
    /// Returns true if the status changed.
    pub fn roll_overdue(doc: &mut SubledgerDocument, as_of: chrono::NaiveDate) -> bool {
        if doc.status.is_open()
            && doc.status != DocumentStatus::Overdue
            && doc.age_days(as_of) > 0
            && doc.balance_due() > Decimal::ZERO
        {
            doc.status = DocumentStatus::Overdue;
            return true;
        }
        false
    }
}
