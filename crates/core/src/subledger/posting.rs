//! Journal generation for subledger documents.
//!
//! Each posted document produces exactly one balanced journal entry.
//! The templates here only build `CreateJournalInput`; creating and
//! posting the entry atomically is the caller's transaction.

use rust_decimal::Decimal;
use tessera_shared::types::AccountId;

use super::error::SubledgerError;
use super::types::{DocumentKind, SubledgerDocument};
use crate::journal::{
    CreateJournalInput, JournalLineInput, JournalType, SourceModule, SourceRef,
};

/// Control and settlement accounts the posting templates write to.
#[derive(Debug, Clone, Copy)]
pub struct ControlAccounts {
    /// AR control account (debited by invoices, credited by receipts).
    pub receivable: AccountId,
    /// AP control account (credited by bills, debited by payments).
    pub payable: AccountId,
    /// Cash/bank account for receipts and payments.
    pub cash: AccountId,
    /// Tax payable account for invoice/bill tax amounts.
    pub tax: AccountId,
}

/// Builds journal inputs for subledger documents.
pub struct PostingService;

impl PostingService {
    /// Builds the journal entry for a sales invoice:
    /// debit AR control for the gross total, credit each revenue line,
    /// credit tax payable for the tax total.
    ///
    /// # Errors
    ///
    /// Returns an error when the document is not an invoice, has no
    /// lines, or carries a non-positive line amount.
    pub fn build_invoice(
        doc: &SubledgerDocument,
        accounts: &ControlAccounts,
    ) -> Result<CreateJournalInput, SubledgerError> {
        Self::check_kind(doc, DocumentKind::Invoice)?;
        Self::check_lines(doc)?;

        let mut lines = vec![JournalLineInput::debit(accounts.receivable, doc.total)];
        for item in &doc.lines {
            lines.push(JournalLineInput::credit(item.account_id, item.amount));
        }
        let tax_total = Self::tax_total(doc);
        if tax_total > Decimal::ZERO {
            lines.push(JournalLineInput::credit(accounts.tax, tax_total));
        }

        Ok(Self::journal_input(doc, SourceModule::AccountsReceivable, lines))
    }

    /// Builds the journal entry for a purchase bill:
    /// debit each expense line and tax, credit AP control for the gross
    /// total.
    ///
    /// # Errors
    ///
    /// Returns an error when the document is not a bill, has no lines,
    /// or carries a non-positive line amount.
    pub fn build_bill(
        doc: &SubledgerDocument,
        accounts: &ControlAccounts,
    ) -> Result<CreateJournalInput, SubledgerError> {
        Self::check_kind(doc, DocumentKind::Bill)?;
        Self::check_lines(doc)?;

        let mut lines = Vec::with_capacity(doc.lines.len() + 2);
        for item in &doc.lines {
            lines.push(JournalLineInput::debit(item.account_id, item.amount));
        }
        let tax_total = Self::tax_total(doc);
        if tax_total > Decimal::ZERO {
            lines.push(JournalLineInput::debit(accounts.tax, tax_total));
        }
        lines.push(JournalLineInput::credit(accounts.payable, doc.total));

        Ok(Self::journal_input(doc, SourceModule::AccountsPayable, lines))
    }

    /// Builds the journal entry for a credit note: the mirror of an
    /// invoice. Debits each revenue line and tax, credits AR control.
    ///
    /// # Errors
    ///
    /// Returns an error when the document is not a credit note, has no
    /// lines, or carries a non-positive line amount.
    pub fn build_credit_note(
        doc: &SubledgerDocument,
        accounts: &ControlAccounts,
    ) -> Result<CreateJournalInput, SubledgerError> {
        Self::check_kind(doc, DocumentKind::CreditNote)?;
        Self::check_lines(doc)?;

        let mut lines = Vec::with_capacity(doc.lines.len() + 2);
        for item in &doc.lines {
            lines.push(JournalLineInput::debit(item.account_id, item.amount));
        }
        let tax_total = Self::tax_total(doc);
        if tax_total > Decimal::ZERO {
            lines.push(JournalLineInput::debit(accounts.tax, tax_total));
        }
        lines.push(JournalLineInput::credit(accounts.receivable, doc.total));

        Ok(Self::journal_input(doc, SourceModule::AccountsReceivable, lines))
    }

    /// Builds the journal entry for a customer receipt:
    /// debit cash, credit AR control.
    ///
    /// # Errors
    ///
    /// Returns an error when the document is not a receipt or its total
    /// is not positive.
    pub fn build_receipt(
        doc: &SubledgerDocument,
        accounts: &ControlAccounts,
    ) -> Result<CreateJournalInput, SubledgerError> {
        Self::check_kind(doc, DocumentKind::Receipt)?;
        Self::check_positive_total(doc)?;

        let lines = vec![
            JournalLineInput::debit(accounts.cash, doc.total),
            JournalLineInput::credit(accounts.receivable, doc.total),
        ];
        Ok(Self::journal_input(doc, SourceModule::AccountsReceivable, lines))
    }

    /// Builds the journal entry for a supplier payment:
    /// debit AP control, credit cash.
    ///
    /// # Errors
    ///
    /// Returns an error when the document is not a payment or its total
    /// is not positive.
    pub fn build_payment(
        doc: &SubledgerDocument,
        accounts: &ControlAccounts,
    ) -> Result<CreateJournalInput, SubledgerError> {
        Self::check_kind(doc, DocumentKind::Payment)?;
        Self::check_positive_total(doc)?;

        let lines = vec![
            JournalLineInput::debit(accounts.payable, doc.total),
            JournalLineInput::credit(accounts.cash, doc.total),
        ];
        Ok(Self::journal_input(doc, SourceModule::AccountsPayable, lines))
    }

    /// Dispatches to the template matching the document's kind.
    ///
    /// # Errors
    ///
    /// See the individual `build_*` functions.
    pub fn build(
        doc: &SubledgerDocument,
        accounts: &ControlAccounts,
    ) -> Result<CreateJournalInput, SubledgerError> {
        match doc.kind {
            DocumentKind::Invoice => Self::build_invoice(doc, accounts),
            DocumentKind::Bill => Self::build_bill(doc, accounts),
            DocumentKind::CreditNote => Self::build_credit_note(doc, accounts),
            DocumentKind::Receipt => Self::build_receipt(doc, accounts),
            DocumentKind::Payment => Self::build_payment(doc, accounts),
        }
    }

    fn journal_input(
        doc: &SubledgerDocument,
        module: SourceModule,
        lines: Vec<JournalLineInput>,
    ) -> CreateJournalInput {
        CreateJournalInput {
            organization_id: doc.organization_id,
            journal_type: JournalType::System,
            entry_date: doc.document_date,
            description: format!("{:?} {}", doc.kind, doc.document_number),
            currency: doc.currency,
            source: Some(SourceRef {
                module,
                document_id: doc.id,
            }),
            lines,
        }
    }

    fn check_kind(
        doc: &SubledgerDocument,
        expected: DocumentKind,
    ) -> Result<(), SubledgerError> {
        if doc.kind == expected {
            Ok(())
        } else {
            Err(SubledgerError::WrongDocumentKind {
                expected,
                found: doc.kind,
            })
        }
    }

    fn check_lines(doc: &SubledgerDocument) -> Result<(), SubledgerError> {
        if doc.lines.is_empty() {
            return Err(SubledgerError::EmptyDocument);
        }
        if doc
            .lines
            .iter()
            .any(|l| l.amount <= Decimal::ZERO || l.tax_amount < Decimal::ZERO)
        {
            return Err(SubledgerError::NonPositiveAmount);
        }
        Ok(())
    }

    fn check_positive_total(doc: &SubledgerDocument) -> Result<(), SubledgerError> {
        if doc.total > Decimal::ZERO {
            Ok(())
        } else {
            Err(SubledgerError::NonPositiveAmount)
        }
    }

    fn tax_total(doc: &SubledgerDocument) -> Decimal {
        doc.lines.iter().map(|l| l.tax_amount).sum()
    }
}
