//! AR/AP document repository: posting, allocation, overdue rollforward.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use tessera_core::aging::{AgingReport, compute_aging};
use tessera_core::subledger::{
    Allocation, AllocationRequest, AllocationService, ControlAccounts, DocumentKind, DocumentLine,
    DocumentStatus, PostingService, SubledgerDocument, SubledgerError,
};
use tessera_shared::error::{AppError, AppResult};
use tessera_shared::types::{Currency, DocumentId, OrganizationId, PartyId};

use crate::convert;
use crate::repositories::journal::JournalRepository;
use crate::tables::{LedgerStore, Tables};

/// Input for creating a subledger document.
#[derive(Debug, Clone)]
pub struct CreateDocumentInput {
    /// The organization.
    pub organization_id: OrganizationId,
    /// Document kind.
    pub kind: DocumentKind,
    /// The counterparty.
    pub party_id: PartyId,
    /// Human-readable document number.
    pub document_number: String,
    /// Document date.
    pub document_date: NaiveDate,
    /// Due date.
    pub due_date: NaiveDate,
    /// Document currency.
    pub currency: Currency,
    /// Line items (invoices, bills, credit notes).
    pub lines: Vec<DocumentLine>,
    /// Total for settlement documents; ignored when lines are present.
    pub amount: Decimal,
}

/// Repository for subledger documents.
#[derive(Debug, Clone)]
pub struct SubledgerRepository {
    store: LedgerStore,
}

impl SubledgerRepository {
    /// Creates a new repository handle.
    #[must_use]
    pub fn new(store: LedgerStore) -> Self {
        Self { store }
    }

    /// Registers the GL control accounts posting templates write to.
    pub fn set_control_accounts(
        &self,
        organization_id: OrganizationId,
        accounts: ControlAccounts,
    ) -> AppResult<()> {
        let mut tables = self.store.write()?;
        tables.control_accounts.insert(organization_id, accounts);
        Ok(())
    }

    /// Creates a draft document. Totals of line-item documents come from
    /// the gross line sum; settlement documents use `amount`.
    pub fn create(&self, input: CreateDocumentInput) -> AppResult<SubledgerDocument> {
        let mut tables = self.store.write()?;

        let total = if input.kind.has_line_items() {
            input.lines.iter().map(DocumentLine::gross).sum()
        } else {
            input.amount
        };

        let now = Utc::now();
        let doc = SubledgerDocument {
            id: DocumentId::new(),
            organization_id: input.organization_id,
            kind: input.kind,
            party_id: input.party_id,
            document_number: input.document_number,
            document_date: input.document_date,
            due_date: input.due_date,
            currency: input.currency,
            lines: input.lines,
            total,
            paid_amount: Decimal::ZERO,
            status: DocumentStatus::Draft,
            journal_entry_id: None,
            created_at: now,
            updated_at: now,
        };
        tables.documents.insert(doc.id, doc.clone());
        Ok(doc)
    }

    /// Fetches a document by id within an organization.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when absent or owned by another organization.
    pub fn get(
        &self,
        organization_id: OrganizationId,
        id: DocumentId,
    ) -> AppResult<SubledgerDocument> {
        let tables = self.store.read()?;
        Self::get_in(&tables, organization_id, id).cloned()
    }

    /// Posts a draft document: builds its journal entry from the posting
    /// template and creates and posts that entry, all in one transaction.
    /// On any failure the document stays Draft and no journal exists.
    ///
    /// # Errors
    ///
    /// Returns validation errors from the template or the journal
    /// engine; `Internal` if control accounts were never registered.
    pub fn post(
        &self,
        organization_id: OrganizationId,
        id: DocumentId,
    ) -> AppResult<SubledgerDocument> {
        let mut tables = self.store.write()?;

        let doc = Self::get_in(&tables, organization_id, id)?.clone();
        doc.status
            .validate_transition(DocumentStatus::Posted)
            .map_err(convert::subledger)?;
        let control = tables.control_accounts.get(&organization_id).copied().ok_or_else(|| {
            AppError::Internal(format!(
                "control accounts not configured for organization {organization_id}"
            ))
        })?;

        let journal_input = PostingService::build(&doc, &control).map_err(convert::subledger)?;
        let prefix = self.store.config().journal_number_prefix.clone();
        let entry_id = JournalRepository::create_in(&mut tables, &prefix, journal_input)?;
        JournalRepository::post_in(&mut tables, organization_id, entry_id)?;

        let entry = tables
            .documents
            .get_mut(&id)
            .ok_or_else(|| convert::subledger(SubledgerError::DocumentNotFound(id)))?;
        entry.status = DocumentStatus::Posted;
        entry.journal_entry_id = Some(entry_id);
        entry.updated_at = Utc::now();

        tracing::info!(document_id = %id, journal_entry_id = %entry_id, "document posted");
        Ok(entry.clone())
    }

    /// Allocates a posted receipt/payment across target documents.
    ///
    /// Validates every allocation before mutating anything; on success
    /// each target's paid amount and status roll forward and the payment
    /// records the allocated total.
    ///
    /// # Errors
    ///
    /// Returns `BusinessRule` for over-allocation or amounts exceeding a
    /// target's balance due.
    pub fn allocate(
        &self,
        organization_id: OrganizationId,
        payment_id: DocumentId,
        requests: Vec<AllocationRequest>,
    ) -> AppResult<Vec<SubledgerDocument>> {
        let mut tables = self.store.write()?;

        let payment = Self::get_in(&tables, organization_id, payment_id)?.clone();
        let mut targets = Vec::with_capacity(requests.len());
        for request in &requests {
            targets.push(Self::get_in(&tables, organization_id, request.document_id)?.clone());
        }
        {
            let target_refs: Vec<&SubledgerDocument> = targets.iter().collect();
            AllocationService::validate(&payment, &requests, &target_refs)
                .map_err(convert::subledger)?;
        }

        let now = Utc::now();
        let mut updated = Vec::with_capacity(requests.len());
        for request in &requests {
            let target = tables.documents.get_mut(&request.document_id).ok_or_else(|| {
                convert::subledger(SubledgerError::DocumentNotFound(request.document_id))
            })?;
            AllocationService::apply_settlement(target, request.amount)
                .map_err(convert::subledger)?;
            target.updated_at = now;
            updated.push(target.clone());

            tables.allocations.push(Allocation {
                payment_id,
                document_id: request.document_id,
                amount: request.amount,
                allocated_at: now,
            });
        }

        let allocated: Decimal = requests.iter().map(|r| r.amount).sum();
        let payment = tables.documents.get_mut(&payment_id).ok_or_else(|| {
            convert::subledger(SubledgerError::DocumentNotFound(payment_id))
        })?;
        payment.paid_amount += allocated;
        if payment.balance_due() == Decimal::ZERO {
            payment.status = DocumentStatus::Paid;
        }
        payment.updated_at = now;

        tracing::info!(payment_id = %payment_id, %allocated, "payment allocated");
        Ok(updated)
    }

    /// Flags open documents past their due date as Overdue. Returns the
    /// number of documents that changed.
    pub fn refresh_overdue(
        &self,
        organization_id: OrganizationId,
        as_of: NaiveDate,
    ) -> AppResult<usize> {
        let mut tables = self.store.write()?;
        let mut changed = 0;
        for doc in tables
            .documents
            .values_mut()
            .filter(|d| d.organization_id == organization_id)
        {
            if AllocationService::roll_overdue(doc, as_of) {
                doc.updated_at = Utc::now();
                changed += 1;
            }
        }
        if changed > 0 {
            tracing::info!(count = changed, "documents rolled to overdue");
        }
        Ok(changed)
    }

    /// Lists documents still carrying an open balance, for reminder and
    /// collection flows.
    pub fn list_open(
        &self,
        organization_id: OrganizationId,
    ) -> AppResult<Vec<SubledgerDocument>> {
        let tables = self.store.read()?;
        let mut docs: Vec<SubledgerDocument> = tables
            .documents
            .values()
            .filter(|d| {
                d.organization_id == organization_id
                    && d.status.is_open()
                    && d.balance_due() > Decimal::ZERO
            })
            .cloned()
            .collect();
        docs.sort_by_key(|d| (d.due_date, d.id));
        Ok(docs)
    }

    /// Computes the aging report over the organization's open documents.
    pub fn aging(&self, organization_id: OrganizationId, as_of: NaiveDate) -> AppResult<AgingReport> {
        let tables = self.store.read()?;
        Ok(compute_aging(
            tables
                .documents
                .values()
                .filter(|d| d.organization_id == organization_id),
            as_of,
        ))
    }

    fn get_in<'t>(
        tables: &'t Tables,
        organization_id: OrganizationId,
        id: DocumentId,
    ) -> AppResult<&'t SubledgerDocument> {
        tables
            .documents
            .get(&id)
            .filter(|d| d.organization_id == organization_id)
            .ok_or_else(|| convert::subledger(SubledgerError::DocumentNotFound(id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{AccountRepository, FiscalRepository, JournalRepository};
    use rust_decimal_macros::dec;
    use tessera_core::coa::{AccountSubtype, CreateAccountInput};
    use tessera_core::journal::JournalStatus;
    use tessera_shared::config::LedgerConfig;
    use tessera_shared::types::AccountId;

    struct Fixture {
        store: LedgerStore,
        org: OrganizationId,
        revenue: AccountId,
        control: ControlAccounts,
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn fixture() -> Fixture {
        let store = LedgerStore::new(LedgerConfig::default());
        let org = OrganizationId::new();

        let accounts = AccountRepository::new(store.clone());
        let make = |code: &str, subtype: AccountSubtype| {
            accounts
                .create(CreateAccountInput {
                    organization_id: org,
                    code: code.to_string(),
                    name: code.to_string(),
                    subtype,
                    parent_id: None,
                    is_group: false,
                    is_system: true,
                    currency: Currency::Usd,
                    opening_balance: Decimal::ZERO,
                    opening_balance_date: None,
                })
                .unwrap()
                .id
        };
        let control = ControlAccounts {
            receivable: make("1100", AccountSubtype::AccountsReceivable),
            payable: make("2100", AccountSubtype::AccountsPayable),
            cash: make("1000", AccountSubtype::Cash),
            tax: make("2200", AccountSubtype::OtherCurrentLiability),
        };
        let revenue = make("4000", AccountSubtype::SalesRevenue);

        FiscalRepository::new(store.clone())
            .create_year(org, "FY 2025", date(2025, 1, 1), date(2025, 12, 31))
            .unwrap();
        let repo = SubledgerRepository::new(store.clone());
        repo.set_control_accounts(org, control).unwrap();

        Fixture {
            store,
            org,
            revenue,
            control,
        }
    }

    fn invoice_input(f: &Fixture, number: &str, amount: Decimal) -> CreateDocumentInput {
        CreateDocumentInput {
            organization_id: f.org,
            kind: DocumentKind::Invoice,
            party_id: PartyId::new(),
            document_number: number.to_string(),
            document_date: date(2025, 2, 10),
            due_date: date(2025, 3, 12),
            currency: Currency::Usd,
            lines: vec![DocumentLine {
                account_id: f.revenue,
                description: "Services".to_string(),
                amount,
                tax_amount: Decimal::ZERO,
            }],
            amount: Decimal::ZERO,
        }
    }

    fn receipt_input(f: &Fixture, amount: Decimal) -> CreateDocumentInput {
        CreateDocumentInput {
            organization_id: f.org,
            kind: DocumentKind::Receipt,
            party_id: PartyId::new(),
            document_number: "RCP-001".to_string(),
            document_date: date(2025, 2, 20),
            due_date: date(2025, 2, 20),
            currency: Currency::Usd,
            lines: vec![],
            amount,
        }
    }

    #[test]
    fn test_posting_invoice_creates_posted_journal() {
        let f = fixture();
        let repo = SubledgerRepository::new(f.store.clone());

        let doc = repo.create(invoice_input(&f, "INV-001", dec!(500))).unwrap();
        assert_eq!(doc.total, dec!(500));

        let posted = repo.post(f.org, doc.id).unwrap();
        assert_eq!(posted.status, DocumentStatus::Posted);
        let entry_id = posted.journal_entry_id.unwrap();

        let journal = JournalRepository::new(f.store.clone());
        let entry = journal.get(f.org, entry_id).unwrap();
        assert_eq!(entry.status, JournalStatus::Posted);
        assert_eq!(entry.total_debit, dec!(500));

        let tables = f.store.read().unwrap();
        let ar_row = tables
            .balances
            .iter()
            .find(|((account, _), _)| *account == f.control.receivable)
            .map(|(_, row)| row)
            .unwrap();
        assert_eq!(ar_row.debit_total, dec!(500));
    }

    #[test]
    fn test_failed_posting_leaves_document_draft() {
        let f = fixture();
        let repo = SubledgerRepository::new(f.store.clone());

        // Entry date outside any fiscal year: journal creation fails.
        let mut input = invoice_input(&f, "INV-001", dec!(500));
        input.document_date = date(2024, 2, 10);
        let doc = repo.create(input).unwrap();

        assert!(repo.post(f.org, doc.id).is_err());
        let doc = repo.get(f.org, doc.id).unwrap();
        assert_eq!(doc.status, DocumentStatus::Draft);
        assert!(doc.journal_entry_id.is_none());

        let tables = f.store.read().unwrap();
        assert!(tables.entries.is_empty());
    }

    #[test]
    fn test_allocation_marks_paid_at_exactly_zero() {
        let f = fixture();
        let repo = SubledgerRepository::new(f.store.clone());

        let invoice = repo.create(invoice_input(&f, "INV-001", dec!(500))).unwrap();
        repo.post(f.org, invoice.id).unwrap();
        let receipt = repo.create(receipt_input(&f, dec!(500))).unwrap();
        repo.post(f.org, receipt.id).unwrap();

        let updated = repo
            .allocate(
                f.org,
                receipt.id,
                vec![AllocationRequest {
                    document_id: invoice.id,
                    amount: dec!(500),
                }],
            )
            .unwrap();
        assert_eq!(updated[0].status, DocumentStatus::Paid);
        assert_eq!(updated[0].balance_due(), Decimal::ZERO);

        let receipt = repo.get(f.org, receipt.id).unwrap();
        assert_eq!(receipt.status, DocumentStatus::Paid);
    }

    #[test]
    fn test_partial_allocation_marks_partially_paid() {
        let f = fixture();
        let repo = SubledgerRepository::new(f.store.clone());

        let invoice = repo.create(invoice_input(&f, "INV-001", dec!(500))).unwrap();
        repo.post(f.org, invoice.id).unwrap();
        let receipt = repo.create(receipt_input(&f, dec!(200))).unwrap();
        repo.post(f.org, receipt.id).unwrap();

        let updated = repo
            .allocate(
                f.org,
                receipt.id,
                vec![AllocationRequest {
                    document_id: invoice.id,
                    amount: dec!(200),
                }],
            )
            .unwrap();
        assert_eq!(updated[0].status, DocumentStatus::PartiallyPaid);
        assert_eq!(updated[0].balance_due(), dec!(300));
    }

    #[test]
    fn test_over_allocation_rejected_without_mutation() {
        let f = fixture();
        let repo = SubledgerRepository::new(f.store.clone());

        let invoice = repo.create(invoice_input(&f, "INV-001", dec!(500))).unwrap();
        repo.post(f.org, invoice.id).unwrap();
        let receipt = repo.create(receipt_input(&f, dec!(100))).unwrap();
        repo.post(f.org, receipt.id).unwrap();

        let err = repo
            .allocate(
                f.org,
                receipt.id,
                vec![AllocationRequest {
                    document_id: invoice.id,
                    amount: dec!(150),
                }],
            )
            .unwrap_err();
        assert_eq!(err.status_code(), 422);

        let invoice = repo.get(f.org, invoice.id).unwrap();
        assert_eq!(invoice.paid_amount, Decimal::ZERO);
        assert_eq!(invoice.status, DocumentStatus::Posted);
    }

    #[test]
    fn test_split_allocations_to_one_invoice_capped_at_balance_due() {
        let f = fixture();
        let repo = SubledgerRepository::new(f.store.clone());

        let invoice = repo.create(invoice_input(&f, "INV-001", dec!(500))).unwrap();
        repo.post(f.org, invoice.id).unwrap();
        let receipt = repo.create(receipt_input(&f, dec!(800))).unwrap();
        repo.post(f.org, receipt.id).unwrap();

        let err = repo
            .allocate(
                f.org,
                receipt.id,
                vec![
                    AllocationRequest {
                        document_id: invoice.id,
                        amount: dec!(300),
                    },
                    AllocationRequest {
                        document_id: invoice.id,
                        amount: dec!(300),
                    },
                ],
            )
            .unwrap_err();
        assert_eq!(err.status_code(), 422);

        let invoice = repo.get(f.org, invoice.id).unwrap();
        assert_eq!(invoice.paid_amount, Decimal::ZERO);
        assert_eq!(invoice.balance_due(), dec!(500));
        assert_eq!(invoice.status, DocumentStatus::Posted);
        let receipt = repo.get(f.org, receipt.id).unwrap();
        assert_eq!(receipt.paid_amount, Decimal::ZERO);
    }

    #[test]
    fn test_overdue_rollforward_and_aging() {
        let f = fixture();
        let repo = SubledgerRepository::new(f.store.clone());

        let invoice = repo.create(invoice_input(&f, "INV-001", dec!(500))).unwrap();
        repo.post(f.org, invoice.id).unwrap();

        // Due 2025-03-12; 46 days later lands in the 31-60 bucket.
        let as_of = date(2025, 4, 27);
        let changed = repo.refresh_overdue(f.org, as_of).unwrap();
        assert_eq!(changed, 1);
        assert_eq!(repo.get(f.org, invoice.id).unwrap().status, DocumentStatus::Overdue);

        let report = repo.aging(f.org, as_of).unwrap();
        assert_eq!(report.totals.days_31_60, dec!(500));
        assert_eq!(report.totals.total(), dec!(500));
    }
}
