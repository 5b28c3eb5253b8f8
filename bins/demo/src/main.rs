//! Tessera ledger walkthrough.
//!
//! Seeds a small chart of accounts and fiscal year, runs an invoice
//! through posting, settlement, aging and reconciliation, and prints the
//! resulting reports.
//!
//! Usage: cargo run --bin demo

use anyhow::Context;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tessera_core::coa::{AccountSubtype, CreateAccountInput};
use tessera_core::journal::{CreateJournalInput, JournalLineInput, JournalType};
use tessera_core::reconciliation::BankTransactionKind;
use tessera_core::subledger::{
    AllocationRequest, ControlAccounts, DocumentKind, DocumentLine,
};
use tessera_shared::config::AppConfig;
use tessera_shared::types::{AccountId, Currency, OrganizationId, PartyId};
use tessera_store::{
    AccountRepository, CreateDocumentInput, FiscalRepository, JournalRepository, LedgerStore,
    ReconciliationRepository, ReportRepository, SubledgerRepository,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

struct Chart {
    cash: AccountId,
    receivable: AccountId,
    payable: AccountId,
    tax: AccountId,
    revenue: AccountId,
    rent: AccountId,
}

fn seed_chart(
    accounts: &AccountRepository,
    org: OrganizationId,
    currency: Currency,
) -> anyhow::Result<Chart> {
    let make = |code: &str, name: &str, subtype, opening| {
        accounts
            .create(CreateAccountInput {
                organization_id: org,
                code: code.to_string(),
                name: name.to_string(),
                subtype,
                parent_id: None,
                is_group: false,
                is_system: false,
                currency,
                opening_balance: opening,
                opening_balance_date: Some(date(2025, 1, 1)),
            })
            .map(|a| a.id)
            .with_context(|| format!("creating account {code}"))
    };

    // Equity backs the cash opening balance so the books start level.
    make("3000", "Owner Equity", AccountSubtype::Equity, dec!(5000))?;

    Ok(Chart {
        cash: make("1000", "Cash at Bank", AccountSubtype::Cash, dec!(5000))?,
        receivable: make(
            "1100",
            "Accounts Receivable",
            AccountSubtype::AccountsReceivable,
            Decimal::ZERO,
        )?,
        payable: make(
            "2000",
            "Accounts Payable",
            AccountSubtype::AccountsPayable,
            Decimal::ZERO,
        )?,
        tax: make(
            "2100",
            "Tax Payable",
            AccountSubtype::OtherCurrentLiability,
            Decimal::ZERO,
        )?,
        revenue: make(
            "4000",
            "Sales Revenue",
            AccountSubtype::SalesRevenue,
            Decimal::ZERO,
        )?,
        rent: make(
            "5100",
            "Rent Expense",
            AccountSubtype::OperatingExpense,
            Decimal::ZERO,
        )?,
    })
}

#[allow(clippy::too_many_lines)]
fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tessera=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("loading configuration")?;
    let currency: Currency = config
        .ledger
        .default_currency
        .parse()
        .map_err(anyhow::Error::msg)?;
    let store = LedgerStore::new(config.ledger);
    let org = OrganizationId::new();

    let accounts = AccountRepository::new(store.clone());
    let fiscal = FiscalRepository::new(store.clone());
    let journals = JournalRepository::new(store.clone());
    let subledger = SubledgerRepository::new(store.clone());
    let banking = ReconciliationRepository::new(store.clone());
    let reports = ReportRepository::new(store.clone());

    let chart = seed_chart(&accounts, org, currency)?;
    let (year, periods) = fiscal.create_year(org, "FY 2025", date(2025, 1, 1), date(2025, 12, 31))?;
    info!(year = %year.name, periods = periods.len(), "fiscal year opened");

    subledger.set_control_accounts(
        org,
        ControlAccounts {
            receivable: chart.receivable,
            payable: chart.payable,
            cash: chart.cash,
            tax: chart.tax,
        },
    )?;

    // Manual entry: January rent, paid from the bank account.
    let rent = journals.create(CreateJournalInput {
        organization_id: org,
        journal_type: JournalType::Manual,
        entry_date: date(2025, 1, 5),
        description: "January office rent".to_string(),
        currency,
        source: None,
        lines: vec![
            JournalLineInput::debit(chart.rent, dec!(800)),
            JournalLineInput::credit(chart.cash, dec!(800)),
        ],
    })?;
    let rent = journals.post(org, rent.id)?;
    info!(number = %rent.journal_number, "manual entry posted");

    // Customer invoice, posted through the AR template, then settled by
    // a receipt allocated against it.
    let customer = PartyId::new();
    let invoice = subledger.create(CreateDocumentInput {
        organization_id: org,
        kind: DocumentKind::Invoice,
        party_id: customer,
        document_number: "INV-0001".to_string(),
        document_date: date(2025, 1, 10),
        due_date: date(2025, 2, 9),
        currency,
        lines: vec![DocumentLine {
            account_id: chart.revenue,
            description: "Consulting services".to_string(),
            amount: dec!(1000),
            tax_amount: dec!(100),
        }],
        amount: Decimal::ZERO,
    })?;
    let invoice = subledger.post(org, invoice.id)?;
    info!(number = %invoice.document_number, total = %invoice.total, "invoice posted");

    let receipt = subledger.create(CreateDocumentInput {
        organization_id: org,
        kind: DocumentKind::Receipt,
        party_id: customer,
        document_number: "RCP-0001".to_string(),
        document_date: date(2025, 1, 20),
        due_date: date(2025, 1, 20),
        currency,
        lines: Vec::new(),
        amount: dec!(600),
    })?;
    let receipt = subledger.post(org, receipt.id)?;
    subledger.allocate(
        org,
        receipt.id,
        vec![AllocationRequest {
            document_id: invoice.id,
            amount: dec!(600),
        }],
    )?;
    info!(number = %receipt.document_number, "receipt allocated");

    // The remaining 500 is past due by mid-March.
    let as_of = date(2025, 3, 15);
    let rolled = subledger.refresh_overdue(org, as_of)?;
    info!(rolled, "overdue refresh complete");

    println!("\n=== AR Aging as of {as_of} ===");
    let aging = subledger.aging(org, as_of)?;
    for party in &aging.parties {
        println!(
            "  party {}  current {:>8}  1-30 {:>8}  31-60 {:>8}  61-90 {:>8}  90+ {:>8}",
            party.party_id,
            party.breakdown.current,
            party.breakdown.days_1_30,
            party.breakdown.days_31_60,
            party.breakdown.days_61_90,
            party.breakdown.over_90,
        );
    }
    println!("  total outstanding: {}", aging.totals.total());

    // Reconcile January's bank statement against the cash movements.
    let bank = banking.create_bank_account(org, "Operating", chart.cash, currency, dec!(5000))?;
    let rent_txn = banking.record_transaction(
        bank.id,
        date(2025, 1, 5),
        BankTransactionKind::Withdrawal,
        dec!(800),
        "Rent payment",
    )?;
    let receipt_txn = banking.record_transaction(
        bank.id,
        date(2025, 1, 20),
        BankTransactionKind::Deposit,
        dec!(600),
        "Customer receipt",
    )?;
    let rec = banking.start(
        bank.id,
        date(2025, 1, 31),
        dec!(4800),
        dec!(5000),
        vec![rent_txn.id, receipt_txn.id],
    )?;
    println!("\n=== Bank reconciliation ===");
    println!("  difference before completion: {}", banking.difference(rec.id)?);
    let rec = banking.complete(rec.id)?;
    println!("  status: {:?}", rec.status);

    // Close January so February inherits its closing balances.
    fiscal.close_period(org, periods[0].id)?;
    info!("January closed");

    let january = periods[0].id;
    println!("\n=== Trial Balance (January) ===");
    let tb = reports.trial_balance(org, january)?;
    for row in &tb.rows {
        println!(
            "  {:<6} {:<22} opening {:>9} debit {:>9} credit {:>9} closing {:>9}",
            row.code, row.name, row.opening, row.debit, row.credit, row.closing,
        );
    }
    println!(
        "  totals: debit {} credit {} (balanced: {})",
        tb.total_debit,
        tb.total_credit,
        tb.is_balanced()
    );

    println!("\n=== Income Statement (January) ===");
    let pnl = reports.income_statement(org, january)?;
    println!("  revenue:            {:>9}", pnl.revenue.total);
    println!("  operating expenses: {:>9}", pnl.operating_expenses.total);
    println!("  net income:         {:>9}", pnl.net_income);

    println!("\n=== Balance Sheet (as of 2025-01-31) ===");
    let sheet = reports.balance_sheet(org, date(2025, 1, 31))?;
    println!("  assets:           {:>9}", sheet.assets.total);
    println!("  liabilities:      {:>9}", sheet.liabilities.total);
    println!("  equity:           {:>9}", sheet.equity.total);
    println!("  current earnings: {:>9}", sheet.current_earnings);
    println!("  balanced: {}", sheet.balanced);

    println!("\n=== Cash Flow (January, indirect) ===");
    let cf = reports.cash_flow(org, january)?;
    println!("  net income:        {:>9}", cf.net_income);
    println!("  net operating:     {:>9}", cf.net_operating);
    println!("  net cash flow:     {:>9}", cf.net_cash_flow);
    println!("  cash at beginning: {:>9}", cf.cash_at_beginning);
    println!("  cash at end:       {:>9}", cf.cash_at_end);

    Ok(())
}
