//! Chart of accounts domain types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tessera_shared::types::{AccountId, Currency, OrganizationId};

use crate::balance::NormalBalance;

/// The five fundamental account types.
///
/// The type determines the account's normal balance and which financial
/// statement it appears on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Resources owned (cash, receivables, equipment).
    Asset,
    /// Obligations owed (payables, loans).
    Liability,
    /// Owner's residual interest.
    Equity,
    /// Income earned.
    Revenue,
    /// Costs incurred.
    Expense,
}

impl AccountType {
    /// Returns the normal balance side for this account type.
    ///
    /// Asset/Expense accounts are debit-normal; Liability/Equity/Revenue
    /// accounts are credit-normal.
    #[must_use]
    pub const fn normal_balance(self) -> NormalBalance {
        match self {
            Self::Asset | Self::Expense => NormalBalance::Debit,
            Self::Liability | Self::Equity | Self::Revenue => NormalBalance::Credit,
        }
    }

    /// Returns true if this type appears on the balance sheet.
    #[must_use]
    pub const fn is_balance_sheet(self) -> bool {
        matches!(self, Self::Asset | Self::Liability | Self::Equity)
    }
}

/// Account subtype for report sectioning and cash-flow classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountSubtype {
    /// Cash and cash equivalents.
    Cash,
    /// Trade receivables (AR control).
    AccountsReceivable,
    /// Other current assets (prepaids, inventory).
    OtherCurrentAsset,
    /// Property, plant and equipment.
    FixedAsset,
    /// Trade payables (AP control).
    AccountsPayable,
    /// Other current liabilities (accruals, tax payable).
    OtherCurrentLiability,
    /// Loans and other long-term obligations.
    LongTermLiability,
    /// Share capital, retained earnings.
    Equity,
    /// Revenue from primary operations.
    SalesRevenue,
    /// Interest and other non-operating income.
    OtherIncome,
    /// Direct costs of goods or services sold.
    CostOfGoodsSold,
    /// Selling, general and administrative expenses.
    OperatingExpense,
    /// Interest, depreciation and other non-operating expenses.
    OtherExpense,
}

impl AccountSubtype {
    /// Returns the account type this subtype belongs to.
    #[must_use]
    pub const fn account_type(self) -> AccountType {
        match self {
            Self::Cash | Self::AccountsReceivable | Self::OtherCurrentAsset | Self::FixedAsset => {
                AccountType::Asset
            }
            Self::AccountsPayable | Self::OtherCurrentLiability | Self::LongTermLiability => {
                AccountType::Liability
            }
            Self::Equity => AccountType::Equity,
            Self::SalesRevenue | Self::OtherIncome => AccountType::Revenue,
            Self::CostOfGoodsSold | Self::OperatingExpense | Self::OtherExpense => {
                AccountType::Expense
            }
        }
    }
}

/// A chart of accounts entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier.
    pub id: AccountId,
    /// Organization this account belongs to.
    pub organization_id: OrganizationId,
    /// Account code (unique within the organization).
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account type (immutable once the account has journal lines).
    pub account_type: AccountType,
    /// Account subtype for report sectioning.
    pub subtype: AccountSubtype,
    /// Parent account (None for root accounts).
    pub parent_id: Option<AccountId>,
    /// Depth in the hierarchy (root = 1, denormalized from the parent chain).
    pub level: i32,
    /// Group accounts structure the tree and never receive postings.
    pub is_group: bool,
    /// System accounts are engine-managed and cannot be deactivated.
    pub is_system: bool,
    /// Account currency.
    pub currency: Currency,
    /// Opening balance carried into the first period.
    pub opening_balance: Decimal,
    /// Date the opening balance was taken.
    pub opening_balance_date: Option<NaiveDate>,
    /// Inactive accounts reject new postings.
    pub is_active: bool,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Returns true if journal lines may post to this account.
    #[must_use]
    pub fn accepts_postings(&self) -> bool {
        self.is_active && !self.is_group
    }
}

/// Input for creating a new account.
#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    /// Organization the account belongs to.
    pub organization_id: OrganizationId,
    /// Account code (must be unique within the organization).
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account subtype (the type is derived from it).
    pub subtype: AccountSubtype,
    /// Optional parent account.
    pub parent_id: Option<AccountId>,
    /// Whether this is a group (non-posting) account.
    pub is_group: bool,
    /// Whether this is a system account.
    pub is_system: bool,
    /// Account currency.
    pub currency: Currency,
    /// Opening balance (must be zero for group accounts).
    pub opening_balance: Decimal,
    /// Date the opening balance was taken.
    pub opening_balance_date: Option<NaiveDate>,
}

/// Patch for updating an existing account.
///
/// Code and account type are intentionally absent from the freely-editable
/// fields: once any journal line references the account they are immutable
/// and may only be supplied while the account is unreferenced.
#[derive(Debug, Clone, Default)]
pub struct UpdateAccountPatch {
    /// New account name.
    pub name: Option<String>,
    /// New account code (rejected once the account has journal lines).
    pub code: Option<String>,
    /// New subtype (rejected once the account has journal lines if it
    /// changes the account type).
    pub subtype: Option<AccountSubtype>,
    /// New parent (use `Some(None)` to detach to root).
    pub parent_id: Option<Option<AccountId>>,
}
