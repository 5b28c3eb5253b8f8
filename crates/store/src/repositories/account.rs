//! Chart of accounts repository.

use chrono::Utc;
use rust_decimal::Decimal;
use tessera_core::coa::{Account, CoaService, CreateAccountInput, ParentInfo, UpdateAccountPatch};
use tessera_shared::error::{AppError, AppResult};
use tessera_shared::types::{AccountId, OrganizationId};

use crate::convert;
use crate::tables::{LedgerStore, Tables};

/// Repository for chart of accounts operations.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    store: LedgerStore,
}

impl AccountRepository {
    /// Creates a new repository handle.
    #[must_use]
    pub fn new(store: LedgerStore) -> Self {
        Self { store }
    }

    /// Creates an account, resolving its hierarchy level.
    ///
    /// # Errors
    ///
    /// Returns a conflict for a duplicate code and validation errors for
    /// hierarchy rule violations.
    pub fn create(&self, input: CreateAccountInput) -> AppResult<Account> {
        let mut tables = self.store.write()?;

        let organization_id = input.organization_id;
        let level = CoaService::validate_create(
            &input,
            |code| {
                tables
                    .accounts
                    .values()
                    .any(|a| a.organization_id == organization_id && a.code == code)
            },
            |parent_id| {
                tables.accounts.get(&parent_id).map(|p| ParentInfo {
                    same_organization: p.organization_id == organization_id,
                    is_group: p.is_group,
                    account_type: p.account_type,
                    level: p.level,
                })
            },
        )
        .map_err(convert::coa)?;

        let now = Utc::now();
        let account = Account {
            id: AccountId::new(),
            organization_id,
            code: input.code,
            name: input.name,
            account_type: input.subtype.account_type(),
            subtype: input.subtype,
            parent_id: input.parent_id,
            level,
            is_group: input.is_group,
            is_system: input.is_system,
            currency: input.currency,
            opening_balance: input.opening_balance,
            opening_balance_date: input.opening_balance_date,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        tracing::info!(account_id = %account.id, code = %account.code, "account created");
        tables.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    /// Fetches an account by id within an organization.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when absent or owned by another organization.
    pub fn get(&self, organization_id: OrganizationId, id: AccountId) -> AppResult<Account> {
        let tables = self.store.read()?;
        Self::get_in(&tables, organization_id, id).cloned()
    }

    /// Lists an organization's accounts ordered by code.
    pub fn list(&self, organization_id: OrganizationId) -> AppResult<Vec<Account>> {
        let tables = self.store.read()?;
        let mut accounts: Vec<Account> = tables
            .accounts
            .values()
            .filter(|a| a.organization_id == organization_id)
            .cloned()
            .collect();
        accounts.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(accounts)
    }

    /// Applies a patch to an account.
    ///
    /// Code and account type are immutable once any journal line
    /// references the account.
    ///
    /// # Errors
    ///
    /// Returns `BusinessRule` on an immutable field mutation.
    pub fn update(
        &self,
        organization_id: OrganizationId,
        id: AccountId,
        patch: UpdateAccountPatch,
    ) -> AppResult<Account> {
        let mut tables = self.store.write()?;

        let account = Self::get_in(&tables, organization_id, id)?.clone();
        let has_journal_lines = Self::has_journal_lines(&tables, id);
        CoaService::validate_update(&account, &patch, has_journal_lines).map_err(convert::coa)?;

        let entry = tables
            .accounts
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("account not found: {id}")))?;
        if let Some(name) = patch.name {
            entry.name = name;
        }
        if let Some(code) = patch.code {
            entry.code = code;
        }
        if let Some(subtype) = patch.subtype {
            entry.subtype = subtype;
            entry.account_type = subtype.account_type();
        }
        if let Some(parent_id) = patch.parent_id {
            entry.parent_id = parent_id;
        }
        entry.updated_at = Utc::now();
        Ok(entry.clone())
    }

    /// Deactivates an account.
    ///
    /// # Errors
    ///
    /// Returns `BusinessRule` when the account is a system account or
    /// still carries a nonzero balance.
    pub fn deactivate(&self, organization_id: OrganizationId, id: AccountId) -> AppResult<Account> {
        let mut tables = self.store.write()?;

        let account = Self::get_in(&tables, organization_id, id)?.clone();
        let current_balance = Self::current_balance(&tables, &account);
        CoaService::validate_deactivate(&account, current_balance).map_err(convert::coa)?;

        let entry = tables
            .accounts
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("account not found: {id}")))?;
        entry.is_active = false;
        entry.updated_at = Utc::now();
        tracing::info!(account_id = %id, "account deactivated");
        Ok(entry.clone())
    }

    fn get_in<'t>(
        tables: &'t Tables,
        organization_id: OrganizationId,
        id: AccountId,
    ) -> AppResult<&'t Account> {
        tables
            .accounts
            .get(&id)
            .filter(|a| a.organization_id == organization_id)
            .ok_or_else(|| AppError::NotFound(format!("account not found: {id}")))
    }

    fn has_journal_lines(tables: &Tables, id: AccountId) -> bool {
        tables
            .entries
            .values()
            .any(|e| e.lines.iter().any(|l| l.account_id == id))
    }

    /// Cumulative balance: the opening balance plus every posted period
    /// movement, in the account's sign convention.
    fn current_balance(tables: &Tables, account: &Account) -> Decimal {
        let normal = account.account_type.normal_balance();
        let movement: Decimal = tables
            .balances
            .iter()
            .filter(|((account_id, _), _)| *account_id == account.id)
            .map(|(_, row)| normal.balance_change(row.debit_total, row.credit_total))
            .sum();
        account.opening_balance + movement
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tessera_core::coa::AccountSubtype;
    use tessera_shared::config::LedgerConfig;
    use tessera_shared::types::Currency;

    fn repo() -> AccountRepository {
        AccountRepository::new(LedgerStore::new(LedgerConfig::default()))
    }

    fn input(org: OrganizationId, code: &str, subtype: AccountSubtype) -> CreateAccountInput {
        CreateAccountInput {
            organization_id: org,
            code: code.to_string(),
            name: format!("Account {code}"),
            subtype,
            parent_id: None,
            is_group: false,
            is_system: false,
            currency: Currency::Usd,
            opening_balance: Decimal::ZERO,
            opening_balance_date: None,
        }
    }

    #[test]
    fn test_create_and_list_ordered_by_code() {
        let repo = repo();
        let org = OrganizationId::new();
        repo.create(input(org, "2000", AccountSubtype::AccountsPayable)).unwrap();
        repo.create(input(org, "1000", AccountSubtype::Cash)).unwrap();

        let accounts = repo.list(org).unwrap();
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].code, "1000");
        assert_eq!(accounts[1].code, "2000");
    }

    #[test]
    fn test_duplicate_code_conflicts() {
        let repo = repo();
        let org = OrganizationId::new();
        repo.create(input(org, "1000", AccountSubtype::Cash)).unwrap();

        let err = repo.create(input(org, "1000", AccountSubtype::Cash)).unwrap_err();
        assert_eq!(err.status_code(), 409);
    }

    #[test]
    fn test_same_code_allowed_across_organizations() {
        let repo = repo();
        repo.create(input(OrganizationId::new(), "1000", AccountSubtype::Cash)).unwrap();
        assert!(repo.create(input(OrganizationId::new(), "1000", AccountSubtype::Cash)).is_ok());
    }

    #[test]
    fn test_child_level_derived_from_parent() {
        let repo = repo();
        let org = OrganizationId::new();
        let mut group = input(org, "1000", AccountSubtype::Cash);
        group.is_group = true;
        let parent = repo.create(group).unwrap();
        assert_eq!(parent.level, 1);

        let mut child = input(org, "1010", AccountSubtype::Cash);
        child.parent_id = Some(parent.id);
        let child = repo.create(child).unwrap();
        assert_eq!(child.level, 2);
    }

    #[test]
    fn test_group_with_opening_balance_rejected() {
        let repo = repo();
        let mut group = input(OrganizationId::new(), "1000", AccountSubtype::Cash);
        group.is_group = true;
        group.opening_balance = dec!(100);
        assert_eq!(repo.create(group).unwrap_err().status_code(), 400);
    }

    #[test]
    fn test_update_name_is_free() {
        let repo = repo();
        let org = OrganizationId::new();
        let account = repo.create(input(org, "1000", AccountSubtype::Cash)).unwrap();

        let patch = UpdateAccountPatch {
            name: Some("Petty cash".to_string()),
            ..UpdateAccountPatch::default()
        };
        let updated = repo.update(org, account.id, patch).unwrap();
        assert_eq!(updated.name, "Petty cash");
    }

    #[test]
    fn test_deactivate_system_account_rejected() {
        let repo = repo();
        let org = OrganizationId::new();
        let mut sys = input(org, "1100", AccountSubtype::AccountsReceivable);
        sys.is_system = true;
        let account = repo.create(sys).unwrap();

        let err = repo.deactivate(org, account.id).unwrap_err();
        assert_eq!(err.status_code(), 422);
    }

    #[test]
    fn test_cross_org_access_is_not_found() {
        let repo = repo();
        let account = repo
            .create(input(OrganizationId::new(), "1000", AccountSubtype::Cash))
            .unwrap();
        let err = repo.get(OrganizationId::new(), account.id).unwrap_err();
        assert_eq!(err.status_code(), 404);
    }
}
