//! Chart of accounts validation service.
//!
//! Pure business logic with no storage dependencies. Lookups (code
//! uniqueness, parent resolution) are injected as closures so the rules
//! can run against any backing store.

use rust_decimal::Decimal;
use tessera_shared::types::AccountId;

use super::error::CoaError;
use super::types::{Account, CreateAccountInput, UpdateAccountPatch};

/// Information about a prospective parent account needed for validation.
#[derive(Debug, Clone)]
pub struct ParentInfo {
    /// The parent account's organization (must match the child's).
    pub same_organization: bool,
    /// Whether the parent is a group account.
    pub is_group: bool,
    /// The parent's account type.
    pub account_type: super::types::AccountType,
    /// The parent's depth in the hierarchy.
    pub level: i32,
}

/// Chart of accounts validation service.
pub struct CoaService;

impl CoaService {
    /// Validate account creation and resolve the hierarchy level.
    ///
    /// Checks, in order:
    /// 1. Code uniqueness within the organization
    /// 2. Group accounts carry no opening balance
    /// 3. Parent exists, is a group, belongs to the same organization,
    ///    and shares the child's account type
    ///
    /// Returns the resolved level (root = 1, otherwise parent.level + 1).
    ///
    /// # Errors
    ///
    /// Returns `CoaError` if any rule is violated.
    pub fn validate_create<C, P>(
        input: &CreateAccountInput,
        code_exists: C,
        parent_lookup: P,
    ) -> Result<i32, CoaError>
    where
        C: Fn(&str) -> bool,
        P: Fn(AccountId) -> Option<ParentInfo>,
    {
        if code_exists(&input.code) {
            return Err(CoaError::DuplicateCode(input.code.clone()));
        }

        if input.is_group && input.opening_balance != Decimal::ZERO {
            return Err(CoaError::GroupOpeningBalance);
        }

        let level = match input.parent_id {
            None => 1,
            Some(parent_id) => {
                let parent =
                    parent_lookup(parent_id).ok_or(CoaError::ParentNotFound(parent_id))?;
                if !parent.same_organization {
                    return Err(CoaError::ParentWrongOrganization(parent_id));
                }
                if !parent.is_group {
                    return Err(CoaError::ParentNotGroup(parent_id));
                }
                let child_type = input.subtype.account_type();
                if parent.account_type != child_type {
                    return Err(CoaError::ParentTypeMismatch {
                        child: child_type,
                        parent: parent.account_type,
                    });
                }
                parent.level + 1
            }
        };

        Ok(level)
    }

    /// Validate an account update patch.
    ///
    /// Code and account type become immutable once any journal line
    /// references the account; changing either afterwards would invalidate
    /// historical postings.
    ///
    /// # Errors
    ///
    /// Returns `CoaError::ImmutableField` on a forbidden mutation.
    pub fn validate_update(
        account: &Account,
        patch: &UpdateAccountPatch,
        has_journal_lines: bool,
    ) -> Result<(), CoaError> {
        if !has_journal_lines {
            return Ok(());
        }

        if let Some(code) = &patch.code
            && *code != account.code
        {
            return Err(CoaError::ImmutableField("code"));
        }

        if let Some(subtype) = patch.subtype
            && subtype.account_type() != account.account_type
        {
            return Err(CoaError::ImmutableField("account_type"));
        }

        Ok(())
    }

    /// Validate account deactivation.
    ///
    /// # Errors
    ///
    /// Returns `CoaError::AccountInUse` when the current balance is
    /// nonzero, or `CoaError::SystemAccount` for engine-managed accounts.
    pub fn validate_deactivate(
        account: &Account,
        current_balance: Decimal,
    ) -> Result<(), CoaError> {
        if account.is_system {
            return Err(CoaError::SystemAccount(account.id));
        }
        if current_balance != Decimal::ZERO {
            return Err(CoaError::AccountInUse(account.id));
        }
        Ok(())
    }
}
