//! Chart of accounts error types.

use tessera_shared::types::AccountId;
use thiserror::Error;

use super::types::AccountType;

/// Errors that can occur during chart of accounts operations.
#[derive(Debug, Error)]
pub enum CoaError {
    /// Account code already exists within the organization.
    #[error("Account code '{0}' already exists")]
    DuplicateCode(String),

    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Parent account not found.
    #[error("Parent account not found: {0}")]
    ParentNotFound(AccountId),

    /// Parent account belongs to another organization.
    #[error("Parent account {0} belongs to another organization")]
    ParentWrongOrganization(AccountId),

    /// Only group accounts may have children.
    #[error("Parent account {0} is not a group account")]
    ParentNotGroup(AccountId),

    /// A child's account type must match its parent's type.
    #[error("Account type {child:?} does not match parent type {parent:?}")]
    ParentTypeMismatch {
        /// The child account's type.
        child: AccountType,
        /// The parent account's type.
        parent: AccountType,
    },

    /// Group accounts never receive postings, so they carry no opening balance.
    #[error("Group accounts cannot have an opening balance")]
    GroupOpeningBalance,

    /// Field is immutable once the account has journal lines.
    #[error("Field '{0}' is immutable once the account has journal lines")]
    ImmutableField(&'static str),

    /// Account cannot be deactivated while its balance is nonzero.
    #[error("Account {0} is in use and cannot be deactivated")]
    AccountInUse(AccountId),

    /// System accounts are engine-managed and cannot be deactivated.
    #[error("Account {0} is a system account")]
    SystemAccount(AccountId),
}

impl CoaError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::DuplicateCode(_) => "DUPLICATE_ACCOUNT_CODE",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::ParentNotFound(_) => "PARENT_NOT_FOUND",
            Self::ParentWrongOrganization(_) => "PARENT_WRONG_ORGANIZATION",
            Self::ParentNotGroup(_) => "PARENT_NOT_GROUP",
            Self::ParentTypeMismatch { .. } => "PARENT_TYPE_MISMATCH",
            Self::GroupOpeningBalance => "GROUP_OPENING_BALANCE",
            Self::ImmutableField(_) => "IMMUTABLE_FIELD",
            Self::AccountInUse(_) => "ACCOUNT_IN_USE",
            Self::SystemAccount(_) => "SYSTEM_ACCOUNT",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            CoaError::DuplicateCode("1000".to_string()).error_code(),
            "DUPLICATE_ACCOUNT_CODE"
        );
        assert_eq!(
            CoaError::ImmutableField("code").error_code(),
            "IMMUTABLE_FIELD"
        );
        assert_eq!(
            CoaError::AccountInUse(AccountId::new()).error_code(),
            "ACCOUNT_IN_USE"
        );
    }

    #[test]
    fn test_error_display() {
        let err = CoaError::DuplicateCode("4000".to_string());
        assert_eq!(err.to_string(), "Account code '4000' already exists");

        let err = CoaError::ImmutableField("account_type");
        assert_eq!(
            err.to_string(),
            "Field 'account_type' is immutable once the account has journal lines"
        );
    }
}
