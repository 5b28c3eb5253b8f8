//! Chart of accounts domain logic.
//!
//! This module implements the account hierarchy rules:
//! - Account types and subtypes
//! - Hierarchy validation (group accounts, levels, type inheritance)
//! - Mutation rules (immutable fields, deactivation guards)

pub mod error;
pub mod service;
pub mod types;

pub use error::CoaError;
pub use service::{CoaService, ParentInfo};
pub use types::{Account, AccountSubtype, AccountType, CreateAccountInput, UpdateAccountPatch};
