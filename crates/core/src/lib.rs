//! Core business logic for Tessera.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `coa` - Chart of accounts hierarchy and mutation rules
//! - `fiscal` - Fiscal year and period lifecycle
//! - `journal` - Double-entry journal validation and state machine
//! - `balance` - Per-account, per-period balance arithmetic
//! - `subledger` - AR/AP document posting and payment allocation
//! - `aging` - Receivable/payable aging buckets
//! - `reports` - Trial balance, P&L, balance sheet, cash flow
//! - `reconciliation` - Bank statement reconciliation rules

pub mod aging;
pub mod balance;
pub mod coa;
pub mod fiscal;
pub mod journal;
pub mod reconciliation;
pub mod reports;
pub mod subledger;
