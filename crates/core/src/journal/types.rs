//! Journal entry domain types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tessera_shared::types::{
    AccountId, Currency, DocumentId, FiscalPeriodId, JournalEntryId, JournalLineId, OrganizationId,
};

use super::error::JournalError;

/// Journal entry type classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalType {
    /// Entered by a user through the journal form.
    Manual,
    /// Generated by the engine (subledger posting, period close).
    System,
    /// Instance of a recurring template.
    Recurring,
    /// Period-end adjustment.
    Adjustment,
}

/// Journal entry status.
///
/// Draft -> Posted -> Reversed, or Draft -> Cancelled.
/// Reversed and Cancelled are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalStatus {
    /// Entry is being drafted; no balance effect yet.
    Draft,
    /// Entry has been posted to the ledger (immutable).
    Posted,
    /// Entry has been reversed by a counter-entry (terminal).
    Reversed,
    /// Entry was discarded before posting (terminal).
    Cancelled,
}

impl JournalStatus {
    /// Returns true if this is a terminal status.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Reversed | Self::Cancelled)
    }

    /// Validates a status transition.
    ///
    /// # Errors
    ///
    /// Returns `JournalError::InvalidStateTransition` for any transition
    /// outside the state machine.
    pub fn validate_transition(self, to: Self) -> Result<(), JournalError> {
        match (self, to) {
            (Self::Draft, Self::Posted | Self::Cancelled) | (Self::Posted, Self::Reversed) => {
                Ok(())
            }
            (from, to) => Err(JournalError::InvalidStateTransition { from, to }),
        }
    }
}

/// Module that generated a system journal entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceModule {
    /// Accounts receivable subledger.
    AccountsReceivable,
    /// Accounts payable subledger.
    AccountsPayable,
    /// Bank module.
    Bank,
}

/// Back-reference from a system-generated entry to its source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    /// The module that generated the entry.
    pub module: SourceModule,
    /// The source document.
    pub document_id: DocumentId,
}

/// Optional analysis tags on a journal line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineTags {
    /// Cost center code.
    pub cost_center: Option<String>,
    /// Department code.
    pub department: Option<String>,
    /// Project code.
    pub project: Option<String>,
}

/// Input for a single journal line.
#[derive(Debug, Clone)]
pub struct JournalLineInput {
    /// The account to post to (must be a non-group, active account).
    pub account_id: AccountId,
    /// Debit amount (exactly one of debit/credit is nonzero).
    pub debit: Decimal,
    /// Credit amount (exactly one of debit/credit is nonzero).
    pub credit: Decimal,
    /// Optional line description.
    pub description: Option<String>,
    /// Optional analysis tags.
    pub tags: LineTags,
}

impl JournalLineInput {
    /// Convenience constructor for a debit line.
    #[must_use]
    pub fn debit(account_id: AccountId, amount: Decimal) -> Self {
        Self {
            account_id,
            debit: amount,
            credit: Decimal::ZERO,
            description: None,
            tags: LineTags::default(),
        }
    }

    /// Convenience constructor for a credit line.
    #[must_use]
    pub fn credit(account_id: AccountId, amount: Decimal) -> Self {
        Self {
            account_id,
            debit: Decimal::ZERO,
            credit: amount,
            description: None,
            tags: LineTags::default(),
        }
    }
}

/// Input for creating a new journal entry.
#[derive(Debug, Clone)]
pub struct CreateJournalInput {
    /// The organization this entry belongs to.
    pub organization_id: OrganizationId,
    /// The entry type.
    pub journal_type: JournalType,
    /// The entry date (determines the fiscal period).
    pub entry_date: NaiveDate,
    /// A description of the entry.
    pub description: String,
    /// Entry currency; every line posts in this currency.
    pub currency: Currency,
    /// Back-reference for system-generated entries.
    pub source: Option<SourceRef>,
    /// The journal lines (must have at least 2).
    pub lines: Vec<JournalLineInput>,
}

/// A single line of a journal entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalLine {
    /// Unique identifier.
    pub id: JournalLineId,
    /// The journal entry this line belongs to.
    pub journal_id: JournalEntryId,
    /// Position within the entry (1-based).
    pub line_number: i32,
    /// The account affected.
    pub account_id: AccountId,
    /// Debit amount (zero if this is a credit line).
    pub debit: Decimal,
    /// Credit amount (zero if this is a debit line).
    pub credit: Decimal,
    /// Line currency.
    pub currency: Currency,
    /// Optional line description.
    pub description: Option<String>,
    /// Optional analysis tags.
    pub tags: LineTags,
}

/// A journal entry with its lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Unique identifier.
    pub id: JournalEntryId,
    /// Organization this entry belongs to.
    pub organization_id: OrganizationId,
    /// Sequential journal number, unique per organization (e.g., "JE-000042").
    pub journal_number: String,
    /// The entry type.
    pub journal_type: JournalType,
    /// The entry date.
    pub entry_date: NaiveDate,
    /// The fiscal period the entry is dated into.
    pub period_id: FiscalPeriodId,
    /// Description.
    pub description: String,
    /// Entry currency.
    pub currency: Currency,
    /// Back-reference for system-generated entries.
    pub source: Option<SourceRef>,
    /// Current status.
    pub status: JournalStatus,
    /// Sum of line debits.
    pub total_debit: Decimal,
    /// Sum of line credits.
    pub total_credit: Decimal,
    /// Set on the reversal entry: the entry it reverses.
    pub reversal_of: Option<JournalEntryId>,
    /// Set on a reversed entry: the entry that reversed it.
    pub reversed_by: Option<JournalEntryId>,
    /// When the entry was created.
    pub created_at: DateTime<Utc>,
    /// When the entry was last updated.
    pub updated_at: DateTime<Utc>,
    /// The journal lines.
    pub lines: Vec<JournalLine>,
}

/// Entry totals for validation and display.
#[derive(Debug, Clone)]
pub struct EntryTotals {
    /// Total debit amount.
    pub total_debit: Decimal,
    /// Total credit amount.
    pub total_credit: Decimal,
    /// Whether the entry is balanced (debits == credits, exactly).
    pub is_balanced: bool,
}

impl EntryTotals {
    /// Creates entry totals from debit and credit sums.
    #[must_use]
    pub fn new(total_debit: Decimal, total_credit: Decimal) -> Self {
        Self {
            total_debit,
            total_credit,
            is_balanced: total_debit == total_credit,
        }
    }

    /// Returns the difference between debits and credits.
    #[must_use]
    pub fn difference(&self) -> Decimal {
        self.total_debit - self.total_credit
    }
}

/// Formats a sequential journal number, e.g. `JE-000042`.
#[must_use]
pub fn format_journal_number(prefix: &str, sequence: i64) -> String {
    format!("{prefix}-{sequence:06}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_status_transitions() {
        assert!(JournalStatus::Draft.validate_transition(JournalStatus::Posted).is_ok());
        assert!(JournalStatus::Draft.validate_transition(JournalStatus::Cancelled).is_ok());
        assert!(JournalStatus::Posted.validate_transition(JournalStatus::Reversed).is_ok());
    }

    #[test]
    fn test_illegal_status_transitions() {
        assert!(JournalStatus::Posted.validate_transition(JournalStatus::Draft).is_err());
        assert!(JournalStatus::Posted.validate_transition(JournalStatus::Cancelled).is_err());
        assert!(JournalStatus::Draft.validate_transition(JournalStatus::Reversed).is_err());
        assert!(JournalStatus::Reversed.validate_transition(JournalStatus::Posted).is_err());
        assert!(JournalStatus::Cancelled.validate_transition(JournalStatus::Posted).is_err());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!JournalStatus::Draft.is_terminal());
        assert!(!JournalStatus::Posted.is_terminal());
        assert!(JournalStatus::Reversed.is_terminal());
        assert!(JournalStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_entry_totals_balanced() {
        let totals = EntryTotals::new(dec!(100.00), dec!(100.00));
        assert!(totals.is_balanced);
        assert_eq!(totals.difference(), Decimal::ZERO);
    }

    #[test]
    fn test_entry_totals_unbalanced() {
        let totals = EntryTotals::new(dec!(100.00), dec!(99.99));
        assert!(!totals.is_balanced);
        assert_eq!(totals.difference(), dec!(0.01));
    }

    #[test]
    fn test_format_journal_number() {
        assert_eq!(format_journal_number("JE", 1), "JE-000001");
        assert_eq!(format_journal_number("JE", 42), "JE-000042");
        assert_eq!(format_journal_number("JE", 1_000_000), "JE-1000000");
    }

    #[test]
    fn test_line_constructors() {
        let account = AccountId::new();
        let line = JournalLineInput::debit(account, dec!(50));
        assert_eq!(line.debit, dec!(50));
        assert_eq!(line.credit, Decimal::ZERO);

        let line = JournalLineInput::credit(account, dec!(50));
        assert_eq!(line.debit, Decimal::ZERO);
        assert_eq!(line.credit, dec!(50));
    }
}
