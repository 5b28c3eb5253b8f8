//! Reversal entry construction.
//!
//! Reversing a posted entry creates a new entry with every line's debit
//! and credit swapped, dated into the current open period.

use chrono::NaiveDate;

use super::types::{CreateJournalInput, JournalEntry, JournalLineInput, JournalType};

/// Builds the reversing entry input for a posted journal entry.
///
/// For each original line the debit and credit amounts are swapped; the
/// account, currency, and tags are preserved. The reversal is typed
/// `System` and dated at `reversal_date` (which must fall in an open
/// period; the caller enforces that when posting).
#[must_use]
pub fn build_reversal(original: &JournalEntry, reversal_date: NaiveDate) -> CreateJournalInput {
    let lines = original
        .lines
        .iter()
        .map(|line| JournalLineInput {
            account_id: line.account_id,
            debit: line.credit,
            credit: line.debit,
            description: line.description.clone(),
            tags: line.tags.clone(),
        })
        .collect();

    CreateJournalInput {
        organization_id: original.organization_id,
        journal_type: JournalType::System,
        entry_date: reversal_date,
        description: format!("Reversal of {}", original.journal_number),
        currency: original.currency,
        source: original.source,
        lines,
    }
}
