//! Double-entry journal logic.
//!
//! This module implements the journal entry state machine and validation:
//! - Entry and line domain types
//! - Draft -> Posted -> Reversed / Draft -> Cancelled transitions
//! - Line-shape and balance validation
//! - Reversal entry construction

pub mod error;
pub mod reversal;
pub mod types;
pub mod validation;

pub use error::JournalError;
pub use reversal::build_reversal;
pub use types::{
    CreateJournalInput, EntryTotals, JournalEntry, JournalLine, JournalLineInput, JournalStatus,
    JournalType, LineTags, SourceModule, SourceRef, format_journal_number,
};
pub use validation::{JournalService, LineAccountInfo};
