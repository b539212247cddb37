//! Journal collaborator: an append-only log of edit-session events.
//!
//! The engine writes one record when an edit session begins, one when it
//! commits and one when a transaction is destroyed. Replaying the log is
//! out of scope here; this crate only defines the records and writers.

pub mod envelope;
pub mod event;
pub mod journal;
pub mod record;

pub use envelope::JournalEnvelope;
pub use event::Event;
pub use journal::{InMemoryJournal, Journal, JournalError, JsonLinesJournal};
pub use record::{JournalEventKind, JournalRecord, SplitSnapshot, TransactionSnapshot};
