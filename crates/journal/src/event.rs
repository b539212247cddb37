use chrono::{DateTime, Utc};

use splitbook_core::TransactionId;

/// A record the journal can persist.
///
/// Each record names its own type and schema version, so a reader can
/// route an envelope without decoding the payload.
pub trait Event: Clone + core::fmt::Debug {
    /// Dotted type name, e.g. `ledger.transaction.commit`.
    fn event_type(&self) -> &'static str;

    /// Schema version of the payload.
    fn version(&self) -> u32;

    /// Wall-clock time the record was produced.
    fn written_at(&self) -> DateTime<Utc>;

    /// Transaction the record describes.
    fn subject(&self) -> TransactionId;
}
