use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use splitbook_core::{AccountId, ReconcileState, SplitId, TransactionId};

use crate::event::Event;

/// Which edit-session transition a record describes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalEventKind {
    Begin,
    Commit,
    Destroy,
}

impl JournalEventKind {
    /// Single-letter tag used in compact log listings.
    pub fn tag(self) -> char {
        match self {
            JournalEventKind::Begin => 'B',
            JournalEventKind::Commit => 'C',
            JournalEventKind::Destroy => 'D',
        }
    }
}

/// Point-in-time copy of one split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitSnapshot {
    pub split_id: SplitId,
    pub account_id: Option<AccountId>,
    pub memo: String,
    pub action: String,
    pub docref: String,
    pub reconcile: ReconcileState,
    pub share_amount: f64,
    pub share_price: f64,
}

/// Point-in-time copy of a transaction and its splits, in split order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionSnapshot {
    pub transaction_id: TransactionId,
    pub num: String,
    pub description: String,
    pub docref: String,
    pub date_posted: DateTime<Utc>,
    pub date_entered: DateTime<Utc>,
    pub splits: Vec<SplitSnapshot>,
}

/// One journal entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalRecord {
    pub kind: JournalEventKind,
    pub transaction: TransactionSnapshot,
    pub written_at: DateTime<Utc>,
}

impl JournalRecord {
    pub fn new(kind: JournalEventKind, transaction: TransactionSnapshot) -> Self {
        Self {
            kind,
            transaction,
            written_at: Utc::now(),
        }
    }

    pub fn transaction_id(&self) -> TransactionId {
        self.transaction.transaction_id
    }
}

impl Event for JournalRecord {
    fn event_type(&self) -> &'static str {
        match self.kind {
            JournalEventKind::Begin => "ledger.transaction.begin",
            JournalEventKind::Commit => "ledger.transaction.commit",
            JournalEventKind::Destroy => "ledger.transaction.destroy",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn written_at(&self) -> DateTime<Utc> {
        self.written_at
    }

    fn subject(&self) -> TransactionId {
        self.transaction_id()
    }
}
