use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::event::Event;

/// Envelope for a journal event, carrying log position metadata.
///
/// This is the unit a journal writer persists.
///
/// Notes:
/// - **Append-only**: `sequence_number` increases monotonically per journal.
/// - `event_type` and `version` are copied from the payload so a reader can
///   dispatch without decoding it first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEnvelope<E> {
    event_id: Uuid,
    event_type: String,
    version: u32,

    /// Monotonically increasing position in the journal.
    sequence_number: u64,

    payload: E,
}

impl<E: Event> JournalEnvelope<E> {
    pub fn wrap(sequence_number: u64, payload: E) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            event_type: payload.event_type().to_string(),
            version: payload.version(),
            sequence_number,
            payload,
        }
    }
}

impl<E> JournalEnvelope<E> {
    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }

    pub fn into_payload(self) -> E {
        self.payload
    }
}
