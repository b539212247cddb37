use std::io::Write;

use thiserror::Error;

use splitbook_core::{LedgerError, TransactionId};

use crate::envelope::JournalEnvelope;
use crate::record::JournalRecord;

#[derive(Debug, Error)]
pub enum JournalError {
    #[error("journal is not open")]
    NotOpen,

    #[error("failed to encode journal record: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("journal io: {0}")]
    Io(#[from] std::io::Error),
}

impl From<JournalError> for LedgerError {
    fn from(value: JournalError) -> Self {
        LedgerError::journal(value.to_string())
    }
}

/// Crash-recovery log for in-progress edits.
pub trait Journal {
    /// Prepare the journal for writing. Calling it again is a no-op.
    fn open(&mut self) -> Result<(), JournalError>;

    /// Append one record.
    fn write(&mut self, record: &JournalRecord) -> Result<(), JournalError>;
}

impl<J: Journal + ?Sized> Journal for Box<J> {
    fn open(&mut self) -> Result<(), JournalError> {
        (**self).open()
    }

    fn write(&mut self, record: &JournalRecord) -> Result<(), JournalError> {
        (**self).write(record)
    }
}

/// In-memory journal for tests/dev.
///
/// Records written before `open()` are kept as well; only the file-backed
/// journal insists on being opened.
#[derive(Debug, Default)]
pub struct InMemoryJournal {
    opened: bool,
    entries: Vec<JournalEnvelope<JournalRecord>>,
}

impl InMemoryJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.opened
    }

    pub fn entries(&self) -> &[JournalEnvelope<JournalRecord>] {
        &self.entries
    }

    /// Records for one transaction, oldest first.
    pub fn entries_for(&self, transaction_id: TransactionId) -> Vec<&JournalRecord> {
        self.entries
            .iter()
            .map(JournalEnvelope::payload)
            .filter(|r| r.transaction_id() == transaction_id)
            .collect()
    }
}

impl Journal for InMemoryJournal {
    fn open(&mut self) -> Result<(), JournalError> {
        self.opened = true;
        Ok(())
    }

    fn write(&mut self, record: &JournalRecord) -> Result<(), JournalError> {
        let seq = self.entries.len() as u64 + 1;
        self.entries.push(JournalEnvelope::wrap(seq, record.clone()));
        Ok(())
    }
}

/// Journal writing one JSON envelope per line to any `Write` sink.
#[derive(Debug)]
pub struct JsonLinesJournal<W: Write> {
    sink: W,
    opened: bool,
    last_sequence: u64,
}

impl<W: Write> JsonLinesJournal<W> {
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            opened: false,
            last_sequence: 0,
        }
    }

    pub fn last_sequence(&self) -> u64 {
        self.last_sequence
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}

impl<W: Write> Journal for JsonLinesJournal<W> {
    fn open(&mut self) -> Result<(), JournalError> {
        if !self.opened {
            tracing::debug!("journal opened");
            self.opened = true;
        }
        Ok(())
    }

    fn write(&mut self, record: &JournalRecord) -> Result<(), JournalError> {
        if !self.opened {
            return Err(JournalError::NotOpen);
        }

        let envelope = JournalEnvelope::wrap(self.last_sequence + 1, record.clone());
        serde_json::to_writer(&mut self.sink, &envelope)?;
        self.sink.write_all(b"\n")?;
        self.sink.flush()?;
        self.last_sequence = envelope.sequence_number();

        tracing::debug!(
            transaction = %record.transaction_id(),
            kind = %record.kind.tag(),
            seq = self.last_sequence,
            "journal record written"
        );
        Ok(())
    }
}
