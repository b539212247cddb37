//! Reconciliation state of a split.

use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// Whether a split has been matched against an external statement.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReconcileState {
    #[default]
    Unreconciled,
    Cleared,
    Reconciled,
}

impl ReconcileState {
    /// Flag character used by registers and the journal.
    pub fn as_char(self) -> char {
        match self {
            ReconcileState::Unreconciled => 'n',
            ReconcileState::Cleared => 'c',
            ReconcileState::Reconciled => 'y',
        }
    }

    pub fn from_char(flag: char) -> Result<Self, LedgerError> {
        match flag {
            'n' => Ok(ReconcileState::Unreconciled),
            'c' => Ok(ReconcileState::Cleared),
            'y' => Ok(ReconcileState::Reconciled),
            other => Err(LedgerError::validation(format!(
                "unknown reconcile flag {other:?}"
            ))),
        }
    }

    /// Counts toward the cleared balance (cleared or reconciled).
    pub fn is_cleared(self) -> bool {
        !matches!(self, ReconcileState::Unreconciled)
    }
}
