//! Engine error model.

use thiserror::Error;

use crate::commodity::CommodityId;
use crate::id::{AccountId, SplitId, TransactionId};

/// Result type used across the engine.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Engine-level error.
///
/// Two classes live here. Fatal variants ([`LedgerError::is_fatal`]) mean the
/// ledger graph is corrupted and the caller should abandon its batch.
/// The rest are ordinary, recoverable failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A ledger invariant was violated.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// The splits of a transaction share no currency or security.
    #[error(
        "no common commodity: account {base_account} ({base_currency}/{base_security}) \
         vs account {account} ({currency}/{security})"
    )]
    NoCommonCommodity {
        base_account: AccountId,
        base_currency: CommodityId,
        base_security: String,
        account: AccountId,
        currency: CommodityId,
        security: String,
    },

    /// A split without an account was found while double entry is enforced.
    #[error("split {0} has no account while double entry is enforced")]
    OrphanSplit(SplitId),

    /// An operation needed the split's parent transaction, but it has none.
    #[error("split {0} does not belong to a transaction")]
    DetachedSplit(SplitId),

    /// A mutation was attempted outside of an edit session.
    #[error("transaction {0} is not open for editing")]
    NotOpen(TransactionId),

    /// A referenced entity does not exist (or has been destroyed).
    #[error("not found: {0}")]
    NotFound(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// The journal collaborator failed.
    #[error("journal: {0}")]
    Journal(String),
}

impl LedgerError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn journal(msg: impl Into<String>) -> Self {
        Self::Journal(msg.into())
    }

    /// True for errors that indicate corrupted ledger state rather than a
    /// caller mistake.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::InvariantViolation(_)
                | Self::NoCommonCommodity { .. }
                | Self::OrphanSplit(_)
                | Self::DetachedSplit(_)
        )
    }
}
