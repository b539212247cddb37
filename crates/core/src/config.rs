//! Engine configuration.
//!
//! The enforcement mode is carried by the ledger and consulted by every
//! balancing operation; there is no process-wide switch.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// Environment variable read by [`EngineConfig::from_env`].
pub const DOUBLE_ENTRY_ENV: &str = "SPLITBOOK_DOUBLE_ENTRY";

/// How strictly a transaction's splits must net to zero.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnforcementMode {
    /// Unbalanced transactions and splits without an account are tolerated.
    #[default]
    Tolerant,
    /// Transactions are forced to balance, synthesizing a split if needed.
    ForceBalance,
    /// Like `ForceBalance`, with orphan splits meant to be moved into a
    /// reserved account. The redirect is not implemented.
    LostAndFound,
}

impl EnforcementMode {
    /// Whether double entry is enforced at all.
    pub fn is_enforced(self) -> bool {
        !matches!(self, EnforcementMode::Tolerant)
    }

    pub fn as_u8(self) -> u8 {
        match self {
            EnforcementMode::Tolerant => 0,
            EnforcementMode::ForceBalance => 1,
            EnforcementMode::LostAndFound => 2,
        }
    }
}

impl TryFrom<u8> for EnforcementMode {
    type Error = LedgerError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(EnforcementMode::Tolerant),
            1 => Ok(EnforcementMode::ForceBalance),
            2 => Ok(EnforcementMode::LostAndFound),
            other => Err(LedgerError::validation(format!(
                "unknown enforcement mode {other}"
            ))),
        }
    }
}

impl FromStr for EnforcementMode {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "0" | "tolerant" => Ok(EnforcementMode::Tolerant),
            "1" | "force" | "force-balance" => Ok(EnforcementMode::ForceBalance),
            "2" | "lost-and-found" => Ok(EnforcementMode::LostAndFound),
            other => Err(LedgerError::validation(format!(
                "unknown enforcement mode '{other}'"
            ))),
        }
    }
}

/// Configuration threaded through every engine operation.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub enforcement: EnforcementMode,
}

impl EngineConfig {
    pub fn new(enforcement: EnforcementMode) -> Self {
        Self { enforcement }
    }

    /// Read the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// Unset keys keep their default; unparsable values are logged and
    /// ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let enforcement = match lookup(DOUBLE_ENTRY_ENV) {
            None => EnforcementMode::default(),
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                tracing::warn!("{DOUBLE_ENTRY_ENV}={raw:?} ignored: {e}");
                EnforcementMode::default()
            }),
        };

        if enforcement == EnforcementMode::LostAndFound {
            tracing::warn!("lost-and-found redirect is not implemented; balancing as force-balance");
        }

        Self { enforcement }
    }

    pub fn enforced(&self) -> bool {
        self.enforcement.is_enforced()
    }
}
