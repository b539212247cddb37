//! Opaque currency / security identifier.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// A currency or security, compared by identity only.
///
/// The engine never converts between commodities; it only asks whether two
/// identifiers are the same.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommodityId(String);

impl CommodityId {
    pub fn new(code: impl Into<String>) -> Result<Self, LedgerError> {
        let code = code.into();
        if code.trim().is_empty() {
            return Err(LedgerError::validation("commodity code cannot be empty"));
        }
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for CommodityId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CommodityId {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for CommodityId {
    type Error = LedgerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CommodityId> for String {
    fn from(value: CommodityId) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_codes_are_rejected() {
        assert!(CommodityId::new("").is_err());
        assert!(CommodityId::new("   ").is_err());
        assert_eq!(CommodityId::new("USD").unwrap().as_str(), "USD");
    }

    #[test]
    fn serde_is_transparent_and_validating() {
        let usd: CommodityId = "USD".parse().unwrap();
        assert_eq!(serde_json::to_string(&usd).unwrap(), "\"USD\"");
        assert!(serde_json::from_str::<CommodityId>("\"\"").is_err());
    }
}
