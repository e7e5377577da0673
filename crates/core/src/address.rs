//! Ethereum-style address value objects.
//!
//! Format validation only (`0x` + 40 hex characters). Checksum verification
//! is the concern of the wallet tooling that produced the address; both
//! lowercase and mixed-case forms are accepted as-is.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// A wallet address (20-byte hex, `0x`-prefixed).
///
/// Casing is preserved so responses echo exactly what the caller
/// supplied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Parse and validate an address string.
    pub fn parse(s: &str) -> DomainResult<Self> {
        let hex = s
            .strip_prefix("0x")
            .ok_or_else(|| DomainError::validation("address must be 0x-prefixed"))?;
        if hex.len() != 40 {
            return Err(DomainError::validation(
                "address must encode exactly 20 bytes",
            ));
        }
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(DomainError::validation("address must be hex"));
        }
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Address {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Address {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// An NFT contract address.
///
/// Same wire format as [`Address`]; a separate type so contract and wallet
/// addresses cannot be swapped at call sites. Room for contract-specific
/// checks (e.g. an allowlist) without touching wallet validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContractAddress(Address);

impl ContractAddress {
    /// Parse and validate a contract address string.
    pub fn parse(s: &str) -> DomainResult<Self> {
        Address::parse(s).map(Self)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl core::fmt::Display for ContractAddress {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for ContractAddress {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
