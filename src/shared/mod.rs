//! Shared newtypes and utilities used across all service modules.
//!
//! These types are serialization-transparent: they serialize/deserialize identically
//! to the raw format providers and the backend send, so they can be used directly in
//! wire types without conversion overhead.

pub mod fmt;
pub mod serde_util;
pub mod units;

pub use fmt::{abbreviate_address, format_native_balance};
pub use units::{encode_quantity, eth_to_wei, parse_quantity, wei_to_eth, UnitError};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

// ─── AccountAddress ──────────────────────────────────────────────────────────

/// A wallet account address stored as a 0x-prefixed hex string.
///
/// Serializes transparently as a JSON string. Equality is byte-exact; use
/// [`AccountAddress::matches`] when comparing addresses from different
/// sources, since checksum casing varies between providers and storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccountAddress(String);

impl AccountAddress {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Case-insensitive address comparison.
    pub fn matches(&self, other: &AccountAddress) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl std::fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AccountAddress {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for AccountAddress {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl FromStr for AccountAddress {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(AccountAddress(s.to_string()))
    }
}

impl Serialize for AccountAddress {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for AccountAddress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(AccountAddress(s))
    }
}

// ─── TxHash ──────────────────────────────────────────────────────────────────

/// A transaction hash returned by the wallet, stored as the raw string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TxHash(String);

impl TxHash {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TxHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TxHash {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TxHash {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Serialize for TxHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TxHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(TxHash(s))
    }
}
