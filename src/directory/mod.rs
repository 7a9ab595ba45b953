//! Deposit-address directory — wire payloads and the per-user cache.
//!
//! The platform backend assigns each user one deposit address per network.
//! Responses arrive in several historical shapes; everything is normalized to
//! a plain address string at this boundary.

pub mod client;

pub use client::AddressDirectory;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::network::{NATIVE_ASSET, NETWORK_NAME};

// ─── Wire ────────────────────────────────────────────────────────────────────

/// Raw deposit-address response.
///
/// The endpoint has answered, over time, with a bare JSON string and with an
/// object under one of several keys. All shapes decode here.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AddressPayload {
    Bare(String),
    Wrapped(WrappedAddress),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WrappedAddress {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub metamask_address: Option<String>,
    #[serde(default)]
    pub wallet_address: Option<String>,
}

impl AddressPayload {
    /// Collapse any known shape to a trimmed address string.
    ///
    /// Unknown shapes and absent keys normalize to `""`, which callers treat
    /// as "not yet provisioned" rather than an error.
    pub fn normalize(&self) -> String {
        let raw = match self {
            AddressPayload::Bare(s) => Some(s.as_str()),
            AddressPayload::Wrapped(w) => [&w.address, &w.metamask_address, &w.wallet_address]
                .into_iter()
                .flatten()
                .map(String::as_str)
                .find(|s| !s.trim().is_empty()),
        };
        raw.map(str::trim).unwrap_or_default().to_string()
    }
}

// ─── Domain ──────────────────────────────────────────────────────────────────

/// Where a resolved address came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressSource {
    Cache,
    Fetch,
}

/// A user's deposit address for the native asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositAddress {
    pub asset: &'static str,
    pub network: &'static str,
    /// Empty when the backend has not provisioned one yet.
    pub address: String,
    pub resolved_at: DateTime<Utc>,
    pub source: AddressSource,
}

impl DepositAddress {
    pub(crate) fn fetched(address: String) -> Self {
        Self {
            asset: NATIVE_ASSET,
            network: NETWORK_NAME,
            address,
            resolved_at: Utc::now(),
            source: AddressSource::Fetch,
        }
    }

    /// Placeholder for a user the backend has not provisioned yet.
    pub(crate) fn unresolved() -> Self {
        Self::fetched(String::new())
    }

    pub fn is_resolved(&self) -> bool {
        !self.address.is_empty()
    }
}
