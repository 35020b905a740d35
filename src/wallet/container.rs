// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Serialized wallet container.
//!
//! ```text
//! { "type": "derived" | "vault", "version": <u32>, "address": "0x…", "meta": { … } }
//! ```
//!
//! The tag and version are checked against a closed set before the `meta`
//! payload is looked at. Containers are never mutated in place: a format
//! upgrade produces a new container.

use std::str::FromStr;

use alloy::primitives::Address;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::{Result, WalletError};

/// Tag of the derived-key wallet backend.
pub const DERIVED_TAG: &str = "derived";

/// Tag of the managed vault backend.
pub const VAULT_TAG: &str = "vault";

/// Which backend a container belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WalletKind {
    Derived,
    Vault,
}

impl WalletKind {
    pub fn tag(&self) -> &'static str {
        match self {
            WalletKind::Derived => DERIVED_TAG,
            WalletKind::Vault => VAULT_TAG,
        }
    }

    pub fn from_tag(tag: &str) -> Result<Self> {
        match tag {
            DERIVED_TAG => Ok(WalletKind::Derived),
            VAULT_TAG => Ok(WalletKind::Vault),
            other => Err(WalletError::Format(format!("unknown wallet type `{other}`"))),
        }
    }
}

/// Versions of the derived-key container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DerivedVersion {
    V1 = 1,
}

impl DerivedVersion {
    pub const CURRENT: DerivedVersion = DerivedVersion::V1;
}

/// Versions of the vault container, oldest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum VaultVersion {
    /// PBKDF2-protected single-account vault
    V1 = 1,
    /// Argon2id-protected vault with HD path and account count
    V2 = 2,
}

impl VaultVersion {
    pub const CURRENT: VaultVersion = VaultVersion::V2;

    /// The next version in the upgrade chain, `None` once current.
    pub fn next(self) -> Option<VaultVersion> {
        match self {
            VaultVersion::V1 => Some(VaultVersion::V2),
            VaultVersion::V2 => None,
        }
    }
}

/// A validated `(tag, version)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerFormat {
    Derived(DerivedVersion),
    Vault(VaultVersion),
}

impl ContainerFormat {
    pub fn kind(&self) -> WalletKind {
        match self {
            ContainerFormat::Derived(_) => WalletKind::Derived,
            ContainerFormat::Vault(_) => WalletKind::Vault,
        }
    }

    pub fn version_number(&self) -> u32 {
        match self {
            ContainerFormat::Derived(v) => *v as u32,
            ContainerFormat::Vault(v) => *v as u32,
        }
    }
}

/// Serialized wallet, as produced by `create`/`recover_*` and consumed by `load_from`.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletData {
    #[serde(rename = "type")]
    pub kind: String,
    pub version: u32,
    pub address: String,
    pub meta: serde_json::Value,
}

impl WalletData {
    pub(crate) fn new(format: ContainerFormat, address: Address, meta: impl Serialize) -> Result<Self> {
        Ok(Self {
            kind: format.kind().tag().to_string(),
            version: format.version_number(),
            address: address.to_checksum(None),
            meta: serde_json::to_value(meta)
                .map_err(|e| WalletError::Generation(format!("failed to encode container: {e}")))?,
        })
    }

    /// Parse a container from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to compact JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Validate the tag and version without touching `meta`.
    pub fn format(&self) -> Result<ContainerFormat> {
        match WalletKind::from_tag(&self.kind)? {
            WalletKind::Derived => match self.version {
                1 => Ok(ContainerFormat::Derived(DerivedVersion::V1)),
                other => Err(unsupported(DERIVED_TAG, other)),
            },
            WalletKind::Vault => match self.version {
                1 => Ok(ContainerFormat::Vault(VaultVersion::V1)),
                2 => Ok(ContainerFormat::Vault(VaultVersion::V2)),
                other => Err(unsupported(VAULT_TAG, other)),
            },
        }
    }

    /// The recorded address.
    pub fn address(&self) -> Result<Address> {
        Address::from_str(&self.address)
            .map_err(|e| WalletError::Integrity(format!("invalid container address: {e}")))
    }

    /// Decode the backend payload.
    pub(crate) fn meta<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.meta.clone())
            .map_err(|e| WalletError::Integrity(format!("malformed {} payload: {e}", self.kind)))
    }

    /// Fail unless `derived` matches the recorded address.
    pub(crate) fn ensure_address(&self, derived: Address) -> Result<()> {
        if self.address()? != derived {
            return Err(WalletError::Integrity(
                "container address does not match its key".to_string(),
            ));
        }
        Ok(())
    }
}

// Manual Debug so key material in `meta` never reaches logs.
impl std::fmt::Debug for WalletData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletData")
            .field("kind", &self.kind)
            .field("version", &self.version)
            .field("address", &self.address)
            .field("meta", &"[REDACTED]")
            .finish()
    }
}

fn unsupported(tag: &str, version: u32) -> WalletError {
    WalletError::Format(format!("unsupported {tag} container version {version}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn container(kind: &str, version: u32) -> WalletData {
        WalletData {
            kind: kind.to_string(),
            version,
            address: "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".to_string(),
            meta: json!({ "privateKey": "0xdeadbeef" }),
        }
    }

    #[test]
    fn accepted_formats() {
        assert_eq!(
            container("derived", 1).format().unwrap(),
            ContainerFormat::Derived(DerivedVersion::V1)
        );
        assert_eq!(
            container("vault", 1).format().unwrap(),
            ContainerFormat::Vault(VaultVersion::V1)
        );
        assert_eq!(
            container("vault", 2).format().unwrap(),
            ContainerFormat::Vault(VaultVersion::V2)
        );
    }

    #[test]
    fn unknown_tag_or_version_is_a_format_error() {
        assert!(matches!(container("ledger", 1).format(), Err(WalletError::Format(_))));
        assert!(matches!(container("derived", 2).format(), Err(WalletError::Format(_))));
        assert!(matches!(container("vault", 0).format(), Err(WalletError::Format(_))));
        assert!(matches!(container("vault", 3).format(), Err(WalletError::Format(_))));
    }

    #[test]
    fn json_uses_type_key() {
        let json = container("derived", 1).to_json().unwrap();
        assert!(json.contains(r#""type":"derived""#));
        let back = WalletData::from_json(&json).unwrap();
        assert_eq!(back, container("derived", 1));
    }

    #[test]
    fn unparseable_json_is_an_integrity_error() {
        assert!(matches!(WalletData::from_json("{\"type\":"), Err(WalletError::Integrity(_))));
    }

    #[test]
    fn debug_redacts_meta() {
        let debug = format!("{:?}", container("derived", 1));
        assert!(!debug.contains("deadbeef"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn upgrade_chain_ends_at_current() {
        let mut version = VaultVersion::V1;
        while let Some(next) = version.next() {
            assert!(next > version);
            version = next;
        }
        assert_eq!(version, VaultVersion::CURRENT);
    }
}
