// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Derived-key wallet backend.
//!
//! A single secp256k1 keypair, either derived from a BIP-39 phrase at
//! `m/44'/60'/0'/0/0` or imported from a raw private key. Signing uses the
//! personal-message scheme; order digests go through [`DerivedAccount::sign_hash`]
//! so they are prefixed exactly once.

use alloy::primitives::{Address, B256};
use alloy::signers::local::{coins_bip39::English, MnemonicBuilder, PrivateKeySigner};
use alloy::signers::SignerSync;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use super::container::{ContainerFormat, DerivedVersion, WalletData};
use super::crypto;
use super::signature::SignatureParts;
use crate::error::{Result, WalletError};

/// Entropy drawn for a fresh 12-word phrase.
const ENTROPY_LEN: usize = 16;

#[derive(Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
struct DerivedMeta {
    private_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mnemonic: Option<String>,
}

/// A loaded derived-key account.
#[derive(Clone)]
pub struct DerivedAccount {
    signer: PrivateKeySigner,
    mnemonic: Option<Zeroizing<String>>,
}

impl DerivedAccount {
    /// Generate a new account from fresh entropy.
    pub fn generate() -> Result<Self> {
        let phrase = random_phrase()?;
        Self::from_phrase(&phrase)
    }

    /// Derive the account at index 0 of `phrase`.
    pub fn from_phrase(phrase: &str) -> Result<Self> {
        let phrase = normalize_phrase(phrase);
        let signer = signer_at(&phrase, "m/44'/60'/0'/0/0")?;
        Ok(Self {
            signer,
            mnemonic: Some(phrase),
        })
    }

    /// Import a raw private key (hex, `0x` optional). No phrase is kept.
    pub fn from_private_key(private_key: &str) -> Result<Self> {
        let signer = signer_from_hex(private_key)
            .map_err(|e| WalletError::InvalidInput(format!("Invalid private key: {e}")))?;
        Ok(Self {
            signer,
            mnemonic: None,
        })
    }

    /// Rebuild an account from its container, checking the recorded address.
    pub fn from_container(data: &WalletData) -> Result<Self> {
        match data.format()? {
            ContainerFormat::Derived(DerivedVersion::V1) => {}
            other => {
                return Err(WalletError::Format(format!(
                    "expected a derived container, got {:?}",
                    other.kind()
                )))
            }
        }

        let meta: DerivedMeta = data.meta()?;
        let signer = signer_from_hex(&meta.private_key)
            .map_err(|e| WalletError::Integrity(format!("invalid stored private key: {e}")))?;
        data.ensure_address(signer.address())?;

        Ok(Self {
            signer,
            mnemonic: meta.mnemonic.clone().map(Zeroizing::new),
        })
    }

    /// Serialize into a `derived` v1 container.
    pub fn to_container(&self) -> Result<WalletData> {
        let meta = DerivedMeta {
            private_key: self.private_key_hex().to_string(),
            mnemonic: self.mnemonic.as_ref().map(|m| m.to_string()),
        };
        WalletData::new(
            ContainerFormat::Derived(DerivedVersion::CURRENT),
            self.address(),
            &meta,
        )
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub(crate) fn signer(&self) -> &PrivateKeySigner {
        &self.signer
    }

    pub fn private_key_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(alloy::hex::encode_prefixed(self.signer.to_bytes()))
    }

    /// The recovery phrase, absent for accounts imported from a private key.
    pub fn mnemonic(&self) -> Option<&str> {
        self.mnemonic.as_deref().map(String::as_str)
    }

    /// Personal-sign a 32-byte digest.
    pub fn sign_hash(&self, digest: &B256) -> Result<SignatureParts> {
        personal_sign(&self.signer, digest.as_slice())
    }

    /// Personal-sign arbitrary bytes.
    pub fn sign_message(&self, message: &[u8]) -> Result<SignatureParts> {
        personal_sign(&self.signer, message)
    }
}

impl std::fmt::Debug for DerivedAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedAccount")
            .field("address", &self.address())
            .field("has_mnemonic", &self.mnemonic.is_some())
            .finish()
    }
}

pub(crate) fn personal_sign(signer: &PrivateKeySigner, message: &[u8]) -> Result<SignatureParts> {
    signer
        .sign_message_sync(message)
        .map(SignatureParts::from)
        .map_err(|e| WalletError::Generation(format!("signing failed: {e}")))
}

/// Parse a 32-byte secp256k1 scalar from hex. Zero and values at or above
/// the curve order are rejected.
fn signer_from_hex(input: &str) -> std::result::Result<PrivateKeySigner, String> {
    let trimmed = input.trim();
    let hex = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    let bytes = Zeroizing::new(alloy::hex::decode(hex).map_err(|e| e.to_string())?);
    if bytes.len() != 32 {
        return Err(format!("expected 32 bytes, got {}", bytes.len()));
    }
    let secret = k256::SecretKey::from_slice(&bytes)
        .map_err(|_| "not a valid secp256k1 scalar".to_string())?;
    Ok(PrivateKeySigner::from_signing_key(secret.into()))
}

/// A fresh 12-word English phrase from OS entropy.
pub(crate) fn random_phrase() -> Result<Zeroizing<String>> {
    let entropy = Zeroizing::new(crypto::random_bytes::<ENTROPY_LEN>()?);
    let mnemonic = bip39::Mnemonic::from_entropy(entropy.as_slice())
        .map_err(|e| WalletError::Generation(format!("failed to build mnemonic: {e}")))?;
    Ok(Zeroizing::new(mnemonic.to_string()))
}

/// Lowercase and collapse whitespace so pasted phrases derive identically.
pub(crate) fn normalize_phrase(phrase: &str) -> Zeroizing<String> {
    Zeroizing::new(
        phrase
            .split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join(" "),
    )
}

/// Derive the signer at a full BIP-32 `path` from `phrase`.
pub(crate) fn signer_at(phrase: &str, path: &str) -> Result<PrivateKeySigner> {
    MnemonicBuilder::<English>::default()
        .phrase(phrase)
        .derivation_path(path)
        .map_err(|e| WalletError::InvalidInput(format!("Invalid derivation path {path}: {e}")))?
        .build()
        .map_err(|e| WalletError::InvalidInput(format!("Invalid recovery phrase: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashing::parse_digest;
    use std::str::FromStr;

    const HARDHAT_PHRASE: &str = "test test test test test test test test test test test junk";
    const ANVIL_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const ANVIL_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    #[test]
    fn phrase_derives_known_address() {
        let account = DerivedAccount::from_phrase(HARDHAT_PHRASE).unwrap();
        assert_eq!(account.address(), Address::from_str(ANVIL_ADDRESS).unwrap());
        assert_eq!(account.private_key_hex().as_str(), ANVIL_KEY);
    }

    #[test]
    fn recovery_from_phrase_is_deterministic() {
        let a = DerivedAccount::from_phrase(HARDHAT_PHRASE).unwrap();
        let b = DerivedAccount::from_phrase(&format!("  {}  ", HARDHAT_PHRASE.to_uppercase())).unwrap();
        assert_eq!(a.address(), b.address());
    }

    #[test]
    fn invalid_phrase_is_rejected() {
        let result = DerivedAccount::from_phrase("not a real phrase at all");
        assert!(matches!(result, Err(WalletError::InvalidInput(_))));
    }

    #[test]
    fn malformed_private_keys_are_rejected() {
        let zero = format!("0x{}", "00".repeat(32));
        let above_order = format!("0x{}", "ff".repeat(32));
        for key in ["0x1234", "zz", zero.as_str(), above_order.as_str()] {
            assert!(matches!(
                DerivedAccount::from_private_key(key),
                Err(WalletError::InvalidInput(_))
            ));
        }
        // Prefix is optional
        assert!(DerivedAccount::from_private_key(ANVIL_KEY.trim_start_matches("0x")).is_ok());
    }

    #[test]
    fn private_key_recovery_has_no_mnemonic() {
        let account = DerivedAccount::from_private_key(ANVIL_KEY).unwrap();
        assert_eq!(account.address(), Address::from_str(ANVIL_ADDRESS).unwrap());
        assert!(account.mnemonic().is_none());

        let container = account.to_container().unwrap();
        assert!(container.meta.get("mnemonic").is_none());
        assert_eq!(container.address, ANVIL_ADDRESS);
    }

    #[test]
    fn generated_accounts_differ_and_keep_phrase() {
        let a = DerivedAccount::generate().unwrap();
        let b = DerivedAccount::generate().unwrap();
        assert_ne!(a.address(), b.address());
        let phrase = a.mnemonic().unwrap();
        assert_eq!(phrase.split(' ').count(), 12);
        assert_eq!(DerivedAccount::from_phrase(phrase).unwrap().address(), a.address());
    }

    #[test]
    fn container_round_trip() {
        let account = DerivedAccount::from_phrase(HARDHAT_PHRASE).unwrap();
        let container = account.to_container().unwrap();
        assert_eq!(container.kind, "derived");
        assert_eq!(container.meta["mnemonic"], HARDHAT_PHRASE);

        let loaded = DerivedAccount::from_container(&container).unwrap();
        assert_eq!(loaded.address(), account.address());
        assert_eq!(loaded.mnemonic(), Some(HARDHAT_PHRASE));
    }

    #[test]
    fn tampered_address_is_an_integrity_error() {
        let mut container = DerivedAccount::from_private_key(ANVIL_KEY)
            .unwrap()
            .to_container()
            .unwrap();
        container.address = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8".to_string();
        assert!(matches!(
            DerivedAccount::from_container(&container),
            Err(WalletError::Integrity(_))
        ));
    }

    #[test]
    fn signs_order_digest_with_reference_signature() {
        let account = DerivedAccount::from_private_key(ANVIL_KEY).unwrap();
        let digest =
            parse_digest("0xfd95992a1d44af3aebb21dc33fc3dc63c6dbbdb9fb9453abe4ab6f26784c3e2c").unwrap();
        let sig = account.sign_hash(&digest).unwrap();
        assert_eq!(sig.r, "0x83df5fa28c9f8ad33bade956aa8f1902434c6c6f799462be5fac9d7cebd6e78a");
        assert_eq!(sig.s, "0x60fce41a3c691b1a43d0d93df080c7ff99257fb47d8de2d5dae940d12686febd");
        assert_eq!(sig.v, 28);

        let prefixed = alloy::primitives::eip191_hash_message(digest.as_slice());
        assert_eq!(sig.recover_prehash(&prefixed).unwrap(), account.address());
    }

    #[test]
    fn signs_message_with_reference_signature() {
        let account = DerivedAccount::from_private_key(ANVIL_KEY).unwrap();
        let sig = account.sign_message(b"hello").unwrap();
        assert_eq!(sig.r, "0xf16ea9a3478698f695fd1401bfe27e9e4a7e8e3da94aa72b021125e31fa899cc");
        assert_eq!(sig.s, "0x573c48ea3fe1d4ab61a9db10c19032026e3ed2dbccba5a178235ac27f9450431");
        assert_eq!(sig.v, 28);
    }

    #[test]
    fn debug_hides_key_material() {
        let account = DerivedAccount::from_phrase(HARDHAT_PHRASE).unwrap();
        let debug = format!("{account:?}");
        assert!(!debug.contains("ac0974bec"));
        assert!(!debug.contains("junk"));
    }
}
