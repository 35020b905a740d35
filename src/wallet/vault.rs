// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Managed vault backend.
//!
//! A vault holds one BIP-39 seed encrypted under a password-derived key and
//! derives any number of accounts from it on demand:
//!
//! | Purpose | Path |
//! |---------|------|
//! | Signing key of account `i` | `{hdPath}/{i}` (default `m/44'/60'/0'/0`) |
//! | X25519 encryption key of account `i` | `m/0'/0'/2'/{i}'` |
//!
//! Container versions:
//!
//! - **v1** (legacy): PBKDF2-HMAC-SHA256 at 10 000 iterations, single account.
//! - **v2** (current): Argon2id with parameters stored in the container, HD
//!   path and account count.
//!
//! Unlocking a v1 container upgrades it in memory. The caller's container is
//! left untouched; [`Vault::to_container`] yields the upgraded form.

use std::collections::BTreeMap;

use alloy::primitives::{Address, B256};
use alloy::signers::local::PrivateKeySigner;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, Zeroizing};

use super::container::{ContainerFormat, VaultVersion, WalletData};
use super::crypto::{self, b64, Argon2Params, EncryptedEnvelope, EncryptionKeypair};
use super::derived::{normalize_phrase, personal_sign, random_phrase, signer_at};
use super::signature::SignatureParts;
use crate::error::{Result, WalletError};

/// PBKDF2 iteration count of legacy v1 vaults.
pub const LEGACY_PBKDF2_ITERATIONS: u32 = 10_000;

/// Signing-key derivation prefix for new vaults.
pub const DEFAULT_HD_PATH: &str = "m/44'/60'/0'/0";

const ENCRYPTION_PATH: &str = "m/0'/0'/2'";
const SALT_LEN: usize = 16;

/// Highest non-hardened BIP-32 child index.
const MAX_ACCOUNT_INDEX: u32 = 0x7fff_ffff;

/// Argon2 memory cost ceiling accepted from a stored container (KiB).
const MAX_STORED_M_COST: u32 = 4 * 1024 * 1024;

/// Key-derivation costs for newly sealed vaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VaultParams {
    pub argon2: Argon2Params,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyVaultMeta {
    #[serde(with = "b64")]
    salt: Vec<u8>,
    #[serde(with = "b64")]
    nonce: Vec<u8>,
    #[serde(with = "b64")]
    enc_seed: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VaultMeta {
    kdf: KdfMeta,
    #[serde(with = "b64")]
    nonce: Vec<u8>,
    #[serde(with = "b64")]
    enc_seed: Vec<u8>,
    hd_path: String,
    account_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct KdfMeta {
    #[serde(flatten)]
    params: Argon2Params,
    #[serde(with = "b64")]
    salt: Vec<u8>,
}

/// One account derived from the vault seed.
pub struct VaultAccount {
    index: u32,
    signer: PrivateKeySigner,
    encryption: EncryptionKeypair,
}

impl VaultAccount {
    fn derive(phrase: &str, hd_path: &str, index: u32) -> Result<Self> {
        if index > MAX_ACCOUNT_INDEX {
            return Err(WalletError::InvalidInput(format!(
                "Account index {index} out of range"
            )));
        }
        let signer = signer_at(phrase, &format!("{hd_path}/{index}"))?;

        let mut secret = signer_at(phrase, &format!("{ENCRYPTION_PATH}/{index}'"))?
            .to_bytes()
            .0;
        let encryption = EncryptionKeypair::from_secret_bytes(secret);
        secret.zeroize();

        Ok(Self {
            index,
            signer,
            encryption,
        })
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Public X25519 key peers use to encrypt for this account.
    pub fn encryption_public_key(&self) -> String {
        self.encryption.public_key_hex()
    }
}

/// An unlocked vault.
pub struct Vault {
    phrase: Zeroizing<String>,
    meta: VaultMeta,
    accounts: BTreeMap<u32, VaultAccount>,
    active: u32,
}

impl Vault {
    /// Create a vault around a fresh seed. Blocking: runs Argon2id.
    pub fn create(password: &str, params: &VaultParams) -> Result<Self> {
        let phrase = random_phrase()?;
        Self::from_phrase(&phrase, password, params)
    }

    /// Seal an existing phrase into a new vault. Blocking: runs Argon2id.
    pub fn from_phrase(phrase: &str, password: &str, params: &VaultParams) -> Result<Self> {
        let phrase = normalize_phrase(phrase);
        let meta = seal_seed(&phrase, password, params, DEFAULT_HD_PATH, 1)?;
        Self::from_parts(phrase, meta)
    }

    /// Decrypt a vault container, upgrading legacy versions first.
    ///
    /// Blocking: runs the container's KDF. A wrong password, a corrupt
    /// payload and an address mismatch all fail with
    /// [`WalletError::Integrity`].
    pub fn unlock(data: &WalletData, password: &str, params: &VaultParams) -> Result<Self> {
        let version = match data.format()? {
            ContainerFormat::Vault(version) => version,
            other => {
                return Err(WalletError::Format(format!(
                    "expected a vault container, got {:?}",
                    other.kind()
                )))
            }
        };

        let (meta, phrase) = match version {
            VaultVersion::V1 => {
                tracing::info!(address = %data.address, "Upgrading legacy vault container");
                upgrade_v1(data, password, params)?
            }
            VaultVersion::V2 => {
                let meta: VaultMeta = data.meta()?;
                let phrase = open_seed(&meta, password)?;
                (meta, phrase)
            }
        };

        let vault = Self::from_parts(phrase, meta)?;
        data.ensure_address(vault.primary_address()?)?;
        Ok(vault)
    }

    /// Only account 0 is derived here; `accountCount` is bookkeeping for
    /// callers and other accounts are derived when first requested.
    fn from_parts(phrase: Zeroizing<String>, meta: VaultMeta) -> Result<Self> {
        if meta.account_count > MAX_ACCOUNT_INDEX.saturating_add(1) {
            return Err(WalletError::Integrity(format!(
                "vault records {} accounts",
                meta.account_count
            )));
        }

        let mut vault = Self {
            phrase,
            meta,
            accounts: BTreeMap::new(),
            active: 0,
        };
        vault.derive_account(0)?;
        Ok(vault)
    }

    /// Serialize as a current-version container.
    pub fn to_container(&self) -> Result<WalletData> {
        WalletData::new(
            ContainerFormat::Vault(VaultVersion::CURRENT),
            self.primary_address()?,
            &self.meta,
        )
    }

    /// Derive account `index` if it is not derived yet and return its address.
    ///
    /// Derivation is deterministic and independent of the order in which
    /// indices are requested.
    pub fn derive_account(&mut self, index: u32) -> Result<Address> {
        if let Some(account) = self.accounts.get(&index) {
            return Ok(account.address());
        }
        let account = VaultAccount::derive(&self.phrase, &self.meta.hd_path, index)?;
        let address = account.address();
        self.accounts.insert(index, account);
        self.meta.account_count = self.meta.account_count.max(index + 1);
        tracing::debug!(index, %address, "Derived vault account");
        Ok(address)
    }

    /// Make account `index` the one that signs, deriving it if needed.
    pub fn select_account(&mut self, index: u32) -> Result<Address> {
        let address = self.derive_account(index)?;
        self.active = index;
        Ok(address)
    }

    /// The currently active account.
    pub fn active_account(&self) -> Result<&VaultAccount> {
        self.account(self.active)
    }

    fn account(&self, index: u32) -> Result<&VaultAccount> {
        self.accounts
            .get(&index)
            .ok_or_else(|| WalletError::Integrity(format!("vault account {index} not derived")))
    }

    /// Address of account 0, recorded in the container.
    pub fn primary_address(&self) -> Result<Address> {
        Ok(self.account(0)?.address())
    }

    pub fn account_count(&self) -> u32 {
        self.meta.account_count
    }

    pub fn address(&self) -> Result<Address> {
        Ok(self.active_account()?.address())
    }

    pub(crate) fn signer(&self) -> Result<&PrivateKeySigner> {
        Ok(&self.active_account()?.signer)
    }

    pub fn mnemonic(&self) -> &str {
        &self.phrase
    }

    pub fn private_key_hex(&self) -> Result<Zeroizing<String>> {
        Ok(Zeroizing::new(alloy::hex::encode_prefixed(
            self.signer()?.to_bytes(),
        )))
    }

    pub fn encryption_public_key(&self) -> Result<String> {
        Ok(self.active_account()?.encryption_public_key())
    }

    pub fn sign_hash(&self, digest: &B256) -> Result<SignatureParts> {
        personal_sign(self.signer()?, digest.as_slice())
    }

    pub fn sign_message(&self, message: &[u8]) -> Result<SignatureParts> {
        personal_sign(self.signer()?, message)
    }

    /// Encrypt `message` for the vault holder owning `recipient_public_key`.
    pub fn encrypt(&self, message: &[u8], recipient_public_key: &str) -> Result<EncryptedEnvelope> {
        self.active_account()?
            .encryption
            .encrypt_for(message, recipient_public_key)
    }

    /// Decrypt an envelope sent by the owner of `sender_public_key`.
    pub fn decrypt(&self, envelope: &EncryptedEnvelope, sender_public_key: &str) -> Result<Vec<u8>> {
        self.active_account()?
            .encryption
            .decrypt_from(envelope, sender_public_key)
    }
}

impl std::fmt::Debug for Vault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vault")
            .field("hd_path", &self.meta.hd_path)
            .field("account_count", &self.meta.account_count)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

fn seal_seed(
    phrase: &str,
    password: &str,
    params: &VaultParams,
    hd_path: &str,
    account_count: u32,
) -> Result<VaultMeta> {
    let password = crypto::normalize_password(password);
    let salt = crypto::random_bytes::<SALT_LEN>()?;
    let key = crypto::argon2id(password.as_bytes(), &salt, &params.argon2)?;
    let (nonce, enc_seed) = crypto::seal(&key, phrase.as_bytes())?;

    Ok(VaultMeta {
        kdf: KdfMeta {
            params: params.argon2,
            salt: salt.to_vec(),
        },
        nonce: nonce.to_vec(),
        enc_seed,
        hd_path: hd_path.to_string(),
        account_count,
    })
}

fn open_seed(meta: &VaultMeta, password: &str) -> Result<Zeroizing<String>> {
    if meta.kdf.params.m_cost > MAX_STORED_M_COST {
        return Err(WalletError::Integrity(format!(
            "vault memory cost {} KiB exceeds limit",
            meta.kdf.params.m_cost
        )));
    }
    let password = crypto::normalize_password(password);
    let key = crypto::argon2id(password.as_bytes(), &meta.kdf.salt, &meta.kdf.params)
        .map_err(|e| match e {
            WalletError::InvalidInput(msg) => WalletError::Integrity(msg),
            other => other,
        })?;
    phrase_from_plaintext(crypto::open(&key, &meta.nonce, &meta.enc_seed)?)
}

/// v1 → v2: decrypt with the legacy KDF and re-seal the same seed under
/// Argon2id with a fresh salt and nonce.
fn upgrade_v1(
    data: &WalletData,
    password: &str,
    params: &VaultParams,
) -> Result<(VaultMeta, Zeroizing<String>)> {
    let legacy: LegacyVaultMeta = data.meta()?;
    let normalized = crypto::normalize_password(password);
    let key = crypto::pbkdf2_sha256(normalized.as_bytes(), &legacy.salt, LEGACY_PBKDF2_ITERATIONS)?;
    let phrase = phrase_from_plaintext(crypto::open(&key, &legacy.nonce, &legacy.enc_seed)?)?;

    let meta = seal_seed(&phrase, password, params, DEFAULT_HD_PATH, 1)?;
    Ok((meta, phrase))
}

fn phrase_from_plaintext(plaintext: Zeroizing<Vec<u8>>) -> Result<Zeroizing<String>> {
    let phrase = std::str::from_utf8(&plaintext)
        .map_err(|_| WalletError::Integrity("vault seed is not valid UTF-8".to_string()))?;
    Ok(Zeroizing::new(phrase.to_string()))
}
