// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Symmetric and pairwise primitives used by both wallet backends.
//!
//! - PBKDF2-HMAC-SHA256 with chunked progress reporting and cancellation
//!   (keystores, legacy vaults)
//! - Argon2id (current vault format)
//! - XChaCha20-Poly1305 sealing with random 192-bit nonces
//! - X25519 + HKDF-SHA256 pairwise envelopes between vault holders
//!
//! Derived keys live in [`Zeroizing`] buffers and are wiped on drop.

use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{Key, XChaCha20Poly1305, XNonce};
use hkdf::Hkdf;
use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tokio_util::sync::CancellationToken;
use unicode_normalization::UnicodeNormalization;
use zeroize::Zeroizing;

use crate::error::{Result, WalletError};

type HmacSha256 = Hmac<Sha256>;

/// Length of an XChaCha20-Poly1305 nonce.
pub const NONCE_LEN: usize = 24;

/// Domain separation for pairwise envelope keys.
const PAIRWISE_INFO: &[u8] = b"relay-signer/pairwise/v1";

/// 256-bit symmetric key, wiped on drop.
pub type SymmetricKey = Zeroizing<[u8; 32]>;

/// Progress sink for long-running derivations, receives 0..=100.
pub type ProgressFn<'a> = dyn Fn(u8) + Send + Sync + 'a;

/// NFKC-normalise a password so visually identical input derives the same key.
pub fn normalize_password(password: &str) -> Zeroizing<String> {
    Zeroizing::new(password.nfkc().collect())
}

/// Fill `N` bytes from the operating system's entropy source.
pub fn random_bytes<const N: usize>() -> Result<[u8; N]> {
    let mut bytes = [0u8; N];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| WalletError::Generation(format!("entropy source failed: {e}")))?;
    Ok(bytes)
}

/// Run a CPU-bound derivation on tokio's blocking pool.
pub(crate) async fn run_blocking<T, F>(task: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| WalletError::Generation(format!("key derivation task failed: {e}")))?
}

// ========== PBKDF2 ==========

/// PBKDF2-HMAC-SHA256 with a 32-byte output, reporting progress.
///
/// The output is a single PRF block, so the derivation is one chain of
/// `iterations` HMAC calls. Progress is emitted whenever the completed
/// percentage increases; cancellation is checked between chunks.
pub fn pbkdf2_sha256_with_progress(
    password: &[u8],
    salt: &[u8],
    iterations: u32,
    progress: &ProgressFn<'_>,
    cancel: &CancellationToken,
) -> Result<SymmetricKey> {
    if iterations == 0 {
        return Err(WalletError::InvalidInput(
            "PBKDF2 iteration count must be positive".to_string(),
        ));
    }

    let prf = <HmacSha256 as Mac>::new_from_slice(password)
        .map_err(|e| WalletError::Generation(format!("invalid HMAC key: {e}")))?;

    let mut mac = prf.clone();
    mac.update(salt);
    mac.update(&1u32.to_be_bytes());
    let mut block: Zeroizing<[u8; 32]> = Zeroizing::new(mac.finalize().into_bytes().into());
    let mut output: SymmetricKey = Zeroizing::new(*block);

    progress(0);
    let chunk = (iterations / 100).max(1);
    let mut reported = 0u8;

    for i in 1..iterations {
        if i % chunk == 0 {
            if cancel.is_cancelled() {
                return Err(WalletError::Generation("key derivation cancelled".to_string()));
            }
            let pct = ((u64::from(i) * 100) / u64::from(iterations)) as u8;
            if pct > reported {
                reported = pct;
                progress(pct);
            }
        }

        let mut mac = prf.clone();
        mac.update(block.as_slice());
        block.copy_from_slice(&mac.finalize().into_bytes());
        for (out, b) in output.iter_mut().zip(block.iter()) {
            *out ^= b;
        }
    }

    progress(100);
    Ok(output)
}

/// PBKDF2-HMAC-SHA256 without progress reporting.
pub fn pbkdf2_sha256(password: &[u8], salt: &[u8], iterations: u32) -> Result<SymmetricKey> {
    pbkdf2_sha256_with_progress(password, salt, iterations, &|_| {}, &CancellationToken::new())
}

// ========== Argon2id ==========

/// Tunable Argon2id costs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Argon2Params {
    /// Memory cost in KiB
    pub m_cost: u32,
    /// Number of passes
    pub t_cost: u32,
    /// Degree of parallelism
    pub p_cost: u32,
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self {
            m_cost: 65_536, // 64 MiB
            t_cost: 3,
            p_cost: 1,
        }
    }
}

/// Derive a 256-bit key with Argon2id (v0x13).
pub fn argon2id(password: &[u8], salt: &[u8], params: &Argon2Params) -> Result<SymmetricKey> {
    let argon2_params = argon2::Params::new(params.m_cost, params.t_cost, params.p_cost, Some(32))
        .map_err(|e| WalletError::InvalidInput(format!("invalid Argon2 parameters: {e}")))?;
    let argon2 = argon2::Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        argon2_params,
    );

    let mut output: SymmetricKey = Zeroizing::new([0u8; 32]);
    argon2
        .hash_password_into(password, salt, output.as_mut_slice())
        .map_err(|e| WalletError::Generation(format!("Argon2id derivation failed: {e}")))?;
    Ok(output)
}

// ========== AEAD ==========

/// Encrypt with XChaCha20-Poly1305 under a fresh random nonce.
pub fn seal(key: &[u8; 32], plaintext: &[u8]) -> Result<([u8; NONCE_LEN], Vec<u8>)> {
    let nonce = random_bytes::<NONCE_LEN>()?;
    let cipher = XChaCha20Poly1305::new(Key::from_slice(key));
    let ciphertext = cipher
        .encrypt(XNonce::from_slice(&nonce), plaintext)
        .map_err(|_| WalletError::Generation("encryption failed".to_string()))?;
    Ok((nonce, ciphertext))
}

/// Decrypt and authenticate. A wrong key and a tampered payload are
/// indistinguishable and both surface as [`WalletError::Integrity`].
pub fn open(key: &[u8; 32], nonce: &[u8], ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    if nonce.len() != NONCE_LEN {
        return Err(WalletError::Integrity(format!(
            "nonce must be {NONCE_LEN} bytes, got {}",
            nonce.len()
        )));
    }
    let cipher = XChaCha20Poly1305::new(Key::from_slice(key));
    cipher
        .decrypt(XNonce::from_slice(nonce), ciphertext)
        .map(Zeroizing::new)
        .map_err(|_| WalletError::Integrity("wrong password or corrupted payload".to_string()))
}

// ========== Pairwise envelopes ==========

/// X25519 keypair used for envelope encryption, distinct from the signing key.
pub struct EncryptionKeypair {
    secret: x25519_dalek::StaticSecret,
    public: x25519_dalek::PublicKey,
}

// EncryptionKeypair does not implement Clone/Debug to prevent leakage.

impl EncryptionKeypair {
    /// Build from 32 bytes of derived key material.
    pub fn from_secret_bytes(bytes: [u8; 32]) -> Self {
        let secret = x25519_dalek::StaticSecret::from(bytes);
        let public = x25519_dalek::PublicKey::from(&secret);
        Self { secret, public }
    }

    /// Public half, hex encoded with `0x`.
    pub fn public_key_hex(&self) -> String {
        format!("0x{}", alloy::hex::encode(self.public.as_bytes()))
    }

    fn shared_key(&self, peer_public_hex: &str) -> Result<SymmetricKey> {
        let peer = parse_public_key(peer_public_hex)?;
        let shared = self.secret.diffie_hellman(&peer);
        if !shared.was_contributory() {
            return Err(WalletError::InvalidInput(
                "peer public key is a low-order point".to_string(),
            ));
        }

        let hkdf = Hkdf::<Sha256>::new(None, shared.as_bytes());
        let mut key: SymmetricKey = Zeroizing::new([0u8; 32]);
        hkdf.expand(PAIRWISE_INFO, key.as_mut_slice())
            .map_err(|e| WalletError::Generation(format!("HKDF expand failed: {e}")))?;
        Ok(key)
    }

    /// Encrypt `message` for the holder of `recipient_public_hex`.
    pub fn encrypt_for(&self, message: &[u8], recipient_public_hex: &str) -> Result<EncryptedEnvelope> {
        let key = self.shared_key(recipient_public_hex)?;
        let (nonce, ciphertext) = seal(&key, message)?;
        Ok(EncryptedEnvelope {
            nonce: nonce.to_vec(),
            ciphertext,
        })
    }

    /// Decrypt an envelope produced by the holder of `sender_public_hex`.
    pub fn decrypt_from(&self, envelope: &EncryptedEnvelope, sender_public_hex: &str) -> Result<Vec<u8>> {
        let key = self.shared_key(sender_public_hex)?;
        let plaintext = open(&key, &envelope.nonce, &envelope.ciphertext)?;
        Ok(plaintext.to_vec())
    }
}

fn parse_public_key(hex_key: &str) -> Result<x25519_dalek::PublicKey> {
    let bytes = alloy::hex::decode(hex_key.strip_prefix("0x").unwrap_or(hex_key))
        .map_err(|e| WalletError::InvalidInput(format!("Invalid encryption public key: {e}")))?;
    let bytes: [u8; 32] = bytes.try_into().map_err(|_| {
        WalletError::InvalidInput("Encryption public key must be 32 bytes".to_string())
    })?;
    Ok(x25519_dalek::PublicKey::from(bytes))
}

/// Ciphertext exchanged between two vault holders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedEnvelope {
    #[serde(with = "b64")]
    pub nonce: Vec<u8>,
    #[serde(with = "b64")]
    pub ciphertext: Vec<u8>,
}

/// Serde adapter storing byte fields as standard base64.
pub(crate) mod b64 {
    use base64ct::{Base64, Encoding};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&Base64::encode_string(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        Base64::decode_vec(&encoded).map_err(serde::de::Error::custom)
    }
}
