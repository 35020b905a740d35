// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Password-encrypted keystore wrapping a [`WalletData`] container.
//!
//! Format (JSON):
//! ```text
//! { "version": 1, "id": "<uuid>", "address": "0x…",
//!   "crypto": { "kdf": "pbkdf2-hmac-sha256", "iterations": N, "salt": b64,
//!               "cipher": "xchacha20-poly1305", "nonce": b64, "ciphertext": b64 } }
//! ```
//!
//! Derivation is CPU-bound and runs on tokio's blocking pool. Progress is
//! pushed to an optional callback from that worker; a [`CancellationToken`]
//! aborts it between PBKDF2 chunks.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::container::WalletData;
use super::crypto::{self, b64, ProgressFn};
use crate::error::{Result, WalletError};

/// Current keystore envelope version.
pub const KEYSTORE_VERSION: u32 = 1;

const KDF_NAME: &str = "pbkdf2-hmac-sha256";
const CIPHER_NAME: &str = "xchacha20-poly1305";
const SALT_LEN: usize = 32;

/// Upper bound accepted from a keystore file, so a crafted blob cannot pin a core.
const MAX_ITERATIONS: u32 = 10_000_000;

/// KDF cost for newly written keystores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeystoreParams {
    pub iterations: u32,
}

impl Default for KeystoreParams {
    fn default() -> Self {
        Self {
            iterations: 262_144,
        }
    }
}

/// Progress reporting and cancellation for one derivation.
#[derive(Clone, Default)]
pub struct KeystoreOptions {
    progress: Option<Arc<ProgressFn<'static>>>,
    cancel: CancellationToken,
}

impl KeystoreOptions {
    /// Receive monotonically increasing progress in `0..=100`.
    pub fn on_progress(mut self, callback: impl Fn(u8) + Send + Sync + 'static) -> Self {
        self.progress = Some(Arc::new(callback));
        self
    }

    /// Abort the derivation when `token` is cancelled.
    pub fn cancel_on(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    fn report(&self, percent: u8) {
        if let Some(callback) = &self.progress {
            callback(percent);
        }
    }
}

/// Read before the body so other versions are rejected on their tag alone.
#[derive(Deserialize)]
struct KeystoreHeader {
    version: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct EncryptedKeystore {
    version: u32,
    id: Uuid,
    address: String,
    crypto: KeystoreCrypto,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct KeystoreCrypto {
    kdf: String,
    iterations: u32,
    #[serde(with = "b64")]
    salt: Vec<u8>,
    cipher: String,
    #[serde(with = "b64")]
    nonce: Vec<u8>,
    #[serde(with = "b64")]
    ciphertext: Vec<u8>,
}

/// Encrypt `data` under `password`.
pub async fn encrypt(
    data: &WalletData,
    password: &str,
    params: KeystoreParams,
    options: KeystoreOptions,
) -> Result<Vec<u8>> {
    // Only well-formed containers get wrapped
    data.format()?;
    let address = data.address()?;
    let plaintext = zeroize::Zeroizing::new(data.to_json()?.into_bytes());
    let password = crypto::normalize_password(password);

    let keystore = crypto::run_blocking(move || -> Result<EncryptedKeystore> {
        let salt = crypto::random_bytes::<SALT_LEN>()?;
        let key = crypto::pbkdf2_sha256_with_progress(
            password.as_bytes(),
            &salt,
            params.iterations,
            &|percent| options.report(percent),
            &options.cancel,
        )?;
        let (nonce, ciphertext) = crypto::seal(&key, &plaintext)?;

        Ok(EncryptedKeystore {
            version: KEYSTORE_VERSION,
            id: Uuid::new_v4(),
            address: address.to_checksum(None),
            crypto: KeystoreCrypto {
                kdf: KDF_NAME.to_string(),
                iterations: params.iterations,
                salt: salt.to_vec(),
                cipher: CIPHER_NAME.to_string(),
                nonce: nonce.to_vec(),
                ciphertext,
            },
        })
    })
    .await?;

    tracing::debug!(address = %keystore.address, id = %keystore.id, "Encrypted wallet keystore");
    Ok(serde_json::to_vec(&keystore)?)
}

/// Decrypt a keystore and return the validated container inside it.
pub async fn decrypt(blob: &[u8], password: &str) -> Result<WalletData> {
    let header: KeystoreHeader = serde_json::from_slice(blob)?;
    if header.version != KEYSTORE_VERSION {
        return Err(WalletError::Format(format!(
            "unsupported keystore version {}",
            header.version
        )));
    }

    let keystore: EncryptedKeystore = serde_json::from_slice(blob)?;
    if keystore.crypto.kdf != KDF_NAME || keystore.crypto.cipher != CIPHER_NAME {
        return Err(WalletError::Format(format!(
            "unsupported keystore scheme {}/{}",
            keystore.crypto.kdf, keystore.crypto.cipher
        )));
    }
    if keystore.crypto.iterations == 0 || keystore.crypto.iterations > MAX_ITERATIONS {
        return Err(WalletError::Integrity(format!(
            "keystore iteration count {} out of range",
            keystore.crypto.iterations
        )));
    }

    let password = crypto::normalize_password(password);
    let crypto_params = keystore.crypto.clone();
    let plaintext = crypto::run_blocking(move || {
        let key = crypto::pbkdf2_sha256(
            password.as_bytes(),
            &crypto_params.salt,
            crypto_params.iterations,
        )?;
        crypto::open(&key, &crypto_params.nonce, &crypto_params.ciphertext)
    })
    .await?;

    let data: WalletData = serde_json::from_slice(&plaintext)?;
    data.format()?;
    if data.address()? != parse_address(&keystore.address)? {
        return Err(WalletError::Integrity(
            "keystore address does not match its contents".to_string(),
        ));
    }
    Ok(data)
}

fn parse_address(input: &str) -> Result<alloy::primitives::Address> {
    input
        .parse()
        .map_err(|e| WalletError::Integrity(format!("invalid keystore address: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    const LIGHT: KeystoreParams = KeystoreParams { iterations: 2_000 };

    fn container() -> WalletData {
        WalletData {
            kind: "derived".to_string(),
            version: 1,
            address: "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".to_string(),
            meta: json!({
                "privateKey": "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"
            }),
        }
    }

    #[tokio::test]
    async fn encrypt_then_decrypt_returns_container() {
        let blob = encrypt(&container(), "hunter2", LIGHT, KeystoreOptions::default())
            .await
            .unwrap();
        let text = String::from_utf8(blob.clone()).unwrap();
        assert!(!text.contains("ac0974bec"));

        let back = decrypt(&blob, "hunter2").await.unwrap();
        assert_eq!(back, container());
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let blob = encrypt(&container(), "hunter2", LIGHT, KeystoreOptions::default())
            .await
            .unwrap();
        let result = decrypt(&blob, "hunter3").await;
        assert!(matches!(result, Err(WalletError::Integrity(_))));
    }

    #[tokio::test]
    async fn progress_reaches_100() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let options = KeystoreOptions::default().on_progress(move |p| sink.lock().unwrap().push(p));

        encrypt(&container(), "pw", LIGHT, options).await.unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.first(), Some(&0));
        assert_eq!(seen.last(), Some(&100));
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn cancelled_derivation_fails() {
        let token = CancellationToken::new();
        token.cancel();
        let options = KeystoreOptions::default().cancel_on(token);
        let result = encrypt(&container(), "pw", KeystoreParams { iterations: 50_000 }, options).await;
        assert!(matches!(result, Err(WalletError::Generation(_))));
    }

    #[tokio::test]
    async fn unsupported_keystore_version_is_a_format_error() {
        let blob = encrypt(&container(), "pw", LIGHT, KeystoreOptions::default())
            .await
            .unwrap();
        let mut value: serde_json::Value = serde_json::from_slice(&blob).unwrap();
        value["version"] = json!(9);
        let result = decrypt(&serde_json::to_vec(&value).unwrap(), "pw").await;
        assert!(matches!(result, Err(WalletError::Format(_))));
    }

    #[tokio::test]
    async fn future_keystore_layout_is_a_format_error() {
        let blob = serde_json::to_vec(&json!({
            "version": 2,
            "id": Uuid::new_v4(),
            "address": "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266",
            "envelope": { "scheme": "something-newer" }
        }))
        .unwrap();
        let result = decrypt(&blob, "pw").await;
        assert!(matches!(result, Err(WalletError::Format(_))));
    }

    #[tokio::test]
    async fn invalid_container_is_not_encrypted() {
        let mut data = container();
        data.kind = "mystery".to_string();
        let result = encrypt(&data, "pw", LIGHT, KeystoreOptions::default()).await;
        assert!(matches!(result, Err(WalletError::Format(_))));
    }

    #[tokio::test]
    async fn garbage_blob_is_an_integrity_error() {
        let result = decrypt(b"not a keystore", "pw").await;
        assert!(matches!(result, Err(WalletError::Integrity(_))));
    }
}
