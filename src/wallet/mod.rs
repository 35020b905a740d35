// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet capability interface.
//!
//! A [`Wallet`] drives one backend (derived-key or vault) and owns a single
//! active-account slot. `create` and `recover_*` only produce containers;
//! [`Wallet::load_from`] puts an account into the slot, replacing whatever
//! was there. Every operation that needs a key fails with
//! [`WalletError::NoAccountLoaded`] while the slot is empty.
//!
//! ## Concurrency
//!
//! The slot sits behind a `tokio::sync::Mutex`. Containers are decrypted
//! outside the lock, on the blocking pool, and swapped in only on success, so
//! a failed load leaves the previous account active.

pub mod container;
pub mod crypto;
pub mod derived;
pub mod keystore;
pub mod signature;
pub mod vault;

use std::sync::Arc;

use alloy::primitives::{Address, B256};
use alloy::signers::local::PrivateKeySigner;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use zeroize::Zeroizing;

use crate::amount::{to_amount, Amount};
use crate::error::{Result, WalletError};
use crate::exchange::transactions::{sign_legacy, RawTxIntent};
use crate::hashing::parse_digest;
use crate::transport::{TransactionId, Transport};

pub use container::{WalletData, WalletKind};
pub use crypto::{Argon2Params, EncryptedEnvelope};
pub use keystore::{KeystoreOptions, KeystoreParams};
pub use signature::SignatureParts;
pub use vault::VaultParams;

use derived::DerivedAccount;
use vault::Vault;

/// Decimals of the native coin.
pub const NATIVE_DECIMALS: u8 = 18;

/// Nonce, fee estimate and balance of an address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxInfos {
    pub nonce: u64,
    /// Gas price estimate in wei
    pub fee_estimate: u128,
    pub balance: Amount,
}

enum Backend {
    Derived,
    Vault { password: Zeroizing<String> },
}

/// The account currently in the slot.
enum LoadedAccount {
    Derived(DerivedAccount),
    Vault(Vault),
}

impl LoadedAccount {
    fn address(&self) -> Result<Address> {
        match self {
            LoadedAccount::Derived(account) => Ok(account.address()),
            LoadedAccount::Vault(vault) => vault.address(),
        }
    }

    fn signer(&self) -> Result<&PrivateKeySigner> {
        match self {
            LoadedAccount::Derived(account) => Ok(account.signer()),
            LoadedAccount::Vault(vault) => vault.signer(),
        }
    }

    fn sign_hash(&self, digest: &B256) -> Result<SignatureParts> {
        match self {
            LoadedAccount::Derived(account) => account.sign_hash(digest),
            LoadedAccount::Vault(vault) => vault.sign_hash(digest),
        }
    }

    fn sign_message(&self, message: &[u8]) -> Result<SignatureParts> {
        match self {
            LoadedAccount::Derived(account) => account.sign_message(message),
            LoadedAccount::Vault(vault) => vault.sign_message(message),
        }
    }

    fn to_container(&self) -> Result<WalletData> {
        match self {
            LoadedAccount::Derived(account) => account.to_container(),
            LoadedAccount::Vault(vault) => vault.to_container(),
        }
    }

    fn vault_mut(&mut self, operation: &'static str) -> Result<&mut Vault> {
        match self {
            LoadedAccount::Derived(_) => Err(WalletError::NotSupported(operation)),
            LoadedAccount::Vault(vault) => Ok(vault),
        }
    }

    fn vault(&self, operation: &'static str) -> Result<&Vault> {
        match self {
            LoadedAccount::Derived(_) => Err(WalletError::NotSupported(operation)),
            LoadedAccount::Vault(vault) => Ok(vault),
        }
    }
}

fn active(slot: &Option<LoadedAccount>) -> Result<&LoadedAccount> {
    slot.as_ref().ok_or(WalletError::NoAccountLoaded)
}

fn active_mut(slot: &mut Option<LoadedAccount>) -> Result<&mut LoadedAccount> {
    slot.as_mut().ok_or(WalletError::NoAccountLoaded)
}

/// Wallet bound to one backend, one transport and one active account slot.
pub struct Wallet {
    backend: Backend,
    transport: Arc<dyn Transport>,
    chain_id: u64,
    keystore_params: KeystoreParams,
    vault_params: VaultParams,
    slot: Mutex<Option<LoadedAccount>>,
}

impl Wallet {
    /// Wallet backed by single derived keys.
    pub fn derived(transport: Arc<dyn Transport>, chain_id: u64) -> Self {
        Self::with_backend(Backend::Derived, transport, chain_id)
    }

    /// Wallet backed by a password-protected vault.
    pub fn vault(transport: Arc<dyn Transport>, chain_id: u64, password: &str) -> Self {
        Self::with_backend(
            Backend::Vault {
                password: Zeroizing::new(password.to_string()),
            },
            transport,
            chain_id,
        )
    }

    fn with_backend(backend: Backend, transport: Arc<dyn Transport>, chain_id: u64) -> Self {
        Self {
            backend,
            transport,
            chain_id,
            keystore_params: KeystoreParams::default(),
            vault_params: VaultParams::default(),
            slot: Mutex::new(None),
        }
    }

    pub fn with_keystore_params(mut self, params: KeystoreParams) -> Self {
        self.keystore_params = params;
        self
    }

    pub fn with_vault_params(mut self, params: VaultParams) -> Self {
        self.vault_params = params;
        self
    }

    pub fn kind(&self) -> WalletKind {
        match self.backend {
            Backend::Derived => WalletKind::Derived,
            Backend::Vault { .. } => WalletKind::Vault,
        }
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    // ========== Lifecycle ==========

    /// Generate a fresh account and return its container. The slot is not touched.
    pub async fn create(&self) -> Result<WalletData> {
        let data = match &self.backend {
            Backend::Derived => DerivedAccount::generate()?.to_container()?,
            Backend::Vault { password } => {
                let password = password.clone();
                let params = self.vault_params;
                crypto::run_blocking(move || Vault::create(&password, &params)?.to_container())
                    .await?
            }
        };
        tracing::info!(kind = %data.kind, address = %data.address, "Created wallet");
        Ok(data)
    }

    /// Validate and decrypt `data`, then make it the active account.
    ///
    /// The tag and version are checked before any key material is touched.
    /// On failure the previously active account stays loaded.
    pub async fn load_from(&self, data: &WalletData) -> Result<()> {
        let format = data.format()?;
        if format.kind() != self.kind() {
            return Err(WalletError::Format(format!(
                "{} container cannot be loaded into a {} wallet",
                data.kind,
                self.kind().tag()
            )));
        }

        let account = match &self.backend {
            Backend::Derived => LoadedAccount::Derived(DerivedAccount::from_container(data)?),
            Backend::Vault { password } => {
                let password = password.clone();
                let params = self.vault_params;
                let data = data.clone();
                let vault =
                    crypto::run_blocking(move || Vault::unlock(&data, &password, &params)).await?;
                LoadedAccount::Vault(vault)
            }
        };

        let address = account.address()?;
        *self.slot.lock().await = Some(account);
        tracing::info!(%address, version = format.version_number(), "Loaded account");
        Ok(())
    }

    /// Re-derive a container from a recovery phrase.
    pub async fn recover_from_seed(&self, phrase: &str) -> Result<WalletData> {
        match &self.backend {
            Backend::Derived => DerivedAccount::from_phrase(phrase)?.to_container(),
            Backend::Vault { password } => {
                let password = password.clone();
                let params = self.vault_params;
                let phrase = Zeroizing::new(phrase.to_string());
                crypto::run_blocking(move || {
                    Vault::from_phrase(&phrase, &password, &params)?.to_container()
                })
                .await
            }
        }
    }

    /// Import a raw private key. The result carries no recovery phrase.
    pub async fn recover_from_private_key(&self, private_key: &str) -> Result<WalletData> {
        match &self.backend {
            Backend::Derived => DerivedAccount::from_private_key(private_key)?.to_container(),
            Backend::Vault { .. } => Err(WalletError::NotSupported(
                "vault accounts are derived from a recovery phrase",
            )),
        }
    }

    /// Decrypt a keystore produced by [`Self::encrypt_to_serialized_keystore`].
    pub async fn recover_from_encrypted_keystore(
        &self,
        blob: &[u8],
        password: &str,
    ) -> Result<WalletData> {
        keystore::decrypt(blob, password).await
    }

    /// Encrypt `data` under `password` off the async executor.
    pub async fn encrypt_to_serialized_keystore(
        &self,
        data: &WalletData,
        password: &str,
        options: KeystoreOptions,
    ) -> Result<Vec<u8>> {
        keystore::encrypt(data, password, self.keystore_params, options).await
    }

    // ========== Signing ==========

    /// Personal-sign a 32-byte hex digest.
    pub async fn sign_msg_hash(&self, digest: &str) -> Result<SignatureParts> {
        let slot = self.slot.lock().await;
        let account = active(&slot)?;
        account.sign_hash(&parse_digest(digest)?)
    }

    pub(crate) async fn sign_digest(&self, digest: &B256) -> Result<SignatureParts> {
        let slot = self.slot.lock().await;
        active(&slot)?.sign_hash(digest)
    }

    /// Personal-sign arbitrary bytes.
    pub async fn sign_message(&self, message: &[u8]) -> Result<SignatureParts> {
        let slot = self.slot.lock().await;
        active(&slot)?.sign_message(message)
    }

    /// Sign `intent` as a legacy transaction and hand it to the relay.
    ///
    /// Missing nonce or gas price are filled from one account-info fetch.
    pub async fn confirm(&self, intent: RawTxIntent) -> Result<TransactionId> {
        let (signer, from) = {
            let slot = self.slot.lock().await;
            let account = active(&slot)?;
            (account.signer()?.clone(), account.address()?)
        };

        let info = if intent.needs_account_info() {
            Some(self.transport.get_account_info(from).await?)
        } else {
            None
        };
        let tx = intent.into_legacy(info.as_ref(), self.chain_id)?;
        let nonce = tx.nonce;
        let raw = sign_legacy(&signer, tx)?;

        let id = self.transport.submit_signed_transaction(&raw).await?;
        tracing::info!(%from, nonce, tx = %id, "Submitted signed transaction");
        Ok(id)
    }

    // ========== Encryption ==========

    /// Encrypt for another vault holder.
    pub async fn encrypt(&self, message: &[u8], recipient_public_key: &str) -> Result<EncryptedEnvelope> {
        let slot = self.slot.lock().await;
        active(&slot)?
            .vault("pairwise encryption requires a vault")?
            .encrypt(message, recipient_public_key)
    }

    /// Decrypt an envelope from another vault holder.
    pub async fn decrypt(&self, envelope: &EncryptedEnvelope, sender_public_key: &str) -> Result<Vec<u8>> {
        let slot = self.slot.lock().await;
        active(&slot)?
            .vault("pairwise encryption requires a vault")?
            .decrypt(envelope, sender_public_key)
    }

    pub async fn encryption_public_key(&self) -> Result<String> {
        let slot = self.slot.lock().await;
        active(&slot)?
            .vault("encryption keys require a vault")?
            .encryption_public_key()
    }

    // ========== Vault accounts ==========

    /// Derive vault account `index` without activating it.
    pub async fn derive_account(&self, index: u32) -> Result<Address> {
        let mut slot = self.slot.lock().await;
        active_mut(&mut slot)?
            .vault_mut("account derivation requires a vault")?
            .derive_account(index)
    }

    /// Make vault account `index` the signing account.
    pub async fn select_account(&self, index: u32) -> Result<Address> {
        let mut slot = self.slot.lock().await;
        let address = active_mut(&mut slot)?
            .vault_mut("account selection requires a vault")?
            .select_account(index)?;
        tracing::info!(index, %address, "Selected vault account");
        Ok(address)
    }

    // ========== Introspection ==========

    pub async fn address(&self) -> Result<Address> {
        let slot = self.slot.lock().await;
        active(&slot)?.address()
    }

    /// Native balance of the active account.
    pub async fn get_balance(&self) -> Result<Amount> {
        let address = self.address().await?;
        let info = self.transport.get_account_info(address).await?;
        Ok(to_amount(info.balance_raw, NATIVE_DECIMALS))
    }

    /// Nonce, fee estimate and balance of any address.
    pub async fn get_tx_infos(&self, address: Address) -> Result<TxInfos> {
        let info = self.transport.get_account_info(address).await?;
        Ok(TxInfos {
            nonce: info.nonce,
            fee_estimate: info.fee_estimate,
            balance: to_amount(info.balance_raw, NATIVE_DECIMALS),
        })
    }

    // ========== Export ==========

    /// Container of the active account, in the current format version.
    pub async fn export_container(&self) -> Result<WalletData> {
        let slot = self.slot.lock().await;
        active(&slot)?.to_container()
    }

    pub async fn export_private_key(&self) -> Result<Zeroizing<String>> {
        let slot = self.slot.lock().await;
        match active(&slot)? {
            LoadedAccount::Derived(account) => Ok(account.private_key_hex()),
            LoadedAccount::Vault(vault) => vault.private_key_hex(),
        }
    }

    /// The recovery phrase, `None` for accounts imported from a private key.
    pub async fn export_recovery_phrase(&self) -> Result<Option<Zeroizing<String>>> {
        let slot = self.slot.lock().await;
        Ok(match active(&slot)? {
            LoadedAccount::Derived(account) => {
                account.mnemonic().map(|m| Zeroizing::new(m.to_string()))
            }
            LoadedAccount::Vault(vault) => Some(Zeroizing::new(vault.mnemonic().to_string())),
        })
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("kind", &self.kind())
            .field("chain_id", &self.chain_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::testing::RecordingTransport;
    use alloy::consensus::TxEnvelope;
    use alloy::eips::eip2718::Decodable2718;
    use alloy::primitives::{Bytes, U256};
    use std::str::FromStr;

    const ANVIL_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const ANVIL_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
    const HARDHAT_PHRASE: &str = "test test test test test test test test test test test junk";
    const REFERENCE_HASH: &str =
        "0xfd95992a1d44af3aebb21dc33fc3dc63c6dbbdb9fb9453abe4ab6f26784c3e2c";

    fn light_vault_params() -> VaultParams {
        VaultParams {
            argon2: Argon2Params {
                m_cost: 256,
                t_cost: 1,
                p_cost: 1,
            },
        }
    }

    fn derived_wallet(transport: Arc<RecordingTransport>) -> Wallet {
        Wallet::derived(transport, 1).with_keystore_params(KeystoreParams { iterations: 1_000 })
    }

    fn vault_wallet(password: &str) -> Wallet {
        Wallet::vault(Arc::new(RecordingTransport::default()), 1, password)
            .with_vault_params(light_vault_params())
    }

    async fn loaded_derived(transport: Arc<RecordingTransport>) -> Wallet {
        let wallet = derived_wallet(transport);
        let data = wallet.recover_from_private_key(ANVIL_KEY).await.unwrap();
        wallet.load_from(&data).await.unwrap();
        wallet
    }

    #[tokio::test]
    async fn operations_before_load_fail_uniformly() {
        let wallets = [
            derived_wallet(Arc::new(RecordingTransport::default())),
            vault_wallet("pw"),
        ];
        for wallet in &wallets {
            assert!(matches!(
                wallet.sign_msg_hash(REFERENCE_HASH).await,
                Err(WalletError::NoAccountLoaded)
            ));
            assert!(matches!(
                wallet.sign_message(b"hi").await,
                Err(WalletError::NoAccountLoaded)
            ));
            assert!(matches!(wallet.address().await, Err(WalletError::NoAccountLoaded)));
            assert!(matches!(wallet.get_balance().await, Err(WalletError::NoAccountLoaded)));
            assert!(matches!(
                wallet
                    .confirm(RawTxIntent::new(Address::ZERO, Bytes::new()))
                    .await,
                Err(WalletError::NoAccountLoaded)
            ));
        }
    }

    #[tokio::test]
    async fn signs_reference_digest() {
        let wallet = loaded_derived(Arc::new(RecordingTransport::default())).await;
        let sig = wallet.sign_msg_hash(REFERENCE_HASH).await.unwrap();
        assert_eq!(sig.r, "0x83df5fa28c9f8ad33bade956aa8f1902434c6c6f799462be5fac9d7cebd6e78a");
        assert_eq!(sig.v, 28);
    }

    #[tokio::test]
    async fn malformed_digest_is_invalid_input() {
        let wallet = loaded_derived(Arc::new(RecordingTransport::default())).await;
        assert!(matches!(
            wallet.sign_msg_hash("0x1234").await,
            Err(WalletError::InvalidInput(_))
        ));
        assert!(matches!(
            wallet.sign_msg_hash(&format!("0x{}", "zz".repeat(32))).await,
            Err(WalletError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn failed_load_keeps_previous_account() {
        let wallet = loaded_derived(Arc::new(RecordingTransport::default())).await;
        let mut future = wallet.export_container().await.unwrap();
        future.version = 9;
        assert!(matches!(wallet.load_from(&future).await, Err(WalletError::Format(_))));

        let mut corrupt = wallet.export_container().await.unwrap();
        corrupt.meta = serde_json::json!({ "privateKey": 5 });
        assert!(matches!(wallet.load_from(&corrupt).await, Err(WalletError::Integrity(_))));

        assert_eq!(
            wallet.address().await.unwrap(),
            Address::from_str(ANVIL_ADDRESS).unwrap()
        );
    }

    #[tokio::test]
    async fn last_load_wins() {
        let wallet = loaded_derived(Arc::new(RecordingTransport::default())).await;
        let fresh = wallet.create().await.unwrap();
        // Creating alone does not touch the slot
        assert_eq!(
            wallet.address().await.unwrap(),
            Address::from_str(ANVIL_ADDRESS).unwrap()
        );

        wallet.load_from(&fresh).await.unwrap();
        assert_eq!(wallet.address().await.unwrap(), fresh.address().unwrap());
    }

    #[tokio::test]
    async fn container_kind_must_match_backend() {
        let derived = derived_wallet(Arc::new(RecordingTransport::default()));
        let data = derived.recover_from_private_key(ANVIL_KEY).await.unwrap();
        let vault = vault_wallet("pw");
        assert!(matches!(vault.load_from(&data).await, Err(WalletError::Format(_))));
    }

    #[tokio::test]
    async fn keystore_round_trip_preserves_address() {
        let wallet = derived_wallet(Arc::new(RecordingTransport::default()));
        let data = wallet.create().await.unwrap();
        let blob = wallet
            .encrypt_to_serialized_keystore(&data, "pass phrase", KeystoreOptions::default())
            .await
            .unwrap();

        let recovered = wallet
            .recover_from_encrypted_keystore(&blob, "pass phrase")
            .await
            .unwrap();
        wallet.load_from(&recovered).await.unwrap();
        assert_eq!(wallet.address().await.unwrap(), data.address().unwrap());
    }

    #[tokio::test]
    async fn recovery_phrase_export() {
        let wallet = loaded_derived(Arc::new(RecordingTransport::default())).await;
        assert!(wallet.export_recovery_phrase().await.unwrap().is_none());
        assert_eq!(wallet.export_private_key().await.unwrap().as_str(), ANVIL_KEY);

        let seeded = wallet.recover_from_seed(HARDHAT_PHRASE).await.unwrap();
        wallet.load_from(&seeded).await.unwrap();
        assert_eq!(
            wallet.export_recovery_phrase().await.unwrap().unwrap().as_str(),
            HARDHAT_PHRASE
        );
    }

    #[tokio::test]
    async fn derived_backend_has_no_pairwise_encryption() {
        let wallet = loaded_derived(Arc::new(RecordingTransport::default())).await;
        assert!(matches!(
            wallet.encrypt(b"x", &format!("0x{}", "09".repeat(32))).await,
            Err(WalletError::NotSupported(_))
        ));
        assert!(matches!(
            wallet.derive_account(1).await,
            Err(WalletError::NotSupported(_))
        ));
    }

    #[tokio::test]
    async fn vault_wallets_exchange_messages() {
        let alice = vault_wallet("alice-pw");
        let bob = vault_wallet("bob-pw");
        alice.load_from(&alice.create().await.unwrap()).await.unwrap();
        bob.load_from(&bob.create().await.unwrap()).await.unwrap();

        let alice_pub = alice.encryption_public_key().await.unwrap();
        let bob_pub = bob.encryption_public_key().await.unwrap();

        let envelope = alice.encrypt(b"settle at 5", &bob_pub).await.unwrap();
        assert_eq!(bob.decrypt(&envelope, &alice_pub).await.unwrap(), b"settle at 5");
    }

    #[tokio::test]
    async fn vault_rejects_private_key_import() {
        let wallet = vault_wallet("pw");
        assert!(matches!(
            wallet.recover_from_private_key(ANVIL_KEY).await,
            Err(WalletError::NotSupported(_))
        ));
    }

    #[tokio::test]
    async fn vault_select_account_changes_signer() {
        let wallet = vault_wallet("pw");
        let data = wallet.recover_from_seed(HARDHAT_PHRASE).await.unwrap();
        wallet.load_from(&data).await.unwrap();
        assert_eq!(
            wallet.address().await.unwrap(),
            Address::from_str(ANVIL_ADDRESS).unwrap()
        );

        let second = wallet.select_account(1).await.unwrap();
        assert_eq!(wallet.address().await.unwrap(), second);
        let exported = wallet.export_container().await.unwrap();
        assert_eq!(exported.meta["accountCount"], 2);
        // The container still records account 0
        assert_eq!(exported.address, ANVIL_ADDRESS);
    }

    #[tokio::test]
    async fn vault_with_wrong_password_cannot_load() {
        let creator = vault_wallet("right");
        let data = creator.create().await.unwrap();
        let intruder = vault_wallet("wrong");
        assert!(matches!(
            intruder.load_from(&data).await,
            Err(WalletError::Integrity(_))
        ));
        assert!(matches!(intruder.address().await, Err(WalletError::NoAccountLoaded)));
    }

    #[tokio::test]
    async fn confirm_fetches_defaults_once_and_submits() {
        let transport = Arc::new(RecordingTransport::with_account(12, 3_000_000_000, 0));
        let wallet = loaded_derived(transport.clone()).await;

        let intent = RawTxIntent::new(Address::repeat_byte(0x44), vec![0xde, 0xad]);
        let id = wallet.confirm(intent).await.unwrap();

        assert_eq!(transport.account_lookups.lock().unwrap().len(), 1);
        assert_eq!(transport.submission_count(), 1);
        let raw = transport.submissions.lock().unwrap()[0].clone();
        assert_eq!(id.0, alloy::primitives::keccak256(&raw).to_string());

        let envelope = TxEnvelope::decode_2718(&mut raw.as_slice()).unwrap();
        let tx = envelope.as_legacy().unwrap().tx();
        assert_eq!(tx.nonce, 12);
        assert_eq!(tx.gas_price, 3_000_000_000);
        assert_eq!(tx.chain_id, Some(1));
    }

    #[tokio::test]
    async fn confirm_with_overrides_skips_lookup() {
        let transport = Arc::new(RecordingTransport::default());
        let wallet = loaded_derived(transport.clone()).await;

        let intent = RawTxIntent::new(Address::repeat_byte(0x44), Bytes::new())
            .with_nonce(0)
            .with_gas_price(1);
        wallet.confirm(intent).await.unwrap();
        assert!(transport.account_lookups.lock().unwrap().is_empty());
        assert_eq!(transport.submission_count(), 1);
    }

    #[tokio::test]
    async fn balance_uses_native_decimals() {
        let transport = Arc::new(RecordingTransport::with_account(
            0,
            1,
            1_500_000_000_000_000_000,
        ));
        let wallet = loaded_derived(transport).await;
        let balance = wallet.get_balance().await.unwrap();
        assert_eq!(balance.value, "1.5");
        assert_eq!(balance.decimals, NATIVE_DECIMALS);

        let infos = wallet.get_tx_infos(Address::repeat_byte(1)).await.unwrap();
        assert_eq!(infos.balance.raw, U256::from(1_500_000_000_000_000_000u64).to_string());
    }

    #[tokio::test]
    async fn transport_failure_propagates() {
        let wallet = loaded_derived(Arc::new(RecordingTransport::default())).await;
        assert!(matches!(wallet.get_balance().await, Err(WalletError::Transport(_))));
    }
}
