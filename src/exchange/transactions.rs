// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Raw transaction intents and legacy (EIP-155) transaction signing.
//!
//! Nonce and gas price are caller-suppliable overrides. When either is
//! missing, both defaults come from one [`AccountInfo`] fetch so they are
//! never mixed from different snapshots.

use alloy::consensus::{SignableTransaction, TxEnvelope, TxLegacy};
use alloy::eips::eip2718::Encodable2718;
use alloy::network::TxSignerSync;
use alloy::primitives::{Address, Bytes, TxKind, U256};
use alloy::signers::local::PrivateKeySigner;

use crate::error::{Result, WalletError};
use crate::transport::AccountInfo;

/// Gas limit used when the caller does not set one.
pub const DEFAULT_GAS_LIMIT: u64 = 600_000;

/// A contract call or value transfer waiting to be signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTxIntent {
    /// Destination address
    pub to: Address,
    /// Encoded selector and arguments
    pub data: Bytes,
    /// Value in wei
    pub value: U256,
    pub gas_limit: u64,
    /// Gas price in wei, fetched when `None`
    pub gas_price: Option<u128>,
    /// Fetched when `None`
    pub nonce: Option<u64>,
}

impl RawTxIntent {
    pub fn new(to: Address, data: impl Into<Bytes>) -> Self {
        Self {
            to,
            data: data.into(),
            value: U256::ZERO,
            gas_limit: DEFAULT_GAS_LIMIT,
            gas_price: None,
            nonce: None,
        }
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = gas_limit;
        self
    }

    pub fn with_gas_price(mut self, gas_price: u128) -> Self {
        self.gas_price = Some(gas_price);
        self
    }

    pub fn with_nonce(mut self, nonce: u64) -> Self {
        self.nonce = Some(nonce);
        self
    }

    /// Whether signing needs a fresh [`AccountInfo`].
    pub fn needs_account_info(&self) -> bool {
        self.nonce.is_none() || self.gas_price.is_none()
    }

    /// Build the unsigned legacy transaction.
    ///
    /// # Arguments
    /// * `info` - Fetched account state, required when [`Self::needs_account_info`]
    /// * `chain_id` - EIP-155 replay protection
    pub fn into_legacy(self, info: Option<&AccountInfo>, chain_id: u64) -> Result<TxLegacy> {
        let missing = || {
            WalletError::InvalidInput("Nonce and gas price need account info".to_string())
        };
        let nonce = match self.nonce {
            Some(nonce) => nonce,
            None => info.ok_or_else(missing)?.nonce,
        };
        let gas_price = match self.gas_price {
            Some(price) => price,
            None => info.ok_or_else(missing)?.fee_estimate,
        };

        Ok(TxLegacy {
            chain_id: Some(chain_id),
            nonce,
            gas_price,
            gas_limit: self.gas_limit,
            to: TxKind::Call(self.to),
            value: self.value,
            input: self.data,
        })
    }
}

/// Sign `tx` and return its EIP-2718 (RLP) encoding.
pub fn sign_legacy(signer: &PrivateKeySigner, mut tx: TxLegacy) -> Result<Vec<u8>> {
    let signature = signer
        .sign_transaction_sync(&mut tx)
        .map_err(|e| WalletError::Generation(format!("transaction signing failed: {e}")))?;
    let envelope = TxEnvelope::Legacy(tx.into_signed(signature));
    Ok(envelope.encoded_2718())
}
