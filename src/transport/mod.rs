// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Relay transport boundary.
//!
//! The signing core never talks HTTP directly: balances, nonces, fee
//! estimates and submissions all go through a [`Transport`]. Implementations
//! own timeouts and cancellation; this crate surfaces their failures as
//! [`WalletError::Transport`](crate::error::WalletError::Transport) and never
//! retries.

pub mod relay;

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use relay::RelayClient;

/// Identifier returned by the relay for an accepted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(pub String);

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Nonce, fee estimate and balance of an account, fetched in one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountInfo {
    /// Next nonce to use
    pub nonce: u64,
    /// Gas price estimate in wei
    pub fee_estimate: u128,
    /// Native balance in wei
    pub balance_raw: U256,
}

/// Request/response functions exposed by the relay server.
#[async_trait]
pub trait Transport: Send + Sync {
    /// `GET` a relay path and return the JSON body.
    async fn fetch(&self, path: &str) -> Result<serde_json::Value>;

    /// `POST` a JSON payload to a relay path.
    async fn post(&self, path: &str, payload: &serde_json::Value) -> Result<serde_json::Value>;

    /// Hand a signed, RLP-encoded transaction to the relay.
    async fn submit_signed_transaction(&self, raw: &[u8]) -> Result<TransactionId>;

    /// Nonce, gas price and balance for `address` from the same source.
    async fn get_account_info(&self, address: Address) -> Result<AccountInfo>;
}
