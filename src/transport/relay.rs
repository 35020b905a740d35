// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HTTP client for the trustline relay server.

use std::time::Duration;

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use url::Url;

use super::{AccountInfo, TransactionId, Transport};
use crate::error::{Result, WalletError};

/// Relay response for `users/{address}/txinfos`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TxInfosResponse {
    nonce: u64,
    gas_price: String,
    balance: String,
}

/// Relay server client with a per-request timeout.
#[derive(Debug, Clone)]
pub struct RelayClient {
    base_url: Url,
    http: reqwest::Client,
}

impl RelayClient {
    /// Create a client for the relay API rooted at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        // Trailing slash so `join` appends instead of replacing the last segment
        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalized)
            .map_err(|e| WalletError::InvalidInput(format!("Invalid relay URL: {e}")))?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WalletError::Transport(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { base_url, http })
    }

    /// Resolve a relay path against the base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| WalletError::InvalidInput(format!("Invalid relay path {path}: {e}")))
    }

    async fn read_json(response: reqwest::Response) -> Result<serde_json::Value> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WalletError::Transport(format!(
                "Relay returned {status}: {body}"
            )));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl Transport for RelayClient {
    async fn fetch(&self, path: &str) -> Result<serde_json::Value> {
        let url = self.endpoint(path)?;
        tracing::debug!(%url, "GET relay");
        let response = self.http.get(url).send().await?;
        Self::read_json(response).await
    }

    async fn post(&self, path: &str, payload: &serde_json::Value) -> Result<serde_json::Value> {
        let url = self.endpoint(path)?;
        tracing::debug!(%url, "POST relay");
        let response = self.http.post(url).json(payload).send().await?;
        Self::read_json(response).await
    }

    async fn submit_signed_transaction(&self, raw: &[u8]) -> Result<TransactionId> {
        let payload = json!({ "rawTransaction": format!("0x{}", alloy::hex::encode(raw)) });
        let body = self.post("relay", &payload).await?;

        // The relay answers with the bare hash as a JSON string
        match body {
            serde_json::Value::String(hash) => Ok(TransactionId(hash)),
            other => Err(WalletError::Transport(format!(
                "Unexpected relay response: {other}"
            ))),
        }
    }

    async fn get_account_info(&self, address: Address) -> Result<AccountInfo> {
        let body = self.fetch(&format!("users/{address}/txinfos")).await?;
        let infos: TxInfosResponse = serde_json::from_value(body)
            .map_err(|e| WalletError::Transport(format!("Malformed txinfos response: {e}")))?;

        let fee_estimate = infos
            .gas_price
            .parse::<u128>()
            .map_err(|e| WalletError::Transport(format!("Malformed gas price: {e}")))?;
        let balance_raw = U256::from_str_radix(&infos.balance, 10)
            .map_err(|e| WalletError::Transport(format!("Malformed balance: {e}")))?;

        Ok(AccountInfo {
            nonce: infos.nonce,
            fee_estimate,
            balance_raw,
        })
    }
}
