// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Prints a freshly generated wallet container as JSON.
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `WALLET_KIND` | `derived` or `vault` | `derived` |
//! | `VAULT_PASSWORD` | Password sealing a new vault | Required for `vault` |
//!
//! Everything in [`relay_signer::config`] applies as well.

use std::env;
use std::sync::Arc;

use relay_signer::config::{init_tracing, ClientConfig};
use relay_signer::{RelayClient, Wallet, WalletError, WalletKind};

const WALLET_KIND_ENV: &str = "WALLET_KIND";
const VAULT_PASSWORD_ENV: &str = "VAULT_PASSWORD";

#[tokio::main]
async fn main() -> Result<(), WalletError> {
    init_tracing();

    let config = ClientConfig::from_env()?;
    let kind = match env::var(WALLET_KIND_ENV) {
        Ok(tag) => WalletKind::from_tag(&tag)?,
        Err(_) => WalletKind::Derived,
    };

    let transport = Arc::new(RelayClient::new(&config.relay_url, config.relay_timeout)?);
    let wallet = match kind {
        WalletKind::Derived => Wallet::derived(transport, config.chain_id),
        WalletKind::Vault => {
            let password = env::var(VAULT_PASSWORD_ENV).map_err(|_| {
                WalletError::InvalidInput(format!("{VAULT_PASSWORD_ENV} is required for vaults"))
            })?;
            Wallet::vault(transport, config.chain_id, &password)
        }
    }
    .with_keystore_params(config.keystore)
    .with_vault_params(config.vault);

    tracing::info!(kind = kind.tag(), chain_id = config.chain_id, "Generating wallet");
    let data = wallet.create().await?;
    println!("{}", data.to_json()?);
    Ok(())
}
