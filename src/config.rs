// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Environment variable names, defaults and the [`ClientConfig`] built from
//! them.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `RELAY_URL` | Relay API base URL | `http://localhost:5000/api/v1` |
//! | `RELAY_TIMEOUT_SECS` | Per-request relay timeout | `30` |
//! | `CHAIN_ID` | EIP-155 chain id for signed transactions | `1` |
//! | `EXCHANGE_ADDRESS` | Trustlines exchange contract | Required for exchange use |
//! | `KEYSTORE_PBKDF2_ITERATIONS` | PBKDF2 rounds for new keystores | `262144` |
//! | `VAULT_ARGON2_M_COST` | Argon2id memory cost (KiB) for new vaults | `65536` |
//! | `VAULT_ARGON2_T_COST` | Argon2id passes for new vaults | `3` |
//! | `VAULT_ARGON2_P_COST` | Argon2id lanes for new vaults | `1` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |

use std::str::FromStr;
use std::time::Duration;

use alloy::primitives::Address;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::{Result, WalletError};
use crate::wallet::{Argon2Params, KeystoreParams, VaultParams};

/// Environment variable name for the relay API base URL.
pub const RELAY_URL_ENV: &str = "RELAY_URL";

/// Environment variable name for the relay request timeout in seconds.
pub const RELAY_TIMEOUT_SECS_ENV: &str = "RELAY_TIMEOUT_SECS";

/// Environment variable name for the chain id.
pub const CHAIN_ID_ENV: &str = "CHAIN_ID";

/// Environment variable name for the exchange contract address.
///
/// # Default
/// None. Only the wallet is usable without it.
pub const EXCHANGE_ADDRESS_ENV: &str = "EXCHANGE_ADDRESS";

/// Environment variable name for the keystore PBKDF2 iteration count.
pub const KEYSTORE_PBKDF2_ITERATIONS_ENV: &str = "KEYSTORE_PBKDF2_ITERATIONS";

/// Environment variable names for the vault Argon2id costs.
pub const VAULT_ARGON2_M_COST_ENV: &str = "VAULT_ARGON2_M_COST";
pub const VAULT_ARGON2_T_COST_ENV: &str = "VAULT_ARGON2_T_COST";
pub const VAULT_ARGON2_P_COST_ENV: &str = "VAULT_ARGON2_P_COST";

/// Environment variable name for the log output format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_RELAY_URL: &str = "http://localhost:5000/api/v1";
pub const DEFAULT_RELAY_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CHAIN_ID: u64 = 1;

/// Client settings resolved from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub relay_url: String,
    pub relay_timeout: Duration,
    pub chain_id: u64,
    pub exchange_address: Option<Address>,
    pub keystore: KeystoreParams,
    pub vault: VaultParams,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            relay_url: DEFAULT_RELAY_URL.to_string(),
            relay_timeout: Duration::from_secs(DEFAULT_RELAY_TIMEOUT_SECS),
            chain_id: DEFAULT_CHAIN_ID,
            exchange_address: None,
            keystore: KeystoreParams::default(),
            vault: VaultParams::default(),
        }
    }
}

impl ClientConfig {
    /// Read the configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through `lookup`, unset variables keep defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let argon2 = Argon2Params {
            m_cost: parse_or(&lookup, VAULT_ARGON2_M_COST_ENV, defaults.vault.argon2.m_cost)?,
            t_cost: parse_or(&lookup, VAULT_ARGON2_T_COST_ENV, defaults.vault.argon2.t_cost)?,
            p_cost: parse_or(&lookup, VAULT_ARGON2_P_COST_ENV, defaults.vault.argon2.p_cost)?,
        };

        let iterations = parse_or(
            &lookup,
            KEYSTORE_PBKDF2_ITERATIONS_ENV,
            defaults.keystore.iterations,
        )?;
        if iterations == 0 {
            return Err(WalletError::InvalidInput(format!(
                "{KEYSTORE_PBKDF2_ITERATIONS_ENV} must be positive"
            )));
        }

        Ok(Self {
            relay_url: lookup(RELAY_URL_ENV).unwrap_or(defaults.relay_url),
            relay_timeout: Duration::from_secs(parse_or(
                &lookup,
                RELAY_TIMEOUT_SECS_ENV,
                DEFAULT_RELAY_TIMEOUT_SECS,
            )?),
            chain_id: parse_or(&lookup, CHAIN_ID_ENV, DEFAULT_CHAIN_ID)?,
            exchange_address: lookup(EXCHANGE_ADDRESS_ENV)
                .map(|value| parse_value::<Address>(EXCHANGE_ADDRESS_ENV, &value))
                .transpose()?,
            keystore: KeystoreParams { iterations },
            vault: VaultParams { argon2 },
        })
    }

    /// The exchange address, or an error naming the missing variable.
    pub fn require_exchange_address(&self) -> Result<Address> {
        self.exchange_address.ok_or_else(|| {
            WalletError::InvalidInput(format!("{EXCHANGE_ADDRESS_ENV} is not set"))
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(value) => parse_value(name, &value),
        None => Ok(default),
    }
}

fn parse_value<T>(name: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| WalletError::InvalidInput(format!("Invalid {name} `{value}`: {e}")))
}

/// Install the global tracing subscriber.
///
/// `LOG_FORMAT=json` selects JSON lines, anything else the pretty formatter.
/// The filter comes from `RUST_LOG` and defaults to `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var(LOG_FORMAT_ENV)
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().pretty()).init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.keystore.iterations, 262_144);
        assert_eq!(config.vault.argon2.m_cost, 65_536);
        assert!(config.require_exchange_address().is_err());
    }

    #[test]
    fn overrides_are_parsed() {
        let config = ClientConfig::from_lookup(lookup(&[
            (RELAY_URL_ENV, "https://relay.example/api/v1"),
            (RELAY_TIMEOUT_SECS_ENV, "5"),
            (CHAIN_ID_ENV, "4660"),
            (EXCHANGE_ADDRESS_ENV, "0x1111111111111111111111111111111111111111"),
            (KEYSTORE_PBKDF2_ITERATIONS_ENV, "1000"),
            (VAULT_ARGON2_T_COST_ENV, " 2 "),
        ]))
        .unwrap();

        assert_eq!(config.relay_url, "https://relay.example/api/v1");
        assert_eq!(config.relay_timeout, Duration::from_secs(5));
        assert_eq!(config.chain_id, 4660);
        assert_eq!(
            config.require_exchange_address().unwrap(),
            Address::repeat_byte(0x11)
        );
        assert_eq!(config.keystore.iterations, 1_000);
        assert_eq!(config.vault.argon2.t_cost, 2);
        assert_eq!(config.vault.argon2.p_cost, 1);
    }

    #[test]
    fn invalid_values_are_rejected() {
        for vars in [
            [(CHAIN_ID_ENV, "mainnet")],
            [(EXCHANGE_ADDRESS_ENV, "0x1234")],
            [(KEYSTORE_PBKDF2_ITERATIONS_ENV, "0")],
            [(VAULT_ARGON2_M_COST_ENV, "-1")],
        ] {
            assert!(matches!(
                ClientConfig::from_lookup(lookup(&vars)),
                Err(WalletError::InvalidInput(_))
            ));
        }
    }
}
