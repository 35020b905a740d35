// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Error taxonomy shared by both wallet backends and the exchange assembler.
//!
//! Every fallible operation returns exactly one of these variants. Messages
//! never carry key material, seeds or passwords.

use alloy::primitives::Address;

/// Errors surfaced by wallet, hashing and exchange operations.
#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    /// The operation needs an active account and none is loaded.
    #[error("No account loaded")]
    NoAccountLoaded,

    /// Unknown container tag or a version outside the accepted set.
    #[error("Unsupported wallet format: {0}")]
    Format(String),

    /// Corrupt or unparseable payload, wrong password, or address mismatch.
    #[error("Integrity check failed: {0}")]
    Integrity(String),

    /// Malformed digest, address, amount or other caller input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A required trustline path is missing for one leg of a fill.
    #[error("No route found for token {token} from {from} to {to}")]
    RouteNotFound {
        token: Address,
        from: Address,
        to: Address,
    },

    /// The active backend does not implement this capability.
    #[error("Not supported by this wallet backend: {0}")]
    NotSupported(&'static str),

    /// Failure reported by the relay transport. Never retried here.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Entropy or key-derivation failure.
    #[error("Key generation failed: {0}")]
    Generation(String),
}

impl From<serde_json::Error> for WalletError {
    fn from(e: serde_json::Error) -> Self {
        WalletError::Integrity(format!("malformed JSON: {e}"))
    }
}

impl From<reqwest::Error> for WalletError {
    fn from(e: reqwest::Error) -> Self {
        WalletError::Transport(e.to_string())
    }
}

/// Result type for wallet operations.
pub type Result<T> = std::result::Result<T, WalletError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_errors_map_to_integrity() {
        let err: WalletError = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert!(matches!(err, WalletError::Integrity(_)));
    }

    #[test]
    fn route_not_found_names_the_leg() {
        let err = WalletError::RouteNotFound {
            token: Address::repeat_byte(0x11),
            from: Address::repeat_byte(0x22),
            to: Address::repeat_byte(0x33),
        };
        let text = err.to_string();
        assert!(text.contains("0x1111111111111111111111111111111111111111"));
        assert!(text.contains("0x2222222222222222222222222222222222222222"));
    }
}
