// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Exposed signature shape: `{ r, s, v }` plus a compact 65-byte string.

use alloy::primitives::{Address, Signature, B256};
use serde::{Deserialize, Serialize};

use crate::error::{Result, WalletError};

/// An ECDSA signature split the way contracts consume it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureParts {
    /// `0x`-prefixed 32-byte hex
    pub r: String,
    /// `0x`-prefixed 32-byte hex
    pub s: String,
    /// Recovery id in the 27/28 convention
    pub v: u8,
}

impl SignatureParts {
    /// `0x` ‖ r ‖ s ‖ v as a single hex string.
    pub fn compact(&self) -> String {
        format!(
            "0x{}{}{:02x}",
            self.r.trim_start_matches("0x"),
            self.s.trim_start_matches("0x"),
            self.v
        )
    }

    /// `r` as a fixed 32-byte word.
    pub fn r_word(&self) -> Result<B256> {
        parse_word(&self.r)
    }

    /// `s` as a fixed 32-byte word.
    pub fn s_word(&self) -> Result<B256> {
        parse_word(&self.s)
    }

    /// Recover the signer of an already-prefixed 32-byte hash.
    pub fn recover_prehash(&self, prehash: &B256) -> Result<Address> {
        let r = self.r_word()?;
        let s = self.s_word()?;
        let parity = match self.v {
            27 => false,
            28 => true,
            other => {
                return Err(WalletError::InvalidInput(format!(
                    "Invalid recovery id {other}"
                )))
            }
        };
        Signature::from_scalars_and_parity(r, s, parity)
            .recover_address_from_prehash(prehash)
            .map_err(|e| WalletError::InvalidInput(format!("Signature recovery failed: {e}")))
    }
}

impl From<Signature> for SignatureParts {
    fn from(sig: Signature) -> Self {
        Self {
            r: format!("0x{}", alloy::hex::encode(sig.r().to_be_bytes::<32>())),
            s: format!("0x{}", alloy::hex::encode(sig.s().to_be_bytes::<32>())),
            v: 27 + u8::from(sig.v()),
        }
    }
}

fn parse_word(input: &str) -> Result<B256> {
    input
        .parse::<B256>()
        .map_err(|e| WalletError::InvalidInput(format!("Invalid signature word {input}: {e}")))
}
