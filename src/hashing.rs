// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Tightly packed keccak-256 hashing of typed fields.
//!
//! Reproduces Solidity's `keccak256(abi.encodePacked(...))` for the two
//! static types the exchange contract hashes: `address` (20 bytes) and
//! `uint256` (32 bytes, big-endian). Fields are concatenated in the given
//! order with no padding and no separators.
//!
//! Integers are kept as full-width [`U256`] values end to end; nothing is
//! routed through floating point.

use std::str::FromStr;

use alloy::primitives::{keccak256, Address, B256, U256};

use crate::error::{Result, WalletError};

/// One typed field of a packed hash preimage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackedField {
    Address(Address),
    Uint256(U256),
}

impl PackedField {
    /// Parse a `(value, solidity type)` pair.
    ///
    /// Only `address` and `uint256` are accepted. `uint256` values are
    /// decimal strings, or hex with a `0x` prefix.
    pub fn parse(value: &str, solidity_type: &str) -> Result<Self> {
        match solidity_type {
            "address" => Address::from_str(value)
                .map(PackedField::Address)
                .map_err(|e| WalletError::InvalidInput(format!("Invalid address {value}: {e}"))),
            "uint256" => {
                let parsed = match value.strip_prefix("0x") {
                    Some(hex) => U256::from_str_radix(hex, 16),
                    None => U256::from_str_radix(value, 10),
                };
                parsed
                    .map(PackedField::Uint256)
                    .map_err(|e| WalletError::InvalidInput(format!("Invalid uint256 {value}: {e}")))
            }
            other => Err(WalletError::InvalidInput(format!(
                "Unsupported packed type: {other}"
            ))),
        }
    }

    /// Solidity type name of this field.
    pub fn solidity_type(&self) -> &'static str {
        match self {
            PackedField::Address(_) => "address",
            PackedField::Uint256(_) => "uint256",
        }
    }

    /// Width of the packed encoding in bytes.
    pub fn packed_len(&self) -> usize {
        match self {
            PackedField::Address(_) => 20,
            PackedField::Uint256(_) => 32,
        }
    }

    fn encode_into(&self, out: &mut Vec<u8>) {
        match self {
            PackedField::Address(address) => out.extend_from_slice(address.as_slice()),
            PackedField::Uint256(value) => out.extend_from_slice(&value.to_be_bytes::<32>()),
        }
    }
}

/// Concatenate the packed encodings in declaration order.
pub fn encode_packed(fields: &[PackedField]) -> Vec<u8> {
    let mut out = Vec::with_capacity(fields.iter().map(PackedField::packed_len).sum());
    for field in fields {
        field.encode_into(&mut out);
    }
    out
}

/// keccak-256 over the packed encoding of `fields`.
pub fn keccak_packed(fields: &[PackedField]) -> B256 {
    keccak256(encode_packed(fields))
}

/// Hash `(value, solidity type)` pairs in the given order.
///
/// Fails with [`WalletError::InvalidInput`] on the first field that does not
/// parse as its declared type.
pub fn hash_typed(fields: &[(&str, &str)]) -> Result<B256> {
    let parsed = fields
        .iter()
        .map(|(value, solidity_type)| PackedField::parse(value, solidity_type))
        .collect::<Result<Vec<_>>>()?;
    Ok(keccak_packed(&parsed))
}

/// Parse a 32-byte digest from hex (with or without `0x`).
pub fn parse_digest(input: &str) -> Result<B256> {
    let trimmed = input.strip_prefix("0x").unwrap_or(input);
    if trimmed.len() != 64 {
        return Err(WalletError::InvalidInput(format!(
            "Digest must be 32 bytes, got {} hex characters",
            trimmed.len()
        )));
    }
    B256::from_str(trimmed).map_err(|e| WalletError::InvalidInput(format!("Invalid digest: {e}")))
}
