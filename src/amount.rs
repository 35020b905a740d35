// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Decimal-aware token amounts.
//!
//! An [`Amount`] carries the raw on-chain integer next to its display value
//! so hashing and submission can always use the raw form.

use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

use crate::error::{Result, WalletError};

/// Amount triple: display value, raw integer string, decimal count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    /// Human-readable value (e.g. "1.5")
    pub value: String,
    /// Integer amount in the token's smallest unit, base 10
    pub raw: String,
    /// Number of decimals used to build `value`
    pub decimals: u8,
}

impl Amount {
    /// Explicit zero for the given decimals.
    pub fn zero(decimals: u8) -> Self {
        to_amount(U256::ZERO, decimals)
    }

    /// Parse the raw field back into an integer.
    pub fn raw_value(&self) -> Result<U256> {
        U256::from_str_radix(&self.raw, 10)
            .map_err(|e| WalletError::InvalidInput(format!("Invalid raw amount {}: {e}", self.raw)))
    }

    pub fn is_zero(&self) -> bool {
        self.raw.trim_start_matches('0').is_empty()
    }
}

/// Build an [`Amount`] from a raw integer and decimals.
pub fn to_amount(raw: U256, decimals: u8) -> Amount {
    Amount {
        value: format_amount(raw, decimals),
        raw: raw.to_string(),
        decimals,
    }
}

/// Parse a human-readable amount to its raw integer form.
///
/// # Arguments
/// * `value` - Amount as a string (e.g., "1.5")
/// * `decimals` - Number of decimals of the token
///
/// # Returns
/// * `Ok(U256)` - Amount in smallest unit
/// * `Err(WalletError::InvalidInput)` - Malformed value, too many decimals or overflow
pub fn to_raw(value: &str, decimals: u8) -> Result<U256> {
    let value = value.trim();
    let parts: Vec<&str> = value.split('.').collect();

    if parts.len() > 2 || parts.iter().all(|p| p.is_empty()) {
        return Err(WalletError::InvalidInput(format!(
            "Invalid amount format: {value}"
        )));
    }

    let whole_str = if parts[0].is_empty() { "0" } else { parts[0] };
    if !whole_str.bytes().all(|b| b.is_ascii_digit()) {
        return Err(WalletError::InvalidInput(format!(
            "Invalid whole number: {value}"
        )));
    }
    let whole = U256::from_str_radix(whole_str, 10)
        .map_err(|_| WalletError::InvalidInput(format!("Invalid whole number: {value}")))?;

    let decimal_part = if parts.len() == 2 {
        let dec_str = parts[1];
        if dec_str.len() > decimals as usize {
            return Err(WalletError::InvalidInput(format!(
                "Too many decimal places (max {decimals})"
            )));
        }
        if !dec_str.bytes().all(|b| b.is_ascii_digit()) {
            return Err(WalletError::InvalidInput(format!("Invalid decimal: {value}")));
        }
        // Pad with zeros to match decimals
        let padded = format!("{:0<width$}", dec_str, width = decimals as usize);
        if padded.is_empty() {
            U256::ZERO
        } else {
            U256::from_str_radix(&padded, 10)
                .map_err(|_| WalletError::InvalidInput(format!("Invalid decimal: {value}")))?
        }
    } else {
        U256::ZERO
    };

    let scaled_whole = if whole.is_zero() {
        Some(U256::ZERO)
    } else {
        unit(decimals).and_then(|multiplier| whole.checked_mul(multiplier))
    };
    scaled_whole
        .and_then(|w| w.checked_add(decimal_part))
        .ok_or_else(|| WalletError::InvalidInput("Amount overflow".to_string()))
}

/// `10^decimals`, or `None` past the 256-bit range (decimals >= 78).
fn unit(decimals: u8) -> Option<U256> {
    U256::from(10u64).checked_pow(U256::from(decimals))
}

/// Format a raw integer to a human-readable amount, without truncation.
pub fn format_amount(amount: U256, decimals: u8) -> String {
    if amount.is_zero() {
        return "0".to_string();
    }

    // Without a representable divisor every amount is below one whole unit
    let (whole, remainder) = match unit(decimals) {
        Some(divisor) => (amount / divisor, amount % divisor),
        None => (U256::ZERO, amount),
    };

    if remainder.is_zero() {
        whole.to_string()
    } else {
        let decimal_str = format!("{:0>width$}", remainder.to_string(), width = decimals as usize);
        let trimmed = decimal_str.trim_end_matches('0');
        format!("{}.{}", whole, trimmed)
    }
}
