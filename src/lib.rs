// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Relay Signer - Signing and key-custody core for trustline relay clients
//!
//! Produces contract-verifiable signatures over exchange orders and
//! transactions, and keeps key material in one of two backends.
//!
//! ## Modules
//!
//! - `hashing` - Packed keccak-256 hashing of typed fields
//! - `wallet` - Derived-key and vault backends behind a single active slot
//! - `exchange` - Order typestate, fills and cancellations
//! - `transport` - Relay transport boundary and HTTP client
//! - `amount` - Decimal-aware amount triples
//! - `config` - Environment configuration and tracing setup

pub mod amount;
pub mod config;
pub mod error;
pub mod exchange;
pub mod hashing;
pub mod transport;
pub mod wallet;

pub use amount::Amount;
pub use config::ClientConfig;
pub use error::{Result, WalletError};
pub use exchange::Exchange;
pub use transport::{RelayClient, Transport};
pub use wallet::{SignatureParts, Wallet, WalletData, WalletKind};
