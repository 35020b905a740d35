// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Exchange orders as a typestate pipeline.
//!
//! ```text
//! DraftOrder --apply_fees--> PricedOrder --hash--> HashedOrder --attach_signature--> SignedOrder
//! ```
//!
//! The digest is keccak-256 over the packed encoding of twelve fields, in
//! this exact order: exchange, maker, taker, makerToken, takerToken,
//! feeRecipient (addresses), makerAmount, takerAmount, makerFee, takerFee,
//! expiration, salt (uint256). "Any taker" and "no fee recipient" encode as
//! the zero address.

use alloy::primitives::{Address, B256, U256};
use serde::Serialize;

use super::routes::{FeeSchedule, OrderFees};
use crate::amount::Amount;
use crate::error::Result;
use crate::hashing::{keccak_packed, PackedField};
use crate::wallet::SignatureParts;

/// Order terms before fees are known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftOrder {
    pub exchange: Address,
    pub maker: Address,
    /// `None` lets anyone fill
    pub taker: Option<Address>,
    pub maker_token: Address,
    pub taker_token: Address,
    pub fee_recipient: Option<Address>,
    pub maker_amount: Amount,
    pub taker_amount: Amount,
    /// Unix seconds
    pub expiration: u64,
    pub salt: U256,
}

impl DraftOrder {
    /// Price the order. Zero fees are still explicit fee amounts.
    pub fn apply_fees(self, schedule: &dyn FeeSchedule) -> Result<PricedOrder> {
        let fees = schedule.fees_for(&self.maker_amount, &self.taker_amount)?;
        Ok(PricedOrder {
            order: Order::from_parts(self, fees),
        })
    }
}

/// Complete order terms, the input of the hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub exchange: Address,
    pub maker: Address,
    pub taker: Option<Address>,
    pub maker_token: Address,
    pub taker_token: Address,
    pub fee_recipient: Option<Address>,
    pub maker_amount: Amount,
    pub taker_amount: Amount,
    pub maker_fee: Amount,
    pub taker_fee: Amount,
    pub expiration: u64,
    pub salt: U256,
}

impl Order {
    fn from_parts(draft: DraftOrder, fees: OrderFees) -> Self {
        Self {
            exchange: draft.exchange,
            maker: draft.maker,
            taker: draft.taker,
            maker_token: draft.maker_token,
            taker_token: draft.taker_token,
            fee_recipient: draft.fee_recipient,
            maker_amount: draft.maker_amount,
            taker_amount: draft.taker_amount,
            maker_fee: fees.maker_fee,
            taker_fee: fees.taker_fee,
            expiration: draft.expiration,
            salt: draft.salt,
        }
    }

    /// `[maker, taker, makerToken, takerToken, feeRecipient]` as the contract takes them.
    pub fn order_addresses(&self) -> [Address; 5] {
        [
            self.maker,
            self.taker.unwrap_or(Address::ZERO),
            self.maker_token,
            self.taker_token,
            self.fee_recipient.unwrap_or(Address::ZERO),
        ]
    }

    /// `[makerAmount, takerAmount, makerFee, takerFee, expiration, salt]`.
    pub fn order_values(&self) -> Result<[U256; 6]> {
        Ok([
            self.maker_amount.raw_value()?,
            self.taker_amount.raw_value()?,
            self.maker_fee.raw_value()?,
            self.taker_fee.raw_value()?,
            U256::from(self.expiration),
            self.salt,
        ])
    }

    /// The twelve hashed fields in contract order.
    pub fn packed_fields(&self) -> Result<[PackedField; 12]> {
        let [maker, taker, maker_token, taker_token, fee_recipient] = self.order_addresses();
        let [maker_amount, taker_amount, maker_fee, taker_fee, expiration, salt] =
            self.order_values()?;

        Ok([
            PackedField::Address(self.exchange),
            PackedField::Address(maker),
            PackedField::Address(taker),
            PackedField::Address(maker_token),
            PackedField::Address(taker_token),
            PackedField::Address(fee_recipient),
            PackedField::Uint256(maker_amount),
            PackedField::Uint256(taker_amount),
            PackedField::Uint256(maker_fee),
            PackedField::Uint256(taker_fee),
            PackedField::Uint256(expiration),
            PackedField::Uint256(salt),
        ])
    }

    pub fn order_hash(&self) -> Result<B256> {
        Ok(keccak_packed(&self.packed_fields()?))
    }
}

/// Order with fees applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedOrder {
    order: Order,
}

impl PricedOrder {
    pub fn order(&self) -> &Order {
        &self.order
    }

    pub fn hash(self) -> Result<HashedOrder> {
        let hash = self.order.order_hash()?;
        Ok(HashedOrder {
            order: self.order,
            hash,
        })
    }
}

/// Order with its digest computed, ready to sign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashedOrder {
    order: Order,
    hash: B256,
}

impl HashedOrder {
    pub fn order(&self) -> &Order {
        &self.order
    }

    pub fn hash(&self) -> B256 {
        self.hash
    }

    /// Attach the maker's signature over [`Self::hash`].
    pub fn attach_signature(self, signature: SignatureParts) -> SignedOrder {
        SignedOrder {
            order: self.order,
            hash: self.hash,
            signature,
        }
    }
}

/// Immutable signed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedOrder {
    order: Order,
    hash: B256,
    signature: SignatureParts,
}

impl SignedOrder {
    pub fn order(&self) -> &Order {
        &self.order
    }

    pub fn hash(&self) -> B256 {
        self.hash
    }

    pub fn signature(&self) -> &SignatureParts {
        &self.signature
    }

    /// Relay payload. Amounts are raw integer strings.
    pub fn to_relay_payload(&self) -> RelayOrder {
        let order = &self.order;
        let [maker, taker, maker_token, taker_token, fee_recipient] = order.order_addresses();
        RelayOrder {
            exchange_contract_address: order.exchange,
            maker,
            taker,
            maker_token_address: maker_token,
            taker_token_address: taker_token,
            fee_recipient,
            maker_token_amount: order.maker_amount.raw.clone(),
            taker_token_amount: order.taker_amount.raw.clone(),
            maker_fee: order.maker_fee.raw.clone(),
            taker_fee: order.taker_fee.raw.clone(),
            expiration_unix_timestamp_sec: order.expiration.to_string(),
            salt: order.salt.to_string(),
            ec_signature: self.signature.clone(),
            order_hash: self.hash,
        }
    }
}

/// A signed order the relay accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedOrder {
    signed: SignedOrder,
}

impl SubmittedOrder {
    pub(crate) fn new(signed: SignedOrder) -> Self {
        Self { signed }
    }

    pub fn signed(&self) -> &SignedOrder {
        &self.signed
    }
}

/// Wire shape of `POST exchange/order`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayOrder {
    pub exchange_contract_address: Address,
    pub maker: Address,
    pub taker: Address,
    pub maker_token_address: Address,
    pub taker_token_address: Address,
    pub fee_recipient: Address,
    pub maker_token_amount: String,
    pub taker_token_amount: String,
    pub maker_fee: String,
    pub taker_fee: String,
    pub expiration_unix_timestamp_sec: String,
    pub salt: String,
    pub ec_signature: SignatureParts,
    pub order_hash: B256,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::str::FromStr;

    use super::*;
    use crate::amount::to_amount;

    pub const MAKER: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
    pub const REFERENCE_HASH: &str =
        "0xfd95992a1d44af3aebb21dc33fc3dc63c6dbbdb9fb9453abe4ab6f26784c3e2c";

    /// 100 maker tokens (2 decimals) for 50 taker tokens (4 decimals), no fees.
    pub fn reference_draft() -> DraftOrder {
        DraftOrder {
            exchange: Address::repeat_byte(0x11),
            maker: Address::from_str(MAKER).unwrap(),
            taker: None,
            maker_token: Address::repeat_byte(0x22),
            taker_token: Address::repeat_byte(0x33),
            fee_recipient: None,
            maker_amount: to_amount(U256::from(10_000u64), 2),
            taker_amount: to_amount(U256::from(500_000u64), 4),
            expiration: 2_524_604_400,
            salt: U256::from(42u64),
        }
    }
}
