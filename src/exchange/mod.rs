// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Order and transaction assembler for the trustlines exchange.
//!
//! Off-chain orders go through [`order`]'s typestate pipeline and are posted
//! to the relay. Fills and cancellations become contract calls signed by the
//! active wallet account. A fill resolves a trustline route for both legs
//! first; nothing is signed when either leg has no path.

pub mod contract;
pub mod order;
pub mod routes;
pub mod transactions;

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, U256};
use alloy::sol_types::SolCall;

use crate::amount::{to_amount, to_raw, Amount};
use crate::error::{Result, WalletError};
use crate::transport::TransactionId;
use crate::wallet::{crypto, Wallet};

use contract::IExchange;
use order::{DraftOrder, Order, PricedOrder, SignedOrder, SubmittedOrder};
use routes::{FeeSchedule, Route, RouteFinder, ZeroFees};
use transactions::RawTxIntent;

/// Gas of a fill excluding the two token transfers.
pub const FILL_BASE_GAS: u64 = 120_000;

/// Gas limit of an on-chain cancellation.
pub const CANCEL_GAS: u64 = 100_000;

/// Lifetime of an order when no expiration is given.
pub const DEFAULT_ORDER_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// One side of an order: token, human-readable amount, token decimals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSide {
    pub token: Address,
    pub value: String,
    pub decimals: u8,
}

impl OrderSide {
    pub fn new(token: Address, value: impl Into<String>, decimals: u8) -> Self {
        Self {
            token,
            value: value.into(),
            decimals,
        }
    }
}

/// Optional order terms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderOptions {
    /// Restrict filling to one address
    pub taker: Option<Address>,
    pub fee_recipient: Option<Address>,
    /// Unix seconds, defaults to now + [`DEFAULT_ORDER_TTL`]
    pub expiration: Option<u64>,
    /// Random 256-bit salt when `None`
    pub salt: Option<U256>,
}

/// Assembles, signs and submits exchange orders for the wallet's active account.
pub struct Exchange {
    wallet: Arc<Wallet>,
    routes: Arc<dyn RouteFinder>,
    fees: Arc<dyn FeeSchedule>,
    address: Address,
    order_ttl: Duration,
}

impl Exchange {
    pub fn new(wallet: Arc<Wallet>, routes: Arc<dyn RouteFinder>, address: Address) -> Self {
        Self {
            wallet,
            routes,
            fees: Arc::new(ZeroFees),
            address,
            order_ttl: DEFAULT_ORDER_TTL,
        }
    }

    pub fn with_fee_schedule(mut self, fees: Arc<dyn FeeSchedule>) -> Self {
        self.fees = fees;
        self
    }

    pub fn with_order_ttl(mut self, ttl: Duration) -> Self {
        self.order_ttl = ttl;
        self
    }

    /// Exchange contract address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Draft an order from the active account and apply fees.
    pub async fn make_order(
        &self,
        maker_side: OrderSide,
        taker_side: OrderSide,
        options: OrderOptions,
    ) -> Result<PricedOrder> {
        let maker = self.wallet.address().await?;
        let maker_amount = to_amount(to_raw(&maker_side.value, maker_side.decimals)?, maker_side.decimals);
        let taker_amount = to_amount(to_raw(&taker_side.value, taker_side.decimals)?, taker_side.decimals);
        if maker_amount.is_zero() || taker_amount.is_zero() {
            return Err(WalletError::InvalidInput(
                "Order amounts must be positive".to_string(),
            ));
        }

        let expiration = match options.expiration {
            Some(expiration) => expiration,
            None => self.default_expiration()?,
        };
        let salt = match options.salt {
            Some(salt) => salt,
            None => U256::from_be_bytes(crypto::random_bytes::<32>()?),
        };

        let draft = DraftOrder {
            exchange: self.address,
            maker,
            taker: options.taker,
            maker_token: maker_side.token,
            taker_token: taker_side.token,
            fee_recipient: options.fee_recipient,
            maker_amount,
            taker_amount,
            expiration,
            salt,
        };
        draft.apply_fees(self.fees.as_ref())
    }

    fn default_expiration(&self) -> Result<u64> {
        let ttl = chrono::Duration::from_std(self.order_ttl)
            .map_err(|e| WalletError::InvalidInput(format!("Invalid order TTL: {e}")))?;
        let expires_at = (chrono::Utc::now() + ttl).timestamp();
        u64::try_from(expires_at)
            .map_err(|_| WalletError::InvalidInput("Order expiration before epoch".to_string()))
    }

    /// Hash the order and sign the digest with the active account.
    pub async fn sign_order(&self, order: PricedOrder) -> Result<SignedOrder> {
        let signer = self.wallet.address().await?;
        if order.order().maker != signer {
            return Err(WalletError::InvalidInput(format!(
                "Order maker {} is not the active account {signer}",
                order.order().maker
            )));
        }

        let hashed = order.hash()?;
        let signature = self.wallet.sign_digest(&hashed.hash()).await?;
        tracing::debug!(order_hash = %hashed.hash(), "Signed order");
        Ok(hashed.attach_signature(signature))
    }

    /// Post a signed order to the relay's order book.
    ///
    /// A failure leaves `order` signed and reusable; nothing is retried.
    pub async fn submit_order(&self, order: &SignedOrder) -> Result<SubmittedOrder> {
        let payload = serde_json::to_value(order.to_relay_payload())
            .map_err(|e| WalletError::InvalidInput(format!("Unencodable order: {e}")))?;
        self.wallet
            .transport()
            .post("exchange/order", &payload)
            .await?;
        tracing::info!(order_hash = %order.hash(), "Submitted order");
        Ok(SubmittedOrder::new(order.clone()))
    }

    /// Fill `order` for `fill_taker_amount` (display units of the taker token).
    ///
    /// Both legs are routed before anything is signed:
    /// maker token from maker to taker, taker token from taker to maker.
    pub async fn fill_order(&self, order: &SignedOrder, fill_taker_amount: &str) -> Result<TransactionId> {
        let terms = order.order();
        self.ensure_same_exchange(terms)?;
        let taker = self.wallet.address().await?;
        if let Some(restricted) = terms.taker {
            if restricted != taker {
                return Err(WalletError::InvalidInput(format!(
                    "Order can only be filled by {restricted}"
                )));
            }
        }

        let fill_taker = taker_share(terms, fill_taker_amount)?;
        let [maker_total, taker_total, ..] = terms.order_values()?;
        let fill_maker = maker_total
            .checked_mul(fill_taker)
            .ok_or_else(|| WalletError::InvalidInput("Fill amount overflows".to_string()))?
            / taker_total;

        let maker_leg = self
            .route(
                terms.maker_token,
                terms.maker,
                taker,
                to_amount(fill_maker, terms.maker_amount.decimals),
            )
            .await?;
        let taker_leg = self
            .route(
                terms.taker_token,
                taker,
                terms.maker,
                to_amount(fill_taker, terms.taker_amount.decimals),
            )
            .await?;

        let signature = order.signature();
        let call = IExchange::fillOrderTrustlinesCall {
            orderAddresses: terms.order_addresses(),
            orderValues: terms.order_values()?,
            fillTakerTokenAmount: fill_taker,
            makerPath: maker_leg.path,
            takerPath: taker_leg.path,
            v: signature.v,
            r: signature.r_word()?,
            s: signature.s_word()?,
        };
        let gas_limit = FILL_BASE_GAS
            .checked_add(maker_leg.estimated_gas)
            .and_then(|gas| gas.checked_add(taker_leg.estimated_gas))
            .ok_or_else(|| WalletError::InvalidInput("Route gas estimates overflow".to_string()))?;

        tracing::info!(order_hash = %order.hash(), %fill_taker, gas_limit, "Filling order");
        self.wallet
            .confirm(RawTxIntent::new(self.address, call.abi_encode()).with_gas_limit(gas_limit))
            .await
    }

    /// Cancel up to `cancel_taker_amount` of the active account's own order on chain.
    pub async fn cancel_order(&self, order: &SignedOrder, cancel_taker_amount: &str) -> Result<TransactionId> {
        let terms = order.order();
        self.ensure_same_exchange(terms)?;
        let sender = self.wallet.address().await?;
        if terms.maker != sender {
            return Err(WalletError::InvalidInput(
                "Only the maker can cancel an order".to_string(),
            ));
        }

        let cancel_taker = taker_share(terms, cancel_taker_amount)?;
        let call = IExchange::cancelOrderTrustlinesCall {
            orderAddresses: terms.order_addresses(),
            orderValues: terms.order_values()?,
            cancelTakerTokenAmount: cancel_taker,
        };

        tracing::info!(order_hash = %order.hash(), %cancel_taker, "Cancelling order");
        self.wallet
            .confirm(RawTxIntent::new(self.address, call.abi_encode()).with_gas_limit(CANCEL_GAS))
            .await
    }

    fn ensure_same_exchange(&self, terms: &Order) -> Result<()> {
        if terms.exchange != self.address {
            return Err(WalletError::InvalidInput(format!(
                "Order targets exchange {}, not {}",
                terms.exchange, self.address
            )));
        }
        Ok(())
    }

    async fn route(&self, token: Address, from: Address, to: Address, amount: Amount) -> Result<Route> {
        let lookup = self.routes.find_route(token, from, to, &amount).await?;
        lookup.resolve(token, from, to, amount.decimals)
    }
}

/// Raw taker-token amount of a fill or cancel, within `(0, takerAmount]`.
fn taker_share(terms: &Order, value: &str) -> Result<U256> {
    let raw = to_raw(value, terms.taker_amount.decimals)?;
    let [_, taker_total, ..] = terms.order_values()?;
    if raw.is_zero() || raw > taker_total {
        return Err(WalletError::InvalidInput(format!(
            "Amount must be between 0 and {}",
            terms.taker_amount.value
        )));
    }
    Ok(raw)
}
