// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Path-finding and fee-schedule collaborators.

use alloy::primitives::Address;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::amount::Amount;
use crate::error::{Result, WalletError};

/// Gas budget of a direct token transfer that bypasses the trustline network.
pub const DIRECT_TRANSFER_GAS: u64 = 40_000;

/// Decimals of the token exchange fees are denominated in.
pub const FEE_TOKEN_DECIMALS: u8 = 18;

/// A resolved trustline path for one leg of a fill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    /// Intermediaries from sender to receiver, inclusive
    pub path: Vec<Address>,
    pub max_fees: Amount,
    pub estimated_gas: u64,
}

impl Route {
    /// Route for a token that is not part of the trustline network.
    pub fn direct(decimals: u8) -> Self {
        Self {
            path: Vec::new(),
            max_fees: Amount::zero(decimals),
            estimated_gas: DIRECT_TRANSFER_GAS,
        }
    }
}

/// Answer of a [`RouteFinder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteLookup {
    Path(Route),
    /// The token has no trustline network; transfer directly
    NoNetwork,
}

impl RouteLookup {
    /// Turn the lookup into a usable route, or fail if no path exists.
    pub fn resolve(self, token: Address, from: Address, to: Address, decimals: u8) -> Result<Route> {
        match self {
            RouteLookup::NoNetwork => Ok(Route::direct(decimals)),
            RouteLookup::Path(route) if route.path.is_empty() => {
                Err(WalletError::RouteNotFound { token, from, to })
            }
            RouteLookup::Path(route) => Ok(route),
        }
    }
}

/// Finds a trustline path moving `amount` of `token` from `from` to `to`.
#[async_trait]
pub trait RouteFinder: Send + Sync {
    async fn find_route(
        &self,
        token: Address,
        from: Address,
        to: Address,
        amount: &Amount,
    ) -> Result<RouteLookup>;
}

/// Maker and taker fees applied to a draft order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderFees {
    pub maker_fee: Amount,
    pub taker_fee: Amount,
}

impl OrderFees {
    pub fn zero() -> Self {
        Self {
            maker_fee: Amount::zero(FEE_TOKEN_DECIMALS),
            taker_fee: Amount::zero(FEE_TOKEN_DECIMALS),
        }
    }
}

/// Prices a draft order.
pub trait FeeSchedule: Send + Sync {
    fn fees_for(&self, maker_amount: &Amount, taker_amount: &Amount) -> Result<OrderFees>;
}

/// Fee schedule of a relay that charges nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroFees;

impl FeeSchedule for ZeroFees {
    fn fees_for(&self, _maker_amount: &Amount, _taker_amount: &Amount) -> Result<OrderFees> {
        Ok(OrderFees::zero())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Route finder answering from a fixed table.

    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    pub struct FixedRoutes {
        pub routes: HashMap<Address, RouteLookup>,
        pub lookups: Mutex<Vec<Address>>,
    }

    impl FixedRoutes {
        pub fn with(mut self, token: Address, lookup: RouteLookup) -> Self {
            self.routes.insert(token, lookup);
            self
        }
    }

    #[async_trait]
    impl RouteFinder for FixedRoutes {
        async fn find_route(
            &self,
            token: Address,
            _from: Address,
            _to: Address,
            _amount: &Amount,
        ) -> Result<RouteLookup> {
            self.lookups.lock().unwrap().push(token);
            Ok(self.routes.get(&token).cloned().unwrap_or(RouteLookup::Path(Route {
                path: Vec::new(),
                max_fees: Amount::zero(0),
                estimated_gas: 0,
            })))
        }
    }
}
