// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Trustlines exchange contract interface.

use alloy::sol;

// Fill and cancel entry points of the trustlines-aware 0x exchange
sol! {
    interface IExchange {
        function fillOrderTrustlines(
            address[5] orderAddresses,
            uint256[6] orderValues,
            uint256 fillTakerTokenAmount,
            address[] makerPath,
            address[] takerPath,
            uint8 v,
            bytes32 r,
            bytes32 s
        ) external returns (uint256 filledTakerTokenAmount);

        function cancelOrderTrustlines(
            address[5] orderAddresses,
            uint256[6] orderValues,
            uint256 cancelTakerTokenAmount
        ) external returns (uint256 cancelledTakerTokenAmount);
    }
}
