// Copyright 2025 Evermark
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Per-account reward state read from the rewards contract.

use alloy::{
    primitives::{Address, U256},
    providers::Provider,
};
use anyhow::Context;
use evermark_contracts::contracts::{ICardCatalog, IEvermarkRewards};

/// Reward state for a single account. Never persisted client-side; always
/// re-derived from a contract read.
///
/// Pending balances are monotonically non-decreasing between reads until a
/// claim succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct UserRewardState {
    /// ETH accrued but not yet claimed (wei).
    pub pending_eth: U256,
    /// EMARK accrued but not yet claimed (wei).
    pub pending_emark: U256,
    /// wEMARK staked balance (wei).
    pub staked_amount: U256,
    /// ETH earned by this account within the current period (wei).
    pub period_eth_rewards: U256,
    /// EMARK earned by this account within the current period (wei).
    pub period_emark_rewards: U256,
}

impl UserRewardState {
    /// The state reported for an absent account: all zeros.
    pub const ZERO: Self = Self {
        pending_eth: U256::ZERO,
        pending_emark: U256::ZERO,
        staked_amount: U256::ZERO,
        period_eth_rewards: U256::ZERO,
        period_emark_rewards: U256::ZERO,
    };

    /// Total pending rewards across both tokens.
    pub fn pending_total(&self) -> U256 {
        self.pending_eth.saturating_add(self.pending_emark)
    }
}

/// Read reward state for `account` from the rewards contract.
///
/// `account == None` means no wallet is connected: the zero state is returned
/// without issuing a network call.
pub async fn fetch_user_rewards(
    provider: impl Provider,
    rewards_address: Address,
    account: Option<Address>,
) -> anyhow::Result<UserRewardState> {
    let Some(account) = account else {
        return Ok(UserRewardState::ZERO);
    };

    let rewards = IEvermarkRewards::new(rewards_address, provider);
    let info = rewards
        .getUserRewardInfo(account)
        .call()
        .await
        .context("Failed to call getUserRewardInfo")?;

    Ok(UserRewardState {
        pending_eth: info.pendingEth,
        pending_emark: info.pendingEmark,
        staked_amount: info.stakedAmount,
        period_eth_rewards: info.periodEthRewards,
        period_emark_rewards: info.periodEmarkRewards,
    })
}

/// Read the wEMARK staked balance for `account`, zero without a network call
/// when no account is given.
pub async fn fetch_staked_balance(
    provider: impl Provider,
    card_catalog_address: Address,
    account: Option<Address>,
) -> anyhow::Result<U256> {
    let Some(account) = account else {
        return Ok(U256::ZERO);
    };

    let catalog = ICardCatalog::new(card_catalog_address, provider);
    catalog.balanceOf(account).call().await.context("Failed to call balanceOf")
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::providers::ProviderBuilder;

    // The provider points at a closed port; these calls must short-circuit
    // before any network traffic happens.
    fn dead_provider() -> impl Provider {
        ProviderBuilder::new().connect_http("http://127.0.0.1:1".parse().unwrap())
    }

    #[tokio::test]
    async fn test_absent_account_short_circuits_to_zero() {
        let state = fetch_user_rewards(dead_provider(), Address::ZERO, None).await.unwrap();
        assert_eq!(state, UserRewardState::ZERO);

        let balance = fetch_staked_balance(dead_provider(), Address::ZERO, None).await.unwrap();
        assert_eq!(balance, U256::ZERO);
    }

    #[test]
    fn test_pending_total_saturates() {
        let state = UserRewardState {
            pending_eth: U256::MAX,
            pending_emark: U256::from(1),
            ..UserRewardState::ZERO
        };
        assert_eq!(state.pending_total(), U256::MAX);
    }
}
