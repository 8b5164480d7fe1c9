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

//! Claim execution: threshold policy, transaction submission, and
//! confirmation-driven refetch of the account's reward state.

use std::time::Duration;

use alloy::{
    primitives::{Address, B256, U256},
    providers::Provider,
};
use anyhow::{ensure, Context};
use evermark_contracts::contracts::{extract_tx_log, IEvermarkRewards};

use crate::user::{fetch_user_rewards, UserRewardState};

/// Minimum total pending rewards (ETH + EMARK, in wei) required before a
/// claim transaction is attempted: 0.001 tokens at 18 decimals.
///
/// Claims below this burn more gas than they return; the threshold is a
/// single policy applied before any transaction is sent.
pub const MIN_CLAIM_WEI: U256 = U256::from_limbs([1_000_000_000_000_000, 0, 0, 0]);

/// Phases of a claim. `Confirming` waits on the transaction receipt rather
/// than a fixed delay, so the refreshed state read afterwards reflects the
/// claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimPhase {
    Idle,
    Claiming,
    Confirming,
    Claimed,
    Failed,
}

/// Result of a successful claim.
#[derive(Debug, Clone)]
pub struct ClaimOutcome {
    pub tx_hash: B256,
    /// ETH claimed, from the `RewardsClaimed` event (wei).
    pub claimed_eth: U256,
    /// EMARK claimed, from the `RewardsClaimed` event (wei).
    pub claimed_emark: U256,
    /// Account reward state re-read after confirmation.
    pub refreshed: UserRewardState,
}

/// Whether the account's pending rewards meet the claim threshold.
pub fn meets_claim_minimum(user: &UserRewardState) -> bool {
    user.pending_total() >= MIN_CLAIM_WEI
}

/// Claim all pending rewards for `account`.
///
/// Rejects before sending anything when pending rewards are below
/// [MIN_CLAIM_WEI]. On success the reward state is re-read post-receipt and
/// returned alongside the claimed amounts.
pub async fn claim_rewards(
    provider: impl Provider + Clone,
    rewards_address: Address,
    account: Address,
    tx_timeout: Option<Duration>,
) -> anyhow::Result<ClaimOutcome> {
    let before = fetch_user_rewards(provider.clone(), rewards_address, Some(account)).await?;
    ensure!(
        meets_claim_minimum(&before),
        "Pending rewards {} wei are below the claim minimum of {} wei",
        before.pending_total(),
        MIN_CLAIM_WEI
    );

    let rewards = IEvermarkRewards::new(rewards_address, provider.clone());
    tracing::debug!(?account, phase = ?ClaimPhase::Claiming, "Sending claimRewards transaction");
    let pending_tx = rewards
        .claimRewards()
        .send()
        .await
        .context("Failed to send claimRewards transaction")?;

    let tx_hash = *pending_tx.tx_hash();
    tracing::info!(%tx_hash, "Sent transaction for claimRewards");

    let timeout = tx_timeout.or(pending_tx.timeout());
    tracing::debug!(?timeout, %tx_hash, phase = ?ClaimPhase::Confirming, "Waiting for transaction receipt");
    let tx_receipt = pending_tx
        .with_timeout(timeout)
        .get_receipt()
        .await
        .context("Failed to receive receipt for claimRewards transaction")?;

    ensure!(
        tx_receipt.status(),
        "claimRewards transaction failed: tx_hash = {}",
        tx_receipt.transaction_hash
    );

    let log = extract_tx_log::<IEvermarkRewards::RewardsClaimed>(&tx_receipt)?;
    let claimed_eth = log.data().ethAmount;
    let claimed_emark = log.data().emarkAmount;

    // Receipt is final; the contract's view of the account is now current.
    let refreshed = fetch_user_rewards(provider, rewards_address, Some(account)).await?;
    tracing::info!(
        %tx_hash,
        phase = ?ClaimPhase::Claimed,
        "Claimed {} wei ETH and {} wei EMARK",
        claimed_eth,
        claimed_emark
    );

    Ok(ClaimOutcome { tx_hash, claimed_eth, claimed_emark, refreshed })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_pending(eth: u64, emark: u64) -> UserRewardState {
        UserRewardState {
            pending_eth: U256::from(eth),
            pending_emark: U256::from(emark),
            ..UserRewardState::ZERO
        }
    }

    #[test]
    fn test_threshold_is_one_milli_token() {
        assert_eq!(MIN_CLAIM_WEI, U256::from(10u64).pow(U256::from(15)));
    }

    #[test]
    fn test_below_threshold_rejected() {
        assert!(!meets_claim_minimum(&UserRewardState::ZERO));
        assert!(!meets_claim_minimum(&with_pending(999_999_999_999_999, 0)));
    }

    #[test]
    fn test_threshold_applies_to_combined_pending() {
        // Each token alone is below the minimum; the sum is not.
        assert!(meets_claim_minimum(&with_pending(600_000_000_000_000, 400_000_000_000_000)));
        assert!(meets_claim_minimum(&with_pending(1_000_000_000_000_000, 0)));
    }
}
