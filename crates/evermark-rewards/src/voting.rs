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

//! Vote delegation write flows against the voting contract.

use std::time::Duration;

use alloy::{
    primitives::{Address, B256, U256},
    providers::Provider,
};
use anyhow::{ensure, Context};
use evermark_contracts::contracts::{extract_tx_log, IEvermarkVoting};

/// Result of a delegation transaction.
#[derive(Debug, Clone)]
pub struct VoteOutcome {
    pub tx_hash: B256,
    pub evermark_id: U256,
    pub amount: U256,
    /// Total votes on the Evermark after this transaction.
    pub evermark_votes: U256,
}

/// Read remaining voting power for `account`, zero without a network call
/// when no account is given.
pub async fn fetch_voting_power(
    provider: impl Provider,
    voting_address: Address,
    account: Option<Address>,
) -> anyhow::Result<U256> {
    let Some(account) = account else {
        return Ok(U256::ZERO);
    };
    let voting = IEvermarkVoting::new(voting_address, provider);
    voting
        .getRemainingVotingPower(account)
        .call()
        .await
        .context("Failed to read remaining voting power")
}

/// Delegate `amount` of voting power to an Evermark.
///
/// Rejects locally, before any transaction, when the amount is zero or
/// exceeds the account's remaining voting power.
pub async fn delegate_votes(
    provider: impl Provider + Clone,
    voting_address: Address,
    account: Address,
    evermark_id: U256,
    amount: U256,
    tx_timeout: Option<Duration>,
) -> anyhow::Result<VoteOutcome> {
    ensure!(amount > U256::ZERO, "Vote amount must be positive");

    let voting = IEvermarkVoting::new(voting_address, provider.clone());
    let remaining = voting
        .getRemainingVotingPower(account)
        .call()
        .await
        .context("Failed to read remaining voting power")?;
    ensure!(
        remaining >= amount,
        "Vote amount {} wei exceeds remaining voting power {} wei",
        amount,
        remaining
    );

    let pending_tx = voting
        .delegateVotes(evermark_id, amount)
        .send()
        .await
        .context("Failed to send delegateVotes transaction")?;
    let tx_hash = *pending_tx.tx_hash();
    tracing::info!(%tx_hash, %evermark_id, "Sent transaction for delegateVotes");

    let timeout = tx_timeout.or(pending_tx.timeout());
    let tx_receipt = pending_tx
        .with_timeout(timeout)
        .get_receipt()
        .await
        .context("Failed to receive receipt for delegateVotes transaction")?;
    ensure!(
        tx_receipt.status(),
        "delegateVotes transaction failed: tx_hash = {}",
        tx_receipt.transaction_hash
    );

    let log = extract_tx_log::<IEvermarkVoting::VoteDelegated>(&tx_receipt)?;
    let evermark_votes = voting
        .getEvermarkVotes(evermark_id)
        .call()
        .await
        .context("Failed to read Evermark votes after delegation")?;

    Ok(VoteOutcome { tx_hash, evermark_id, amount: log.data().amount, evermark_votes })
}

/// Withdraw previously delegated votes from an Evermark.
pub async fn undelegate_votes(
    provider: impl Provider + Clone,
    voting_address: Address,
    evermark_id: U256,
    amount: U256,
    tx_timeout: Option<Duration>,
) -> anyhow::Result<VoteOutcome> {
    ensure!(amount > U256::ZERO, "Vote amount must be positive");

    let voting = IEvermarkVoting::new(voting_address, provider.clone());
    let pending_tx = voting
        .undelegateVotes(evermark_id, amount)
        .send()
        .await
        .context("Failed to send undelegateVotes transaction")?;
    let tx_hash = *pending_tx.tx_hash();
    tracing::info!(%tx_hash, %evermark_id, "Sent transaction for undelegateVotes");

    let timeout = tx_timeout.or(pending_tx.timeout());
    let tx_receipt = pending_tx
        .with_timeout(timeout)
        .get_receipt()
        .await
        .context("Failed to receive receipt for undelegateVotes transaction")?;
    ensure!(
        tx_receipt.status(),
        "undelegateVotes transaction failed: tx_hash = {}",
        tx_receipt.transaction_hash
    );

    let log = extract_tx_log::<IEvermarkVoting::VoteUndelegated>(&tx_receipt)?;
    let evermark_votes = voting
        .getEvermarkVotes(evermark_id)
        .call()
        .await
        .context("Failed to read Evermark votes after undelegation")?;

    Ok(VoteOutcome { tx_hash, evermark_id, amount: log.data().amount, evermark_votes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::providers::ProviderBuilder;

    #[tokio::test]
    async fn test_absent_account_short_circuits_to_zero() {
        let provider = ProviderBuilder::new().connect_http("http://127.0.0.1:1".parse().unwrap());
        let power = fetch_voting_power(provider, Address::ZERO, None).await.unwrap();
        assert_eq!(power, U256::ZERO);
    }
}
