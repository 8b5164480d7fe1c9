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

//! Stake and unbonding write flows against the EMARK token and the
//! CardCatalog staking contract.

use std::time::Duration;

use alloy::{
    eips::BlockId,
    primitives::{Address, B256, U256},
    providers::Provider,
};
use anyhow::{bail, ensure, Context};
use evermark_contracts::contracts::{extract_tx_log, ICardCatalog, IEmarkToken};

/// Result of a stake (wrap) transaction.
#[derive(Debug, Clone)]
pub struct StakeOutcome {
    pub tx_hash: B256,
    /// Amount wrapped, from the `Wrapped` event (wei).
    pub amount: U256,
    /// Whether a separate approve transaction was sent first.
    pub approved: bool,
}

/// Unbonding state for an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnbondingInfo {
    /// Amount waiting out the unbonding window (wei).
    pub amount: U256,
    /// Unix timestamp at which `completeUnwrap` becomes possible.
    pub release_time: u64,
}

/// Stake `amount` EMARK for `account`: approve the CardCatalog as spender if
/// the current allowance does not cover the amount, then wrap.
///
/// The two steps are separate transactions with no atomicity. If the wrap
/// fails after a successful approve, the allowance remains set; re-invoking
/// this flow skips the approve and retries the wrap.
pub async fn stake(
    provider: impl Provider + Clone,
    emark_address: Address,
    card_catalog_address: Address,
    account: Address,
    amount: U256,
    tx_timeout: Option<Duration>,
) -> anyhow::Result<StakeOutcome> {
    ensure!(amount > U256::ZERO, "Stake amount must be positive");

    let emark = IEmarkToken::new(emark_address, provider.clone());
    let balance = emark.balanceOf(account).call().await.context("Failed to read EMARK balance")?;
    ensure!(
        balance >= amount,
        "EMARK balance {} wei is less than the stake amount {} wei",
        balance,
        amount
    );

    let allowance = emark
        .allowance(account, card_catalog_address)
        .call()
        .await
        .context("Failed to read EMARK allowance")?;

    let mut approved = false;
    if allowance < amount {
        tracing::debug!(%allowance, %amount, "Allowance insufficient; sending approve");
        let pending_tx = emark
            .approve(card_catalog_address, amount)
            .send()
            .await
            .context("Failed to send approve transaction")?;
        let tx_hash = *pending_tx.tx_hash();
        tracing::info!(%tx_hash, "Sent transaction for approve");

        let timeout = tx_timeout.or(pending_tx.timeout());
        let tx_receipt = pending_tx
            .with_timeout(timeout)
            .get_receipt()
            .await
            .context("Failed to receive receipt for approve transaction")?;
        ensure!(
            tx_receipt.status(),
            "approve transaction failed: tx_hash = {}",
            tx_receipt.transaction_hash
        );
        approved = true;
    }

    let catalog = ICardCatalog::new(card_catalog_address, provider);
    let pending_tx = catalog.wrap(amount).send().await.with_context(|| {
        match approved {
            true => "Failed to send wrap transaction; note the approve succeeded, so the \
                     allowance remains set and the stake can be retried without re-approving",
            false => "Failed to send wrap transaction",
        }
    })?;

    let tx_hash = *pending_tx.tx_hash();
    tracing::info!(%tx_hash, "Sent transaction for wrap");

    let timeout = tx_timeout.or(pending_tx.timeout());
    tracing::debug!(?timeout, %tx_hash, "Waiting for transaction receipt");
    let tx_receipt = pending_tx
        .with_timeout(timeout)
        .get_receipt()
        .await
        .context("Failed to receive receipt for wrap transaction")?;
    ensure!(
        tx_receipt.status(),
        "wrap transaction failed: tx_hash = {}",
        tx_receipt.transaction_hash
    );

    let log = extract_tx_log::<ICardCatalog::Wrapped>(&tx_receipt)?;
    Ok(StakeOutcome { tx_hash, amount: log.data().amount, approved })
}

/// Start unbonding `amount` of staked wEMARK.
pub async fn request_unstake(
    provider: impl Provider + Clone,
    card_catalog_address: Address,
    amount: U256,
    tx_timeout: Option<Duration>,
) -> anyhow::Result<UnbondingInfo> {
    ensure!(amount > U256::ZERO, "Unstake amount must be positive");

    let catalog = ICardCatalog::new(card_catalog_address, provider);
    let pending_tx = catalog
        .requestUnwrap(amount)
        .send()
        .await
        .context("Failed to send requestUnwrap transaction")?;
    let tx_hash = *pending_tx.tx_hash();
    tracing::info!(%tx_hash, "Sent transaction for requestUnwrap");

    let timeout = tx_timeout.or(pending_tx.timeout());
    let tx_receipt = pending_tx
        .with_timeout(timeout)
        .get_receipt()
        .await
        .context("Failed to receive receipt for requestUnwrap transaction")?;
    ensure!(
        tx_receipt.status(),
        "requestUnwrap transaction failed: tx_hash = {}",
        tx_receipt.transaction_hash
    );

    let log = extract_tx_log::<ICardCatalog::UnwrapRequested>(&tx_receipt)?;
    Ok(UnbondingInfo {
        amount: log.data().amount,
        release_time: log.data().releaseTime.try_into().context("releaseTime overflows u64")?,
    })
}

/// Withdraw EMARK whose unbonding window has elapsed.
///
/// Pre-checks the unbonding state against the current chain time and refuses
/// locally, without sending a transaction, while the window is still open.
pub async fn complete_unstake(
    provider: impl Provider + Clone,
    card_catalog_address: Address,
    account: Address,
    tx_timeout: Option<Duration>,
) -> anyhow::Result<U256> {
    let catalog = ICardCatalog::new(card_catalog_address, provider.clone());
    let info = catalog
        .getUnbondingInfo(account)
        .call()
        .await
        .context("Failed to read unbonding info")?;
    let release_time: u64 = info.releaseTime.try_into().context("releaseTime overflows u64")?;

    ensure!(info.amount > U256::ZERO, "No unbonding EMARK to withdraw for {account}");

    let latest_block = provider
        .get_block(BlockId::latest())
        .await
        .context("Failed to check the current block timestamp")?
        .context("Latest block response is empty")?;
    let now = latest_block.header.timestamp;
    if now < release_time {
        bail!(
            "Unbonding window still open: {} wei releases at {} ({}s from now)",
            info.amount,
            release_time,
            release_time - now
        );
    }

    let pending_tx = catalog
        .completeUnwrap()
        .send()
        .await
        .context("Failed to send completeUnwrap transaction")?;
    let tx_hash = *pending_tx.tx_hash();
    tracing::info!(%tx_hash, "Sent transaction for completeUnwrap");

    let timeout = tx_timeout.or(pending_tx.timeout());
    let tx_receipt = pending_tx
        .with_timeout(timeout)
        .get_receipt()
        .await
        .context("Failed to receive receipt for completeUnwrap transaction")?;
    ensure!(
        tx_receipt.status(),
        "completeUnwrap transaction failed: tx_hash = {}",
        tx_receipt.transaction_hash
    );

    let log = extract_tx_log::<ICardCatalog::UnwrapCompleted>(&tx_receipt)?;
    Ok(log.data().amount)
}
