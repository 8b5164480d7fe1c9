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

//! Reward commands: period status, pending balances, projections, claiming.

use alloy::primitives::{
    utils::format_ether,
    Address,
};
use chrono::DateTime;
use clap::{Args, Subcommand};
use evermark_rewards::{
    claim::{claim_rewards, meets_claim_minimum, MIN_CLAIM_WEI},
    period::fetch_reward_period,
    projection::{format_basis_points, ProjectionSet},
    user::fetch_user_rewards,
};

use crate::config::GlobalConfig;

/// Commands for reward operations.
#[derive(Subcommand, Clone, Debug)]
pub enum RewardsCommands {
    /// Show the current reward period.
    Status(RewardsStatus),
    /// Show pending rewards for an account.
    Pending(RewardsPending),
    /// Show weekly/monthly/yearly reward projections and APR for an account.
    Projections(RewardsProjections),
    /// Claim all pending rewards.
    Claim(RewardsClaim),
}

impl RewardsCommands {
    /// Run the command.
    pub async fn run(&self, global_config: &GlobalConfig) -> anyhow::Result<()> {
        match self {
            Self::Status(cmd) => cmd.run(global_config).await,
            Self::Pending(cmd) => cmd.run(global_config).await,
            Self::Projections(cmd) => cmd.run(global_config).await,
            Self::Claim(cmd) => cmd.run(global_config).await,
        }
    }
}

fn format_timestamp(ts: u64) -> String {
    DateTime::from_timestamp(ts as i64, 0)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| ts.to_string())
}

/// Command to show the current reward period.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct RewardsStatus {}

impl RewardsStatus {
    /// Run the [RewardsStatus] command.
    pub async fn run(&self, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let provider = global_config.connect().await?;
        let deployment = global_config.resolve_deployment(&provider).await?;

        let period = fetch_reward_period(provider, deployment.rewards_address).await?;
        tracing::info!(
            "Period {}: {} to {}",
            period.period_number,
            format_timestamp(period.period_start),
            format_timestamp(period.period_end),
        );
        tracing::info!(
            "Pools: {} ETH, {} EMARK",
            format_ether(period.eth_pool),
            format_ether(period.emark_pool)
        );
        tracing::info!(
            "Rates: {} ETH/s, {} EMARK/s (next period: {} ETH/s, {} EMARK/s)",
            format_ether(period.eth_rate),
            format_ether(period.emark_rate),
            format_ether(period.next_eth_rate),
            format_ether(period.next_emark_rate)
        );
        Ok(())
    }
}

/// Command to show pending rewards.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct RewardsPending {
    /// Account to query. Defaults to the address of the configured private key.
    #[clap(long)]
    pub account: Option<Address>,
}

impl RewardsPending {
    /// Run the [RewardsPending] command.
    pub async fn run(&self, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let provider = global_config.connect().await?;
        let deployment = global_config.resolve_deployment(&provider).await?;

        let account =
            self.account.or_else(|| global_config.private_key.as_ref().map(|k| k.address()));
        let user = fetch_user_rewards(provider, deployment.rewards_address, account).await?;

        match account {
            Some(account) => tracing::info!("Pending rewards for {account}:"),
            None => tracing::info!("No account given; showing the disconnected (zero) state:"),
        }
        tracing::info!(
            "  pending: {} ETH, {} EMARK",
            format_ether(user.pending_eth),
            format_ether(user.pending_emark)
        );
        tracing::info!("  staked: {} wEMARK", format_ether(user.staked_amount));
        if meets_claim_minimum(&user) {
            tracing::info!("  claimable now (minimum is {} wei)", MIN_CLAIM_WEI);
        } else {
            tracing::info!(
                "  below the claim minimum of {} wei; claiming would fail",
                MIN_CLAIM_WEI
            );
        }
        Ok(())
    }
}

/// Command to show reward projections.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct RewardsProjections {
    /// Account to query. Defaults to the address of the configured private key.
    #[clap(long)]
    pub account: Option<Address>,
}

impl RewardsProjections {
    /// Run the [RewardsProjections] command.
    pub async fn run(&self, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let provider = global_config.connect().await?;
        let deployment = global_config.resolve_deployment(&provider).await?;

        let account =
            self.account.or_else(|| global_config.private_key.as_ref().map(|k| k.address()));
        let period = fetch_reward_period(provider.clone(), deployment.rewards_address).await?;
        let user = fetch_user_rewards(provider, deployment.rewards_address, account).await?;
        let projections = ProjectionSet::compute(&period, &user);

        for (token, p) in [("ETH", &projections.eth), ("EMARK", &projections.emark)] {
            tracing::info!(
                "{token}: {} weekly, {} monthly, {} yearly, APR {}",
                format_ether(p.weekly),
                format_ether(p.monthly),
                format_ether(p.yearly),
                format_basis_points(p.apr_bps)
            );
        }
        Ok(())
    }
}

/// Command to claim all pending rewards.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct RewardsClaim {}

impl RewardsClaim {
    /// Run the [RewardsClaim] command.
    pub async fn run(&self, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let account = global_config.require_private_key()?.address();
        let provider = global_config.connect_with_signer().await?;
        let deployment = global_config.resolve_deployment(&provider).await?;

        let outcome = claim_rewards(
            provider,
            deployment.rewards_address,
            account,
            global_config.tx_timeout,
        )
        .await?;

        tracing::info!(
            "Claimed {} ETH and {} EMARK: tx_hash = {}",
            format_ether(outcome.claimed_eth),
            format_ether(outcome.claimed_emark),
            outcome.tx_hash
        );
        tracing::info!(
            "Remaining pending: {} ETH, {} EMARK",
            format_ether(outcome.refreshed.pending_eth),
            format_ether(outcome.refreshed.pending_emark)
        );
        Ok(())
    }
}
