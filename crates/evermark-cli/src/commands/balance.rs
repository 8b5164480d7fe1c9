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

use alloy::primitives::{utils::format_ether, Address, U256};
use anyhow::Context;
use chrono::DateTime;
use clap::Args;
use evermark_contracts::contracts::{ICardCatalog, IEmarkToken};
use evermark_rewards::{user::fetch_staked_balance, voting::fetch_voting_power};

use crate::config::GlobalConfig;

/// Command to show token, staking, and voting balances for an account.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct Balance {
    /// Account to query. Defaults to the address of the configured private key.
    #[clap(long)]
    pub account: Option<Address>,
}

impl Balance {
    /// Run the [Balance] command.
    pub async fn run(&self, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let provider = global_config.connect().await?;
        let deployment = global_config.resolve_deployment(&provider).await?;

        let account =
            self.account.or_else(|| global_config.private_key.as_ref().map(|k| k.address()));
        let Some(account) = account else {
            tracing::info!("No account given; all balances are zero");
            return Ok(());
        };

        let emark = IEmarkToken::new(deployment.emark_address, provider.clone());
        let liquid = emark
            .balanceOf(account)
            .call()
            .await
            .context("Failed to read EMARK balance")?;
        let staked = fetch_staked_balance(
            provider.clone(),
            deployment.card_catalog_address,
            Some(account),
        )
        .await?;
        let voting_power =
            fetch_voting_power(provider.clone(), deployment.voting_address, Some(account)).await?;

        tracing::info!("Balances for {account}:");
        tracing::info!("  EMARK: {}", format_ether(liquid));
        tracing::info!("  wEMARK staked: {}", format_ether(staked));
        tracing::info!("  remaining voting power: {}", format_ether(voting_power));

        let catalog = ICardCatalog::new(deployment.card_catalog_address, provider);
        let unbonding = catalog
            .getUnbondingInfo(account)
            .call()
            .await
            .context("Failed to read unbonding info")?;
        if unbonding.amount > U256::ZERO {
            let release_time: u64 =
                unbonding.releaseTime.try_into().context("releaseTime overflows u64")?;
            let release = DateTime::from_timestamp(release_time as i64, 0)
                .map(|dt| dt.to_rfc3339())
                .unwrap_or_else(|| release_time.to_string());
            tracing::info!(
                "  unbonding: {} EMARK, releases at {}",
                format_ether(unbonding.amount),
                release
            );
        }
        Ok(())
    }
}
