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

use alloy::primitives::{
    utils::{format_ether, parse_units},
    U256,
};
use anyhow::{anyhow, bail};
use chrono::DateTime;
use clap::{Args, Subcommand};
use evermark_rewards::staking::{complete_unstake, request_unstake};

use crate::config::GlobalConfig;

/// Commands for unstaking through the unbonding window.
#[derive(Subcommand, Clone, Debug)]
pub enum UnstakeCommands {
    /// Start unbonding a staked wEMARK amount.
    Request(UnstakeRequest),
    /// Withdraw EMARK whose unbonding window has elapsed.
    Complete(UnstakeComplete),
}

impl UnstakeCommands {
    /// Run the command.
    pub async fn run(&self, global_config: &GlobalConfig) -> anyhow::Result<()> {
        match self {
            Self::Request(cmd) => cmd.run(global_config).await,
            Self::Complete(cmd) => cmd.run(global_config).await,
        }
    }
}

/// Command to start unbonding.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct UnstakeRequest {
    /// Amount of wEMARK to unstake.
    ///
    /// This is specified in wEMARK, e.g., to unstake 1 wEMARK, use `--amount 1`.
    #[clap(long)]
    amount: String,
}

impl UnstakeRequest {
    /// Run the [UnstakeRequest] command.
    pub async fn run(&self, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let provider = global_config.connect_with_signer().await?;
        let deployment = global_config.resolve_deployment(&provider).await?;

        let parsed_amount: U256 = parse_units(&self.amount, 18)
            .map_err(|e| anyhow!("Failed to parse wEMARK amount: {}", e))?
            .into();
        if parsed_amount == U256::ZERO {
            bail!("Amount is below the denomination minimum: {}", self.amount);
        }

        let info = request_unstake(
            provider,
            deployment.card_catalog_address,
            parsed_amount,
            global_config.tx_timeout,
        )
        .await?;

        let release = DateTime::from_timestamp(info.release_time as i64, 0)
            .map(|dt| dt.to_rfc3339())
            .unwrap_or_else(|| info.release_time.to_string());
        tracing::info!(
            "Unbonding started: {} wEMARK releases at {}",
            format_ether(info.amount),
            release
        );
        Ok(())
    }
}

/// Command to withdraw after the unbonding window.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct UnstakeComplete {}

impl UnstakeComplete {
    /// Run the [UnstakeComplete] command.
    pub async fn run(&self, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let account = global_config.require_private_key()?.address();
        let provider = global_config.connect_with_signer().await?;
        let deployment = global_config.resolve_deployment(&provider).await?;

        let amount = complete_unstake(
            provider,
            deployment.card_catalog_address,
            account,
            global_config.tx_timeout,
        )
        .await?;

        tracing::info!("Unstake completed: {} EMARK withdrawn", format_ether(amount));
        Ok(())
    }
}
