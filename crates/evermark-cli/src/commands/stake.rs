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
use clap::Args;
use evermark_rewards::staking::stake;

use crate::config::GlobalConfig;

/// Command to stake EMARK for wEMARK.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct Stake {
    /// Amount of EMARK to stake.
    ///
    /// This is specified in EMARK, e.g., to stake 1 EMARK, use `--amount 1`.
    #[clap(long)]
    amount: String,
}

impl Stake {
    /// Run the [Stake] command.
    pub async fn run(&self, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let account = global_config.require_private_key()?.address();
        let provider = global_config.connect_with_signer().await?;
        let deployment = global_config.resolve_deployment(&provider).await?;

        let parsed_amount: U256 = parse_units(&self.amount, 18)
            .map_err(|e| anyhow!("Failed to parse EMARK amount: {}", e))?
            .into();
        if parsed_amount == U256::ZERO {
            bail!("Amount is below the denomination minimum: {}", self.amount);
        }

        let outcome = stake(
            provider,
            deployment.emark_address,
            deployment.card_catalog_address,
            account,
            parsed_amount,
            global_config.tx_timeout,
        )
        .await?;

        if outcome.approved {
            tracing::debug!("Allowance was set with a separate approve transaction");
        }
        tracing::info!(
            "Staking completed: {} EMARK wrapped, tx_hash = {}",
            format_ether(outcome.amount),
            outcome.tx_hash
        );
        Ok(())
    }
}
