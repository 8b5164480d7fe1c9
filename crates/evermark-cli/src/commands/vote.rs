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
use evermark_rewards::voting::{delegate_votes, undelegate_votes};

use crate::config::GlobalConfig;

/// Command to delegate or withdraw voting power on an Evermark.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct Vote {
    /// Token ID of the Evermark to vote on.
    #[clap(long)]
    pub evermark_id: u64,
    /// Amount of voting power to move.
    ///
    /// This is specified in wEMARK, e.g., to delegate 1 wEMARK of power, use
    /// `--amount 1`.
    #[clap(long)]
    amount: String,
    /// Withdraw previously delegated votes instead of delegating.
    #[clap(long)]
    pub withdraw: bool,
}

impl Vote {
    /// Run the [Vote] command.
    pub async fn run(&self, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let account = global_config.require_private_key()?.address();
        let provider = global_config.connect_with_signer().await?;
        let deployment = global_config.resolve_deployment(&provider).await?;

        let parsed_amount: U256 = parse_units(&self.amount, 18)
            .map_err(|e| anyhow!("Failed to parse vote amount: {}", e))?
            .into();
        if parsed_amount == U256::ZERO {
            bail!("Amount is below the denomination minimum: {}", self.amount);
        }
        let evermark_id = U256::from(self.evermark_id);

        let outcome = match self.withdraw {
            false => {
                delegate_votes(
                    provider,
                    deployment.voting_address,
                    account,
                    evermark_id,
                    parsed_amount,
                    global_config.tx_timeout,
                )
                .await?
            }
            true => {
                undelegate_votes(
                    provider,
                    deployment.voting_address,
                    evermark_id,
                    parsed_amount,
                    global_config.tx_timeout,
                )
                .await?
            }
        };

        let action = if self.withdraw { "withdrawn from" } else { "delegated to" };
        tracing::info!(
            "{} votes {} Evermark {}: total now {}, tx_hash = {}",
            format_ether(outcome.amount),
            action,
            outcome.evermark_id,
            format_ether(outcome.evermark_votes),
            outcome.tx_hash
        );
        Ok(())
    }
}
