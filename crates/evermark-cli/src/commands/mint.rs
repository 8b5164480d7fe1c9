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

use alloy::primitives::{utils::format_ether, Address};
use anyhow::{ensure, Context};
use clap::Args;
use evermark_contracts::contracts::{extract_tx_log, IEvermarkNFT};

use crate::config::GlobalConfig;

/// Command to mint a new Evermark NFT.
///
/// The minting fee is read from the contract and attached as the transaction
/// value.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct Mint {
    /// IPFS URI of the Evermark metadata, e.g. `ipfs://Qm...`.
    #[clap(long)]
    pub metadata_uri: String,
    /// Title of the Evermark.
    #[clap(long)]
    pub title: String,
    /// Attributed creator. Defaults to the minting address.
    #[clap(long)]
    pub creator: Option<String>,
    /// Referrer address entitled to a share of the minting fee.
    #[clap(long)]
    pub referrer: Option<Address>,
}

impl Mint {
    /// Run the [Mint] command.
    pub async fn run(&self, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let account = global_config.require_private_key()?.address();
        let provider = global_config.connect_with_signer().await?;
        let deployment = global_config.resolve_deployment(&provider).await?;

        let nft = IEvermarkNFT::new(deployment.nft_address, provider);
        let fee = nft.mintingFee().call().await.context("Failed to read minting fee")?;
        tracing::info!("Minting fee is {} ETH", format_ether(fee));

        let creator = self.creator.clone().unwrap_or_else(|| account.to_string());
        let pending_tx = match self.referrer {
            Some(referrer) => {
                nft.mintEvermarkWithReferral(
                    self.metadata_uri.clone(),
                    self.title.clone(),
                    creator,
                    referrer,
                )
                .value(fee)
                .send()
                .await
            }
            None => {
                nft.mintEvermark(self.metadata_uri.clone(), self.title.clone(), creator)
                    .value(fee)
                    .send()
                    .await
            }
        }
        .context("Failed to send mint transaction")?;

        let tx_hash = *pending_tx.tx_hash();
        tracing::info!(%tx_hash, "Sent transaction for mint");

        let timeout = global_config.tx_timeout.or(pending_tx.timeout());
        let tx_receipt = pending_tx
            .with_timeout(timeout)
            .get_receipt()
            .await
            .context("Failed to receive receipt for mint transaction")?;
        ensure!(
            tx_receipt.status(),
            "mint transaction failed: tx_hash = {}",
            tx_receipt.transaction_hash
        );

        let log = extract_tx_log::<IEvermarkNFT::EvermarkMinted>(&tx_receipt)?;
        tracing::info!(
            "Minted Evermark {} ({}): tx_hash = {}",
            log.data().tokenId,
            log.data().title,
            tx_hash
        );
        Ok(())
    }
}
