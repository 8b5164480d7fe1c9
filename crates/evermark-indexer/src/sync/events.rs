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

//! Event fetching and log querying utilities.

use alloy::{
    providers::Provider,
    rpc::types::{BlockNumberOrTag, Filter, Log},
    sol_types::SolEvent,
};
use anyhow::Context;
use evermark_contracts::{
    contracts::{IEvermarkNFT, IEvermarkVoting},
    deployments::Deployment,
};

use crate::LOG_QUERY_CHUNK_SIZE;

/// Container for the event logs one sync run processes.
#[derive(Debug)]
pub struct MintAndVoteLogs {
    pub minted_logs: Vec<Log>,
    pub vote_delegated_logs: Vec<Log>,
    pub vote_undelegated_logs: Vec<Log>,
}

/// Query logs in chunks to avoid hitting provider limits.
pub async fn query_logs_chunked<P: Provider>(
    provider: &P,
    filter: Filter,
    from_block: u64,
    to_block: u64,
) -> anyhow::Result<Vec<Log>> {
    let mut all_logs = Vec::new();

    let mut current_from = from_block;
    while current_from <= to_block {
        let current_to = (current_from + LOG_QUERY_CHUNK_SIZE - 1).min(to_block);

        let chunk_filter = filter
            .clone()
            .from_block(BlockNumberOrTag::Number(current_from))
            .to_block(BlockNumberOrTag::Number(current_to));

        let logs = provider.get_logs(&chunk_filter).await?;
        all_logs.extend(logs);

        current_from = current_to + 1;
    }

    Ok(all_logs)
}

/// Fetch the mint and vote event logs for a block range.
pub async fn fetch_mint_and_vote_logs<P: Provider>(
    provider: &P,
    deployment: &Deployment,
    from_block: u64,
    to_block: u64,
) -> anyhow::Result<MintAndVoteLogs> {
    tracing::info!("Fetching blockchain event data ({} blocks)...", to_block - from_block);

    let minted_filter = Filter::new()
        .address(deployment.nft_address)
        .event_signature(IEvermarkNFT::EvermarkMinted::SIGNATURE_HASH);

    let vote_delegated_filter = Filter::new()
        .address(deployment.voting_address)
        .event_signature(IEvermarkVoting::VoteDelegated::SIGNATURE_HASH);

    let vote_undelegated_filter = Filter::new()
        .address(deployment.voting_address)
        .event_signature(IEvermarkVoting::VoteUndelegated::SIGNATURE_HASH);

    let (minted_logs, vote_delegated_logs, vote_undelegated_logs) = tokio::join!(
        async {
            query_logs_chunked(provider, minted_filter, from_block, to_block)
                .await
                .context("Failed to get EvermarkMinted logs")
        },
        async {
            query_logs_chunked(provider, vote_delegated_filter, from_block, to_block)
                .await
                .context("Failed to get VoteDelegated logs")
        },
        async {
            query_logs_chunked(provider, vote_undelegated_filter, from_block, to_block)
                .await
                .context("Failed to get VoteUndelegated logs")
        },
    );

    Ok(MintAndVoteLogs {
        minted_logs: minted_logs?,
        vote_delegated_logs: vote_delegated_logs?,
        vote_undelegated_logs: vote_undelegated_logs?,
    })
}
