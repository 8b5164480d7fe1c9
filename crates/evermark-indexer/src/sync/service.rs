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

//! Periodic blockchain-to-database sync.

use std::{collections::HashMap, sync::Arc};

use alloy::{
    primitives::U256,
    providers::{
        fillers::{ChainIdFiller, FillProvider, JoinFill},
        Identity, Provider, ProviderBuilder, RootProvider,
    },
    rpc::client::RpcClient,
    transports::layers::RetryBackoffLayer,
};
use anyhow::{Context, Result};
use chrono::Utc;
use evermark_contracts::{
    contracts::{IEvermarkNFT, IEvermarkVoting},
    deployments::{Deployment, NamedChain},
};
use tokio::time::Duration;
use url::Url;

use crate::{
    db::{EvermarkDb, EvermarkDbObj, EvermarkRow, SyncLogRow},
    metadata::{ipfs_hash, EvermarkMetadata, MetadataFetcher},
    sync::fetch_mint_and_vote_logs,
    BASE_FROM_BLOCK, BASE_SEPOLIA_FROM_BLOCK,
};

/// `blockchain_cache` key holding the next block to sync from. No TTL: the
/// cursor is authoritative, not a freshness optimization.
pub const LAST_SYNCED_BLOCK_KEY: &str = "last_synced_block";

#[derive(Clone)]
pub struct SyncServiceConfig {
    pub interval: Duration,
    pub retries: u32,
    pub start_block: Option<u64>,
}

type ProviderType = FillProvider<JoinFill<Identity, ChainIdFiller>, RootProvider>;

/// Summary of one sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct SyncReport {
    pub from_block: u64,
    pub to_block: u64,
    pub evermarks_synced: u64,
    pub votes_synced: u64,
}

pub struct SyncService {
    provider: ProviderType,
    db: EvermarkDbObj,
    deployment: Deployment,
    fetcher: MetadataFetcher,
    config: SyncServiceConfig,
    chain_id: u64,
}

impl SyncService {
    pub async fn new(
        rpc_url: Url,
        deployment: Option<Deployment>,
        db_conn: &str,
        gateway: &str,
        config: SyncServiceConfig,
    ) -> Result<Self> {
        let provider = ProviderBuilder::new()
            .disable_recommended_fillers()
            .filler(ChainIdFiller::default())
            .connect_client(
                RpcClient::builder().layer(RetryBackoffLayer::new(3, 1000, 200)).http(rpc_url),
            );
        let chain_id = provider.get_chain_id().await?;
        let deployment = deployment
            .or_else(|| Deployment::from_chain_id(chain_id))
            .context("could not determine Evermark deployment from chain ID; please specify deployment explicitly")?;
        let db: EvermarkDbObj = Arc::new(EvermarkDb::new(db_conn).await?);
        let fetcher = MetadataFetcher::new(gateway)?;

        Ok(Self { provider, db, deployment, fetcher, config, chain_id })
    }

    /// Shared handle to the underlying database.
    pub fn db(&self) -> EvermarkDbObj {
        self.db.clone()
    }

    pub fn config(&self) -> &SyncServiceConfig {
        &self.config
    }

    /// Run one sync pass and record it in `sync_logs`.
    pub async fn run(&mut self) -> Result<SyncReport> {
        let started_at = Utc::now().timestamp();
        let start_time = std::time::Instant::now();
        tracing::info!("Starting sync run");

        let from_block = self.resolve_from_block().await?;
        let to_block =
            self.provider.get_block_number().await.context("Failed to get current block")?;

        if from_block > to_block {
            tracing::info!("No new blocks since last sync (cursor {})", from_block);
            return Ok(SyncReport {
                from_block,
                to_block,
                evermarks_synced: 0,
                votes_synced: 0,
            });
        }

        let result = self.sync_range(from_block, to_block).await;
        let finished_at = Utc::now().timestamp();

        let (status, error, report) = match &result {
            Ok(report) => ("success".to_string(), None, *report),
            Err(err) => (
                "failed".to_string(),
                Some(format!("{err:#}")),
                SyncReport { from_block, to_block, evermarks_synced: 0, votes_synced: 0 },
            ),
        };
        self.db
            .insert_sync_log(&SyncLogRow {
                started_at,
                finished_at,
                from_block: report.from_block,
                to_block: report.to_block,
                evermarks_synced: report.evermarks_synced,
                votes_synced: report.votes_synced,
                status,
                error,
            })
            .await?;

        if result.is_ok() {
            tracing::info!(
                "Sync run complete in {:?}: {} evermarks, {} vote updates over blocks {}..={}",
                start_time.elapsed(),
                report.evermarks_synced,
                report.votes_synced,
                from_block,
                to_block
            );
        }
        result
    }

    async fn resolve_from_block(&self) -> Result<u64> {
        if let Some(cursor) = self.db.cache_get(LAST_SYNCED_BLOCK_KEY).await? {
            return cursor
                .parse()
                .with_context(|| format!("Invalid sync cursor in cache: {cursor}"));
        }
        if let Some(start_block) = self.config.start_block {
            return Ok(start_block);
        }
        match NamedChain::try_from(self.chain_id) {
            Ok(NamedChain::Base) => Ok(BASE_FROM_BLOCK),
            Ok(NamedChain::BaseSepolia) => Ok(BASE_SEPOLIA_FROM_BLOCK),
            _ => anyhow::bail!(
                "No default start block for chain {}; pass --start-block",
                self.chain_id
            ),
        }
    }

    async fn sync_range(&mut self, from_block: u64, to_block: u64) -> Result<SyncReport> {
        let logs =
            fetch_mint_and_vote_logs(&self.provider, &self.deployment, from_block, to_block)
                .await?;

        let evermarks_synced = self.process_mints(&logs.minted_logs).await?;
        let votes_synced = self
            .process_votes(&logs.vote_delegated_logs, &logs.vote_undelegated_logs)
            .await?;

        // Advance the cursor only after the range fully landed.
        self.db
            .cache_set(LAST_SYNCED_BLOCK_KEY, &(to_block + 1).to_string(), None)
            .await?;

        Ok(SyncReport { from_block, to_block, evermarks_synced, votes_synced })
    }

    async fn process_mints(&self, minted_logs: &[alloy::rpc::types::Log]) -> Result<u64> {
        let mut synced = 0u64;
        for log in minted_logs {
            let Ok(decoded) = log.log_decode::<IEvermarkNFT::EvermarkMinted>() else {
                tracing::warn!("Skipping undecodable EvermarkMinted log: {log:?}");
                continue;
            };
            let data = decoded.inner.data;
            let token_id: u64 =
                data.tokenId.try_into().context("tokenId overflows u64")?;
            let metadata_uri = data.metadataURI.clone();

            let metadata = self.resolve_metadata(&metadata_uri).await?;
            let now = Utc::now().timestamp();
            let existing = self.db.get_evermark(token_id).await?;

            let row = EvermarkRow {
                token_id,
                title: metadata
                    .name
                    .into_option()
                    .unwrap_or_else(|| data.title.clone()),
                creator: data.minter.to_string(),
                owner: data.minter.to_string(),
                metadata_uri,
                image_uri: metadata.image.into_option(),
                description: metadata.description.into_option(),
                content_type: metadata.content_type.into_option(),
                vote_count: existing.as_ref().map(|e| e.vote_count).unwrap_or(U256::ZERO),
                created_at: existing.map(|e| e.created_at).unwrap_or(now),
                updated_at: now,
            };
            self.db.upsert_evermark(&row).await?;
            synced += 1;
        }
        Ok(synced)
    }

    /// Pull metadata through the content-addressed cache; fetch and store on
    /// a miss. Fetch failures degrade to unavailable fields (the mint is
    /// still mirrored).
    async fn resolve_metadata(&self, metadata_uri: &str) -> Result<EvermarkMetadata> {
        let Some(hash) = ipfs_hash(metadata_uri) else {
            // Non-IPFS URIs are fetched directly and not cached.
            return Ok(self.fetcher.fetch(metadata_uri).await);
        };

        if let Some(cached) = self.db.ipfs_cache_get(hash).await? {
            return Ok(EvermarkMetadata::from_json(&cached));
        }

        match self.fetcher.fetch_json(metadata_uri).await {
            Ok(doc) => {
                self.db.ipfs_cache_put(hash, &doc).await?;
                Ok(EvermarkMetadata::from_json(&doc))
            }
            Err(err) => {
                tracing::warn!("Metadata fetch failed for {metadata_uri}: {err:#}");
                Ok(EvermarkMetadata::unavailable())
            }
        }
    }

    async fn process_votes(
        &self,
        delegated_logs: &[alloy::rpc::types::Log],
        undelegated_logs: &[alloy::rpc::types::Log],
    ) -> Result<u64> {
        // Net vote delta per Evermark across the whole range.
        let mut deltas: HashMap<u64, (U256, U256)> = HashMap::new();

        for log in delegated_logs {
            if let Ok(decoded) = log.log_decode::<IEvermarkVoting::VoteDelegated>() {
                let id: u64 =
                    decoded.inner.data.evermarkId.try_into().context("evermarkId overflows u64")?;
                let entry = deltas.entry(id).or_default();
                entry.0 = entry.0.saturating_add(decoded.inner.data.amount);
            }
        }
        for log in undelegated_logs {
            if let Ok(decoded) = log.log_decode::<IEvermarkVoting::VoteUndelegated>() {
                let id: u64 =
                    decoded.inner.data.evermarkId.try_into().context("evermarkId overflows u64")?;
                let entry = deltas.entry(id).or_default();
                entry.1 = entry.1.saturating_add(decoded.inner.data.amount);
            }
        }

        let mut updated = 0u64;
        for (token_id, (added, removed)) in deltas {
            let Some(current) = self.db.get_vote_count(token_id).await? else {
                tracing::debug!("Vote events for unindexed Evermark {token_id}; skipping");
                continue;
            };
            let next = current.saturating_add(added).saturating_sub(removed);
            self.db.set_vote_count(token_id, next).await?;
            updated += 1;
        }
        Ok(updated)
    }
}
