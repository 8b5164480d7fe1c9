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

//! HTTP service exposing Evermark share pages and sync control.

mod handler;
mod models;
mod routes;
mod state;

use std::{sync::Arc, time::Duration};

use anyhow::Result;
use clap::Parser;
use evermark_contracts::deployments::Deployment;
use evermark_indexer::{
    metadata::DEFAULT_IPFS_GATEWAY,
    sync::{SyncService, SyncServiceConfig},
};
use url::Url;

use crate::state::AppState;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct ApiArgs {
    /// URL of the Ethereum RPC endpoint.
    #[clap(short, long, env)]
    rpc_url: Url,

    /// Configuration for the Evermark deployment to use.
    #[clap(flatten, next_help_heading = "Evermark Deployment")]
    deployment: Option<Deployment>,

    /// DB connection string.
    #[clap(long, env = "DATABASE_URL")]
    db: String,

    /// HTTPS gateway for resolving ipfs:// metadata URIs.
    #[clap(long, env, default_value = DEFAULT_IPFS_GATEWAY)]
    ipfs_gateway: String,

    /// Base URL of the Evermark web app, used as the share-page redirect
    /// target.
    #[clap(long, env, default_value = "https://evermarks.net")]
    app_url: String,

    /// Address to listen on.
    #[clap(long, env, default_value = "0.0.0.0:8080")]
    bind: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = ApiArgs::parse();

    let filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
        .from_env_lossy();
    tracing_subscriber::fmt().with_ansi(false).with_env_filter(filter).init();

    let config = SyncServiceConfig {
        interval: Duration::from_secs(300),
        retries: 3,
        start_block: None,
    };
    let sync = SyncService::new(
        args.rpc_url,
        args.deployment,
        &args.db,
        &args.ipfs_gateway,
        config,
    )
    .await?;

    let state = Arc::new(AppState::new(sync, args.app_url, args.ipfs_gateway));
    let app = handler::create_app(state);

    let listener = tokio::net::TcpListener::bind(&args.bind).await?;
    tracing::info!("Evermark API listening on {}", args.bind);
    axum::serve(listener, app).await?;

    Ok(())
}
