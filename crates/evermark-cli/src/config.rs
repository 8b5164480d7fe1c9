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

//! Common configuration options for commands in the Evermark CLI.

use std::{num::ParseIntError, time::Duration};

use alloy::{
    providers::{Provider, ProviderBuilder},
    signers::local::PrivateKeySigner,
};
use anyhow::{Context, Result};
use clap::Args;
use evermark_contracts::deployments::Deployment;
use tracing::level_filters::LevelFilter;
use url::Url;

/// Common configuration options for all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalConfig {
    /// URL of the Ethereum RPC endpoint
    #[clap(short, long, env = "RPC_URL")]
    pub rpc_url: Option<Url>,

    /// Private key of the wallet (without 0x prefix)
    #[clap(long, env = "PRIVATE_KEY", global = true, hide_env_values = true)]
    pub private_key: Option<PrivateKeySigner>,

    /// Ethereum transaction timeout in seconds.
    #[clap(long, env = "TX_TIMEOUT", global = true, value_parser = |arg: &str| -> Result<Duration, ParseIntError> {Ok(Duration::from_secs(arg.parse()?))})]
    pub tx_timeout: Option<Duration>,

    /// Log level (error, warn, info, debug, trace)
    #[clap(long, env = "LOG_LEVEL", global = true, default_value = "info")]
    pub log_level: LevelFilter,

    /// Configuration for the Evermark deployment to use.
    #[clap(flatten, next_help_heading = "Evermark Deployment")]
    pub deployment: Option<Deployment>,
}

impl GlobalConfig {
    /// Access [Self::rpc_url] or return an error that can be shown to the user.
    pub fn require_rpc_url(&self) -> Result<Url> {
        self.rpc_url
            .clone()
            .context("Blockchain RPC URL not provided; please set --rpc-url or the RPC_URL env var")
    }

    /// Access [Self::private_key] or return an error that can be shown to the user.
    pub fn require_private_key(&self) -> Result<PrivateKeySigner> {
        self.private_key.clone().context(
            "Private key not provided; please set --private-key or the PRIVATE_KEY env var",
        )
    }

    /// Connect a read-only provider to the configured RPC endpoint.
    ///
    /// Requires [Self::rpc_url] to be set.
    pub async fn connect(&self) -> Result<impl Provider + Clone> {
        let rpc_url = self.require_rpc_url()?;
        ProviderBuilder::new()
            .connect(rpc_url.as_str())
            .await
            .with_context(|| format!("failed to connect provider to {rpc_url}"))
    }

    /// Connect a provider that signs and sends transactions with the
    /// configured private key.
    ///
    /// Requires [Self::rpc_url] and [Self::private_key] to be set.
    pub async fn connect_with_signer(&self) -> Result<impl Provider + Clone> {
        let rpc_url = self.require_rpc_url()?;
        let signer = self.require_private_key()?;
        ProviderBuilder::new()
            .wallet(signer)
            .connect(rpc_url.as_str())
            .await
            .with_context(|| format!("failed to connect provider to {rpc_url}"))
    }

    /// Resolve the deployment from the explicit flags, or from the chain ID of
    /// the connected endpoint.
    pub async fn resolve_deployment(&self, provider: &impl Provider) -> Result<Deployment> {
        if let Some(deployment) = self.deployment.clone() {
            return Ok(deployment);
        }
        let chain_id = provider.get_chain_id().await.context("Failed to query chain ID")?;
        Deployment::from_chain_id(chain_id).with_context(|| {
            format!(
                "could not determine Evermark deployment from chain ID {chain_id}; \
                 please specify deployment explicitly"
            )
        })
    }
}
