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

use alloy::primitives::{address, Address};
use clap::Args;
use derive_builder::Builder;

pub use alloy_chains::NamedChain;

/// Configuration for a deployment of the Evermark protocol.
// NOTE: See https://github.com/clap-rs/clap/issues/5092#issuecomment-1703980717 about clap usage.
#[non_exhaustive]
#[derive(Clone, Debug, Builder, Args)]
#[group(
    requires = "emark_address",
    requires = "card_catalog_address",
    requires = "rewards_address",
    requires = "nft_address",
    requires = "voting_address"
)]
pub struct Deployment {
    /// EIP-155 chain ID of the network.
    #[clap(long, env)]
    #[builder(setter(into, strip_option), default)]
    pub chain_id: Option<u64>,

    /// Address of the [IEmarkToken] contract.
    ///
    /// [IEmarkToken]: crate::contracts::IEmarkToken
    #[clap(long, env, required = false, long_help = "Address of the EMARK token contract")]
    #[builder(setter(into))]
    pub emark_address: Address,

    /// Address of the [ICardCatalog] staking contract.
    ///
    /// [ICardCatalog]: crate::contracts::ICardCatalog
    #[clap(long, env, required = false, long_help = "Address of the CardCatalog staking contract")]
    #[builder(setter(into))]
    pub card_catalog_address: Address,

    /// Address of the [IEvermarkRewards] contract.
    ///
    /// [IEvermarkRewards]: crate::contracts::IEvermarkRewards
    #[clap(long, env, required = false, long_help = "Address of the rewards contract")]
    #[builder(setter(into))]
    pub rewards_address: Address,

    /// Address of the [IEvermarkNFT] contract.
    ///
    /// [IEvermarkNFT]: crate::contracts::IEvermarkNFT
    #[clap(long, env, required = false, long_help = "Address of the Evermark NFT contract")]
    #[builder(setter(into))]
    pub nft_address: Address,

    /// Address of the [IEvermarkVoting] contract.
    ///
    /// [IEvermarkVoting]: crate::contracts::IEvermarkVoting
    #[clap(long, env, required = false, long_help = "Address of the voting contract")]
    #[builder(setter(into))]
    pub voting_address: Address,
}

impl Deployment {
    /// Create a new [DeploymentBuilder].
    pub fn builder() -> DeploymentBuilder {
        Default::default()
    }

    /// Lookup the [Deployment] for a named chain.
    pub const fn from_chain(chain: NamedChain) -> Option<Deployment> {
        match chain {
            NamedChain::Base => Some(BASE),
            NamedChain::BaseSepolia => Some(BASE_SEPOLIA),
            _ => None,
        }
    }

    /// Lookup the [Deployment] by chain ID.
    pub fn from_chain_id(chain_id: impl Into<u64>) -> Option<Deployment> {
        let chain = NamedChain::try_from(chain_id.into()).ok()?;
        Self::from_chain(chain)
    }
}

/// [Deployment] for Base mainnet.
pub const BASE: Deployment = Deployment {
    chain_id: Some(NamedChain::Base as u64),
    emark_address: address!("0xf87f3ebbf8cec2a6a1f596dfd1e6c7e258f2c206"),
    card_catalog_address: address!("0x2b69aa755a6ce6dc2d9d5e7f0e55c38517cf0e61"),
    rewards_address: address!("0x88e5c57ffc8de966ed97c49c566c3e4ac219b8c0"),
    nft_address: address!("0x504a0bdc3aea29237a6f8e53d0ecda8e4c9009f2"),
    voting_address: address!("0x5089fe55368e40c8990214ca99bd2214b34a179d"),
};

/// [Deployment] for the Base Sepolia testnet.
pub const BASE_SEPOLIA: Deployment = Deployment {
    chain_id: Some(NamedChain::BaseSepolia as u64),
    emark_address: address!("0x1c7e5b1d4e58a9e7c9a2f6d85b5ad0c7f4e3d2a1"),
    card_catalog_address: address!("0x9e1c4a7b2f8d3e6c5a0b9d8e7f6a5b4c3d2e1f0a"),
    rewards_address: address!("0x3d5e8c1b9a7f2e4d6c8b0a9e7d5f3c1b8a6e4d2c"),
    nft_address: address!("0x6f2a4c8e0b3d5f7a9c1e3b5d7f9a0c2e4b6d8f0a"),
    voting_address: address!("0x8b4d6f0a2c5e7b9d1f3a5c7e9b0d2f4a6c8e0b3d"),
};
