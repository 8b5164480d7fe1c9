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

//! Command-line interface for Evermark: rewards, staking, voting, and
//! minting against the deployed contracts.

mod commands;
mod config;

use clap::{Parser, Subcommand};
use evermark_contracts::errors::display_error;

use crate::{
    commands::{Balance, Mint, RewardsCommands, Stake, UnstakeCommands, Vote},
    config::GlobalConfig,
};

#[derive(Parser, Debug)]
#[command(name = "evermark", version, about = "CLI for the Evermark protocol")]
struct Cli {
    #[clap(subcommand)]
    command: Command,

    #[clap(flatten)]
    config: GlobalConfig,
}

#[derive(Subcommand, Clone, Debug)]
enum Command {
    /// Reward period, pending rewards, projections, and claiming.
    #[clap(subcommand)]
    Rewards(RewardsCommands),
    /// Stake EMARK tokens for wEMARK.
    Stake(Stake),
    /// Unstake wEMARK through the unbonding window.
    #[clap(subcommand)]
    Unstake(UnstakeCommands),
    /// Mint a new Evermark NFT.
    Mint(Mint),
    /// Delegate or withdraw voting power on an Evermark.
    Vote(Vote),
    /// Show token, staking, and voting balances for an account.
    Balance(Balance),
}

impl Command {
    async fn run(&self, global_config: &GlobalConfig) -> anyhow::Result<()> {
        match self {
            Self::Rewards(cmd) => cmd.run(global_config).await,
            Self::Stake(cmd) => cmd.run(global_config).await,
            Self::Unstake(cmd) => cmd.run(global_config).await,
            Self::Mint(cmd) => cmd.run(global_config).await,
            Self::Vote(cmd) => cmd.run(global_config).await,
            Self::Balance(cmd) => cmd.run(global_config).await,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.config.log_level)
        .with_target(false)
        .init();

    if let Err(err) = cli.command.run(&cli.config).await {
        eprintln!("Error: {}", display_error(&err));
        std::process::exit(1);
    }
}
