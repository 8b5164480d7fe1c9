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

//! Smart contract interfaces for the Evermark protocol.

use std::fmt::Debug;

use alloy::{
    rpc::types::{Log, TransactionReceipt},
    sol_types::SolEvent,
};
use anyhow::{anyhow, Context, Result};

alloy::sol!(
    #![sol(rpc, all_derives)]

    /// ERC-20 governance token (EMARK). Used for minting fees and staking.
    interface IEmarkToken {
        function balanceOf(address account) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 value) external returns (bool);
        function transfer(address to, uint256 value) external returns (bool);

        event Approval(address indexed owner, address indexed spender, uint256 value);
        event Transfer(address indexed from, address indexed to, uint256 value);
    }
);

alloy::sol!(
    #![sol(rpc, all_derives)]

    /// Non-transferable staking receipt token (wEMARK). Wrapping EMARK grants
    /// voting power and reward eligibility; unwrapping goes through an
    /// unbonding window.
    interface ICardCatalog {
        function wrap(uint256 amount) external;
        function requestUnwrap(uint256 amount) external;
        function completeUnwrap() external;
        function balanceOf(address account) external view returns (uint256);
        function getTotalStaked() external view returns (uint256);
        function getUnbondingInfo(address account)
            external
            view
            returns (uint256 amount, uint256 releaseTime);
        function getRemainingVotingPower(address account) external view returns (uint256);

        event Wrapped(address indexed account, uint256 amount);
        event UnwrapRequested(address indexed account, uint256 amount, uint256 releaseTime);
        event UnwrapCompleted(address indexed account, uint256 amount);
    }
);

alloy::sol!(
    #![sol(rpc, all_derives)]

    /// Dual-token reward pool. Pools accrue at a fixed per-second rate within
    /// a period; rates rebalance when a period rolls over.
    interface IEvermarkRewards {
        function getPeriodStatus()
            external
            view
            returns (
                uint256 periodNumber,
                uint256 periodStart,
                uint256 periodEnd,
                uint256 ethPool,
                uint256 emarkPool,
                uint256 ethRate,
                uint256 emarkRate,
                uint256 nextEthRate,
                uint256 nextEmarkRate
            );
        function getUserRewardInfo(address account)
            external
            view
            returns (
                uint256 pendingEth,
                uint256 pendingEmark,
                uint256 stakedAmount,
                uint256 periodEthRewards,
                uint256 periodEmarkRewards
            );
        function claimRewards() external;

        event RewardsClaimed(address indexed account, uint256 ethAmount, uint256 emarkAmount);
        event PoolFunded(address indexed funder, address indexed token, uint256 amount);
        event PeriodRebalanced(uint256 indexed periodNumber, uint256 ethRate, uint256 emarkRate);
    }
);

alloy::sol!(
    #![sol(rpc, all_derives)]

    /// Content preservation NFTs.
    interface IEvermarkNFT {
        function mintEvermark(string metadataURI, string title, string creator)
            external
            payable
            returns (uint256 tokenId);
        function mintEvermarkWithReferral(
            string metadataURI,
            string title,
            string creator,
            address referrer
        ) external payable returns (uint256 tokenId);
        function tokenURI(uint256 tokenId) external view returns (string);
        function ownerOf(uint256 tokenId) external view returns (address);
        function totalSupply() external view returns (uint256);
        function mintingFee() external view returns (uint256);

        event EvermarkMinted(
            uint256 indexed tokenId,
            address indexed minter,
            address indexed referrer,
            string metadataURI,
            string title
        );
    }
);

alloy::sol!(
    #![sol(rpc, all_derives)]

    /// Curation voting. Stakers delegate wEMARK voting power to individual
    /// Evermarks within a voting cycle.
    interface IEvermarkVoting {
        function delegateVotes(uint256 evermarkId, uint256 amount) external;
        function undelegateVotes(uint256 evermarkId, uint256 amount) external;
        function getEvermarkVotes(uint256 evermarkId) external view returns (uint256);
        function getRemainingVotingPower(address account) external view returns (uint256);
        function getCurrentCycle() external view returns (uint256);

        event VoteDelegated(address indexed voter, uint256 indexed evermarkId, uint256 amount);
        event VoteUndelegated(address indexed voter, uint256 indexed evermarkId, uint256 amount);
    }
);

/// Extract a single event log of type `E` from a transaction receipt.
///
/// Errors if the receipt contains zero or more than one matching event.
pub fn extract_tx_log<E: SolEvent + Debug + Clone>(
    receipt: &TransactionReceipt,
) -> Result<Log<E>, anyhow::Error> {
    let logs = receipt
        .inner
        .logs()
        .iter()
        .filter_map(|log| {
            if log.topic0().map(|topic| E::SIGNATURE_HASH == *topic).unwrap_or(false) {
                Some(
                    log.log_decode::<E>()
                        .with_context(|| format!("failed to decode event {}", E::SIGNATURE)),
                )
            } else {
                tracing::debug!(
                    "skipping log on receipt; does not match {}: {log:?}",
                    E::SIGNATURE
                );
                None
            }
        })
        .collect::<Result<Vec<_>>>()?;

    match &logs[..] {
        [log] => Ok(log.clone()),
        [] => Err(anyhow!(
            "transaction 0x{:x} did not emit event {}",
            receipt.transaction_hash,
            E::SIGNATURE
        )),
        _ => Err(anyhow!(
            "transaction emitted more than one event with signature {}, {:#?}",
            E::SIGNATURE,
            logs
        )),
    }
}
