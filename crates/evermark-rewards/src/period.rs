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

//! Reward period state read from the rewards contract.

use alloy::{
    primitives::{Address, U256},
    providers::Provider,
};
use anyhow::Context;
use evermark_contracts::contracts::IEvermarkRewards;

/// Error decoding the period status tuple into a [RewardPeriod].
///
/// The contract reports the period as a fixed-order tuple; any value that
/// cannot be represented, or that contradicts the period invariants, is
/// rejected here rather than silently misread.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("timestamp field `{0}` does not fit in u64: {1}")]
    TimestampOverflow(&'static str, U256),

    #[error("period end {end} precedes period start {start}")]
    InvertedPeriodBounds { start: u64, end: u64 },
}

/// On-chain reward period state. Read-only from the client's perspective;
/// mutates only via rebalance transactions the client does not control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct RewardPeriod {
    pub period_number: u64,
    pub period_start: u64,
    pub period_end: u64,
    /// ETH available in the pool for the current period (wei).
    pub eth_pool: U256,
    /// EMARK available in the pool for the current period (wei).
    pub emark_pool: U256,
    /// ETH accrual rate, wei per second.
    pub eth_rate: U256,
    /// EMARK accrual rate, wei per second.
    pub emark_rate: U256,
    /// ETH rate that takes effect after the next rebalance.
    pub next_eth_rate: U256,
    /// EMARK rate that takes effect after the next rebalance.
    pub next_emark_rate: U256,
}

impl RewardPeriod {
    /// Length of the period in seconds. Zero-length periods are representable
    /// and must be guarded by consumers (see [crate::projection]).
    pub fn length_seconds(&self) -> u64 {
        self.period_end.saturating_sub(self.period_start)
    }

    fn try_from_status(
        status: IEvermarkRewards::getPeriodStatusReturn,
    ) -> Result<Self, DecodeError> {
        fn ts(name: &'static str, value: U256) -> Result<u64, DecodeError> {
            value.try_into().map_err(|_| DecodeError::TimestampOverflow(name, value))
        }

        let period_number = ts("periodNumber", status.periodNumber)?;
        let period_start = ts("periodStart", status.periodStart)?;
        let period_end = ts("periodEnd", status.periodEnd)?;
        if period_end < period_start {
            return Err(DecodeError::InvertedPeriodBounds {
                start: period_start,
                end: period_end,
            });
        }

        Ok(Self {
            period_number,
            period_start,
            period_end,
            eth_pool: status.ethPool,
            emark_pool: status.emarkPool,
            eth_rate: status.ethRate,
            emark_rate: status.emarkRate,
            next_eth_rate: status.nextEthRate,
            next_emark_rate: status.nextEmarkRate,
        })
    }
}

/// Read the current reward period from the rewards contract.
pub async fn fetch_reward_period(
    provider: impl Provider,
    rewards_address: Address,
) -> anyhow::Result<RewardPeriod> {
    let rewards = IEvermarkRewards::new(rewards_address, provider);
    let status = rewards
        .getPeriodStatus()
        .call()
        .await
        .context("Failed to call getPeriodStatus")?;
    let period = RewardPeriod::try_from_status(status)?;
    tracing::debug!(
        period = period.period_number,
        start = period.period_start,
        end = period.period_end,
        "Fetched reward period"
    );
    Ok(period)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(
        start: U256,
        end: U256,
    ) -> IEvermarkRewards::getPeriodStatusReturn {
        IEvermarkRewards::getPeriodStatusReturn {
            periodNumber: U256::from(7),
            periodStart: start,
            periodEnd: end,
            ethPool: U256::from(1000),
            emarkPool: U256::from(2000),
            ethRate: U256::from(3),
            emarkRate: U256::from(4),
            nextEthRate: U256::from(5),
            nextEmarkRate: U256::from(6),
        }
    }

    #[test]
    fn test_decodes_named_fields() {
        let period =
            RewardPeriod::try_from_status(status(U256::from(100), U256::from(200))).unwrap();
        assert_eq!(period.period_number, 7);
        assert_eq!(period.period_start, 100);
        assert_eq!(period.period_end, 200);
        assert_eq!(period.length_seconds(), 100);
        assert_eq!(period.eth_pool, U256::from(1000));
        assert_eq!(period.next_emark_rate, U256::from(6));
    }

    #[test]
    fn test_rejects_inverted_bounds() {
        let err =
            RewardPeriod::try_from_status(status(U256::from(200), U256::from(100))).unwrap_err();
        assert!(matches!(err, DecodeError::InvertedPeriodBounds { start: 200, end: 100 }));
    }

    #[test]
    fn test_rejects_timestamp_overflow() {
        let err = RewardPeriod::try_from_status(status(U256::MAX, U256::MAX)).unwrap_err();
        assert!(matches!(err, DecodeError::TimestampOverflow("periodStart", _)));
    }

    #[test]
    fn test_zero_length_period_is_representable() {
        let period =
            RewardPeriod::try_from_status(status(U256::from(100), U256::from(100))).unwrap();
        assert_eq!(period.length_seconds(), 0);
    }
}
