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

//! Payout projections and APR, derived from period and user state.
//!
//! All arithmetic is integer U256 on the smallest token unit. APR is carried
//! in basis points; formatting to a percentage happens only at the display
//! boundary.

use alloy::primitives::U256;

use crate::{period::RewardPeriod, user::UserRewardState};

/// Projection target: one week.
pub const WEEK_SECONDS: u64 = 604_800;
/// Projection target: one month (30 days).
pub const MONTH_SECONDS: u64 = 2_592_000;
/// Projection target: one year, defined as exactly 52 weeks so annualized
/// projections are whole multiples of the weekly one.
pub const YEAR_SECONDS: u64 = 52 * WEEK_SECONDS;

/// Scale a period reward amount to a target horizon.
///
/// `amount * target_seconds / (period_end - period_start)`; zero whenever the
/// period length is zero or inverted.
pub fn projected(amount: U256, target_seconds: u64, period_start: u64, period_end: u64) -> U256 {
    if period_end <= period_start {
        return U256::ZERO;
    }
    let length = U256::from(period_end - period_start);
    amount.saturating_mul(U256::from(target_seconds)) / length
}

/// Annual percentage rate in basis points: `yearly * 10_000 / staked`, zero
/// when nothing is staked.
pub fn apr_basis_points(yearly: U256, staked: U256) -> U256 {
    if staked.is_zero() {
        return U256::ZERO;
    }
    yearly.saturating_mul(U256::from(10_000u64)) / staked
}

/// Render basis points as a percentage string, e.g. 1234 -> "12.34%".
pub fn format_basis_points(bps: U256) -> String {
    let whole = bps / U256::from(100u64);
    let frac = bps % U256::from(100u64);
    format!("{whole}.{frac:0>2}%")
}

/// Weekly/monthly/yearly projections plus APR for one token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct TokenProjection {
    pub weekly: U256,
    pub monthly: U256,
    pub yearly: U256,
    pub apr_bps: U256,
}

impl TokenProjection {
    fn compute(period_amount: U256, staked: U256, start: u64, end: u64) -> Self {
        let weekly = projected(period_amount, WEEK_SECONDS, start, end);
        let monthly = projected(period_amount, MONTH_SECONDS, start, end);
        let yearly = projected(period_amount, YEAR_SECONDS, start, end);
        Self { weekly, monthly, yearly, apr_bps: apr_basis_points(yearly, staked) }
    }
}

/// Projections for both reward tokens, recomputed from current inputs on
/// every use; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ProjectionSet {
    pub eth: TokenProjection,
    pub emark: TokenProjection,
}

impl ProjectionSet {
    pub fn compute(period: &RewardPeriod, user: &UserRewardState) -> Self {
        Self {
            eth: TokenProjection::compute(
                user.period_eth_rewards,
                user.staked_amount,
                period.period_start,
                period.period_end,
            ),
            emark: TokenProjection::compute(
                user.period_emark_rewards,
                user.staked_amount,
                period.period_start,
                period.period_end,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degenerate_period_projects_zero() {
        // period_end <= period_start must never yield negative or infinite
        // projections.
        for (start, end) in [(100u64, 100u64), (100, 50), (0, 0)] {
            for target in [WEEK_SECONDS, MONTH_SECONDS, YEAR_SECONDS] {
                assert_eq!(projected(U256::from(1_000_000), target, start, end), U256::ZERO);
            }
        }
    }

    #[test]
    fn test_zero_stake_means_zero_apr() {
        assert_eq!(apr_basis_points(U256::from(u64::MAX), U256::ZERO), U256::ZERO);
    }

    #[test]
    fn test_one_week_period_scales_exactly() {
        // 10 tokens over exactly one week: weekly projection is the period
        // amount itself, yearly is 52x.
        let amount = U256::from(10);
        assert_eq!(projected(amount, WEEK_SECONDS, 0, WEEK_SECONDS), U256::from(10));
        assert_eq!(projected(amount, YEAR_SECONDS, 0, WEEK_SECONDS), U256::from(520));
    }

    #[test]
    fn test_huge_amounts_do_not_overflow() {
        let out = projected(U256::MAX, YEAR_SECONDS, 0, WEEK_SECONDS);
        // Saturating multiply, then division: bounded by U256::MAX / length.
        assert_eq!(out, U256::MAX / U256::from(WEEK_SECONDS));
    }

    #[test]
    fn test_apr_basis_points() {
        // yearly 500 on a stake of 1000 => 50%.
        let bps = apr_basis_points(U256::from(500), U256::from(1000));
        assert_eq!(bps, U256::from(5000));
        assert_eq!(format_basis_points(bps), "50.00%");
        assert_eq!(format_basis_points(U256::from(1234)), "12.34%");
        assert_eq!(format_basis_points(U256::from(7)), "0.07%");
    }

    #[test]
    fn test_projection_set_uses_period_rewards() {
        let period = RewardPeriod {
            period_number: 1,
            period_start: 0,
            period_end: WEEK_SECONDS,
            eth_pool: U256::from(1_000_000),
            emark_pool: U256::from(2_000_000),
            eth_rate: U256::ZERO,
            emark_rate: U256::ZERO,
            next_eth_rate: U256::ZERO,
            next_emark_rate: U256::ZERO,
        };
        let user = UserRewardState {
            period_eth_rewards: U256::from(10),
            period_emark_rewards: U256::from(20),
            staked_amount: U256::from(1040),
            ..UserRewardState::ZERO
        };

        let set = ProjectionSet::compute(&period, &user);
        assert_eq!(set.eth.weekly, U256::from(10));
        assert_eq!(set.eth.yearly, U256::from(520));
        assert_eq!(set.emark.yearly, U256::from(1040));
        // 1040 yearly on 1040 staked => 100.00%.
        assert_eq!(set.emark.apr_bps, U256::from(10_000));
    }
}
