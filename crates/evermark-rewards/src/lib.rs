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

//! Reward accounting for the Evermark protocol: period state, per-user
//! pending rewards, payout projections, and the claim/stake/vote write flows.

// Declare modules
pub mod claim;
pub mod period;
pub mod projection;
pub mod staking;
pub mod user;
pub mod voting;

// Re-export commonly used types
pub use period::{fetch_reward_period, DecodeError, RewardPeriod};

pub use user::{fetch_staked_balance, fetch_user_rewards, UserRewardState};

pub use projection::{
    apr_basis_points, format_basis_points, projected, ProjectionSet, TokenProjection,
    MONTH_SECONDS, WEEK_SECONDS, YEAR_SECONDS,
};

pub use claim::{claim_rewards, meets_claim_minimum, ClaimOutcome, ClaimPhase, MIN_CLAIM_WEI};

pub use staking::{
    complete_unstake, request_unstake, stake, StakeOutcome, UnbondingInfo,
};

pub use voting::{delegate_votes, fetch_voting_power, undelegate_votes, VoteOutcome};
