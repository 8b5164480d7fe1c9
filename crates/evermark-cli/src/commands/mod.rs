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

//! Commands of the Evermark CLI.

mod balance;
mod mint;
mod rewards;
mod stake;
mod unstake;
mod vote;

pub use balance::Balance;
pub use mint::Mint;
pub use rewards::RewardsCommands;
pub use stake::Stake;
pub use unstake::UnstakeCommands;
pub use vote::Vote;
