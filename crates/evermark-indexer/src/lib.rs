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

//! Blockchain-to-database synchronization for Evermark: a sqlx-backed mirror
//! of minted Evermarks and their vote counts, enriched with IPFS metadata.

pub mod db;
pub mod metadata;
pub mod sync;

/// Base mainnet starting block for event queries (NFT contract creation).
pub const BASE_FROM_BLOCK: u64 = 16_140_300;
/// Base Sepolia starting block for event queries.
pub const BASE_SEPOLIA_FROM_BLOCK: u64 = 12_680_000;
/// Block span per `eth_getLogs` request, to stay under provider limits.
pub const LOG_QUERY_CHUNK_SIZE: u64 = 10_000;
