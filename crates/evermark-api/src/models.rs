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

use evermark_indexer::db::SyncLogRow;
use serde::Serialize;

/// Sync health view returned by `GET /sync`.
#[derive(Debug, Serialize)]
pub struct SyncStatusResponse {
    /// Next block the sync will process, if a sync has ever run.
    pub cursor: Option<u64>,
    pub last_run: Option<SyncLogSummary>,
}

#[derive(Debug, Serialize)]
pub struct SyncLogSummary {
    pub started_at: i64,
    pub finished_at: i64,
    pub from_block: u64,
    pub to_block: u64,
    pub evermarks_synced: u64,
    pub votes_synced: u64,
    pub status: String,
    pub error: Option<String>,
}

impl From<SyncLogRow> for SyncLogSummary {
    fn from(row: SyncLogRow) -> Self {
        Self {
            started_at: row.started_at,
            finished_at: row.finished_at,
            from_block: row.from_block,
            to_block: row.to_block,
            evermarks_synced: row.evermarks_synced,
            votes_synced: row.votes_synced,
            status: row.status,
            error: row.error,
        }
    }
}
