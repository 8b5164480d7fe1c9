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

use evermark_indexer::{db::EvermarkDbObj, sync::SyncService};
use tokio::sync::Mutex;

/// Shared application state.
pub struct AppState {
    pub db: EvermarkDbObj,
    /// Sync runs are serialized; a manual trigger waits for any in-flight
    /// run to finish.
    pub sync: Mutex<SyncService>,
    pub app_url: String,
    pub ipfs_gateway: String,
}

impl AppState {
    pub fn new(sync: SyncService, app_url: String, ipfs_gateway: String) -> Self {
        Self { db: sync.db(), sync: Mutex::new(sync), app_url, ipfs_gateway }
    }
}
