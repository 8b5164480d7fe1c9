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

//! Sync status view and manual-sync trigger.

use std::sync::Arc;

use axum::{
    extract::State,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};

use crate::handler::handle_error;
use crate::models::{SyncLogSummary, SyncStatusResponse};
use crate::state::AppState;

/// Create sync routes
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/", get(sync_status).post(trigger_sync))
}

/// GET /sync
/// Returns the sync cursor and the most recent run.
async fn sync_status(State(state): State<Arc<AppState>>) -> Response {
    match sync_status_impl(state).await {
        Ok(response) => Json(response).into_response(),
        Err(err) => handle_error(err).into_response(),
    }
}

async fn sync_status_impl(state: Arc<AppState>) -> anyhow::Result<SyncStatusResponse> {
    let cursor = state
        .db
        .cache_get(evermark_indexer::sync::LAST_SYNCED_BLOCK_KEY)
        .await?
        .map(|value| value.parse::<u64>())
        .transpose()
        .map_err(|e| anyhow::anyhow!("Invalid sync cursor: {e}"))?;
    let last_run = state.db.latest_sync_log().await?.map(SyncLogSummary::from);
    Ok(SyncStatusResponse { cursor, last_run })
}

/// POST /sync
/// Runs one sync pass and returns its report.
async fn trigger_sync(State(state): State<Arc<AppState>>) -> Response {
    tracing::info!("Manual sync triggered");
    let mut sync = state.sync.lock().await;
    match sync.run().await {
        Ok(report) => Json(report).into_response(),
        Err(err) => handle_error(err).into_response(),
    }
}
