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

use std::sync::Arc;

use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};

use crate::routes::{share, sync};
use crate::state::AppState;

/// Creates the axum application with all routes
pub fn create_app(state: Arc<AppState>) -> Router {
    // Configure CORS
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        // Share pages
        .nest("/share", share::routes())
        // Sync status and manual trigger
        .nest("/sync", sync::routes())
        .with_state(state)
        // Add CORS layer
        .layer(cors)
        // Add fallback for unmatched routes
        .fallback(not_found)
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "evermark-api"
    }))
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" })))
}

/// Build a `Cache-Control` header value.
pub fn cache_control(value: &str) -> HeaderValue {
    HeaderValue::from_str(value).unwrap_or_else(|_| HeaderValue::from_static("no-cache"))
}

/// Map an internal error to a JSON 500 without leaking details.
pub fn handle_error(err: anyhow::Error) -> impl IntoResponse {
    tracing::error!("Request failed: {err:#}");
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "Internal server error" })))
}
