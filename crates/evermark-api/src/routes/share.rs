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

//! Share pages: HTML documents carrying the social-preview meta tags for an
//! Evermark, with a client-side redirect into the app.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use evermark_indexer::{db::EvermarkRow, metadata::resolve_ipfs_uri};

use crate::handler::cache_control;
use crate::state::AppState;

/// Create share routes
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/evermark/:id", get(share_evermark))
}

/// GET /share/evermark/:id
async fn share_evermark(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    let token_id = match id.parse::<u64>() {
        Ok(token_id) => token_id,
        Err(_) => return not_found_page(&state.app_url),
    };

    let row = match state.db.get_evermark(token_id).await {
        Ok(row) => row,
        Err(err) => {
            tracing::error!("Share page lookup failed for {token_id}: {err:#}");
            None
        }
    };

    match row {
        Some(row) => {
            let html = render_share_page(&row, &state.app_url, &state.ipfs_gateway);
            let mut res = Html(html).into_response();
            res.headers_mut()
                .insert(header::CACHE_CONTROL, cache_control("public, max-age=300"));
            res
        }
        None => not_found_page(&state.app_url),
    }
}

fn not_found_page(app_url: &str) -> Response {
    let html = render_default_page(app_url);
    let mut res = (StatusCode::NOT_FOUND, Html(html)).into_response();
    res.headers_mut().insert(header::CACHE_CONTROL, cache_control("public, max-age=60"));
    res
}

/// Minimal HTML escaping for text placed into attribute values and bodies.
fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Render the share page for one Evermark.
fn render_share_page(row: &EvermarkRow, app_url: &str, gateway: &str) -> String {
    let title = escape_html(&row.title);
    let description = escape_html(
        row.description.as_deref().unwrap_or("Content preserved forever on Evermark"),
    );
    let image = row
        .image_uri
        .as_deref()
        .map(|uri| resolve_ipfs_uri(uri, gateway))
        .unwrap_or_else(|| format!("{app_url}/og-default.png"));
    let image = escape_html(&image);
    let target = format!("{}/evermark/{}", app_url.trim_end_matches('/'), row.token_id);

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title} | Evermark</title>
<meta name="description" content="{description}">
<meta property="og:type" content="article">
<meta property="og:title" content="{title}">
<meta property="og:description" content="{description}">
<meta property="og:image" content="{image}">
<meta property="og:url" content="{target}">
<meta name="twitter:card" content="summary_large_image">
<meta name="twitter:title" content="{title}">
<meta name="twitter:description" content="{description}">
<meta name="twitter:image" content="{image}">
<meta name="fc:frame" content="vNext">
<meta name="fc:frame:image" content="{image}">
<meta name="fc:frame:button:1" content="View Evermark">
<meta name="fc:frame:button:1:action" content="link">
<meta name="fc:frame:button:1:target" content="{target}">
<meta http-equiv="refresh" content="0;url={target}">
</head>
<body>
<p>Redirecting to <a href="{target}">{title}</a>…</p>
</body>
</html>
"#
    )
}

/// Share page shown when the Evermark is unknown.
fn render_default_page(app_url: &str) -> String {
    let target = app_url.trim_end_matches('/');
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Evermark</title>
<meta property="og:title" content="Evermark">
<meta property="og:description" content="Preserve and curate content on-chain">
<meta name="twitter:card" content="summary">
<meta http-equiv="refresh" content="0;url={target}">
</head>
<body>
<p>Evermark not found. <a href="{target}">Go to Evermark</a></p>
</body>
</html>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::U256;

    fn row() -> EvermarkRow {
        EvermarkRow {
            token_id: 42,
            title: "Tom & \"Jerry\" <review>".to_string(),
            creator: "alice".to_string(),
            owner: "0x0000000000000000000000000000000000000001".to_string(),
            metadata_uri: "ipfs://QmMeta".to_string(),
            image_uri: Some("ipfs://QmImg".to_string()),
            description: Some("A preserved article".to_string()),
            content_type: Some("article".to_string()),
            vote_count: U256::ZERO,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_escapes_html_in_metadata() {
        let html = render_share_page(&row(), "https://evermarks.net", "https://gw");
        assert!(html.contains("Tom &amp; &quot;Jerry&quot; &lt;review&gt;"));
        assert!(!html.contains("<review>"));
    }

    #[test]
    fn test_share_page_carries_preview_tags_and_redirect() {
        let html = render_share_page(&row(), "https://evermarks.net", "https://gw");
        assert!(html.contains(r#"property="og:title""#));
        assert!(html.contains(r#"name="twitter:card""#));
        assert!(html.contains(r#"name="fc:frame" content="vNext""#));
        assert!(html.contains("https://gw/ipfs/QmImg"));
        assert!(html.contains(r#"refresh" content="0;url=https://evermarks.net/evermark/42"#));
    }

    #[test]
    fn test_missing_image_falls_back_to_default() {
        let mut r = row();
        r.image_uri = None;
        let html = render_share_page(&r, "https://evermarks.net", "https://gw");
        assert!(html.contains("https://evermarks.net/og-default.png"));
    }

    #[test]
    fn test_default_page_redirects_to_app() {
        let html = render_default_page("https://evermarks.net/");
        assert!(html.contains("0;url=https://evermarks.net"));
    }
}
