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

//! IPFS metadata resolution and fetching.
//!
//! Metadata is best-effort enrichment: a failed fetch degrades the affected
//! fields to [Fetch::Unavailable] and never blocks the sync.

use std::time::Duration;

use anyhow::Context;

/// Default HTTPS gateway used to resolve `ipfs://` URIs.
pub const DEFAULT_IPFS_GATEWAY: &str = "https://gateway.pinata.cloud";

/// Timeout for a single metadata fetch.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// A metadata field that distinguishes "present" from "absent because the
/// fetch failed" from "not fetched yet".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Fetch<T> {
    Fetched(T),
    Unavailable,
    #[default]
    NotFetched,
}

impl<T> Fetch<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Fetch::Fetched(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Fetch::Fetched(value) => Some(value),
            _ => None,
        }
    }
}

/// Metadata fields of interest on an Evermark's IPFS document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EvermarkMetadata {
    pub name: Fetch<String>,
    pub description: Fetch<String>,
    pub image: Fetch<String>,
    pub content_type: Fetch<String>,
}

impl EvermarkMetadata {
    /// Extract the known fields from a metadata JSON document. Fields the
    /// document does not carry are [Fetch::Unavailable], not empty strings.
    pub fn from_json(doc: &serde_json::Value) -> Self {
        let field = |key: &str| -> Fetch<String> {
            match doc.get(key).and_then(|v| v.as_str()) {
                Some(s) if !s.is_empty() => Fetch::Fetched(s.to_string()),
                _ => Fetch::Unavailable,
            }
        };
        Self {
            name: field("name"),
            description: field("description"),
            image: field("image"),
            content_type: field("contentType"),
        }
    }

    /// The state when every field failed to resolve.
    pub fn unavailable() -> Self {
        Self {
            name: Fetch::Unavailable,
            description: Fetch::Unavailable,
            image: Fetch::Unavailable,
            content_type: Fetch::Unavailable,
        }
    }
}

/// Resolve an `ipfs://<hash>` URI to an HTTPS gateway URL. Already-resolved
/// URLs pass through unchanged, so re-application is a no-op.
pub fn resolve_ipfs_uri(uri: &str, gateway: &str) -> String {
    match uri.strip_prefix("ipfs://") {
        Some(hash) => format!("{}/ipfs/{}", gateway.trim_end_matches('/'), hash),
        None => uri.to_string(),
    }
}

/// Extract the content hash from an `ipfs://` URI, if it is one.
pub fn ipfs_hash(uri: &str) -> Option<&str> {
    uri.strip_prefix("ipfs://")
}

/// HTTP client for IPFS gateway fetches.
pub struct MetadataFetcher {
    client: reqwest::Client,
    gateway: String,
}

impl MetadataFetcher {
    pub fn new(gateway: impl Into<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, gateway: gateway.into() })
    }

    pub fn gateway(&self) -> &str {
        &self.gateway
    }

    /// Fetch the metadata document behind a URI. Errors are the caller's to
    /// handle; [Self::fetch] wraps this with the degrade-to-unavailable
    /// policy.
    pub async fn fetch_json(&self, uri: &str) -> anyhow::Result<serde_json::Value> {
        let url = resolve_ipfs_uri(uri, &self.gateway);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch metadata from {url}"))?
            .error_for_status()
            .with_context(|| format!("Metadata fetch from {url} returned error status"))?;
        response.json().await.with_context(|| format!("Metadata from {url} is not valid JSON"))
    }

    /// Best-effort fetch: failures log a warning and yield a metadata record
    /// whose fields are all [Fetch::Unavailable].
    pub async fn fetch(&self, uri: &str) -> EvermarkMetadata {
        match self.fetch_json(uri).await {
            Ok(doc) => EvermarkMetadata::from_json(&doc),
            Err(err) => {
                tracing::warn!("Metadata fetch failed for {uri}: {err:#}");
                EvermarkMetadata::unavailable()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GATEWAY: &str = "https://gateway.pinata.cloud";

    #[test]
    fn test_resolves_ipfs_scheme() {
        assert_eq!(
            resolve_ipfs_uri("ipfs://QmHash123", GATEWAY),
            "https://gateway.pinata.cloud/ipfs/QmHash123"
        );
        // Trailing slash on the gateway does not double up.
        assert_eq!(
            resolve_ipfs_uri("ipfs://QmHash123", "https://gateway.pinata.cloud/"),
            "https://gateway.pinata.cloud/ipfs/QmHash123"
        );
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let once = resolve_ipfs_uri("ipfs://QmHash123", GATEWAY);
        let twice = resolve_ipfs_uri(&once, GATEWAY);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_non_ipfs_uris_pass_through() {
        assert_eq!(resolve_ipfs_uri("https://example.com/a.json", GATEWAY), "https://example.com/a.json");
    }

    #[test]
    fn test_ipfs_hash_extraction() {
        assert_eq!(ipfs_hash("ipfs://QmHash123"), Some("QmHash123"));
        assert_eq!(ipfs_hash("https://example.com"), None);
    }

    #[test]
    fn test_metadata_from_json() {
        let doc = serde_json::json!({
            "name": "A preserved article",
            "image": "ipfs://QmImg",
            "description": "",
        });
        let metadata = EvermarkMetadata::from_json(&doc);
        assert_eq!(metadata.name, Fetch::Fetched("A preserved article".to_string()));
        assert_eq!(metadata.image, Fetch::Fetched("ipfs://QmImg".to_string()));
        // Empty strings and missing keys are explicitly unavailable.
        assert_eq!(metadata.description, Fetch::Unavailable);
        assert_eq!(metadata.content_type, Fetch::Unavailable);
    }

    #[test]
    fn test_fetch_default_is_not_fetched() {
        let metadata = EvermarkMetadata::default();
        assert_eq!(metadata.name, Fetch::NotFetched);
        assert_eq!(metadata.name.value(), None);
    }
}
