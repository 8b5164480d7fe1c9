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

use std::{str::FromStr, sync::Arc, time::Duration};

use alloy::primitives::U256;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{any::AnyPoolOptions, AnyPool, Row};

use super::DbError;

pub type EvermarkDbObj = Arc<dyn EvermarkIndexerDb + Send + Sync>;

/// Convert a U256 to a zero-padded string for proper database sorting.
/// U256 max value has 78 decimal digits.
fn pad_u256(value: U256) -> String {
    format!("{:0>78}", value)
}

/// Convert a zero-padded string back to U256.
fn unpad_u256(s: &str) -> Result<U256, DbError> {
    U256::from_str(s.trim_start_matches('0')).or_else(|_| {
        // If trimming removed every character, the value is 0
        if s.chars().all(|c| c == '0') {
            Ok(U256::ZERO)
        } else {
            Err(DbError::BadValue(format!("Invalid U256 string: {}", s)))
        }
    })
}

/// One mirrored Evermark NFT, enriched with whatever IPFS metadata resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvermarkRow {
    pub token_id: u64,
    pub title: String,
    pub creator: String,
    pub owner: String,
    pub metadata_uri: String,
    pub image_uri: Option<String>,
    pub description: Option<String>,
    pub content_type: Option<String>,
    pub vote_count: U256,
    pub created_at: i64,
    pub updated_at: i64,
}

/// One sync run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncLogRow {
    pub started_at: i64,
    pub finished_at: i64,
    pub from_block: u64,
    pub to_block: u64,
    pub evermarks_synced: u64,
    pub votes_synced: u64,
    pub status: String,
    pub error: Option<String>,
}

#[async_trait]
pub trait EvermarkIndexerDb {
    async fn upsert_evermark(&self, row: &EvermarkRow) -> Result<(), DbError>;
    async fn get_evermark(&self, token_id: u64) -> Result<Option<EvermarkRow>, DbError>;
    /// Evermarks ordered by vote count, highest first.
    async fn leaderboard(&self, limit: u64, offset: u64) -> Result<Vec<EvermarkRow>, DbError>;
    async fn get_vote_count(&self, token_id: u64) -> Result<Option<U256>, DbError>;
    async fn set_vote_count(&self, token_id: u64, votes: U256) -> Result<(), DbError>;

    /// Read a cache entry. Expired entries are misses and are deleted.
    async fn cache_get(&self, key: &str) -> Result<Option<String>, DbError>;
    /// Write a cache entry. `ttl == None` means the entry never expires.
    async fn cache_set(&self, key: &str, value: &str, ttl: Option<Duration>)
        -> Result<(), DbError>;

    async fn ipfs_cache_get(&self, hash: &str) -> Result<Option<serde_json::Value>, DbError>;
    async fn ipfs_cache_put(
        &self,
        hash: &str,
        metadata: &serde_json::Value,
    ) -> Result<(), DbError>;

    async fn insert_sync_log(&self, log: &SyncLogRow) -> Result<(), DbError>;
    async fn latest_sync_log(&self) -> Result<Option<SyncLogRow>, DbError>;
}

pub struct EvermarkDb {
    pool: AnyPool,
}

impl EvermarkDb {
    pub async fn new(database_url: &str) -> Result<Self, DbError> {
        sqlx::any::install_default_drivers();
        let pool = AnyPoolOptions::new().max_connections(20).connect(database_url).await?;

        // Run migrations
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }
}

fn row_to_evermark(row: &sqlx::any::AnyRow) -> Result<EvermarkRow, DbError> {
    Ok(EvermarkRow {
        token_id: row.get::<i64, _>("token_id") as u64,
        title: row.get("title"),
        creator: row.get("creator"),
        owner: row.get("owner"),
        metadata_uri: row.get("metadata_uri"),
        image_uri: row.get("image_uri"),
        description: row.get("description"),
        content_type: row.get("content_type"),
        vote_count: unpad_u256(&row.get::<String, _>("vote_count"))?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[async_trait]
impl EvermarkIndexerDb for EvermarkDb {
    async fn upsert_evermark(&self, row: &EvermarkRow) -> Result<(), DbError> {
        sqlx::query(
            r#"INSERT INTO evermarks
               (token_id, title, creator, owner, metadata_uri, image_uri, description,
                content_type, vote_count, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
               ON CONFLICT (token_id)
               DO UPDATE SET
                   title = EXCLUDED.title,
                   creator = EXCLUDED.creator,
                   owner = EXCLUDED.owner,
                   metadata_uri = EXCLUDED.metadata_uri,
                   image_uri = EXCLUDED.image_uri,
                   description = EXCLUDED.description,
                   content_type = EXCLUDED.content_type,
                   updated_at = EXCLUDED.updated_at"#,
        )
        .bind(row.token_id as i64)
        .bind(&row.title)
        .bind(&row.creator)
        .bind(&row.owner)
        .bind(&row.metadata_uri)
        .bind(&row.image_uri)
        .bind(&row.description)
        .bind(&row.content_type)
        .bind(pad_u256(row.vote_count))
        .bind(row.created_at)
        .bind(row.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_evermark(&self, token_id: u64) -> Result<Option<EvermarkRow>, DbError> {
        let row = sqlx::query("SELECT * FROM evermarks WHERE token_id = $1")
            .bind(token_id as i64)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_evermark).transpose()
    }

    async fn leaderboard(&self, limit: u64, offset: u64) -> Result<Vec<EvermarkRow>, DbError> {
        let rows = sqlx::query(
            "SELECT * FROM evermarks ORDER BY vote_count DESC, token_id ASC LIMIT $1 OFFSET $2",
        )
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_evermark).collect()
    }

    async fn get_vote_count(&self, token_id: u64) -> Result<Option<U256>, DbError> {
        let row = sqlx::query("SELECT vote_count FROM evermarks WHERE token_id = $1")
            .bind(token_id as i64)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| unpad_u256(&r.get::<String, _>("vote_count"))).transpose()
    }

    async fn set_vote_count(&self, token_id: u64, votes: U256) -> Result<(), DbError> {
        sqlx::query("UPDATE evermarks SET vote_count = $1, updated_at = $2 WHERE token_id = $3")
            .bind(pad_u256(votes))
            .bind(Utc::now().timestamp())
            .bind(token_id as i64)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn cache_get(&self, key: &str) -> Result<Option<String>, DbError> {
        let row = sqlx::query("SELECT value, expires_at FROM blockchain_cache WHERE cache_key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        if let Some(expires_at) = row.get::<Option<i64>, _>("expires_at") {
            if expires_at <= Utc::now().timestamp() {
                // Stale data must never be served; drop the row on read.
                sqlx::query("DELETE FROM blockchain_cache WHERE cache_key = $1")
                    .bind(key)
                    .execute(&self.pool)
                    .await?;
                return Ok(None);
            }
        }

        Ok(Some(row.get::<String, _>("value")))
    }

    async fn cache_set(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
    ) -> Result<(), DbError> {
        let expires_at = ttl.map(|ttl| Utc::now().timestamp() + ttl.as_secs() as i64);
        sqlx::query(
            r#"INSERT INTO blockchain_cache (cache_key, value, expires_at)
               VALUES ($1, $2, $3)
               ON CONFLICT (cache_key)
               DO UPDATE SET value = EXCLUDED.value, expires_at = EXCLUDED.expires_at"#,
        )
        .bind(key)
        .bind(value)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn ipfs_cache_get(&self, hash: &str) -> Result<Option<serde_json::Value>, DbError> {
        let row = sqlx::query("SELECT metadata FROM ipfs_cache WHERE hash = $1")
            .bind(hash)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| {
            serde_json::from_str(&r.get::<String, _>("metadata"))
                .map_err(|e| DbError::BadValue(format!("Invalid cached metadata JSON: {e}")))
        })
        .transpose()
    }

    async fn ipfs_cache_put(
        &self,
        hash: &str,
        metadata: &serde_json::Value,
    ) -> Result<(), DbError> {
        sqlx::query(
            r#"INSERT INTO ipfs_cache (hash, metadata, fetched_at)
               VALUES ($1, $2, $3)
               ON CONFLICT (hash)
               DO UPDATE SET metadata = EXCLUDED.metadata, fetched_at = EXCLUDED.fetched_at"#,
        )
        .bind(hash)
        .bind(metadata.to_string())
        .bind(Utc::now().timestamp())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_sync_log(&self, log: &SyncLogRow) -> Result<(), DbError> {
        sqlx::query(
            r#"INSERT INTO sync_logs
               (started_at, finished_at, from_block, to_block, evermarks_synced,
                votes_synced, status, error)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
               ON CONFLICT (started_at)
               DO UPDATE SET
                   finished_at = EXCLUDED.finished_at,
                   to_block = EXCLUDED.to_block,
                   evermarks_synced = EXCLUDED.evermarks_synced,
                   votes_synced = EXCLUDED.votes_synced,
                   status = EXCLUDED.status,
                   error = EXCLUDED.error"#,
        )
        .bind(log.started_at)
        .bind(log.finished_at)
        .bind(log.from_block as i64)
        .bind(log.to_block as i64)
        .bind(log.evermarks_synced as i64)
        .bind(log.votes_synced as i64)
        .bind(&log.status)
        .bind(&log.error)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn latest_sync_log(&self) -> Result<Option<SyncLogRow>, DbError> {
        let row = sqlx::query("SELECT * FROM sync_logs ORDER BY started_at DESC LIMIT 1")
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| SyncLogRow {
            started_at: r.get("started_at"),
            finished_at: r.get("finished_at"),
            from_block: r.get::<i64, _>("from_block") as u64,
            to_block: r.get::<i64, _>("to_block") as u64,
            evermarks_synced: r.get::<i64, _>("evermarks_synced") as u64,
            votes_synced: r.get::<i64, _>("votes_synced") as u64,
            status: r.get("status"),
            error: r.get("error"),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> EvermarkDb {
        // Each pooled connection to a plain `sqlite::memory:` URL gets its own
        // private database, so migrations would be invisible to later
        // connections. A uniquely named shared-cache in-memory database gives
        // every connection in the pool the same schema while keeping tests
        // isolated from each other.
        use std::sync::atomic::{AtomicU64, Ordering};
        static NEXT_DB: AtomicU64 = AtomicU64::new(0);
        let n = NEXT_DB.fetch_add(1, Ordering::Relaxed);
        EvermarkDb::new(&format!("sqlite:file:evermark_test_{n}?mode=memory&cache=shared"))
            .await
            .unwrap()
    }

    fn row(token_id: u64, votes: u64) -> EvermarkRow {
        EvermarkRow {
            token_id,
            title: format!("Evermark #{token_id}"),
            creator: "alice".to_string(),
            owner: "0x0000000000000000000000000000000000000001".to_string(),
            metadata_uri: format!("ipfs://Qm{token_id}"),
            image_uri: None,
            description: Some("preserved content".to_string()),
            content_type: Some("article".to_string()),
            vote_count: U256::from(votes),
            created_at: 1_700_000_000,
            updated_at: 1_700_000_000,
        }
    }

    #[test]
    fn test_u256_padding_round_trip() {
        for value in [U256::ZERO, U256::from(1), U256::from(u64::MAX), U256::MAX] {
            let padded = pad_u256(value);
            assert_eq!(padded.len(), 78);
            assert_eq!(unpad_u256(&padded).unwrap(), value);
        }
    }

    #[tokio::test]
    async fn test_upsert_and_get_evermark() {
        let db = test_db().await;
        db.upsert_evermark(&row(1, 5)).await.unwrap();

        let got = db.get_evermark(1).await.unwrap().unwrap();
        assert_eq!(got.title, "Evermark #1");
        assert_eq!(got.vote_count, U256::from(5));
        assert!(db.get_evermark(2).await.unwrap().is_none());

        // Upsert preserves the vote count and updates metadata fields.
        let mut updated = row(1, 0);
        updated.title = "Renamed".to_string();
        db.upsert_evermark(&updated).await.unwrap();
        let got = db.get_evermark(1).await.unwrap().unwrap();
        assert_eq!(got.title, "Renamed");
        assert_eq!(got.vote_count, U256::from(5));
    }

    #[tokio::test]
    async fn test_leaderboard_orders_by_votes() {
        let db = test_db().await;
        db.upsert_evermark(&row(1, 10)).await.unwrap();
        db.upsert_evermark(&row(2, 30)).await.unwrap();
        db.upsert_evermark(&row(3, 20)).await.unwrap();

        let board = db.leaderboard(10, 0).await.unwrap();
        let ids: Vec<u64> = board.iter().map(|r| r.token_id).collect();
        assert_eq!(ids, vec![2, 3, 1]);

        let page = db.leaderboard(1, 1).await.unwrap();
        assert_eq!(page[0].token_id, 3);
    }

    #[tokio::test]
    async fn test_vote_count_update() {
        let db = test_db().await;
        db.upsert_evermark(&row(1, 0)).await.unwrap();
        assert_eq!(db.get_vote_count(1).await.unwrap(), Some(U256::ZERO));
        assert_eq!(db.get_vote_count(9).await.unwrap(), None);

        db.set_vote_count(1, U256::from(42)).await.unwrap();
        assert_eq!(db.get_vote_count(1).await.unwrap(), Some(U256::from(42)));
    }

    #[tokio::test]
    async fn test_cache_round_trip_and_expiry() {
        let db = test_db().await;

        db.cache_set("cursor", "12345", None).await.unwrap();
        assert_eq!(db.cache_get("cursor").await.unwrap(), Some("12345".to_string()));

        db.cache_set("fresh", "ok", Some(Duration::from_secs(3600))).await.unwrap();
        assert_eq!(db.cache_get("fresh").await.unwrap(), Some("ok".to_string()));

        // A zero TTL expires immediately: the read must be a miss, never
        // stale data.
        db.cache_set("stale", "old", Some(Duration::ZERO)).await.unwrap();
        assert_eq!(db.cache_get("stale").await.unwrap(), None);
        // The expired row was dropped on read.
        assert_eq!(db.cache_get("stale").await.unwrap(), None);

        assert_eq!(db.cache_get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_ipfs_cache() {
        let db = test_db().await;
        let metadata = serde_json::json!({"name": "t", "image": "ipfs://QmImg"});

        assert!(db.ipfs_cache_get("QmA").await.unwrap().is_none());
        db.ipfs_cache_put("QmA", &metadata).await.unwrap();
        assert_eq!(db.ipfs_cache_get("QmA").await.unwrap(), Some(metadata));
    }

    #[tokio::test]
    async fn test_sync_logs() {
        let db = test_db().await;
        assert!(db.latest_sync_log().await.unwrap().is_none());

        let first = SyncLogRow {
            started_at: 100,
            finished_at: 110,
            from_block: 0,
            to_block: 500,
            evermarks_synced: 3,
            votes_synced: 7,
            status: "success".to_string(),
            error: None,
        };
        let second = SyncLogRow {
            started_at: 200,
            finished_at: 210,
            from_block: 501,
            to_block: 900,
            evermarks_synced: 0,
            votes_synced: 0,
            status: "failed".to_string(),
            error: Some("rpc timeout".to_string()),
        };
        db.insert_sync_log(&first).await.unwrap();
        db.insert_sync_log(&second).await.unwrap();

        let latest = db.latest_sync_log().await.unwrap().unwrap();
        assert_eq!(latest, second);
    }
}
