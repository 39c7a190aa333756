// Copyright 2026 The TagDex Authors
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

//! The `tokio_postgres` backed [`UpstreamClient`]. Connects lazily on each
//! call; a dropped connection surfaces as an `anyhow::Error` rather than a
//! panic, matching the updater's tolerance for upstream failure.

use async_trait::async_trait;
use tagdex_index::{PostInfo, TagInfo, UpstreamClient};
use tokio_postgres::NoTls;

const ITEMS_QUERY: &str = "
    SELECT i.id, i.updated, i.flags, i.created, i.audio, i.width, i.mark,
           (i.up - i.down) AS score, (i.promoted <> 0) AS promoted,
           lower(i.username) AS username,
           (t.item_id IS NOT NULL) AS has_text,
           i.is_controversial
    FROM items i
    LEFT JOIN items_text t ON t.item_id = i.id
    WHERE i.updated >= $1
    ORDER BY i.updated ASC
    LIMIT $2";

const TAGS_QUERY: &str = "
    SELECT id, item_id, lower(tag) AS tag
    FROM tags
    WHERE id >= $1
    ORDER BY id ASC
    LIMIT $2";

pub struct PostgresUpstream {
    dsn: String,
}

impl PostgresUpstream {
    pub fn new(dsn: impl Into<String>) -> Self {
        Self { dsn: dsn.into() }
    }

    async fn connect(&self) -> anyhow::Result<tokio_postgres::Client> {
        let (client, connection) = tokio_postgres::connect(&self.dsn, NoTls).await?;
        tokio::spawn(async move {
            if let Err(err) = connection.await {
                tracing::warn!(error = %err, "postgres connection closed with error");
            }
        });
        Ok(client)
    }
}

#[async_trait]
impl UpstreamClient for PostgresUpstream {
    async fn fetch_items(&self, since_updated: i64, limit: u32) -> anyhow::Result<Vec<PostInfo>> {
        let client = self.connect().await?;
        let rows = client
            .query(ITEMS_QUERY, &[&since_updated, &(limit as i64)])
            .await?;

        Ok(rows
            .iter()
            .map(|row| PostInfo {
                id: row.get("id"),
                updated: row.get("updated"),
                flags: row.get("flags"),
                created: row.get("created"),
                has_audio: row.get("audio"),
                width: row.get("width"),
                mark: row.get("mark"),
                score: row.get("score"),
                promoted: row.get("promoted"),
                username: row.get("username"),
                has_text: row.get("has_text"),
                is_controversial: row.get("is_controversial"),
            })
            .collect())
    }

    async fn fetch_tags(&self, since_id: i64, limit: u32) -> anyhow::Result<Vec<TagInfo>> {
        let client = self.connect().await?;
        let rows = client
            .query(TAGS_QUERY, &[&since_id, &(limit as i64)])
            .await?;

        Ok(rows
            .iter()
            .map(|row| TagInfo {
                id: row.get("id"),
                item_id: row.get("item_id"),
                tag: row.get("tag"),
            })
            .collect())
    }
}
