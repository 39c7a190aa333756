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

//! The domain shapes fetched from upstream, and the trait the updater
//! drives them through. The concrete `tokio-postgres` implementation lives
//! in `tagdex_server`, keeping this crate free of a database dependency.

use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostInfo {
    pub id: i32,
    pub updated: i64,
    pub flags: i32,
    pub created: i64,
    pub has_audio: bool,
    pub width: i32,
    pub mark: i32,
    pub score: i32,
    pub promoted: bool,
    pub username: String,
    pub has_text: bool,
    pub is_controversial: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagInfo {
    pub id: i64,
    pub item_id: i32,
    pub tag: String,
}

/// Errors from this trait's methods are mapped to `IndexError::Updater` by
/// the caller; implementations should never panic on a connection or
/// decoding failure.
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    async fn fetch_items(&self, since_updated: i64, limit: u32) -> anyhow::Result<Vec<PostInfo>>;
    async fn fetch_tags(&self, since_id: i64, limit: u32) -> anyhow::Result<Vec<TagInfo>>;
}
