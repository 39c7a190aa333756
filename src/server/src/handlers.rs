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

use std::sync::atomic::Ordering;
use std::time::Instant;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tagdex_index::engine::SearchOptions;
use tagdex_index::term_synthesis::{extract_words, hash_word};
use tagdex_query::parser::Parser;
use tagdex_query::optimizer;

use crate::ast_json::node_to_json;
use crate::error::Result;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct QueryParams {
    #[serde(default)]
    pub older: i32,
    #[serde(default)]
    pub random: bool,
}

pub async fn query(
    State(state): State<AppState>,
    Path(query): Path<String>,
    Query(params): Query<QueryParams>,
) -> Result<Json<Value>> {
    let start = Instant::now();
    let opts = SearchOptions {
        older_than: params.older,
        shuffle: params.random,
        use_optimizer: state.optimizer_enabled.load(Ordering::Acquire),
    };

    let items = tagdex_index::search(&state.coordinator, &query, &opts)?;
    let duration = format!("{:?}", start.elapsed());

    Ok(Json(json!({ "duration": duration, "items": items })))
}

pub async fn write_checkpoint(State(state): State<AppState>) -> Result<Json<Value>> {
    let start = Instant::now();

    state
        .coordinator
        .try_run_checkpoint(|| {
            state.coordinator.with_read(|live| {
                tagdex_index::checkpoint::write_file(
                    &state.checkpoint_path,
                    &live.state,
                    &live.store,
                    std::time::SystemTime::now()
                        .duration_since(std::time::UNIX_EPOCH)
                        .unwrap_or_default()
                        .as_nanos(),
                )
            })
        })
        .transpose()
        .map_err(tagdex_index::IndexError::from)?;

    let duration = format!("{:?}", start.elapsed());
    Ok(Json(json!({ "duration": duration })))
}

pub async fn rebuild_items(State(state): State<AppState>) -> Json<Value> {
    state
        .coordinator
        .with_write(|live| live.state.last_item_update_time = 0);
    Json(json!({ "ok": true }))
}

pub async fn rebuild_tags(State(state): State<AppState>) -> Json<Value> {
    state.coordinator.with_write(|live| live.state.last_tag_id = 0);
    Json(json!({ "ok": true }))
}

pub async fn parse(Path(query): Path<String>) -> Result<Json<Value>> {
    let parsed = Parser::parse(&query.to_lowercase()).map_err(tagdex_index::IndexError::from)?;
    let optimized = optimizer::optimize(&parsed);

    Ok(Json(json!({
        "parsed": node_to_json(&parsed),
        "optimized": node_to_json(&optimized),
    })))
}

#[derive(Debug, Deserialize)]
pub struct ConfigParams {
    pub optimize: Option<bool>,
}

pub async fn config(State(state): State<AppState>, Query(params): Query<ConfigParams>) -> Json<Value> {
    if let Some(optimize) = params.optimize {
        state.optimizer_enabled.store(optimize, Ordering::Release);
    }
    Json(json!({ "optimize": state.optimizer_enabled.load(Ordering::Acquire) }))
}

pub async fn delete_tag(State(state): State<AppState>, Path(word): Path<String>) -> Json<Value> {
    let mut evicted = Vec::new();
    for token in extract_words(&word) {
        let key = hash_word(&token);
        state.coordinator.with_write(|live| {
            let _ = live.store.replace(key, &[]);
        });
        evicted.push(token);
    }
    Json(json!({ "evicted": evicted }))
}
