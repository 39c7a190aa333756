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

//! The HTTP surface: one `axum::Router` over the index facade, plus the
//! `tokio_postgres` upstream client that feeds the updater.

mod ast_json;
mod error;
mod handlers;
pub mod postgres;

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use axum::http::Method;
use axum::routing::{delete, get, post};
use axum::Router;
use tagdex_index::Coordinator;
use tower_http::cors::{self, CorsLayer};
use tower_http::trace::TraceLayer;

pub use postgres::PostgresUpstream;

#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<Coordinator>,
    pub optimizer_enabled: Arc<AtomicBool>,
    pub checkpoint_path: Arc<PathBuf>,
}

impl AppState {
    pub fn new(coordinator: Arc<Coordinator>, checkpoint_path: PathBuf) -> Self {
        Self {
            coordinator,
            optimizer_enabled: Arc::new(AtomicBool::new(true)),
            checkpoint_path: Arc::new(checkpoint_path),
        }
    }
}

/// Builds the full router: the query path plus the `/admin/*` maintenance
/// endpoints. CORS is wide open, since this API has no browser-facing
/// session state to leak.
pub fn build_router(state: AppState) -> Router {
    let cors_layer = CorsLayer::new()
        .allow_origin(cors::Any)
        .allow_methods(vec![Method::GET, Method::POST, Method::DELETE]);

    Router::new()
        .route("/query/:query", get(handlers::query))
        .route("/admin/write-checkpoint", post(handlers::write_checkpoint))
        .route("/admin/rebuild-items", post(handlers::rebuild_items))
        .route("/admin/rebuild-tags", post(handlers::rebuild_tags))
        .route("/admin/parse/:query", get(handlers::parse))
        .route("/admin/config", post(handlers::config))
        .route("/admin/tag/:word", delete(handlers::delete_tag))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}
