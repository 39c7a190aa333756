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

//! Binary entry point: load a checkpoint, stand up the HTTP server, and
//! drive the updater and checkpoint-writer loops until the process exits.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use clap::Parser;
use tagdex_common::{init_logger, LoggerSettings, Metrics, Opts};
use tagdex_index::{checkpoint, updater, Coordinator};
use tagdex_server::{AppState, PostgresUpstream};
use tagdex_store::IterStore;

const UPDATER_TICK: Duration = Duration::from_secs(5);
const CHECKPOINT_TICK: Duration = Duration::from_secs(60);

const BENCHMARK_QUERY: &str = "((u:cha0s&f:sfw)-f:top)&webm";
const BENCHMARK_REPS: u32 = 3000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let opts = Opts::parse();
    init_logger(LoggerSettings { verbose: opts.verbose });

    let checkpoint_path = PathBuf::from(&opts.checkpoint_file);
    if let Ok(removed) = checkpoint::clean_stray_temp_files(&checkpoint_path) {
        if removed > 0 {
            tracing::info!(removed, "cleaned up stray checkpoint temp files");
        }
    }

    let mut store = IterStore::new();
    let mut state = checkpoint::read_file(&checkpoint_path, &mut store)?.unwrap_or_default();

    if opts.rebuild_items {
        state.last_item_update_time = 0;
    }
    if opts.rebuild_tags {
        state.last_tag_id = 0;
    }

    let coordinator = Arc::new(Coordinator::new(store, state, Metrics::new()));

    if opts.benchmark {
        run_benchmark(&coordinator);
        std::process::exit(1);
    }

    let upstream = Arc::new(PostgresUpstream::new(opts.postgres.clone()));

    let app_state = AppState::new(coordinator.clone(), checkpoint_path.clone());
    let listen_addr = opts.normalized_listen_addr()?;
    let listener = tokio::net::TcpListener::bind(listen_addr.as_str()).await?;
    tracing::info!(addr = %listen_addr, "listening for http requests");

    let server = tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, tagdex_server::build_router(app_state)).await {
            tracing::error!(error = %err, "http server exited");
        }
    });

    let updater_task = tokio::spawn(run_updater_loop(coordinator.clone(), upstream));
    let checkpoint_task = tokio::spawn(run_checkpoint_loop(coordinator.clone(), checkpoint_path));

    tokio::select! {
        res = server => res?,
        res = updater_task => res?,
        res = checkpoint_task => res?,
    }

    Ok(())
}

/// Runs a fixed query a lot of times and exits, for profiling the query
/// engine against a warm, already-checkpointed store.
fn run_benchmark(coordinator: &Coordinator) {
    let opts = tagdex_index::engine::SearchOptions {
        older_than: 0,
        shuffle: false,
        use_optimizer: true,
    };

    let start = std::time::Instant::now();
    for _ in 0..BENCHMARK_REPS {
        if let Err(err) = tagdex_index::search(coordinator, BENCHMARK_QUERY, &opts) {
            tracing::error!(error = %err, "benchmark query failed");
            break;
        }
    }

    tracing::info!(
        reps = BENCHMARK_REPS,
        elapsed = ?start.elapsed(),
        "benchmark run complete"
    );
}

async fn run_updater_loop(coordinator: Arc<Coordinator>, upstream: Arc<PostgresUpstream>) {
    let mut ticker = tokio::time::interval(UPDATER_TICK);
    loop {
        ticker.tick().await;
        let coordinator = coordinator.clone();
        let upstream = upstream.clone();
        let ran = coordinator.clone().try_run_updater(move || async move {
            loop {
                if !updater::update_once(&coordinator, upstream.as_ref()).await {
                    break;
                }
            }
        });
        if let Some(fut) = ran {
            fut.await;
        }
    }
}

async fn run_checkpoint_loop(coordinator: Arc<Coordinator>, path: PathBuf) {
    let mut ticker = tokio::time::interval(CHECKPOINT_TICK);
    loop {
        ticker.tick().await;
        let result = coordinator.try_run_checkpoint(|| {
            coordinator.with_read(|live| {
                let now_nanos = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_nanos();
                checkpoint::write_file(&path, &live.state, &live.store, now_nanos)
            })
        });

        match result {
            Some(Err(err)) => {
                coordinator.metrics().checkpoint_error.inc();
                tracing::error!(error = %err, "checkpoint write failed");
            }
            Some(Ok(())) => tracing::debug!("checkpoint written"),
            None => {}
        }
    }
}
