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

//! Configures the tagdex binary's logging: one `EnvFilter`-backed
//! subscriber, with our own crates raised to a chattier level when
//! `--verbose` is passed.

use tracing_subscriber::filter::{EnvFilter, LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Settings controlling the verbosity of the initialized subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggerSettings {
    pub verbose: bool,
}

fn configure_tagdex_targets(verbose: bool) -> Targets {
    let own_level = if verbose {
        tracing::Level::TRACE
    } else {
        tracing::Level::DEBUG
    };

    Targets::new()
        .with_target("tagdex_store", own_level)
        .with_target("tagdex_query", own_level)
        .with_target("tagdex_index", own_level)
        .with_target("tagdex_server", own_level)
        .with_target("tagdex", own_level)
        .with_default(LevelFilter::INFO)
}

/// Initializes the global `tracing` subscriber. Safe to call once per
/// process; a second call is a programmer error (the underlying
/// `tracing` global dispatcher can only be set once).
pub fn init_logger(settings: LoggerSettings) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer().with_target(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(configure_tagdex_targets(settings.verbose))
        .with(fmt_layer)
        .init();
}
