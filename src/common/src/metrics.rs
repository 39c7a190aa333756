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

//! Named counters/gauges/timers, one registry shared by the whole process.
//! Names follow the `tags.<area>.<thing>` scheme of the original service.

use std::time::Instant;

use prometheus::{Histogram, HistogramOpts, IntCounter, IntGauge, Opts, Registry};

pub struct Metrics {
    pub registry: Registry,
    pub search: Histogram,
    pub read_lock: Histogram,
    pub write_lock: Histogram,
    pub updater_keys_changed: IntCounter,
    pub updater_error: IntCounter,
    pub checkpoint_error: IntCounter,
    pub keys_count: IntGauge,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let search = Histogram::with_opts(HistogramOpts::new(
            "tags_search_seconds",
            "Time spent executing a search query",
        ))
        .unwrap();
        let read_lock = Histogram::with_opts(HistogramOpts::new(
            "tags_readlock_seconds",
            "Time spent waiting for and holding the index read lock",
        ))
        .unwrap();
        let write_lock = Histogram::with_opts(HistogramOpts::new(
            "tags_writelock_seconds",
            "Time spent waiting for and holding the index write lock",
        ))
        .unwrap();
        let updater_keys_changed = IntCounter::with_opts(Opts::new(
            "tags_updater_keys_changed_total",
            "Number of posting lists touched by a merge",
        ))
        .unwrap();
        let updater_error = IntCounter::with_opts(Opts::new(
            "tags_updater_error_total",
            "Number of failed updater ticks",
        ))
        .unwrap();
        let checkpoint_error = IntCounter::with_opts(Opts::new(
            "tags_checkpoint_error_total",
            "Number of failed checkpoint writes",
        ))
        .unwrap();
        let keys_count = IntGauge::with_opts(Opts::new(
            "tags_keys_count",
            "Number of live keys in the store",
        ))
        .unwrap();

        registry.register(Box::new(search.clone())).unwrap();
        registry.register(Box::new(read_lock.clone())).unwrap();
        registry.register(Box::new(write_lock.clone())).unwrap();
        registry
            .register(Box::new(updater_keys_changed.clone()))
            .unwrap();
        registry.register(Box::new(updater_error.clone())).unwrap();
        registry
            .register(Box::new(checkpoint_error.clone()))
            .unwrap();
        registry.register(Box::new(keys_count.clone())).unwrap();

        Self {
            registry,
            search,
            read_lock,
            write_lock,
            updater_keys_changed,
            updater_error,
            checkpoint_error,
            keys_count,
        }
    }

    /// Times `f`, recording its duration into `histogram`, and returns `f`'s result.
    pub fn time<T>(histogram: &Histogram, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let result = f();
        histogram.observe(start.elapsed().as_secs_f64());
        result
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_observations() {
        let metrics = Metrics::new();
        Metrics::time(&metrics.search, || {
            1 + 1
        });
        assert_eq!(metrics.search.get_sample_count(), 1);

        metrics.updater_error.inc();
        assert_eq!(metrics.updater_error.get(), 1);
    }
}
