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

//! Holds the single live index behind a `parking_lot::RwLock`, plus the
//! updater mutex and single-flight gates that keep concurrent background
//! jobs from overlapping.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Mutex, RwLock};
use tagdex_common::Metrics;
use tagdex_store::IterStore;

use crate::checkpoint::StoreState;

pub struct Live {
    pub store: IterStore,
    pub state: StoreState,
}

pub struct Coordinator {
    inner: RwLock<Live>,
    updater_lock: Mutex<()>,
    updater_running: AtomicBool,
    checkpoint_running: AtomicBool,
    metrics: Metrics,
}

impl Coordinator {
    pub fn new(store: IterStore, state: StoreState, metrics: Metrics) -> Self {
        Self {
            inner: RwLock::new(Live { store, state }),
            updater_lock: Mutex::new(()),
            updater_running: AtomicBool::new(false),
            checkpoint_running: AtomicBool::new(false),
            metrics,
        }
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn with_read<R>(&self, f: impl FnOnce(&Live) -> R) -> R {
        Metrics::time(&self.metrics.read_lock, || {
            let guard = self.inner.read();
            f(&guard)
        })
    }

    pub fn with_write<R>(&self, f: impl FnOnce(&mut Live) -> R) -> R {
        Metrics::time(&self.metrics.write_lock, || {
            let mut guard = self.inner.write();
            f(&mut guard)
        })
    }

    /// Serializes concurrent updaters; held only across the merge step, not
    /// across upstream I/O.
    pub fn lock_updater(&self) -> parking_lot::MutexGuard<'_, ()> {
        self.updater_lock.lock()
    }

    /// Runs `f` only if no other call to `try_run_exclusive` with the same
    /// `flag` is currently in progress; otherwise returns `None`
    /// immediately without running `f`. Used to drop overlapping periodic
    /// ticks silently.
    fn try_run_exclusive<R>(flag: &AtomicBool, f: impl FnOnce() -> R) -> Option<R> {
        if flag
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return None;
        }
        let result = f();
        flag.store(false, Ordering::Release);
        Some(result)
    }

    pub fn try_run_updater<R>(&self, f: impl FnOnce() -> R) -> Option<R> {
        Self::try_run_exclusive(&self.updater_running, f)
    }

    pub fn try_run_checkpoint<R>(&self, f: impl FnOnce() -> R) -> Option<R> {
        Self::try_run_exclusive(&self.checkpoint_running, f)
    }
}
