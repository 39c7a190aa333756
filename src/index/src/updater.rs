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

//! Pulls new items and tags from upstream, builds a delta index from them,
//! and merges it into the live store a key at a time.

use tagdex_common::ByteSize;
use tagdex_store::{iterator, IterStore};
use tracing::{info, warn};

use crate::checkpoint::StoreState;
use crate::coordinator::Coordinator;
use crate::term_synthesis::{extract_words, hash_word, post_terms};
use crate::upstream::UpstreamClient;

const ITEM_BATCH: u32 = 10_000;
const TAG_BATCH: u32 = 50_000;

/// Pushes `term`'s item id into `builder`, additionally tagging the item
/// into the reserved `__all` key (0) the first time that key sees it.
fn push_term(builder: &mut IterStore, term: &str, item_id: i32) {
    let key = hash_word(term);
    let known = builder.contains(key);
    builder.push_int(key, item_id).expect("int24 push never exceeds an append-friendly codec");
    if !known {
        builder
            .push_int(0, item_id)
            .expect("int24 push never exceeds an append-friendly codec");
    }
}

/// Runs one update tick: fetches at most one batch of items and one batch
/// of tags, merges the resulting delta into the live store, and returns
/// whether either batch was filled (the caller should call again).
pub async fn update_once(coordinator: &Coordinator, upstream: &dyn UpstreamClient) -> bool {
    let snapshot = coordinator.with_read(|live| live.state);

    let mut builder = IterStore::new();
    let mut new_state = snapshot;
    let mut item_batch_full = false;
    let mut tag_batch_full = false;

    match upstream.fetch_items(snapshot.last_item_update_time, ITEM_BATCH).await {
        Ok(items) => {
            item_batch_full = items.len() as u32 == ITEM_BATCH;
            for post in &items {
                let item_id = -post.id;
                for term in post_terms(post) {
                    push_term(&mut builder, &term, item_id);
                }
                new_state.last_item_update_time = post.updated;
            }
        }
        Err(err) => {
            coordinator.metrics().updater_error.inc();
            warn!(error = %err, "could not fetch items from upstream");
        }
    }

    match upstream.fetch_tags(snapshot.last_tag_id, TAG_BATCH).await {
        Ok(tags) => {
            tag_batch_full = tags.len() as u32 == TAG_BATCH;
            for tag in &tags {
                let item_id = -tag.item_id;
                for word in extract_words(&tag.tag) {
                    push_term(&mut builder, &word, item_id);
                }
                if tag.tag.trim().eq_ignore_ascii_case("repost") {
                    push_term(&mut builder, "f:repost", item_id);
                }
                new_state.last_tag_id = tag.id;
            }
        }
        Err(err) => {
            coordinator.metrics().updater_error.inc();
            warn!(error = %err, "could not fetch tags from upstream");
        }
    }

    let delta = build_delta(builder);
    merge_delta(coordinator, &delta);
    coordinator.with_write(|live| live.state = new_state);

    item_batch_full || tag_batch_full
}

/// Finalizes a freshly pushed-to builder into the delta used for merging:
/// per key, dedupe the (possibly repeated, append-order) values and pick
/// the codec that best fits the result.
fn build_delta(builder: IterStore) -> IterStore {
    let mut built = IterStore::new();
    for key in builder.keys() {
        let mut values = iterator::to_vec(
            builder.get_iterator(key).expect("builder store uses known codecs"),
        );
        values.sort_unstable();
        values.dedup();
        built.replace(key, &values).expect("deduped list always encodes");
    }
    built
}

/// Merges every key touched by `delta` into the live store, taking the
/// write lock only for the duration of each key's merge. Keys whose
/// existing posting list is already a superset of the delta are skipped.
fn merge_delta(coordinator: &Coordinator, delta: &IterStore) {
    let keys = delta.keys();
    coordinator.metrics().keys_count.set(
        coordinator.with_read(|live| live.store.key_count() as i64),
    );

    let _guard = coordinator.lock_updater();
    let mut changed_keys = 0i64;

    for key in keys {
        let delta_values = iterator::to_vec(delta.get_iterator(key).expect("delta store uses known codecs"));

        let requires_merge = coordinator.with_read(|live| {
            let existing = iterator::to_vec(
                live.store
                    .get_iterator(key)
                    .expect("live store uses known codecs"),
            );
            delta_values.iter().any(|v| existing.binary_search(v).is_err())
        });

        if !requires_merge {
            continue;
        }

        changed_keys += 1;
        coordinator.with_write(|live| {
            let merged = {
                let existing = live.store.get_iterator(key).expect("live store uses known codecs");
                let delta_iter = tagdex_store::iterator::slice(delta_values.clone());
                iterator::to_vec(iterator::OrIter::new(existing, delta_iter))
            };
            live.store.replace(key, &merged).expect("merged list always encodes");
        });
    }

    coordinator.metrics().updater_keys_changed.inc_by(changed_keys as u64);

    if changed_keys > 0 {
        let memory = coordinator.with_read(|live| ByteSize(live.store.memory_size()));
        info!(%memory, changed_keys, "merged update delta into live store");
    }
}
