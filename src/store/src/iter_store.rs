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

//! The facade that turns a [`ByteStore`] of raw byte sequences into a store
//! of posting-list iterators, choosing codecs on the caller's behalf.

use crate::byte_store::ByteStore;
use crate::codec::{self, CODEC_INT24};
use crate::error::Result;
use crate::iterator::{self, BoxedIter};

#[derive(Debug, Default)]
pub struct IterStore {
    bytes: ByteStore,
}

impl IterStore {
    pub fn new() -> Self {
        Self {
            bytes: ByteStore::new(),
        }
    }

    pub fn from_byte_store(bytes: ByteStore) -> Self {
        Self { bytes }
    }

    pub fn into_byte_store(self) -> ByteStore {
        self.bytes
    }

    /// Builds a lazy iterator over `key`'s posting list. An absent or empty
    /// key decodes to the empty iterator.
    pub fn get_iterator(&self, key: u32) -> Result<BoxedIter> {
        iterator::decode_leaf(self.bytes.get(key))
    }

    /// Replaces `key`'s whole posting list with `values`, choosing the
    /// smallest codec that fits. An empty `values` removes the key outright
    /// rather than storing a zero-length payload.
    pub fn replace(&mut self, key: u32, values: &[i32]) -> Result<()> {
        if values.is_empty() {
            self.bytes.remove(key);
            return Ok(());
        }

        self.bytes.clear(key);
        let codec_id = codec::optimal_codec(values.len());
        self.bytes.push(key, codec_id);
        let payload = codec::encode(codec_id, values)?;
        self.bytes.push_n(key, &payload);
        self.bytes.compact(key);
        Ok(())
    }

    /// Appends a single value to `key`'s posting list in place. Fresh keys
    /// start out int24-encoded, since int24 is the only append-friendly
    /// codec; existing keys must already use an append-friendly codec.
    pub fn push_int(&mut self, key: u32, value: i32) -> Result<()> {
        let existing = self.bytes.get(key);
        if existing.is_empty() {
            self.bytes.push(key, CODEC_INT24);
            let payload = codec::encode(CODEC_INT24, &[value])?;
            self.bytes.push_n(key, &payload);
        } else {
            let codec_id = existing[0];
            if !codec::can_append(codec_id)? {
                return Err(crate::error::StoreError::AppendNotSupported);
            }
            let payload = codec::encode(CODEC_INT24, &[value])?;
            self.bytes.push_n(key, &payload);
        }
        Ok(())
    }

    pub fn contains(&self, key: u32) -> bool {
        self.bytes.contains(key)
    }

    pub fn keys(&self) -> Vec<u32> {
        self.bytes.keys()
    }

    pub fn key_count(&self) -> u32 {
        self.bytes.key_count()
    }

    pub fn memory_size(&self) -> u64 {
        self.bytes.memory_size()
    }
}

/// Merges every key of `other` into `target` by unioning their posting
/// lists, re-encoding the result with `target`'s usual codec selection.
/// Used by the updater to fold freshly-built deltas into the live store.
pub fn merge_into(target: &mut IterStore, other: &IterStore) -> Result<()> {
    for key in other.keys() {
        let merged = {
            let target_iter = target.get_iterator(key)?;
            let other_iter = other.get_iterator(key)?;
            iterator::to_vec(iterator::OrIter::new(target_iter, other_iter))
        };
        target.replace(key, &merged)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_then_get_round_trips() {
        let mut store = IterStore::new();
        store.replace(7, &[1, 2, 3, 100]).unwrap();
        let values = iterator::to_vec(store.get_iterator(7).unwrap());
        assert_eq!(values, vec![1, 2, 3, 100]);
    }

    #[test]
    fn replace_with_empty_removes_key() {
        let mut store = IterStore::new();
        store.replace(7, &[1]).unwrap();
        assert!(store.contains(7));
        store.replace(7, &[]).unwrap();
        assert!(!store.contains(7));
    }

    #[test]
    fn get_iterator_on_missing_key_is_empty() {
        let store = IterStore::new();
        let values = iterator::to_vec(store.get_iterator(42).unwrap());
        assert_eq!(values, Vec::<i32>::new());
    }

    #[test]
    fn push_int_appends_in_place() {
        let mut store = IterStore::new();
        store.push_int(1, 10).unwrap();
        store.push_int(1, 20).unwrap();
        store.push_int(1, 30).unwrap();
        let values = iterator::to_vec(store.get_iterator(1).unwrap());
        assert_eq!(values, vec![10, 20, 30]);
    }

    #[test]
    fn push_int_after_replace_with_non_append_codec_fails() {
        let mut store = IterStore::new();
        let big: Vec<i32> = (0..200_000).collect();
        store.replace(1, &big).unwrap();
        assert!(store.push_int(1, 1).is_err());
    }

    #[test]
    fn merge_into_unions_matching_keys() {
        let mut target = IterStore::new();
        target.replace(5, &[1, 3, 5]).unwrap();
        let mut other = IterStore::new();
        other.replace(5, &[2, 3, 4]).unwrap();

        merge_into(&mut target, &other).unwrap();
        let values = iterator::to_vec(target.get_iterator(5).unwrap());
        assert_eq!(values, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn merge_into_adds_keys_missing_from_target() {
        let mut target = IterStore::new();
        let mut other = IterStore::new();
        other.replace(9, &[1, 2]).unwrap();

        merge_into(&mut target, &other).unwrap();
        assert!(target.contains(9));
    }

    #[test]
    fn key_count_and_memory_size_pass_through() {
        let mut store = IterStore::new();
        store.replace(1, &[1]).unwrap();
        store.replace(2, &[2]).unwrap();
        assert_eq!(store.key_count(), 2);
        assert!(store.memory_size() > 0);
    }
}
