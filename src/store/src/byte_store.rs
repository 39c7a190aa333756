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

//! A flat mapping from a 32-bit key to a mutable byte sequence. This is the
//! lowest layer of the storage engine: it knows nothing about codecs or
//! posting lists, only about growing, shrinking and measuring byte buffers.

use std::collections::HashMap;

/// Fixed per-key bookkeeping overhead counted towards `memory_size`, meant
/// to approximate the allocator/hashmap-entry cost of each live key.
const KEY_OVERHEAD_BYTES: usize = 48;

#[derive(Debug, Default)]
pub struct ByteStore {
    entries: HashMap<u32, Vec<u8>>,
}

impl ByteStore {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Appends a single byte to `key`'s sequence, creating the key if absent.
    pub fn push(&mut self, key: u32, value: u8) {
        self.entries.entry(key).or_default().push(value);
    }

    /// Appends `bytes` to `key`'s sequence, creating the key if absent.
    pub fn push_n(&mut self, key: u32, bytes: &[u8]) {
        self.entries.entry(key).or_default().extend_from_slice(bytes);
    }

    pub fn contains(&self, key: u32) -> bool {
        self.entries.contains_key(&key)
    }

    /// Returns a borrowed view of `key`'s bytes. The view is invalidated by
    /// any subsequent mutation of the same key; callers must not retain it
    /// across such a mutation.
    pub fn get(&self, key: u32) -> &[u8] {
        self.entries.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Empties `key`'s sequence but keeps the key alive.
    pub fn clear(&mut self, key: u32) {
        if let Some(bytes) = self.entries.get_mut(&key) {
            bytes.clear();
        }
    }

    /// Deletes `key` entirely.
    pub fn remove(&mut self, key: u32) {
        self.entries.remove(&key);
    }

    /// Shrinks `key`'s backing allocation to fit its current contents.
    pub fn compact(&mut self, key: u32) {
        if let Some(bytes) = self.entries.get_mut(&key) {
            bytes.shrink_to_fit();
        }
    }

    /// A snapshot of all currently live keys.
    pub fn keys(&self) -> Vec<u32> {
        self.entries.keys().copied().collect()
    }

    pub fn key_count(&self) -> u32 {
        self.entries.len() as u32
    }

    /// Total physical bytes across all lists, plus fixed per-key overhead.
    pub fn memory_size(&self) -> u64 {
        self.entries
            .values()
            .map(|v| v.capacity() as u64 + KEY_OVERHEAD_BYTES as u64)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_creates_key() {
        let mut store = ByteStore::new();
        assert!(!store.contains(1));
        store.push(1, 0xab);
        assert!(store.contains(1));
        assert_eq!(store.get(1), &[0xab]);
    }

    #[test]
    fn push_n_appends() {
        let mut store = ByteStore::new();
        store.push_n(1, &[1, 2, 3]);
        store.push_n(1, &[4, 5]);
        assert_eq!(store.get(1), &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn clear_keeps_key_alive() {
        let mut store = ByteStore::new();
        store.push(1, 9);
        store.clear(1);
        assert!(store.contains(1));
        assert_eq!(store.get(1), &[] as &[u8]);
    }

    #[test]
    fn remove_deletes_key() {
        let mut store = ByteStore::new();
        store.push(1, 9);
        store.remove(1);
        assert!(!store.contains(1));
    }

    #[test]
    fn get_on_missing_key_is_empty() {
        let store = ByteStore::new();
        assert_eq!(store.get(42), &[] as &[u8]);
    }

    #[test]
    fn keys_snapshot_matches_key_count() {
        let mut store = ByteStore::new();
        store.push(1, 1);
        store.push(2, 2);
        store.push(3, 3);
        let mut keys = store.keys();
        keys.sort_unstable();
        assert_eq!(keys, vec![1, 2, 3]);
        assert_eq!(store.key_count(), 3);
    }

    #[test]
    fn memory_size_grows_with_content() {
        let mut store = ByteStore::new();
        let before = store.memory_size();
        store.push_n(1, &[0u8; 1024]);
        store.compact(1);
        assert!(store.memory_size() > before);
    }
}
