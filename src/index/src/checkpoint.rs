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

//! Atomic binary snapshots of the store: a JSON-encoded header followed by
//! a big-endian key/value-count/values record per key. Writes go through a
//! temp file and an atomic rename so a crash mid-write never corrupts the
//! live checkpoint.

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use serde::{Deserialize, Serialize};
use tagdex_store::IterStore;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreState {
    pub last_tag_id: i64,
    pub last_item_update_time: i64,
}

pub fn write(writer: &mut impl Write, state: &StoreState, store: &IterStore) -> io::Result<()> {
    let json = serde_json::to_vec(state).map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    writer.write_u32::<BigEndian>(json.len() as u32)?;
    writer.write_all(&json)?;

    let keys = store.keys();
    writer.write_u32::<BigEndian>(keys.len() as u32)?;

    for key in keys {
        let values = tagdex_store::iterator::to_vec(
            store.get_iterator(key).map_err(|e| io::Error::new(io::ErrorKind::Other, e))?,
        );
        writer.write_u32::<BigEndian>(key)?;
        writer.write_u32::<BigEndian>(values.len() as u32)?;
        for value in values {
            writer.write_i32::<BigEndian>(value)?;
        }
    }

    Ok(())
}

pub fn read(reader: &mut impl Read, store: &mut IterStore) -> io::Result<StoreState> {
    let json_len = reader.read_u32::<BigEndian>()?;
    let mut json = vec![0u8; json_len as usize];
    reader.read_exact(&mut json)?;
    let state: StoreState = serde_json::from_slice(&json).map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    let key_count = reader.read_u32::<BigEndian>()?;
    for _ in 0..key_count {
        let key = reader.read_u32::<BigEndian>()?;
        let value_count = reader.read_u32::<BigEndian>()?;
        let mut values = Vec::with_capacity(value_count as usize);
        for _ in 0..value_count {
            values.push(reader.read_i32::<BigEndian>()?);
        }
        store.replace(key, &values).map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    }

    Ok(state)
}

/// Writes `state`/`store` to a fresh temp file beside `path` and atomically
/// renames it into place. The temp file's name embeds the current time so
/// concurrent writers (there should only ever be one, per the updater
/// mutex) never collide.
pub fn write_file(path: &Path, state: &StoreState, store: &IterStore, now_nanos: u128) -> io::Result<()> {
    let temp_path = temp_path_for(path, now_nanos);
    {
        let file = std::fs::File::create(&temp_path)?;
        let mut writer = io::BufWriter::with_capacity(16 * 1024, file);
        write(&mut writer, state, store)?;
        writer.flush()?;
        writer.into_inner().map_err(|e| e.into_error())?.sync_all()?;
    }
    std::fs::rename(&temp_path, path)
}

fn temp_path_for(path: &Path, now_nanos: u128) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(format!(".{now_nanos}"));
    PathBuf::from(name)
}

/// Reads a checkpoint from `path`. A missing file is not an error: callers
/// should treat it as "start from zero" and fall back to a default state
/// and an empty store.
pub fn read_file(path: &Path, store: &mut IterStore) -> io::Result<Option<StoreState>> {
    if !path.exists() {
        return Ok(None);
    }

    let file = std::fs::File::open(path)?;
    let mut reader = io::BufReader::with_capacity(16 * 1024, file);
    read(&mut reader, store).map(Some)
}

/// Globs `<final>.<digits>` temp files left behind by a crash mid-write
/// and removes them. Call this before [`read_file`] on startup.
pub fn clean_stray_temp_files(path: &Path) -> io::Result<usize> {
    let pattern = format!("{}.*", path.display());
    let mut removed = 0;
    for entry in glob::glob(&pattern).map_err(|e| io::Error::new(io::ErrorKind::Other, e))?.flatten() {
        if entry
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.chars().all(|c| c.is_ascii_digit()))
        {
            std::fs::remove_file(&entry)?;
            removed += 1;
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn write_then_read_round_trips_state_and_keys() {
        let mut store = IterStore::new();
        store.replace(1, &[1, 2, 3]).unwrap();
        store.replace(5, &[-10, -1, 100]).unwrap();

        let state = StoreState {
            last_tag_id: 42,
            last_item_update_time: 1_700_000_000,
        };

        let mut buf = Vec::new();
        write(&mut buf, &state, &store).unwrap();

        let mut restored = IterStore::new();
        let restored_state = read(&mut Cursor::new(buf), &mut restored).unwrap();

        assert_eq!(restored_state, state);
        assert_eq!(
            tagdex_store::iterator::to_vec(restored.get_iterator(1).unwrap()),
            vec![1, 2, 3]
        );
        assert_eq!(
            tagdex_store::iterator::to_vec(restored.get_iterator(5).unwrap()),
            vec![-10, -1, 100]
        );
    }

    #[test]
    fn empty_store_round_trips() {
        let store = IterStore::new();
        let state = StoreState::default();
        let mut buf = Vec::new();
        write(&mut buf, &state, &store).unwrap();

        let mut restored = IterStore::new();
        let restored_state = read(&mut Cursor::new(buf), &mut restored).unwrap();
        assert_eq!(restored_state, state);
        assert_eq!(restored.key_count(), 0);
    }

    #[test]
    fn write_file_then_read_file_round_trips_via_the_filesystem() {
        let dir = std::env::temp_dir().join(format!("tagdex-checkpoint-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("checkpoint.store");

        let mut store = IterStore::new();
        store.replace(7, &[9, 10]).unwrap();
        let state = StoreState {
            last_tag_id: 3,
            last_item_update_time: 9,
        };

        write_file(&path, &state, &store, 123).unwrap();
        assert!(path.exists());

        let mut restored = IterStore::new();
        let restored_state = read_file(&path, &mut restored).unwrap().unwrap();
        assert_eq!(restored_state, state);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn read_file_on_missing_path_is_none() {
        let path = Path::new("/tmp/tagdex-checkpoint-does-not-exist.store");
        let mut store = IterStore::new();
        assert_eq!(read_file(path, &mut store).unwrap(), None);
    }

    #[test]
    fn clean_stray_temp_files_removes_only_digit_suffixed_siblings() {
        let dir = std::env::temp_dir().join(format!("tagdex-checkpoint-stray-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("checkpoint.store");

        std::fs::write(format!("{}.123456", path.display()), b"stray").unwrap();
        std::fs::write(format!("{}.bak", path.display()), b"not stray").unwrap();

        let removed = clean_stray_temp_files(&path).unwrap();
        assert_eq!(removed, 1);
        assert!(Path::new(&format!("{}.bak", path.display())).exists());

        std::fs::remove_dir_all(&dir).ok();
    }
}
