/*
 * Copyright (c) 2024, United States Government, as represented by the
 * Administrator of the National Aeronautics and Space Administration.
 * All rights reserved.
 *
 * The ODIN - Open Data Integration Framework is licensed under the
 * Apache License, Version 2.0 (the "License"); you may not use this file
 * except in compliance with the License. You may obtain a copy of the
 * License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

//! File-backed key-value cache, keyed by `md5(original_key)`. One blob per entry
//! on disk plus a single `cache_metadata.json` index; the index is the source of
//! truth and orphaned blobs are tolerated but ignored. Mirrors `odin_share`'s
//! JSON-file-backed map pattern, generalized to a single-writer mutex per SPEC_FULL.md
//! §5 ("Cache index: single-writer; reads may be lock-free but mutation serializes
//! via one mutex").

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Mutex,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::Result;

pub const TTL_HOURS: i64 = 24;
const INDEX_FILENAME: &str = "cache_metadata.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub original_key: String,
    pub created: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
    pub file_size: u64,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

#[derive(Debug, Default, Serialize)]
pub struct CacheStats {
    pub entry_count: usize,
    pub total_size_mb: f64,
    pub age_lt_1h: usize,
    pub age_1h_1d: usize,
    pub age_1d_7d: usize,
    pub age_gt_7d: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheHistoryEntry {
    pub hash: String,
    pub original_key: String,
    pub created: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
    pub file_size: u64,
    pub metadata: serde_json::Value,
}

pub struct Cache {
    dir: PathBuf,
    index: Mutex<HashMap<String, CacheEntry>>,
}

impl Cache {
    /// opens (and lazily creates) the cache directory, loading the existing index
    /// if `cache_metadata.json` is present.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        gt_common::fs::ensure_dir(&dir)?;
        let index = Self::load_index(&dir)?;
        Ok(Cache { dir, index: Mutex::new(index) })
    }

    fn index_path(dir: &Path) -> PathBuf {
        dir.join(INDEX_FILENAME)
    }

    fn load_index(dir: &Path) -> Result<HashMap<String, CacheEntry>> {
        let path = Self::index_path(dir);
        if !path.is_file() {
            return Ok(HashMap::new());
        }
        let bytes = gt_common::fs::file_contents(&path)?;
        Ok(serde_json::from_slice(&bytes).unwrap_or_default())
    }

    fn persist_index(&self, index: &HashMap<String, CacheEntry>) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(index)?;
        std::fs::write(Self::index_path(&self.dir), bytes)?;
        Ok(())
    }

    pub fn hash_key(original_key: &str) -> String {
        format!("{:x}", md5::compute(original_key.as_bytes()))
    }

    fn blob_path(&self, hash: &str) -> PathBuf {
        self.dir.join(hash)
    }

    /// writes `data` under the key's blob path and records it in the index, creating
    /// the cache directory lazily on first write.
    pub fn put(&self, original_key: &str, data: &[u8], metadata: serde_json::Value) -> Result<PathBuf> {
        let hash = Self::hash_key(original_key);
        let blob_path = self.blob_path(&hash);
        std::fs::write(&blob_path, data)?;

        let now = Utc::now();
        let entry = CacheEntry {
            original_key: original_key.to_string(),
            created: now,
            last_accessed: now,
            file_size: data.len() as u64,
            metadata,
        };

        let mut index = self.index.lock().unwrap();
        index.insert(hash, entry);
        self.persist_index(&index)?;
        Ok(blob_path)
    }

    /// returns the blob bytes for `original_key` if present and not expired. An expired
    /// entry is invalidated (removed from the index and its blob deleted) and counted
    /// as a miss, per the read-path TTL contract in SPEC_FULL.md §4.5.
    pub fn get(&self, original_key: &str) -> Result<Option<Vec<u8>>> {
        match self.get_path(original_key)? {
            Some(path) => Ok(Some(gt_common::fs::file_contents(path)?)),
            None => Ok(None),
        }
    }

    /// same as `get` but returns the blob's path instead of reading its contents, so
    /// callers that only need to copy the file (Region Store ingestion) avoid a
    /// redundant read.
    pub fn get_path(&self, original_key: &str) -> Result<Option<PathBuf>> {
        let hash = Self::hash_key(original_key);
        let mut index = self.index.lock().unwrap();

        let Some(entry) = index.get(&hash).cloned() else {
            return Ok(None);
        };

        let age = Utc::now().signed_duration_since(entry.created);
        if age.num_hours() >= TTL_HOURS {
            index.remove(&hash);
            self.persist_index(&index)?;
            let _ = std::fs::remove_file(self.blob_path(&hash));
            return Ok(None);
        }

        let blob_path = self.blob_path(&hash);
        if !blob_path.is_file() {
            // index says present but blob is gone; treat as a miss rather than erroring.
            index.remove(&hash);
            self.persist_index(&index)?;
            return Ok(None);
        }

        if let Some(e) = index.get_mut(&hash) {
            e.last_accessed = Utc::now();
        }
        self.persist_index(&index)?;
        Ok(Some(blob_path))
    }

    pub fn invalidate(&self, original_key: &str) -> Result<()> {
        let hash = Self::hash_key(original_key);
        let mut index = self.index.lock().unwrap();
        if index.remove(&hash).is_some() {
            self.persist_index(&index)?;
        }
        let _ = std::fs::remove_file(self.blob_path(&hash));
        Ok(())
    }

    /// read-only introspection: total entry count, total size in MB, and an
    /// age-bucket histogram against `created`. Does not mutate the index.
    pub fn stats(&self) -> CacheStats {
        let index = self.index.lock().unwrap();
        let now = Utc::now();
        let mut stats = CacheStats::default();
        let mut total_bytes: u64 = 0;

        for entry in index.values() {
            total_bytes += entry.file_size;
            let age_hours = now.signed_duration_since(entry.created).num_hours();
            match age_hours {
                h if h < 1 => stats.age_lt_1h += 1,
                h if h < 24 => stats.age_1h_1d += 1,
                h if h < 24 * 7 => stats.age_1d_7d += 1,
                _ => stats.age_gt_7d += 1,
            }
        }

        stats.entry_count = index.len();
        stats.total_size_mb = total_bytes as f64 / (1024.0 * 1024.0);
        stats
    }

    /// every entry, sorted newest-first by `created`. Does not mutate the index.
    pub fn history(&self) -> Vec<CacheHistoryEntry> {
        let index = self.index.lock().unwrap();
        let mut entries: Vec<CacheHistoryEntry> = index
            .iter()
            .map(|(hash, e)| CacheHistoryEntry {
                hash: hash.clone(),
                original_key: e.original_key.clone(),
                created: e.created,
                last_accessed: e.last_accessed,
                file_size: e.file_size,
                metadata: e.metadata.clone(),
            })
            .collect();
        entries.sort_by(|a, b| b.created.cmp(&a.created));
        entries
    }

    /// operator-facing bulk eviction distinct from the automatic per-read TTL check:
    /// removes every entry older than `older_than_days`, returning the count removed.
    pub fn cleanup(&self, older_than_days: f64) -> Result<usize> {
        let mut index = self.index.lock().unwrap();
        let now = Utc::now();
        let max_age = chrono::Duration::seconds((older_than_days * 86400.0) as i64);

        let stale: Vec<String> = index
            .iter()
            .filter(|(_, e)| now.signed_duration_since(e.created) > max_age)
            .map(|(h, _)| h.clone())
            .collect();

        for hash in &stale {
            index.remove(hash);
            let _ = std::fs::remove_file(self.blob_path(hash));
        }
        if !stale.is_empty() {
            self.persist_index(&index)?;
        }
        Ok(stale.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_then_get_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::open(dir.path()).unwrap();
        cache.put("opentopography||45.52,-122.68||5.0", b"geotiff-bytes", serde_json::json!({"source": "opentopography"})).unwrap();
        let found = cache.get("opentopography||45.52,-122.68||5.0").unwrap();
        assert_eq!(found, Some(b"geotiff-bytes".to_vec()));
    }

    #[test]
    fn missing_key_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::open(dir.path()).unwrap();
        assert!(cache.get("nope").unwrap().is_none());
    }

    #[test]
    fn stats_counts_match_put_entries() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::open(dir.path()).unwrap();
        cache.put("a", b"1234", serde_json::Value::Null).unwrap();
        cache.put("b", b"5678", serde_json::Value::Null).unwrap();
        let stats = cache.stats();
        assert_eq!(stats.entry_count, 2);
        assert!(stats.total_size_mb > 0.0);
    }

    #[test]
    fn invalidate_removes_entry_and_blob() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::open(dir.path()).unwrap();
        cache.put("k", b"v", serde_json::Value::Null).unwrap();
        cache.invalidate("k").unwrap();
        assert!(cache.get("k").unwrap().is_none());
    }

    #[test]
    fn history_sorted_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::open(dir.path()).unwrap();
        cache.put("first", b"1", serde_json::Value::Null).unwrap();
        cache.put("second", b"2", serde_json::Value::Null).unwrap();
        let history = cache.history();
        assert_eq!(history.len(), 2);
        assert!(history[0].created >= history[1].created);
    }

    #[test]
    fn reopening_reloads_persisted_index() {
        let dir = tempfile::tempdir().unwrap();
        {
            let cache = Cache::open(dir.path()).unwrap();
            cache.put("k", b"v", serde_json::Value::Null).unwrap();
        }
        let reopened = Cache::open(dir.path()).unwrap();
        assert_eq!(reopened.get("k").unwrap(), Some(b"v".to_vec()));
    }
}
