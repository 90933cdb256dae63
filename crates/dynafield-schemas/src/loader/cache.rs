//! In-memory cache of parsed schema documents
//!
//! Entries are keyed by canonical path and dropped when the file changes on
//! disk or the entry outlives `max_age`. When full, the least recently used
//! entry is evicted.
//!
//! Copyright (c) 2025 Dynafield Team
//! Licensed under the Apache-2.0 license

use crate::loader::error::{LoaderError, LoaderResult};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::trace;

#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Parsed (and expanded) document
    pub content: Value,
    pub cached_at: SystemTime,
    /// File modification time when cached
    pub file_mtime: SystemTime,
    pub file_path: PathBuf,
    /// Schema `name`, when the document has one
    pub name: Option<String>,
    last_access: u64,
}

impl CacheEntry {
    fn new(content: Value, file_path: PathBuf, file_mtime: SystemTime, tick: u64) -> Self {
        let name = content.get("name").and_then(Value::as_str).map(str::to_string);
        Self {
            content,
            cached_at: SystemTime::now(),
            file_mtime,
            file_path,
            name,
            last_access: tick,
        }
    }

    /// Still fresh given the file's current mtime and the age limit
    pub fn is_valid(&self, current_mtime: SystemTime, max_age: Option<Duration>) -> bool {
        if current_mtime > self.file_mtime {
            return false;
        }
        match (max_age, self.age()) {
            (Some(max_age), Some(age)) => age <= max_age,
            _ => true,
        }
    }

    pub fn age(&self) -> Option<Duration> {
        self.cached_at.elapsed().ok()
    }
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub max_entries: usize,
    pub max_age: Option<Duration>,
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 256,
            max_age: Some(Duration::from_secs(3600)),
            enabled: true,
        }
    }
}

#[derive(Debug, Default)]
pub struct SchemaCache {
    entries: HashMap<PathBuf, CacheEntry>,
    config: CacheConfig,
    tick: u64,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    pub fn with_config(config: CacheConfig) -> Self {
        Self {
            entries: HashMap::new(),
            config,
            tick: 0,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    /// A fresh entry for `path`; stale entries are dropped on the way
    pub fn get(&mut self, path: &Path) -> LoaderResult<Option<CacheEntry>> {
        if !self.config.enabled {
            return Ok(None);
        }

        let key = canonicalize(path)?;
        let Some(entry) = self.entries.get(&key) else {
            return Ok(None);
        };

        if !entry.is_valid(modified(path)?, self.config.max_age) {
            trace!(path = %key.display(), "dropping stale cache entry");
            self.entries.remove(&key);
            return Ok(None);
        }

        let tick = self.next_tick();
        Ok(self.entries.get_mut(&key).map(|entry| {
            entry.last_access = tick;
            entry.clone()
        }))
    }

    pub fn put(&mut self, path: &Path, content: Value) -> LoaderResult<()> {
        if !self.config.enabled {
            return Ok(());
        }

        let key = canonicalize(path)?;
        let mtime = modified(path)?;

        if !self.entries.contains_key(&key) && self.entries.len() >= self.config.max_entries {
            self.evict_lru();
        }

        let tick = self.next_tick();
        self.entries.insert(key.clone(), CacheEntry::new(content, key, mtime, tick));
        Ok(())
    }

    pub fn remove(&mut self, path: &Path) -> LoaderResult<bool> {
        let key = canonicalize(path)?;
        Ok(self.entries.remove(&key).is_some())
    }

    pub fn contains(&self, path: &Path) -> LoaderResult<bool> {
        Ok(self.entries.contains_key(&canonicalize(path)?))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop entries whose file vanished, changed or aged out
    pub fn cleanup_expired(&mut self) -> usize {
        let max_age = self.config.max_age;
        let before = self.entries.len();
        self.entries.retain(|_, entry| match std::fs::metadata(&entry.file_path).and_then(|m| m.modified()) {
            Ok(mtime) => entry.is_valid(mtime, max_age),
            Err(_) => false,
        });
        before - self.entries.len()
    }

    pub fn stats(&self) -> CacheStats {
        let ages: Vec<Duration> = self.entries.values().filter_map(CacheEntry::age).collect();
        let average_age = if ages.is_empty() {
            None
        } else {
            Some(ages.iter().sum::<Duration>() / ages.len() as u32)
        };

        CacheStats {
            total_entries: self.entries.len(),
            max_entries: self.config.max_entries,
            average_age,
            enabled: self.config.enabled,
        }
    }

    fn evict_lru(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_access)
            .map(|(path, _)| path.clone());
        if let Some(path) = oldest {
            trace!(path = %path.display(), "evicting least recently used schema");
            self.entries.remove(&path);
        }
    }
}

fn canonicalize(path: &Path) -> LoaderResult<PathBuf> {
    path.canonicalize().map_err(|e| LoaderError::io_error(path.to_path_buf(), e))
}

fn modified(path: &Path) -> LoaderResult<SystemTime> {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(|e| LoaderError::io_error(path.to_path_buf(), e))
}

#[derive(Debug, Clone)]
pub struct CacheStats {
    pub total_entries: usize,
    pub max_entries: usize,
    pub average_age: Option<Duration>,
    pub enabled: bool,
}

impl CacheStats {
    /// Utilization as a percentage of `max_entries`
    pub fn utilization(&self) -> f64 {
        if self.max_entries == 0 {
            0.0
        } else {
            (self.total_entries as f64 / self.max_entries as f64) * 100.0
        }
    }
}
