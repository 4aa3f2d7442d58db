//! Short-lived keyed cache of API payloads: `metrics_<key>` -> { data, timestamp }.
//! Persisted as one JSON file under $XDG_CACHE_HOME/sentineltop/cache.json
//! (fallback: platform cache dir) so a restart can paint last-known values at once.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{collections::BTreeMap, fs, path::PathBuf, time::Duration};

const KEY_PREFIX: &str = "metrics_";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub data: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct SnapshotCache {
    entries: BTreeMap<String, CacheEntry>,
    path: Option<PathBuf>,
}

pub fn cache_dir() -> PathBuf {
    if let Some(xdg) = std::env::var_os("XDG_CACHE_HOME") {
        PathBuf::from(xdg).join("sentineltop")
    } else {
        dirs_next::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sentineltop")
    }
}

pub fn cache_path() -> PathBuf {
    cache_dir().join("cache.json")
}

impl SnapshotCache {
    /// In-memory only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from `path`; an absent or corrupt file starts empty.
    pub fn open(path: PathBuf) -> Self {
        let entries = match fs::read_to_string(&path) {
            Ok(s) => serde_json::from_str(&s).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "discarding unreadable cache file");
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };
        Self {
            entries,
            path: Some(path),
        }
    }

    pub fn set<T: Serialize>(&mut self, key: &str, data: &T) {
        self.set_at(key, data, Utc::now());
    }

    pub fn set_at<T: Serialize>(&mut self, key: &str, data: &T, now: DateTime<Utc>) {
        match serde_json::to_value(data) {
            Ok(data) => {
                self.entries.insert(
                    format!("{KEY_PREFIX}{key}"),
                    CacheEntry {
                        data,
                        timestamp: now,
                    },
                );
                self.persist();
            }
            Err(e) => tracing::error!(key, error = %e, "cannot cache value"),
        }
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str, max_age: Duration) -> Option<T> {
        self.get_at(key, max_age, Utc::now())
    }

    /// Returns the value only while it is younger than `max_age`.
    pub fn get_at<T: DeserializeOwned>(
        &self,
        key: &str,
        max_age: Duration,
        now: DateTime<Utc>,
    ) -> Option<T> {
        let entry = self.entries.get(&format!("{KEY_PREFIX}{key}"))?;
        let max_age = ChronoDuration::from_std(max_age).unwrap_or_else(|_| ChronoDuration::weeks(5200));
        if now.signed_duration_since(entry.timestamp) >= max_age {
            return None;
        }
        match serde_json::from_value(entry.data.clone()) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::error!(key, error = %e, "cached value has unexpected shape");
                None
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn persist(&self) {
        let Some(path) = self.path.as_ref() else {
            return;
        };
        let write = || -> std::io::Result<()> {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let data = serde_json::to_vec(&self.entries)?;
            fs::write(path, data)
        };
        if let Err(e) = write() {
            tracing::warn!(path = %path.display(), error = %e, "cache not persisted");
        }
    }
}
