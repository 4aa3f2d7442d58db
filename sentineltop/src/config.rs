//! Dashboard tunables, read from $XDG_CONFIG_HOME/sentineltop/config.json.
//! Every field is optional; missing ones take the defaults below.

use serde::{Deserialize, Serialize};
use std::{fs, path::Path, time::Duration};

use crate::profiles::config_dir;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub refresh_interval_secs: u64,
    pub request_timeout_secs: u64,
    pub cache_expiry_secs: u64,
    /// Cached metrics younger than this are painted before the request goes out.
    pub warm_cache_secs: u64,
    pub max_retries: u32,
    pub retry_base_secs: u64,
    pub vm_refresh_secs: u64,
    pub predictions: bool,
    /// Server cards laid out before the first response arrives.
    pub server_slots: usize,
    /// Keep the cache on disk between runs.
    pub persist_cache: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 30,
            request_timeout_secs: 15,
            cache_expiry_secs: 10,
            warm_cache_secs: 5,
            max_retries: 3,
            retry_base_secs: 5,
            vm_refresh_secs: 8,
            predictions: true,
            server_slots: 3,
            persist_cache: true,
        }
    }
}

impl Settings {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn cache_expiry(&self) -> Duration {
        Duration::from_secs(self.cache_expiry_secs)
    }

    pub fn warm_cache(&self) -> Duration {
        Duration::from_secs(self.warm_cache_secs)
    }

    pub fn retry_base(&self) -> Duration {
        Duration::from_secs(self.retry_base_secs)
    }

    pub fn vm_refresh(&self) -> Duration {
        Duration::from_secs(self.vm_refresh_secs.max(1))
    }
}

pub fn settings_path() -> std::path::PathBuf {
    config_dir().join("config.json")
}

pub fn load_settings() -> Settings {
    load_settings_from(&settings_path())
}

pub fn load_settings_from(path: &Path) -> Settings {
    match fs::read_to_string(path) {
        Ok(s) => serde_json::from_str(&s).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "ignoring malformed config");
            Settings::default()
        }),
        Err(_) => Settings::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let td = tempfile::tempdir().unwrap();
        let s = load_settings_from(&td.path().join("config.json"));
        assert_eq!(s, Settings::default());
        assert_eq!(s.refresh_interval(), Duration::from_secs(30));
        assert_eq!(s.max_retries, 3);
    }

    #[test]
    fn partial_file_overrides_only_given_fields() {
        let td = tempfile::tempdir().unwrap();
        let p = td.path().join("config.json");
        fs::write(&p, r#"{"refresh_interval_secs": 10, "predictions": false}"#).unwrap();
        let s = load_settings_from(&p);
        assert_eq!(s.refresh_interval_secs, 10);
        assert!(!s.predictions);
        assert_eq!(s.request_timeout_secs, 15);
        assert_eq!(s.vm_refresh(), Duration::from_secs(8));
    }

    #[test]
    fn malformed_file_gives_defaults() {
        let td = tempfile::tempdir().unwrap();
        let p = td.path().join("config.json");
        fs::write(&p, "refresh = 10").unwrap();
        assert_eq!(load_settings_from(&p), Settings::default());
    }

    #[test]
    fn zero_interval_is_floored() {
        let s = Settings {
            refresh_interval_secs: 0,
            ..Settings::default()
        };
        assert_eq!(s.refresh_interval(), Duration::from_secs(1));
    }
}
