//! tracing setup. The TUI owns stdout, so events go to a log file:
//! $XDG_STATE_HOME/sentineltop/sentineltop.log (fallback: the cache dir).

use std::{fs, path::PathBuf, sync::Mutex};

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "SENTINELTOP_LOG";

pub fn log_path() -> PathBuf {
    let dir = match std::env::var_os("XDG_STATE_HOME") {
        Some(xdg) => PathBuf::from(xdg).join("sentineltop"),
        None => crate::cache::cache_dir(),
    };
    dir.join("sentineltop.log")
}

/// Install the global subscriber. Returns the log file path.
pub fn init(path: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    let path = path.unwrap_or_else(log_path);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = fs::OpenOptions::new().create(true).append(true).open(&path)?;
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_events_to_file_and_refuses_second_init() {
        let td = tempfile::tempdir().unwrap();
        let path = td.path().join("nested").join("app.log");
        assert_eq!(init(Some(path.clone())).unwrap(), path);
        tracing::info!(server = 2, "poll finished");
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("poll finished"), "{text}");
        assert!(init(Some(path)).is_err());
    }
}
