use log::{info, warn};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

pub const AUTO_REFRESH_KEY: &str = "autoRefresh";
pub const REFRESH_INTERVAL_KEY: &str = "refreshInterval";
pub const DEFAULT_REFRESH_INTERVAL: u64 = 10;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Settings {
    pub auto_refresh: bool,
    refresh_interval: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_refresh: true,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
        }
    }
}

impl Settings {
    pub fn new(auto_refresh: bool, refresh_interval: u64) -> Self {
        Self {
            auto_refresh,
            refresh_interval: refresh_interval.max(1),
        }
    }

    /// Seconds between automatic refreshes, never below one.
    pub fn refresh_interval(&self) -> u64 {
        self.refresh_interval
    }

    pub fn set_refresh_interval(&mut self, secs: u64) {
        self.refresh_interval = secs.max(1);
    }
}

/// Flat string-keyed storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String) -> Result<()>;
}

/// JSON object on disk holding string entries. Every `set` rewrites the file.
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("Ignoring malformed settings file {}: {}", path.display(), e);
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!("Failed to read settings file {}: {}", path.display(), e);
                BTreeMap::new()
            }
        };

        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_string(), value);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&self.path, serde_json::to_vec_pretty(&self.entries)?)?;

        Ok(())
    }
}

/// Saved settings when both entries are present and valid, defaults otherwise.
pub fn load(store: &dyn KeyValueStore) -> Settings {
    let auto_refresh = store
        .get(AUTO_REFRESH_KEY)
        .and_then(|v| v.trim().parse::<bool>().ok());
    let refresh_interval = store
        .get(REFRESH_INTERVAL_KEY)
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|secs| *secs >= 1);

    match (auto_refresh, refresh_interval) {
        (Some(auto_refresh), Some(refresh_interval)) => {
            Settings::new(auto_refresh, refresh_interval)
        }
        _ => Settings::default(),
    }
}

pub fn save(store: &mut dyn KeyValueStore, settings: &Settings) -> Result<()> {
    store.set(AUTO_REFRESH_KEY, settings.auto_refresh.to_string())?;
    store.set(REFRESH_INTERVAL_KEY, settings.refresh_interval().to_string())?;

    info!(
        "Saved settings: auto-refresh = {}, interval = {}s",
        settings.auto_refresh,
        settings.refresh_interval()
    );

    Ok(())
}
