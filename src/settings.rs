//! Persistent key-value settings.
//!
//! The settings document is a single JSON object. [`SettingsStore::save`]
//! shallow-merges: every top-level key in the patch replaces the stored value
//! wholesale, nested objects are never deep-merged.

use std::{
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// The settings document.
pub type SettingsMap = Map<String, Value>;

#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Reads the whole document.
    async fn load(&self) -> Result<SettingsMap>;

    /// Shallow-merges `patch` into the document and returns the merged result.
    async fn save(&self, patch: SettingsMap) -> Result<SettingsMap>;
}

fn merge(current: &mut SettingsMap, patch: SettingsMap) {
    for (key, value) in patch {
        current.insert(key, value);
    }
}

/// Settings backed by a pretty-printed JSON file, created lazily as `{}`.
pub struct JsonFileSettings {
    path: PathBuf,
    io: tokio::sync::Mutex<()>,
}

impl JsonFileSettings {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            io: tokio::sync::Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn ensure_file(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                async_fs::create_dir_all(parent)
                    .await
                    .map_err(|e| Error::Settings(format!("{}: {}", parent.display(), e)))?;
            }
        }

        if async_fs::metadata(&self.path).await.is_err() {
            self.write(&SettingsMap::new()).await?;
        }
        Ok(())
    }

    async fn read(&self) -> Result<SettingsMap> {
        self.ensure_file().await?;
        let content = async_fs::read_to_string(&self.path)
            .await
            .map_err(|e| Error::Settings(format!("{}: {}", self.path.display(), e)))?;

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) | Err(_) => {
                tracing::warn!(
                    path = %self.path.display(),
                    "settings file is not a JSON object, treating it as empty"
                );
                Ok(SettingsMap::new())
            }
        }
    }

    async fn write(&self, map: &SettingsMap) -> Result<()> {
        let json = serde_json::to_string_pretty(map)
            .map_err(|e| Error::Settings(e.to_string()))?;

        // write-then-rename so readers never observe a half-written document
        let tmp = self.path.with_extension("json.tmp");
        async_fs::write(&tmp, json)
            .await
            .map_err(|e| Error::Settings(format!("{}: {}", tmp.display(), e)))?;
        async_fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| Error::Settings(format!("{}: {}", self.path.display(), e)))
    }
}

#[async_trait]
impl SettingsStore for JsonFileSettings {
    async fn load(&self) -> Result<SettingsMap> {
        let _io = self.io.lock().await;
        self.read().await
    }

    async fn save(&self, patch: SettingsMap) -> Result<SettingsMap> {
        let _io = self.io.lock().await;
        let mut current = self.read().await?;
        merge(&mut current, patch);
        self.write(&current).await?;
        tracing::debug!(path = %self.path.display(), "settings saved");
        Ok(current)
    }
}

/// Settings held in memory only. Nothing survives the process.
#[derive(Default)]
pub struct MemorySettings {
    map: Mutex<SettingsMap>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(map: SettingsMap) -> Self {
        Self {
            map: Mutex::new(map),
        }
    }

    pub fn snapshot(&self) -> SettingsMap {
        self.map
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl SettingsStore for MemorySettings {
    async fn load(&self) -> Result<SettingsMap> {
        Ok(self.snapshot())
    }

    async fn save(&self, patch: SettingsMap) -> Result<SettingsMap> {
        let mut map = self.map.lock().unwrap_or_else(PoisonError::into_inner);
        merge(&mut map, patch);
        Ok(map.clone())
    }
}
