//! Implements the `Storage` trait with a single JSON file.

use crate::error::Res;
use crate::store::Storage;
use crate::utils;
use anyhow::Context;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::trace;

/// A `Storage` that keeps every key in one JSON object on disk. Each call reads the file and,
/// for writes, replaces it with a new one. The file is created on the first write and is only
/// readable by the current user.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Res<BTreeMap<String, String>> {
        if !utils::exists(&self.path).await? {
            trace!("{} does not exist yet", self.path.display());
            return Ok(BTreeMap::new());
        }
        utils::deserialize(&self.path)
            .await
            .context("The storage file is corrupt")
    }

    async fn save(&self, items: &BTreeMap<String, String>) -> Res<()> {
        let json = serde_json::to_string_pretty(items).context("Unable to serialize storage")?;
        utils::write_private(&self.path, json).await
    }
}

#[async_trait::async_trait]
impl Storage for FileStorage {
    async fn get_item(&self, key: &str) -> anyhow::Result<Option<String>> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let _guard = self.lock.lock().await;
        let mut items = self.load().await?;
        let _ = items.insert(key.to_string(), value.to_string());
        self.save(&items).await
    }

    async fn remove_item(&self, key: &str) -> anyhow::Result<()> {
        let _guard = self.lock.lock().await;
        let mut items = self.load().await?;
        if items.remove(key).is_some() {
            self.save(&items).await?;
        }
        Ok(())
    }
}
