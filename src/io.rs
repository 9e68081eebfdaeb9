use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use tokio::fs::{create_dir_all, File};
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::sync::Mutex;

use crate::models::PendingScan;

const PENDING_SCANS_FILE: &str = "pending-scans.json";
const LAST_SYNC_FILE: &str = "last-sync.json";

/// Scans that could not be verified yet, kept on disk until the next sync.
#[derive(Debug, Clone)]
pub struct ScanStore {
    dir: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl ScanStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self {
            dir: dir.into(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn prepare(&self) -> anyhow::Result<()> {
        create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Could not create data directory {}", self.dir.display()))
    }

    /// Appends to the stored list. A list that exists but cannot be read
    /// is left untouched and reported as an error.
    pub async fn save_pending_scan(&self, scan: PendingScan) -> anyhow::Result<()> {
        let _guard = self.lock.lock().await;
        let mut scans = self.load_pending().await?;
        scans.push(scan);
        write_json(&self.dir.join(PENDING_SCANS_FILE), &scans).await
    }

    pub async fn pending_scans(&self) -> Vec<PendingScan> {
        let _guard = self.lock.lock().await;
        self.load_pending().await.unwrap_or_else(|err| {
            log::warn!("Could not read pending scans: {:#}", err);
            Vec::new()
        })
    }

    /// Removes every pending scan and hands back what was removed.
    pub async fn clear_pending_scans(&self) -> anyhow::Result<Vec<PendingScan>> {
        let _guard = self.lock.lock().await;
        let path = self.dir.join(PENDING_SCANS_FILE);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let drained = self.load_pending().await?;
        tokio::fs::remove_file(path).await?;
        Ok(drained)
    }

    pub async fn update_last_sync(&self) -> anyhow::Result<i64> {
        let _guard = self.lock.lock().await;
        let now = Utc::now().timestamp_millis();
        write_json(&self.dir.join(LAST_SYNC_FILE), &now).await?;
        Ok(now)
    }

    pub async fn last_sync(&self) -> Option<i64> {
        let _guard = self.lock.lock().await;
        let bytes = read_io_file(self.dir.join(LAST_SYNC_FILE)).await.ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    async fn load_pending(&self) -> anyhow::Result<Vec<PendingScan>> {
        let path = self.dir.join(PENDING_SCANS_FILE);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let bytes = read_io_file(&path).await?;
        serde_json::from_slice(&bytes)
            .with_context(|| format!("Unreadable pending scans in {}", path.display()))
    }
}

/// Writes next to `path` first and renames over it, so readers only ever
/// see the old or the new contents.
async fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent).await?;
    }
    let bytes = serde_json::to_vec(value)?;
    let staged = path.with_extension("json.tmp");
    let mut file = File::create(&staged).await?;
    file.write_all(&bytes).await?;
    file.sync_all().await?;
    drop(file);
    tokio::fs::rename(&staged, path).await?;
    Ok(())
}

pub async fn read_io_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<u8>> {
    let path = path.as_ref();
    if !path.exists() {
        anyhow::bail!("Tried to read nonexistent file {}", path.display())
    }
    let mut bytes = Vec::new();
    BufReader::new(File::open(path).await?)
        .read_to_end(&mut bytes)
        .await?;
    Ok(bytes)
}
