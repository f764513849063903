use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::models::Snapshot;
use crate::error::Result;

/// Where committed snapshots go
#[async_trait]
pub trait SnapshotSink: Send + Sync {
    /// Previously written snapshot, if any
    async fn load(&self) -> Result<Option<Snapshot>>;

    /// Make `snapshot` durable. On error the previous durable state must be intact.
    async fn write(&self, snapshot: &Snapshot) -> Result<()>;
}

/// Keeps nothing; the store lives only as long as the process
#[derive(Debug, Default, Clone, Copy)]
pub struct MemorySink;

#[async_trait]
impl SnapshotSink for MemorySink {
    async fn load(&self) -> Result<Option<Snapshot>> {
        Ok(None)
    }

    async fn write(&self, _snapshot: &Snapshot) -> Result<()> {
        Ok(())
    }
}

/// JSON file replaced atomically (temp file + rename)
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl SnapshotSink for JsonFileSink {
    async fn load(&self) -> Result<Option<Snapshot>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let snapshot: Snapshot = serde_json::from_slice(&bytes)?;
        snapshot.check_version()?;
        Ok(Some(snapshot))
    }

    async fn write(&self, snapshot: &Snapshot) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let serialized = serde_json::to_vec_pretty(snapshot)?;
        let temp = self.temp_path();
        tokio::fs::write(&temp, serialized).await?;
        tokio::fs::rename(&temp, &self.path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonFileSink::new(dir.path().join("ponder.json"));
        assert!(sink.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonFileSink::new(dir.path().join("nested").join("ponder.json"));

        sink.write(&Snapshot::empty()).await.unwrap();
        let loaded = sink.load().await.unwrap().unwrap();

        assert_eq!(loaded.schema_version, 1);
        assert!(!sink.temp_path().exists());
    }

    #[tokio::test]
    async fn test_load_rejects_other_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ponder.json");
        std::fs::write(&path, r#"{"schema_version":7,"threads":[],"messages":[]}"#).unwrap();

        let err = JsonFileSink::new(&path).load().await.unwrap_err();
        assert!(matches!(err, crate::PersistError::UnsupportedSchema { found: 7, .. }));
    }
}
