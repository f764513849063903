use std::path::PathBuf;
use std::sync::Arc;

use crate::dbs::local::client::DEFAULT_CHANGE_CAPACITY;
use crate::dbs::local::{JsonFileSink, LocalStore, MemorySink, SnapshotSink};
use crate::error::Result;

pub struct LocalStoreBuilder {
    path: Option<PathBuf>,
    sink: Option<Arc<dyn SnapshotSink>>,
    change_capacity: usize,
}

impl LocalStoreBuilder {
    pub fn new() -> Self {
        Self {
            path: None,
            sink: None,
            change_capacity: DEFAULT_CHANGE_CAPACITY,
        }
    }

    /// JSON file to load from and write to
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Custom durability backend; takes precedence over `path`
    pub fn sink(mut self, sink: Arc<dyn SnapshotSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Buffered change notifications per subscriber before it lags
    pub fn change_capacity(mut self, capacity: usize) -> Self {
        self.change_capacity = capacity;
        self
    }

    /// Without a path or sink the store is in-memory
    pub async fn build(self) -> Result<LocalStore> {
        let sink: Arc<dyn SnapshotSink> = match (self.sink, self.path) {
            (Some(sink), _) => sink,
            (None, Some(path)) => {
                tracing::info!(path = %path.display(), "Opening store");
                Arc::new(JsonFileSink::new(path))
            }
            (None, None) => Arc::new(MemorySink),
        };

        LocalStore::with_sink(sink, self.change_capacity).await
    }
}

impl Default for LocalStoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}
