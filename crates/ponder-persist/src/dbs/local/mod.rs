pub(crate) mod client;
mod models;
mod sink;
mod state;

pub use client::LocalStore;
pub use models::{Snapshot, SCHEMA_VERSION};
pub use sink::{JsonFileSink, MemorySink, SnapshotSink};
