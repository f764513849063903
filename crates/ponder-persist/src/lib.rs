pub mod builder;
pub mod dbs;
pub mod error;
pub mod models;
pub mod subscription;
pub mod trait_client;

pub use builder::LocalStoreBuilder;
pub use dbs::local::{JsonFileSink, LocalStore, MemorySink, Snapshot, SnapshotSink, SCHEMA_VERSION};
pub use error::{PersistError, Result};
pub use models::{Message, MessageId, MessageRole, NewMessage, Thread, ThreadId};
pub use subscription::{
    Change, MessagesStream, QueryKey, QuerySnapshot, SnapshotStream, ThreadsStream,
};
pub use trait_client::PersistenceClient;
