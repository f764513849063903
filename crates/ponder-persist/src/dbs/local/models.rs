use serde::{Deserialize, Serialize};

use crate::error::{PersistError, Result};
use crate::models::{Message, Thread};

pub const SCHEMA_VERSION: u32 = 1;

/// On-disk document: the whole dataset, replaced on every commit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub schema_version: u32,
    pub threads: Vec<Thread>,
    pub messages: Vec<Message>,
}

impl Snapshot {
    pub fn empty() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            threads: Vec::new(),
            messages: Vec::new(),
        }
    }

    pub fn check_version(&self) -> Result<()> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(PersistError::UnsupportedSchema {
                found: self.schema_version,
                expected: SCHEMA_VERSION,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_future_schema() {
        let mut snapshot = Snapshot::empty();
        assert!(snapshot.check_version().is_ok());

        snapshot.schema_version = 2;
        let err = snapshot.check_version().unwrap_err();
        assert!(matches!(err, PersistError::UnsupportedSchema { found: 2, expected: 1 }));
    }

    #[test]
    fn test_document_shape() {
        let json = serde_json::to_value(Snapshot::empty()).unwrap();
        assert_eq!(json["schema_version"], 1);
        assert!(json["threads"].as_array().unwrap().is_empty());
        assert!(json["messages"].as_array().unwrap().is_empty());
    }
}
