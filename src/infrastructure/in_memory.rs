use crate::domain::ports::{KeyValueStore, VersionedValue, Write};
use crate::error::{LendingError, Result};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory ledger.
///
/// Uses `Arc<RwLock<HashMap<String, VersionedValue>>>`; clones share the same state.
/// Commits take the write lock for their whole duration, so a batch is atomic.
#[derive(Default, Clone)]
pub struct InMemoryLedger {
    entries: Arc<RwLock<HashMap<String, VersionedValue>>>,
}

impl InMemoryLedger {
    /// Creates a new, empty in-memory ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Point-in-time copy of every key and its raw value.
    pub async fn snapshot(&self) -> BTreeMap<String, Vec<u8>> {
        let entries = self.entries.read().await;
        entries
            .iter()
            .map(|(key, value)| (key.clone(), value.bytes.clone()))
            .collect()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryLedger {
    async fn get(&self, key: &str) -> Result<Option<VersionedValue>> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).cloned())
    }

    async fn commit(&self, writes: Vec<Write>) -> Result<()> {
        let mut entries = self.entries.write().await;

        for write in &writes {
            let found = entries.get(&write.key).map_or(0, |v| v.version);
            if found != write.expected_version {
                return Err(LendingError::Conflict {
                    key: write.key.clone(),
                    expected: write.expected_version,
                    found,
                });
            }
        }

        for write in writes {
            let version = write.expected_version + 1;
            entries.insert(
                write.key,
                VersionedValue {
                    bytes: write.value,
                    version,
                },
            );
        }
        Ok(())
    }
}
