use crate::domain::ports::{KeyValueStore, Write};
use crate::error::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone)]
struct Observed {
    version: u64,
    bytes: Option<Vec<u8>>,
}

/// The working set of a single operation.
///
/// Reads are cached together with the version they were seen at, writes are staged,
/// and `commit` hands everything to the store as one conditional batch. Dropping a
/// `LedgerTx` without committing discards its writes.
pub struct LedgerTx<'a> {
    store: &'a dyn KeyValueStore,
    observed: HashMap<String, Observed>,
    staged: BTreeMap<String, Vec<u8>>,
}

impl<'a> LedgerTx<'a> {
    pub fn new(store: &'a dyn KeyValueStore) -> Self {
        Self {
            store,
            observed: HashMap::new(),
            staged: BTreeMap::new(),
        }
    }

    /// Returns the current bytes under `key`, including writes staged by this transaction.
    pub async fn read_raw(&mut self, key: &str) -> Result<Option<Vec<u8>>> {
        if let Some(seen) = self.observed.get(key) {
            return Ok(seen.bytes.clone());
        }

        let stored = self.store.get(key).await?;
        let seen = match stored {
            Some(value) => Observed {
                version: value.version,
                bytes: Some(value.bytes),
            },
            None => Observed {
                version: 0,
                bytes: None,
            },
        };
        let bytes = seen.bytes.clone();
        self.observed.insert(key.to_string(), seen);
        Ok(bytes)
    }

    pub async fn read_entity<T: DeserializeOwned>(&mut self, key: &str) -> Result<Option<T>> {
        match self.read_raw(key).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    pub async fn write_raw(&mut self, key: &str, bytes: Vec<u8>) -> Result<()> {
        // Blind writes still need the base version for the conditional commit.
        if !self.observed.contains_key(key) {
            self.read_raw(key).await?;
        }
        if let Some(seen) = self.observed.get_mut(key) {
            seen.bytes = Some(bytes.clone());
        }
        self.staged.insert(key.to_string(), bytes);
        Ok(())
    }

    pub async fn write_entity<T: Serialize>(&mut self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec(value)?;
        self.write_raw(key, bytes).await
    }

    pub async fn commit(self) -> Result<()> {
        if self.staged.is_empty() {
            return Ok(());
        }

        let writes = self
            .staged
            .into_iter()
            .map(|(key, value)| {
                let expected_version = self.observed.get(&key).map_or(0, |seen| seen.version);
                Write {
                    key,
                    value,
                    expected_version,
                }
            })
            .collect();

        self.store.commit(writes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LendingError;
    use crate::infrastructure::in_memory::InMemoryLedger;

    #[tokio::test]
    async fn test_staged_writes_are_visible_before_commit() {
        let ledger = InMemoryLedger::new();
        let mut tx = LedgerTx::new(&ledger);

        tx.write_entity("list", &vec![1, 2, 3]).await.unwrap();
        let seen: Vec<i32> = tx.read_entity("list").await.unwrap().unwrap();
        assert_eq!(seen, vec![1, 2, 3]);
        assert!(ledger.get("list").await.unwrap().is_none());

        tx.commit().await.unwrap();
        assert_eq!(ledger.get("list").await.unwrap().unwrap().bytes, b"[1,2,3]");
    }

    #[tokio::test]
    async fn test_dropped_transaction_writes_nothing() {
        let ledger = InMemoryLedger::new();
        {
            let mut tx = LedgerTx::new(&ledger);
            tx.write_raw("k", b"v".to_vec()).await.unwrap();
            assert_eq!(tx.read_raw("k").await.unwrap(), Some(b"v".to_vec()));
        }
        assert!(ledger.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_update_is_a_conflict() {
        let ledger = InMemoryLedger::new();
        let mut seed = LedgerTx::new(&ledger);
        seed.write_raw("k", b"0".to_vec()).await.unwrap();
        seed.commit().await.unwrap();

        let mut first = LedgerTx::new(&ledger);
        let mut second = LedgerTx::new(&ledger);
        first.read_raw("k").await.unwrap();
        second.read_raw("k").await.unwrap();

        first.write_raw("k", b"1".to_vec()).await.unwrap();
        second.write_raw("k", b"2".to_vec()).await.unwrap();
        first.commit().await.unwrap();

        let err = second.commit().await.unwrap_err();
        assert!(matches!(err, LendingError::Conflict { .. }));
        assert_eq!(ledger.get("k").await.unwrap().unwrap().bytes, b"1");
    }

    #[tokio::test]
    async fn test_read_only_commit_is_a_no_op() {
        let ledger = InMemoryLedger::new();
        let mut tx = LedgerTx::new(&ledger);
        assert!(tx.read_raw("absent").await.unwrap().is_none());
        tx.commit().await.unwrap();
        assert!(ledger.snapshot().await.is_empty());
    }
}
