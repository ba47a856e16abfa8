use crate::domain::ports::{KeyValueStore, VersionedValue, Write};
use crate::error::{LendingError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Options, WriteBatch};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column Family holding every ledger entry.
pub const CF_LEDGER: &str = "ledger";

const VERSION_LEN: usize = 8;

/// A persistent ledger implementation using RocksDB.
///
/// Each value is stored as an 8-byte big-endian version followed by the payload.
/// Commits are serialized through a mutex so the version check and the batch write
/// cannot interleave with another commit.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBLedger {
    db: Arc<DB>,
    commit_lock: Arc<Mutex<()>>,
}

impl RocksDBLedger {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the "ledger" column family exists.
    ///
    /// # Arguments
    ///
    /// * `path` - The filesystem path where the database will be stored.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_ledger = ColumnFamilyDescriptor::new(CF_LEDGER, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_ledger])?;

        Ok(Self {
            db: Arc::new(db),
            commit_lock: Arc::new(Mutex::new(())),
        })
    }

    fn read(&self, key: &str) -> Result<Option<VersionedValue>> {
        let cf = self
            .db
            .cf_handle(CF_LEDGER)
            .ok_or_else(|| LendingError::internal("Ledger column family not found"))?;

        match self.db.get_cf(cf, key.as_bytes())? {
            Some(raw) => decode(&raw).map(Some),
            None => Ok(None),
        }
    }
}

fn encode(version: u64, payload: &[u8]) -> Vec<u8> {
    let mut raw = Vec::with_capacity(VERSION_LEN + payload.len());
    raw.extend_from_slice(&version.to_be_bytes());
    raw.extend_from_slice(payload);
    raw
}

fn decode(raw: &[u8]) -> Result<VersionedValue> {
    if raw.len() < VERSION_LEN {
        return Err(LendingError::internal(format!(
            "Ledger entry too short: {} bytes",
            raw.len()
        )));
    }
    let (version, payload) = raw.split_at(VERSION_LEN);
    let mut version_bytes = [0u8; VERSION_LEN];
    version_bytes.copy_from_slice(version);
    Ok(VersionedValue {
        bytes: payload.to_vec(),
        version: u64::from_be_bytes(version_bytes),
    })
}

#[async_trait]
impl KeyValueStore for RocksDBLedger {
    async fn get(&self, key: &str) -> Result<Option<VersionedValue>> {
        self.read(key)
    }

    async fn commit(&self, writes: Vec<Write>) -> Result<()> {
        let _guard = self.commit_lock.lock().await;

        for write in &writes {
            let found = self.read(&write.key)?.map_or(0, |v| v.version);
            if found != write.expected_version {
                return Err(LendingError::Conflict {
                    key: write.key.clone(),
                    expected: write.expected_version,
                    found,
                });
            }
        }

        let cf = self
            .db
            .cf_handle(CF_LEDGER)
            .ok_or_else(|| LendingError::internal("Ledger column family not found"))?;

        let mut batch = WriteBatch::default();
        for write in &writes {
            batch.put_cf(
                cf,
                write.key.as_bytes(),
                encode(write.expected_version + 1, &write.value),
            );
        }
        self.db.write(batch)?;

        Ok(())
    }
}
