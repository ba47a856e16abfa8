//! Adapters for the domain ports: ledger storage and the two external oracles.

pub mod in_memory;
pub mod oracles;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
