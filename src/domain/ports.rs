use super::credit::CreditGrade;
use super::request::{GovernmentResults, Request};
use crate::error::Result;
use async_trait::async_trait;

/// A stored value together with the version it was written at.
///
/// Versions start at 1 for the first write; an absent key is version 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedValue {
    pub bytes: Vec<u8>,
    pub version: u64,
}

/// A conditional write: applied only if `key` is still at `expected_version`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Write {
    pub key: String,
    pub value: Vec<u8>,
    pub expected_version: u64,
}

/// Linearizable key-value ledger.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<VersionedValue>>;

    /// Applies every write or none of them. Fails with `Conflict` if any key moved
    /// past its expected version.
    async fn commit(&self, writes: Vec<Write>) -> Result<()>;
}

/// Maps a buyer's salary and requested loan to a credit grade.
#[async_trait]
pub trait CreditScorer: Send + Sync {
    async fn score(&self, salary: i64, loan_amount: i64) -> Result<CreditGrade>;
}

/// Runs the lien, ownership and warrant checks for a request.
#[async_trait]
pub trait GovernmentRegistry: Send + Sync {
    async fn check(&self, request: &Request) -> Result<GovernmentResults>;
}

pub type KeyValueStoreBox = Box<dyn KeyValueStore>;
pub type CreditScorerBox = Box<dyn CreditScorer>;
pub type GovernmentRegistryBox = Box<dyn GovernmentRegistry>;
