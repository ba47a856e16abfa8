//! Named work queues of [`RequestLink`]s.
//!
//! Each queue is a single ledger entry holding the whole ordered list. A link is unique
//! within a queue by its (UserHash, RequestHash) pair.

use super::ledger_tx::LedgerTx;
use crate::domain::keys::Queue;
use crate::domain::request::RequestLink;
use crate::error::{LendingError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How `dequeue` decides that a stored link is the one being removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DequeueMatch {
    /// Request hash only; the first link for that request wins.
    #[default]
    RequestHash,
    /// Both UserHash and RequestHash must match.
    Exact,
}

impl DequeueMatch {
    fn matches(self, stored: &RequestLink, wanted: &RequestLink) -> bool {
        match self {
            DequeueMatch::RequestHash => stored.request_hash == wanted.request_hash,
            DequeueMatch::Exact => stored == wanted,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct QueueManager {
    matching: DequeueMatch,
}

impl QueueManager {
    pub fn new(matching: DequeueMatch) -> Self {
        Self { matching }
    }

    pub async fn pending(&self, tx: &mut LedgerTx<'_>, queue: &Queue) -> Result<Vec<RequestLink>> {
        Ok(tx.read_entity(&queue.key()).await?.unwrap_or_default())
    }

    pub async fn enqueue(
        &self,
        tx: &mut LedgerTx<'_>,
        queue: &Queue,
        link: &RequestLink,
    ) -> Result<()> {
        link.validate()?;
        let mut links = self.pending(tx, queue).await?;
        if links.contains(link) {
            return Err(LendingError::BusinessRule(format!(
                "request {} of {} is already queued in {}",
                link.request_hash, link.user_hash, queue
            )));
        }
        links.push(link.clone());
        tx.write_entity(&queue.key(), &links).await?;
        debug!(%queue, user = %link.user_hash, request = %link.request_hash, "enqueued");
        Ok(())
    }

    /// Removes the first matching link; fails if the queue is empty or has no match.
    pub async fn dequeue(
        &self,
        tx: &mut LedgerTx<'_>,
        queue: &Queue,
        link: &RequestLink,
    ) -> Result<()> {
        let mut links = self.pending(tx, queue).await?;
        if links.is_empty() {
            return Err(LendingError::NotFound(format!("queue {queue} is empty")));
        }
        let Some(position) = links.iter().position(|stored| self.matching.matches(stored, link))
        else {
            return Err(LendingError::NotFound(format!(
                "request {} is not queued in {}",
                link.request_hash, queue
            )));
        };
        links.remove(position);
        tx.write_entity(&queue.key(), &links).await?;
        debug!(%queue, user = %link.user_hash, request = %link.request_hash, "dequeued");
        Ok(())
    }

    /// Like `dequeue`, but an absent link is fine. Returns whether one was removed.
    pub async fn discard(
        &self,
        tx: &mut LedgerTx<'_>,
        queue: &Queue,
        link: &RequestLink,
    ) -> Result<bool> {
        match self.dequeue(tx, queue, link).await {
            Ok(()) => Ok(true),
            Err(LendingError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub async fn route(
        &self,
        tx: &mut LedgerTx<'_>,
        from: &Queue,
        to: &Queue,
        link: &RequestLink,
    ) -> Result<()> {
        self.dequeue(tx, from, link).await?;
        self.enqueue(tx, to, link).await
    }
}
