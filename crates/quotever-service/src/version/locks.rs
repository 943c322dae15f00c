//! Per-document write locks for multi-step operations.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use quotever_core::types::id::DocumentId;

type LockMap = DashMap<DocumentId, Arc<Mutex<()>>>;

/// Serializes multi-step writers on the same document within one process.
///
/// Single store calls are already atomic; this covers sequences such as a
/// rollback, which writes live state and then records a version.
#[derive(Debug, Clone, Default)]
pub(crate) struct DocumentLocks {
    locks: Arc<LockMap>,
}

impl DocumentLocks {
    /// Wait for exclusive access to a document.
    pub(crate) async fn acquire(&self, document_id: DocumentId) -> DocumentGuard {
        // Clone out of the entry so the shard lock is released before awaiting.
        let lock = self.locks.entry(document_id).or_default().clone();
        let guard = lock.lock_owned().await;
        DocumentGuard {
            document_id,
            locks: Arc::clone(&self.locks),
            guard: Some(guard),
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.len()
    }
}

/// Exclusive access to one document. Releasing the last holder removes the
/// document's entry from the registry.
#[derive(Debug)]
pub(crate) struct DocumentGuard {
    document_id: DocumentId,
    locks: Arc<LockMap>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for DocumentGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Only the registry's own reference left: nobody holds or waits.
        self.locks
            .remove_if(&self.document_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}
