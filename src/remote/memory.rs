use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Notify;
use tracing::debug;

use super::{RemoteReplica, WriteMode};
use crate::errors::AppError;
use crate::models::RemoteDocument;

#[derive(Default)]
struct Inner {
    documents: Mutex<HashMap<String, RemoteDocument>>,
    writes: AtomicUsize,
    reads: AtomicUsize,
    unreachable: AtomicBool,
    gate: Mutex<Option<Arc<Notify>>>,
    latency: Option<Duration>,
}

/// In-memory replica that records how it is called
///
/// Clones share the same documents and counters.
#[derive(Clone, Default)]
pub struct MemoryReplica {
    inner: Arc<Inner>,
}

impl MemoryReplica {
    pub fn new() -> Self {
        Self::default()
    }

    /// A replica that sleeps for `latency` before answering each call
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            inner: Arc::new(Inner { latency: Some(latency), ..Default::default() }),
        }
    }

    /// Stores a document directly, bypassing the call counters
    pub fn insert_document(&self, user_id: &str, document: RemoteDocument) {
        self.documents().insert(user_id.to_string(), document);
    }

    /// The stored document for `user_id`
    pub fn document(&self, user_id: &str) -> Option<RemoteDocument> {
        self.documents().get(user_id).cloned()
    }

    pub fn write_count(&self) -> usize {
        self.inner.writes.load(Ordering::SeqCst)
    }

    pub fn read_count(&self) -> usize {
        self.inner.reads.load(Ordering::SeqCst)
    }

    /// Makes every call fail with a network error until switched back
    pub fn set_unreachable(&self, unreachable: bool) {
        self.inner.unreachable.store(unreachable, Ordering::SeqCst);
    }

    /// Holds subsequent writes open until the returned handle is notified
    ///
    /// Each `notify_one` releases one held write.
    pub fn hold_writes(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.inner.gate.lock().unwrap_or_else(|e| e.into_inner()) = Some(Arc::clone(&gate));
        gate
    }

    fn documents(&self) -> std::sync::MutexGuard<'_, HashMap<String, RemoteDocument>> {
        self.inner.documents.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn simulate_network(&self) -> Result<(), AppError> {
        if let Some(latency) = self.inner.latency {
            tokio::time::sleep(latency).await;
        }
        if self.inner.unreachable.load(Ordering::SeqCst) {
            return Err(AppError::Network("remote replica unreachable".to_string()));
        }
        Ok(())
    }
}

impl RemoteReplica for MemoryReplica {
    async fn write(&self, user_id: &str, document: &RemoteDocument, mode: WriteMode) -> Result<(), AppError> {
        self.inner.writes.fetch_add(1, Ordering::SeqCst);
        let gate = self.inner.gate.lock().unwrap_or_else(|e| e.into_inner()).clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.simulate_network().await?;

        let mut documents = self.documents();
        match mode {
            WriteMode::Merge => documents
                .entry(user_id.to_string())
                .or_default()
                .merge_from(document.clone()),
            WriteMode::Replace => {
                documents.insert(user_id.to_string(), document.clone());
            }
        }
        debug!("Stored document for {} ({:?})", user_id, mode);
        Ok(())
    }

    async fn read(&self, user_id: &str) -> Result<Option<RemoteDocument>, AppError> {
        self.inner.reads.fetch_add(1, Ordering::SeqCst);
        self.simulate_network().await?;
        Ok(self.document(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BACKUP_VERSION, Card};
    use chrono::Utc;

    #[tokio::test]
    async fn test_merge_write_keeps_absent_fields() {
        let replica = MemoryReplica::new();
        let card = Card::new("Q".to_string(), "A".to_string(), None, Utc::now());
        replica.insert_document("u1", RemoteDocument {
            cards: Some(vec![card.clone()]),
            version: Some("0.9.0".to_string()),
            ..Default::default()
        });

        let update = RemoteDocument { version: Some(BACKUP_VERSION.to_string()), ..Default::default() };
        replica.write("u1", &update, WriteMode::Merge).await.unwrap();

        let stored = replica.read("u1").await.unwrap().unwrap();
        assert_eq!(stored.cards(), &[card]);
        assert_eq!(stored.version.as_deref(), Some(BACKUP_VERSION));
        assert_eq!(replica.write_count(), 1);
        assert_eq!(replica.read_count(), 1);
    }

    #[tokio::test]
    async fn test_replace_write_drops_absent_fields() {
        let replica = MemoryReplica::new();
        let card = Card::new("Q".to_string(), "A".to_string(), None, Utc::now());
        replica.insert_document("u1", RemoteDocument { cards: Some(vec![card]), ..Default::default() });

        replica.write("u1", &RemoteDocument::default(), WriteMode::Replace).await.unwrap();

        assert!(replica.document("u1").unwrap().cards.is_none());
    }

    #[tokio::test]
    async fn test_read_missing_document() {
        let replica = MemoryReplica::new();
        assert!(replica.read("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unreachable_replica_fails_with_network_error() {
        let replica = MemoryReplica::new();
        replica.set_unreachable(true);

        let err = replica.read("u1").await.unwrap_err();
        assert!(matches!(err, AppError::Network(_)));

        replica.set_unreachable(false);
        assert!(replica.read("u1").await.is_ok());
    }
}
