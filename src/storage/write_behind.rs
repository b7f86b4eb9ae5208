use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use super::{DocumentRepository, SharedRepository, StorageKey};
use crate::error::{Error, Result};
use crate::models::quiz::QuizDocument;

enum WriteRequest {
    Save(StorageKey),
    Flush(oneshot::Sender<()>),
}

#[derive(Default)]
struct WriteQueue {
    next_version: u64,
    documents: HashMap<StorageKey, (u64, QuizDocument)>,
}

type SharedQueue = Arc<Mutex<WriteQueue>>;

/// Wraps a blocking repository so `save` only queues the document. A writer
/// task hands the latest queued version of each key to the inner repository
/// on the blocking pool. Loads see queued documents first.
pub struct WriteBehindRepository {
    inner: SharedRepository,
    queue: SharedQueue,
    sender: mpsc::UnboundedSender<WriteRequest>,
}

impl WriteBehindRepository {
    /// Starts the writer task. Must be called inside a tokio runtime.
    pub fn spawn(inner: SharedRepository) -> Self {
        let queue = SharedQueue::default();
        let (sender, receiver) = mpsc::unbounded_channel();
        tokio::spawn(run_writer(inner.clone(), queue.clone(), receiver));
        Self {
            inner,
            queue,
            sender,
        }
    }

    /// Resolves once every save queued before the call has been attempted.
    pub async fn flush(&self) {
        let (done, wait) = oneshot::channel();
        if self.sender.send(WriteRequest::Flush(done)).is_err() {
            return;
        }
        let _ = wait.await;
    }

    /// Number of documents not yet written to the inner repository.
    pub fn queued(&self) -> usize {
        self.lock().map(|q| q.documents.len()).unwrap_or(0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, WriteQueue>> {
        self.queue
            .lock()
            .map_err(|_| Error::Internal("write queue mutex poisoned".to_string()))
    }
}

impl DocumentRepository for WriteBehindRepository {
    fn load(&self, key: &StorageKey) -> Result<Option<QuizDocument>> {
        if let Some((_, document)) = self.lock()?.documents.get(key) {
            return Ok(Some(document.clone()));
        }
        self.inner.load(key)
    }

    fn save(&self, key: &StorageKey, document: &QuizDocument) -> Result<()> {
        {
            let mut queue = self.lock()?;
            queue.next_version += 1;
            let version = queue.next_version;
            queue
                .documents
                .insert(key.clone(), (version, document.clone()));
        }
        self.sender
            .send(WriteRequest::Save(key.clone()))
            .map_err(|_| Error::Internal("document writer has stopped".to_string()))
    }
}

async fn run_writer(
    inner: SharedRepository,
    queue: SharedQueue,
    mut receiver: mpsc::UnboundedReceiver<WriteRequest>,
) {
    while let Some(request) = receiver.recv().await {
        match request {
            WriteRequest::Save(key) => write_latest(&inner, &queue, key).await,
            WriteRequest::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    debug!("Document writer stopped");
}

async fn write_latest(inner: &SharedRepository, queue: &SharedQueue, key: StorageKey) {
    let latest = match queue.lock() {
        Ok(queue) => queue.documents.get(&key).cloned(),
        Err(_) => {
            warn!(key = %key, "Write queue mutex poisoned, dropping save");
            return;
        }
    };
    // already written by an earlier request for the same key
    let Some((version, document)) = latest else {
        return;
    };

    let repository = inner.clone();
    let target = key.clone();
    let result = tokio::task::spawn_blocking(move || repository.save(&target, &document)).await;
    match result {
        Ok(Ok(())) => {
            if let Ok(mut queue) = queue.lock() {
                if queue.documents.get(&key).map(|(v, _)| *v) == Some(version) {
                    queue.documents.remove(&key);
                }
            }
            debug!(key = %key, version, "Quiz document written");
        }
        Ok(Err(e)) => warn!(key = %key, error = %e, "Failed to mirror quiz document"),
        Err(e) => warn!(key = %key, error = %e, "Quiz document writer panicked"),
    }
}
