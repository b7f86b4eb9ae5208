use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use crate::error::{Error, Result};
use crate::services::document_store::QuizDocumentStore;
use crate::storage::SharedRepository;

pub const DEFAULT_OPEN_QUIZZES: usize = 256;

type SharedStore = Arc<Mutex<QuizDocumentStore<SharedRepository>>>;

struct OpenStore {
    store: SharedStore,
    last_used: u64,
}

#[derive(Default)]
struct OpenStores {
    entries: HashMap<String, OpenStore>,
    clock: u64,
}

impl OpenStores {
    fn touch(&mut self, quiz_id: &str) -> Option<SharedStore> {
        self.clock += 1;
        let clock = self.clock;
        self.entries.get_mut(quiz_id).map(|entry| {
            entry.last_used = clock;
            entry.store.clone()
        })
    }

    fn insert(&mut self, quiz_id: &str, store: SharedStore) {
        self.clock += 1;
        self.entries.insert(
            quiz_id.to_string(),
            OpenStore {
                store,
                last_used: self.clock,
            },
        );
    }

    /// Drops least recently used stores until at most `capacity` remain.
    /// Stores a request is still holding are skipped.
    fn evict_over(&mut self, capacity: usize) {
        while self.entries.len() > capacity {
            let idle = self
                .entries
                .iter()
                .filter(|(_, entry)| Arc::strong_count(&entry.store) == 1)
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(id, _)| id.clone());
            let Some(quiz_id) = idle else {
                break;
            };
            self.entries.remove(&quiz_id);
            debug!(quiz_id = %quiz_id, "Closed idle quiz store");
        }
    }
}

/// Trims a quiz id taken from a request path. Blank ids are rejected.
pub fn normalize_quiz_id(raw: &str) -> Result<&str> {
    let quiz_id = raw.trim();
    if quiz_id.is_empty() {
        return Err(Error::BadRequest("Quiz id cannot be empty".to_string()));
    }
    Ok(quiz_id)
}

/// Open quiz stores by quiz id, each behind its own lock. A store is loaded
/// from the repository the first time its quiz is touched; beyond `capacity`
/// the least recently used idle stores are closed. Every change is already
/// mirrored, so a closed store reloads to the same document.
#[derive(Clone)]
pub struct QuizWorkspace {
    repository: SharedRepository,
    capacity: usize,
    stores: Arc<Mutex<OpenStores>>,
}

impl QuizWorkspace {
    pub fn new(repository: SharedRepository) -> Self {
        Self::with_capacity(repository, DEFAULT_OPEN_QUIZZES)
    }

    pub fn with_capacity(repository: SharedRepository, capacity: usize) -> Self {
        Self {
            repository,
            capacity: capacity.max(1),
            stores: Arc::new(Mutex::new(OpenStores::default())),
        }
    }

    /// Runs `f` against the store for `quiz_id`. Only that quiz is locked
    /// while `f` runs, and never across an await point.
    pub fn with_store<T>(
        &self,
        quiz_id: &str,
        f: impl FnOnce(&mut QuizDocumentStore<SharedRepository>) -> T,
    ) -> Result<T> {
        let quiz_id = normalize_quiz_id(quiz_id)?;
        let store = self.open(quiz_id)?;
        let mut store = store
            .lock()
            .map_err(|_| Error::Internal(format!("quiz store {} mutex poisoned", quiz_id)))?;
        Ok(f(&mut store))
    }

    fn open(&self, quiz_id: &str) -> Result<SharedStore> {
        if let Some(store) = self.lock_stores()?.touch(quiz_id) {
            return Ok(store);
        }

        // load outside the workspace lock; another request may win the race
        let loaded: SharedStore = Arc::new(Mutex::new(QuizDocumentStore::load(
            self.repository.clone(),
            Some(quiz_id),
        )));

        let mut stores = self.lock_stores()?;
        if let Some(existing) = stores.touch(quiz_id) {
            return Ok(existing);
        }
        stores.insert(quiz_id, loaded.clone());
        stores.evict_over(self.capacity);
        Ok(loaded)
    }

    fn lock_stores(&self) -> Result<MutexGuard<'_, OpenStores>> {
        self.stores
            .lock()
            .map_err(|_| Error::Internal("quiz workspace mutex poisoned".to_string()))
    }

    pub fn open_count(&self) -> usize {
        self.stores.lock().map(|s| s.entries.len()).unwrap_or(0)
    }

    pub fn is_open(&self, quiz_id: &str) -> bool {
        self.stores
            .lock()
            .map(|s| s.entries.contains_key(quiz_id.trim()))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::QuestionType;
    use crate::storage::{DocumentRepository, MemoryRepository, StorageKey};

    #[test]
    fn stores_are_opened_once_per_quiz() {
        let repo = Arc::new(MemoryRepository::new());
        let workspace = QuizWorkspace::new(repo.clone());

        let id = workspace
            .with_store("10", |store| store.add_question(QuestionType::ShortText))
            .unwrap();
        let count = workspace
            .with_store(" 10 ", |store| store.document().questions.len())
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(workspace.open_count(), 1);

        let stored = repo.load(&StorageKey::for_quiz(Some("10"))).unwrap().unwrap();
        assert_eq!(stored.questions[0].id, id);
    }

    #[test]
    fn blank_quiz_id_is_rejected() {
        let workspace = QuizWorkspace::new(Arc::new(MemoryRepository::new()));
        assert!(matches!(
            workspace.with_store("  ", |_| ()),
            Err(Error::BadRequest(_))
        ));
        assert_eq!(normalize_quiz_id("  7 ").unwrap(), "7");
    }

    #[test]
    fn least_recently_used_store_is_closed() {
        let repo = Arc::new(MemoryRepository::new());
        let workspace = QuizWorkspace::with_capacity(repo.clone(), 2);

        let kept = workspace
            .with_store("a", |store| store.add_question(QuestionType::Paragraph))
            .unwrap();
        workspace.with_store("b", |_| ()).unwrap();
        workspace.with_store("a", |_| ()).unwrap();
        workspace.with_store("c", |_| ()).unwrap();
        assert!(workspace.is_open("a"));
        assert!(!workspace.is_open("b"));
        assert!(workspace.is_open("c"));

        for id in ["d", "e"] {
            workspace.with_store(id, |_| ()).unwrap();
        }
        assert_eq!(workspace.open_count(), 2);
        assert!(!workspace.is_open("a"));

        // a closed quiz reopens from the mirror
        let questions = workspace
            .with_store("a", |store| store.document().questions.clone())
            .unwrap();
        assert_eq!(questions[0].id, kept);
        assert_eq!(workspace.open_count(), 2);
    }

    #[test]
    fn store_in_use_is_not_closed() {
        let workspace = QuizWorkspace::with_capacity(Arc::new(MemoryRepository::new()), 1);
        let inner = workspace.clone();
        workspace
            .with_store("busy", |store| {
                store.set_title("Sedang disunting");
                inner.with_store("other", |_| ()).unwrap();
                assert!(inner.is_open("busy"));
                assert_eq!(inner.open_count(), 2);
            })
            .unwrap();

        // the next open trims back to capacity
        workspace.with_store("third", |_| ()).unwrap();
        assert_eq!(workspace.open_count(), 1);
        assert!(workspace.is_open("third"));
    }
}
