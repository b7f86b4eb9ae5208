pub mod file_repository;
pub mod memory_repository;
pub mod write_behind;

use std::sync::Arc;

use crate::config::get_config;
use crate::error::Result;
use crate::models::quiz::QuizDocument;

pub use file_repository::FileRepository;
pub use memory_repository::MemoryRepository;
pub use write_behind::WriteBehindRepository;

const KEY_PREFIX: &str = "quiz-builder";
const GLOBAL_KEY: &str = "global";

/// Key a quiz document is persisted under: `quiz-builder:<quizId>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey(String);

impl StorageKey {
    pub fn for_quiz(quiz_id: Option<&str>) -> Self {
        let id = quiz_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .unwrap_or(GLOBAL_KEY);
        Self(format!("{}:{}", KEY_PREFIX, id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The quiz id part of the key, `None` for the global document.
    pub fn quiz_id(&self) -> Option<&str> {
        self.0
            .strip_prefix(KEY_PREFIX)
            .and_then(|rest| rest.strip_prefix(':'))
            .filter(|id| *id != GLOBAL_KEY)
    }
}

impl std::fmt::Display for StorageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait DocumentRepository: Send + Sync {
    /// `Ok(None)` when nothing is stored under `key`.
    fn load(&self, key: &StorageKey) -> Result<Option<QuizDocument>>;

    fn save(&self, key: &StorageKey, document: &QuizDocument) -> Result<()>;
}

impl<R: DocumentRepository + ?Sized> DocumentRepository for Arc<R> {
    fn load(&self, key: &StorageKey) -> Result<Option<QuizDocument>> {
        (**self).load(key)
    }

    fn save(&self, key: &StorageKey, document: &QuizDocument) -> Result<()> {
        (**self).save(key, document)
    }
}

pub type SharedRepository = Arc<dyn DocumentRepository>;

/// File repository under `DATA_DIR`, written behind by a background task.
/// Must be called inside a tokio runtime.
pub fn create_repository() -> Result<Arc<WriteBehindRepository>> {
    let config = get_config();
    let repository = FileRepository::open(&config.data_dir)?;
    tracing::info!("Quiz documents stored under {}", config.data_dir.display());
    Ok(Arc::new(WriteBehindRepository::spawn(Arc::new(repository))))
}
