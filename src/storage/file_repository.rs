use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{DocumentRepository, StorageKey};
use crate::error::{Error, Result};
use crate::models::quiz::QuizDocument;

/// One JSON file per storage key inside a data directory.
#[derive(Debug, Clone)]
pub struct FileRepository {
    root: PathBuf,
}

impl FileRepository {
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn path_for(&self, key: &StorageKey) -> PathBuf {
        self.root.join(format!("{}.json", file_stem(key)))
    }
}

/// Keeps `[A-Za-z0-9_-]`, everything else becomes `_`, so ids cannot escape the root.
fn file_stem(key: &StorageKey) -> String {
    key.as_str()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

impl DocumentRepository for FileRepository {
    fn load(&self, key: &StorageKey) -> Result<Option<QuizDocument>> {
        let path = self.path_for(key);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::Io(e)),
        };
        let document = serde_json::from_str(&raw).map_err(|e| {
            Error::Format(format!("{} is unreadable: {}", path.display(), e))
        })?;
        Ok(Some(document))
    }

    fn save(&self, key: &StorageKey, document: &QuizDocument) -> Result<()> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(document)?)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}
