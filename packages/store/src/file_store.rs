//! # JSON-file-backed record store
//!
//! [`FileStore`] is the single-node alternative to PostgreSQL: every row lives in
//! one pretty-printed JSON document on the local filesystem. It is meant for demos
//! and small deployments, not for concurrent writers across processes.
//!
//! ## Layout
//!
//! ```text
//! <path>                     # {"students": {...}, "notes": {...}}
//! <path>.tmp                 # scratch copy, renamed over <path> on every write
//! ```
//!
//! Each table persists its own `nextId` counter next to the rows, so ids keep
//! increasing across restarts and deletes.
//!
//! ## Write path
//!
//! Writes run against a copy of the tables while the lock is held. The copy is
//! written to disk first and only then replaces the in-memory state, so a failed
//! write leaves both the file and the process unchanged.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;

use crate::error::StoreResult;
use crate::models::{Note, Student};
use crate::repo::{Record, RecordStore};
use crate::tables::Tables;

/// Filesystem-backed RecordStore.
#[derive(Clone, Debug)]
pub struct FileStore {
    path: PathBuf,
    tables: Arc<Mutex<Tables>>,
}

impl FileStore {
    /// Open the document at `path`, starting empty when the file does not exist yet.
    pub async fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let tables = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "store file missing, starting empty");
                Tables::default()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            tables: Arc::new(Mutex::new(tables)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn scratch_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }

    async fn persist(&self, tables: &Tables) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let bytes = serde_json::to_vec_pretty(tables)?;
        let scratch = self.scratch_path();
        tokio::fs::write(&scratch, bytes).await?;
        tokio::fs::rename(&scratch, &self.path).await?;
        Ok(())
    }

    async fn write<T>(
        &self,
        op: impl FnOnce(&mut Tables) -> StoreResult<T> + Send,
    ) -> StoreResult<T> {
        let mut tables = self.tables.lock().await;
        let mut next = tables.clone();
        let out = op(&mut next)?;
        self.persist(&next).await?;
        *tables = next;
        Ok(out)
    }
}

macro_rules! file_record_store {
    ($record:ty) => {
        impl RecordStore<$record> for FileStore {
            async fn find_all(&self) -> StoreResult<Vec<$record>> {
                Ok(self.tables.lock().await.find_all())
            }

            async fn find_by_id(&self, id: i32) -> StoreResult<Option<$record>> {
                Ok(self.tables.lock().await.find_by_id(id))
            }

            async fn find_by_unique(&self, value: &str) -> StoreResult<Option<$record>> {
                Ok(self.tables.lock().await.find_by_unique(value))
            }

            async fn create(&self, new: <$record as Record>::New) -> StoreResult<$record> {
                self.write(|tables| tables.create(new, Utc::now())).await
            }

            async fn update(
                &self,
                id: i32,
                changes: <$record as Record>::Changes,
            ) -> StoreResult<$record> {
                self.write(|tables| tables.update(id, changes, Utc::now()))
                    .await
            }

            async fn delete(&self, id: i32) -> StoreResult<$record> {
                self.write(|tables| tables.delete(id)).await
            }
        }
    };
}

file_record_store!(Student);
file_record_store!(Note);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::models::{NewNote, NewStudent};

    fn amy() -> NewStudent {
        NewStudent {
            name: "Amy".to_string(),
            email: "a@x.com".to_string(),
            password_hash: Some("$2b$04$hash".to_string()),
            age: Some(21),
            grade: Some("A".to_string()),
            major: None,
        }
    }

    #[tokio::test]
    async fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("students.json");

        let store = FileStore::open(&path).await.unwrap();
        let student = RecordStore::<Student>::create(&store, amy()).await.unwrap();
        let note = RecordStore::<Note>::create(
            &store,
            NewNote {
                title: "T1".to_string(),
                content: "C1".to_string(),
                student_id: student.id,
            },
        )
        .await
        .unwrap();

        // Re-open from the same file
        let reopened = FileStore::open(&path).await.unwrap();
        let students = RecordStore::<Student>::find_all(&reopened).await.unwrap();
        assert_eq!(students, vec![student.clone()]);
        assert_eq!(students[0].password_hash.as_deref(), Some("$2b$04$hash"));

        let notes = RecordStore::<Note>::find_all(&reopened).await.unwrap();
        assert_eq!(notes, vec![note]);

        // Ids keep counting after a restart
        RecordStore::<Student>::delete(&reopened, student.id).await.unwrap();
        let again = FileStore::open(&path).await.unwrap();
        let next = RecordStore::<Student>::create(&again, amy()).await.unwrap();
        assert_eq!(next.id, student.id + 1);
    }

    #[tokio::test]
    async fn test_failed_write_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("students.json");

        let store = FileStore::open(&path).await.unwrap();
        RecordStore::<Student>::create(&store, amy()).await.unwrap();
        let before = std::fs::read(&path).unwrap();

        let err = RecordStore::<Student>::create(&store, amy()).await.unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation { .. }));
        assert_eq!(std::fs::read(&path).unwrap(), before);
        assert!(!store.scratch_path().exists());
    }

    #[tokio::test]
    async fn test_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("absent.json")).await.unwrap();

        assert!(RecordStore::<Note>::find_all(&store).await.unwrap().is_empty());
        assert!(!store.path().exists());
    }
}
