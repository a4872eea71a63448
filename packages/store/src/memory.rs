use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;

use crate::error::StoreResult;
use crate::models::{Note, Student};
use crate::repo::{Record, RecordStore};
use crate::tables::Tables;

/// In-memory RecordStore for tests and throwaway runs.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

macro_rules! memory_record_store {
    ($record:ty) => {
        impl RecordStore<$record> for MemoryStore {
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
                self.tables.lock().await.create(new, Utc::now())
            }

            async fn update(
                &self,
                id: i32,
                changes: <$record as Record>::Changes,
            ) -> StoreResult<$record> {
                self.tables.lock().await.update(id, changes, Utc::now())
            }

            async fn delete(&self, id: i32) -> StoreResult<$record> {
                self.tables.lock().await.delete(id)
            }
        }
    };
}

memory_record_store!(Student);
memory_record_store!(Note);
