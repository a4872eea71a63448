//! # Validated unique-record service
//!
//! [`RecordService`] is the one create/update/delete pipeline shared by every
//! resource. An entity opts in by implementing [`Schema`], which names its
//! request payload, how that payload becomes a store write, and the messages
//! used when a write collides or misses.
//!
//! | Operation | Steps |
//! |-----------|-------|
//! | `create` | required fields → unique pre-check (409) → store create |
//! | `update` | required fields → existence check (404) → store update |
//! | `delete` | store delete (404 when missing) |
//! | `get` / `list` | store read; a missing id is `Ok(None)` |
//!
//! The pre-check only gives a friendly early answer. Concurrent writers can both
//! pass it, so a [`StoreError::UniqueViolation`] at write time is reported with
//! the same conflict message.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use store::{Note, Record, RecordStore, StoreError, Student};

use crate::error::{ApiError, ApiResult};
use crate::models::{NoteInput, StudentInput};

/// Request-facing schema of a record.
pub trait Schema: Record {
    type Input: DeserializeOwned + Send + 'static;

    const CONFLICT: &'static str;
    const NOT_FOUND: &'static str;

    fn new_from(input: Self::Input) -> ApiResult<Self::New>;
    fn changes_from(input: Self::Input) -> ApiResult<Self::Changes>;
}

impl Schema for Student {
    type Input = StudentInput;

    const CONFLICT: &'static str = "Student with this email already exists";
    const NOT_FOUND: &'static str = "Student not found";

    fn new_from(input: StudentInput) -> ApiResult<Self::New> {
        input.into_new()
    }

    fn changes_from(input: StudentInput) -> ApiResult<Self::Changes> {
        input.into_changes()
    }
}

impl Schema for Note {
    type Input = NoteInput;

    const CONFLICT: &'static str = "Note with this title already exists";
    const NOT_FOUND: &'static str = "Note not found";

    fn new_from(input: NoteInput) -> ApiResult<Self::New> {
        input.into_new()
    }

    fn changes_from(input: NoteInput) -> ApiResult<Self::Changes> {
        input.into_changes()
    }
}

pub struct RecordService<R, S> {
    store: S,
    _record: PhantomData<fn() -> R>,
}

impl<R, S> RecordService<R, S>
where
    R: Schema,
    S: RecordStore<R>,
{
    pub fn new(store: S) -> Self {
        Self {
            store,
            _record: PhantomData,
        }
    }

    pub async fn list(&self) -> ApiResult<Vec<R>> {
        self.store
            .find_all()
            .await
            .map_err(|e| ApiError::unexpected(format!("failed to fetch {}s", R::ENTITY), e))
    }

    pub async fn get(&self, id: i32) -> ApiResult<Option<R>> {
        self.store
            .find_by_id(id)
            .await
            .map_err(|e| ApiError::unexpected(format!("failed to fetch {}", R::ENTITY), e))
    }

    pub async fn create(&self, input: R::Input) -> ApiResult<R> {
        let new = R::new_from(input)?;
        self.ensure_unique(R::new_unique_value(&new)).await?;
        self.insert(new).await
    }

    /// Fail with a conflict when another row already holds `value`.
    pub async fn ensure_unique(&self, value: &str) -> ApiResult<()> {
        let existing = self
            .store
            .find_by_unique(value)
            .await
            .map_err(|e| ApiError::unexpected(format!("failed to look up {}", R::ENTITY), e))?;

        match existing {
            Some(_) => Err(ApiError::conflict(R::CONFLICT)),
            None => Ok(()),
        }
    }

    /// Store an already validated row.
    pub async fn insert(&self, new: R::New) -> ApiResult<R> {
        let record = self.store.create(new).await.map_err(Self::write_error)?;
        tracing::debug!(entity = R::ENTITY, id = record.id(), "created");
        Ok(record)
    }

    pub async fn update(&self, id: i32, input: R::Input) -> ApiResult<R> {
        let changes = R::changes_from(input)?;
        if self.get(id).await?.is_none() {
            return Err(ApiError::not_found(R::NOT_FOUND));
        }
        self.store
            .update(id, changes)
            .await
            .map_err(Self::write_error)
    }

    pub async fn delete(&self, id: i32) -> ApiResult<R> {
        let record = self.store.delete(id).await.map_err(Self::write_error)?;
        tracing::debug!(entity = R::ENTITY, id, "deleted");
        Ok(record)
    }

    fn write_error(err: StoreError) -> ApiError {
        match err {
            StoreError::UniqueViolation { .. } => ApiError::conflict(R::CONFLICT),
            StoreError::NotFound { .. } => ApiError::not_found(R::NOT_FOUND),
            other => other.into(),
        }
    }
}
