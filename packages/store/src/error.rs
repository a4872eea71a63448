//! Errors reported by [`RecordStore`](crate::RecordStore) implementations.

use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A write would duplicate the entity's unique field.
    #[error("{entity} with this {field} already exists")]
    UniqueViolation {
        entity: &'static str,
        field: &'static str,
    },

    /// A write references a student that does not exist.
    #[error("{entity} {id} does not exist")]
    MissingReference { entity: &'static str, id: i32 },

    /// A delete was refused because other records still reference the row.
    #[error("{entity} {id} is still referenced")]
    StillReferenced { entity: &'static str, id: i32 },

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("store document is corrupt: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Backend(String),
}
