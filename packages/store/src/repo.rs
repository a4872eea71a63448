//! # Record store — the persistence seam
//!
//! Everything above the storage layer talks to rows through [`RecordStore`], so the
//! same validation and auth code runs against PostgreSQL (server deployments), the
//! in-memory store (tests), or the JSON file store (single-node fallback).
//!
//! ## [`Record`] trait
//!
//! Describes one entity schema: its name, the field that must stay unique across
//! all rows, how a row is built from a `New` shape, and how a `Changes` shape is
//! applied to an existing row. Entities that point at a student expose the
//! referenced id through [`Record::referenced_student`] so stores can enforce it.
//!
//! ## [`RecordStore`] trait
//!
//! | Method | Missing row |
//! |--------|-------------|
//! | [`find_all`](RecordStore::find_all) | — |
//! | [`find_by_id`](RecordStore::find_by_id) | `Ok(None)` |
//! | [`find_by_unique`](RecordStore::find_by_unique) | `Ok(None)` |
//! | [`create`](RecordStore::create) | — |
//! | [`update`](RecordStore::update) | `Err(StoreError::NotFound)` |
//! | [`delete`](RecordStore::delete) | `Err(StoreError::NotFound)` |
//!
//! Implementations must reject duplicate unique values with
//! [`StoreError::UniqueViolation`] on both create and update. Callers may check for
//! duplicates first, but only the store sees concurrent writers.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::error::StoreResult;

/// Schema of a persisted entity.
pub trait Record: Clone + Send + Sync + 'static {
    type New: Send + Sync + 'static;
    type Changes: Send + Sync + 'static;

    /// Singular entity name used in messages: `"student"`.
    const ENTITY: &'static str;
    /// Name of the field that is unique across all rows: `"email"`.
    const UNIQUE_FIELD: &'static str;

    fn id(&self) -> i32;
    fn unique_value(&self) -> &str;
    fn new_unique_value(new: &Self::New) -> &str;
    fn changes_unique_value(changes: &Self::Changes) -> &str;

    /// Student id a new row points at, if the entity references students.
    fn referenced_student(_new: &Self::New) -> Option<i32> {
        None
    }

    fn from_new(id: i32, new: Self::New, now: DateTime<Utc>) -> Self;
    fn apply(&mut self, changes: Self::Changes, now: DateTime<Utc>);
}

/// Async CRUD access to the rows of one entity.
pub trait RecordStore<R: Record>: Clone + Send + Sync + 'static {
    fn find_all(&self) -> impl Future<Output = StoreResult<Vec<R>>> + Send;

    fn find_by_id(&self, id: i32) -> impl Future<Output = StoreResult<Option<R>>> + Send;

    fn find_by_unique(&self, value: &str)
        -> impl Future<Output = StoreResult<Option<R>>> + Send;

    fn create(&self, new: R::New) -> impl Future<Output = StoreResult<R>> + Send;

    fn update(&self, id: i32, changes: R::Changes)
        -> impl Future<Output = StoreResult<R>> + Send;

    /// Remove a row and return it.
    fn delete(&self, id: i32) -> impl Future<Output = StoreResult<R>> + Send;
}
