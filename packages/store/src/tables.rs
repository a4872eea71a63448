//! Row tables shared by the in-process stores.
//!
//! [`MemoryStore`](crate::MemoryStore) keeps a [`Tables`] behind a lock;
//! [`FileStore`](crate::FileStore) does the same and writes the whole document to
//! disk after every change. Uniqueness and student references are checked here,
//! while the caller holds the lock.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};
use crate::models::{Note, Student};
use crate::repo::Record;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Table<R> {
    rows: BTreeMap<i32, R>,
    /// Next id to hand out. Persisted so deleted ids are never reused.
    next_id: i32,
}

impl<R> Default for Table<R> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<R: Record> Table<R> {
    fn holder_of(&self, value: &str) -> Option<&R> {
        self.rows.values().find(|row| row.unique_value() == value)
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub(crate) struct Tables {
    #[serde(default)]
    students: Table<Student>,
    #[serde(default)]
    notes: Table<Note>,
}

/// Selects the table holding rows of `R`.
pub(crate) trait TableOf<R: Record> {
    fn table(&self) -> &Table<R>;
    fn table_mut(&mut self) -> &mut Table<R>;
}

impl TableOf<Student> for Tables {
    fn table(&self) -> &Table<Student> {
        &self.students
    }

    fn table_mut(&mut self) -> &mut Table<Student> {
        &mut self.students
    }
}

impl TableOf<Note> for Tables {
    fn table(&self) -> &Table<Note> {
        &self.notes
    }

    fn table_mut(&mut self) -> &mut Table<Note> {
        &mut self.notes
    }
}

impl Tables {
    pub(crate) fn find_all<R: Record>(&self) -> Vec<R>
    where
        Self: TableOf<R>,
    {
        TableOf::<R>::table(self).rows.values().cloned().collect()
    }

    pub(crate) fn find_by_id<R: Record>(&self, id: i32) -> Option<R>
    where
        Self: TableOf<R>,
    {
        TableOf::<R>::table(self).rows.get(&id).cloned()
    }

    pub(crate) fn find_by_unique<R: Record>(&self, value: &str) -> Option<R>
    where
        Self: TableOf<R>,
    {
        TableOf::<R>::table(self).holder_of(value).cloned()
    }

    pub(crate) fn create<R: Record>(&mut self, new: R::New, now: DateTime<Utc>) -> StoreResult<R>
    where
        Self: TableOf<R>,
    {
        if TableOf::<R>::table(self).holder_of(R::new_unique_value(&new)).is_some() {
            return Err(StoreError::UniqueViolation {
                entity: R::ENTITY,
                field: R::UNIQUE_FIELD,
            });
        }
        if let Some(student_id) = R::referenced_student(&new) {
            if !self.students.rows.contains_key(&student_id) {
                return Err(StoreError::MissingReference {
                    entity: Student::ENTITY,
                    id: student_id,
                });
            }
        }

        let table = TableOf::<R>::table_mut(self);
        let id = table.next_id;
        table.next_id += 1;
        let row = R::from_new(id, new, now);
        table.rows.insert(id, row.clone());
        Ok(row)
    }

    pub(crate) fn update<R: Record>(
        &mut self,
        id: i32,
        changes: R::Changes,
        now: DateTime<Utc>,
    ) -> StoreResult<R>
    where
        Self: TableOf<R>,
    {
        let table = TableOf::<R>::table_mut(self);
        if let Some(holder) = table.holder_of(R::changes_unique_value(&changes)) {
            if holder.id() != id {
                return Err(StoreError::UniqueViolation {
                    entity: R::ENTITY,
                    field: R::UNIQUE_FIELD,
                });
            }
        }
        let row = table.rows.get_mut(&id).ok_or(StoreError::NotFound {
            entity: R::ENTITY,
            id,
        })?;
        row.apply(changes, now);
        Ok(row.clone())
    }

    pub(crate) fn delete<R: Record>(&mut self, id: i32) -> StoreResult<R>
    where
        Self: TableOf<R>,
    {
        TableOf::<R>::table_mut(self).rows.remove(&id).ok_or(StoreError::NotFound {
            entity: R::ENTITY,
            id,
        })
    }
}
