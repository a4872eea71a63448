//! # Records persisted by every store
//!
//! | Struct | Table | Unique field |
//! |--------|-------|--------------|
//! | [`Student`] | `students` | `email` |
//! | [`Note`] | `notes` | `title` |
//!
//! Each record has two write shapes. `New*` carries everything needed to insert a
//! row; `*Changes` carries the full set of fields an update replaces. Updates are
//! whole-record replacements of those fields, never partial merges.
//!
//! [`Student`] keeps the password hash so stores can persist it. It must never be
//! serialized into an HTTP response; the API crate projects it first.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::repo::Record;

/// A student row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: i32,
    pub name: String,
    pub email: String,
    /// bcrypt or Argon2 PHC string. Absent for students created without credentials.
    pub password_hash: Option<String>,
    pub age: Option<i32>,
    pub grade: Option<String>,
    pub major: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for inserting a student.
#[derive(Clone, Debug, PartialEq)]
pub struct NewStudent {
    pub name: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub age: Option<i32>,
    pub grade: Option<String>,
    pub major: Option<String>,
}

/// Fields replaced by a student update. The password hash is left untouched.
#[derive(Clone, Debug, PartialEq)]
pub struct StudentChanges {
    pub name: String,
    pub email: String,
    pub age: Option<i32>,
    pub grade: Option<String>,
    pub major: Option<String>,
}

impl Record for Student {
    type New = NewStudent;
    type Changes = StudentChanges;

    const ENTITY: &'static str = "student";
    const UNIQUE_FIELD: &'static str = "email";

    fn id(&self) -> i32 {
        self.id
    }

    fn unique_value(&self) -> &str {
        &self.email
    }

    fn new_unique_value(new: &NewStudent) -> &str {
        &new.email
    }

    fn changes_unique_value(changes: &StudentChanges) -> &str {
        &changes.email
    }

    fn from_new(id: i32, new: NewStudent, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: new.name,
            email: new.email,
            password_hash: new.password_hash,
            age: new.age,
            grade: new.grade,
            major: new.major,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, changes: StudentChanges, now: DateTime<Utc>) {
        self.name = changes.name;
        self.email = changes.email;
        self.age = changes.age;
        self.grade = changes.grade;
        self.major = changes.major;
        self.updated_at = now;
    }
}

/// A note row, owned by a student through `student_id`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub student_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for inserting a note.
#[derive(Clone, Debug, PartialEq)]
pub struct NewNote {
    pub title: String,
    pub content: String,
    pub student_id: i32,
}

/// Fields replaced by a note update. Ownership does not change.
#[derive(Clone, Debug, PartialEq)]
pub struct NoteChanges {
    pub title: String,
    pub content: String,
}

impl Record for Note {
    type New = NewNote;
    type Changes = NoteChanges;

    const ENTITY: &'static str = "note";
    const UNIQUE_FIELD: &'static str = "title";

    fn id(&self) -> i32 {
        self.id
    }

    fn unique_value(&self) -> &str {
        &self.title
    }

    fn new_unique_value(new: &NewNote) -> &str {
        &new.title
    }

    fn changes_unique_value(changes: &NoteChanges) -> &str {
        &changes.title
    }

    fn referenced_student(new: &NewNote) -> Option<i32> {
        Some(new.student_id)
    }

    fn from_new(id: i32, new: NewNote, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: new.title,
            content: new.content,
            student_id: new.student_id,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, changes: NoteChanges, now: DateTime<Utc>) {
        self.title = changes.title;
        self.content = changes.content;
        self.updated_at = now;
    }
}
