//! # PostgreSQL record store
//!
//! [`PgStore`] runs plain `sqlx::query_as` statements against the `students` and
//! `notes` tables. Database constraint errors are translated into [`StoreError`]:
//!
//! | PostgreSQL error | Operation | `StoreError` |
//! |------------------|-----------|--------------|
//! | unique violation | create / update | `UniqueViolation` |
//! | foreign key violation | create | `MissingReference` |
//! | foreign key violation | delete | `StillReferenced` |
//!
//! Everything else becomes `StoreError::Backend` with the driver message.

use sqlx::PgPool;
use store::{
    NewNote, NewStudent, Note, NoteChanges, Record, RecordStore, StoreError, StoreResult,
    Student, StudentChanges,
};

#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// What a foreign key violation means for the statement that raised it.
enum ForeignKey {
    MissingStudent(i32),
    StillReferenced(i32),
    Unexpected,
}

fn write_error<R: Record>(err: sqlx::Error, foreign_key: ForeignKey) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return StoreError::UniqueViolation {
                entity: R::ENTITY,
                field: R::UNIQUE_FIELD,
            };
        }
        if db.is_foreign_key_violation() {
            match foreign_key {
                ForeignKey::MissingStudent(id) => {
                    return StoreError::MissingReference {
                        entity: Student::ENTITY,
                        id,
                    }
                }
                ForeignKey::StillReferenced(id) => {
                    return StoreError::StillReferenced {
                        entity: R::ENTITY,
                        id,
                    }
                }
                ForeignKey::Unexpected => {}
            }
        }
    }
    backend_error(err)
}

fn backend_error(err: sqlx::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

fn not_found<R: Record>(id: i32) -> StoreError {
    StoreError::NotFound {
        entity: R::ENTITY,
        id,
    }
}

impl RecordStore<Student> for PgStore {
    async fn find_all(&self) -> StoreResult<Vec<Student>> {
        sqlx::query_as("SELECT * FROM students ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(backend_error)
    }

    async fn find_by_id(&self, id: i32) -> StoreResult<Option<Student>> {
        sqlx::query_as("SELECT * FROM students WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend_error)
    }

    async fn find_by_unique(&self, email: &str) -> StoreResult<Option<Student>> {
        sqlx::query_as("SELECT * FROM students WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend_error)
    }

    async fn create(&self, new: NewStudent) -> StoreResult<Student> {
        sqlx::query_as(
            r#"
            INSERT INTO students (name, email, password_hash, age, grade, major)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(new.age)
        .bind(&new.grade)
        .bind(&new.major)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error::<Student>(e, ForeignKey::Unexpected))
    }

    async fn update(&self, id: i32, changes: StudentChanges) -> StoreResult<Student> {
        let student: Option<Student> = sqlx::query_as(
            r#"
            UPDATE students
            SET name = $2, email = $3, age = $4, grade = $5, major = $6, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.email)
        .bind(changes.age)
        .bind(&changes.grade)
        .bind(&changes.major)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| write_error::<Student>(e, ForeignKey::Unexpected))?;

        student.ok_or_else(|| not_found::<Student>(id))
    }

    async fn delete(&self, id: i32) -> StoreResult<Student> {
        let student: Option<Student> = sqlx::query_as("DELETE FROM students WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| write_error::<Student>(e, ForeignKey::StillReferenced(id)))?;

        student.ok_or_else(|| not_found::<Student>(id))
    }
}

impl RecordStore<Note> for PgStore {
    async fn find_all(&self) -> StoreResult<Vec<Note>> {
        sqlx::query_as("SELECT * FROM notes ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(backend_error)
    }

    async fn find_by_id(&self, id: i32) -> StoreResult<Option<Note>> {
        sqlx::query_as("SELECT * FROM notes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend_error)
    }

    async fn find_by_unique(&self, title: &str) -> StoreResult<Option<Note>> {
        sqlx::query_as("SELECT * FROM notes WHERE title = $1")
            .bind(title)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend_error)
    }

    async fn create(&self, new: NewNote) -> StoreResult<Note> {
        sqlx::query_as(
            r#"
            INSERT INTO notes (title, content, student_id)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(&new.title)
        .bind(&new.content)
        .bind(new.student_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error::<Note>(e, ForeignKey::MissingStudent(new.student_id)))
    }

    async fn update(&self, id: i32, changes: NoteChanges) -> StoreResult<Note> {
        let note: Option<Note> = sqlx::query_as(
            r#"
            UPDATE notes
            SET title = $2, content = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&changes.title)
        .bind(&changes.content)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| write_error::<Note>(e, ForeignKey::Unexpected))?;

        note.ok_or_else(|| not_found::<Note>(id))
    }

    async fn delete(&self, id: i32) -> StoreResult<Note> {
        let note: Option<Note> = sqlx::query_as("DELETE FROM notes WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend_error)?;

        note.ok_or_else(|| not_found::<Note>(id))
    }
}
