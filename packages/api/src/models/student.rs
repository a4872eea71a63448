//! # Student projections
//!
//! A [`store::Student`] row carries the password hash, so it never reaches a
//! response directly. Handlers project it first:
//!
//! - [`StudentInfo`]: every column except the password hash. Returned by the
//!   student routes, registration and `GET /api/auth/me`, and attached to
//!   requests that pass the auth guard.
//! - [`LoginStudent`]: `{id, email, name}` only, returned by login.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use store::Student;

/// Student information safe to send to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentInfo {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub age: Option<i32>,
    pub grade: Option<String>,
    pub major: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Student> for StudentInfo {
    fn from(student: &Student) -> Self {
        Self {
            id: student.id,
            name: student.name.clone(),
            email: student.email.clone(),
            age: student.age,
            grade: student.grade.clone(),
            major: student.major.clone(),
            created_at: student.created_at,
            updated_at: student.updated_at,
        }
    }
}

impl From<Student> for StudentInfo {
    fn from(student: Student) -> Self {
        Self::from(&student)
    }
}

/// Minimal projection returned on login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginStudent {
    pub id: i32,
    pub email: String,
    pub name: String,
}

impl From<&Student> for LoginStudent {
    fn from(student: &Student) -> Self {
        Self {
            id: student.id,
            email: student.email.clone(),
            name: student.name.clone(),
        }
    }
}
