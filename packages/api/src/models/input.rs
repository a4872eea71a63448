//! # Request payloads and field normalization
//!
//! Every payload field is optional at the JSON level so that a missing field is
//! reported as a validation error naming it, rather than as a deserialization
//! failure. Conversion into the store's write shapes applies the field rules:
//!
//! - required text is trimmed; absent, `null` or whitespace-only counts as missing,
//! - emails are additionally lowercased,
//! - passwords are taken verbatim, only the empty string counts as missing,
//! - optional text that is empty after trimming becomes `None`,
//! - integers ([`IntInput`]) accept a JSON integer, a whole-valued float such as
//!   `21.0`, or a numeric string.
//!
//! Updates reuse the create payloads and require the same fields again. There are
//! no partial updates.

use serde::Deserialize;
use store::{NewNote, NewStudent, NoteChanges, StudentChanges};

use crate::error::{ApiError, ApiResult};

/// An integer sent either as a number or as a string of digits.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum IntInput {
    Number(i64),
    /// Accepted only when it has no fractional part.
    Float(f64),
    Text(String),
}

impl IntInput {
    /// `Ok(None)` for an empty string.
    fn parse(&self, field: &str) -> ApiResult<Option<i32>> {
        let invalid = || ApiError::validation(format!("{field} must be an integer"));
        match self {
            IntInput::Number(n) => i32::try_from(*n).map(Some).map_err(|_| invalid()),
            IntInput::Float(f) => {
                if f.fract() == 0.0 && *f >= f64::from(i32::MIN) && *f <= f64::from(i32::MAX) {
                    Ok(Some(*f as i32))
                } else {
                    Err(invalid())
                }
            }
            IntInput::Text(text) => {
                let text = text.trim();
                if text.is_empty() {
                    return Ok(None);
                }
                text.parse::<i32>().map(Some).map_err(|_| invalid())
            }
        }
    }
}

/// Collects the names of required fields that are missing.
#[derive(Debug, Default)]
pub struct RequiredFields {
    missing: Vec<&'static str>,
}

impl RequiredFields {
    pub fn text(&mut self, field: &'static str, value: Option<String>) -> String {
        match optional_text(value) {
            Some(text) => text,
            None => {
                self.missing.push(field);
                String::new()
            }
        }
    }

    pub fn email(&mut self, field: &'static str, value: Option<String>) -> String {
        self.text(field, value).to_lowercase()
    }

    pub fn secret(&mut self, field: &'static str, value: Option<String>) -> String {
        match value {
            Some(secret) if !secret.is_empty() => secret,
            _ => {
                self.missing.push(field);
                String::new()
            }
        }
    }

    pub fn int(&mut self, field: &'static str, value: Option<IntInput>) -> ApiResult<i32> {
        let parsed = match value {
            Some(value) => value.parse(field)?,
            None => None,
        };
        Ok(parsed.unwrap_or_else(|| {
            self.missing.push(field);
            0
        }))
    }

    /// Fail with a validation error listing every missing field.
    pub fn check(self) -> ApiResult<()> {
        if self.missing.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation(format!(
                "missing required fields: {}",
                self.missing.join(", ")
            )))
        }
    }
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

fn optional_int(field: &str, value: Option<IntInput>) -> ApiResult<Option<i32>> {
    match value {
        Some(value) => value.parse(field),
        None => Ok(None),
    }
}

/// Body of `POST /api/auth/register`.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub age: Option<IntInput>,
    pub grade: Option<String>,
    pub major: Option<String>,
}

impl RegisterInput {
    /// Validated profile plus the plaintext password, not yet hashed.
    pub fn into_parts(self) -> ApiResult<(NewStudent, String)> {
        let mut fields = RequiredFields::default();
        let name = fields.text("name", self.name);
        let email = fields.email("email", self.email);
        let password = fields.secret("password", self.password);
        fields.check()?;

        let student = NewStudent {
            name,
            email,
            password_hash: None,
            age: optional_int("age", self.age)?,
            grade: optional_text(self.grade),
            major: optional_text(self.major),
        };
        Ok((student, password))
    }
}

/// Body of `POST /api/auth/login`.
#[derive(Debug, Default, Deserialize)]
pub struct LoginInput {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl LoginInput {
    /// Normalized email and plaintext password.
    pub fn into_parts(self) -> ApiResult<(String, String)> {
        let mut fields = RequiredFields::default();
        let email = fields.email("email", self.email);
        let password = fields.secret("password", self.password);
        fields.check()?;
        Ok((email, password))
    }
}

/// Body of `POST /api/students` and `PUT /api/students/{id}`.
///
/// A direct create sets no password; such a student cannot log in.
#[derive(Debug, Default, Deserialize)]
pub struct StudentInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<IntInput>,
    pub grade: Option<String>,
    pub major: Option<String>,
}

impl StudentInput {
    pub fn into_new(self) -> ApiResult<NewStudent> {
        let changes = self.into_changes()?;
        Ok(NewStudent {
            name: changes.name,
            email: changes.email,
            password_hash: None,
            age: changes.age,
            grade: changes.grade,
            major: changes.major,
        })
    }

    pub fn into_changes(self) -> ApiResult<StudentChanges> {
        let mut fields = RequiredFields::default();
        let name = fields.text("name", self.name);
        let email = fields.email("email", self.email);
        fields.check()?;

        Ok(StudentChanges {
            name,
            email,
            age: optional_int("age", self.age)?,
            grade: optional_text(self.grade),
            major: optional_text(self.major),
        })
    }
}

/// Body of `POST /api/notes` and `PUT /api/notes/{id}`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteInput {
    pub title: Option<String>,
    pub content: Option<String>,
    /// Required on create. Ignored on update; a note keeps its owner.
    pub student_id: Option<IntInput>,
}

impl NoteInput {
    pub fn into_new(self) -> ApiResult<NewNote> {
        let mut fields = RequiredFields::default();
        let title = fields.text("title", self.title);
        let content = fields.text("content", self.content);
        let student_id = fields.int("studentId", self.student_id)?;
        fields.check()?;

        Ok(NewNote {
            title,
            content,
            student_id,
        })
    }

    pub fn into_changes(self) -> ApiResult<NoteChanges> {
        let mut fields = RequiredFields::default();
        let title = fields.text("title", self.title);
        let content = fields.text("content", self.content);
        fields.check()?;

        Ok(NoteChanges { title, content })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(name: Option<&str>, email: Option<&str>) -> StudentInput {
        StudentInput {
            name: name.map(str::to_string),
            email: email.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_fields_are_listed() {
        let err = student(None, Some("  ")).into_new().unwrap_err();
        assert_eq!(err.to_string(), "missing required fields: name, email");

        let err = NoteInput::default().into_new().unwrap_err();
        assert_eq!(
            err.to_string(),
            "missing required fields: title, content, studentId"
        );
    }

    #[test]
    fn test_email_is_normalized() {
        let new = student(Some(" Amy "), Some(" A@X.com ")).into_new().unwrap();
        assert_eq!(new.name, "Amy");
        assert_eq!(new.email, "a@x.com");
        assert_eq!(new.password_hash, None);
    }

    #[test]
    fn test_empty_optionals_become_absent() {
        let input: StudentInput = serde_json::from_value(serde_json::json!({
            "name": "Amy",
            "email": "a@x.com",
            "age": "",
            "grade": "  ",
            "major": "Physics"
        }))
        .unwrap();

        let changes = input.into_changes().unwrap();
        assert_eq!(changes.age, None);
        assert_eq!(changes.grade, None);
        assert_eq!(changes.major.as_deref(), Some("Physics"));
    }

    #[test]
    fn test_age_accepts_number_or_numeric_string() {
        let parse = |value: serde_json::Value| {
            let input: StudentInput =
                serde_json::from_value(serde_json::json!({"name": "A", "email": "a@x.com", "age": value}))
                    .unwrap();
            input.into_changes()
        };

        assert_eq!(parse(serde_json::json!(21)).unwrap().age, Some(21));
        assert_eq!(parse(serde_json::json!("21")).unwrap().age, Some(21));
        assert_eq!(parse(serde_json::json!(21.0)).unwrap().age, Some(21));
        assert_eq!(
            parse(serde_json::json!(21.5)).unwrap_err().to_string(),
            "age must be an integer"
        );
        assert_eq!(
            parse(serde_json::json!(1e12)).unwrap_err().to_string(),
            "age must be an integer"
        );
        assert_eq!(
            parse(serde_json::json!("twenty")).unwrap_err().to_string(),
            "age must be an integer"
        );
    }

    #[test]
    fn test_password_is_not_trimmed() {
        let input = RegisterInput {
            name: Some("Amy".to_string()),
            email: Some("a@x.com".to_string()),
            password: Some(" pw123 ".to_string()),
            ..Default::default()
        };
        let (_, password) = input.into_parts().unwrap();
        assert_eq!(password, " pw123 ");

        let err = LoginInput {
            email: Some("a@x.com".to_string()),
            password: Some(String::new()),
        }
        .into_parts()
        .unwrap_err();
        assert_eq!(err.to_string(), "missing required fields: password");
    }

    #[test]
    fn test_note_update_does_not_need_owner() {
        let input = NoteInput {
            title: Some("T1".to_string()),
            content: Some("C1".to_string()),
            student_id: None,
        };
        assert!(input.into_changes().is_ok());
    }
}
