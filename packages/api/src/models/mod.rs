//! Request payloads and response projections.

mod input;
mod student;

pub use input::{IntInput, LoginInput, NoteInput, RegisterInput, StudentInput};
pub use student::{LoginStudent, StudentInfo};
