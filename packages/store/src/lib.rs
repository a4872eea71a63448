pub mod error;
pub mod models;
pub mod repo;

mod file_store;
mod memory;
mod tables;

pub use file_store::FileStore;
pub use memory::MemoryStore;

pub use error::{StoreError, StoreResult};
pub use models::{NewNote, NewStudent, Note, NoteChanges, Student, StudentChanges};
pub use repo::{Record, RecordStore};
