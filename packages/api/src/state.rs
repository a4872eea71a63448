//! Shared handler state.

use std::sync::Arc;

use store::{Note, RecordStore, Student};
use tokio::sync::OnceCell;

use crate::auth::{CredentialHasher, TokenService};
use crate::service::RecordService;
use crate::settings::{Access, Settings};

/// A store holding every record type the API serves.
pub trait Store: RecordStore<Student> + RecordStore<Note> {}

impl<S> Store for S where S: RecordStore<Student> + RecordStore<Note> {}

/// Cloned into every request. Nothing in it is mutated after startup.
#[derive(Clone)]
pub struct AppState<S> {
    pub store: S,
    pub tokens: Arc<TokenService>,
    pub hasher: CredentialHasher,
    pub access: Access,
    /// Hash checked on logins that have no stored hash, filled on first use.
    pub(crate) decoy_hash: Arc<OnceCell<String>>,
}

impl<S: Store> AppState<S> {
    pub fn new(store: S, settings: &Settings) -> Self {
        Self {
            store,
            tokens: Arc::new(TokenService::new(
                &settings.auth.jwt_secret,
                settings.auth.token_ttl_secs,
            )),
            hasher: CredentialHasher::new(
                settings.auth.password_algorithm,
                settings.auth.bcrypt_cost,
            ),
            access: settings.access,
            decoy_hash: Arc::new(OnceCell::new()),
        }
    }

    pub fn students(&self) -> RecordService<Student, S> {
        RecordService::new(self.store.clone())
    }

    pub fn notes(&self) -> RecordService<Note, S> {
        RecordService::new(self.store.clone())
    }
}
