//! # Settings — layered process configuration
//!
//! Values are resolved in this order, later layers winning:
//!
//! 1. compiled defaults ([`Settings::defaults`]),
//! 2. an optional `config.toml` in the working directory,
//! 3. `APP__<SECTION>__<KEY>` environment variables (e.g. `APP__AUTH__BCRYPT_COST=12`),
//! 4. the conventional variables `JWT_SECRET`, `DATABASE_URL` and `PORT`.
//!
//! A `.env` file is loaded with `dotenvy` before the environment is read.
//!
//! The token signing secret has no default. Loading fails when it is missing or
//! blank, so a deployment can never silently sign tokens with a well-known key.

use std::fmt;
use std::path::PathBuf;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

use crate::auth::{PasswordAlgorithm, MAX_BCRYPT_COST, MIN_BCRYPT_COST};

/// Secrets shorter than this still load; see [`Settings::has_weak_secret`].
const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

impl Server {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Database {
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: String,
    pub database: String,
    /// Full connection string. Takes precedence over the individual parts.
    #[serde(default)]
    pub url: Option<String>,
    pub max_connections: u32,
}

impl Database {
    pub fn url(&self) -> String {
        match &self.url {
            Some(url) => url.clone(),
            None => format!(
                "postgres://{}:{}@{}:{}/{}",
                self.user, self.password, self.host, self.port, self.database
            ),
        }
    }
}

/// Where records are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Postgres,
    Memory,
    File,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
    pub backend: Backend,
    /// Document used by the `file` backend.
    pub file_path: PathBuf,
}

#[derive(Clone, Deserialize)]
pub struct Auth {
    #[serde(default)]
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
    pub password_algorithm: PasswordAlgorithm,
    pub bcrypt_cost: u32,
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Auth")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("password_algorithm", &self.password_algorithm)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

/// Which operations of a resource require a bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessPolicy {
    /// Listing, fetching and creating are open; updating and deleting need a token.
    Public,
    /// Every operation needs a token.
    Guarded,
}

impl AccessPolicy {
    pub fn guards_reads(self) -> bool {
        self == AccessPolicy::Guarded
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Access {
    pub students: AccessPolicy,
    pub notes: AccessPolicy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Log {
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    pub filter: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub database: Database,
    pub storage: Storage,
    pub auth: Auth,
    pub access: Access,
    pub log: Log,
}

impl Settings {
    /// Load settings from `config.toml`, the environment and `.env`.
    pub fn new() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = Self::defaults()?
            .add_source(
                File::with_name("config.toml")
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .set_override_option("auth.jwt_secret", std::env::var("JWT_SECRET").ok())?
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("server.port", std::env::var("PORT").ok())?
            .build()?;

        Self::from_config(config)
    }

    /// Load settings from compiled defaults plus a TOML document, ignoring the environment.
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        let config = Self::defaults()?
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?;

        Self::from_config(config)
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("database.user", "students")?
            .set_default("database.password", "password")?
            .set_default("database.host", "localhost")?
            .set_default("database.port", "5432")?
            .set_default("database.database", "students")?
            .set_default("database.max_connections", 5)?
            .set_default("storage.backend", "postgres")?
            .set_default("storage.file_path", "data/students.json")?
            .set_default("auth.token_ttl_secs", 60 * 60 * 24)?
            .set_default("auth.password_algorithm", "bcrypt")?
            .set_default("auth.bcrypt_cost", 10)?
            .set_default("access.students", "public")?
            .set_default("access.notes", "guarded")?
            .set_default("log.filter", "info")
    }

    fn from_config(config: Config) -> Result<Self, ConfigError> {
        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// True when the signing secret is shorter than recommended.
    pub fn has_weak_secret(&self) -> bool {
        self.auth.jwt_secret.trim().len() < MIN_SECRET_LEN
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let secret = self.auth.jwt_secret.trim();
        if secret.is_empty() {
            return Err(ConfigError::Message(
                "auth.jwt_secret is not set (use JWT_SECRET or APP__AUTH__JWT_SECRET)".into(),
            ));
        }
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&self.auth.bcrypt_cost) {
            return Err(ConfigError::Message(format!(
                "auth.bcrypt_cost must be between {} and {}, got {}",
                MIN_BCRYPT_COST,
                MAX_BCRYPT_COST,
                self.auth.bcrypt_cost
            )));
        }
        if self.auth.token_ttl_secs <= 0 {
            return Err(ConfigError::Message(
                "auth.token_ttl_secs must be positive".into(),
            ));
        }
        Ok(())
    }
}
