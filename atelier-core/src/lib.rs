//! atelier-core: models, configuration, and the local credential store
//! shared by the atelier server and CLI.

pub mod config;
pub mod credentials;
pub mod error;
pub mod models;

pub use config::{DatabaseUrls, PublicConfig, RuntimeEnv, Schema};
pub use credentials::{CachedUser, CredentialStore, StoredCredentials};
pub use error::{AtelierError, Result};
