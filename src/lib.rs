//! Mounted Secrets - runtime secrets from an orchestrator-mounted directory.
//!
//! This library reads a directory of one-file-per-key secrets (such as
//! `/run/secrets`) once at startup and tells configuration code whether an
//! environment variable holds a literal value or a path into that mount.

pub mod config;
pub mod error;
pub mod resolver;
pub mod store;

pub use error::SecretError;
pub use resolver::Resolver;
pub use store::{SecretStore, DEFAULT_SECRETS_DIR};
