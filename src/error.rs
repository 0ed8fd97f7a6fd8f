//! Error types for secret loading and lookup.

use std::path::PathBuf;

/// Errors produced by [`crate::store::SecretStore`] and [`crate::resolver::Resolver`].
#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    /// The secrets directory exists but could not be listed.
    #[error("failed to list secrets directory {path:?}")]
    ListDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A listed secret file could not be read.
    #[error("failed to read secret file {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A secret file does not hold UTF-8 text.
    #[error("secret file {path:?} is not valid UTF-8")]
    InvalidUtf8 { path: PathBuf },

    /// A required secret was not mounted at scan time.
    #[error("secret {0:?} was not found in the store")]
    NotFound(String),

    /// The environment variable queried by a provenance check is not set.
    #[error("environment variable {0:?} is not set")]
    UndefinedVariable(String),

    /// The environment variable is set but its value is not valid Unicode.
    #[error("environment variable {0:?} does not hold valid Unicode")]
    NotUnicode(String),

    /// An environment variable points into the secrets directory at a
    /// secret that was not present when the directory was scanned.
    #[error("environment variable {var:?} references secret {secret:?}, which is not mounted")]
    DanglingReference { var: String, secret: String },
}

pub type Result<T> = std::result::Result<T, SecretError>;
