//! Secret store backed by a directory of one-file-per-key secrets.
//!
//! Container orchestrators (Docker Swarm, Kubernetes, Compose) mount secrets
//! as a directory where every file name is the secret's name and the file
//! content is its value. [`SecretStore::scan`] reads such a directory once and
//! keeps an immutable snapshot in memory.
//!
//! # Directory Rules
//!
//! - A missing path, or a path that is not a readable directory, yields an
//!   empty store. This is the normal state for local development.
//! - Only regular files directly under the directory are loaded. Symlinks are
//!   followed, subdirectories, dangling symlinks and other entries are
//!   skipped. Kubernetes' `..data` bookkeeping links point at directories and
//!   fall under this rule.
//! - Values are trimmed of leading and trailing whitespace.
//! - Any read failure on a listed file aborts the whole scan.

use crate::error::{Result, SecretError};
use std::collections::HashMap;
use std::env::VarError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Conventional mount point for orchestrator-injected secrets.
pub const DEFAULT_SECRETS_DIR: &str = "/run/secrets";

/// Immutable snapshot of a secrets directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretStore {
    dir: PathBuf,
    secrets: HashMap<String, String>,
}

impl SecretStore {
    /// Create a store from an already materialized map.
    ///
    /// Mostly useful in tests. Production code should use [`SecretStore::scan`].
    pub fn new<P: Into<PathBuf>>(dir: P, secrets: HashMap<String, String>) -> Self {
        Self {
            dir: dir.into(),
            secrets,
        }
    }

    /// Scan `dir` and load every regular file in it as a secret.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A directory entry cannot be enumerated
    /// - A listed file cannot be read
    /// - A file's content is not valid UTF-8
    ///
    /// A missing directory is not an error.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use mounted_secrets::store::SecretStore;
    ///
    /// # fn main() -> Result<(), mounted_secrets::error::SecretError> {
    /// let store = SecretStore::scan("/run/secrets")?;
    /// let password = store.get("postgres_passwd");
    /// # Ok(())
    /// # }
    /// ```
    pub fn scan<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();

        if !dir.is_dir() {
            debug!(dir = %dir.display(), "secrets directory not present, no secrets loaded");
            return Ok(Self::new(dir, HashMap::new()));
        }

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "secrets directory is not readable, no secrets loaded");
                return Ok(Self::new(dir, HashMap::new()));
            }
        };

        let mut secrets = HashMap::new();

        for entry in entries {
            let entry = entry.map_err(|source| SecretError::ListDir {
                path: dir.to_path_buf(),
                source,
            })?;
            let path = entry.path();

            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(raw) => {
                    warn!(entry = ?raw, "skipping secret with non UTF-8 file name");
                    continue;
                }
            };

            // fs::metadata follows symlinks
            let metadata = match fs::metadata(&path) {
                Ok(metadata) => metadata,
                Err(e) if e.kind() == io::ErrorKind::NotFound && is_symlink(&path) => {
                    debug!(entry = %name, "skipping dangling symlink");
                    continue;
                }
                Err(source) => return Err(SecretError::Read { path, source }),
            };
            if !metadata.is_file() {
                debug!(entry = %name, "skipping non-regular entry");
                continue;
            }

            let value = read_secret(&path)?;
            secrets.insert(name, value);
        }

        info!(dir = %dir.display(), count = secrets.len(), "loaded mounted secrets");

        Ok(Self::new(dir, secrets))
    }

    /// Scan [`DEFAULT_SECRETS_DIR`].
    pub fn from_default_dir() -> Result<Self> {
        Self::scan(DEFAULT_SECRETS_DIR)
    }

    /// Get a secret value by name.
    ///
    /// # Returns
    ///
    /// - `Some(&str)` - The trimmed secret value, possibly empty
    /// - `None` - If no secret with that name was mounted
    pub fn get(&self, name: &str) -> Option<&str> {
        self.secrets.get(name).map(String::as_str)
    }

    /// Like [`SecretStore::get`], but an absent secret is an error.
    pub fn require(&self, name: &str) -> Result<&str> {
        self.get(name)
            .ok_or_else(|| SecretError::NotFound(name.to_string()))
    }

    /// Get all secrets as a read-only map.
    pub fn all(&self) -> &HashMap<String, String> {
        &self.secrets
    }

    /// Secret names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.secrets.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }

    /// The directory this store was scanned from.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Whether the environment variable `var` currently points into the
    /// secrets directory.
    ///
    /// # Errors
    ///
    /// - [`SecretError::UndefinedVariable`] if `var` is not set
    /// - [`SecretError::NotUnicode`] if its value is not valid Unicode
    pub fn is_secret(&self, var: &str) -> Result<bool> {
        match std::env::var(var) {
            Ok(value) => Ok(self.is_secret_value(&value)),
            Err(VarError::NotPresent) => Err(SecretError::UndefinedVariable(var.to_string())),
            Err(VarError::NotUnicode(_)) => Err(SecretError::NotUnicode(var.to_string())),
        }
    }

    /// Whether `value` contains the secrets directory path.
    pub fn is_secret_value(&self, value: &str) -> bool {
        let dir = self.dir.to_string_lossy();
        !dir.is_empty() && value.contains(dir.as_ref())
    }
}

fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false)
}

fn read_secret(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|source| SecretError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let content = String::from_utf8(bytes).map_err(|_| SecretError::InvalidUtf8 {
        path: path.to_path_buf(),
    })?;

    Ok(content.trim().to_string())
}
