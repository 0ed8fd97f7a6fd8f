//! Environment-variable resolution through the secrets mount.
//!
//! A configuration variable either holds a literal value
//! (`DATABASE_URL=postgres://...`) or a path into the secrets directory
//! (`DATABASE_URL=/run/secrets/db_url`). [`Resolver`] returns the effective
//! value in both cases.

use crate::error::{Result, SecretError};
use crate::store::SecretStore;
use std::env::VarError;
use std::path::{Component, Path};

/// Resolves environment variables against a [`SecretStore`].
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    store: &'a SecretStore,
}

impl<'a> Resolver<'a> {
    pub fn new(store: &'a SecretStore) -> Self {
        Self { store }
    }

    /// Resolve the environment variable `var`.
    ///
    /// # Returns
    ///
    /// - `Ok(None)` - `var` is not set
    /// - `Ok(Some(value))` - the mounted secret `var` points at, or its
    ///   literal value when it does not point into the secrets directory
    ///
    /// # Errors
    ///
    /// - [`SecretError::DanglingReference`] if `var` points at a secret that
    ///   was not mounted at scan time
    /// - [`SecretError::NotUnicode`] if the value is not valid Unicode
    pub fn resolve(&self, var: &str) -> Result<Option<String>> {
        let value = match std::env::var(var) {
            Ok(value) => value,
            Err(VarError::NotPresent) => return Ok(None),
            Err(VarError::NotUnicode(_)) => return Err(SecretError::NotUnicode(var.to_string())),
        };

        self.resolve_value(var, &value).map(Some)
    }

    /// Resolve `var`, falling back to `default` when it is not set.
    pub fn resolve_or(&self, var: &str, default: &str) -> Result<String> {
        Ok(self.resolve(var)?.unwrap_or_else(|| default.to_string()))
    }

    /// Resolve an already-read `value` of the variable `var`.
    ///
    /// Only a path naming a file directly under the secrets directory is
    /// looked up. Values that merely mention the directory (a sibling such
    /// as `/run/secrets-staging/x`, a URL) pass through unchanged.
    pub fn resolve_value(&self, var: &str, value: &str) -> Result<String> {
        if !self.store.is_secret_value(value) {
            return Ok(value.to_string());
        }

        let relative = match Path::new(value.trim()).strip_prefix(self.store.dir()) {
            Ok(relative) => relative,
            Err(_) => return Ok(value.to_string()),
        };

        let mut components = relative.components();
        let secret = match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) => name.to_str(),
            _ => None,
        };

        secret
            .and_then(|secret| self.store.get(secret))
            .map(str::to_string)
            .ok_or_else(|| SecretError::DanglingReference {
                var: var.to_string(),
                secret: relative.to_string_lossy().into_owned(),
            })
    }
}
