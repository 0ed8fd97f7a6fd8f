// Mounted Secrets Configuration Module
//
// This module handles loading the optional mounted-secrets.yaml file and
// building typed configuration out of a scanned SecretStore.

use crate::store::{SecretStore, DEFAULT_SECRETS_DIR};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

/// Environment variable overriding the configured secrets directory.
pub const SECRETS_DIR_ENV: &str = "MOUNTED_SECRETS_DIR";

fn default_secrets_dir() -> String {
    DEFAULT_SECRETS_DIR.to_string()
}

/// Main configuration structure
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding one file per secret
    #[serde(default = "default_secrets_dir")]
    pub secrets_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            secrets_dir: default_secrets_dir(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;

        Ok(config)
    }

    /// Load configuration from `path` if given, otherwise use defaults.
    ///
    /// `$MOUNTED_SECRETS_DIR` takes precedence over the file.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Ok(dir) = std::env::var(SECRETS_DIR_ENV) {
            tracing::debug!(dir = %dir, "secrets directory overridden from environment");
            config.secrets_dir = dir;
        }

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.secrets_dir.trim().is_empty() {
            anyhow::bail!("Secrets directory cannot be empty");
        }

        Ok(())
    }

    /// Get the secrets directory with `~` expanded to the home directory
    pub fn secrets_dir_path(&self) -> Result<PathBuf> {
        match self.secrets_dir.strip_prefix('~') {
            Some(rest) => {
                let home = dirs::home_dir().context("Failed to determine home directory")?;
                Ok(home.join(rest.trim_start_matches(['/', '\\'])))
            }
            None => Ok(PathBuf::from(&self.secrets_dir)),
        }
    }
}

/// Database credentials read from mounted secrets.
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub user: String,
    pub password: String,
    pub host: String,
    pub name: String,
    pub disable_tls: bool,
}

impl DatabaseConfig {
    pub const NAME_SECRET: &'static str = "postgres_db";
    pub const USER_SECRET: &'static str = "postgres_user";
    pub const HOST_SECRET: &'static str = "postgres_host";
    pub const PASSWORD_SECRET: &'static str = "postgres_passwd";

    /// Read the database credentials from `store`.
    ///
    /// All four secrets must be mounted. TLS is required by default.
    pub fn from_secrets(store: &SecretStore) -> Result<Self> {
        let read = |name: &str| -> Result<String> {
            store
                .require(name)
                .map(str::to_string)
                .with_context(|| format!("Missing database secret in {}", store.dir().display()))
        };

        Ok(Self {
            name: read(Self::NAME_SECRET)?,
            user: read(Self::USER_SECRET)?,
            host: read(Self::HOST_SECRET)?,
            password: read(Self::PASSWORD_SECRET)?,
            disable_tls: false,
        })
    }

    /// Build a `postgres://` connection URL with credentials percent-encoded.
    pub fn connection_url(&self) -> Result<Url> {
        let mut url = Url::parse(&format!("postgres://{}/{}", self.host, self.name))
            .with_context(|| format!("Invalid database host or name: {}/{}", self.host, self.name))?;

        url.set_username(&self.user)
            .map_err(|_| anyhow::anyhow!("Cannot set database user on URL"))?;
        url.set_password(Some(&self.password))
            .map_err(|_| anyhow::anyhow!("Cannot set database password on URL"))?;

        let ssl_mode = if self.disable_tls { "disable" } else { "require" };
        url.query_pairs_mut()
            .append_pair("sslmode", ssl_mode)
            .append_pair("timezone", "utc");

        Ok(url)
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("user", &self.user)
            .field("password", &"********")
            .field("host", &self.host)
            .field("name", &self.name)
            .field("disable_tls", &self.disable_tls)
            .finish()
    }
}
