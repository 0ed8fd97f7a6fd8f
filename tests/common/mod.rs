//! Common testing utilities for Mounted Secrets integration tests.

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

/// Test context that manages a temporary secrets directory.
pub struct TestContext {
    /// Path to temporary directory
    pub temp_path: PathBuf,
    /// The temporary directory (kept to prevent early deletion)
    _temp_dir: TempDir,
}

impl TestContext {
    /// Create a new test context with a temporary directory.
    pub fn new() -> anyhow::Result<Self> {
        let temp_dir = TempDir::new()?;
        let temp_path = temp_dir.path().to_path_buf();

        Ok(Self {
            temp_path,
            _temp_dir: temp_dir,
        })
    }

    /// Create a secret file with raw content.
    pub fn create_secret(&self, name: &str, content: &str) -> anyhow::Result<PathBuf> {
        let file_path = self.temp_path.join(name);
        let mut file = fs::File::create(&file_path)?;
        file.write_all(content.as_bytes())?;
        Ok(file_path)
    }

    /// Create one secret file per `(name, content)` pair.
    #[allow(dead_code)]
    pub fn create_secrets(
        &self,
        secrets: &[(impl AsRef<str>, impl AsRef<str>)],
    ) -> anyhow::Result<()> {
        for (name, content) in secrets {
            self.create_secret(name.as_ref(), content.as_ref())?;
        }
        Ok(())
    }

    /// Create a subdirectory inside the secrets directory.
    #[allow(dead_code)]
    pub fn create_dir(&self, name: &str) -> anyhow::Result<PathBuf> {
        let dir_path = self.temp_path.join(name);
        fs::create_dir_all(&dir_path)?;
        Ok(dir_path)
    }

    /// Get the path to a file in the temp directory.
    #[allow(dead_code)]
    pub fn path(&self, name: &str) -> PathBuf {
        self.temp_path.join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_test_context_create_secret() {
        let ctx = TestContext::new().unwrap();
        let file_path = ctx.create_secret("token", "abc\n").unwrap();

        assert!(file_path.exists());
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "abc\n");
    }
}
