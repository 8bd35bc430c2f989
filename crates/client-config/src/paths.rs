//! File system paths for the client.

use crate::{CoreError, CoreResult};
use std::path::PathBuf;

/// Config filename under the base directory.
const CONFIG_FILE_NAME: &str = "config.json";
/// Token storage filename under the base directory.
const TOKENS_FILE_NAME: &str = "tokens.json";

/// Manages file system paths for the client.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Base directory for client files (~/.screener)
    base_dir: PathBuf,
}

impl Paths {
    /// Create a new Paths instance rooted at `~/.screener`.
    pub fn new() -> CoreResult<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| CoreError::Path("Could not determine home directory".to_string()))?;

        Ok(Self {
            base_dir: home.join(".screener"),
        })
    }

    /// Create a new Paths instance with a custom base directory.
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory.
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the config file path (`<base>/config.json`).
    pub fn config_file(&self) -> PathBuf {
        self.base_dir.join(CONFIG_FILE_NAME)
    }

    /// Get the token storage file path (`<base>/tokens.json`).
    pub fn tokens_file(&self) -> PathBuf {
        self.base_dir.join(TOKENS_FILE_NAME)
    }

    /// Create the base directory if it does not exist.
    pub fn ensure_dirs(&self) -> CoreResult<()> {
        std::fs::create_dir_all(&self.base_dir)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_paths_with_base_dir() {
        let paths = Paths::with_base_dir(PathBuf::from("/tmp/screener-test"));
        assert_eq!(paths.base_dir(), &PathBuf::from("/tmp/screener-test"));
        assert_eq!(
            paths.config_file(),
            PathBuf::from("/tmp/screener-test/config.json")
        );
        assert_eq!(
            paths.tokens_file(),
            PathBuf::from("/tmp/screener-test/tokens.json")
        );
    }

    #[test]
    fn test_ensure_dirs_creates_base() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("nested").join("screener");
        let paths = Paths::with_base_dir(base.clone());

        assert!(!base.exists());
        paths.ensure_dirs().unwrap();
        assert!(base.exists());

        // Idempotent
        paths.ensure_dirs().unwrap();
    }
}
