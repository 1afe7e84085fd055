use std::path::{Path, PathBuf};

/// Default data directory (relative to current working directory)
pub const DEFAULT_DATA_DIR: &str = "./data";

/// Subdirectory paths relative to the data directory
pub const LOGS_DIR: &str = "logs";

/// Settings file name inside the data directory
pub const CONFIG_FILE: &str = "config.yaml";

/// Helper struct to manage data paths
#[derive(Clone, Debug)]
pub struct DataPaths {
    root: PathBuf,
}

impl DataPaths {
    /// Create a new DataPaths instance with the given root directory
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Per-user data directory for this application, falling back to the
    /// working-directory default when the platform offers none
    pub fn user_default() -> Self {
        match directories::ProjectDirs::from("com", "vaultledger", "vaultledger") {
            Some(dirs) => Self::new(dirs.data_dir()),
            None => Self::new(DEFAULT_DATA_DIR),
        }
    }

    /// Get the root data directory
    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    /// Get the path of the persisted ledger document
    pub fn ledger_file(&self) -> PathBuf {
        self.root.join(crate::ledger::storage::LEDGER_FILE)
    }

    /// Get the path of the settings file
    pub fn config_file(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    /// Get the logs directory
    pub fn logs(&self) -> PathBuf {
        self.root.join(LOGS_DIR)
    }

    /// Ensure all directories exist
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.root)?;
        std::fs::create_dir_all(self.logs())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_are_under_root() {
        let paths = DataPaths::new("/tmp/ledger-test");
        assert_eq!(paths.root(), &PathBuf::from("/tmp/ledger-test"));
        assert!(paths.ledger_file().starts_with(paths.root()));
        assert!(paths.config_file().starts_with(paths.root()));
        assert!(paths.logs().starts_with(paths.root()));
    }

    #[test]
    fn test_ensure_directories() {
        let dir = tempfile::tempdir().unwrap();
        let paths = DataPaths::new(dir.path().join("data"));
        paths.ensure_directories().unwrap();
        assert!(paths.logs().is_dir());
    }
}
