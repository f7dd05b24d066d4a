use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the structured version store.
pub const STRUCTURED_VERSION_FILE: &str = "VERSION.yaml";
/// File name of the legacy `KEY=VALUE` version store.
pub const LEGACY_VERSION_FILE: &str = "VERSION";
/// Optional per-project settings file.
pub const SETTINGS_FILE: &str = ".relver.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AppPathsError {
    #[error("Could not determine home directory")]
    HomeDirUnavailable,
    #[error("Could not determine data directory")]
    DataDirUnavailable,
}

/// Per-user directories owned by the relver CLI.
pub struct AppPaths {
    pub data_dir: PathBuf,
}

impl AppPaths {
    /// Build application paths for the current platform.
    ///
    /// # Errors
    /// Returns an error when the user home or data directory cannot be
    /// determined.
    pub fn new() -> Result<Self, AppPathsError> {
        #[cfg(target_os = "macos")]
        {
            let home = dirs::home_dir().ok_or(AppPathsError::HomeDirUnavailable)?;
            Ok(Self {
                data_dir: home.join("Library/Application Support/relver"),
            })
        }

        #[cfg(not(target_os = "macos"))]
        {
            Ok(Self {
                data_dir: dirs::data_local_dir()
                    .ok_or(AppPathsError::DataDirUnavailable)?
                    .join("relver"),
            })
        }
    }

    #[must_use]
    pub fn log_file(&self) -> PathBuf {
        self.data_dir.join("relver.log")
    }

    /// Ensure the application data directory exists on disk.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.data_dir)
    }
}

/// Locations inside one product checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    pub root: PathBuf,
}

impl ProjectPaths {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Walk up from `start` to the first directory holding a version store.
    /// Falls back to `start` itself when no ancestor has one.
    #[must_use]
    pub fn discover(start: &Path) -> Self {
        let found = start.ancestors().find(|dir| {
            dir.join(STRUCTURED_VERSION_FILE).is_file() || dir.join(LEGACY_VERSION_FILE).is_file()
        });

        match found {
            Some(dir) => {
                log::debug!("Discovered project root at {}", dir.display());
                Self::new(dir)
            }
            None => Self::new(start),
        }
    }

    #[must_use]
    pub fn structured_version_file(&self) -> PathBuf {
        self.root.join(STRUCTURED_VERSION_FILE)
    }

    #[must_use]
    pub fn legacy_version_file(&self) -> PathBuf {
        self.root.join(LEGACY_VERSION_FILE)
    }

    #[must_use]
    pub fn settings_file(&self) -> PathBuf {
        self.root.join(SETTINGS_FILE)
    }

    /// Resolve a possibly relative path against the project root.
    #[must_use]
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::{AppPaths, ProjectPaths};

    #[test]
    fn file_paths_use_expected_filenames() {
        let project = ProjectPaths::new("/work/product");

        assert_eq!(
            project.structured_version_file(),
            Path::new("/work/product/VERSION.yaml")
        );
        assert_eq!(
            project.legacy_version_file(),
            Path::new("/work/product/VERSION")
        );
        assert_eq!(
            project.settings_file(),
            Path::new("/work/product/.relver.json")
        );
    }

    #[test]
    fn resolve_keeps_absolute_paths() {
        let project = ProjectPaths::new("/work/product");

        assert_eq!(
            project.resolve(Path::new("server/assets")),
            Path::new("/work/product/server/assets")
        );
        #[cfg(unix)]
        assert_eq!(
            project.resolve(Path::new("/elsewhere/assets")),
            Path::new("/elsewhere/assets")
        );
    }

    #[test]
    fn discover_walks_up_to_version_store() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        std::fs::write(temp.path().join("VERSION.yaml"), "client:\n  version: 1.0.0\n")
            .expect("version store should be written");
        let nested = temp.path().join("client").join("lib");
        std::fs::create_dir_all(&nested).expect("nested dirs should be created");

        let project = ProjectPaths::discover(&nested);

        assert_eq!(project.root, temp.path());
    }

    #[test]
    fn discover_finds_legacy_store() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        std::fs::write(temp.path().join("VERSION"), "CLIENT_VERSION=1.0.0\n")
            .expect("legacy store should be written");
        let nested = temp.path().join("scripts");
        std::fs::create_dir_all(&nested).expect("nested dir should be created");

        assert_eq!(ProjectPaths::discover(&nested).root, temp.path());
    }

    #[test]
    fn discover_falls_back_to_start_dir() {
        let temp = tempfile::tempdir().expect("tempdir should be created");

        assert_eq!(ProjectPaths::discover(temp.path()).root, temp.path());
    }

    #[test]
    fn log_file_lives_in_data_dir() {
        let paths = AppPaths {
            data_dir: Path::new("/data/relver").to_path_buf(),
        };

        assert!(paths.log_file().ends_with("relver.log"));
        assert!(paths.log_file().starts_with("/data/relver"));
    }
}
