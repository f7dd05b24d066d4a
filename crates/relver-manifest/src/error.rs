use relver_core::VersionParseError;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::update_manifest::Platform;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Not a directory: {}", path.display())]
    NotADirectory { path: PathBuf },

    #[error("No files could be hashed under {}", path.display())]
    NothingToHash { path: PathBuf },

    #[error("{platform} artifact not found: {}", path.display())]
    ArtifactNotFound { platform: Platform, path: PathBuf },

    #[error("File not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error(transparent)]
    InvalidVersion(#[from] VersionParseError),

    #[error("Invalid manifest document: {0}")]
    InvalidManifest(String),

    #[error("{context} {}: {source}", path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{context} {}: {source}", path.display())]
    Json {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Written file {} is not valid JSON: {source}", path.display())]
    OutputVerification {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ManifestError {
    pub fn io_with_path(context: &'static str, path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            context,
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn json_with_path(context: &'static str, path: &Path, source: serde_json::Error) -> Self {
        Self::Json {
            context,
            path: path.to_path_buf(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::ManifestError;
    use crate::update_manifest::Platform;

    #[test]
    fn artifact_not_found_names_platform() {
        let error = ManifestError::ArtifactNotFound {
            platform: Platform::Windows,
            path: PathBuf::from("artifacts/app_windows.zip"),
        };
        assert_eq!(
            error.to_string(),
            "windows artifact not found: artifacts/app_windows.zip"
        );
    }

    #[test]
    fn io_helper_keeps_context_and_path() {
        let error = ManifestError::io_with_path(
            "failed to read file for hashing",
            Path::new("locked.bin"),
            std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        );
        assert!(
            error
                .to_string()
                .starts_with("failed to read file for hashing locked.bin: ")
        );
    }
}
