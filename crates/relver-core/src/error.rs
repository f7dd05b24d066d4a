use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::types::{BumpKind, Target, VersionParseError};

#[derive(Debug, Error)]
pub enum VersionError {
    #[error("File not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Version store {} is corrupt: {details}", path.display())]
    Corrupt { path: PathBuf, details: String },

    #[error(transparent)]
    InvalidFormat(#[from] VersionParseError),

    #[error("No {key} recorded for {target}")]
    MissingVersion { target: Target, key: &'static str },

    #[error("Legacy VERSION file does not support {feature}; migrate to VERSION.yaml")]
    UnsupportedByLegacyFormat { feature: &'static str },

    #[error("Unknown bump kind: {0} (expected major, minor, patch, or build)")]
    UnknownBumpKind(String),

    #[error("Cannot bump {kind} of {version}: the component is already at its maximum")]
    BumpOverflow { version: String, kind: BumpKind },

    #[error("Unknown target: {0} (expected client or server)")]
    UnknownTarget(String),

    #[error("{context} {}: {source}", path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl VersionError {
    pub fn io_with_path(context: &'static str, path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            return Self::not_found(path);
        }
        Self::Io {
            context,
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn not_found(path: &Path) -> Self {
        Self::NotFound {
            path: path.to_path_buf(),
        }
    }

    pub fn corrupt(path: &Path, details: impl Into<String>) -> Self {
        Self::Corrupt {
            path: path.to_path_buf(),
            details: details.into(),
        }
    }

    pub(crate) fn missing_version(target: Target) -> Self {
        Self::MissingVersion {
            target,
            key: "version",
        }
    }

    pub(crate) fn missing_min_version(target: Target) -> Self {
        Self::MissingVersion {
            target,
            key: "minimum compatible version",
        }
    }
}
