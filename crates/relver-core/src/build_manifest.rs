use regex::Regex;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use crate::error::VersionError;

static VERSION_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^version:[^\r\n]*").expect("version line pattern should compile")
});

/// A build-metadata file (for example `pubspec.yaml`) that declares the
/// product version on a top-level `version:` line.
pub struct BuildManifest {
    pub path: PathBuf,
    pub content: String,
}

impl BuildManifest {
    /// # Errors
    /// Fails with `NotFound` if `path` does not exist.
    pub fn load(path: &Path) -> Result<Self, VersionError> {
        if !path.is_file() {
            return Err(VersionError::not_found(path));
        }
        let content = std::fs::read_to_string(path)
            .map_err(|error| VersionError::io_with_path("failed to read", path, error))?;

        Ok(Self {
            path: path.to_path_buf(),
            content,
        })
    }

    #[must_use]
    pub fn declared_version(&self) -> Option<&str> {
        VERSION_LINE
            .find(&self.content)
            .map(|found| found.as_str().trim_start_matches("version:").trim())
    }

    /// Compute the edit that points the `version:` line at `full_version`.
    /// Every other line is left byte-for-byte unchanged.
    #[must_use]
    pub fn set_version(&self, full_version: &str) -> BuildManifestEdit {
        let replacement = format!("version: {full_version}");
        let mut changes = Vec::new();

        for found in VERSION_LINE.find_iter(&self.content) {
            if found.as_str() != replacement {
                changes.push(format!("{} -> {replacement}", found.as_str().trim_end()));
            }
        }

        let modified = if changes.is_empty() {
            self.content.clone()
        } else {
            VERSION_LINE
                .replace_all(&self.content, regex::NoExpand(&replacement))
                .into_owned()
        };

        BuildManifestEdit {
            original: self.content.clone(),
            modified,
            changes,
        }
    }

    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn apply_edit(&mut self, edit: &BuildManifestEdit) -> Result<(), VersionError> {
        if !edit.has_changes() {
            return Ok(());
        }
        relver_platform::write_atomic(&self.path, edit.modified.as_bytes())
            .map_err(|error| VersionError::io_with_path("failed to write", &self.path, error))?;
        self.content.clone_from(&edit.modified);
        Ok(())
    }
}

pub struct BuildManifestEdit {
    pub original: String,
    pub modified: String,
    pub changes: Vec<String>,
}

impl BuildManifestEdit {
    #[must_use]
    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    #[must_use]
    pub fn diff_preview(&self) -> String {
        if !self.has_changes() {
            return "No changes needed.".to_string();
        }

        let mut preview = String::new();
        for change in &self.changes {
            let _ = writeln!(preview, "~ {change}");
        }
        preview
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PUBSPEC: &str = "\
name: remote_cam_server
description: Camera server
version: 1.0.6+9
# version: commented lines stay
environment:
  sdk: '>=3.0.0 <4.0.0'
dependencies:
  version: any
";

    fn manifest(content: &str) -> BuildManifest {
        BuildManifest {
            path: PathBuf::from("/test/pubspec.yaml"),
            content: content.to_string(),
        }
    }

    #[test]
    fn declared_version_reads_top_level_line() {
        assert_eq!(manifest(PUBSPEC).declared_version(), Some("1.0.6+9"));
        assert_eq!(manifest("name: x\n").declared_version(), None);
    }

    #[test]
    fn set_version_rewrites_only_the_version_line() {
        let edit = manifest(PUBSPEC).set_version("1.0.7+10");

        assert!(edit.has_changes());
        assert_eq!(
            edit.modified,
            PUBSPEC.replace("version: 1.0.6+9", "version: 1.0.7+10")
        );
        assert!(edit.modified.contains("# version: commented lines stay"));
        assert!(edit.modified.contains("  version: any"));
    }

    #[test]
    fn set_version_preserves_crlf_endings() {
        let edit = manifest("name: app\r\nversion: 0.1.0\r\nflutter:\r\n").set_version("0.2.0+3");

        assert_eq!(edit.modified, "name: app\r\nversion: 0.2.0+3\r\nflutter:\r\n");
    }

    #[test]
    fn set_version_is_noop_when_current() {
        let edit = manifest("version: 1.0.7+10\n").set_version("1.0.7+10");

        assert!(!edit.has_changes());
        assert_eq!(edit.diff_preview(), "No changes needed.");
    }

    #[test]
    fn diff_preview_lists_changes() {
        let edit = manifest(PUBSPEC).set_version("2.0.0+1");

        assert_eq!(edit.diff_preview(), "~ version: 1.0.6+9 -> version: 2.0.0+1\n");
    }

    #[test]
    fn load_missing_file_is_not_found() {
        let temp = tempfile::tempdir().expect("tempdir should be created");

        assert!(matches!(
            BuildManifest::load(&temp.path().join("pubspec.yaml")),
            Err(VersionError::NotFound { .. })
        ));
    }
}
