use log::debug;
use relver_platform::{ProjectPaths, write_atomic};
use std::path::{Path, PathBuf};

use crate::document::{Document, DocumentFormat, LegacyDocument, StructuredDocument};
use crate::error::VersionError;

/// Durable home of the version record.
///
/// Two files may exist side by side; the structured one is authoritative
/// whenever it is present. Every operation reads the whole document and
/// writes the whole document back.
#[derive(Debug, Clone)]
pub struct VersionStore {
    structured_path: PathBuf,
    legacy_path: PathBuf,
}

impl VersionStore {
    #[must_use]
    pub fn new(structured_path: impl Into<PathBuf>, legacy_path: impl Into<PathBuf>) -> Self {
        Self {
            structured_path: structured_path.into(),
            legacy_path: legacy_path.into(),
        }
    }

    #[must_use]
    pub fn for_project(paths: &ProjectPaths) -> Self {
        Self::new(paths.structured_version_file(), paths.legacy_version_file())
    }

    /// Which representation is authoritative right now.
    ///
    /// # Errors
    /// Fails with `NotFound` when neither file exists.
    pub fn format(&self) -> Result<DocumentFormat, VersionError> {
        if self.structured_path.is_file() {
            Ok(DocumentFormat::Structured)
        } else if self.legacy_path.is_file() {
            Ok(DocumentFormat::Legacy)
        } else {
            Err(VersionError::not_found(&self.structured_path))
        }
    }

    /// Path of the authoritative file.
    ///
    /// # Errors
    /// Fails with `NotFound` when neither file exists.
    pub fn active_path(&self) -> Result<&Path, VersionError> {
        Ok(self.path_for(self.format()?))
    }

    fn path_for(&self, format: DocumentFormat) -> &Path {
        match format {
            DocumentFormat::Structured => &self.structured_path,
            DocumentFormat::Legacy => &self.legacy_path,
        }
    }

    /// Read the authoritative document.
    ///
    /// # Errors
    /// Fails with `NotFound` when neither file exists, `Corrupt` when the
    /// structured file cannot be parsed, and `Io` on read failures.
    pub fn load(&self) -> Result<Document, VersionError> {
        let format = self.format()?;
        let path = self.path_for(format);
        debug!("Loading {} version store from {}", format.as_str(), path.display());

        let text = std::fs::read_to_string(path)
            .map_err(|error| VersionError::io_with_path("failed to read", path, error))?;

        match format {
            DocumentFormat::Structured => StructuredDocument::parse(&text)
                .map(Document::Structured)
                .map_err(|details| VersionError::corrupt(path, details)),
            DocumentFormat::Legacy => Ok(Document::Legacy(LegacyDocument::parse(&text))),
        }
    }

    /// Replace the file backing `document` as a whole.
    ///
    /// # Errors
    /// Returns an error when serialization or the atomic write fails; the
    /// previous file is left intact in that case.
    pub fn save(&self, document: &Document) -> Result<(), VersionError> {
        let path = self.path_for(document.format());
        let contents = match document {
            Document::Structured(doc) => doc
                .to_yaml()
                .map_err(|error| VersionError::corrupt(path, error.to_string()))?,
            Document::Legacy(doc) => doc.as_str().to_string(),
        };

        write_atomic(path, contents.as_bytes())
            .map_err(|error| VersionError::io_with_path("failed to write", path, error))?;
        debug!("Saved version store to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::VersionStore;
    use crate::document::{Document, DocumentFormat};
    use crate::error::VersionError;
    use crate::types::Target;

    fn store_in(dir: &std::path::Path) -> VersionStore {
        VersionStore::new(dir.join("VERSION.yaml"), dir.join("VERSION"))
    }

    #[test]
    fn load_fails_when_no_store_exists() {
        let temp = tempfile::tempdir().expect("tempdir should be created");

        assert!(matches!(
            store_in(temp.path()).load(),
            Err(VersionError::NotFound { .. })
        ));
    }

    #[test]
    fn structured_wins_when_both_exist() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        std::fs::write(temp.path().join("VERSION.yaml"), "client:\n  version: 2.0.0+5\n")
            .expect("structured store should be written");
        std::fs::write(temp.path().join("VERSION"), "CLIENT_VERSION=1.0.0+1\n")
            .expect("legacy store should be written");

        let store = store_in(temp.path());
        let doc = store.load().expect("store should load");

        assert_eq!(doc.format(), DocumentFormat::Structured);
        assert_eq!(doc.version(Target::Client).as_deref(), Some("2.0.0+5"));
        assert_eq!(
            store.active_path().expect("active path"),
            temp.path().join("VERSION.yaml")
        );
    }

    #[test]
    fn corrupt_structured_store_is_reported() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        std::fs::write(temp.path().join("VERSION.yaml"), "client: [1, 2\n")
            .expect("broken store should be written");

        assert!(matches!(
            store_in(temp.path()).load(),
            Err(VersionError::Corrupt { .. })
        ));
    }

    #[test]
    fn save_round_trips_legacy_text() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        std::fs::write(temp.path().join("VERSION"), "# keep\nCLIENT_VERSION=1.0.0+1\n")
            .expect("legacy store should be written");

        let store = store_in(temp.path());
        let mut doc = store.load().expect("store should load");
        doc.set_version(Target::Client, "1.0.1+1");
        store.save(&doc).expect("store should save");

        let text = std::fs::read_to_string(temp.path().join("VERSION"))
            .expect("legacy store should be readable");
        assert_eq!(text, "# keep\nCLIENT_VERSION=1.0.1+1\n");
        assert!(!temp.path().join("VERSION.yaml").exists());
        assert!(matches!(store.load(), Ok(Document::Legacy(_))));
    }
}
