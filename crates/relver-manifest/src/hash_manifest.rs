use log::{debug, info, warn};
use std::collections::{BTreeMap, HashSet};
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use crate::digest::sha256_file;
use crate::error::ManifestError;

/// `key -> 64-hex digest`, ordered by key.
pub type HashManifest = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyStyle {
    /// Path relative to the scanned root, `/`-separated.
    #[default]
    RelativePath,
    /// Bare file name; a later file with the same name replaces an earlier one.
    BaseName,
}

/// A file that was found but could not be digested.
#[derive(Debug)]
pub struct HashFailure {
    pub path: PathBuf,
    pub error: String,
}

#[derive(Debug)]
pub struct HashReport {
    pub manifest: HashManifest,
    pub skipped: Vec<HashFailure>,
    pub excluded: usize,
}

/// Digests every regular file below a root directory.
#[derive(Debug, Clone)]
pub struct HashManifestBuilder {
    root: PathBuf,
    excludes: Vec<PathBuf>,
    key_style: KeyStyle,
    digest: fn(&Path) -> Result<String, ManifestError>,
}

impl HashManifestBuilder {
    /// The running executable is always excluded.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let excludes = std::env::current_exe().into_iter().collect();
        Self {
            root: root.into(),
            excludes,
            key_style: KeyStyle::default(),
            digest: sha256_file,
        }
    }

    #[must_use]
    pub fn exclude(mut self, path: impl Into<PathBuf>) -> Self {
        self.excludes.push(path.into());
        self
    }

    #[must_use]
    pub fn excluding<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.excludes.extend(paths.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn key_style(mut self, key_style: KeyStyle) -> Self {
        self.key_style = key_style;
        self
    }

    #[cfg(test)]
    fn digest_with(mut self, digest: fn(&Path) -> Result<String, ManifestError>) -> Self {
        self.digest = digest;
        self
    }

    /// Walk the tree and digest every file that is not excluded.
    ///
    /// Files that cannot be read are logged and reported in
    /// [`HashReport::skipped`]; they do not abort the walk.
    ///
    /// # Errors
    /// Fails with `NotADirectory` when the root is not a directory, and with
    /// `NothingToHash` when the walk produced no digests at all.
    pub fn build(&self) -> Result<HashReport, ManifestError> {
        if !self.root.is_dir() {
            return Err(ManifestError::NotADirectory {
                path: self.root.clone(),
            });
        }

        let excluded_paths: HashSet<PathBuf> =
            self.excludes.iter().map(|path| resolve(path)).collect();
        let mut manifest = HashManifest::new();
        let mut skipped = Vec::new();
        let mut excluded = 0_usize;

        let walker = WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(error) => {
                    let path = error.path().map_or_else(|| self.root.clone(), Path::to_path_buf);
                    warn!("Skipping {}: {error}", path.display());
                    skipped.push(HashFailure {
                        path,
                        error: error.to_string(),
                    });
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if excluded_paths.contains(&resolve(path)) {
                debug!("Excluded {}", path.display());
                excluded += 1;
                continue;
            }

            let digest = match (self.digest)(path) {
                Ok(digest) => digest,
                Err(error) => {
                    warn!("Failed to hash {}: {error}", path.display());
                    skipped.push(HashFailure {
                        path: path.to_path_buf(),
                        error: error.to_string(),
                    });
                    continue;
                }
            };

            let key = match self.key_style {
                KeyStyle::RelativePath => relative_key(&self.root, path),
                KeyStyle::BaseName => entry.file_name().to_string_lossy().into_owned(),
            };
            debug!("{key} -> {digest}");

            if manifest.insert(key.clone(), digest).is_some() {
                warn!("Duplicate file name {key}; keeping {}", path.display());
            }
        }

        if manifest.is_empty() {
            return Err(ManifestError::NothingToHash {
                path: self.root.clone(),
            });
        }

        info!(
            "Hashed {} files under {} ({} skipped, {} excluded)",
            manifest.len(),
            self.root.display(),
            skipped.len(),
            excluded
        );
        Ok(HashReport {
            manifest,
            skipped,
            excluded,
        })
    }
}

/// Read a hash list written by [`HashManifestBuilder`] or an older tool.
///
/// # Errors
/// Fails with `NotFound` for a missing file and `Json` when the content is
/// not a flat string-to-string object.
pub fn load_hash_list(path: &Path) -> Result<HashManifest, ManifestError> {
    let text = std::fs::read_to_string(path).map_err(|error| {
        if error.kind() == std::io::ErrorKind::NotFound {
            ManifestError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            ManifestError::io_with_path("failed to read hash list", path, error)
        }
    })?;
    serde_json::from_str(&text)
        .map_err(|error| ManifestError::json_with_path("failed to parse hash list", path, error))
}

fn resolve(path: &Path) -> PathBuf {
    std::fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

fn relative_key(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
