use log::{info, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::build_manifest::{BuildManifest, BuildManifestEdit};
use crate::error::VersionError;
use crate::store::VersionStore;
use crate::types::{
    BumpKind, FullVersion, Target, parse_min_version, parse_version, validate_version,
};

/// Version details in the shape release pipelines consume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseInfo {
    pub version: String,
    pub build_number: String,
    pub full_version: String,
    pub tag_version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetSummary {
    pub version: String,
    pub version_part: String,
    pub build_number: String,
    pub full_version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Compatibility {
    pub min_client_version: String,
    pub min_server_version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionSummary {
    pub client: TargetSummary,
    pub server: TargetSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compatibility: Option<Compatibility>,
}

/// Semantic operations over a [`VersionStore`].
///
/// Each mutating call loads the whole document, changes it in memory and
/// saves it back. Callers serialize invocations against one store.
pub struct VersionManager {
    store: VersionStore,
}

impl VersionManager {
    #[must_use]
    pub fn new(store: VersionStore) -> Self {
        Self { store }
    }

    #[must_use]
    pub fn store(&self) -> &VersionStore {
        &self.store
    }

    /// # Errors
    /// Fails when the store cannot be loaded or has no version for `target`.
    pub fn get_version(&self, target: Target) -> Result<String, VersionError> {
        self.store
            .load()?
            .version(target)
            .ok_or_else(|| VersionError::missing_version(target))
    }

    /// Store `version` verbatim after checking it against `x.y.z[+build]`.
    ///
    /// # Errors
    /// Fails with `InvalidFormat` before touching the store, or when the store
    /// cannot be loaded or saved.
    pub fn set_version(&self, target: Target, version: &str) -> Result<(), VersionError> {
        validate_version(version)?;

        let mut document = self.store.load()?;
        document.set_version(target, version);
        self.store.save(&document)?;
        info!("Set {target} version to {version}");
        Ok(())
    }

    /// Apply one bump to `target` and persist it. Returns the new full
    /// version string.
    ///
    /// # Errors
    /// Fails when the current version is missing or malformed, with
    /// `BumpOverflow` when the bumped component cannot grow, or when the store
    /// cannot be saved.
    pub fn bump_version(&self, target: Target, kind: BumpKind) -> Result<String, VersionError> {
        let current = self.get_version(target)?;
        let bumped = FullVersion::parse_lenient(&current)?.bumped(kind)?.to_string();

        self.set_version(target, &bumped)?;
        info!("Bumped {target} {kind}: {current} -> {bumped}");
        Ok(bumped)
    }

    /// # Errors
    /// Fails with `UnsupportedByLegacyFormat` on a legacy store and
    /// `MissingVersion` when no minimum is recorded.
    pub fn get_min_version(&self, target: Target) -> Result<String, VersionError> {
        self.store
            .load()?
            .min_version(target)?
            .ok_or_else(|| VersionError::missing_min_version(target))
    }

    /// # Errors
    /// Fails with `InvalidFormat` unless `version` is a bare `x.y.z`, and with
    /// `UnsupportedByLegacyFormat` on a legacy store.
    pub fn set_min_version(&self, target: Target, version: &str) -> Result<(), VersionError> {
        let minimum = parse_min_version(version)?;

        let mut document = self.store.load()?;
        document.set_min_version(target, version)?;

        if let Some(current) = document
            .version(target)
            .and_then(|current| FullVersion::parse_lenient(&current).ok())
            && minimum.to_semver() > current.version.to_semver()
        {
            warn!(
                "Minimum {target} version {minimum} is newer than the current {target} version {current}"
            );
        }

        self.store.save(&document)?;
        info!("Set minimum {target} version to {version}");
        Ok(())
    }

    /// Point the `version:` line of a build-metadata file at the current full
    /// version of `target`.
    ///
    /// # Errors
    /// Fails with `NotFound` if `path` does not exist, or when the current
    /// version cannot be read.
    pub fn sync_to_build_manifest(
        &self,
        target: Target,
        path: &Path,
    ) -> Result<BuildManifestEdit, VersionError> {
        let info = self.release_info(target)?;
        let mut manifest = BuildManifest::load(path)?;

        let previous = manifest.declared_version().map(str::to_string);
        let edit = manifest.set_version(&info.full_version);
        manifest.apply_edit(&edit)?;
        if edit.has_changes() {
            info!(
                "Synced {target} version {} -> {} in {}",
                previous.as_deref().unwrap_or("(none)"),
                info.full_version,
                path.display()
            );
        } else {
            info!("{} already declares {}", path.display(), info.full_version);
        }
        Ok(edit)
    }

    /// Copy the authoritative store file into `assets_dir`, replacing any
    /// previous copy. Returns the destination path.
    ///
    /// # Errors
    /// Fails when no store exists or the copy fails.
    pub fn copy_to_assets(&self, assets_dir: &Path) -> Result<PathBuf, VersionError> {
        let source = self.store.active_path()?;
        let file_name = source
            .file_name()
            .ok_or_else(|| VersionError::not_found(source))?;

        std::fs::create_dir_all(assets_dir).map_err(|error| {
            VersionError::io_with_path("failed to create assets directory", assets_dir, error)
        })?;
        let destination = assets_dir.join(file_name);
        let bytes = std::fs::read(source)
            .map_err(|error| VersionError::io_with_path("failed to read", source, error))?;
        relver_platform::write_atomic(&destination, &bytes)
            .map_err(|error| VersionError::io_with_path("failed to write", &destination, error))?;

        info!("Copied {} to {}", source.display(), destination.display());
        Ok(destination)
    }

    /// # Errors
    /// Fails when the version of `target` is missing or malformed.
    pub fn release_info(&self, target: Target) -> Result<ReleaseInfo, VersionError> {
        let (version, build_number) = parse_version(&self.get_version(target)?)?;
        Ok(ReleaseInfo {
            full_version: format!("{version}+{build_number}"),
            tag_version: format!("v{version}"),
            version,
            build_number,
        })
    }

    /// Both targets plus the compatibility section when it is readable.
    ///
    /// # Errors
    /// Fails when either target's version is missing or malformed.
    pub fn summary(&self) -> Result<VersionSummary, VersionError> {
        let compatibility = match (
            self.get_min_version(Target::Client),
            self.get_min_version(Target::Server),
        ) {
            (Ok(min_client_version), Ok(min_server_version)) => Some(Compatibility {
                min_client_version,
                min_server_version,
            }),
            _ => None,
        };

        Ok(VersionSummary {
            client: self.target_summary(Target::Client)?,
            server: self.target_summary(Target::Server)?,
            compatibility,
        })
    }

    fn target_summary(&self, target: Target) -> Result<TargetSummary, VersionError> {
        let version = self.get_version(target)?;
        let (version_part, build_number) = parse_version(&version)?;
        Ok(TargetSummary {
            full_version: format!("{version_part}+{build_number}"),
            version,
            version_part,
            build_number,
        })
    }
}
