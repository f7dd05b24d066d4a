use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use relver_core::{FullVersion, Target};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::backend::{Backend, RepoCoordinates};
use crate::digest::{is_valid_digest, sha256_file};
use crate::error::ManifestError;
use crate::hash_manifest::HashManifest;

const ARTIFACT_FILE_TYPE: &str = "zip";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    MacOs,
    Windows,
    Android,
}

impl Platform {
    pub const ALL: [Self; 3] = [Self::MacOs, Self::Windows, Self::Android];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MacOs => "macos",
            Self::Windows => "windows",
            Self::Android => "android",
        }
    }

    #[must_use]
    pub fn for_target(target: Target) -> &'static [Self] {
        match target {
            Target::Client => &[Self::MacOs, Self::Windows],
            Target::Server => &[Self::Android],
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformArtifact {
    pub version: String,
    pub version_number: String,
    pub download_url: String,
    pub file_name: String,
    pub file_type: String,
    pub platform: String,
    pub file_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetRelease {
    pub version: String,
    pub version_number: String,
    pub platforms: BTreeMap<String, PlatformArtifact>,
}

/// The document the applications' update checker downloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateManifest {
    pub client: TargetRelease,
    pub server: TargetRelease,
    pub update_check_url: String,
    pub last_updated: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub macos: PathBuf,
    pub windows: PathBuf,
    pub android: PathBuf,
}

impl ArtifactPaths {
    #[must_use]
    pub fn get(&self, platform: Platform) -> &Path {
        match platform {
            Platform::MacOs => &self.macos,
            Platform::Windows => &self.windows,
            Platform::Android => &self.android,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ManifestParams {
    pub client_version: String,
    pub server_version: String,
    pub artifacts: ArtifactPaths,
    pub tag: String,
    pub repo: RepoCoordinates,
    pub backend: Backend,
    pub base_url: Option<String>,
    pub update_check_url: Option<String>,
    pub hash_list: Option<HashManifest>,
}

/// Where an artifact's digest came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HashSource {
    /// Taken from the supplied hash list under this key.
    HashList(String),
    /// Computed from the artifact's bytes.
    Computed,
}

pub struct UpdateManifestBuilder {
    params: ManifestParams,
    generated_at: Option<DateTime<Utc>>,
}

impl UpdateManifestBuilder {
    #[must_use]
    pub fn new(params: ManifestParams) -> Self {
        Self {
            params,
            generated_at: None,
        }
    }

    /// Pin `lastUpdated` instead of reading the clock at build time.
    #[must_use]
    pub fn generated_at(mut self, instant: DateTime<Utc>) -> Self {
        self.generated_at = Some(instant);
        self
    }

    /// Assemble the manifest.
    ///
    /// All three artifacts are checked for existence before any hashing
    /// starts.
    ///
    /// # Errors
    /// Fails with `InvalidVersion` for a malformed version string,
    /// `ArtifactNotFound` for a missing artifact, and `Io` when an artifact
    /// that must be hashed cannot be read.
    pub fn build(&self) -> Result<UpdateManifest, ManifestError> {
        let params = &self.params;
        let client = FullVersion::parse_lenient(&params.client_version)?;
        let server = FullVersion::parse_lenient(&params.server_version)?;

        for platform in Platform::ALL {
            let path = params.artifacts.get(platform);
            if !path.is_file() {
                return Err(ManifestError::ArtifactNotFound {
                    platform,
                    path: path.to_path_buf(),
                });
            }
        }

        let base_url = params.base_url.as_deref().map_or_else(
            || {
                params
                    .backend
                    .release_download_base(&params.repo, &params.tag)
            },
            |url| url.trim_end_matches('/').to_string(),
        );
        let update_check_url = params
            .update_check_url
            .clone()
            .unwrap_or_else(|| params.backend.update_check_url(&params.repo));

        let client_release =
            self.target_release(Target::Client, &params.client_version, &client, &base_url)?;
        let server_release =
            self.target_release(Target::Server, &params.server_version, &server, &base_url)?;

        let instant = self.generated_at.unwrap_or_else(Utc::now);
        info!(
            "Built {} manifest for client {} / server {}",
            params.backend, params.client_version, params.server_version
        );

        Ok(UpdateManifest {
            client: client_release,
            server: server_release,
            update_check_url,
            last_updated: instant.format(TIMESTAMP_FORMAT).to_string(),
        })
    }

    fn target_release(
        &self,
        target: Target,
        version: &str,
        parsed: &FullVersion,
        base_url: &str,
    ) -> Result<TargetRelease, ManifestError> {
        let version_number = parsed.version_number();
        let mut platforms = BTreeMap::new();

        for &platform in Platform::for_target(target) {
            let path = self.params.artifacts.get(platform);
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            let (file_hash, source) =
                resolve_hash(path, &file_name, self.params.hash_list.as_ref())?;
            debug!("{platform} hash {file_hash} ({source:?})");

            platforms.insert(
                platform.as_str().to_string(),
                PlatformArtifact {
                    version: version.to_string(),
                    version_number: version_number.clone(),
                    download_url: format!("{base_url}/{file_name}"),
                    file_name,
                    file_type: ARTIFACT_FILE_TYPE.to_string(),
                    platform: platform.as_str().to_string(),
                    file_hash,
                },
            );
        }

        Ok(TargetRelease {
            version: version.to_string(),
            version_number,
            platforms,
        })
    }
}

/// Exact path key first, then bare file name, then a fresh digest.
fn resolve_hash(
    path: &Path,
    file_name: &str,
    hash_list: Option<&HashManifest>,
) -> Result<(String, HashSource), ManifestError> {
    if let Some(hash_list) = hash_list {
        let as_given = path.to_string_lossy();
        let candidates = [
            as_given.to_string(),
            as_given.replace('\\', "/"),
            file_name.to_string(),
        ];

        for key in candidates {
            let Some(digest) = hash_list.get(&key) else {
                continue;
            };
            if is_valid_digest(digest) {
                info!("Using listed hash for {file_name} ({key})");
                return Ok((digest.to_ascii_lowercase(), HashSource::HashList(key)));
            }
            warn!("Ignoring malformed hash list entry {key}: {digest}");
        }
    }

    info!("Computing hash for {file_name}: {}", path.display());
    Ok((sha256_file(path)?, HashSource::Computed))
}
