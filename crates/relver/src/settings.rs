use relver_manifest::Backend;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Per-project defaults read from `.relver.json` at the project root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseSettings {
    #[serde(default)]
    pub repo_owner: Option<String>,

    #[serde(default)]
    pub repo_name: Option<String>,

    #[serde(default)]
    pub gitee_repo_owner: Option<String>,

    #[serde(default)]
    pub gitee_repo_name: Option<String>,

    #[serde(default)]
    pub backend: Backend,

    #[serde(default = "default_assets_dir")]
    pub assets_dir: PathBuf,

    #[serde(default = "default_client_build_manifest")]
    pub client_build_manifest: PathBuf,

    #[serde(default = "default_server_build_manifest")]
    pub server_build_manifest: PathBuf,

    #[serde(default)]
    pub debug_logging: bool,

    #[serde(default)]
    pub log_file: Option<PathBuf>,

    #[serde(default = "default_max_log_size_bytes")]
    pub max_log_size_bytes: u64,
}

fn default_assets_dir() -> PathBuf {
    PathBuf::from("server/assets")
}

fn default_client_build_manifest() -> PathBuf {
    PathBuf::from("client/pubspec.yaml")
}

fn default_server_build_manifest() -> PathBuf {
    PathBuf::from("server/pubspec.yaml")
}

fn default_max_log_size_bytes() -> u64 {
    5 * 1024 * 1024
}

impl Default for ReleaseSettings {
    fn default() -> Self {
        Self {
            repo_owner: None,
            repo_name: None,
            gitee_repo_owner: None,
            gitee_repo_name: None,
            backend: Backend::default(),
            assets_dir: default_assets_dir(),
            client_build_manifest: default_client_build_manifest(),
            server_build_manifest: default_server_build_manifest(),
            debug_logging: false,
            log_file: None,
            max_log_size_bytes: default_max_log_size_bytes(),
        }
    }
}

impl ReleaseSettings {
    /// Load settings from `path`. A missing file yields the defaults.
    ///
    /// # Errors
    /// Returns an error when the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn build_manifest_for(&self, target: relver_core::Target) -> &Path {
        match target {
            relver_core::Target::Client => &self.client_build_manifest,
            relver_core::Target::Server => &self.server_build_manifest,
        }
    }
}
