use serde::{Deserialize, Serialize};

/// Release hosting service that serves artifacts and the manifest itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    GitHub,
    Gitee,
}

impl Backend {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GitHub => "github",
            Self::Gitee => "gitee",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "github" => Some(Self::GitHub),
            "gitee" => Some(Self::Gitee),
            _ => None,
        }
    }

    #[must_use]
    pub const fn host(self) -> &'static str {
        match self {
            Self::GitHub => "github.com",
            Self::Gitee => "gitee.com",
        }
    }

    /// Fixed release tag under which the manifest itself is published.
    #[must_use]
    pub const fn config_tag(self) -> &'static str {
        match self {
            Self::GitHub => "UpdateConfig",
            Self::Gitee => "config",
        }
    }

    /// File name of the published manifest.
    #[must_use]
    pub const fn config_file_name(self) -> &'static str {
        match self {
            Self::GitHub => "update_config_github.json",
            Self::Gitee => "update_config_gitee.json",
        }
    }

    /// `https://{host}/{owner}/{repo}/releases/download/{tag}`
    #[must_use]
    pub fn release_download_base(self, repo: &RepoCoordinates, tag: &str) -> String {
        format!(
            "https://{}/{}/{}/releases/download/{tag}",
            self.host(),
            repo.owner,
            repo.name
        )
    }

    /// Where running applications poll for this backend's manifest.
    #[must_use]
    pub fn update_check_url(self, repo: &RepoCoordinates) -> String {
        format!(
            "{}/{}",
            self.release_download_base(repo, self.config_tag()),
            self.config_file_name()
        )
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `(owner, name)` of a hosted repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoCoordinates {
    pub owner: String,
    pub name: String,
}

impl RepoCoordinates {
    #[must_use]
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}
