use relver_core::VersionError;
use relver_manifest::ManifestError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Version(#[from] VersionError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("Missing {what}: pass {flag} or set `{setting}` in .relver.json")]
    MissingSetting {
        what: &'static str,
        flag: &'static str,
        setting: &'static str,
    },

    #[error("Failed to determine the current directory: {0}")]
    CurrentDir(#[source] std::io::Error),

    #[error("Failed to render output: {0}")]
    Render(#[from] serde_json::Error),
}

impl AppError {
    pub fn missing_setting(what: &'static str, flag: &'static str, setting: &'static str) -> Self {
        Self::MissingSetting {
            what,
            flag,
            setting,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use relver_core::{Target, VersionError};
    use relver_manifest::ManifestError;

    use super::AppError;

    #[test]
    fn library_errors_keep_their_message() {
        let error: AppError = VersionError::UnknownTarget("desktop".to_string()).into();
        assert_eq!(
            error.to_string(),
            VersionError::UnknownTarget("desktop".to_string()).to_string()
        );

        let error: AppError = ManifestError::NotADirectory {
            path: PathBuf::from("dist"),
        }
        .into();
        assert!(error.to_string().contains("dist"));
    }

    #[test]
    fn missing_setting_names_flag_and_key() {
        let error = AppError::missing_setting("repository owner", "--repo-owner", "repo_owner");

        let message = error.to_string();
        assert!(message.contains("--repo-owner"));
        assert!(message.contains("`repo_owner`"));
    }

    #[test]
    fn unknown_target_is_wrapped() {
        let source: VersionError = "desktop"
            .parse::<Target>()
            .expect_err("unknown target should fail");

        assert!(matches!(
            AppError::from(source),
            AppError::Version(VersionError::UnknownTarget(_))
        ));
    }
}
