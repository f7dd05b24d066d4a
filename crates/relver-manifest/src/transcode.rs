use log::{info, warn};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

use crate::backend::{Backend, RepoCoordinates};
use crate::error::ManifestError;

static GITHUB_RELEASE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https://github\.com/([^/]+)/([^/]+)/releases/download/([^/]+)/(.+)")
        .expect("release URL pattern should compile")
});

const RETARGETED_ENTRIES: [(&str, &[&str]); 2] =
    [("client", &["macos", "windows"]), ("server", &["android"])];

/// How one `downloadUrl` was rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteTier {
    /// Parsed as a GitHub release URL and rebuilt for the new repository.
    Structured,
    /// Had the GitHub host but an unexpected shape; host swapped in place.
    HostReplace,
    /// Did not point at GitHub and was left alone.
    Untouched,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRewrite {
    pub target: &'static str,
    pub platform: &'static str,
    pub tier: RewriteTier,
    pub before: String,
    pub after: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetargetReport {
    pub update_check_url: String,
    pub entries: Vec<EntryRewrite>,
}

/// Point a GitHub-hosted manifest at a Gitee repository.
///
/// `updateCheckUrl` always becomes the Gitee `config` release URL. Each
/// platform `downloadUrl` keeps its release tag and file name but moves to
/// `gitee_owner/gitee_repo`. Every other field, known or not, is copied
/// unchanged and in its original order.
///
/// # Errors
/// Fails with `InvalidManifest` when the document is not a JSON object.
pub fn retarget(
    manifest: &Value,
    gitee_owner: &str,
    gitee_repo: &str,
) -> Result<(Value, RetargetReport), ManifestError> {
    let mut document = manifest.clone();
    let Some(root) = document.as_object_mut() else {
        return Err(ManifestError::InvalidManifest(
            "top-level value must be an object".to_string(),
        ));
    };

    let repo = RepoCoordinates::new(gitee_owner, gitee_repo);
    let update_check_url = Backend::Gitee.update_check_url(&repo);
    root.insert(
        "updateCheckUrl".to_string(),
        Value::String(update_check_url.clone()),
    );

    let mut entries = Vec::new();
    for (target, platforms) in RETARGETED_ENTRIES {
        for &platform in platforms {
            let Some(entry) = root
                .get_mut(target)
                .and_then(|section| section.get_mut("platforms"))
                .and_then(|platforms| platforms.get_mut(platform))
                .and_then(Value::as_object_mut)
            else {
                continue;
            };

            let before = entry
                .get("downloadUrl")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let (after, tier) = rewrite_download_url(&before, &repo);

            match tier {
                RewriteTier::Structured => {
                    info!("{target}.{platform}: {before} -> {after}");
                }
                RewriteTier::HostReplace => {
                    warn!("{target}.{platform}: unrecognized release URL, swapped host only: {after}");
                }
                RewriteTier::Untouched => {
                    info!("{target}.{platform}: not a GitHub URL, left as is");
                }
            }
            if tier != RewriteTier::Untouched {
                entry.insert("downloadUrl".to_string(), Value::String(after.clone()));
            }

            entries.push(EntryRewrite {
                target,
                platform,
                tier,
                before,
                after,
            });
        }
    }

    Ok((
        document,
        RetargetReport {
            update_check_url,
            entries,
        },
    ))
}

fn rewrite_download_url(url: &str, repo: &RepoCoordinates) -> (String, RewriteTier) {
    let github = Backend::GitHub.host();
    if !url.contains(github) {
        return (url.to_string(), RewriteTier::Untouched);
    }

    match GITHUB_RELEASE_URL.captures(url) {
        Some(captures) => {
            let tag = &captures[3];
            let file = &captures[4];
            let base = Backend::Gitee.release_download_base(repo, tag);
            (format!("{base}/{file}"), RewriteTier::Structured)
        }
        None => (
            url.replace(github, Backend::Gitee.host()),
            RewriteTier::HostReplace,
        ),
    }
}
