use clap::{ArgAction, Args, Parser, Subcommand};
use relver_core::{BumpKind, Target, VersionError};
use relver_manifest::Backend;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Parser)]
#[command(
    name = "relver",
    version,
    about = "Version store, hash lists and update manifests for client/server releases"
)]
pub struct Cli {
    /// Project root holding VERSION.yaml or VERSION. Discovered from the
    /// current directory when omitted.
    #[arg(long, global = true, env = "RELVER_PROJECT_ROOT")]
    pub project_root: Option<PathBuf>,

    /// Increase log detail (-v debug, -vv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log warnings and errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Also append log records to this file.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the version of one target, or a summary of both.
    Get {
        #[arg(default_value = "all")]
        target: Selection,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Store a new version (x.y.z or x.y.z+build).
    Set { target: Target, version: String },

    /// Increment one component of a target's version.
    Bump {
        target: Target,
        /// major, minor, patch or build.
        kind: BumpKind,
    },

    /// Write the current version into the build manifest (pubspec.yaml).
    Sync {
        #[arg(default_value = "all")]
        target: Selection,

        /// Build manifest to rewrite instead of the configured one.
        #[arg(long)]
        pubspec: Option<PathBuf>,
    },

    /// Store the minimum compatible version (x.y.z) of a target.
    SetMinVersion { target: Target, version: String },

    /// Print the minimum compatible version of a target.
    GetMinVersion { target: Target },

    /// Print release details of a target as JSON.
    Extract {
        target: Target,

        /// Also rewrite this build manifest.
        #[arg(long, value_name = "PUBSPEC")]
        sync: Option<PathBuf>,
    },

    /// Copy the version store into the packaged assets directory.
    CopyToAssets {
        /// Destination directory instead of the configured one.
        #[arg(long)]
        assets_dir: Option<PathBuf>,
    },

    /// Write a JSON list of SHA-256 digests for every file in a directory.
    Hash(HashArgs),

    /// Generate the update manifest for a release.
    GenerateManifest(ManifestArgs),

    /// Rewrite a GitHub update manifest for a Gitee mirror.
    ToGitee(TranscodeArgs),
}

#[derive(Debug, Args)]
pub struct HashArgs {
    #[arg(long)]
    pub input_dir: PathBuf,

    #[arg(long)]
    pub output: PathBuf,

    /// Key entries by file name instead of relative path.
    #[arg(long)]
    pub base_name_only: bool,

    /// Skip this file; may be repeated.
    #[arg(long = "exclude", value_name = "PATH")]
    pub excludes: Vec<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ManifestArgs {
    #[arg(long)]
    pub client_version: String,

    #[arg(long)]
    pub server_version: String,

    #[arg(long)]
    pub macos_file: PathBuf,

    #[arg(long)]
    pub windows_file: PathBuf,

    #[arg(long)]
    pub android_file: PathBuf,

    /// Release tag the artifacts are attached to, e.g. v1.2.3.
    #[arg(long)]
    pub tag_version: String,

    #[arg(long)]
    pub repo_owner: Option<String>,

    #[arg(long)]
    pub repo_name: Option<String>,

    /// github or gitee.
    #[arg(long = "repo-type", value_parser = parse_backend)]
    pub backend: Option<Backend>,

    /// Download base URL replacing the release URL scheme.
    #[arg(long)]
    pub base_url: Option<String>,

    #[arg(long)]
    pub update_check_url: Option<String>,

    #[arg(long)]
    pub output: PathBuf,

    /// Hash list produced by `relver hash` to reuse digests from.
    #[arg(long)]
    pub file_hashes: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct TranscodeArgs {
    #[arg(long)]
    pub input: PathBuf,

    #[arg(long)]
    pub gitee_repo_owner: Option<String>,

    #[arg(long)]
    pub gitee_repo_name: Option<String>,

    #[arg(long)]
    pub output: PathBuf,
}

/// A single target or both of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    One(Target),
    All,
}

impl Selection {
    pub fn targets(self) -> Vec<Target> {
        match self {
            Self::One(target) => vec![target],
            Self::All => Target::ALL.to_vec(),
        }
    }
}

impl FromStr for Selection {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            Ok(Self::All)
        } else {
            s.parse().map(Self::One)
        }
    }
}

fn parse_backend(value: &str) -> Result<Backend, String> {
    Backend::from_name(value)
        .ok_or_else(|| format!("unknown repository type `{value}` (expected github or gitee)"))
}
