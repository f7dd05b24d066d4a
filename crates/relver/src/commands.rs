use log::{info, warn};
use relver_core::{Target, VersionManager, VersionSummary};
use relver_manifest::{
    ArtifactPaths, HashManifestBuilder, KeyStyle, ManifestParams, RepoCoordinates,
    UpdateManifestBuilder, load_hash_list, read_json_document, retarget, write_json_verified,
};
use relver_platform::ProjectPaths;
use std::path::{Path, PathBuf};

use crate::cli::{Command, HashArgs, ManifestArgs, Selection, TranscodeArgs};
use crate::error::AppError;
use crate::settings::ReleaseSettings;

/// Everything a command needs besides its own arguments.
pub struct Context {
    pub project: ProjectPaths,
    pub settings: ReleaseSettings,
    pub manager: VersionManager,
}

/// Paths given on the command line are used as is; configured ones are
/// relative to the project root.
impl Context {
    fn assets_dir(&self, explicit: Option<&Path>) -> PathBuf {
        explicit.map_or_else(
            || self.project.resolve(&self.settings.assets_dir),
            Path::to_path_buf,
        )
    }

    fn build_manifest(&self, target: Target, explicit: Option<&Path>) -> PathBuf {
        explicit.map_or_else(
            || self.project.resolve(self.settings.build_manifest_for(target)),
            Path::to_path_buf,
        )
    }
}

pub fn run(command: Command, context: &Context) -> Result<(), AppError> {
    let manager = &context.manager;

    match command {
        Command::Get { target, json } => get(context, target, json)?,
        Command::Set { target, version } => {
            manager.set_version(target, &version)?;
            println!("{target} version set to {version}");
        }
        Command::Bump { target, kind } => {
            let version = manager.bump_version(target, kind)?;
            println!("{target} version bumped ({kind}) to {version}");
        }
        Command::Sync { target, pubspec } => sync(context, target, pubspec.as_deref())?,
        Command::SetMinVersion { target, version } => {
            manager.set_min_version(target, &version)?;
            println!("{target} minimum version set to {version}");
        }
        Command::GetMinVersion { target } => {
            println!("{}", manager.get_min_version(target)?);
        }
        Command::Extract { target, sync } => {
            if let Some(pubspec) = sync {
                let path = context.build_manifest(target, Some(pubspec.as_path()));
                manager.sync_to_build_manifest(target, &path)?;
            }
            println!("{}", serde_json::to_string(&manager.release_info(target)?)?);
        }
        Command::CopyToAssets { assets_dir } => {
            let destination = manager.copy_to_assets(&context.assets_dir(assets_dir.as_deref()))?;
            println!("Copied version store to {}", destination.display());
        }
        Command::Hash(args) => hash(&args)?,
        Command::GenerateManifest(args) => generate_manifest(context, args)?,
        Command::ToGitee(args) => to_gitee(context, args)?,
    }

    Ok(())
}

fn get(context: &Context, selection: Selection, json: bool) -> Result<(), AppError> {
    let manager = &context.manager;

    match (selection, json) {
        (Selection::All, true) => {
            println!("{}", serde_json::to_string_pretty(&manager.summary()?)?);
        }
        (Selection::All, false) => print!("{}", render_summary(&manager.summary()?)),
        (Selection::One(target), true) => {
            println!("{}", serde_json::to_string(&manager.release_info(target)?)?);
        }
        (Selection::One(target), false) => println!("{}", manager.get_version(target)?),
    }
    Ok(())
}

fn render_summary(summary: &VersionSummary) -> String {
    let mut out = format!(
        "client: {}\nserver: {}\n",
        summary.client.full_version, summary.server.full_version
    );
    if let Some(compatibility) = &summary.compatibility {
        out.push_str(&format!(
            "min client: {}\nmin server: {}\n",
            compatibility.min_client_version, compatibility.min_server_version
        ));
    }
    out
}

/// Server builds bundle the version store, so syncing the server also
/// refreshes the packaged copy.
fn sync(context: &Context, selection: Selection, pubspec: Option<&Path>) -> Result<(), AppError> {
    let targets = selection.targets();

    for &target in &targets {
        let path = context.build_manifest(target, pubspec);
        let edit = context.manager.sync_to_build_manifest(target, &path)?;
        println!("{target}: {} ({})", edit.diff_preview(), path.display());
    }

    if targets.contains(&Target::Server) {
        let destination = context.manager.copy_to_assets(&context.assets_dir(None))?;
        println!("Copied version store to {}", destination.display());
    }
    Ok(())
}

fn hash(args: &HashArgs) -> Result<(), AppError> {
    let key_style = if args.base_name_only {
        KeyStyle::BaseName
    } else {
        KeyStyle::RelativePath
    };

    let report = HashManifestBuilder::new(&args.input_dir)
        .exclude(&args.output)
        .excluding(args.excludes.iter().cloned())
        .key_style(key_style)
        .build()?;
    for failure in &report.skipped {
        warn!("Not hashed: {} ({})", failure.path.display(), failure.error);
    }

    let size = write_json_verified(&args.output, &report.manifest)?;
    println!(
        "Hashed {} files ({} skipped, {} excluded) into {} ({size} bytes)",
        report.manifest.len(),
        report.skipped.len(),
        report.excluded,
        args.output.display()
    );
    Ok(())
}

fn generate_manifest(context: &Context, args: ManifestArgs) -> Result<(), AppError> {
    let settings = &context.settings;
    let needs_repo = args.base_url.is_none() || args.update_check_url.is_none();
    let repo = if needs_repo {
        RepoCoordinates::new(
            args.repo_owner
                .or_else(|| settings.repo_owner.clone())
                .ok_or_else(|| {
                    AppError::missing_setting("repository owner", "--repo-owner", "repo_owner")
                })?,
            args.repo_name
                .or_else(|| settings.repo_name.clone())
                .ok_or_else(|| {
                    AppError::missing_setting("repository name", "--repo-name", "repo_name")
                })?,
        )
    } else {
        RepoCoordinates::new(
            args.repo_owner.unwrap_or_default(),
            args.repo_name.unwrap_or_default(),
        )
    };

    let hash_list = args.file_hashes.as_deref().and_then(|path| {
        load_hash_list(path)
            .inspect(|list| info!("Loaded {} digests from {}", list.len(), path.display()))
            .inspect_err(|error| warn!("{error}; computing digests from the artifacts instead"))
            .ok()
    });

    let params = ManifestParams {
        client_version: args.client_version,
        server_version: args.server_version,
        artifacts: ArtifactPaths {
            macos: args.macos_file,
            windows: args.windows_file,
            android: args.android_file,
        },
        tag: args.tag_version,
        repo,
        backend: args.backend.unwrap_or(settings.backend),
        base_url: args.base_url,
        update_check_url: args.update_check_url,
        hash_list,
    };

    let manifest = UpdateManifestBuilder::new(params).build()?;
    let size = write_json_verified(&args.output, &manifest)?;
    println!("Wrote {} ({size} bytes)", args.output.display());
    Ok(())
}

fn to_gitee(context: &Context, args: TranscodeArgs) -> Result<(), AppError> {
    let settings = &context.settings;
    let owner = args
        .gitee_repo_owner
        .or_else(|| settings.gitee_repo_owner.clone())
        .ok_or_else(|| {
            AppError::missing_setting("Gitee owner", "--gitee-repo-owner", "gitee_repo_owner")
        })?;
    let name = args
        .gitee_repo_name
        .or_else(|| settings.gitee_repo_name.clone())
        .ok_or_else(|| {
            AppError::missing_setting("Gitee repository", "--gitee-repo-name", "gitee_repo_name")
        })?;

    let document = read_json_document(&args.input)?;
    let (retargeted, report) = retarget(&document, &owner, &name)?;
    let size = write_json_verified(&args.output, &retargeted)?;

    for entry in &report.entries {
        println!(
            "{}.{}: {:?} {}",
            entry.target, entry.platform, entry.tier, entry.after
        );
    }
    println!("updateCheckUrl: {}", report.update_check_url);
    println!("Wrote {} ({size} bytes)", args.output.display());
    Ok(())
}
