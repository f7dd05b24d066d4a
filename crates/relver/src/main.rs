mod cli;
mod commands;
mod error;
mod logging;
mod settings;

use clap::Parser;
use relver_core::{VersionManager, VersionStore};
use relver_platform::{AppPaths, ProjectPaths};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::cli::Cli;
use crate::commands::Context;
use crate::error::AppError;
use crate::logging::LogOptions;
use crate::settings::ReleaseSettings;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let project = match project_paths(cli.project_root.as_deref()) {
        Ok(project) => project,
        Err(error) => {
            eprintln!("error: {error}");
            return ExitCode::FAILURE;
        }
    };

    let loaded = ReleaseSettings::load(&project.settings_file());
    let settings = loaded.as_ref().map_or_else(|_| ReleaseSettings::default(), Clone::clone);

    logging::init_logging(&LogOptions {
        level: logging::level_for(cli.verbose, cli.quiet),
        file: log_file(cli.log_file, &settings, &project),
        max_log_size: settings.max_log_size_bytes,
    });
    if let Err(error) = &loaded {
        log::warn!("{error}; using default settings");
    }
    log::debug!("Project root: {}", project.root.display());

    let manager = VersionManager::new(VersionStore::for_project(&project));
    if let Ok(store_path) = manager.store().active_path() {
        log::debug!("Version store: {}", store_path.display());
    }
    let context = Context {
        project,
        settings,
        manager,
    };

    match commands::run(cli.command, &context) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            log::debug!("Command failed: {error:?}");
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

fn project_paths(explicit: Option<&Path>) -> Result<ProjectPaths, AppError> {
    match explicit {
        Some(root) => Ok(ProjectPaths::new(root)),
        None => {
            let cwd = std::env::current_dir().map_err(AppError::CurrentDir)?;
            Ok(ProjectPaths::discover(&cwd))
        }
    }
}

/// `--log-file` wins, then the configured file, then the per-user log when
/// debug logging is switched on.
fn log_file(
    explicit: Option<PathBuf>,
    settings: &ReleaseSettings,
    project: &ProjectPaths,
) -> Option<PathBuf> {
    if explicit.is_some() {
        return explicit;
    }
    if let Some(configured) = &settings.log_file {
        return Some(project.resolve(configured));
    }
    if !settings.debug_logging {
        return None;
    }

    let paths = AppPaths::new().ok()?;
    paths.ensure_dirs().ok()?;
    Some(paths.log_file())
}

#[cfg(test)]
mod tests {
    use relver_platform::ProjectPaths;
    use std::path::PathBuf;

    use super::{log_file, project_paths};
    use crate::settings::ReleaseSettings;

    #[test]
    fn explicit_log_file_wins_over_settings() {
        let project = ProjectPaths::new("/work/app");
        let settings = ReleaseSettings {
            log_file: Some(PathBuf::from("logs/relver.log")),
            debug_logging: true,
            ..ReleaseSettings::default()
        };

        assert_eq!(
            log_file(Some(PathBuf::from("/tmp/run.log")), &settings, &project),
            Some(PathBuf::from("/tmp/run.log"))
        );
        assert_eq!(
            log_file(None, &settings, &project),
            Some(PathBuf::from("/work/app/logs/relver.log"))
        );
    }

    #[test]
    fn no_log_file_without_debug_logging() {
        let project = ProjectPaths::new("/work/app");

        assert_eq!(log_file(None, &ReleaseSettings::default(), &project), None);
    }

    #[test]
    fn explicit_project_root_is_not_searched() {
        let temp_dir = tempfile::tempdir().expect("temporary directory should be created");

        let project = project_paths(Some(temp_dir.path())).expect("project paths should resolve");

        assert_eq!(project.root, temp_dir.path());
    }
}
