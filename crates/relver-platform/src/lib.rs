//! Filesystem plumbing shared by the relver crates.
//!
//! - Project layout resolution (`VERSION.yaml`, `VERSION`, settings file).
//! - Per-user application directories used for log files.
//! - Whole-file atomic replacement.

mod atomic;
mod paths;

pub use atomic::write_atomic;
pub use paths::{
    AppPaths, AppPathsError, LEGACY_VERSION_FILE, ProjectPaths, SETTINGS_FILE,
    STRUCTURED_VERSION_FILE,
};
