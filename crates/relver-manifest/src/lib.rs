//! Release manifest pipeline.
//!
//! This crate turns a version snapshot and a set of build artifacts into the
//! update manifest read by the running applications:
//! - Content digests for single files and whole directory trees.
//! - Update manifest construction for either hosting backend.
//! - Re-targeting an existing manifest from GitHub to Gitee.
//! - JSON output that is verified by re-parsing after it is written.

mod backend;
mod digest;
mod error;
mod hash_manifest;
mod output;
mod transcode;
mod update_manifest;

/// Release hosting backends and their URL conventions.
pub use backend::{Backend, RepoCoordinates};
/// Streaming SHA-256 helpers.
pub use digest::{is_valid_digest, sha256_file};
pub use error::ManifestError;
/// Directory digesting.
pub use hash_manifest::{
    HashFailure, HashManifest, HashManifestBuilder, HashReport, KeyStyle, load_hash_list,
};
/// JSON file output with a read-back check.
pub use output::{read_json_document, write_json_verified};
/// GitHub to Gitee manifest rewriting.
pub use transcode::{EntryRewrite, RetargetReport, RewriteTier, retarget};
/// Update manifest model and builder.
pub use update_manifest::{
    ArtifactPaths, HashSource, ManifestParams, Platform, PlatformArtifact, TargetRelease,
    UpdateManifest, UpdateManifestBuilder,
};
