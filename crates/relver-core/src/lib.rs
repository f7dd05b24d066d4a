//! Version record handling for the two-target product.
//!
//! - Version grammar: parsing, validation and bump rules.
//! - `VersionStore`: the on-disk record in structured or legacy form.
//! - `VersionManager`: get/set/bump, minimum versions, build-metadata sync
//!   and the packaged-assets copy.

mod build_manifest;
mod document;
mod error;
mod manager;
mod store;
mod types;

pub use build_manifest::{BuildManifest, BuildManifestEdit};
pub use document::{Document, DocumentFormat, LegacyDocument, StructuredDocument};
pub use error::VersionError;
pub use manager::{Compatibility, ReleaseInfo, TargetSummary, VersionManager, VersionSummary};
pub use store::VersionStore;
pub use types::{
    BumpKind, DEFAULT_BUILD, FullVersion, Target, Version, VersionParseError, parse_min_version,
    parse_version, validate_version,
};
