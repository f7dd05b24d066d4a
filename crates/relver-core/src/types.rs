use std::fmt;
use std::str::FromStr;

use crate::error::VersionError;

/// Build number used when a version string carries none, or a non-numeric one.
pub const DEFAULT_BUILD: u64 = 1;

const EXPECTED_CORE: &str = "x.y.z";
const EXPECTED_FULL: &str = "x.y.z or x.y.z+build";

/// One of the two independently versioned deliverables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Client,
    Server,
}

impl Target {
    pub const ALL: [Self; 2] = [Self::Client, Self::Server];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Server => "server",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "client" => Some(Self::Client),
            "server" => Some(Self::Server),
            _ => None,
        }
    }

    /// Key of this target in the legacy `KEY=VALUE` store.
    #[must_use]
    pub const fn legacy_key(self) -> &'static str {
        match self {
            Self::Client => "CLIENT_VERSION",
            Self::Server => "SERVER_VERSION",
        }
    }

    /// Key of this target's minimum version inside the `compatibility` section.
    #[must_use]
    pub const fn min_version_key(self) -> &'static str {
        match self {
            Self::Client => "min_client_version",
            Self::Server => "min_server_version",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Target {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| VersionError::UnknownTarget(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BumpKind {
    Major,
    Minor,
    Patch,
    Build,
}

impl BumpKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Major => "major",
            Self::Minor => "minor",
            Self::Patch => "patch",
            Self::Build => "build",
        }
    }
}

impl fmt::Display for BumpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BumpKind {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "major" => Ok(Self::Major),
            "minor" => Ok(Self::Minor),
            "patch" => Ok(Self::Patch),
            "build" => Ok(Self::Build),
            other => Err(VersionError::UnknownBumpKind(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionParseError {
    #[error("Invalid version format: {input} (expected {expected})")]
    InvalidFormat {
        input: String,
        expected: &'static str,
    },
    #[error("Version component {component} in {input} is too large (maximum 18446744073709551615)")]
    OutOfRange { input: String, component: String },
}

impl VersionParseError {
    fn invalid(input: &str, expected: &'static str) -> Self {
        Self::InvalidFormat {
            input: input.to_string(),
            expected,
        }
    }
}

/// A bare `major.minor.patch` triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    #[must_use]
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    #[must_use]
    pub fn to_semver(self) -> semver::Version {
        semver::Version::new(self.major, self.minor, self.patch)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for Version {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('.');
        let (Some(major), Some(minor), Some(patch), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(VersionParseError::invalid(s, EXPECTED_CORE));
        };

        Ok(Self::new(
            parse_component(s, major, EXPECTED_CORE)?,
            parse_component(s, minor, EXPECTED_CORE)?,
            parse_component(s, patch, EXPECTED_CORE)?,
        ))
    }
}

/// A version triple plus its independent build counter, `x.y.z+build`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FullVersion {
    pub version: Version,
    pub build: u64,
}

impl FullVersion {
    #[must_use]
    pub const fn new(version: Version, build: u64) -> Self {
        Self { version, build }
    }

    /// Parse with the store's historical leniency: a missing build suffix
    /// becomes [`DEFAULT_BUILD`], and so does a non-numeric one.
    ///
    /// # Errors
    /// Returns an error when the part before the last `+` is not three
    /// dot-joined non-negative integers.
    pub fn parse_lenient(input: &str) -> Result<Self, VersionParseError> {
        let (version_part, build_part) = split_build(input);
        let version = version_part.parse::<Version>()?;
        let build = build_part
            .and_then(parse_digits)
            .unwrap_or(DEFAULT_BUILD);
        Ok(Self::new(version, build))
    }

    /// Apply one bump. Bumping a version component never touches the build.
    ///
    /// # Errors
    /// Fails with `BumpOverflow` when the bumped component is already
    /// `u64::MAX`.
    pub fn bumped(self, kind: BumpKind) -> Result<Self, VersionError> {
        let Version {
            major,
            minor,
            patch,
        } = self.version;
        let next = |value: u64| {
            value
                .checked_add(1)
                .ok_or_else(|| VersionError::BumpOverflow {
                    version: self.to_string(),
                    kind,
                })
        };

        Ok(match kind {
            BumpKind::Major => Self::new(Version::new(next(major)?, 0, 0), self.build),
            BumpKind::Minor => Self::new(Version::new(major, next(minor)?, 0), self.build),
            BumpKind::Patch => Self::new(Version::new(major, minor, next(patch)?), self.build),
            BumpKind::Build => Self::new(self.version, next(self.build)?),
        })
    }

    /// The trimmed representation without the build counter.
    #[must_use]
    pub fn version_number(&self) -> String {
        self.version.to_string()
    }
}

impl fmt::Display for FullVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.version, self.build)
    }
}

/// Split a version string into its version part and build part.
///
/// Splits on the last `+`. A missing build part becomes `"1"`, and so does a
/// non-numeric one. That coercion is long-standing behavior relied on by
/// existing stores; it is a candidate for stricter validation.
///
/// # Errors
/// Returns an error when the version part is not `x.y.z`.
pub fn parse_version(input: &str) -> Result<(String, String), VersionParseError> {
    let (version_part, build_part) = split_build(input);
    version_part.parse::<Version>()?;

    let build_part = match build_part {
        Some(build) if parse_digits(build).is_some() => build.to_string(),
        _ => DEFAULT_BUILD.to_string(),
    };
    Ok((version_part.to_string(), build_part))
}

/// Check the strict grammar accepted when writing a version:
/// `x.y.z` or `x.y.z+build` with a numeric build.
///
/// # Errors
/// Returns an error for anything else, including a non-numeric build.
pub fn validate_version(input: &str) -> Result<(), VersionParseError> {
    let (version_part, build_part) = match input.split_once('+') {
        Some((version, build)) => (version, Some(build)),
        None => (input, None),
    };

    if version_part.parse::<Version>().is_err() {
        return Err(VersionParseError::invalid(input, EXPECTED_FULL));
    }
    if let Some(build) = build_part {
        parse_component(input, build, EXPECTED_FULL)?;
    }
    Ok(())
}

/// Parse a minimum compatible version, which never carries a build.
///
/// # Errors
/// Returns an error unless `input` is exactly `x.y.z`.
pub fn parse_min_version(input: &str) -> Result<Version, VersionParseError> {
    input.parse::<Version>()
}

fn split_build(input: &str) -> (&str, Option<&str>) {
    match input.rsplit_once('+') {
        Some((version, build)) => (version, Some(build)),
        None => (input, None),
    }
}

/// Components are `u64`; longer digit runs are reported as out of range
/// rather than malformed.
fn parse_component(
    input: &str,
    part: &str,
    expected: &'static str,
) -> Result<u64, VersionParseError> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(VersionParseError::invalid(input, expected));
    }
    part.parse().map_err(|_| VersionParseError::OutOfRange {
        input: input.to_string(),
        component: part.to_string(),
    })
}

fn parse_digits(part: &str) -> Option<u64> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_version_splits_build() {
        assert_eq!(
            parse_version("1.0.7+10").expect("version should parse"),
            ("1.0.7".to_string(), "10".to_string())
        );
    }

    #[test]
    fn parse_version_defaults_build_to_one() {
        assert_eq!(
            parse_version("1.0.7").expect("version should parse"),
            ("1.0.7".to_string(), "1".to_string())
        );
    }

    #[test]
    fn parse_version_coerces_non_numeric_build() {
        assert_eq!(
            parse_version("1.0.0+x").expect("lenient build should parse"),
            ("1.0.0".to_string(), "1".to_string())
        );
        assert_eq!(
            parse_version("1.0.0+").expect("empty build should parse"),
            ("1.0.0".to_string(), "1".to_string())
        );
    }

    #[test]
    fn parse_version_rejects_bad_core() {
        for input in ["1.0", "a.b.c", "1.0.0.0", "", "1..0", "-1.0.0", "1.0.0+2+3"] {
            assert!(
                matches!(
                    parse_version(input),
                    Err(VersionParseError::InvalidFormat { .. })
                ),
                "{input} should be rejected"
            );
        }
    }

    #[test]
    fn validate_version_is_strict_about_build() {
        assert!(validate_version("1.0.7").is_ok());
        assert!(validate_version("1.0.7+10").is_ok());
        assert!(validate_version("1.0.7+x").is_err());
        assert!(validate_version("1.0.7+").is_err());
        assert!(validate_version("1.0").is_err());
        assert!(validate_version("v1.0.7").is_err());
    }

    #[test]
    fn bump_rules() {
        let current = FullVersion::parse_lenient("1.0.7+10").expect("version should parse");

        let bump = |kind| current.bumped(kind).expect("bump should succeed").to_string();

        assert_eq!(bump(BumpKind::Major), "2.0.0+10");
        assert_eq!(bump(BumpKind::Minor), "1.1.0+10");
        assert_eq!(bump(BumpKind::Patch), "1.0.8+10");
        assert_eq!(bump(BumpKind::Build), "1.0.7+11");
    }

    #[test]
    fn bump_at_component_limit_fails_instead_of_wrapping() {
        let at_limit = FullVersion::new(Version::new(u64::MAX, 1, u64::MAX), u64::MAX);

        for kind in [BumpKind::Major, BumpKind::Patch, BumpKind::Build] {
            assert!(
                matches!(
                    at_limit.bumped(kind),
                    Err(VersionError::BumpOverflow { kind: failed, .. }) if failed == kind
                ),
                "{kind} bump should overflow"
            );
        }
        assert_eq!(
            at_limit
                .bumped(BumpKind::Minor)
                .expect("minor has room")
                .version,
            Version::new(u64::MAX, 2, 0)
        );
    }

    #[test]
    fn oversized_components_are_out_of_range() {
        assert!(matches!(
            "99999999999999999999.0.0".parse::<Version>(),
            Err(VersionParseError::OutOfRange { ref component, .. })
                if component == "99999999999999999999"
        ));
        assert!(matches!(
            validate_version("1.0.0+99999999999999999999"),
            Err(VersionParseError::OutOfRange { .. })
        ));
        assert_eq!(
            "18446744073709551615.0.0".parse::<Version>().ok(),
            Some(Version::new(u64::MAX, 0, 0))
        );
    }

    #[test]
    fn lenient_parse_fills_default_build() {
        let parsed = FullVersion::parse_lenient("3.2.1").expect("version should parse");
        assert_eq!(parsed, FullVersion::new(Version::new(3, 2, 1), DEFAULT_BUILD));
        assert_eq!(parsed.version_number(), "3.2.1");
    }

    #[test]
    fn min_version_rejects_build_suffix() {
        assert_eq!(
            parse_min_version("1.2.0").expect("min version should parse"),
            Version::new(1, 2, 0)
        );
        assert!(parse_min_version("1.2.0+3").is_err());
    }

    #[test]
    fn semver_conversion_orders_versions() {
        let older = Version::new(1, 9, 9).to_semver();
        let newer = FullVersion::parse_lenient("2.0.0+4")
            .expect("version should parse")
            .version
            .to_semver();
        assert!(newer > older);
    }

    #[test]
    fn target_and_bump_kind_names() {
        assert_eq!("client".parse::<Target>().ok(), Some(Target::Client));
        assert!(matches!(
            "desktop".parse::<Target>(),
            Err(VersionError::UnknownTarget(ref name)) if name == "desktop"
        ));
        assert_eq!("build".parse::<BumpKind>().ok(), Some(BumpKind::Build));
        assert!(matches!(
            "huge".parse::<BumpKind>(),
            Err(VersionError::UnknownBumpKind(ref kind)) if kind == "huge"
        ));
        assert_eq!(Target::Server.legacy_key(), "SERVER_VERSION");
        assert_eq!(Target::Client.min_version_key(), "min_client_version");
    }
}
