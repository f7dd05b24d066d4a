use serde_yaml::{Mapping, Value};
use std::fmt::Write as _;

use crate::error::VersionError;
use crate::types::Target;

const COMPATIBILITY_SECTION: &str = "compatibility";
const VERSION_KEY: &str = "version";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Structured,
    Legacy,
}

impl DocumentFormat {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Structured => "structured",
            Self::Legacy => "legacy",
        }
    }
}

/// The version record as it exists on disk, in whichever of the two formats
/// is authoritative.
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    Structured(StructuredDocument),
    Legacy(LegacyDocument),
}

impl Document {
    #[must_use]
    pub fn format(&self) -> DocumentFormat {
        match self {
            Self::Structured(_) => DocumentFormat::Structured,
            Self::Legacy(_) => DocumentFormat::Legacy,
        }
    }

    #[must_use]
    pub fn version(&self, target: Target) -> Option<String> {
        match self {
            Self::Structured(doc) => doc.lookup(target.as_str(), VERSION_KEY),
            Self::Legacy(doc) => doc.get(target.legacy_key()),
        }
    }

    pub fn set_version(&mut self, target: Target, version: &str) {
        match self {
            Self::Structured(doc) => doc.insert(target.as_str(), VERSION_KEY, version),
            Self::Legacy(doc) => doc.set(target.legacy_key(), version),
        }
    }

    /// Minimum compatible version of `target`, if recorded.
    ///
    /// # Errors
    /// Fails with `UnsupportedByLegacyFormat` on the legacy format, which has
    /// no compatibility section.
    pub fn min_version(&self, target: Target) -> Result<Option<String>, VersionError> {
        match self {
            Self::Structured(doc) => {
                Ok(doc.lookup(COMPATIBILITY_SECTION, target.min_version_key()))
            }
            Self::Legacy(_) => Err(VersionError::UnsupportedByLegacyFormat {
                feature: "minimum versions",
            }),
        }
    }

    /// # Errors
    /// Fails with `UnsupportedByLegacyFormat` on the legacy format.
    pub fn set_min_version(&mut self, target: Target, version: &str) -> Result<(), VersionError> {
        match self {
            Self::Structured(doc) => {
                doc.insert(COMPATIBILITY_SECTION, target.min_version_key(), version);
                Ok(())
            }
            Self::Legacy(_) => Err(VersionError::UnsupportedByLegacyFormat {
                feature: "minimum versions",
            }),
        }
    }
}

/// `VERSION.yaml` contents. Keys this tool does not know about are kept in
/// their original order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructuredDocument {
    root: Mapping,
}

impl StructuredDocument {
    /// Parse YAML text. An empty document is an empty mapping.
    ///
    /// # Errors
    /// Returns a description of the problem when the text is not YAML or its
    /// top level is not a mapping.
    pub fn parse(text: &str) -> Result<Self, String> {
        let value: Value = serde_yaml::from_str(text).map_err(|error| error.to_string())?;
        match value {
            Value::Null => Ok(Self::default()),
            Value::Mapping(root) => Ok(Self { root }),
            other => Err(format!(
                "top-level value must be a mapping, found {}",
                value_kind(&other)
            )),
        }
    }

    /// # Errors
    /// Returns an error if the mapping cannot be serialized.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(&self.root)
    }

    fn lookup(&self, section: &str, key: &str) -> Option<String> {
        let value = self.root.get(section)?.as_mapping()?.get(key)?;
        let text = match value {
            Value::String(text) => text.clone(),
            Value::Number(number) => number.to_string(),
            _ => return None,
        };
        (!text.is_empty()).then_some(text)
    }

    fn insert(&mut self, section: &str, key: &str, value: &str) {
        let slot = self.root.entry(Value::from(section)).or_insert(Value::Null);
        if !slot.is_mapping() {
            *slot = Value::Mapping(Mapping::new());
        }
        if let Value::Mapping(mapping) = slot {
            mapping.insert(Value::from(key), Value::from(value));
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

/// Legacy `VERSION` contents, kept as raw text so comments and unrelated
/// keys survive an update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegacyDocument {
    text: String,
}

impl LegacyDocument {
    #[must_use]
    pub fn parse(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Value of `key`; the last assignment wins.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.text
            .lines()
            .filter_map(split_assignment)
            .filter(|(name, _)| *name == key)
            .map(|(_, value)| value.to_string())
            .last()
            .filter(|value| !value.is_empty())
    }

    /// Rewrite every assignment of `key` in place, or append one.
    pub fn set(&mut self, key: &str, value: &str) {
        let mut out = String::with_capacity(self.text.len() + key.len() + value.len() + 2);
        let mut replaced = false;

        for line in self.text.split_inclusive('\n') {
            let (body, ending) = split_line_ending(line);
            if split_assignment(body).is_some_and(|(name, _)| name == key) {
                let _ = write!(out, "{key}={value}{ending}");
                replaced = true;
            } else {
                out.push_str(line);
            }
        }

        if !replaced {
            if !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            let _ = writeln!(out, "{key}={value}");
        }

        self.text = out;
    }
}

fn split_assignment(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.trim().split_once('=')?;
    Some((key.trim(), value.trim()))
}

fn split_line_ending(line: &str) -> (&str, &str) {
    if let Some(body) = line.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = line.strip_suffix('\n') {
        (body, "\n")
    } else {
        (line, "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRUCTURED: &str = "\
client:
  version: 1.0.7+10
  channel: stable
server:
  version: 1.0.6+9
compatibility:
  min_client_version: 1.0.0
  min_server_version: 1.0.0
";

    fn structured() -> Document {
        Document::Structured(StructuredDocument::parse(STRUCTURED).expect("yaml should parse"))
    }

    #[test]
    fn structured_reads_versions_and_minimums() {
        let doc = structured();

        assert_eq!(doc.version(Target::Client).as_deref(), Some("1.0.7+10"));
        assert_eq!(doc.version(Target::Server).as_deref(), Some("1.0.6+9"));
        assert_eq!(
            doc.min_version(Target::Client)
                .expect("structured supports minimums")
                .as_deref(),
            Some("1.0.0")
        );
    }

    #[test]
    fn structured_set_keeps_unrelated_keys_and_order() {
        let mut doc = structured();
        doc.set_version(Target::Client, "1.1.0+11");

        let Document::Structured(inner) = &doc else {
            panic!("document should stay structured");
        };
        let yaml = inner.to_yaml().expect("yaml should serialize");
        assert!(yaml.contains("channel: stable"));
        let client_at = yaml.find("client:").expect("client section");
        let server_at = yaml.find("server:").expect("server section");
        assert!(client_at < server_at);
        assert_eq!(doc.version(Target::Client).as_deref(), Some("1.1.0+11"));
    }

    #[test]
    fn structured_creates_missing_sections() {
        let mut doc = Document::Structured(StructuredDocument::parse("").expect("empty parses"));
        assert_eq!(doc.version(Target::Server), None);

        doc.set_version(Target::Server, "0.1.0+1");
        doc.set_min_version(Target::Client, "0.1.0")
            .expect("structured supports minimums");

        assert_eq!(doc.version(Target::Server).as_deref(), Some("0.1.0+1"));
        assert_eq!(
            doc.min_version(Target::Client)
                .expect("structured supports minimums")
                .as_deref(),
            Some("0.1.0")
        );
    }

    #[test]
    fn structured_rejects_non_mapping_root() {
        let error = StructuredDocument::parse("- 1\n- 2\n").expect_err("sequence should fail");
        assert!(error.contains("a sequence"));
        assert!(StructuredDocument::parse("client: [unclosed").is_err());
    }

    #[test]
    fn legacy_reads_and_updates_in_place() {
        let mut doc = Document::Legacy(LegacyDocument::parse(
            "# release versions\r\nCLIENT_VERSION=1.0.0+1\r\nSERVER_VERSION = 2.0.0+3\r\nCHANNEL=beta\r\n",
        ));

        assert_eq!(doc.version(Target::Server).as_deref(), Some("2.0.0+3"));
        doc.set_version(Target::Server, "2.0.1+3");

        let Document::Legacy(inner) = &doc else {
            panic!("document should stay legacy");
        };
        assert_eq!(
            inner.as_str(),
            "# release versions\r\nCLIENT_VERSION=1.0.0+1\r\nSERVER_VERSION=2.0.1+3\r\nCHANNEL=beta\r\n"
        );
    }

    #[test]
    fn legacy_appends_missing_key() {
        let mut doc = LegacyDocument::parse("CLIENT_VERSION=1.0.0");
        doc.set("SERVER_VERSION", "1.0.0+2");

        assert_eq!(doc.as_str(), "CLIENT_VERSION=1.0.0\nSERVER_VERSION=1.0.0+2\n");
        assert_eq!(doc.get("SERVER_VERSION").as_deref(), Some("1.0.0+2"));
    }

    #[test]
    fn legacy_has_no_compatibility_section() {
        let mut doc = Document::Legacy(LegacyDocument::parse("CLIENT_VERSION=1.0.0\n"));

        assert!(matches!(
            doc.min_version(Target::Client),
            Err(VersionError::UnsupportedByLegacyFormat { .. })
        ));
        assert!(matches!(
            doc.set_min_version(Target::Client, "1.0.0"),
            Err(VersionError::UnsupportedByLegacyFormat { .. })
        ));
    }
}
