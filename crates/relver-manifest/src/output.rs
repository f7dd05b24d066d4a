use log::debug;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;

use crate::error::ManifestError;

/// Write `value` as pretty-printed JSON, then read the file back and parse it.
/// Returns the size of the written file in bytes.
///
/// # Errors
/// Returns an error when serialization or the write fails, and
/// `OutputVerification` when the written file does not parse back as JSON.
pub fn write_json_verified<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
) -> Result<u64, ManifestError> {
    let mut content = serde_json::to_string_pretty(value)
        .map_err(|error| ManifestError::json_with_path("failed to serialize", path, error))?;
    content.push('\n');

    relver_platform::write_atomic(path, content.as_bytes())
        .map_err(|error| ManifestError::io_with_path("failed to write", path, error))?;

    let written = std::fs::read_to_string(path)
        .map_err(|error| ManifestError::io_with_path("failed to re-read", path, error))?;
    serde_json::from_str::<Value>(&written).map_err(|source| ManifestError::OutputVerification {
        path: path.to_path_buf(),
        source,
    })?;

    let size = written.len() as u64;
    debug!("Verified {} ({size} bytes)", path.display());
    Ok(size)
}

/// Read any JSON document, keeping its key order.
///
/// # Errors
/// Fails with `NotFound` for a missing file and `Json` for malformed content.
pub fn read_json_document(path: &Path) -> Result<Value, ManifestError> {
    let text = std::fs::read_to_string(path).map_err(|error| {
        if error.kind() == std::io::ErrorKind::NotFound {
            ManifestError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            ManifestError::io_with_path("failed to read", path, error)
        }
    })?;
    serde_json::from_str(&text)
        .map_err(|error| ManifestError::json_with_path("failed to parse", path, error))
}
