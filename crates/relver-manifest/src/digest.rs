use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::ManifestError;

const CHUNK_SIZE: usize = 64 * 1024;

/// SHA-256 of the file's exact bytes as 64 lowercase hex characters.
/// The file is streamed in fixed-size chunks.
///
/// # Errors
/// Returns an error if the file cannot be opened or read.
pub fn sha256_file(path: &Path) -> Result<String, ManifestError> {
    let mut file = std::fs::File::open(path).map_err(|error| {
        ManifestError::io_with_path("failed to open file for hashing", path, error)
    })?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0_u8; CHUNK_SIZE];

    loop {
        let read = file.read(&mut buffer).map_err(|error| {
            ManifestError::io_with_path("failed to read file for hashing", path, error)
        })?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Whether `digest` is a 64-character hexadecimal SHA-256 digest.
#[must_use]
pub fn is_valid_digest(digest: &str) -> bool {
    digest.len() == 64 && digest.chars().all(|ch| ch.is_ascii_hexdigit())
}
