use std::io::Write;
use std::path::Path;

/// Replace `path` with `data` in one step.
///
/// The bytes go to a temporary sibling first and are renamed over the target,
/// so readers see either the previous file or the new one, never a partial
/// write. Missing parent directories are created. An existing file keeps its
/// permissions; a new one gets the same mode `fs::write` would give it.
///
/// # Errors
/// Returns an error if the parent directory cannot be created, the temporary
/// file cannot be written, or the final rename fails. The previous file is
/// left untouched in every failure case.
pub fn write_atomic(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let existing = std::fs::metadata(path).ok().map(|metadata| metadata.permissions());

    let mut builder = tempfile::Builder::new();
    builder.prefix(".relver-").suffix(".tmp");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if existing.is_none() {
            builder.permissions(std::fs::Permissions::from_mode(0o666));
        }
    }

    let mut tmp = builder.tempfile_in(parent)?;
    if let Some(permissions) = existing {
        tmp.as_file().set_permissions(permissions)?;
    }
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;

    tmp.persist(path).map_err(|error| error.error)?;
    Ok(())
}
