use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

/// Replace `path` with `content` so readers see either the old or the new file, never a mix.
///
/// The temp file lives next to the target so the final rename stays on one filesystem.
/// It is removed automatically if any step fails.
pub fn atomic_write(path: &Path, content: &str) -> io::Result<()> {
    let temp = filled_temp(path, content)?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Like [`atomic_write`] but never replaces an existing file.
/// Returns `false` when `path` already exists.
pub fn write_new(path: &Path, content: &str) -> io::Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    let temp = filled_temp(path, content)?;
    match temp.persist_noclobber(path) {
        Ok(_) => Ok(true),
        Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(e.error),
    }
}

fn filled_temp(path: &Path, content: &str) -> io::Result<NamedTempFile> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        Some(_) => Path::new("."),
        None => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "path has no parent directory",
            ))
        }
    };

    let mut temp = NamedTempFile::new_in(parent)?;
    temp.write_all(content.as_bytes())?;
    temp.as_file().sync_all()?;
    Ok(temp)
}
