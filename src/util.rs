//! Small file helpers shared by catalog, config and history loading.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{Result, VitrinaError};

/// Largest catalog or history file read into memory (10 MB).
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Read a file into a string, refusing files larger than `MAX_FILE_SIZE`.
pub fn read_to_string_limited(path: &Path) -> Result<String> {
    read_to_string_with_limit(path, MAX_FILE_SIZE)
}

/// Read a file into a string, refusing files larger than `max_size` bytes.
///
/// # Errors
///
/// Returns a storage error if the file cannot be read or is too large.
pub fn read_to_string_with_limit(path: &Path, max_size: u64) -> Result<String> {
    let metadata = fs::metadata(path).map_err(|e| VitrinaError::storage(path, e))?;

    let size = metadata.len();
    if size > max_size {
        return Err(VitrinaError::storage(
            path,
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("file is too large ({} bytes, max {} bytes)", size, max_size),
            ),
        ));
    }

    fs::read_to_string(path).map_err(|e| VitrinaError::storage(path, e))
}

/// Write `content` to `path` atomically via a sibling temp file and rename.
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    use std::io::Write;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_path = path.with_file_name(format!(".{}.tmp", file_name));

    {
        let mut file =
            fs::File::create(&temp_path).map_err(|e| VitrinaError::storage(&temp_path, e))?;
        file.write_all(content.as_bytes())
            .map_err(|e| VitrinaError::storage(&temp_path, e))?;
        file.sync_all()
            .map_err(|e| VitrinaError::storage(&temp_path, e))?;
    }

    // Rename is atomic on POSIX
    fs::rename(&temp_path, path).map_err(|e| VitrinaError::storage(path, e))?;

    Ok(())
}
