//! Session file handling around a registration: save-as copies and backups.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, SessionError};

/// Extension appended to a session path by [`backup_session`].
pub const BACKUP_EXTENSION: &str = "bak";

/// Copy `src` to `dst` so that `dst` can be modified in place.
///
/// Returns `false` without touching the filesystem when both paths name the same file.
pub fn copy_session(src: &Path, dst: &Path) -> Result<bool> {
    if same_file(src, dst) {
        return Ok(false);
    }

    // Copy through a temp file so a failed copy never leaves a truncated session behind.
    let tmp = sibling_path(dst, "sgc_patch.tmp");
    fs::copy(src, &tmp).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        SessionError::io(src, e)
    })?;

    // `rename` doesn't replace on Windows.
    #[cfg(windows)]
    {
        let _ = fs::remove_file(dst);
    }

    fs::rename(&tmp, dst).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        SessionError::io(dst, e)
    })?;
    tracing::debug!(src = %src.display(), dst = %dst.display(), "copied session file");
    Ok(true)
}

/// Write a byte copy of `path` next to it as `<path>.bak`, replacing an older backup.
pub fn backup_session(path: &Path) -> Result<PathBuf> {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(BACKUP_EXTENSION);
    let backup = PathBuf::from(name);

    fs::copy(path, &backup).map_err(|e| SessionError::io(path, e))?;
    tracing::info!(backup = %backup.display(), "wrote session backup");
    Ok(backup)
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("session");
    parent.join(format!(".{file_name}.{suffix}"))
}
