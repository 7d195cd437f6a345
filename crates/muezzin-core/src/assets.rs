//! Media asset replacement.
//!
//! Asset filenames are fixed in settings; swapping the audio itself is done
//! here, keeping a `.backup` of whatever was in place before.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::Result;

/// Replace `file_name` inside `media_dir` with the file at `new_file`.
///
/// The previous asset (if any) is moved aside to `<file_name>.backup` first,
/// so a bad upload can be rolled back by hand. Returns the final asset path.
pub fn replace_media_file(media_dir: &Path, file_name: &str, new_file: &Path) -> Result<PathBuf> {
    fs::create_dir_all(media_dir)?;
    let target = media_dir.join(file_name);

    if target.exists() {
        let backup = PathBuf::from(format!("{}.backup", target.display()));
        fs::rename(&target, &backup)?;
        info!(backup = %backup.display(), "backed up existing media file");
    }

    // rename fails across filesystems (e.g. uploads landing in /tmp);
    // fall back to copy + remove.
    if fs::rename(new_file, &target).is_err() {
        fs::copy(new_file, &target)?;
        fs::remove_file(new_file)?;
    }
    info!(asset = %target.display(), "media file updated");
    Ok(target)
}
