use super::error::{MutationError, MutationErrorCode, MutationResult};
use crate::errors::domain::{classify_io_error, IoErrorHint};
use crate::path_guard::mirror_under;
use std::fs::{self, File};
use std::io;
use std::path::Path;
use tracing::{debug, info};

/// Moves `path` to the same absolute location under `trash_dir`.
pub(super) fn trash_file(trash_dir: &Path, path: &Path) -> MutationResult<()> {
    let dest = mirror_under(trash_dir, path);
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            MutationError::from_io_error(
                MutationErrorCode::MoveFailed,
                &format!("Failed to create trash dir {}", parent.display()),
                e,
            )
        })?;
    }
    move_file(path, &dest)?;
    info!(path = %path.display(), dest = %dest.display(), "moved file to trash");
    Ok(())
}

/// Rename, or copy then remove when the rename fails for any reason.
pub(super) fn move_file(src: &Path, dst: &Path) -> MutationResult<()> {
    match fs::rename(src, dst) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            debug!(
                src = %src.display(),
                dst = %dst.display(),
                error = %rename_err,
                cross_device = classify_io_error(&rename_err) == IoErrorHint::CrossDevice,
                "rename failed, falling back to copy"
            );
            copy_then_remove(src, dst).map_err(|e| {
                MutationError::from_io_error(
                    MutationErrorCode::MoveFailed,
                    &format!("Failed to move {} -> {}", src.display(), dst.display()),
                    e,
                )
            })
        }
    }
}

/// A failed copy leaves the partial destination and the source in place.
pub(super) fn copy_then_remove(src: &Path, dst: &Path) -> io::Result<()> {
    let mut input = File::open(src)?;
    let mut output = File::create(dst)?;
    io::copy(&mut input, &mut output)?;
    output.sync_all()?;
    drop(output);
    drop(input);
    fs::remove_file(src)
}
