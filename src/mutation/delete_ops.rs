use super::error::{MutationError, MutationErrorCode, MutationResult};
use std::fs;
use std::path::Path;
use tracing::info;

pub(super) fn delete_file(path: &Path) -> MutationResult<()> {
    fs::remove_file(path).map_err(|e| {
        MutationError::from_io_error(
            MutationErrorCode::DeleteFailed,
            &format!("Failed to delete {}", path.display()),
            e,
        )
    })?;
    info!(path = %path.display(), "deleted file");
    Ok(())
}
